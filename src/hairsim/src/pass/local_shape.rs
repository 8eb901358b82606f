// local shape: bending and twisting recovery, one iteration per run
//
// Frames are rebuilt from the root outward: the frame of vertex i is the
// frame of i - 1, bent by how far segment (i - 1, i) turned away from its
// rest direction, times the rest local rotation of i. Vertex i + 1 is then
// pulled toward where the rest shape puts it in that frame.

use crate::pass::{for_each_strand, rotation_between, Pass, PassContext};
use crate::store::StrandMut;
use crate::{Quat, V3};

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalShapePass;

impl Pass for LocalShapePass {
	fn name(&self) -> &'static str {
		"local_shape"
	}

	fn run(&self, ctx: &PassContext, strands: &mut [StrandMut]) {
		let global = ctx.topology.global_rotations();
		let local = ctx.topology.local_rotations();
		let refs = ctx.topology.references();
		for_each_strand(strands, |s| {
			let stiffness = ctx.config(s.index).local_stiffness;
			let n = s.len();
			if stiffness <= 0. || n < 2 {
				return;
			}
			let first = s.first;
			let pos = &mut *s.position;
			let mut parent = global[first];
			let mut frame = parent;
			for i in 0..n - 1 {
				if i > 0 {
					let rest_dir = refs[first + i - 1];
					let cur_dir =
						parent.inverse_transform_vector(&(pos[i] - pos[i - 1]));
					let bend: Quat = rotation_between(&rest_dir, &cur_dir);
					frame = parent * bend * local[first + i];
				}
				let target: V3 = pos[i] + frame * refs[first + i];
				if i == 0 {
					pos[1] += (target - pos[1]) * stiffness;
				} else {
					let del = (target - pos[i + 1]) * (0.5 * stiffness);
					pos[i] -= del;
					pos[i + 1] += del;
				}
				parent = frame;
			}
		});
	}
}
