// collision: push vertices out of capsules, then refresh tangents

use protocol::layout::ColliderRecord;

use crate::pass::{for_each_strand, Pass, PassContext};
use crate::store::StrandMut;
use crate::V3;

/// Surface point `p` is pushed to when it lies inside the capsule.
///
/// A point exactly on the capsule axis has no separating normal and is left
/// where it is.
pub fn resolve_capsule(p: V3, c: &ColliderRecord) -> Option<V3> {
	let a = c.p1();
	let seg = c.p2() - a;
	let len2 = seg.norm_squared();
	let t = if len2 > 0. {
		((p - a).dot(&seg) / len2).clamp(0., 1.)
	} else {
		0.
	};
	let closest = a + seg * t;
	let delta = p - closest;
	if delta.norm_squared() >= c.radius_squared() {
		return None;
	}
	let n = delta.try_normalize(1e-12)?;
	Some(closest + n * c.radius())
}

/// Direction to the next vertex; the tip reuses its incoming segment.
pub fn update_tangents(position: &[V3], tangent: &mut [V3]) {
	let n = position.len();
	for i in 0..n {
		let dir = if i + 1 < n {
			position[i + 1] - position[i]
		} else if n > 1 {
			position[i] - position[i - 1]
		} else {
			V3::zeros()
		};
		tangent[i] = dir.try_normalize(1e-12).unwrap_or_else(V3::zeros);
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CollisionPass;

impl Pass for CollisionPass {
	fn name(&self) -> &'static str {
		"collision_tangent"
	}

	fn run(&self, ctx: &PassContext, strands: &mut [StrandMut]) {
		for_each_strand(strands, |s| {
			for p in s.position.iter_mut().skip(1) {
				for c in ctx.colliders.iter() {
					if let Some(q) = resolve_capsule(*p, c) {
						*p = q;
					}
				}
			}
			update_tangents(s.position, s.tangent);
		});
	}
}
