// pass: the constraint passes of one frame, run strictly in order

pub mod collision;
pub mod integrate;
pub mod length_wind;
pub mod local_shape;
pub mod skip;

use nalgebra::Unit;
use protocol::layout::{ColliderRecord, ConfigRecord};

use crate::group::ConfigTable;
use crate::store::StrandMut;
use crate::topology::StrandTopology;
#[cfg(not(debug_assertions))]
use crate::topology::STRANDS_PER_GROUP;
use crate::wind::WindForces;
use crate::{Iso, Quat, V3};

/// Everything a pass reads besides the vertex buffers, fixed for a frame.
pub struct PassContext<'a> {
	pub topology: &'a StrandTopology,
	pub configs: &'a ConfigTable,
	pub colliders: &'a [ColliderRecord],
	// wind and gravity are already in the object's local space
	pub wind: WindForces,
	pub gravity: V3,
	pub compensation: Iso,
	pub dt: f32,
	pub length_iterations: usize,
}

impl<'a> PassContext<'a> {
	/// Strand types are checked against the table when the simulation is built.
	pub fn config(&self, strand: usize) -> &ConfigRecord {
		let ty = self.topology.strand_types()[strand];
		&self.configs.records()[ty as usize]
	}
}

pub trait Pass: Send + Sync {
	fn name(&self) -> &'static str;

	fn run(&self, ctx: &PassContext, strands: &mut [StrandMut]);
}

#[cfg(not(debug_assertions))]
pub(crate) fn for_each_strand<F>(strands: &mut [StrandMut], f: F)
where
	F: Fn(&mut StrandMut) + Send + Sync,
{
	use rayon::prelude::*;
	strands
		.par_iter_mut()
		.with_min_len(STRANDS_PER_GROUP)
		.for_each(f);
}

#[cfg(debug_assertions)]
pub(crate) fn for_each_strand<F>(strands: &mut [StrandMut], f: F)
where
	F: Fn(&mut StrandMut) + Send + Sync,
{
	strands.iter_mut().for_each(f);
}

/// Shortest rotation from `a` to `b`; half turn when they are opposite.
pub(crate) fn rotation_between(a: &V3, b: &V3) -> Quat {
	Quat::rotation_between(a, b).unwrap_or_else(|| {
		let axis = a.cross(&V3::x());
		let axis = if axis.norm_squared() > 1e-6 {
			axis
		} else {
			a.cross(&V3::y())
		};
		Quat::from_axis_angle(&Unit::new_normalize(axis), std::f32::consts::PI)
	})
}
