// integration: damped Verlet step, then global shape matching

use nalgebra::Point3;
use protocol::layout::ConfigRecord;

use crate::pass::{for_each_strand, Pass, PassContext};
use crate::store::StrandMut;
use crate::V3;

/// `cur + (cur - old) * (1 - damping) + accel * dt2`
pub fn verlet(cur: V3, old: V3, damping: f32, accel: V3, dt2: f32) -> V3 {
	cur + (cur - old) * (1. - damping) + accel * dt2
}

/// Pulls `pos` toward its rest target by the group's global stiffness,
/// only once it drifted further than the matching range.
pub fn global_shape(pos: V3, target: V3, config: &ConfigRecord) -> V3 {
	if config.global_stiffness <= 0. {
		return pos;
	}
	let del = target - pos;
	if del.magnitude() <= config.global_stiffness_matching_range {
		return pos;
	}
	pos + del * config.global_stiffness
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IntegrationPass;

impl Pass for IntegrationPass {
	fn name(&self) -> &'static str {
		"integration_global_shape"
	}

	fn run(&self, ctx: &PassContext, strands: &mut [StrandMut]) {
		let dt2 = ctx.dt * ctx.dt;
		for_each_strand(strands, |s| {
			let config = ctx.config(s.index);
			for i in 0..s.len() {
				let rest = s.initial[i];
				if i == 0 {
					// root is pinned to its rest position
					s.previous[0] = s.position[0];
					s.position[0] = rest;
					continue;
				}
				let cur = (ctx.compensation * Point3::from(s.position[i])).coords;
				let old = (ctx.compensation * Point3::from(s.previous[i])).coords;
				let next = verlet(cur, old, config.damping, ctx.gravity, dt2);
				s.previous[i] = cur;
				s.position[i] = global_shape(next, rest, config);
			}
		});
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::group::StrandGroupConfig;
	use crate::pass::test::Fixture;
	use crate::transform::rigid;
	use crate::{Iso, Quat};
	use approx::assert_relative_eq;

	fn no_global() -> StrandGroupConfig {
		StrandGroupConfig::default().with_global_stiffness(0., 0.)
	}

	#[test]
	fn test_full_damping_does_not_drift() {
		let mut f = Fixture::hanging(4, no_global().with_damping(1.));
		f.store.set_position(2, V3::new(0.3, -2., 0.));
		f.store.set_position(3, V3::new(0.5, -2.8, 0.1));
		f.run(&IntegrationPass);
		// previous got last position, new position stays put
		let p = f.store.positions().to_vec();
		let q = f.store.previous().to_vec();
		for i in 0..4 {
			assert_relative_eq!(p[i], q[i], epsilon = 1e-6);
		}
		assert_relative_eq!(p[3], V3::new(0.5, -2.8, 0.1), epsilon = 1e-6);
	}

	#[test]
	fn test_velocity_carried() {
		let mut f = Fixture::hanging(2, no_global().with_damping(0.));
		f.store.set_position(1, V3::new(0.1, -1., 0.));
		f.run(&IntegrationPass);
		assert_relative_eq!(f.positions()[1], V3::new(0.2, -1., 0.), epsilon = 1e-6);
		assert_relative_eq!(
			f.store.previous()[1],
			V3::new(0.1, -1., 0.),
			epsilon = 1e-6
		);
	}

	#[test]
	fn test_gravity() {
		let mut f = Fixture::hanging(2, no_global().with_damping(0.5));
		f.gravity = V3::new(0., -10., 0.);
		f.dt = 0.1;
		f.run(&IntegrationPass);
		assert_relative_eq!(f.positions()[1], V3::new(0., -1.1, 0.), epsilon = 1e-5);
		assert_eq!(f.positions()[0], V3::zeros());
	}

	#[test]
	fn test_global_shape_inside_range_is_noop() {
		for stiffness in [0.1f32, 0.5, 1.0] {
			let c = StrandGroupConfig::default()
				.with_global_stiffness(stiffness, 0.5)
				.with_damping(1.);
			let mut f = Fixture::hanging(3, c);
			f.store.set_position(2, V3::new(0.4, -2., 0.));
			f.run(&IntegrationPass);
			assert_relative_eq!(f.positions()[2], V3::new(0.4, -2., 0.), epsilon = 1e-6);
		}
	}

	#[test]
	fn test_global_shape_outside_range() {
		let c = StrandGroupConfig::default()
			.with_global_stiffness(0.5, 0.5)
			.with_damping(1.);
		let mut f = Fixture::hanging(3, c);
		f.store.set_position(2, V3::new(2., -2., 0.));
		f.run(&IntegrationPass);
		assert_relative_eq!(f.positions()[2], V3::new(1., -2., 0.), epsilon = 1e-6);
	}

	#[test]
	fn test_root_pinned() {
		let mut f = Fixture::hanging(2, no_global());
		f.store.set_position(0, V3::new(5., 5., 5.));
		f.run(&IntegrationPass);
		assert_eq!(f.positions()[0], V3::zeros());
	}

	#[test]
	fn test_compensation_keeps_world_position() {
		// the object moved +1 in x, a resting vertex stays in world
		let mut f = Fixture::hanging(2, no_global().with_damping(0.));
		let motion = rigid(V3::new(1., 0., 0.), Quat::identity());
		f.compensation = motion.inverse();
		f.run(&IntegrationPass);
		assert_relative_eq!(f.positions()[1], V3::new(-1., -1., 0.), epsilon = 1e-6);
		assert_relative_eq!(f.store.previous()[1], V3::new(-1., -1., 0.), epsilon = 1e-6);
		f.compensation = Iso::identity();
		f.run(&IntegrationPass);
		assert_relative_eq!(f.positions()[1], V3::new(-1., -1., 0.), epsilon = 1e-6);
	}
}
