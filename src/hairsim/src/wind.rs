// wind: four gust vectors per frame from one direction and magnitude

use nalgebra::Unit;
use protocol::layout::WindRecord;

use crate::{Quat, V3, V4};

/// Half angle of the cone the four samples are spread over, in degrees.
pub const WIND_CONE_ANGLE: f32 = 40.0;

const PARALLEL_EPS: f32 = 1e-3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindForces {
	pub forces: [V4; 4],
}

/// Rotation taking the x axis onto `direction`.
pub(crate) fn wind_frame(direction: V3) -> Quat {
	let dir = match direction.try_normalize(1e-12) {
		Some(d) => d,
		None => return Quat::identity(),
	};
	let axis = V3::x().cross(&dir);
	let sin = axis.magnitude();
	if sin <= PARALLEL_EPS {
		// opposite the x axis: half turn instead of falling back to identity
		if dir[0] < 0. {
			return Quat::from_axis_angle(&V3::y_axis(), std::f32::consts::PI);
		}
		return Quat::identity();
	}
	Quat::from_axis_angle(&Unit::new_normalize(axis), sin.atan2(dir[0]))
}

/// Time varying strength, `magnitude * (sin(frame * 0.05)^2 + 0.5)`.
pub fn gust_magnitude(magnitude: f32, frame_counter: u64) -> f32 {
	magnitude * ((frame_counter as f32 * 0.05).sin().powi(2) + 0.5)
}

pub fn sample(direction: V3, magnitude: f32, frame_counter: u64) -> WindForces {
	let strength = gust_magnitude(magnitude, frame_counter);
	let to_wind = wind_frame(direction);
	let cone = WIND_CONE_ANGLE.to_radians();
	let axes = [
		V3::y_axis(),
		Unit::new_unchecked(-V3::y()),
		V3::z_axis(),
		Unit::new_unchecked(-V3::z()),
	];
	let mut forces = [V4::zeros(); 4];
	for (f, axis) in forces.iter_mut().zip(axes.iter()) {
		let dir = to_wind * Quat::from_axis_angle(axis, cone) * V3::x();
		let v = dir * strength;
		*f = V4::new(v[0], v[1], v[2], frame_counter as f32);
	}
	WindForces { forces }
}

impl WindForces {
	pub fn is_calm(&self) -> bool {
		self.forces.iter().all(|f| f.xyz() == V3::zeros())
	}

	pub fn rotated(&self, q: &Quat) -> Self {
		let mut forces = self.forces;
		for f in forces.iter_mut() {
			let v = q * f.xyz();
			*f = V4::new(v[0], v[1], v[2], f[3]);
		}
		Self { forces }
	}

	pub fn records(&self) -> [WindRecord; 4] {
		self.forces.map(WindRecord::from)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn test_sample_deterministic() {
		let a = sample(V3::new(0.3, 0.2, -1.), 4.0, 123);
		let b = sample(V3::new(0.3, 0.2, -1.), 4.0, 123);
		assert_eq!(a, b);
	}

	#[test]
	fn test_x_axis_takes_identity_path() {
		assert_eq!(wind_frame(V3::new(1., 0., 0.)), Quat::identity());
		assert_eq!(wind_frame(V3::new(5., 0., 0.)), Quat::identity());
		let w = sample(V3::new(1., 0., 0.), 2.0, 0);
		// frame 0: strength is magnitude * 0.5
		let c = WIND_CONE_ANGLE.to_radians().cos();
		let s = WIND_CONE_ANGLE.to_radians().sin();
		assert_relative_eq!(w.forces[0], V4::new(c, 0., -s, 0.), epsilon = 1e-5);
		assert_relative_eq!(w.forces[1], V4::new(c, 0., s, 0.), epsilon = 1e-5);
		assert_relative_eq!(w.forces[2], V4::new(c, s, 0., 0.), epsilon = 1e-5);
		assert_relative_eq!(w.forces[3], V4::new(c, -s, 0., 0.), epsilon = 1e-5);
	}

	#[test]
	fn test_samples_on_cone() {
		for dir in [
			V3::new(0., 0., 1.),
			V3::new(-1., 0., 0.),
			V3::new(0.2, -0.7, 0.4),
		] {
			let w = sample(dir, 1.0, 31);
			let n = dir.normalize();
			let mut sum = V3::zeros();
			for f in w.forces.iter() {
				let v = f.xyz();
				assert_relative_eq!(
					v.normalize().dot(&n),
					WIND_CONE_ANGLE.to_radians().cos(),
					epsilon = 1e-4
				);
				assert_relative_eq!(
					v.magnitude(),
					gust_magnitude(1.0, 31),
					epsilon = 1e-5
				);
				assert_eq!(f[3], 31.);
				sum += v;
			}
			assert_relative_eq!(sum.normalize(), n, epsilon = 1e-4);
		}
	}

	#[test]
	fn test_gust_range() {
		for frame in 0..200 {
			let m = gust_magnitude(2.0, frame);
			assert!(m >= 1.0 - 1e-6 && m <= 3.0 + 1e-6);
		}
	}

	#[test]
	fn test_calm() {
		assert!(sample(V3::new(0., 1., 0.), 0., 10).is_calm());
		assert!(sample(V3::zeros(), 3., 10).forces[0][0] > 0.);
		assert!(!sample(V3::new(0., 1., 0.), 1., 10).is_calm());
	}

	#[test]
	fn test_rotated_keeps_tag() {
		let w = sample(V3::new(1., 0., 0.), 1.0, 9);
		let q = Quat::from_axis_angle(&V3::z_axis(), 1.0);
		let r = w.rotated(&q);
		for (a, b) in w.forces.iter().zip(r.forces.iter()) {
			assert_eq!(b[3], 9.);
			assert_relative_eq!(q * a.xyz(), b.xyz(), epsilon = 1e-6);
		}
		assert_eq!(r.records()[0].force[3], 9.);
	}
}
