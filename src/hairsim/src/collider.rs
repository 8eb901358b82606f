// collider: capsule obstacles mapped into the simulated object's space

use nalgebra::Point3;
use protocol::layout::ColliderRecord;

use crate::{HairError, HairResult, Iso, Quat, V3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleTransform {
	pub translation: V3,
	pub rotation: Quat,
	pub scale: V3,
}

impl Default for ObstacleTransform {
	fn default() -> Self {
		Self {
			translation: V3::zeros(),
			rotation: Quat::identity(),
			scale: V3::new(1., 1., 1.),
		}
	}
}

impl ObstacleTransform {
	pub fn transform_point(&self, p: &V3) -> V3 {
		self.translation + self.rotation * p.component_mul(&self.scale)
	}

	pub fn up(&self) -> V3 {
		self.rotation * V3::y()
	}

	pub fn max_scale(&self) -> f32 {
		self.scale[0].max(self.scale[1]).max(self.scale[2])
	}

	fn is_finite(&self) -> bool {
		self.translation.iter().all(|x| x.is_finite())
			&& self.rotation.coords.iter().all(|x| x.is_finite())
			&& self.scale.iter().all(|x| x.is_finite())
	}
}

/// Capsule shaped obstacle, y up in its own space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleObstacle {
	pub transform: ObstacleTransform,
	pub center: V3,
	pub height: f32,
	pub radius: f32,
}

impl CapsuleObstacle {
	pub fn new(transform: ObstacleTransform, height: f32, radius: f32) -> Self {
		Self {
			transform,
			center: V3::zeros(),
			height,
			radius,
		}
	}

	pub fn with_center(mut self, center: V3) -> Self {
		self.center = center;
		self
	}
}

/// Host side query for the obstacles active this frame.
pub trait ObstacleSource {
	fn query(&self) -> HairResult<Vec<CapsuleObstacle>>;
}

impl ObstacleSource for Vec<CapsuleObstacle> {
	fn query(&self) -> HairResult<Vec<CapsuleObstacle>> {
		Ok(self.clone())
	}
}

pub fn derive_collider(
	obstacle: &CapsuleObstacle,
	object: &Iso,
) -> HairResult<ColliderRecord> {
	let t = &obstacle.transform;
	if !t.is_finite()
		|| !obstacle.center.iter().all(|x| x.is_finite())
		|| !obstacle.height.is_finite()
		|| !obstacle.radius.is_finite()
	{
		return Err(HairError::ObstacleQuery(
			"obstacle transform is not finite".into(),
		));
	}
	let scale = t.max_scale();
	let center = t.transform_point(&obstacle.center);
	let radius = obstacle.radius * scale;
	// shorter than its diameter: the capsule degenerates to a sphere
	let half = (obstacle.height * scale / 2. - radius).max(0.);
	let up = t.up();
	let p1 = object.inverse_transform_point(&Point3::from(center - up * half));
	let p2 = object.inverse_transform_point(&Point3::from(center + up * half));
	Ok(ColliderRecord::new(p1.coords, p2.coords, radius))
}

/// Colliders of the current frame. Fully rebuilt by every refresh.
#[derive(Clone, Debug, Default)]
pub struct ColliderSet {
	records: Vec<ColliderRecord>,
}

impl ColliderSet {
	/// On error the set is left empty.
	pub fn refresh(
		&mut self,
		obstacles: &[CapsuleObstacle],
		object: &Iso,
	) -> HairResult<()> {
		self.records.clear();
		for obstacle in obstacles.iter() {
			match derive_collider(obstacle, object) {
				Ok(c) => self.records.push(c),
				Err(e) => {
					self.records.clear();
					return Err(e);
				}
			}
		}
		Ok(())
	}

	pub fn clear(&mut self) {
		self.records.clear();
	}

	pub fn records(&self) -> &[ColliderRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::transform::rigid;
	use approx::assert_relative_eq;

	#[test]
	fn test_unit_capsule() {
		let o = CapsuleObstacle::new(ObstacleTransform::default(), 2., 0.5);
		let c = derive_collider(&o, &Iso::identity()).unwrap();
		assert_relative_eq!((c.p2() - c.p1()).magnitude(), 1.0, epsilon = 1e-6);
		assert_relative_eq!(c.p1(), V3::new(0., -0.5, 0.), epsilon = 1e-6);
		assert_eq!(c.radius(), 0.5);
		assert_eq!(c.radius_squared(), 0.25);
	}

	#[test]
	fn test_scaled_capsule() {
		let (h, r) = (3.0f32, 0.25f32);
		let t = ObstacleTransform {
			scale: V3::new(1., 2., 1.5),
			..Default::default()
		};
		let c = derive_collider(&CapsuleObstacle::new(t, h, r), &Iso::identity())
			.unwrap();
		let s = 2.0;
		assert_relative_eq!(
			(c.p2() - c.p1()).magnitude(),
			2. * (h * s / 2. - r * s),
			epsilon = 1e-5
		);
		assert_relative_eq!(c.radius(), r * s, epsilon = 1e-6);
	}

	#[test]
	fn test_rotated_offset_capsule_in_object_space() {
		let t = ObstacleTransform {
			translation: V3::new(0., 1., 0.),
			rotation: Quat::from_axis_angle(
				&V3::z_axis(),
				std::f32::consts::FRAC_PI_2,
			),
			scale: V3::new(1., 1., 1.),
		};
		let o = CapsuleObstacle::new(t, 2., 0.5).with_center(V3::new(0., 1., 0.));
		let object = rigid(V3::new(0., 1., 0.), Quat::identity());
		let c = derive_collider(&o, &object).unwrap();
		// center: (0,1,0) + rot * (0,1,0) = (-1,1,0), local (-1,0,0)
		// up axis after rotation is -x
		assert_relative_eq!(c.p1(), V3::new(-0.5, 0., 0.), epsilon = 1e-5);
		assert_relative_eq!(c.p2(), V3::new(-1.5, 0., 0.), epsilon = 1e-5);
	}

	#[test]
	fn test_short_capsule_is_sphere() {
		let o = CapsuleObstacle::new(ObstacleTransform::default(), 0.5, 1.0);
		let c = derive_collider(&o, &Iso::identity()).unwrap();
		assert_eq!(c.p1(), c.p2());
	}

	#[test]
	fn test_refresh() {
		let mut set = ColliderSet::default();
		set.refresh(&[], &Iso::identity()).unwrap();
		assert!(set.is_empty());
		let good = CapsuleObstacle::new(ObstacleTransform::default(), 2., 0.5);
		set.refresh(&[good, good], &Iso::identity()).unwrap();
		assert_eq!(set.len(), 2);
		let mut bad = good;
		bad.transform.translation[0] = f32::NAN;
		assert!(set.refresh(&[good, bad], &Iso::identity()).is_err());
		assert!(set.is_empty());
	}

	#[test]
	fn test_obstacle_list_as_source() {
		let t = ObstacleTransform::default();
		let obstacles = vec![CapsuleObstacle::new(t, 2., 0.5); 2];
		let source: &dyn ObstacleSource = &obstacles;
		assert_eq!(source.query().unwrap(), obstacles);
	}
}
