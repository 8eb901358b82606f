// layout: fixed records shared with compute buffers, bit-for-bit

use bytemuck::{Pod, Zeroable};
use nalgebra::{UnitQuaternion, Vector3, Vector4};

pub type RestLength = f32;
pub type VertexOffset = u32;

#[repr(C)]
#[derive(Zeroable, Pod, Default, Debug, Clone, Copy, PartialEq)]
pub struct RawVec3 {
	pub xyz: [f32; 3],
}

impl From<Vector3<f32>> for RawVec3 {
	fn from(v: Vector3<f32>) -> Self {
		Self { xyz: v.into() }
	}
}

impl From<RawVec3> for Vector3<f32> {
	fn from(v: RawVec3) -> Self {
		Vector3::from(v.xyz)
	}
}

// x, y, z, w
#[repr(C)]
#[derive(Zeroable, Pod, Debug, Clone, Copy, PartialEq)]
pub struct RawQuat {
	pub xyzw: [f32; 4],
}

impl Default for RawQuat {
	fn default() -> Self {
		Self {
			xyzw: [0., 0., 0., 1.],
		}
	}
}

impl From<UnitQuaternion<f32>> for RawQuat {
	fn from(q: UnitQuaternion<f32>) -> Self {
		let c = q.coords;
		Self {
			xyzw: [c[0], c[1], c[2], c[3]],
		}
	}
}

/// Per strand group physical parameters, 16 bytes.
#[repr(C)]
#[derive(Zeroable, Pod, Default, Debug, Clone, Copy, PartialEq)]
pub struct ConfigRecord {
	pub global_stiffness: f32,
	pub global_stiffness_matching_range: f32,
	pub local_stiffness: f32,
	pub damping: f32,
}

/// Capsule in simulation space, 32 bytes.
/// `p1.w` is the radius, `p2.w` the squared radius.
#[repr(C)]
#[derive(Zeroable, Pod, Default, Debug, Clone, Copy, PartialEq)]
pub struct ColliderRecord {
	pub p1: [f32; 4],
	pub p2: [f32; 4],
}

impl ColliderRecord {
	pub fn new(p1: Vector3<f32>, p2: Vector3<f32>, radius: f32) -> Self {
		Self {
			p1: [p1[0], p1[1], p1[2], radius],
			p2: [p2[0], p2[1], p2[2], radius * radius],
		}
	}

	pub fn p1(&self) -> Vector3<f32> {
		Vector3::new(self.p1[0], self.p1[1], self.p1[2])
	}

	pub fn p2(&self) -> Vector3<f32> {
		Vector3::new(self.p2[0], self.p2[1], self.p2[2])
	}

	pub fn radius(&self) -> f32 {
		self.p1[3]
	}

	pub fn radius_squared(&self) -> f32 {
		self.p2[3]
	}
}

/// Wind sample: xyz force, w the frame counter it was sampled at.
#[repr(C)]
#[derive(Zeroable, Pod, Default, Debug, Clone, Copy, PartialEq)]
pub struct WindRecord {
	pub force: [f32; 4],
}

impl From<Vector4<f32>> for WindRecord {
	fn from(v: Vector4<f32>) -> Self {
		Self { force: v.into() }
	}
}
