// transform: rigid transform of the simulated object, this frame and last

use nalgebra::Translation3;

use crate::{Iso, Quat, V3};

pub fn rigid(translation: V3, rotation: Quat) -> Iso {
	Iso::from_parts(Translation3::from(translation), rotation)
}

#[derive(Clone, Copy, Debug)]
pub struct FrameTransformTracker {
	previous: Iso,
	current: Iso,
}

impl FrameTransformTracker {
	pub fn new(initial: Iso) -> Self {
		Self {
			previous: initial,
			current: initial,
		}
	}

	pub fn begin_frame(&mut self, current: Iso) {
		self.current = current;
	}

	/// Must run after every pass of the frame has read the tracker.
	pub fn end_frame(&mut self) {
		self.previous = self.current;
	}

	pub fn current(&self) -> &Iso {
		&self.current
	}

	pub fn previous_inverse(&self) -> Iso {
		self.previous.inverse()
	}

	/// Object motion since last frame, in last frame's local space.
	pub fn motion(&self) -> Iso {
		self.previous_inverse() * self.current
	}

	/// Maps a local point that stayed fixed in world since last frame into
	/// this frame's local space.
	pub fn compensation(&self) -> Iso {
		self.motion().inverse()
	}

	pub fn to_local_vector(&self, v: &V3) -> V3 {
		self.current.rotation.inverse_transform_vector(v)
	}
}
