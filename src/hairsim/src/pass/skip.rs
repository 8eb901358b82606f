// skip: rest pose copy, no physics

use crate::pass::collision::update_tangents;
use crate::pass::{for_each_strand, Pass, PassContext};
use crate::store::StrandMut;

/// Resets current and previous positions to the rest pose.
///
/// Used when simulation is switched off and to prime the position history
/// before the first frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipPass;

impl Pass for SkipPass {
	fn name(&self) -> &'static str {
		"skip"
	}

	fn run(&self, _ctx: &PassContext, strands: &mut [StrandMut]) {
		for_each_strand(strands, |s| {
			s.position.copy_from_slice(s.initial);
			s.previous.copy_from_slice(s.initial);
			update_tangents(s.position, s.tangent);
		});
	}
}
