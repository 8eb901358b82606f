// pr_strand: simulated strands for rendering

use serde::{Deserialize, Serialize};

/// One committed frame, indexed like the vertices at initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrandFrame {
	pub frame: u64,
	pub positions: Vec<[f32; 3]>,
	pub previous: Vec<[f32; 3]>,
	pub tangents: Vec<[f32; 3]>,
}

impl StrandFrame {
	pub fn vertex_count(&self) -> usize {
		self.positions.len()
	}
}
