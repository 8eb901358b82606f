// group: per strand group physical parameters

use protocol::layout::ConfigRecord;
use serde::{Deserialize, Serialize};

use crate::{HairError, HairResult};

// 1.0 for local stiffness makes the shape matching unstable
pub const MAX_LOCAL_STIFFNESS: f32 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrandGroupConfig {
	pub global_stiffness: f32,
	pub global_stiffness_matching_range: f32,
	pub local_stiffness: f32,
	pub damping: f32,
}

impl Default for StrandGroupConfig {
	fn default() -> Self {
		Self {
			global_stiffness: 0.1,
			global_stiffness_matching_range: 0.3,
			local_stiffness: 0.9,
			damping: 0.5,
		}
	}
}

impl StrandGroupConfig {
	pub fn with_global_stiffness(mut self, stiffness: f32, range: f32) -> Self {
		self.global_stiffness = stiffness;
		self.global_stiffness_matching_range = range;
		self
	}

	pub fn with_local_stiffness(mut self, stiffness: f32) -> Self {
		self.local_stiffness = stiffness;
		self
	}

	pub fn with_damping(mut self, damping: f32) -> Self {
		self.damping = damping;
		self
	}
}

/// Immutable lookup from strand type to its group record.
///
/// Local stiffness is clamped to [`MAX_LOCAL_STIFFNESS`] here, once.
/// Damping and global stiffness are stored as given.
#[derive(Clone, Debug)]
pub struct ConfigTable {
	records: Vec<ConfigRecord>,
}

impl ConfigTable {
	pub fn new(groups: &[StrandGroupConfig]) -> HairResult<Self> {
		if groups.is_empty() {
			return Err(HairError::MissingConfiguration);
		}
		let mut records = Vec::with_capacity(groups.len());
		for (idx, g) in groups.iter().enumerate() {
			let values = [
				g.global_stiffness,
				g.global_stiffness_matching_range,
				g.local_stiffness,
				g.damping,
			];
			if values.iter().any(|v| !v.is_finite()) {
				return Err(HairError::InvalidConfig(format!(
					"group {} has a non-finite parameter",
					idx
				)));
			}
			records.push(ConfigRecord {
				global_stiffness: g.global_stiffness,
				global_stiffness_matching_range: g
					.global_stiffness_matching_range,
				local_stiffness: g.local_stiffness.min(MAX_LOCAL_STIFFNESS),
				damping: g.damping,
			});
		}
		Ok(Self { records })
	}

	pub fn config_for(&self, strand_type: u32) -> Option<&ConfigRecord> {
		self.records.get(strand_type as usize)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn records(&self) -> &[ConfigRecord] {
		&self.records
	}
}
