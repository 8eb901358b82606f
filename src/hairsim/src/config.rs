use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::group::StrandGroupConfig;
use crate::{HairError, HairResult, V3};

/// Simulation wide parameters.
///
/// Loadable from TOML; strand groups are given as `[[group]]` tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	pub gravity_magnitude: f32,
	pub length_constraint_iterations: usize,
	pub local_shape_constraint_iterations: usize,
	pub wind_direction: [f32; 3],
	pub wind_magnitude: f32,
	// administrative switch, OR-ed with the per frame flag
	pub skip_simulation: bool,
	#[serde(rename = "group")]
	pub groups: Vec<StrandGroupConfig>,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			gravity_magnitude: 9.82,
			length_constraint_iterations: 5,
			local_shape_constraint_iterations: 2,
			wind_direction: [1., 0., 0.],
			wind_magnitude: 0.,
			skip_simulation: false,
			groups: Vec::new(),
		}
	}
}

impl SimulationConfig {
	pub fn from_toml_str(s: &str) -> HairResult<Self> {
		let config: Self = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: impl AsRef<Path>) -> HairResult<Self> {
		let s = std::fs::read_to_string(path)?;
		Self::from_toml_str(&s)
	}

	pub fn validate(&self) -> HairResult<()> {
		if !self.gravity_magnitude.is_finite() {
			return Err(HairError::InvalidConfig(
				"gravity magnitude is not finite".into(),
			));
		}
		if !self.wind_magnitude.is_finite()
			|| self.wind_direction.iter().any(|x| !x.is_finite())
		{
			return Err(HairError::InvalidConfig("wind is not finite".into()));
		}
		Ok(())
	}

	pub fn with_gravity(mut self, magnitude: f32) -> Self {
		self.gravity_magnitude = magnitude;
		self
	}

	pub fn with_length_iterations(mut self, n: usize) -> Self {
		self.length_constraint_iterations = n;
		self
	}

	pub fn with_local_shape_iterations(mut self, n: usize) -> Self {
		self.local_shape_constraint_iterations = n;
		self
	}

	pub fn with_wind(mut self, direction: V3, magnitude: f32) -> Self {
		self.wind_direction = direction.into();
		self.wind_magnitude = magnitude;
		self
	}

	pub fn with_skip_simulation(mut self, skip: bool) -> Self {
		self.skip_simulation = skip;
		self
	}

	pub fn with_group(mut self, group: StrandGroupConfig) -> Self {
		self.groups.push(group);
		self
	}

	pub fn wind_direction(&self) -> V3 {
		V3::from(self.wind_direction)
	}
}
