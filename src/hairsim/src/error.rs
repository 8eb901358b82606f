use thiserror::Error;

#[derive(Debug, Error)]
pub enum HairError {
	#[error("no strand topology was provided")]
	MissingTopology,

	#[error("no strand group configuration was provided")]
	MissingConfiguration,

	#[error("invalid topology: {0}")]
	InvalidTopology(String),

	#[error("strand {strand} has type {ty}, but only {groups} groups are configured")]
	UnknownStrandType {
		strand: usize,
		ty: u32,
		groups: usize,
	},

	#[error("{what}: expected {expected} entries, found {found}")]
	BufferMismatch {
		what: &'static str,
		expected: usize,
		found: usize,
	},

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("obstacle query failed: {0}")]
	ObstacleQuery(String),

	#[error("config parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

pub type HairResult<T> = Result<T, HairError>;
