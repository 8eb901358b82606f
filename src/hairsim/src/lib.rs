pub mod collider;
pub mod config;
pub mod error;
pub mod group;
pub mod pass;
pub mod pipeline;
pub mod resource;
pub mod store;
pub mod topology;
pub mod transform;
pub mod wind;

pub type V3 = nalgebra::Vector3<f32>;
pub type V4 = nalgebra::Vector4<f32>;
pub type Quat = nalgebra::UnitQuaternion<f32>;
pub type Iso = nalgebra::Isometry3<f32>;

pub use error::{HairError, HairResult};
pub use pipeline::{FrameInput, HairSimulation, SimulationBuilder};
