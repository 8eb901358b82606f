// pipeline: per frame scheduling of the constraint passes
//
// Idle -> ColliderRefresh -> WindSample -> (SkipPass | FullPass) -> Idle
//
// Passes run in a fixed order and each one returns only after every strand
// is done, so its writes are visible to the next.

use std::time::{Duration, Instant};

use protocol::pr_strand::StrandFrame;
use protocol::Message;
use tracing::{debug, info, trace, warn};

use crate::collider::{ColliderSet, ObstacleSource};
use crate::config::SimulationConfig;
use crate::group::{ConfigTable, StrandGroupConfig};
use crate::pass::collision::CollisionPass;
use crate::pass::integrate::IntegrationPass;
use crate::pass::length_wind::LengthWindPass;
use crate::pass::local_shape::LocalShapePass;
use crate::pass::skip::SkipPass;
use crate::pass::{Pass, PassContext};
use crate::resource::ResourceSet;
use crate::store::{StrandBuffers, StrandMut};
use crate::topology::StrandTopology;
use crate::transform::FrameTransformTracker;
use crate::wind::{self, WindForces};
use crate::{HairError, HairResult, Iso, V3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
	Idle,
	ColliderRefresh,
	WindSample,
	SkipPass,
	FullPass,
}

pub struct FrameInput<'a> {
	pub dt: f32,
	pub frame_counter: u64,
	pub transform: Iso,
	pub obstacles: &'a dyn ObstacleSource,
	pub skip: bool,
}

impl<'a> FrameInput<'a> {
	pub fn new(
		dt: f32,
		frame_counter: u64,
		transform: Iso,
		obstacles: &'a dyn ObstacleSource,
	) -> Self {
		Self {
			dt,
			frame_counter,
			transform,
			obstacles,
			skip: false,
		}
	}

	pub fn with_skip(mut self, skip: bool) -> Self {
		self.skip = skip;
		self
	}
}

pub struct SimulationBuilder {
	config: SimulationConfig,
	topology: Option<StrandTopology>,
	groups: Option<Vec<StrandGroupConfig>>,
}

impl SimulationBuilder {
	pub fn new(config: SimulationConfig) -> Self {
		Self {
			config,
			topology: None,
			groups: None,
		}
	}

	pub fn with_topology(mut self, topology: StrandTopology) -> Self {
		self.topology = Some(topology);
		self
	}

	/// Overrides the groups given in the config.
	pub fn with_groups(mut self, groups: Vec<StrandGroupConfig>) -> Self {
		self.groups = Some(groups);
		self
	}

	pub fn build<B: StrandBuffers>(
		self,
		buffers: B,
		transform: Iso,
	) -> HairResult<HairSimulation<B>> {
		self.config.validate()?;
		let topology = self.topology.ok_or(HairError::MissingTopology)?;
		let groups = match self.groups {
			Some(g) => g,
			None => self.config.groups.clone(),
		};
		let configs = ConfigTable::new(&groups)?;
		for (strand, &ty) in topology.strand_types().iter().enumerate() {
			if configs.config_for(ty).is_none() {
				return Err(HairError::UnknownStrandType {
					strand,
					ty,
					groups: configs.len(),
				});
			}
		}
		if buffers.vertex_count() != topology.vertex_count() {
			return Err(HairError::BufferMismatch {
				what: "vertex buffers",
				expected: topology.vertex_count(),
				found: buffers.vertex_count(),
			});
		}
		if buffers.strand_count() != topology.strand_count() {
			return Err(HairError::BufferMismatch {
				what: "strands",
				expected: topology.strand_count(),
				found: buffers.strand_count(),
			});
		}

		let resources = ResourceSet::upload_static(&topology, &configs);
		let schedule: Vec<(Box<dyn Pass>, usize)> = vec![
			(Box::new(IntegrationPass), 1),
			(
				Box::new(LocalShapePass),
				self.config.local_shape_constraint_iterations,
			),
			(Box::new(LengthWindPass), 1),
			(Box::new(CollisionPass), 1),
		];
		info!(
			strands = topology.strand_count(),
			vertices = topology.vertex_count(),
			groups = configs.len(),
			dispatch_groups = topology.dispatch_groups(),
			"hair simulation initialized"
		);
		let solver = Solver {
			config: self.config,
			topology,
			configs,
			tracker: FrameTransformTracker::new(Iso::identity()),
			colliders: ColliderSet::default(),
			wind: WindForces::default(),
			schedule,
		};
		let mut result = HairSimulation {
			solver,
			buffers,
			resources,
			state: PipelineState::Idle,
			frame: 0,
			computation_time: Duration::ZERO,
			strands: Vec::new(),
		};
		result.prime(transform);
		Ok(result)
	}
}

// everything the passes read, kept apart from the vertex buffers they write
struct Solver {
	config: SimulationConfig,
	topology: StrandTopology,
	configs: ConfigTable,
	tracker: FrameTransformTracker,
	colliders: ColliderSet,
	wind: WindForces,
	schedule: Vec<(Box<dyn Pass>, usize)>,
}

impl Solver {
	fn context(&self, dt: f32) -> PassContext<'_> {
		let to_local = self.tracker.current().rotation.inverse();
		let gravity = V3::new(0., -self.config.gravity_magnitude, 0.);
		PassContext {
			topology: &self.topology,
			configs: &self.configs,
			colliders: self.colliders.records(),
			wind: self.wind.rotated(&to_local),
			gravity: self.tracker.to_local_vector(&gravity),
			compensation: self.tracker.compensation(),
			dt,
			length_iterations: self.config.length_constraint_iterations,
		}
	}
}

pub struct HairSimulation<B: StrandBuffers> {
	solver: Solver,
	buffers: B,
	resources: ResourceSet,
	state: PipelineState,
	frame: u64,
	computation_time: Duration,
	// empty between frames, only its allocation is kept
	strands: Vec<StrandMut<'static>>,
}

// Empties `v` and hands its allocation over to views of another lifetime.
fn recycle<'a, 'b>(mut v: Vec<StrandMut<'a>>) -> Vec<StrandMut<'b>> {
	v.clear();
	v.into_iter().map(|_| unreachable!()).collect()
}

impl<B: StrandBuffers> HairSimulation<B> {
	fn set_state(&mut self, state: PipelineState) {
		trace!(from = ?self.state, to = ?state, "pipeline state");
		self.state = state;
	}

	fn run_skip(&mut self) {
		self.dispatch(0., true);
	}

	fn run_full(&mut self, dt: f32) {
		self.dispatch(dt, false);
	}

	fn dispatch(&mut self, dt: f32, skip: bool) {
		let ctx = self.solver.context(dt);
		let mut strands = recycle(std::mem::take(&mut self.strands));
		self.buffers
			.buffers_mut()
			.split_strands_into(&self.solver.topology, &mut strands);
		if skip {
			SkipPass.run(&ctx, &mut strands);
		} else {
			for (pass, repeat) in self.solver.schedule.iter() {
				for _ in 0..*repeat {
					trace!(pass = pass.name(), "dispatch");
					pass.run(&ctx, &mut strands);
				}
			}
		}
		self.strands = recycle(strands);
	}

	// Two skip passes, first at the origin, then at the real placement, so
	// the history starts at rest without a jump from the initial placement.
	fn prime(&mut self, transform: Iso) {
		for t in [Iso::identity(), transform] {
			self.solver.tracker.begin_frame(t);
			self.run_skip();
			self.solver.tracker.end_frame();
		}
		self.buffers.commit_frame();
	}

	/// Drops all motion and restarts from the rest pose at `transform`.
	pub fn reset(&mut self, transform: Iso) {
		self.prime(transform);
	}

	fn refresh_colliders(&mut self, obstacles: &dyn ObstacleSource) {
		let solver = &mut self.solver;
		let current = *solver.tracker.current();
		let result = obstacles
			.query()
			.and_then(|obs| solver.colliders.refresh(&obs, &current));
		if let Err(e) = result {
			warn!(frame = self.frame, "no colliders this frame: {}", e);
			solver.colliders.clear();
		}
		self.resources.upload_colliders(solver.colliders.records());
	}

	/// Runs one frame. A negative or non-finite `dt` is rejected. A zero
	/// `dt` is a paused frame: everything but the physics passes still runs.
	pub fn step(&mut self, input: &FrameInput) -> HairResult<()> {
		if !input.dt.is_finite() || input.dt < 0. {
			return Err(HairError::InvalidConfig(format!(
				"bad time step {}",
				input.dt
			)));
		}
		let start = Instant::now();
		self.solver.tracker.begin_frame(input.transform);

		self.set_state(PipelineState::ColliderRefresh);
		self.refresh_colliders(input.obstacles);

		self.set_state(PipelineState::WindSample);
		let config = &self.solver.config;
		self.solver.wind = wind::sample(
			config.wind_direction(),
			config.wind_magnitude,
			input.frame_counter,
		);
		self.resources.upload_wind(&self.solver.wind.records());

		if input.skip || self.solver.config.skip_simulation {
			self.set_state(PipelineState::SkipPass);
			self.run_skip();
		} else {
			self.set_state(PipelineState::FullPass);
			if input.dt > 0. {
				self.run_full(input.dt);
			}
		}

		self.buffers.commit_frame();
		self.solver.tracker.end_frame();
		self.frame = input.frame_counter;
		self.computation_time = start.elapsed();
		debug!(
			frame = self.frame,
			colliders = self.solver.colliders.len(),
			micros = self.computation_time.as_micros() as u64,
			"frame simulated"
		);
		self.set_state(PipelineState::Idle);
		Ok(())
	}

	pub fn set_wind(&mut self, direction: V3, magnitude: f32) -> HairResult<()> {
		let config = self.solver.config.clone().with_wind(direction, magnitude);
		config.validate()?;
		self.solver.config = config;
		Ok(())
	}

	pub fn set_skip_simulation(&mut self, skip: bool) {
		self.solver.config.skip_simulation = skip;
	}

	pub fn frame(&self) -> StrandFrame {
		self.buffers.buffers().to_frame(self.frame)
	}

	pub fn frame_message(&self) -> Message {
		Message::FrameUpdate(self.frame())
	}

	pub fn state(&self) -> PipelineState {
		self.state
	}

	pub fn buffers(&self) -> &B {
		&self.buffers
	}

	pub fn topology(&self) -> &StrandTopology {
		&self.solver.topology
	}

	pub fn config_table(&self) -> &ConfigTable {
		&self.solver.configs
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.solver.config
	}

	pub fn colliders(&self) -> &ColliderSet {
		&self.solver.colliders
	}

	pub fn wind(&self) -> &WindForces {
		&self.solver.wind
	}

	pub fn tracker(&self) -> &FrameTransformTracker {
		&self.solver.tracker
	}

	pub fn resources(&self) -> &ResourceSet {
		&self.resources
	}

	pub fn computation_time(&self) -> Duration {
		self.computation_time
	}
}
