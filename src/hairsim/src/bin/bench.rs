use std::time::SystemTime;

use rand::Rng;

use hairsim::collider::{CapsuleObstacle, ObstacleTransform};
use hairsim::config::SimulationConfig;
use hairsim::group::StrandGroupConfig;
use hairsim::pipeline::SimulationBuilder;
use hairsim::store::StrandStore;
use hairsim::topology::StrandTopology;
use hairsim::transform::rigid;
use hairsim::{FrameInput, Iso, Quat, V3};

const STRANDS: usize = 512;
const VERTICES: usize = 16;

// strands hanging from the top of a unit sphere, slightly jittered
fn scalp() -> Vec<Vec<V3>> {
	let mut rng = rand::thread_rng();
	(0..STRANDS)
		.map(|_| {
			let theta = rng.gen_range(0f32..std::f32::consts::TAU);
			let phi = rng.gen_range(0f32..1.2);
			let normal = V3::new(
				phi.sin() * theta.cos(),
				phi.cos(),
				phi.sin() * theta.sin(),
			);
			let mut p = normal;
			let mut dir = normal;
			(0..VERTICES)
				.map(|_| {
					let v = p;
					dir = (dir + V3::new(0., -0.3, 0.)).normalize();
					p += dir * 0.05;
					v
				})
				.collect()
		})
		.collect()
}

fn main() {
	let strands = scalp();
	let types: Vec<u32> = (0..STRANDS as u32).map(|i| i % 2).collect();
	let (topology, rest) =
		StrandTopology::from_rest_strands(&strands, &types).unwrap();
	let store = StrandStore::from_topology(&topology, rest);
	let config = SimulationConfig::default()
		.with_wind(V3::new(1., 0., 0.5), 2.)
		.with_group(StrandGroupConfig::default())
		.with_group(StrandGroupConfig::default().with_local_stiffness(0.5));
	let mut sim = SimulationBuilder::new(config)
		.with_topology(topology)
		.build(store, Iso::identity())
		.unwrap();
	let body = vec![CapsuleObstacle::new(ObstacleTransform::default(), 2.5, 1.)];

	let dt = 1. / 60.;
	let rframes = 100;
	let start = SystemTime::now();
	for frame in 0..rframes {
		let transform = rigid(
			V3::new((frame as f32 * 0.1).sin() * 0.2, 0., 0.),
			Quat::from_axis_angle(&V3::y_axis(), frame as f32 * 0.01),
		);
		sim.step(&FrameInput::new(dt, frame, transform, &body))
			.unwrap();
	}
	let time = rframes as f32 * dt;
	let duration = SystemTime::now().duration_since(start).unwrap().as_micros();
	eprintln!("{:.3}%", duration as f32 / time / 1e4);
}
