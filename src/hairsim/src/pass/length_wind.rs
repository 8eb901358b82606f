// length and wind: gusts push segments sideways, then segment lengths are
// projected back to rest

use crate::pass::{for_each_strand, Pass, PassContext};
use crate::store::StrandMut;
use crate::wind::WindForces;
use crate::V3;

/// Moves `p0`, `p1` back toward `rest` apart. An anchored `p0` stays put.
pub fn solve_length(p0: &mut V3, p1: &mut V3, rest: f32, anchored: bool) {
	let delta = *p1 - *p0;
	let l = delta.magnitude();
	if !l.is_normal() {
		return;
	}
	let correct = delta * (1. - rest / l);
	if anchored {
		*p1 -= correct;
	} else {
		*p0 += correct * 0.5;
		*p1 -= correct * 0.5;
	}
}

/// Sum of the gust components perpendicular to segment direction `v`.
pub fn wind_acceleration(v: &V3, wind: &WindForces) -> V3 {
	let mut a = V3::zeros();
	for f in wind.forces.iter() {
		let w = f.xyz();
		a += w - v * v.dot(&w);
	}
	a
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LengthWindPass;

impl Pass for LengthWindPass {
	fn name(&self) -> &'static str {
		"length_wind"
	}

	fn run(&self, ctx: &PassContext, strands: &mut [StrandMut]) {
		let rest_lengths = ctx.topology.rest_lengths();
		let dt2 = ctx.dt * ctx.dt;
		let calm = ctx.wind.is_calm();
		for_each_strand(strands, |s| {
			let n = s.len();
			if n < 2 {
				return;
			}
			let first = s.first;
			let pos = &mut *s.position;
			if !calm {
				for i in 1..n {
					let v = match (pos[i] - pos[i - 1]).try_normalize(1e-12) {
						Some(v) => v,
						None => continue,
					};
					// tips flutter more than roots
					let weight = i as f32 / (n - 1) as f32;
					pos[i] += wind_acceleration(&v, &ctx.wind) * (weight * dt2);
				}
			}
			for _ in 0..ctx.length_iterations {
				for i in 0..n - 1 {
					let (a, b) = pos.split_at_mut(i + 1);
					solve_length(&mut a[i], &mut b[0], rest_lengths[first + i], i == 0);
				}
			}
		});
	}
}
