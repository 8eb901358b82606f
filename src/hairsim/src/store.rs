// store: per vertex position history
//
// `previous` is written by the integration pass from the value `position`
// had before integrating, so after every full frame it holds last frame's
// position. Only pipeline passes write these buffers.

use protocol::pr_strand::StrandFrame;

use crate::topology::StrandTopology;
use crate::V3;

pub struct PositionBuffers<'a> {
	pub initial: &'a [V3],
	pub position: &'a mut [V3],
	pub previous: &'a mut [V3],
	pub tangent: &'a mut [V3],
}

pub struct PositionView<'a> {
	pub initial: &'a [V3],
	pub position: &'a [V3],
	pub previous: &'a [V3],
	pub tangent: &'a [V3],
}

/// Capability the pipeline needs from whatever owns the vertex buffers.
pub trait StrandBuffers {
	fn vertex_count(&self) -> usize;

	fn strand_count(&self) -> usize;

	fn buffers(&self) -> PositionView<'_>;

	fn buffers_mut(&mut self) -> PositionBuffers<'_>;

	fn commit_frame(&mut self) {}
}

pub struct StrandMut<'a> {
	pub index: usize,
	pub first: usize,
	pub initial: &'a [V3],
	pub position: &'a mut [V3],
	pub previous: &'a mut [V3],
	pub tangent: &'a mut [V3],
}

impl<'a> StrandMut<'a> {
	pub fn len(&self) -> usize {
		self.position.len()
	}

	pub fn is_empty(&self) -> bool {
		self.position.is_empty()
	}
}

impl<'a> PositionBuffers<'a> {
	/// Splits the buffers into disjoint per strand views.
	pub fn split_strands(self, topology: &StrandTopology) -> Vec<StrandMut<'a>> {
		let mut result = Vec::with_capacity(topology.strand_count());
		self.split_strands_into(topology, &mut result);
		result
	}

	/// Same as `split_strands`, appending to `out` so its capacity is reused.
	pub fn split_strands_into(
		self,
		topology: &StrandTopology,
		out: &mut Vec<StrandMut<'a>>,
	) {
		out.reserve(topology.strand_count());
		let mut initial = self.initial;
		let mut position = self.position;
		let mut previous = self.previous;
		let mut tangent = self.tangent;
		for (index, range) in topology.strand_ranges().enumerate() {
			let n = range.len();
			let (i0, i1) = initial.split_at(n);
			let (p0, p1) = std::mem::take(&mut position).split_at_mut(n);
			let (q0, q1) = std::mem::take(&mut previous).split_at_mut(n);
			let (t0, t1) = std::mem::take(&mut tangent).split_at_mut(n);
			initial = i1;
			position = p1;
			previous = q1;
			tangent = t1;
			out.push(StrandMut {
				index,
				first: range.start,
				initial: i0,
				position: p0,
				previous: q0,
				tangent: t0,
			});
		}
	}
}

impl<'a> PositionView<'a> {
	pub fn to_frame(&self, frame: u64) -> StrandFrame {
		StrandFrame {
			frame,
			positions: self.position.iter().map(|&p| p.into()).collect(),
			previous: self.previous.iter().map(|&p| p.into()).collect(),
			tangents: self.tangent.iter().map(|&p| p.into()).collect(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct StrandStore {
	strand_count: usize,
	initial: Vec<V3>,
	position: Vec<V3>,
	previous: Vec<V3>,
	tangent: Vec<V3>,
	committed: u64,
}

impl StrandStore {
	pub fn new(initial: Vec<V3>, strand_count: usize) -> Self {
		let n = initial.len();
		Self {
			strand_count,
			position: initial.clone(),
			previous: initial.clone(),
			initial,
			tangent: vec![V3::zeros(); n],
			committed: 0,
		}
	}

	pub fn from_topology(topology: &StrandTopology, initial: Vec<V3>) -> Self {
		Self::new(initial, topology.strand_count())
	}

	pub fn initial(&self) -> &[V3] {
		&self.initial
	}

	pub fn positions(&self) -> &[V3] {
		&self.position
	}

	pub fn previous(&self) -> &[V3] {
		&self.previous
	}

	pub fn tangents(&self) -> &[V3] {
		&self.tangent
	}

	pub fn committed_frames(&self) -> u64 {
		self.committed
	}

	// test hook: displace the simulated state of one vertex
	#[cfg(test)]
	pub(crate) fn set_position(&mut self, idx: usize, p: V3) {
		self.position[idx] = p;
	}
}

impl StrandBuffers for StrandStore {
	fn vertex_count(&self) -> usize {
		self.initial.len()
	}

	fn strand_count(&self) -> usize {
		self.strand_count
	}

	fn buffers(&self) -> PositionView<'_> {
		PositionView {
			initial: &self.initial,
			position: &self.position,
			previous: &self.previous,
			tangent: &self.tangent,
		}
	}

	fn buffers_mut(&mut self) -> PositionBuffers<'_> {
		PositionBuffers {
			initial: &self.initial,
			position: &mut self.position,
			previous: &mut self.previous,
			tangent: &mut self.tangent,
		}
	}

	fn commit_frame(&mut self) {
		self.committed += 1;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::topology::test::straight_strand;

	#[test]
	fn test_split_strands_disjoint() {
		let strands = vec![
			straight_strand(3, V3::zeros(), V3::new(0., -1., 0.)),
			straight_strand(2, V3::new(2., 0., 0.), V3::new(0., -1., 0.)),
		];
		let (t, rest) =
			StrandTopology::from_rest_strands(&strands, &[0, 0]).unwrap();
		let mut store = StrandStore::from_topology(&t, rest);
		{
			let mut views = store.buffers_mut().split_strands(&t);
			assert_eq!(views.len(), 2);
			assert_eq!(views[0].len(), 3);
			assert_eq!(views[1].len(), 2);
			assert_eq!(views[1].first, 3);
			assert_eq!(views[1].initial[0], V3::new(2., 0., 0.));
			views[1].position[1] = V3::new(9., 9., 9.);
		}
		assert_eq!(store.positions()[4], V3::new(9., 9., 9.));
		assert_eq!(store.positions()[3], V3::new(2., 0., 0.));
	}

	#[test]
	fn test_new_store_at_rest() {
		let rest = straight_strand(4, V3::zeros(), V3::new(0., -1., 0.));
		let store = StrandStore::new(rest.clone(), 1);
		assert_eq!(store.positions(), &rest[..]);
		assert_eq!(store.previous(), &rest[..]);
		assert_eq!(store.committed_frames(), 0);
		let frame = store.buffers().to_frame(7);
		assert_eq!(frame.frame, 7);
		assert_eq!(frame.vertex_count(), 4);
		assert_eq!(frame.positions[3], [0., -3., 0.]);
	}
}
