// topology: static per strand and per vertex data, fixed after load

use std::ops::Range;

use crate::{HairError, HairResult, Quat, V3};

pub const STRANDS_PER_GROUP: usize = 2;
pub const VERTICES_PER_GROUP: usize = 64;
pub const MAX_VERTICES_PER_STRAND: usize = 32;

/// Raw initialization input as delivered by an importer.
///
/// `offsets[s]` is the index of the first vertex of strand `s`.
/// `rest_lengths[v]` and `references[v]` describe the segment from `v`
/// to `v + 1` and are zero on the last vertex of a strand.
#[derive(Clone, Debug, Default)]
pub struct StrandImport {
	pub rest_lengths: Vec<f32>,
	pub references: Vec<V3>,
	pub offsets: Vec<u32>,
	pub local_rotations: Vec<Quat>,
	pub global_rotations: Vec<Quat>,
	pub strand_types: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct StrandTopology {
	vertex_count: usize,
	rest_lengths: Vec<f32>,
	references: Vec<V3>,
	offsets: Vec<u32>,
	local_rotations: Vec<Quat>,
	global_rotations: Vec<Quat>,
	strand_types: Vec<u32>,
}

fn check_len(what: &'static str, expected: usize, found: usize) -> HairResult<()> {
	if expected != found {
		return Err(HairError::BufferMismatch {
			what,
			expected,
			found,
		});
	}
	Ok(())
}

// frame whose x axis points along `dir`
fn frame_along(dir: V3) -> Quat {
	Quat::rotation_between(&V3::x(), &dir).unwrap_or_else(|| {
		Quat::from_axis_angle(&V3::y_axis(), std::f32::consts::PI)
	})
}

impl StrandTopology {
	pub fn new(import: StrandImport) -> HairResult<Self> {
		let vertex_count = import.rest_lengths.len();
		check_len("reference vectors", vertex_count, import.references.len())?;
		check_len(
			"local rotations",
			vertex_count,
			import.local_rotations.len(),
		)?;
		check_len(
			"global rotations",
			vertex_count,
			import.global_rotations.len(),
		)?;
		check_len(
			"strand types",
			import.offsets.len(),
			import.strand_types.len(),
		)?;

		if import.rest_lengths.iter().any(|l| !l.is_finite() || *l < 0.)
			|| import.references.iter().any(|r| !r.iter().all(|x| x.is_finite()))
		{
			return Err(HairError::InvalidTopology(
				"rest data must be finite and non-negative".into(),
			));
		}

		match import.offsets.first() {
			None if vertex_count > 0 => {
				return Err(HairError::InvalidTopology(format!(
					"{} vertices but no strands",
					vertex_count
				)))
			}
			Some(&first) if first != 0 => {
				return Err(HairError::InvalidTopology(format!(
					"first strand starts at vertex {}",
					first
				)))
			}
			_ => {}
		}
		let result = Self {
			vertex_count,
			rest_lengths: import.rest_lengths,
			references: import.references,
			offsets: import.offsets,
			local_rotations: import.local_rotations,
			global_rotations: import.global_rotations,
			strand_types: import.strand_types,
		};
		for s in 0..result.strand_count() {
			let start = result.offsets[s] as usize;
			let end = result.strand_end(s);
			if end <= start || end > vertex_count {
				return Err(HairError::InvalidTopology(format!(
					"strand {} has an empty or out of range vertex span {}..{}",
					s, start, end
				)));
			}
			if end - start > MAX_VERTICES_PER_STRAND {
				return Err(HairError::InvalidTopology(format!(
					"strand {} has {} vertices, at most {} are supported",
					s,
					end - start,
					MAX_VERTICES_PER_STRAND
				)));
			}
		}
		Ok(result)
	}

	/// Derives the full topology from rest positions, one `Vec` per strand.
	///
	/// Returns the topology and the flattened rest positions.
	pub fn from_rest_strands(
		strands: &[Vec<V3>],
		strand_types: &[u32],
	) -> HairResult<(Self, Vec<V3>)> {
		check_len("strand types", strands.len(), strand_types.len())?;
		let mut import = StrandImport {
			strand_types: strand_types.to_vec(),
			..Default::default()
		};
		let mut positions = Vec::new();
		for strand in strands.iter() {
			import.offsets.push(positions.len() as u32);
			let n = strand.len();
			let mut parent = Quat::identity();
			for (i, &x) in strand.iter().enumerate() {
				let frame = if i + 1 < n {
					frame_along(strand[i + 1] - x)
				} else {
					parent
				};
				let local = if i == 0 {
					frame
				} else {
					parent.inverse() * frame
				};
				let (length, reference) = if i + 1 < n {
					let d = strand[i + 1] - x;
					(d.magnitude(), frame.inverse_transform_vector(&d))
				} else {
					(0., V3::zeros())
				};
				import.rest_lengths.push(length);
				import.references.push(reference);
				import.global_rotations.push(frame);
				import.local_rotations.push(local);
				positions.push(x);
				parent = frame;
			}
		}
		Ok((Self::new(import)?, positions))
	}

	pub fn vertex_count(&self) -> usize {
		self.vertex_count
	}

	pub fn strand_count(&self) -> usize {
		self.offsets.len()
	}

	fn strand_end(&self, strand: usize) -> usize {
		self.offsets
			.get(strand + 1)
			.map(|&o| o as usize)
			.unwrap_or(self.vertex_count)
	}

	pub fn strand_range(&self, strand: usize) -> Range<usize> {
		self.offsets[strand] as usize..self.strand_end(strand)
	}

	pub fn strand_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
		(0..self.strand_count()).map(move |s| self.strand_range(s))
	}

	pub fn dispatch_groups(&self) -> usize {
		(self.strand_count() + STRANDS_PER_GROUP - 1) / STRANDS_PER_GROUP
	}

	pub fn rest_lengths(&self) -> &[f32] {
		&self.rest_lengths
	}

	pub fn references(&self) -> &[V3] {
		&self.references
	}

	pub fn offsets(&self) -> &[u32] {
		&self.offsets
	}

	pub fn local_rotations(&self) -> &[Quat] {
		&self.local_rotations
	}

	pub fn global_rotations(&self) -> &[Quat] {
		&self.global_rotations
	}

	pub fn strand_types(&self) -> &[u32] {
		&self.strand_types
	}
}

#[cfg(test)]
pub(crate) mod test {
	use super::*;
	use approx::assert_relative_eq;

	pub(crate) fn straight_strand(n: usize, root: V3, step: V3) -> Vec<V3> {
		(0..n).map(|i| root + step * i as f32).collect()
	}

	fn bent_strand() -> Vec<V3> {
		vec![
			V3::new(0., 0., 0.),
			V3::new(0., -1., 0.),
			V3::new(0.5, -1.5, 0.),
			V3::new(0.5, -2.5, 0.5),
		]
	}

	#[test]
	fn test_from_rest_strands_ranges() {
		let strands = vec![
			straight_strand(4, V3::zeros(), V3::new(0., -1., 0.)),
			straight_strand(2, V3::new(1., 0., 0.), V3::new(0., -1., 0.)),
		];
		let (t, pos) = StrandTopology::from_rest_strands(&strands, &[0, 1])
			.unwrap();
		assert_eq!(t.vertex_count(), 6);
		assert_eq!(pos.len(), 6);
		assert_eq!(t.strand_count(), 2);
		assert_eq!(t.strand_range(0), 0..4);
		assert_eq!(t.strand_range(1), 4..6);
		assert_eq!(t.offsets(), &[0, 4]);
		assert_eq!(t.dispatch_groups(), 1);
		assert_relative_eq!(t.rest_lengths()[0], 1.0, epsilon = 1e-6);
		assert_eq!(t.rest_lengths()[3], 0.);
	}

	#[test]
	fn test_frames_reproduce_rest_shape() {
		let strand = bent_strand();
		let (t, pos) =
			StrandTopology::from_rest_strands(&[strand], &[0]).unwrap();
		let g = t.global_rotations();
		let l = t.local_rotations();
		for i in 0..pos.len() - 1 {
			let d = g[i] * t.references()[i];
			assert_relative_eq!(d, pos[i + 1] - pos[i], epsilon = 1e-5);
			assert_relative_eq!(
				d.magnitude(),
				t.rest_lengths()[i],
				epsilon = 1e-5
			);
		}
		for i in 1..pos.len() {
			let chained = g[i - 1] * l[i];
			assert!(chained.angle_to(&g[i]) < 1e-4);
		}
	}

	#[test]
	fn test_rejects_bad_offsets() {
		let strand = straight_strand(3, V3::zeros(), V3::new(0., -1., 0.));
		let (t, _) = StrandTopology::from_rest_strands(&[strand], &[0]).unwrap();
		let import = StrandImport {
			rest_lengths: t.rest_lengths().to_vec(),
			references: t.references().to_vec(),
			offsets: vec![0, 2, 1],
			local_rotations: t.local_rotations().to_vec(),
			global_rotations: t.global_rotations().to_vec(),
			strand_types: vec![0, 0, 0],
		};
		assert!(matches!(
			StrandTopology::new(import),
			Err(HairError::InvalidTopology(_))
		));
	}

	#[test]
	fn test_rejects_long_strand() {
		let strand = straight_strand(
			MAX_VERTICES_PER_STRAND + 1,
			V3::zeros(),
			V3::new(0., -0.1, 0.),
		);
		assert!(matches!(
			StrandTopology::from_rest_strands(&[strand], &[0]),
			Err(HairError::InvalidTopology(_))
		));
	}

	#[test]
	fn test_rejects_length_mismatch() {
		let import = StrandImport {
			rest_lengths: vec![1., 0.],
			references: vec![V3::x()],
			offsets: vec![0],
			local_rotations: vec![Quat::identity(); 2],
			global_rotations: vec![Quat::identity(); 2],
			strand_types: vec![0],
		};
		assert!(matches!(
			StrandTopology::new(import),
			Err(HairError::BufferMismatch { .. })
		));
	}
}
