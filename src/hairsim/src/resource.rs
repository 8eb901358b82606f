// resource: compute buffer mirror of the simulation inputs
//
// Static buffers are uploaded once when the simulation is built. The
// collider buffer follows the collider count and only exists while there
// is at least one collider. The wind buffer always holds four samples and
// is overwritten every frame.

use std::mem::size_of;

use bytemuck::Pod;
use fnv::FnvHashMap;
use protocol::layout::{
	ColliderRecord, ConfigRecord, RawQuat, RawVec3, RestLength, VertexOffset,
	WindRecord,
};
use tracing::{debug, info};

use crate::group::ConfigTable;
use crate::topology::StrandTopology;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
	RestLengths,
	GlobalRotations,
	LocalRotations,
	References,
	VertexOffsets,
	StrandTypes,
	Config,
	Colliders,
	Wind,
}

impl BufferKind {
	pub fn stride(self) -> usize {
		use BufferKind::*;
		match self {
			RestLengths => size_of::<RestLength>(),
			GlobalRotations | LocalRotations => size_of::<RawQuat>(),
			References => size_of::<RawVec3>(),
			VertexOffsets => size_of::<VertexOffset>(),
			StrandTypes => size_of::<u32>(),
			Config => size_of::<ConfigRecord>(),
			Colliders => size_of::<ColliderRecord>(),
			Wind => size_of::<WindRecord>(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct GpuBuffer {
	stride: usize,
	data: Vec<u8>,
}

impl GpuBuffer {
	pub fn count(&self) -> usize {
		self.data.len() / self.stride
	}

	pub fn stride(&self) -> usize {
		self.stride
	}

	pub fn bytes(&self) -> &[u8] {
		&self.data
	}

	pub fn read<T: Pod>(&self) -> Vec<T> {
		debug_assert_eq!(size_of::<T>(), self.stride);
		self.data
			.chunks_exact(self.stride)
			.map(bytemuck::pod_read_unaligned)
			.collect()
	}
}

#[derive(Debug, Default)]
pub struct ResourceSet {
	buffers: FnvHashMap<BufferKind, GpuBuffer>,
}

impl ResourceSet {
	pub fn upload_static(topology: &StrandTopology, configs: &ConfigTable) -> Self {
		let mut result = Self::default();
		let global: Vec<RawQuat> =
			topology.global_rotations().iter().map(|&q| q.into()).collect();
		let local: Vec<RawQuat> =
			topology.local_rotations().iter().map(|&q| q.into()).collect();
		let refs: Vec<RawVec3> =
			topology.references().iter().map(|&v| v.into()).collect();
		result.allocate(BufferKind::RestLengths, topology.rest_lengths());
		result.allocate(BufferKind::GlobalRotations, &global);
		result.allocate(BufferKind::LocalRotations, &local);
		result.allocate(BufferKind::References, &refs);
		result.allocate(BufferKind::VertexOffsets, topology.offsets());
		result.allocate(BufferKind::StrandTypes, topology.strand_types());
		result.allocate(BufferKind::Config, configs.records());
		result.allocate(BufferKind::Wind, &[WindRecord::default(); 4]);
		info!(
			buffers = result.buffers.len(),
			bytes = result.bytes_allocated(),
			"static buffers uploaded"
		);
		result
	}

	pub fn allocate<T: Pod>(&mut self, kind: BufferKind, data: &[T]) {
		debug_assert_eq!(size_of::<T>(), kind.stride());
		let buffer = GpuBuffer {
			stride: kind.stride(),
			data: bytemuck::cast_slice(data).to_vec(),
		};
		self.buffers.insert(kind, buffer);
	}

	pub fn upload_colliders(&mut self, colliders: &[ColliderRecord]) {
		if colliders.is_empty() {
			self.release(BufferKind::Colliders);
			return;
		}
		let bytes: &[u8] = bytemuck::cast_slice(colliders);
		match self.buffers.get_mut(&BufferKind::Colliders) {
			Some(b) if b.data.len() == bytes.len() => {
				b.data.copy_from_slice(bytes);
			}
			_ => {
				info!(count = colliders.len(), "collider buffer reallocated");
				self.allocate(BufferKind::Colliders, colliders);
			}
		}
	}

	pub fn upload_wind(&mut self, wind: &[WindRecord; 4]) {
		let bytes: &[u8] = bytemuck::cast_slice(wind);
		match self.buffers.get_mut(&BufferKind::Wind) {
			Some(b) => b.data.copy_from_slice(bytes),
			None => self.allocate(BufferKind::Wind, wind),
		}
	}

	/// Releasing a buffer that was never allocated is a no-op.
	pub fn release(&mut self, kind: BufferKind) -> bool {
		let released = self.buffers.remove(&kind).is_some();
		if released {
			debug!(?kind, "buffer released");
		}
		released
	}

	pub fn release_all(&mut self) {
		self.buffers.clear();
	}

	pub fn get(&self, kind: BufferKind) -> Option<&GpuBuffer> {
		self.buffers.get(&kind)
	}

	pub fn is_allocated(&self, kind: BufferKind) -> bool {
		self.buffers.contains_key(&kind)
	}

	pub fn len(&self) -> usize {
		self.buffers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buffers.is_empty()
	}

	pub fn bytes_allocated(&self) -> usize {
		self.buffers.values().map(|b| b.data.len()).sum()
	}
}

impl Drop for ResourceSet {
	fn drop(&mut self) {
		if !self.buffers.is_empty() {
			debug!(buffers = self.buffers.len(), "releasing buffers");
		}
		self.release_all();
	}
}
