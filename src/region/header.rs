//! The fixed 32-byte header at the start of every region file, and the
//! slot index table that immediately follows it.

use std::io::Read;

use crate::error::{Error, ErrorKind, Result};
use crate::ioext::{read_bytes, ReadExt, Readable};

pub const MAGIC: &[u8; 20] = b"HytaleIndexedStorage";
pub const SUPPORTED_VERSIONS: [u32; 2] = [0, 1];

/// Fixed 20-byte magic, big-endian version, blob count, and segment size.
/// The header occupies the first 32 bytes of the file; the slot index
/// table (`blob_count` big-endian u32 values) follows immediately after.
#[derive(Debug, Clone, Copy)]
pub struct RegionHeader {
	pub version: u32,
	pub blob_count: u32,
	pub segment_size: u32,
}

impl Readable for RegionHeader {
	fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
		let magic = read_bytes(reader, MAGIC.len())?;
		if magic.as_slice() != MAGIC.as_slice() {
			return Err(Error::new(ErrorKind::BadMagic));
		}
		let version: u32 = reader.read_value()?;
		if !SUPPORTED_VERSIONS.contains(&version) {
			return Err(Error::new(ErrorKind::UnsupportedVersion(version)));
		}
		let blob_count: u32 = reader.read_value()?;
		let segment_size: u32 = reader.read_value()?;
		Ok(Self { version, blob_count, segment_size })
	}
}

/// The size in bytes of the fixed header (magic + version + blob_count + segment_size).
pub const HEADER_SIZE: u64 = 20 + 4 + 4 + 4;

/// The sparse slot index table: one big-endian u32 per slot, `0` meaning empty.
#[derive(Debug, Clone)]
pub struct SlotIndex(Vec<u32>);

impl SlotIndex {
	pub fn read_from<R: Read>(reader: &mut R, blob_count: u32) -> Result<Self> {
		let mut slots = Vec::with_capacity(blob_count as usize);
		for _ in 0..blob_count {
			slots.push(reader.read_value()?);
		}
		Ok(Self(slots))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The raw segment pointer at `index`, or `None` if the slot is empty.
	pub fn get(&self, index: usize) -> Option<u32> {
		match self.0.get(index).copied() {
			Some(0) | None => None,
			Some(value) => Some(value),
		}
	}

	/// Slot indices (ascending) that are not empty.
	pub fn nonempty_slots(&self) -> impl Iterator<Item = usize> + '_ {
		self.0.iter().enumerate().filter_map(|(i, &v)| (v != 0).then_some(i))
	}

	/// The byte offset in the file that a segment pointer resolves to.
	///
	/// The mapping is declared opaque at the u32 level by the format; this
	/// implementation treats a non-zero slot value `v` as a 1-based segment
	/// index, placed after the header and slot index table:
	/// `HEADER_SIZE + blob_count * 4 + (v - 1) * segment_size`. See
	/// DESIGN.md for the rationale — there is no alternative source to
	/// check this against, so the choice is recorded rather than derived.
	pub fn segment_offset(&self, slot_value: u32, segment_size: u32) -> u64 {
		let table_size = self.len() as u64 * 4;
		HEADER_SIZE + table_size + (slot_value as u64 - 1) * segment_size as u64
	}
}
