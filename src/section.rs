//! Decodes one chunk section's hex-encoded block payload: a small header,
//! a palette, and a bit-packed index array.

use std::collections::HashMap;

use crate::cursor::ByteCursor;
use crate::error::{Error, ErrorKind, Result};

pub const VOXELS_PER_SECTION: usize = 32 * 32 * 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteType {
	Empty,
	HalfByte,
	Byte,
	Short,
}

impl PaletteType {
	fn from_tag(tag: u8) -> Result<Self> {
		match tag {
			0 => Ok(Self::Empty),
			1 => Ok(Self::HalfByte),
			2 => Ok(Self::Byte),
			3 => Ok(Self::Short),
			other => Err(Error::new(ErrorKind::UnknownPaletteType(other))),
		}
	}

	fn max_palette_len(self) -> u32 {
		match self {
			PaletteType::Empty => 1,
			PaletteType::HalfByte => 16,
			PaletteType::Byte => 256,
			PaletteType::Short => 65536,
		}
	}
}

#[derive(Debug, Clone)]
pub struct PaletteEntry {
	pub internal_id: u8,
	pub name: String,
	/// Advisory producer-recorded count; not trusted over the histogram.
	pub count: i16,
}

/// A fully decoded 32x32x32 slab of voxels at a fixed vertical index.
#[derive(Debug, Clone)]
pub struct ChunkSection {
	pub y_section: u8,
	pub migration_version: u32,
	pub palette_type: PaletteType,
	pub palette: Vec<PaletteEntry>,
	indices: Vec<u32>,
	pub block_counts: HashMap<String, u64>,
}

impl ChunkSection {
	/// An Empty section with no voxels — used when a chunk's `Sections`
	/// array is shorter than 10, or the palette type declares no entries.
	pub fn empty(y_section: u8) -> Self {
		Self {
			y_section,
			migration_version: 0,
			palette_type: PaletteType::Empty,
			palette: Vec::new(),
			indices: Vec::new(),
			block_counts: HashMap::new(),
		}
	}

	/// The palette index of the voxel at local `(x, y, z)`, each in `0..32`.
	pub fn index_at(&self, x: u32, y: u32, z: u32) -> Option<u32> {
		if self.indices.is_empty() {
			return if self.palette.len() == 1 { Some(0) } else { None };
		}
		self.indices.get(linear_index(x, y, z)).copied()
	}

	/// The palette entry name of the voxel at local `(x, y, z)`, if any.
	pub fn block_name_at(&self, x: u32, y: u32, z: u32) -> Option<&str> {
		let index = self.index_at(x, y, z)?;
		self.palette.get(index as usize).map(|entry| entry.name.as_str())
	}
}

/// `linear = x + z*32 + y*1024`, and its inverse.
pub fn linear_index(x: u32, y: u32, z: u32) -> usize {
	(x + z * 32 + y * 1024) as usize
}

pub fn position_from_linear(linear: usize) -> (u32, u32, u32) {
	let linear = linear as u32;
	let x = linear % 32;
	let z = (linear / 32) % 32;
	let y = linear / 1024;
	(x, y, z)
}

pub struct SectionDecoder;

impl SectionDecoder {
	/// Decode a hex-encoded section payload (as found in a
	/// `Components.Block.Data` string leaf) into a [ChunkSection].
	pub fn decode(hex_str: &str, y_section: u8) -> Result<ChunkSection> {
		let bytes = hex::decode(hex_str.trim())?;
		let mut cursor = ByteCursor::new(&bytes);

		let migration_version = cursor.read_u32_be()?;
		let palette_type = PaletteType::from_tag(cursor.read_u8()?)?;
		let palette_len = cursor.read_u16_be()? as u32;

		if palette_len > palette_type.max_palette_len() {
			return Err(Error::new(ErrorKind::PaletteIndexOutOfRange {
				index: palette_len,
				palette_len: palette_type.max_palette_len(),
			}));
		}

		let mut palette = Vec::with_capacity(palette_len as usize);
		for _ in 0..palette_len {
			let internal_id = cursor.read_u8()?;
			let name_length = cursor.read_u16_be()? as usize;
			let name = String::from_utf8(cursor.read_bytes(name_length)?.to_vec())?;
			let count = cursor.read_i16_be()?;
			palette.push(PaletteEntry { internal_id, name, count });
		}

		let indices = Self::read_indices(&mut cursor, palette_type, palette_len)?;
		let block_counts = Self::histogram(&indices, &palette, palette_type, palette_len);

		Ok(ChunkSection {
			y_section,
			migration_version,
			palette_type,
			palette,
			indices,
			block_counts,
		})
	}

	fn read_indices(
		cursor: &mut ByteCursor<'_>,
		palette_type: PaletteType,
		palette_len: u32,
	) -> Result<Vec<u32>> {
		let indices = match palette_type {
			PaletteType::Empty => Vec::new(),
			PaletteType::HalfByte => {
				let bytes = cursor.read_bytes(VOXELS_PER_SECTION / 2)?;
				let mut out = Vec::with_capacity(VOXELS_PER_SECTION);
				for &byte in bytes {
					out.push(((byte >> 4) & 0x0F) as u32);
					out.push((byte & 0x0F) as u32);
				}
				out
			}
			PaletteType::Byte => {
				let bytes = cursor.read_bytes(VOXELS_PER_SECTION)?;
				bytes.iter().map(|&b| b as u32).collect()
			}
			PaletteType::Short => {
				let mut out = Vec::with_capacity(VOXELS_PER_SECTION);
				for _ in 0..VOXELS_PER_SECTION {
					out.push(cursor.read_u16_be()? as u32);
				}
				out
			}
		};

		for &index in &indices {
			if index >= palette_len {
				return Err(Error::new(ErrorKind::PaletteIndexOutOfRange {
					index,
					palette_len,
				}));
			}
		}

		Ok(indices)
	}

	fn histogram(
		indices: &[u32],
		palette: &[PaletteEntry],
		palette_type: PaletteType,
		palette_len: u32,
	) -> HashMap<String, u64> {
		let mut counts = HashMap::new();

		if palette_type == PaletteType::Empty {
			if palette_len == 1 {
				if let Some(entry) = palette.first() {
					counts.insert(entry.name.clone(), VOXELS_PER_SECTION as u64);
				}
			}
			return counts;
		}

		for &index in indices {
			if let Some(entry) = palette.get(index as usize) {
				*counts.entry(entry.name.clone()).or_insert(0) += 1;
			}
		}
		counts
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hex_section(palette_type: u8, palette: &[(u8, &str, i16)], index_bytes: &[u8]) -> String {
		let mut bytes = 7u32.to_be_bytes().to_vec(); // migration_version
		bytes.push(palette_type);
		bytes.extend_from_slice(&(palette.len() as u16).to_be_bytes());
		for (id, name, count) in palette {
			bytes.push(*id);
			bytes.extend_from_slice(&(name.len() as u16).to_be_bytes());
			bytes.extend_from_slice(name.as_bytes());
			bytes.extend_from_slice(&count.to_be_bytes());
		}
		bytes.extend_from_slice(index_bytes);
		hex::encode(bytes)
	}

	#[test]
	fn single_entry_byte_palette_fills_every_voxel() {
		let index_bytes = vec![0u8; VOXELS_PER_SECTION];
		let hex = hex_section(2, &[(1, "Rock_Stone", 32768)], &index_bytes);
		let section = SectionDecoder::decode(&hex, 0).unwrap();
		assert_eq!(section.block_counts.get("Rock_Stone"), Some(&32768));
		assert_eq!(section.block_name_at(0, 0, 0), Some("Rock_Stone"));
	}

	#[test]
	fn half_byte_packing_reads_high_nibble_first() {
		let mut index_bytes = vec![0u8; VOXELS_PER_SECTION / 2];
		index_bytes[0] = 0x01;
		index_bytes[1] = 0x10;
		index_bytes[2] = 0x11;
		let hex = hex_section(1, &[(0, "A", 0), (1, "B", 0)], &index_bytes);
		let section = SectionDecoder::decode(&hex, 0).unwrap();

		assert_eq!(section.index_at(0, 0, 0), Some(0));
		assert_eq!(section.index_at(1, 0, 0), Some(1));
		assert_eq!(section.index_at(2, 0, 0), Some(1));
		assert_eq!(section.index_at(3, 0, 0), Some(0));
		assert_eq!(section.index_at(4, 0, 0), Some(1));
		assert_eq!(section.index_at(5, 0, 0), Some(1));
	}

	#[test]
	fn short_palette_rejects_out_of_range_index() {
		let mut index_bytes = vec![0u8; VOXELS_PER_SECTION * 2];
		index_bytes[0] = 0x01;
		index_bytes[1] = 0x2C; // 0x012C == 300
		let hex = hex_section(3, &[(1, "A", 0)], &index_bytes);
		let err = SectionDecoder::decode(&hex, 0).unwrap_err();
		assert!(matches!(err.kind, ErrorKind::PaletteIndexOutOfRange { .. }));
	}

	#[test]
	fn linear_index_round_trips() {
		for x in [0u32, 5, 31] {
			for y in [0u32, 9, 31] {
				for z in [0u32, 17, 31] {
					let linear = linear_index(x, y, z);
					assert_eq!(position_from_linear(linear), (x, y, z));
				}
			}
		}
	}
}
