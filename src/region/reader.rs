//! Top-level reader for a `.region.bin` file: validates the header, loads
//! the slot index table, and resolves slot payloads to compressed bytes.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorContext, ErrorKind, Result};
use crate::ioext::{ReadExt, Readable};

use super::coord::parse_region_coordinates;
use super::header::{RegionHeader, SlotIndex};

/// A blob's on-disk framing: declared decompressed size, declared
/// compressed size, and the raw zstd frame bytes.
#[derive(Debug, Clone)]
pub struct Blob {
	pub source_length: u32,
	pub compressed: Vec<u8>,
}

/// Opens a region file, validates its header, and resolves slot payloads
/// on demand. Holds the file handle for its lifetime.
pub struct IndexedStorageReader {
	file: File,
	path: PathBuf,
	header: RegionHeader,
	slot_index: SlotIndex,
	file_len: u64,
}

impl IndexedStorageReader {
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref().to_path_buf();
		let mut file = File::open(&path).map_err(|e| Error::at_path(ErrorKind::Io(e), path.clone()))?;

		let header = RegionHeader::read_from(&mut file).map_err(|e| attach_path(e, &path))?;
		let slot_index =
			SlotIndex::read_from(&mut file, header.blob_count).map_err(|e| attach_path(e, &path))?;

		let file_len = file.metadata().map_err(|e| Error::at_path(ErrorKind::Io(e), path.clone()))?.len();

		tracing::debug!(
			file = %path.display(),
			version = header.version,
			blob_count = header.blob_count,
			segment_size = header.segment_size,
			"opened region file"
		);

		Ok(Self { file, path, header, slot_index, file_len })
	}

	pub fn header(&self) -> &RegionHeader {
		&self.header
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn region_coordinates(&self) -> Result<(i32, i32)> {
		parse_region_coordinates(&self.path)
	}

	pub fn blob_count(&self) -> usize {
		self.slot_index.len()
	}

	/// Resolve slot `index` to its compressed payload, or `None` if the
	/// slot is empty.
	pub fn slot_payload(&mut self, index: usize) -> Result<Option<Blob>> {
		let Some(slot_value) = self.slot_index.get(index) else {
			return Ok(None);
		};

		let offset = self.slot_index.segment_offset(slot_value, self.header.segment_size);
		// The blob framing header (source_length + compressed_length) must itself fit
		// before the file end; a pointer that fails this is corrupt or out of bounds,
		// not merely a short read, so it gets its own error kind rather than a
		// generic io::UnexpectedEof once we start reading.
		let fits = matches!(offset.checked_add(8), Some(end) if end <= self.file_len);
		if !fits {
			return Err(Error::at_slot(ErrorKind::BadSegmentPointer, index as u32));
		}

		self.file
			.seek(SeekFrom::Start(offset))
			.map_err(|e| self.io_error_at(e, offset))?;

		let source_length: u32 = self
			.file
			.read_value()
			.map_err(|e| self.context_error(e, offset))?;
		let compressed_length: u32 = self
			.file
			.read_value()
			.map_err(|e| self.context_error(e, offset + 4))?;

		let mut compressed = vec![0u8; compressed_length as usize];
		self.file
			.read_exact(&mut compressed)
			.map_err(|e| self.io_error_at(e, offset + 8))?;

		Ok(Some(Blob { source_length, compressed }))
	}

	/// Non-empty slot indices in ascending order together with their
	/// resolved blob payload.
	pub fn iter_nonempty_slots(&mut self) -> Result<Vec<(usize, Blob)>> {
		let slots: Vec<usize> = self.slot_index.nonempty_slots().collect();
		let mut blobs = Vec::with_capacity(slots.len());
		for slot in slots {
			if let Some(blob) = self.slot_payload(slot)? {
				blobs.push((slot, blob));
			}
		}
		Ok(blobs)
	}

	fn io_error_at(&self, err: std::io::Error, offset: u64) -> Error {
		Error::with_context(
			ErrorKind::Io(err),
			ErrorContext::new().with_path(self.path.clone()).with_offset(offset),
		)
	}

	fn context_error(&self, err: Error, offset: u64) -> Error {
		Error::with_context(
			err.kind,
			ErrorContext::new().with_path(self.path.clone()).with_offset(offset),
		)
	}
}

fn attach_path(err: Error, path: &Path) -> Error {
	let mut context = err.context;
	context.path.get_or_insert_with(|| path.to_path_buf());
	Error::with_context(err.kind, context)
}
