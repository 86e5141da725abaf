//! Pull-based traversal of a region file's non-empty slots, in strict or
//! lenient error-handling mode.

use std::path::Path;

use crate::chunk::{ChunkAssembler, ParsedChunk};
use crate::decompress;
use crate::document::DocumentParser;
use crate::error::{Error, Result};
use crate::region::coord::{world_chunk_coordinates, SlotCoord};
use crate::region::{IndexedStorageReader, RegionHeader};
use crate::summary::RegionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterMode {
	/// The first error encountered is returned from `next()` and the
	/// iterator is exhausted.
	Strict,
	/// Per-chunk errors are reported as [FailedChunk] and traversal
	/// continues at the next slot.
	Lenient,
}

/// A slot that failed to decode, yielded in lieu of a [ParsedChunk] when
/// running in [IterMode::Lenient].
#[derive(Debug)]
pub struct FailedChunk {
	pub slot_index: usize,
	pub error: Error,
}

pub enum ChunkResult {
	Ok(ParsedChunk),
	Failed(FailedChunk),
}

pub struct RegionIterator {
	reader: IndexedStorageReader,
	region_coordinates: (i32, i32),
	mode: IterMode,
	next_slot: usize,
	blob_count: usize,
	/// Set once a strict-mode error has been returned from `next()`, so
	/// that the iterator is fused rather than resuming at the following slot.
	exhausted: bool,
}

impl RegionIterator {
	pub fn open(path: impl AsRef<Path>, mode: IterMode) -> Result<Self> {
		let reader = IndexedStorageReader::open(path)?;
		let region_coordinates = reader.region_coordinates()?;
		let blob_count = reader.blob_count();
		Ok(Self { reader, region_coordinates, mode, next_slot: 0, blob_count, exhausted: false })
	}

	pub fn header(&self) -> &RegionHeader {
		self.reader.header()
	}

	pub fn region_coordinates(&self) -> (i32, i32) {
		self.region_coordinates
	}

	/// Decode the next non-empty slot. Returns `None` once every slot has
	/// been visited, or once a [IterMode::Strict] error has been returned —
	/// after that, the iterator is fused and every subsequent call returns
	/// `None` without touching the reader again.
	pub fn next(&mut self) -> Option<Result<ChunkResult>> {
		if self.exhausted {
			return None;
		}

		while self.next_slot < self.blob_count {
			let slot = self.next_slot;
			self.next_slot += 1;

			match self.decode_slot(slot) {
				Ok(Some(chunk)) => return Some(Ok(ChunkResult::Ok(chunk))),
				Ok(None) => continue,
				Err(error) => {
					return match self.mode {
						IterMode::Strict => {
							self.exhausted = true;
							Some(Err(error))
						}
						IterMode::Lenient => {
							tracing::warn!(
								file = %self.reader.path().display(),
								slot,
								%error,
								"skipping chunk after decode failure"
							);
							Some(Ok(ChunkResult::Failed(FailedChunk { slot_index: slot, error })))
						}
					};
				}
			}
		}
		None
	}

	fn decode_slot(&mut self, slot: usize) -> Result<Option<ParsedChunk>> {
		let Some(blob) = self.reader.slot_payload(slot)? else {
			return Ok(None);
		};

		let decompressed = decompress::decompress(&blob.compressed, blob.source_length as usize)
			.map_err(|e| with_slot_context(e, slot))?;

		let root = DocumentParser::parse(&decompressed).map_err(|e| with_slot_context(e, slot))?;

		let slot_coord = SlotCoord::from_index(slot);
		let (chunk_x, chunk_z) = world_chunk_coordinates(self.region_coordinates, slot_coord);

		let chunk =
			ChunkAssembler::assemble(&root, chunk_x, chunk_z).map_err(|e| with_slot_context(e, slot))?;

		Ok(Some(chunk))
	}

	/// Traverse every non-empty slot and aggregate block-name counts,
	/// without retaining per-section data. Chunk-level failures are
	/// skipped regardless of the iterator's configured mode, since a
	/// summary is a best-effort aggregate.
	pub fn summary(&mut self) -> Result<RegionSummary> {
		let mut builder = RegionSummary::builder(self.region_coordinates);
		let saved_slot = self.next_slot;
		self.next_slot = 0;

		while self.next_slot < self.blob_count {
			let slot = self.next_slot;
			self.next_slot += 1;
			match self.decode_slot(slot) {
				Ok(Some(chunk)) => builder.add_chunk(&chunk),
				Ok(None) => continue,
				Err(_) => continue,
			}
		}

		self.next_slot = saved_slot;
		let summary = builder.build();
		tracing::debug!(
			file = %self.reader.path().display(),
			non_empty_slots = summary.non_empty_slots,
			unique_blocks = summary.unique_blocks,
			"summary complete"
		);
		Ok(summary)
	}
}

fn with_slot_context(err: Error, slot: usize) -> Error {
	let mut context = err.context;
	context.slot_index.get_or_insert(slot as u32);
	Error::with_context(err.kind, context)
}
