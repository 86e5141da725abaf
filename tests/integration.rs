//! End-to-end test: assembles an in-memory region file (header, slot
//! index, and one real Zstandard-compressed blob containing a hand-built
//! document with one section and one container) and drives
//! [RegionIterator] over it.

use hytale_region::iterator::{ChunkResult, IterMode, RegionIterator};
use hytale_region::region::header::MAGIC;

const TAG_END: u8 = 0x00;
const TAG_STRING: u8 = 0x02;
const TAG_DOCUMENT: u8 = 0x03;
const TAG_ARRAY: u8 = 0x04;
const TAG_INT32: u8 = 0x10;

/// A tiny by-hand encoder for the binary-document dialect, independent of
/// `DocumentParser`, so the test actually exercises round-trip decoding
/// rather than asserting a parser agrees with itself.
struct DocBuilder {
	entries: Vec<u8>,
}

impl DocBuilder {
	fn new() -> Self {
		Self { entries: Vec::new() }
	}

	fn push_entry(&mut self, tag: u8, key: &str, value: Vec<u8>) -> &mut Self {
		self.entries.push(tag);
		self.entries.extend_from_slice(key.as_bytes());
		self.entries.push(0);
		self.entries.extend_from_slice(&value);
		self
	}

	fn int32(&mut self, key: &str, value: i32) -> &mut Self {
		self.push_entry(TAG_INT32, key, value.to_le_bytes().to_vec())
	}

	fn string(&mut self, key: &str, value: &str) -> &mut Self {
		let mut bytes = ((value.len() + 1) as i32).to_le_bytes().to_vec();
		bytes.extend_from_slice(value.as_bytes());
		bytes.push(0);
		self.push_entry(TAG_STRING, key, bytes)
	}

	fn document(&mut self, key: &str, child: DocBuilder) -> &mut Self {
		self.push_entry(TAG_DOCUMENT, key, child.finish())
	}

	fn array(&mut self, key: &str, items: Vec<DocBuilder>) -> &mut Self {
		let mut array_body = DocBuilder::new();
		for (index, item) in items.into_iter().enumerate() {
			array_body.document(&index.to_string(), item);
		}
		self.push_entry(TAG_ARRAY, key, array_body.finish())
	}

	/// Finalize into a sized document: 4-byte LE size prefix + entries + end sentinel.
	fn finish(mut self) -> Vec<u8> {
		self.entries.push(TAG_END);
		let mut out = (self.entries.len() as u32).to_le_bytes().to_vec();
		out.extend_from_slice(&self.entries);
		out
	}
}

fn hex_section_single_entry(name: &str) -> String {
	let mut bytes = 0u32.to_be_bytes().to_vec(); // migration_version
	bytes.push(2); // palette_type = Byte
	bytes.extend_from_slice(&1u16.to_be_bytes()); // palette length
	bytes.push(1); // internal_id
	bytes.extend_from_slice(&(name.len() as u16).to_be_bytes());
	bytes.extend_from_slice(name.as_bytes());
	bytes.extend_from_slice(&32768i16.to_be_bytes()); // advisory count
	bytes.extend_from_slice(&vec![0u8; 32768]); // index array: every voxel is entry 0
	hex::encode(bytes)
}

fn build_chunk_document() -> Vec<u8> {
	let mut section0 = DocBuilder::new();
	let mut block = DocBuilder::new();
	block.string("Data", &hex_section_single_entry("Rock_Stone"));
	section0.document("Block", block);

	let mut chunk_column = DocBuilder::new();
	chunk_column.array("Sections", vec![section0]);

	let mut item = DocBuilder::new();
	item.string("Id", "Ore_Copper");
	item.int32("Quantity", 4);

	let mut container = DocBuilder::new();
	container.int32("capacity", 18);
	container.array("items", vec![item]);

	let mut component_tree = DocBuilder::new();
	component_tree.document("container", container);

	let mut block_components = DocBuilder::new();
	block_components.document("65", component_tree);

	let mut block_component_chunk = DocBuilder::new();
	block_component_chunk.document("BlockComponents", block_components);

	let mut components = DocBuilder::new();
	components.document("ChunkColumn", chunk_column);
	components.document("BlockComponentChunk", block_component_chunk);

	let mut root = DocBuilder::new();
	root.int32("Version", 1);
	root.document("Components", components);
	root.finish()
}

fn build_region_file() -> Vec<u8> {
	let blob_count = 4u32;
	let segment_size = 4096u32;

	let document_bytes = build_chunk_document();
	let compressed = zstd::stream::encode_all(document_bytes.as_slice(), 0).unwrap();

	let mut file = MAGIC.to_vec();
	file.extend_from_slice(&1u32.to_be_bytes());
	file.extend_from_slice(&blob_count.to_be_bytes());
	file.extend_from_slice(&segment_size.to_be_bytes());

	// Slot 0 (local (0,0)) points at segment 1; all others empty.
	let mut slot_table = vec![0u32; blob_count as usize];
	slot_table[0] = 1;
	for value in &slot_table {
		file.extend_from_slice(&value.to_be_bytes());
	}

	let header_and_table_size = file.len() as u64;
	let segment_start = header_and_table_size; // (1 - 1) * segment_size
	file.resize(segment_start as usize, 0);
	file.extend_from_slice(&(document_bytes.len() as u32).to_be_bytes());
	file.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
	file.extend_from_slice(&compressed);

	file
}

fn write_temp_region_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
	let dir = std::env::temp_dir().join(format!("hytale-region-integration-{}", std::process::id()));
	std::fs::create_dir_all(&dir).unwrap();
	let path = dir.join(name);
	std::fs::write(&path, bytes).unwrap();
	path
}

#[test]
fn decodes_a_single_chunk_with_a_container() {
	let bytes = build_region_file();
	let path = write_temp_region_file("0.0.region.bin", &bytes);

	let mut iterator = RegionIterator::open(&path, IterMode::Strict).unwrap();
	assert_eq!(iterator.region_coordinates(), (0, 0));

	let mut chunks = Vec::new();
	while let Some(result) = iterator.next() {
		match result.unwrap() {
			ChunkResult::Ok(chunk) => chunks.push(chunk),
			ChunkResult::Failed(failed) => panic!("unexpected failure: {:?}", failed.error),
		}
	}

	assert_eq!(chunks.len(), 1);
	let chunk = &chunks[0];
	assert_eq!((chunk.chunk_x, chunk.chunk_z), (0, 0));
	assert_eq!(chunk.version, 1);
	assert_eq!(chunk.block_names, vec!["Rock_Stone".to_owned()]);

	assert_eq!(chunk.containers.len(), 1);
	let container = &chunk.containers[0];
	assert_eq!(container.world_position, (1, 0, 2));
	assert_eq!(container.capacity, 18);
	assert_eq!(container.items.len(), 1);
	assert_eq!(container.items[0].id.as_deref(), Some("Ore_Copper"));
	assert_eq!(container.items[0].quantity, Some(4));

	std::fs::remove_file(&path).ok();
}

#[test]
fn summary_aggregates_the_single_section() {
	let bytes = build_region_file();
	let path = write_temp_region_file("4.4.region.bin", &bytes);

	let mut iterator = RegionIterator::open(&path, IterMode::Strict).unwrap();
	let summary = iterator.summary().unwrap();
	assert_eq!(summary.non_empty_slots, 1);
	assert_eq!(summary.unique_blocks, 1);
	assert_eq!(summary.block_counts.get("Rock_Stone"), Some(&32768));

	std::fs::remove_file(&path).ok();
}

#[test]
fn empty_region_yields_no_chunks() {
	let blob_count = 8u32;
	let segment_size = 1024u32;
	let mut file = MAGIC.to_vec();
	file.extend_from_slice(&1u32.to_be_bytes());
	file.extend_from_slice(&blob_count.to_be_bytes());
	file.extend_from_slice(&segment_size.to_be_bytes());
	for _ in 0..blob_count {
		file.extend_from_slice(&0u32.to_be_bytes());
	}

	let path = write_temp_region_file("2.-5.region.bin", &file);
	let mut iterator = RegionIterator::open(&path, IterMode::Strict).unwrap();
	assert_eq!(iterator.region_coordinates(), (2, -5));
	assert!(iterator.next().is_none());

	let summary = iterator.summary().unwrap();
	assert_eq!(summary.unique_blocks, 0);
	assert_eq!(summary.non_empty_slots, 0);

	std::fs::remove_file(&path).ok();
}

#[test]
fn bad_magic_fails_to_open() {
	let mut file = MAGIC.to_vec();
	file[19] = b'_';
	file.extend_from_slice(&1u32.to_be_bytes());
	file.extend_from_slice(&0u32.to_be_bytes());
	file.extend_from_slice(&0u32.to_be_bytes());

	let path = write_temp_region_file("3.3.region.bin", &file);
	let err = RegionIterator::open(&path, IterMode::Strict).unwrap_err();
	assert!(matches!(err.kind, hytale_region::ErrorKind::BadMagic));

	std::fs::remove_file(&path).ok();
}
