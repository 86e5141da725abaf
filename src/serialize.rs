//! JSON serialization of [ParsedChunk] and [RegionSummary] for the CLI's
//! output files, and of the document tree for pass-through entity data.
//!
//! Chunk output keys every recorded voxel and component by its world
//! position as `"x,y,z"`, matching the external interface's requirement
//! that consumers not rely on key ordering.

use serde_json::{json, Map, Value};

use crate::chunk::ParsedChunk;
use crate::document::Node;
use crate::section::position_from_linear;
use crate::summary::RegionSummary;

pub fn node_to_json(node: &Node) -> Value {
	match node {
		Node::Double(v) => json!(v),
		Node::String(s) => json!(s),
		Node::Bool(b) => json!(b),
		Node::Null => Value::Null,
		Node::Int32(v) => json!(v),
		Node::Int64(v) => json!(v),
		Node::Binary { subtype, bytes } => json!({ "subtype": subtype, "bytes": hex::encode(bytes) }),
		Node::Array(items) => Value::Array(items.iter().map(node_to_json).collect()),
		Node::Document(map) => {
			let mut out = Map::new();
			for (key, value) in map {
				out.insert(key.clone(), node_to_json(value));
			}
			Value::Object(out)
		}
	}
}

pub fn chunk_to_json(chunk: &ParsedChunk) -> Value {
	chunk_to_json_with_blocks(chunk, true)
}

pub fn chunk_to_json_with_blocks(chunk: &ParsedChunk, include_blocks: bool) -> Value {
	let mut voxels = Map::new();

	if include_blocks {
		for section in &chunk.sections {
			for (linear, entry_index) in section_indices(section) {
				// Palette index 0 is a section's default/filler entry by
				// construction (§3 PaletteEntry: the unused remainder of the
				// volume always resolves to it), so it is excluded structurally
				// here rather than by matching a specific block name.
				if entry_index == 0 {
					continue;
				}
				let Some(entry) = section.palette.get(entry_index as usize) else {
					continue;
				};
				let (x, y, z) = position_from_linear(linear);
				let world = (
					chunk.chunk_x * 32 + x as i32,
					section.y_section as i32 * 32 + y as i32,
					chunk.chunk_z * 32 + z as i32,
				);
				let key = format!("{},{},{}", world.0, world.1, world.2);
				voxels.insert(key, json!({ "name": entry.name, "components": Value::Null }));
			}
		}

		for component in &chunk.block_components {
			let (x, y, z) = position_from_linear(component.position_in_section as usize);
			let world = (
				chunk.chunk_x * 32 + x as i32,
				component.section_index as i32 * 32 + y as i32,
				chunk.chunk_z * 32 + z as i32,
			);
			let key = format!("{},{},{}", world.0, world.1, world.2);
			let components_json = node_to_json(&component.component_tree);
			match voxels.get_mut(&key) {
				Some(existing) => {
					existing["components"] = components_json;
				}
				None => {
					voxels.insert(key, json!({ "name": Value::Null, "components": components_json }));
				}
			}
		}
	}

	json!({
		"chunk_x": chunk.chunk_x,
		"chunk_z": chunk.chunk_z,
		"version": chunk.version,
		"block_names": chunk.block_names,
		"entities": chunk.entities.iter().map(node_to_json).collect::<Vec<_>>(),
		"voxels": voxels,
	})
}

/// `(linear_index, palette_index)` pairs for every voxel in a section
/// that is not the Empty no-indices special case.
fn section_indices(section: &crate::section::ChunkSection) -> Vec<(usize, u32)> {
	(0..crate::section::VOXELS_PER_SECTION)
		.filter_map(|linear| {
			let (x, y, z) = position_from_linear(linear);
			section.index_at(x, y, z).map(|index| (linear, index))
		})
		.collect()
}

pub fn summary_to_json(summary: &RegionSummary) -> Value {
	json!({
		"region_x": summary.region_x,
		"region_z": summary.region_z,
		"non_empty_slots": summary.non_empty_slots,
		"unique_blocks": summary.unique_blocks,
		"block_counts": summary.block_counts,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chunk::ChunkAssembler;
	use crate::document::NodeMap;

	#[test]
	fn empty_chunk_serializes_with_no_voxels() {
		let root = Node::Document(NodeMap::from_iter([
			("Version".to_owned(), Node::Int32(1)),
			("Components".to_owned(), Node::Document(NodeMap::new())),
		]));
		let chunk = ChunkAssembler::assemble(&root, 0, 0).unwrap();
		let value = chunk_to_json(&chunk);
		assert_eq!(value["chunk_x"], 0);
		assert_eq!(value["voxels"].as_object().unwrap().len(), 0);
	}

	#[test]
	fn only_non_default_palette_entries_get_a_voxel_key() {
		use crate::section::{linear_index, SectionDecoder, VOXELS_PER_SECTION};

		// A two-entry palette: index 0 is the section's filler entry, index
		// 1 is a real block placed at just one position.
		let mut bytes = 0u32.to_be_bytes().to_vec(); // migration_version
		bytes.push(2); // palette_type = Byte
		bytes.extend_from_slice(&2u16.to_be_bytes()); // palette length
		for (id, name) in [(0u8, "Air"), (1, "Rock_Stone")] {
			bytes.push(id);
			bytes.extend_from_slice(&(name.len() as u16).to_be_bytes());
			bytes.extend_from_slice(name.as_bytes());
			bytes.extend_from_slice(&0i16.to_be_bytes());
		}
		let mut indices = vec![0u8; VOXELS_PER_SECTION];
		indices[linear_index(1, 0, 0)] = 1;
		bytes.extend_from_slice(&indices);
		let section = SectionDecoder::decode(&hex::encode(bytes), 0).unwrap();

		let root = Node::Document(NodeMap::from_iter([
			("Version".to_owned(), Node::Int32(1)),
			("Components".to_owned(), Node::Document(NodeMap::new())),
		]));
		let mut chunk = ChunkAssembler::assemble(&root, 0, 0).unwrap();
		chunk.sections.push(section);

		let value = chunk_to_json(&chunk);
		let voxels = value["voxels"].as_object().unwrap();
		assert_eq!(voxels.len(), 1);
		assert_eq!(voxels["1,0,0"]["name"], "Rock_Stone");
	}

	#[test]
	fn summary_serializes_expected_fields() {
		let summary = RegionSummary {
			region_x: 1,
			region_z: -2,
			non_empty_slots: 3,
			unique_blocks: 1,
			block_counts: std::collections::HashMap::from([("Rock_Stone".to_owned(), 99u64)]),
		};
		let value = summary_to_json(&summary);
		assert_eq!(value["region_x"], 1);
		assert_eq!(value["block_counts"]["Rock_Stone"], 99);
	}
}
