//! Assembles a decoded document tree into a [ParsedChunk]: sections,
//! block components, item containers, and pass-through entities.

use std::collections::HashSet;

use crate::document::Node;
use crate::error::{Error, ErrorKind, Result};
use crate::section::{position_from_linear, ChunkSection, SectionDecoder, VOXELS_PER_SECTION};

pub const SECTIONS_PER_CHUNK: usize = 10;

/// A per-voxel side record attached by `BlockComponentChunk.BlockComponents`.
#[derive(Debug, Clone)]
pub struct BlockComponent {
	pub section_index: u8,
	pub position_in_section: u16,
	pub component_tree: Node,
}

/// An opaque item record, passed through with only `Id`/`Quantity` surfaced.
#[derive(Debug, Clone)]
pub struct Item {
	pub id: Option<String>,
	pub quantity: Option<i64>,
	pub raw: Node,
}

impl Item {
	fn from_node(node: &Node) -> Self {
		Self {
			id: node.get("Id").and_then(Node::as_str).map(str::to_owned),
			quantity: node.get("Quantity").and_then(Node::as_i64),
			raw: node.clone(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct ItemContainer {
	pub world_position: (i32, i32, i32),
	pub capacity: u32,
	pub items: Vec<Item>,
	pub custom_name: Option<String>,
	pub allow_viewing: Option<bool>,
}

/// A fully decoded chunk: every section, every side-component, every
/// derived container, and pass-through entity data.
#[derive(Debug, Clone)]
pub struct ParsedChunk {
	pub chunk_x: i32,
	pub chunk_z: i32,
	pub version: i64,
	pub sections: Vec<ChunkSection>,
	pub block_components: Vec<BlockComponent>,
	pub containers: Vec<ItemContainer>,
	pub entities: Vec<Node>,
	pub block_names: Vec<String>,
	pub raw_components: Node,
}

pub struct ChunkAssembler;

impl ChunkAssembler {
	pub fn assemble(root: &Node, chunk_x: i32, chunk_z: i32) -> Result<ParsedChunk> {
		let version = root
			.get("Version")
			.and_then(Node::as_i64)
			.ok_or_else(|| Error::new(ErrorKind::UnexpectedDocumentShape("missing top-level Version".into())))?;

		let components = root.get("Components").cloned_document()?;

		let sections = Self::decode_sections(&components)?;
		let block_components = Self::decode_block_components(&components)?;
		let containers = Self::synthesize_containers(&block_components, chunk_x, chunk_z);
		let entities = Self::pass_through_entities(&components);
		let block_names = Self::union_block_names(&sections);

		Ok(ParsedChunk {
			chunk_x,
			chunk_z,
			version,
			sections,
			block_components,
			containers,
			entities,
			block_names,
			raw_components: components.clone(),
		})
	}

	fn decode_sections(components: &Node) -> Result<Vec<ChunkSection>> {
		let sections_node = components.path("ChunkColumn.Sections");
		let elements = sections_node.and_then(Node::array_elements).unwrap_or_default();

		let mut sections = Vec::with_capacity(SECTIONS_PER_CHUNK);
		for (index, element) in elements.iter().enumerate() {
			let y_section = index as u8;
			match element.get("Block").and_then(|block| block.get("Data")).and_then(Node::as_str) {
				Some(hex) => sections.push(SectionDecoder::decode(hex, y_section)?),
				None => sections.push(ChunkSection::empty(y_section)),
			}
		}
		Ok(sections)
	}

	fn decode_block_components(components: &Node) -> Result<Vec<BlockComponent>> {
		let Some(map) = components.path("BlockComponentChunk.BlockComponents").and_then(Node::as_document)
		else {
			return Ok(Vec::new());
		};

		let mut out = Vec::with_capacity(map.len());
		for (key, component_tree) in map {
			let packed: usize = key.parse().map_err(|_| {
				Error::new(ErrorKind::UnexpectedDocumentShape(format!(
					"BlockComponents key \"{key}\" is not a decimal integer"
				)))
			})?;
			let section_index = (packed / VOXELS_PER_SECTION) as u8;
			let position_in_section = (packed % VOXELS_PER_SECTION) as u16;
			out.push(BlockComponent {
				section_index,
				position_in_section,
				component_tree: component_tree.clone(),
			});
		}
		Ok(out)
	}

	fn synthesize_containers(
		block_components: &[BlockComponent],
		chunk_x: i32,
		chunk_z: i32,
	) -> Vec<ItemContainer> {
		block_components
			.iter()
			.filter_map(|component| {
				let container = component.component_tree.get("container")?;
				let (x, y, z) = position_from_linear(component.position_in_section as usize);
				let world_position = (
					chunk_x * 32 + x as i32,
					component.section_index as i32 * 32 + y as i32,
					chunk_z * 32 + z as i32,
				);
				let capacity = container.get("capacity").and_then(Node::as_i64).unwrap_or(0) as u32;
				let items = container
					.get("items")
					.and_then(Node::array_elements)
					.unwrap_or_default()
					.iter()
					.map(|item| Item::from_node(item))
					.collect();
				let custom_name = container.get("custom_name").and_then(Node::as_str).map(str::to_owned);
				let allow_viewing = container.get("allow_viewing").and_then(Node::as_bool);

				Some(ItemContainer { world_position, capacity, items, custom_name, allow_viewing })
			})
			.collect()
	}

	fn pass_through_entities(components: &Node) -> Vec<Node> {
		components
			.path("EntityChunk.Entities")
			.and_then(Node::array_elements)
			.unwrap_or_default()
			.into_iter()
			.cloned()
			.collect()
	}

	fn union_block_names(sections: &[ChunkSection]) -> Vec<String> {
		let mut seen = HashSet::new();
		let mut names = Vec::new();
		for section in sections {
			for entry in &section.palette {
				if seen.insert(entry.name.clone()) {
					names.push(entry.name.clone());
				}
			}
		}
		names
	}
}

trait NodeExt {
	fn cloned_document(&self) -> Result<Node>;
}

impl NodeExt for Option<&Node> {
	fn cloned_document(&self) -> Result<Node> {
		match self {
			Some(node @ Node::Document(_)) => Ok((*node).clone()),
			_ => Err(Error::new(ErrorKind::UnexpectedDocumentShape(
				"missing or non-document top-level Components".into(),
			))),
		}
	}
}
