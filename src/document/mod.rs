//! The binary-document dialect's value tree.
//!
//! A [Node] is a closed variant carrying an order-preserving map for
//! documents, mirroring the teacher's NBT `Tag` enum but for this format's
//! own tag set (§4.4 of the design doc). Arrays are documents whose keys
//! happen to be decimal indices, rather than a distinct node shape.

pub mod parser;

use indexmap::IndexMap;

pub use parser::{DocumentEncoder, DocumentParser};

/// An order-preserving string-keyed map of [Node] values.
pub type NodeMap = IndexMap<String, Node>;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	Double(f64),
	String(String),
	Document(NodeMap),
	Array(Vec<Node>),
	Binary { subtype: u8, bytes: Vec<u8> },
	Bool(bool),
	Null,
	Int32(i32),
	Int64(i64),
}

impl Node {
	pub fn as_document(&self) -> Option<&NodeMap> {
		match self {
			Node::Document(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Node]> {
		match self {
			Node::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Node::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Node::Int32(v) => Some(*v as i64),
			Node::Int64(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Node::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Look up `key` in a `Document` node; `None` for any other variant or
	/// a missing key.
	pub fn get(&self, key: &str) -> Option<&Node> {
		self.as_document().and_then(|map| map.get(key))
	}

	/// Walk a dotted path of document keys, e.g. `"ChunkColumn.Sections"`.
	pub fn path(&self, dotted: &str) -> Option<&Node> {
		dotted.split('.').try_fold(self, |node, segment| node.get(segment))
	}

	/// Interpret an `Array` node's elements in key order, or a `Document`
	/// node's decimal-keyed children in key order — both represent the
	/// same "array" shape in this dialect.
	pub fn array_elements(&self) -> Option<Vec<&Node>> {
		match self {
			Node::Array(items) => Some(items.iter().collect()),
			Node::Document(map) => Some(map.values().collect()),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_walks_nested_documents() {
		let mut inner = NodeMap::new();
		inner.insert("Sections".to_owned(), Node::Array(vec![Node::Int32(1)]));
		let mut outer = NodeMap::new();
		outer.insert("ChunkColumn".to_owned(), Node::Document(inner));
		let root = Node::Document(outer);

		let sections = root.path("ChunkColumn.Sections").unwrap();
		assert_eq!(sections.array_elements().unwrap().len(), 1);
	}

	#[test]
	fn missing_path_segment_is_none() {
		let root = Node::Document(NodeMap::new());
		assert!(root.path("Missing.Nested").is_none());
	}
}
