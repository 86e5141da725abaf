//! Decodes the binary-document dialect: a 4-byte little-endian size
//! prefix followed by a sequence of `(tag, key, value)` entries terminated
//! by the `0x00` end sentinel.

use crate::cursor::ByteCursor;
use crate::error::{Error, ErrorKind, Result};

use super::{Node, NodeMap};

const TAG_END: u8 = 0x00;
const TAG_DOUBLE: u8 = 0x01;
const TAG_STRING: u8 = 0x02;
const TAG_DOCUMENT: u8 = 0x03;
const TAG_ARRAY: u8 = 0x04;
const TAG_BINARY: u8 = 0x05;
const TAG_BOOL: u8 = 0x08;
const TAG_NULL: u8 = 0x0A;
const TAG_INT32: u8 = 0x10;
const TAG_INT64: u8 = 0x12;

pub struct DocumentParser;

impl DocumentParser {
	/// Parse a complete top-level document out of `bytes`, including its
	/// own 4-byte size prefix.
	pub fn parse(bytes: &[u8]) -> Result<Node> {
		let mut cursor = ByteCursor::new(bytes);
		Self::parse_sized_document(&mut cursor)
	}

	/// Read the 4-byte LE size prefix, then parse exactly that many bytes
	/// worth of entries as a `Document` node.
	fn parse_sized_document(cursor: &mut ByteCursor<'_>) -> Result<Node> {
		let declared_size = cursor.read_u32_le()?;
		let start = cursor.position();
		let map = Self::parse_entries(cursor)?;
		let consumed = (cursor.position() - start) as u32;
		if consumed != declared_size {
			return Err(Error::new(ErrorKind::DocumentSizeMismatch {
				declared: declared_size,
				consumed,
			}));
		}
		Ok(Node::Document(map))
	}

	/// Read `(tag, key, value)` entries until the end-of-document sentinel.
	/// Does not itself read a size prefix — used both by the top-level
	/// document and by the embedded-document/array tags, whose size
	/// prefix is consumed by [Self::parse_sized_document].
	fn parse_entries(cursor: &mut ByteCursor<'_>) -> Result<NodeMap> {
		let mut map = NodeMap::new();
		loop {
			let tag = cursor.read_u8()?;
			if tag == TAG_END {
				break;
			}
			let key = cursor.read_cstring()?;
			let value = Self::parse_value(cursor, tag)?;
			map.insert(key, value);
		}
		Ok(map)
	}

	fn parse_value(cursor: &mut ByteCursor<'_>, tag: u8) -> Result<Node> {
		match tag {
			TAG_DOUBLE => Ok(Node::Double(cursor.read_f64_le()?)),
			TAG_STRING => {
				let len = cursor.read_i32_le()? as usize;
				Ok(Node::String(cursor.read_length_prefixed_string(len)?))
			}
			TAG_DOCUMENT => Self::parse_sized_document(cursor),
			TAG_ARRAY => {
				let document = Self::parse_sized_document(cursor)?;
				let map = document
					.as_document()
					.expect("parse_sized_document always returns Node::Document")
					.clone();
				Ok(Node::Array(map.into_values().collect()))
			}
			TAG_BINARY => {
				let len = cursor.read_i32_le()? as usize;
				let subtype = cursor.read_u8()?;
				let bytes = cursor.read_bytes(len)?.to_vec();
				Ok(Node::Binary { subtype, bytes })
			}
			TAG_BOOL => Ok(Node::Bool(cursor.read_u8()? != 0)),
			TAG_NULL => Ok(Node::Null),
			TAG_INT32 => Ok(Node::Int32(cursor.read_i32_le()?)),
			TAG_INT64 => Ok(Node::Int64(cursor.read_i64_le()?)),
			other => Err(Error::new(ErrorKind::UnknownDocumentTag(other))),
		}
	}
}

/// Re-encodes a decoded [Node] tree back into the dialect's own wire
/// format. Exists to exercise the parser's round-trip shape invariant
/// (§8); there is no write path elsewhere in this crate, since the core
/// is read-only.
pub struct DocumentEncoder;

impl DocumentEncoder {
	/// Encode a `Document` node as a complete sized document: a 4-byte LE
	/// size prefix followed by its entries and the end sentinel.
	pub fn encode(node: &Node) -> Vec<u8> {
		let body = Self::encode_body(node);
		let mut out = (body.len() as u32).to_le_bytes().to_vec();
		out.extend_from_slice(&body);
		out
	}

	fn encode_body(node: &Node) -> Vec<u8> {
		let mut body = Vec::new();
		if let Node::Document(map) = node {
			for (key, value) in map {
				Self::encode_entry(&mut body, key, value);
			}
		}
		body.push(TAG_END);
		body
	}

	fn encode_entry(out: &mut Vec<u8>, key: &str, value: &Node) {
		out.push(Self::tag_for(value));
		out.extend_from_slice(key.as_bytes());
		out.push(0);
		Self::encode_value(out, value);
	}

	fn tag_for(value: &Node) -> u8 {
		match value {
			Node::Double(_) => TAG_DOUBLE,
			Node::String(_) => TAG_STRING,
			Node::Document(_) => TAG_DOCUMENT,
			Node::Array(_) => TAG_ARRAY,
			Node::Binary { .. } => TAG_BINARY,
			Node::Bool(_) => TAG_BOOL,
			Node::Null => TAG_NULL,
			Node::Int32(_) => TAG_INT32,
			Node::Int64(_) => TAG_INT64,
		}
	}

	fn encode_value(out: &mut Vec<u8>, value: &Node) {
		match value {
			Node::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
			Node::String(s) => {
				out.extend_from_slice(&((s.len() + 1) as i32).to_le_bytes());
				out.extend_from_slice(s.as_bytes());
				out.push(0);
			}
			Node::Document(_) => out.extend_from_slice(&Self::encode(value)),
			Node::Array(items) => {
				let mut array_entries = Vec::new();
				for (index, item) in items.iter().enumerate() {
					Self::encode_entry(&mut array_entries, &index.to_string(), item);
				}
				array_entries.push(TAG_END);
				out.extend_from_slice(&(array_entries.len() as u32).to_le_bytes());
				out.extend_from_slice(&array_entries);
			}
			Node::Binary { subtype, bytes } => {
				out.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
				out.push(*subtype);
				out.extend_from_slice(bytes);
			}
			Node::Bool(b) => out.push(u8::from(*b)),
			Node::Null => {}
			Node::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
			Node::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
		}
	}
}
