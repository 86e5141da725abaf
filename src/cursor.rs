//! A stateful, allocation-free reader over a borrowed byte slice.
//!
//! The outer indexed-storage container is big-endian; the binary-document
//! dialect nested inside each blob is predominantly little-endian. Rather
//! than pick one endianness for the whole crate, [ByteCursor] takes it
//! per call, the way the teacher's NBT layer picks it per primitive.

use crate::error::{Error, ErrorKind, Result};

/// Reads fixed-width and length-prefixed values out of a `&[u8]`, tracking
/// a cursor position. Never copies more than the caller asked for.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
	bytes: &'a [u8],
	position: usize,
}

macro_rules! primitive_reads {
	($(($name:ident, $ty:ty, $size:expr, $from_bytes:ident)),+ $(,)?) => {
		$(
			pub fn $name(&mut self) -> Result<$ty> {
				let bytes = self.read_bytes($size)?;
				Ok(<$ty>::$from_bytes(bytes.try_into().expect("slice length checked above")))
			}
		)+
	};
}

impl<'a> ByteCursor<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, position: 0 }
	}

	/// Number of bytes left to read.
	pub fn remaining(&self) -> usize {
		self.bytes.len() - self.position
	}

	pub fn position(&self) -> usize {
		self.position
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// Move the cursor forward (or backward) by `delta` bytes.
	pub fn seek_relative(&mut self, delta: i64) -> Result<()> {
		let new_position = self.position as i64 + delta;
		if new_position < 0 || new_position as usize > self.bytes.len() {
			return Err(Error::new(ErrorKind::Truncated));
		}
		self.position = new_position as usize;
		Ok(())
	}

	/// Read `n` raw bytes, advancing the cursor.
	pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(Error::with_context(
				ErrorKind::Truncated,
				crate::error::ErrorContext::new().with_offset(self.position as u64),
			));
		}
		let slice = &self.bytes[self.position..self.position + n];
		self.position += n;
		Ok(slice)
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_bytes(1)?[0])
	}

	primitive_reads![
		(read_u16_be, u16, 2, from_be_bytes),
		(read_u32_be, u32, 4, from_be_bytes),
		(read_i16_be, i16, 2, from_be_bytes),
		(read_i32_be, i32, 4, from_be_bytes),
		(read_i64_be, i64, 8, from_be_bytes),
		(read_i64_le, i64, 8, from_le_bytes),
		(read_u32_le, u32, 4, from_le_bytes),
		(read_i32_le, i32, 4, from_le_bytes),
		(read_f64_le, f64, 8, from_le_bytes),
	];

	/// Read a NUL-terminated UTF-8 string. The NUL byte is consumed but not
	/// included in the returned string.
	pub fn read_cstring(&mut self) -> Result<String> {
		let start = self.position;
		let nul_offset = self.bytes[start..]
			.iter()
			.position(|&b| b == 0)
			.ok_or_else(|| Error::new(ErrorKind::Truncated))?;
		let bytes = self.read_bytes(nul_offset)?.to_vec();
		self.position += 1; // consume the NUL
		Ok(String::from_utf8(bytes)?)
	}

	/// Read a string prefixed by an explicit byte count (as used by the
	/// document dialect's string tag, where the count includes a trailing NUL).
	pub fn read_length_prefixed_string(&mut self, total_len_including_nul: usize) -> Result<String> {
		if total_len_including_nul == 0 {
			return Ok(String::new());
		}
		let bytes = self.read_bytes(total_len_including_nul)?;
		let (body, nul) = bytes.split_at(bytes.len() - 1);
		if nul != [0] {
			return Err(Error::new(ErrorKind::UnexpectedDocumentShape(
				"string payload was not NUL-terminated".to_owned(),
			)));
		}
		Ok(String::from_utf8(body.to_vec())?)
	}

	/// Produce a bounded, independent cursor over the next `n` bytes, and
	/// advance past them. Used to recurse into an embedded document without
	/// letting the child read past its declared size.
	pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>> {
		Ok(ByteCursor::new(self.read_bytes(n)?))
	}
}
