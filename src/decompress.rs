//! Zstandard decompression of a single blob payload.
//!
//! Each non-empty slot holds a zstd frame, preceded by an 4-byte
//! little-endian "decompressed size" field the writer used to preallocate
//! the output buffer. We use that declared size both to preallocate and
//! to validate the frame actually produced what it promised.

use crate::error::{Error, ErrorKind, Result};

/// Decompress `frame` (a raw zstd frame, without the 4-byte size prefix)
/// into exactly `expected_size` bytes.
pub fn decompress(frame: &[u8], expected_size: usize) -> Result<Vec<u8>> {
	let decoded = zstd::stream::decode_all(frame)
		.map_err(|e| Error::new(ErrorKind::DecompressCorrupt(e.to_string())))?;

	if decoded.len() != expected_size {
		return Err(Error::new(ErrorKind::DecompressSizeMismatch {
			expected: expected_size,
			actual: decoded.len(),
		}));
	}

	Ok(decoded)
}
