use std::path::PathBuf;

use thiserror::Error;

/// Where in the decode pipeline an [ErrorKind] was raised.
/// Carried alongside the error so that a lenient [crate::iterator::RegionIterator]
/// can report which file, slot, and byte offset failed without every
/// [ErrorKind] variant needing its own copy of these three fields.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
	pub path: Option<PathBuf>,
	pub slot_index: Option<u32>,
	pub byte_offset: Option<u64>,
}

impl ErrorContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn with_slot(mut self, slot_index: u32) -> Self {
		self.slot_index = Some(slot_index);
		self
	}

	pub fn with_offset(mut self, byte_offset: u64) -> Self {
		self.byte_offset = Some(byte_offset);
		self
	}
}

impl std::fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut wrote = false;
		if let Some(path) = &self.path {
			write!(f, "{}", path.display())?;
			wrote = true;
		}
		if let Some(slot) = self.slot_index {
			write!(f, "{}slot {slot}", if wrote { ", " } else { "" })?;
			wrote = true;
		}
		if let Some(offset) = self.byte_offset {
			write!(f, "{}offset {offset:#x}", if wrote { ", " } else { "" })?;
		}
		Ok(())
	}
}

/// The master error type for the indexed-storage decode stack.
#[derive(Debug, Error)]
pub enum ErrorKind {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("bad magic: region file does not start with \"HytaleIndexedStorage\"")]
	BadMagic,
	#[error("unsupported region version: {0}")]
	UnsupportedVersion(u32),
	#[error("read crossed a declared length bound")]
	Truncated,
	#[error("slot index points at a segment outside the file")]
	BadSegmentPointer,
	#[error("decompressed size did not match the declared source length (expected {expected}, got {actual})")]
	DecompressSizeMismatch { expected: usize, actual: usize },
	#[error("zstd frame is corrupt: {0}")]
	DecompressCorrupt(String),
	#[error("unknown document type tag: {0:#04x}")]
	UnknownDocumentTag(u8),
	#[error("document size prefix did not match the bytes consumed (declared {declared}, consumed {consumed})")]
	DocumentSizeMismatch { declared: u32, consumed: u32 },
	#[error("invalid hex in section payload: {0}")]
	InvalidHex(#[from] hex::FromHexError),
	#[error("document did not have the expected shape: {0}")]
	UnexpectedDocumentShape(String),
	#[error("unknown palette type: {0}")]
	UnknownPaletteType(u8),
	#[error("palette index {index} is out of range for a palette of size {palette_len}")]
	PaletteIndexOutOfRange { index: u32, palette_len: u32 },
	#[error("string was not valid UTF-8: {0}")]
	Utf8(#[from] std::string::FromUtf8Error),
	#[error("region file name did not match \"<x>.<z>.region.bin\": {0}")]
	BadFileName(String),
}

/// A decode error together with the context it occurred in.
#[derive(Debug)]
pub struct Error {
	pub kind: ErrorKind,
	pub context: ErrorContext,
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.kind)?;
		if self.context.path.is_some() || self.context.slot_index.is_some() || self.context.byte_offset.is_some() {
			write!(f, " ({})", self.context)?;
		}
		Ok(())
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.kind)
	}
}

impl Error {
	pub fn new(kind: ErrorKind) -> Self {
		Self { kind, context: ErrorContext::new() }
	}

	pub fn with_context(kind: ErrorKind, context: ErrorContext) -> Self {
		Self { kind, context }
	}

	pub fn at_path(kind: ErrorKind, path: impl Into<PathBuf>) -> Self {
		Self::with_context(kind, ErrorContext::new().with_path(path))
	}

	pub fn at_slot(kind: ErrorKind, slot_index: u32) -> Self {
		Self::with_context(kind, ErrorContext::new().with_slot(slot_index))
	}

	/// True for errors that are fatal to the whole file rather than to a single chunk.
	pub fn is_file_fatal(&self) -> bool {
		matches!(
			self.kind,
			ErrorKind::BadMagic
				| ErrorKind::UnsupportedVersion(_)
				| ErrorKind::BadSegmentPointer
				| ErrorKind::BadFileName(_)
		)
	}
}

impl<T: Into<ErrorKind>> From<T> for Error {
	fn from(value: T) -> Self {
		Error::new(value.into())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
