pub mod chunk;
pub mod cursor;
pub mod decompress;
pub mod document;
pub mod error;
pub mod ioext;
pub mod iterator;
pub mod macros;
pub mod region;
pub mod section;
pub mod serialize;
pub mod summary;

pub use chunk::ParsedChunk;
pub use error::{Error, ErrorKind, Result};
pub use iterator::{IterMode, RegionIterator};
pub use region::IndexedStorageReader;
pub use summary::RegionSummary;
