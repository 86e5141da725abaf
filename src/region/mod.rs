//! The outer indexed-storage container: header, slot index, and the
//! reader that resolves slots to compressed blob bytes.

pub mod coord;
pub mod header;
pub mod reader;

pub use coord::SlotCoord;
pub use header::RegionHeader;
pub use reader::{Blob, IndexedStorageReader};
