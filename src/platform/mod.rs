//! Platform abstraction layer for filesystem access.

pub mod memory;
pub mod pal;

pub use memory::MemoryFs;
pub use pal::{ArtifactFs, FsErrorKind, FsFailure, LocalFs};
