//! Platform abstraction layer: the filesystem primitives the resolver and
//! writer depend on, plus the local-disk implementation.

#![allow(missing_docs)]

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// How a failed create is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    /// The OS rejected the filename as too long.
    NameTooLong,
    /// Anything else: permissions, disk full, missing parent, ...
    Other,
}

impl fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooLong => f.write_str("name too long"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// A classified create failure.
#[derive(Debug, Error)]
#[error("{kind}: {source}")]
pub struct FsFailure {
    pub kind: FsErrorKind,
    #[source]
    pub source: io::Error,
}

impl FsFailure {
    /// A synthetic "filename too long" failure, as an OS would report it.
    #[must_use]
    pub fn name_too_long(path: &Path) -> Self {
        Self {
            kind: FsErrorKind::NameTooLong,
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("file name too long: {}", path.display()),
            ),
        }
    }
}

impl From<io::Error> for FsFailure {
    fn from(source: io::Error) -> Self {
        Self {
            kind: classify_io_error(&source),
            source,
        }
    }
}

/// Map an OS error onto [`FsErrorKind`].
#[must_use]
pub fn classify_io_error(err: &io::Error) -> FsErrorKind {
    match err.raw_os_error() {
        Some(code) if is_name_too_long_code(code) => FsErrorKind::NameTooLong,
        _ => FsErrorKind::Other,
    }
}

#[cfg(unix)]
fn is_name_too_long_code(code: i32) -> bool {
    code == libc::ENAMETOOLONG
}

#[cfg(windows)]
fn is_name_too_long_code(code: i32) -> bool {
    // ERROR_FILENAME_EXCED_RANGE
    code == 206
}

#[cfg(not(any(unix, windows)))]
fn is_name_too_long_code(_code: i32) -> bool {
    false
}

/// Filesystem primitives used by the artifact pipeline.
pub trait ArtifactFs: Send + Sync {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Create (or truncate) a zero-byte file at `path`.
    fn create_empty(&self, path: &Path) -> Result<(), FsFailure>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl ArtifactFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling symlink still counts as taken.
        fs::symlink_metadata(path).is_ok()
    }

    fn create_empty(&self, path: &Path) -> Result<(), FsFailure> {
        fs::File::create(path).map(drop).map_err(FsFailure::from)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
