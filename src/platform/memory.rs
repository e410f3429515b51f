//! In-memory [`ArtifactFs`] with a configurable filename length limit.
//!
//! Lets tests and simulations reproduce filesystems that reject long names
//! (encrypted home directories, some network mounts) without needing one.

#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::pal::{ArtifactFs, FsFailure};
use crate::core::paths::basename_len;

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    create_attempts: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<State>,
    name_max_bytes: Option<usize>,
    read_only: bool,
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any file whose basename is longer than `bytes`.
    #[must_use]
    pub fn with_name_max(mut self, bytes: usize) -> Self {
        self.name_max_bytes = Some(bytes);
        self
    }

    /// Fail every create and write with permission denied.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Seed a file.
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: &[u8]) {
        self.state.lock().files.insert(path.into(), bytes.to_vec());
    }

    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    #[must_use]
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.state.lock().files.keys().cloned().collect()
    }

    /// Every path `create_empty` was called with, in order.
    #[must_use]
    pub fn create_attempts(&self) -> Vec<PathBuf> {
        self.state.lock().create_attempts.clone()
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only filesystem: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn name_too_long(&self, path: &Path) -> bool {
        self.name_max_bytes
            .is_some_and(|max| basename_len(path) > max)
    }
}

impl ArtifactFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn create_empty(&self, path: &Path) -> Result<(), FsFailure> {
        self.state.lock().create_attempts.push(path.to_path_buf());
        if self.name_too_long(path) {
            return Err(FsFailure::name_too_long(path));
        }
        self.check_writable(path)?;
        self.state.lock().files.insert(path.to_path_buf(), Vec::new());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check_writable(path)?;
        let mut state = self.state.lock();
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            state.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.check_writable(path)?;
        self.state
            .lock()
            .files
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.contents(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
        })
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.state
            .lock()
            .files
            .remove(path)
            .map(drop)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::pal::FsErrorKind;

    #[test]
    fn long_names_are_rejected_as_name_too_long() {
        let fs = MemoryFs::new().with_name_max(8);
        assert!(fs.create_empty(Path::new("/out/short.p")).is_ok());
        let failure = fs.create_empty(Path::new("/out/too-long.png")).unwrap_err();
        assert_eq!(failure.kind, FsErrorKind::NameTooLong);
        assert!(!fs.exists(Path::new("/out/too-long.png")));
        assert_eq!(fs.create_attempts().len(), 2);
    }

    #[test]
    fn read_only_failures_are_other() {
        let fs = MemoryFs::new().read_only();
        let failure = fs.create_empty(Path::new("/out/a.png")).unwrap_err();
        assert_eq!(failure.kind, FsErrorKind::Other);
    }
}
