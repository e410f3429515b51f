//! Collision-free, length-adaptive artifact path resolution.
//!
//! Given a path without extension, the resolver probes candidates of the form
//! `<basename>[ (N)].<ext>`. Two counters drive the search:
//!
//! - the duplicate index `N`, which advances when a candidate already exists
//!   (never when overwriting: overwrite always targets the unsuffixed name);
//! - the shared [`SafeLengthBudget`], which shrinks by one byte each time the
//!   filesystem rejects a candidate as too long.
//!
//! The basename is cut to `budget - len(suffix)` bytes right before each
//! create, so the effective limit is discovered from the filesystem itself.
//! Once the prefix allowance is below the budget floor, a further length
//! rejection is returned as [`ArtifactError::NameTooLong`].
//!
//! On success a zero-byte file exists at the returned path.

#![allow(missing_docs)]

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::budget::SafeLengthBudget;
use crate::core::errors::{ArtifactError, Result};
use crate::core::paths::serialize_lossy;
use crate::logger::{EventSink, NullSink, ResolutionEvent};
use crate::platform::pal::{ArtifactFs, FsErrorKind, FsFailure};

/// What happened to one probed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Already exists; try the next duplicate index.
    Occupied,
    /// Placeholder created; resolution finished.
    Created,
    /// Rejected as too long; budget shrank, same index retried.
    NameTooLong,
    /// Unrecoverable create failure.
    Failed,
}

/// One step of the resolution state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeAttempt {
    pub duplicate_index: u32,
    pub budget_bytes: usize,
    pub max_prefix_bytes: usize,
    #[serde(serialize_with = "serialize_lossy")]
    pub candidate: PathBuf,
    pub outcome: ProbeOutcome,
}

/// A successful resolution and the probes that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    #[serde(serialize_with = "serialize_lossy")]
    pub path: PathBuf,
    pub attempts: Vec<ProbeAttempt>,
}

/// Resolves unique, length-safe artifact paths.
#[derive(Clone)]
pub struct SafePathResolver {
    fs: Arc<dyn ArtifactFs>,
    budget: SafeLengthBudget,
    events: Arc<dyn EventSink>,
}

impl SafePathResolver {
    #[must_use]
    pub fn new(fs: Arc<dyn ArtifactFs>, budget: SafeLengthBudget) -> Self {
        Self {
            fs,
            budget,
            events: Arc::new(NullSink),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn budget(&self) -> &SafeLengthBudget {
        &self.budget
    }

    /// Reserve a path for `without_ext` + `.extension`.
    pub fn resolve(&self, without_ext: &Path, extension: &str, overwrite: bool) -> Result<PathBuf> {
        self.resolve_traced(without_ext, extension, overwrite)
            .map(|resolution| resolution.path)
    }

    /// Like [`SafePathResolver::resolve`], also returning every probe made.
    pub fn resolve_traced(
        &self,
        without_ext: &Path,
        extension: &str,
        overwrite: bool,
    ) -> Result<Resolution> {
        validate_extension(extension)?;
        let (parent, basename) = split_basename(without_ext)?;
        let floor = self.budget.floor();

        let mut attempts = Vec::new();
        let mut num: u32 = 0;
        loop {
            let budget = self.budget.current();
            let suffix = candidate_suffix(num, extension, overwrite);
            let max_prefix_bytes = budget.saturating_sub(suffix.len());
            let (prefix, truncated) = truncate_basename(basename, max_prefix_bytes);
            let mut file_name = prefix;
            file_name.push(&suffix);
            let candidate = parent.join(file_name);

            let mut attempt = ProbeAttempt {
                duplicate_index: num,
                budget_bytes: budget,
                max_prefix_bytes,
                candidate: candidate.clone(),
                outcome: ProbeOutcome::Occupied,
            };

            if !overwrite && self.fs.exists(&candidate) {
                attempts.push(attempt);
                self.events.record(&ResolutionEvent::DuplicateSkipped {
                    path: candidate,
                    duplicate_index: num,
                });
                num += 1;
                continue;
            }

            match self.fs.create_empty(&candidate) {
                Ok(()) => {
                    attempt.outcome = ProbeOutcome::Created;
                    attempts.push(attempt);
                    self.events.record(&ResolutionEvent::Resolved {
                        path: candidate.clone(),
                        duplicate_index: num,
                        budget_bytes: budget,
                        truncated,
                    });
                    return Ok(Resolution {
                        path: candidate,
                        attempts,
                    });
                }
                Err(failure)
                    if failure.kind == FsErrorKind::NameTooLong && max_prefix_bytes >= floor =>
                {
                    attempt.outcome = ProbeOutcome::NameTooLong;
                    attempts.push(attempt);
                    let shrunk = self.budget.shrink_below(budget);
                    self.events.record(&ResolutionEvent::BudgetShrunk {
                        path: candidate,
                        from_bytes: budget,
                        to_bytes: shrunk,
                    });
                }
                Err(failure) => {
                    let err = self.failure_to_error(candidate, budget, failure);
                    self.events.record(&ResolutionEvent::ResolutionFailed {
                        path: without_ext.to_path_buf(),
                        code: err.code().to_string(),
                        details: err.to_string(),
                    });
                    return Err(err);
                }
            }
        }
    }

    fn failure_to_error(&self, path: PathBuf, budget: usize, failure: FsFailure) -> ArtifactError {
        match failure.kind {
            FsErrorKind::NameTooLong => ArtifactError::NameTooLong {
                path,
                budget,
                floor: self.budget.floor(),
                source: failure.source,
            },
            FsErrorKind::Other => ArtifactError::io(path, failure.source),
        }
    }
}

/// `" (N).ext"` while deduplicating, `".ext"` for the first probe or when
/// overwriting.
#[must_use]
pub fn candidate_suffix(num: u32, extension: &str, overwrite: bool) -> String {
    if num > 0 && !overwrite {
        format!(" ({num}).{extension}")
    } else {
        format!(".{extension}")
    }
}

fn validate_extension(extension: &str) -> Result<()> {
    if extension.is_empty() || extension.starts_with('.') || extension.contains(['/', '\\']) {
        return Err(ArtifactError::InvalidRequest {
            details: format!(
                "extension {extension:?} must be non-empty, without a leading dot or separators"
            ),
        });
    }
    Ok(())
}

fn split_basename(without_ext: &Path) -> Result<(&Path, &OsStr)> {
    let basename = without_ext
        .file_name()
        .ok_or_else(|| ArtifactError::InvalidRequest {
            details: format!("{} has no file name to resolve", without_ext.display()),
        })?;
    let parent = without_ext.parent().unwrap_or_else(|| Path::new(""));
    Ok((parent, basename))
}

/// Cut `name` to at most `max_bytes` raw bytes. Returns whether it was cut.
#[cfg(unix)]
fn truncate_basename(name: &OsStr, max_bytes: usize) -> (OsString, bool) {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = name.as_bytes();
    if bytes.len() <= max_bytes {
        return (name.to_os_string(), false);
    }
    // May split a multi-byte character; Unix filenames are plain bytes.
    (OsString::from_vec(bytes[..max_bytes].to_vec()), true)
}

/// Cut `name` to at most `max_bytes` UTF-8 bytes, backing off to a character
/// boundary since these platforms need valid Unicode names.
#[cfg(not(unix))]
fn truncate_basename(name: &OsStr, max_bytes: usize) -> (OsString, bool) {
    let text = name.to_string_lossy();
    if text.len() <= max_bytes {
        return (name.to_os_string(), false);
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    (OsString::from(&text[..cut]), true)
}
