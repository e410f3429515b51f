//! Structured resolution events: JSONL append-only log with graceful
//! degradation, plus null and in-memory sinks.

#![allow(missing_docs)]

pub mod jsonl;

use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::paths::serialize_lossy;

pub use jsonl::JsonlLogger;

/// Something worth recording while resolving or saving an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ResolutionEvent {
    /// Candidate was taken; the duplicate index moves on.
    DuplicateSkipped {
        #[serde(serialize_with = "serialize_lossy")]
        path: PathBuf,
        duplicate_index: u32,
    },
    /// The filesystem rejected a name as too long and the budget shrank.
    BudgetShrunk {
        #[serde(serialize_with = "serialize_lossy")]
        path: PathBuf,
        from_bytes: usize,
        to_bytes: usize,
    },
    /// A placeholder was created.
    Resolved {
        #[serde(serialize_with = "serialize_lossy")]
        path: PathBuf,
        duplicate_index: u32,
        budget_bytes: usize,
        truncated: bool,
    },
    /// Resolution ended without a path.
    ResolutionFailed {
        #[serde(serialize_with = "serialize_lossy")]
        path: PathBuf,
        code: String,
        details: String,
    },
    /// Artifact bytes were written into a reservation.
    ArtifactSaved {
        #[serde(serialize_with = "serialize_lossy")]
        path: PathBuf,
        size_bytes: u64,
    },
}

/// Receiver for [`ResolutionEvent`]s.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ResolutionEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &ResolutionEvent) {}
}

/// Keeps events in memory; used by tests and callers that inspect traces.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ResolutionEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<ResolutionEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &ResolutionEvent) {
        self.events.lock().push(event.clone());
    }
}
