//! Append-only JSONL event log.
//!
//! One JSON object per line, each stamped with an RFC 3339 UTC timestamp.
//! The first write failure disables the logger for the rest of the process:
//! artifact resolution must never fail because logging did.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::{EventSink, ResolutionEvent};
use crate::core::errors::{ArtifactError, Result};

#[derive(Serialize)]
struct LogLine<'a> {
    ts: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a ResolutionEvent,
}

/// JSONL writer. `None` once degraded.
#[derive(Debug)]
pub struct JsonlLogger {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl JsonlLogger {
    /// Open (or create) `path` for appending, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ArtifactError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ArtifactError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a write failure has disabled this logger.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.writer.lock().is_none()
    }

    fn write_line(writer: &mut BufWriter<File>, event: &ResolutionEvent) -> std::io::Result<()> {
        let line = LogLine {
            ts: Utc::now(),
            event,
        };
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl EventSink for JsonlLogger {
    fn record(&self, event: &ResolutionEvent) {
        let mut guard = self.writer.lock();
        let Some(writer) = guard.as_mut() else {
            return;
        };
        if Self::write_line(writer, event).is_err() {
            *guard = None;
        }
    }
}
