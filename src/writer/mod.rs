//! Artifact writer: the pipeline a test runner calls to place an artifact.
//!
//! Builds the name, makes sure the parent directory exists, reserves a path
//! through the resolver and optionally fills it. A failed write never leaves
//! the zero-byte reservation behind.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::Config;
use crate::core::errors::{ArtifactError, Result};
use crate::core::paths::serialize_lossy;
use crate::logger::{EventSink, JsonlLogger, NullSink, ResolutionEvent};
use crate::naming::{ArtifactName, ArtifactRequest, NameBuilder};
use crate::platform::pal::ArtifactFs;
use crate::resolver::{SafeLengthBudget, SafePathResolver};

/// Where a request will be resolved, before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPlan {
    pub name: ArtifactName,
    #[serde(serialize_with = "serialize_lossy")]
    pub without_ext: PathBuf,
    pub extension: String,
    pub overwrite: bool,
}

/// Result of [`ArtifactWriter::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    #[serde(serialize_with = "serialize_lossy")]
    pub path: PathBuf,
    pub size_bytes: u64,
    pub saved_at: DateTime<Utc>,
}

/// Composes naming, directory creation and resolution.
#[derive(Clone)]
pub struct ArtifactWriter {
    fs: Arc<dyn ArtifactFs>,
    resolver: SafePathResolver,
    events: Arc<dyn EventSink>,
    output_root: PathBuf,
    default_extension: String,
}

impl ArtifactWriter {
    #[must_use]
    pub fn new(
        fs: Arc<dyn ArtifactFs>,
        budget: SafeLengthBudget,
        output_root: impl Into<PathBuf>,
        default_extension: impl Into<String>,
    ) -> Self {
        Self {
            resolver: SafePathResolver::new(Arc::clone(&fs), budget),
            fs,
            events: Arc::new(NullSink),
            output_root: output_root.into(),
            default_extension: default_extension.into(),
        }
    }

    /// Writer seeded from configuration, logging to the configured JSONL
    /// file when one is set.
    pub fn from_config(config: &Config, fs: Arc<dyn ArtifactFs>) -> Result<Self> {
        let writer = Self::new(
            fs,
            SafeLengthBudget::from_config(&config.naming),
            config.paths.output_root.clone(),
            config.naming.default_extension.clone(),
        );
        match &config.logging.jsonl_path {
            Some(path) => Ok(writer.with_events(Arc::new(JsonlLogger::open(path)?))),
            None => Ok(writer),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.resolver = self.resolver.with_events(Arc::clone(&events));
        self.events = events;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &SafePathResolver {
        &self.resolver
    }

    /// Name and target of `request` without touching the filesystem.
    #[must_use]
    pub fn plan(&self, request: &ArtifactRequest) -> ArtifactPlan {
        let name = NameBuilder::build(request);
        let root = request.output_root.as_deref().unwrap_or(&self.output_root);
        let without_ext = name.without_ext(root);
        let extension = request
            .extension
            .clone()
            .unwrap_or_else(|| self.default_extension.clone());
        ArtifactPlan {
            name,
            without_ext,
            extension,
            overwrite: request.overwrite,
        }
    }

    /// Reserve a path for `request`, leaving a zero-byte file there.
    pub fn reserve(&self, request: &ArtifactRequest) -> Result<PathBuf> {
        let plan = self.plan(request);
        self.ensure_parent(&plan.without_ext)?;
        self.resolver
            .resolve(&plan.without_ext, &plan.extension, plan.overwrite)
    }

    /// Reserve a path and write `bytes` into it.
    pub fn save(&self, request: &ArtifactRequest, bytes: &[u8]) -> Result<SavedArtifact> {
        let path = self.reserve(request)?;
        self.fill_reservation(&path, |fs, target| fs.write(target, bytes))?;
        let size_bytes = bytes.len() as u64;
        self.events.record(&ResolutionEvent::ArtifactSaved {
            path: path.clone(),
            size_bytes,
        });
        Ok(SavedArtifact {
            path,
            size_bytes,
            saved_at: Utc::now(),
        })
    }

    /// Copy an existing artifact into `dest_dir`, keeping its name and
    /// extension but never clobbering a file there unless `overwrite`.
    ///
    /// The source is read before the target is reserved: with `overwrite`
    /// and `dest_dir` being the source's own directory, the reservation
    /// truncates the source itself.
    pub fn copy_artifact(&self, src: &Path, dest_dir: &Path, overwrite: bool) -> Result<PathBuf> {
        if !self.fs.exists(src) {
            return Err(ArtifactError::InvalidRequest {
                details: format!("copy source {} does not exist", src.display()),
            });
        }
        let stem = src.file_stem().ok_or_else(|| ArtifactError::InvalidRequest {
            details: format!("copy source {} has no file name", src.display()),
        })?;
        let extension = src
            .extension()
            .map_or_else(|| self.default_extension.clone(), |e| e.to_string_lossy().into_owned());

        let bytes = self.fs.read(src).map_err(|e| ArtifactError::io(src, e))?;

        let without_ext = dest_dir.join(stem);
        self.ensure_parent(&without_ext)?;
        let path = self.resolver.resolve(&without_ext, &extension, overwrite)?;
        self.fill_reservation(&path, |fs, target| fs.write(target, &bytes))?;
        Ok(path)
    }

    fn ensure_parent(&self, without_ext: &Path) -> Result<()> {
        match without_ext.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => self
                .fs
                .create_dir_all(parent)
                .map_err(|e| ArtifactError::io(parent, e)),
            None => Ok(()),
        }
    }

    fn fill_reservation(
        &self,
        path: &Path,
        fill: impl FnOnce(&dyn ArtifactFs, &Path) -> std::io::Result<()>,
    ) -> Result<()> {
        if let Err(source) = fill(self.fs.as_ref(), path) {
            // Best effort: the original error is the one worth reporting.
            let _ = self.fs.remove(path);
            return Err(ArtifactError::io(path, source));
        }
        Ok(())
    }
}
