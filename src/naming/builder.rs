//! Turns test metadata into sanitized directory segments and a leaf name.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sanitize::{sanitize_segment, sanitize_value, split_separators};

/// Joins sanitized titles into one leaf name.
pub const TITLE_SEPARATOR: &str = " -- ";
/// Appended to the leaf name of a failing test.
pub const FAILED_MARKER: &str = " (failed)";
/// Leaf used when sanitization leaves nothing behind.
pub const UNTITLED: &str = "untitled";

/// What the caller wants an artifact for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactRequest {
    /// Spec file location relative to the project, one or more segments.
    pub spec_path: Vec<String>,
    /// Explicit artifact name; may contain `/` or `\` to nest directories.
    pub name: Option<String>,
    /// Suite/test title hierarchy, used when no explicit name is given.
    pub titles: Vec<Value>,
    pub failed: bool,
    /// Zero-based retry attempt.
    pub attempt_index: Option<u32>,
    /// Overrides the configured output root.
    pub output_root: Option<PathBuf>,
    /// Extension without a leading dot; the configured default when unset.
    pub extension: Option<String>,
    pub overwrite: bool,
}

impl ArtifactRequest {
    /// Request named by a title hierarchy.
    #[must_use]
    pub fn from_titles<I, T>(spec_path: &str, titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            spec_path: vec![spec_path.to_string()],
            titles: titles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Request with an explicit, possibly nested, name.
    #[must_use]
    pub fn named(spec_path: &str, name: &str) -> Self {
        Self {
            spec_path: vec![spec_path.to_string()],
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Output of [`NameBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactName {
    pub dir_segments: Vec<String>,
    pub base_name: String,
}

impl ArtifactName {
    /// Full path without extension under `root`.
    #[must_use]
    pub fn without_ext(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.dir_segments);
        path.push(&self.base_name);
        path
    }
}

/// Builds artifact names. Pure: no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameBuilder;

impl NameBuilder {
    #[must_use]
    pub fn build(request: &ArtifactRequest) -> ArtifactName {
        let mut names: Vec<String> = match request.explicit_name() {
            Some(name) => split_separators(name).map(sanitize_segment).collect(),
            None => vec![
                request
                    .titles
                    .iter()
                    .map(sanitize_value)
                    .collect::<Vec<_>>()
                    .join(TITLE_SEPARATOR),
            ],
        };

        let mut leaf = names.pop().unwrap_or_default();
        if request.failed {
            leaf.push_str(FAILED_MARKER);
        }
        if let Some(attempt) = request.attempt_index.filter(|index| *index > 0) {
            leaf.push_str(&format!(" (attempt {})", u64::from(attempt) + 1));
        }
        if leaf.is_empty() {
            leaf = UNTITLED.to_string();
        }

        let dir_segments = request
            .spec_path
            .iter()
            .flat_map(|segment| split_separators(segment))
            .map(sanitize_segment)
            .chain(names)
            .filter(|segment| !segment.is_empty())
            .collect();

        ArtifactName {
            dir_segments,
            base_name: leaf,
        }
    }
}
