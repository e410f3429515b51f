//! ART-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Top-level error type for artifact path resolution.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("[ART-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[ART-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[ART-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[ART-1201] invalid artifact request: {details}")]
    InvalidRequest { details: String },

    #[error(
        "[ART-2001] filename too long for {path}: budget {budget} bytes, prefix floor {floor} bytes"
    )]
    NameTooLong {
        path: PathBuf,
        budget: usize,
        floor: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("[ART-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[ART-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "ART-1001",
            Self::MissingConfig { .. } => "ART-1002",
            Self::ConfigParse { .. } => "ART-1003",
            Self::InvalidRequest { .. } => "ART-1201",
            Self::NameTooLong { .. } => "ART-2001",
            Self::Serialization { .. } => "ART-2101",
            Self::Io { .. } => "ART-3002",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// A `NameTooLong` that reaches the caller has already exhausted the
    /// length budget, so retrying with the same input cannot succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for ArtifactError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ArtifactError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
