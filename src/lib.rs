//! Artifact path resolution for test runners.
//!
//! Turns test metadata (spec path, title hierarchy, failure and retry state)
//! into unique, filesystem-safe paths for screenshots, videos and other
//! binary artifacts. Paths adapt to the filesystem's real filename length
//! limit, which is discovered from "name too long" failures and remembered
//! for the rest of the run.

pub mod core;
pub mod logger;
pub mod naming;
pub mod platform;
pub mod resolver;
pub mod writer;

#[cfg(feature = "cli")]
pub mod cli_app;

pub use crate::core::config::Config;
pub use crate::core::errors::{ArtifactError, Result};
pub use crate::naming::{ArtifactName, ArtifactRequest, NameBuilder};
pub use crate::resolver::{SafeLengthBudget, SafePathResolver};
pub use crate::writer::{ArtifactWriter, SavedArtifact};
