//! Artifact naming: sanitization and name construction.

pub mod builder;
pub mod sanitize;

pub use builder::{ArtifactName, ArtifactRequest, NameBuilder};
