//! Safe path resolution: shared length budget and the probing resolver.

pub mod budget;
pub mod safe_path;

pub use budget::SafeLengthBudget;
pub use safe_path::{ProbeAttempt, ProbeOutcome, Resolution, SafePathResolver};
