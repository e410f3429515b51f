//! Configuration: TOML file with environment overrides.
//!
//! Precedence is defaults < config file < environment. The only tunable the
//! resolver strictly needs is the initial safe filename length; the rest
//! covers where artifacts land and where the event log goes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{ArtifactError, Result};

/// Initial filename byte budget when nothing else is configured.
pub const DEFAULT_MAX_SAFE_FILENAME_BYTES: usize = 254;
/// Smallest prefix the resolver may shrink a filename to.
pub const DEFAULT_MIN_PREFIX_BYTES: usize = 64;

/// Env var seeding the initial filename byte budget.
pub const ENV_MAX_SAFE_FILENAME_BYTES: &str = "ARTPATH_MAX_SAFE_FILENAME_BYTES";
/// Env var overriding the artifact output root.
pub const ENV_OUTPUT_ROOT: &str = "ARTPATH_OUTPUT_ROOT";
/// Env var enabling the JSONL event log.
pub const ENV_LOG_PATH: &str = "ARTPATH_LOG_PATH";

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where artifacts are written.
    pub paths: PathsConfig,
    /// Filename budget and naming defaults.
    pub naming: NamingConfig,
    /// Event log settings.
    pub logging: LoggingConfig,
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory that artifact names are resolved under.
    pub output_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("artifacts"),
        }
    }
}

/// Filename length budget and naming defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Initial maximum filename length in bytes, suffix included.
    pub max_safe_filename_bytes: usize,
    /// Floor for the prefix part of a filename.
    pub min_prefix_bytes: usize,
    /// Extension used when a request does not name one.
    pub default_extension: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            max_safe_filename_bytes: DEFAULT_MAX_SAFE_FILENAME_BYTES,
            min_prefix_bytes: DEFAULT_MIN_PREFIX_BYTES,
            default_extension: "png".to_string(),
        }
    }
}

/// Event log settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only JSONL file for resolution events. Disabled when unset.
    pub jsonl_path: Option<PathBuf>,
}

impl Config {
    /// Load from an optional TOML file, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ArtifactError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply `ARTPATH_*` overrides.
    ///
    /// The filename budget follows "absent, non-numeric or zero means
    /// default" semantics: a bad value resets to 254 instead of failing.
    pub fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = env(ENV_MAX_SAFE_FILENAME_BYTES) {
            self.naming.max_safe_filename_bytes = parse_filename_budget(&raw);
        }
        if let Some(root) = env(ENV_OUTPUT_ROOT).filter(|v| !v.trim().is_empty()) {
            self.paths.output_root = PathBuf::from(root);
        }
        if let Some(log) = env(ENV_LOG_PATH).filter(|v| !v.trim().is_empty()) {
            self.logging.jsonl_path = Some(PathBuf::from(log));
        }
    }

    /// Reject values the resolver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.naming.max_safe_filename_bytes == 0 {
            return Err(ArtifactError::InvalidConfig {
                details: "naming.max_safe_filename_bytes must be greater than zero".to_string(),
            });
        }
        if self.naming.min_prefix_bytes == 0 {
            return Err(ArtifactError::InvalidConfig {
                details: "naming.min_prefix_bytes must be greater than zero".to_string(),
            });
        }
        // A budget under the floor would cut prefixes short without any
        // filesystem rejection, down to empty names.
        if self.naming.max_safe_filename_bytes < self.naming.min_prefix_bytes {
            return Err(ArtifactError::InvalidConfig {
                details: format!(
                    "naming.max_safe_filename_bytes ({}) must not be below naming.min_prefix_bytes ({})",
                    self.naming.max_safe_filename_bytes, self.naming.min_prefix_bytes
                ),
            });
        }
        let ext = &self.naming.default_extension;
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(ArtifactError::InvalidConfig {
                details: format!(
                    "naming.default_extension {ext:?} must be non-empty, without a leading dot or separators"
                ),
            });
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Parse a filename budget, falling back to the default for anything that is
/// not a positive integer.
#[must_use]
pub fn parse_filename_budget(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => DEFAULT_MAX_SAFE_FILENAME_BYTES,
        Ok(value) => value,
    }
}
