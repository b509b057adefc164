//! Configuration management.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use fdns::ReportField;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of parsing workers.
    pub workers: Option<usize>,

    /// User agent sent when streaming from a URL.
    pub user_agent: Option<String>,

    /// Field printed for each match.
    pub report: Option<ReportField>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Give up after this many seconds.
    pub timeout_secs: Option<u64>,

    /// Always log malformed lines (as if --verbose was passed).
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "jimen0", "fdns")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location, if present.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        Ok(config)
    }
}
