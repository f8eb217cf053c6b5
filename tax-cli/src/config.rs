use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tax_core::SUPPORTED_TAX_YEAR;
use tracing::debug;

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "tax-cli.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings read from `tax-cli.toml`. Command line flags take precedence.
///
/// ```toml
/// tax_year = 2025
/// format = "json"
/// log_filter = "tax_core=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Year used when neither `--year` nor the return document names one.
    pub tax_year: i32,
    pub format: OutputFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            tax_year: SUPPORTED_TAX_YEAR,
            format: OutputFormat::Text,
            log_filter: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid CLI configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Loads `explicit` if given, otherwise [`DEFAULT_CONFIG_FILE`] when it
    /// exists, otherwise the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!(path = %fallback.display(), "using config from working directory");
            return Self::load(&fallback);
        }
        Ok(Self::default())
    }
}
