use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tax_core::{CapitalSale, IncomeItem, ReturnSnapshot};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a return document.
#[derive(Debug, Error)]
pub enum SnapshotLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported return file extension for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialization format of a return document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    /// Picks the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A return as stored on disk: an optional tax year and the `[return]`
/// table holding the snapshot.
///
/// ```toml
/// tax_year = 2025
///
/// [return]
/// filing_status = "single"
///
/// [[return.income]]
/// kind = "wage"
/// box_1_wages = 60000
/// box_2_fed_tax_withheld = 6000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnDocument {
    #[serde(default)]
    pub tax_year: Option<i32>,
    #[serde(rename = "return")]
    pub tax_return: ReturnSnapshot,
}

impl ReturnDocument {
    /// Parse a document from a string in the given format.
    pub fn parse(
        contents: &str,
        format: DocumentFormat,
    ) -> Result<Self, SnapshotLoadError> {
        let document = match format {
            DocumentFormat::Toml => toml::from_str(contents)?,
            DocumentFormat::Json => serde_json::from_str(contents)?,
        };
        Ok(document)
    }

    /// Read and parse the document at `path`, choosing the format from the
    /// file extension.
    pub fn load(path: &Path) -> Result<Self, SnapshotLoadError> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| SnapshotLoadError::UnsupportedFormat(path.to_path_buf()))?;
        let contents = fs::read_to_string(path).map_err(|source| SnapshotLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Self::parse(&contents, format)?;
        debug!(
            path = %path.display(),
            income_items = document.tax_return.income.len(),
            "loaded return document"
        );
        Ok(document)
    }

    /// Appends `sales` to the return's income items.
    pub fn with_sales(
        mut self,
        sales: Vec<CapitalSale>,
    ) -> Self {
        self.tax_return
            .income
            .extend(sales.into_iter().map(IncomeItem::CapitalSale));
        self
    }
}
