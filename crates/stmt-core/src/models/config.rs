//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StmtError};

/// Main configuration for the stmt pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtConfig {
    /// Statement text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Tabular (CSV) loading configuration.
    pub tabular: TabularConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// How amounts printed without an explicit sign are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsignedAmount {
    /// Unsigned amounts are money leaving the account (negative).
    #[default]
    Outflow,
    /// Unsigned amounts are money entering the account (positive).
    Inflow,
}

/// Statement text extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines shorter than this (after trimming) are never transactions.
    pub min_line_length: usize,

    /// Minimum description length after cleanup.
    pub min_description_length: usize,

    /// Maximum continuation lines joined onto a date-started line.
    pub max_continuation_lines: usize,

    /// Sign given to amounts printed without one.
    pub unsigned_amounts: UnsignedAmount,

    /// Run the strategy cascade separately for each page instead of once
    /// for the whole document.
    pub cascade_per_page: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_length: 5,
            min_description_length: 3,
            max_continuation_lines: 4,
            unsigned_amounts: UnsignedAmount::Outflow,
            cascade_per_page: false,
        }
    }
}

/// Tabular (CSV) loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Field delimiter.
    pub delimiter: char,

    /// Accept rows with a different number of fields than the header.
    pub flexible: bool,

    /// Rows whose cleaned description is shorter than this are dropped.
    pub min_description_length: usize,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            flexible: true,
            min_description_length: 3,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider a PDF as having extractable text.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            min_text_length: 1,
        }
    }
}

impl StmtConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| StmtError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| StmtError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StmtConfig =
            serde_json::from_str(r#"{"extraction": {"unsigned_amounts": "inflow"}}"#).unwrap();

        assert_eq!(config.extraction.unsigned_amounts, UnsignedAmount::Inflow);
        assert_eq!(config.extraction.min_line_length, 5);
        assert_eq!(config.tabular, TabularConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = StmtConfig::default();
        config.extraction.cascade_per_page = true;
        config.tabular.delimiter = ';';
        config.save(&path).unwrap();

        assert_eq!(StmtConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempfile::tempdir().unwrap();

        let missing = StmtConfig::from_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(StmtError::Io(_))));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"extraction": {"min_line_length": "five"}}"#).unwrap();
        match StmtConfig::from_file(&path) {
            Err(StmtError::Config(message)) => assert!(message.contains("broken.json")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
