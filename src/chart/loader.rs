// Chart loader for reading and writing chart timing documents

use crate::chart::serialization::{DocumentFormat, from_str_as, to_string_as};
use crate::chart::types::ChartDocument;
use crate::chart::validate_song_timing;
use std::path::Path;

/// Chart error types
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Unsupported document format: {0} (expected .ron or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid chart structure: {0}")]
    InvalidStructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
}

/// Options for loading a chart
#[derive(Debug, Clone)]
pub struct ChartLoadOptions {
    /// Whether to validate the timing section
    pub validate: bool,
}

impl Default for ChartLoadOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Chart loader - reads and writes chart documents as RON or JSON
#[derive(Debug, Clone, Default)]
pub struct ChartLoader {
    options: ChartLoadOptions,
}

impl ChartLoader {
    pub fn new(options: ChartLoadOptions) -> Self {
        Self { options }
    }

    /// Load a chart, format chosen by extension
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ChartDocument, ChartError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let data = std::fs::read_to_string(path)?;
        self.parse(&data, format)
    }

    /// Parse a chart from memory
    pub fn parse(&self, data: &str, format: DocumentFormat) -> Result<ChartDocument, ChartError> {
        let chart: ChartDocument = from_str_as(data, format)?;
        if self.options.validate {
            validate_song_timing(&chart.timing)?;
        }
        log::debug!(
            "Loaded chart '{}' ({} time change(s))",
            chart.title,
            chart.timing.time_changes.len()
        );
        Ok(chart)
    }

    /// Save a chart, format chosen by extension
    pub fn save<P: AsRef<Path>>(&self, chart: &ChartDocument, path: P) -> Result<(), ChartError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        if self.options.validate {
            validate_song_timing(&chart.timing)?;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, to_string_as(chart, format)?)?;
        Ok(())
    }
}
