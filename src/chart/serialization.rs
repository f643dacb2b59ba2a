// Serialization utilities for chart and config documents
// RON for hand-edited files, JSON for documents exchanged with other tools

use super::loader::ChartError;
use ron::ser::PrettyConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// On-disk document format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Ron,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, ChartError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(DocumentFormat::Ron),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(DocumentFormat::Json),
            _ => Err(ChartError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Serialize to RON format
pub fn serialize_to_ron<T: Serialize>(value: &T) -> Result<String, ChartError> {
    Ok(ron::ser::to_string_pretty(value, PrettyConfig::default())?)
}

/// Deserialize from RON format
pub fn deserialize_from_ron<T: DeserializeOwned>(ron_data: &str) -> Result<T, ChartError> {
    Ok(ron::from_str(ron_data)?)
}

/// Serialize to JSON format
pub fn serialize_to_json<T: Serialize>(value: &T) -> Result<String, ChartError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Deserialize from JSON format
pub fn deserialize_from_json<T: DeserializeOwned>(json_data: &str) -> Result<T, ChartError> {
    Ok(serde_json::from_str(json_data)?)
}

pub fn to_string_as<T: Serialize>(value: &T, format: DocumentFormat) -> Result<String, ChartError> {
    match format {
        DocumentFormat::Ron => serialize_to_ron(value),
        DocumentFormat::Json => serialize_to_json(value),
    }
}

pub fn from_str_as<T: DeserializeOwned>(
    data: &str,
    format: DocumentFormat,
) -> Result<T, ChartError> {
    match format {
        DocumentFormat::Ron => deserialize_from_ron(data),
        DocumentFormat::Json => deserialize_from_json(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::types::{SongTiming, TimeChangeEntry};
    use crate::sequencer::timeline::TimeSignature;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("song.ron")).unwrap(),
            DocumentFormat::Ron
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("charts/song.JSON")).unwrap(),
            DocumentFormat::Json
        );
        assert!(DocumentFormat::from_path(Path::new("song")).is_err());
        assert!(DocumentFormat::from_path(Path::new("song.yaml")).is_err());
    }

    #[test]
    fn test_ron_timing() {
        let ron_data = r#"(
            bpm: 120.0,
            time_changes: [
                (position_ms: 0.0, bpm: 120.0),
                (position_ms: 8000.0, bpm: 150.0, numerator: 3, denominator: 4),
            ],
        )"#;
        let timing: SongTiming = deserialize_from_ron(ron_data).unwrap();
        assert_eq!(timing.time_signature, TimeSignature::four_four());
        assert_eq!(timing.time_changes[1], TimeChangeEntry::new(8000.0, 150.0, 3, 4));

        // Round trip
        let again: SongTiming = deserialize_from_ron(&serialize_to_ron(&timing).unwrap()).unwrap();
        assert_eq!(again, timing);
    }

    #[test]
    fn test_json_timing() {
        let json_data = r#"{
            "bpm": 100.0,
            "time_signature": { "numerator": 7, "denominator": 8 },
            "instrumental_offset": -35.0
        }"#;
        let timing: SongTiming = from_str_as(json_data, DocumentFormat::Json).unwrap();
        assert_eq!(timing.time_signature.numerator, 7);
        assert_eq!(timing.instrumental_offset, -35.0);
        assert!(timing.time_changes.is_empty());
    }

    #[test]
    fn test_malformed_documents() {
        let err = deserialize_from_json::<SongTiming>("{ bpm: ").unwrap_err();
        assert!(matches!(err, ChartError::Json(_)));

        let err = deserialize_from_ron::<SongTiming>("(bpm: \"fast\")").unwrap_err();
        assert!(matches!(err, ChartError::RonParse(_)));
    }
}
