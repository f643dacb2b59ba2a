// Chart documents - timing section of a level description
// Loads the tempo schedule and per-song offset that the conductor maps

pub mod loader;
pub mod serialization;
pub mod types;

pub use loader::{ChartError, ChartLoadOptions, ChartLoader};
pub use serialization::DocumentFormat;
pub use types::{ChartDocument, SongTiming, TimeChangeEntry};

use crate::sequencer::timeline::Tempo;

/// Validate a timing section before it reaches a conductor
///
/// The conductor drops invalid changes on its own; this check lets tools report
/// them to the chart author instead.
pub fn validate_song_timing(timing: &SongTiming) -> Result<(), ChartError> {
    if !Tempo::is_valid_bpm(timing.bpm) {
        return Err(ChartError::InvalidStructure(format!(
            "Starting BPM must be finite and > 0, got {}",
            timing.bpm
        )));
    }

    if !timing.time_signature.is_valid() {
        return Err(ChartError::InvalidStructure(format!(
            "Invalid starting time signature {}",
            timing.time_signature
        )));
    }

    if !timing.instrumental_offset.is_finite() {
        return Err(ChartError::InvalidStructure(
            "Instrumental offset must be finite".to_string(),
        ));
    }

    for (index, change) in timing.time_changes.iter().enumerate() {
        if !change.position_ms.is_finite() {
            return Err(ChartError::InvalidStructure(format!(
                "Time change {} has a non-finite position",
                index
            )));
        }

        if !Tempo::is_valid_bpm(change.bpm) {
            return Err(ChartError::InvalidStructure(format!(
                "Time change {} at {} ms has invalid BPM {}",
                index, change.position_ms, change.bpm
            )));
        }

        if change.numerator == 0 || change.denominator == 0 {
            return Err(ChartError::InvalidStructure(format!(
                "Time change {} at {} ms has invalid time signature {}/{}",
                index, change.position_ms, change.numerator, change.denominator
            )));
        }
    }

    let opening = timing
        .time_changes
        .iter()
        .filter(|change| change.position_ms <= 0.0)
        .last();
    if let Some(change) = opening {
        if change.bpm != timing.bpm {
            log::warn!(
                "Chart starts at {} BPM but its change at {} ms sets {} BPM",
                timing.bpm,
                change.position_ms,
                change.bpm
            );
        }
    }

    Ok(())
}
