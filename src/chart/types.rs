// Types for chart timing documents

use serde::{Deserialize, Serialize};

use crate::sequencer::tempo_map::TimeChangePoint;
use crate::sequencer::timeline::{Tempo, TimeSignature};

fn default_numerator() -> u32 {
    4
}

fn default_denominator() -> u32 {
    4
}

fn default_bpm() -> f64 {
    Tempo::DEFAULT_BPM
}

/// One tempo/time-signature change as stored in a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeChangeEntry {
    /// Position in milliseconds from the start of the audio
    pub position_ms: f64,
    /// Tempo from this position on
    pub bpm: f64,
    /// Beats per measure (v1.1+, defaults to 4)
    #[serde(default = "default_numerator")]
    pub numerator: u32,
    /// Beat note value (v1.1+, defaults to 4)
    #[serde(default = "default_denominator")]
    pub denominator: u32,
}

impl TimeChangeEntry {
    pub fn new(position_ms: f64, bpm: f64, numerator: u32, denominator: u32) -> Self {
        Self {
            position_ms,
            bpm,
            numerator,
            denominator,
        }
    }
}

impl From<TimeChangeEntry> for TimeChangePoint {
    fn from(entry: TimeChangeEntry) -> Self {
        TimeChangePoint::from_parts(
            entry.position_ms,
            entry.bpm,
            entry.numerator,
            entry.denominator,
        )
    }
}

impl From<&TimeChangePoint> for TimeChangeEntry {
    fn from(point: &TimeChangePoint) -> Self {
        Self::new(
            point.position_ms,
            point.bpm,
            point.numerator(),
            point.denominator(),
        )
    }
}

/// Timing section of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongTiming {
    /// Starting tempo, in effect until the first time change
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Starting time signature
    #[serde(default)]
    pub time_signature: TimeSignature,
    /// Ordered tempo changes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_changes: Vec<TimeChangeEntry>,
    /// Per-song instrumental offset in milliseconds
    #[serde(default)]
    pub instrumental_offset: f64,
}

impl SongTiming {
    /// Constant-tempo timing
    pub fn constant(bpm: f64, time_signature: TimeSignature) -> Self {
        Self {
            bpm,
            time_signature,
            time_changes: Vec::new(),
            instrumental_offset: 0.0,
        }
    }

    pub fn with_time_change(mut self, entry: TimeChangeEntry) -> Self {
        self.time_changes.push(entry);
        self
    }

    /// Change points ready for a tempo map
    ///
    /// When every change comes after 0 ms, a point at 0 ms carrying the starting
    /// tempo and signature is put in front so the song opens at the chart's `bpm`.
    pub fn points(&self) -> Vec<TimeChangePoint> {
        let mut points: Vec<TimeChangePoint> =
            self.time_changes.iter().copied().map(Into::into).collect();

        let starts_late = points
            .iter()
            .map(|p| p.position_ms)
            .min_by(f64::total_cmp)
            .is_some_and(|earliest| earliest > 0.0);
        if starts_late {
            points.insert(0, TimeChangePoint::new(0.0, self.bpm, self.time_signature));
        }
        points
    }
}

impl Default for SongTiming {
    fn default() -> Self {
        Self::constant(Tempo::DEFAULT_BPM, TimeSignature::default())
    }
}

/// Chart document: song identification plus its timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    /// Song title
    pub title: String,
    /// Artist information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Timing section
    pub timing: SongTiming,
}

impl ChartDocument {
    pub fn new(title: impl Into<String>, timing: SongTiming) -> Self {
        Self {
            title: title.into(),
            artist: None,
            timing,
        }
    }
}
