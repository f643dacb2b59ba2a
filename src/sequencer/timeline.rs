// Timeline - Musical time primitives
// Tempo, time signature and step/beat/measure coordinates shared by the tempo map and conductor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sixteenth-note resolution: four steps per quarter-note beat
pub const STEPS_PER_BEAT: i64 = 4;

/// Milliseconds per minute, numerator of every crochet computation
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Duration of one beat in milliseconds at the given BPM
#[inline]
pub fn crochet_ms(bpm: f64) -> f64 {
    MS_PER_MINUTE / bpm
}

/// Duration of one step (sixteenth note) in milliseconds at the given BPM
#[inline]
pub fn step_crochet_ms(bpm: f64) -> f64 {
    crochet_ms(bpm) / STEPS_PER_BEAT as f64
}

/// Time signature (numerator/denominator)
/// Example: 4/4 time = TimeSignature { numerator: 4, denominator: 4 }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,   // Beats per measure
    pub denominator: u32, // Note value (4 = quarter note, 8 = eighth note)
}

impl TimeSignature {
    /// Creates a new time signature
    ///
    /// Panics on a zero numerator or denominator. Use [`TimeSignature::is_valid`]
    /// on values coming from charts or callers.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        assert!(numerator > 0, "Time signature numerator must be > 0");
        assert!(denominator > 0, "Time signature denominator must be > 0");
        Self {
            numerator,
            denominator,
        }
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// Common 3/4 time signature (waltz)
    pub fn three_four() -> Self {
        Self::new(3, 4)
    }

    /// Both parts strictly positive
    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Number of beats per measure
    pub fn beats_per_measure(&self) -> i64 {
        self.numerator as i64
    }

    /// Number of steps per measure
    pub fn steps_per_measure(&self) -> i64 {
        self.beats_per_measure() * STEPS_PER_BEAT
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Default tempo used when nothing better is known
    pub const DEFAULT_BPM: f64 = 120.0;

    /// Creates a new tempo
    /// Panics unless BPM is finite and > 0, see [`Tempo::is_valid_bpm`]
    pub fn new(bpm: f64) -> Self {
        assert!(Self::is_valid_bpm(bpm), "BPM must be finite and > 0");
        Self { bpm }
    }

    /// Checked constructor for untrusted input
    pub fn try_new(bpm: f64) -> Option<Self> {
        Self::is_valid_bpm(bpm).then_some(Self { bpm })
    }

    pub fn is_valid_bpm(bpm: f64) -> bool {
        bpm.is_finite() && bpm > 0.0
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in milliseconds
    pub fn crochet_ms(&self) -> f64 {
        crochet_ms(self.bpm)
    }

    /// Duration of one step in milliseconds
    pub fn step_crochet_ms(&self) -> f64 {
        step_crochet_ms(self.bpm)
    }

    /// Duration of one measure in milliseconds at given time signature
    pub fn measure_length_ms(&self, time_signature: &TimeSignature) -> f64 {
        self.crochet_ms() * time_signature.numerator as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BPM)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Discrete musical coordinates derived from a whole step count
///
/// All fields are 0-based and may be negative before the song starts
/// (a negative offset or a count-in pushes the position below zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MusicalPosition {
    pub measure: i64,
    pub beat: i64,
    pub step: i64,
}

impl MusicalPosition {
    pub fn new(measure: i64, beat: i64, step: i64) -> Self {
        Self {
            measure,
            beat,
            step,
        }
    }

    /// Floor a step count into step/beat/measure using the given beats per measure
    pub fn from_step(step: i64, numerator: u32) -> Self {
        let beat = step.div_euclid(STEPS_PER_BEAT);
        let measure = beat.div_euclid(numerator.max(1) as i64);
        Self {
            measure,
            beat,
            step,
        }
    }

    /// Step is the first step of a beat
    pub fn is_beat_boundary(&self) -> bool {
        self.step.rem_euclid(STEPS_PER_BEAT) == 0
    }

    /// Beat is the first beat of a measure
    pub fn is_measure_boundary(&self, numerator: u32) -> bool {
        self.beat.rem_euclid(numerator.max(1) as i64) == 0
    }
}

impl fmt::Display for MusicalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:03}", self.measure, self.beat, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_signature() {
        let ts = TimeSignature::four_four();
        assert_eq!(ts.numerator, 4);
        assert_eq!(ts.denominator, 4);
        assert_eq!(ts.beats_per_measure(), 4);
        assert_eq!(ts.steps_per_measure(), 16);
        assert_eq!(ts.to_string(), "4/4");

        let invalid = TimeSignature {
            numerator: 0,
            denominator: 4,
        };
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_tempo() {
        let tempo = Tempo::new(120.0);
        assert_eq!(tempo.bpm(), 120.0);
        assert_eq!(tempo.crochet_ms(), 500.0);
        assert_eq!(tempo.step_crochet_ms(), 125.0);
        assert_eq!(tempo.measure_length_ms(&TimeSignature::three_four()), 1500.0);
        assert_eq!(tempo.to_string(), "120.0 BPM");
    }

    #[test]
    fn test_tempo_validation() {
        assert!(Tempo::try_new(0.0).is_none());
        assert!(Tempo::try_new(-90.0).is_none());
        assert!(Tempo::try_new(f64::NAN).is_none());
        assert!(Tempo::try_new(f64::INFINITY).is_none());
        assert_eq!(Tempo::try_new(150.0).map(|t| t.bpm()), Some(150.0));
    }

    #[test]
    #[should_panic]
    fn test_tempo_rejects_zero() {
        let _ = Tempo::new(0.0);
    }

    #[test]
    fn test_musical_position_from_step() {
        let pos = MusicalPosition::from_step(37, 4);
        assert_eq!(pos, MusicalPosition::new(2, 9, 37));
        assert!(!pos.is_beat_boundary());

        let pos = MusicalPosition::from_step(36, 3);
        assert_eq!(pos.beat, 9);
        assert_eq!(pos.measure, 3);
        assert!(pos.is_beat_boundary());
        assert!(pos.is_measure_boundary(3));
    }

    #[test]
    fn test_musical_position_negative_steps_floor() {
        // -1 is the last step of beat -1, measure -1
        let pos = MusicalPosition::from_step(-1, 4);
        assert_eq!(pos.beat, -1);
        assert_eq!(pos.measure, -1);
        assert!(!pos.is_beat_boundary());

        let pos = MusicalPosition::from_step(-16, 4);
        assert_eq!(pos.beat, -4);
        assert_eq!(pos.measure, -1);
        assert!(pos.is_measure_boundary(4));
    }
}
