// Offsets - Latency compensation knobs
// Four independent millisecond offsets summed into the position the conductor reads

use serde::{Deserialize, Serialize};

/// Named latency-compensation offsets, in milliseconds
///
/// Each knob is independent; the conductor adds [`Offsets::combined`] to the raw
/// playback position at the start of every tick. Changes take effect on the next
/// tick without smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Offsets {
    /// Per-song correction for the instrumental track's encoded silence
    pub instrumental: f64,
    /// Correction for the audio container/codec padding
    pub format: f64,
    /// Player-calibrated input latency
    pub input: f64,
    /// Player-calibrated audio/visual latency
    pub audio_visual: f64,
}

impl Offsets {
    pub fn new(instrumental: f64, format: f64, input: f64, audio_visual: f64) -> Self {
        Self {
            instrumental,
            format,
            input,
            audio_visual,
        }
    }

    /// Sum of all four offsets, recomputed on every call
    pub fn combined(&self) -> f64 {
        self.instrumental + self.format + self.input + self.audio_visual
    }

    /// True when every knob is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// True when every knob is a finite number of milliseconds
    pub fn is_finite(&self) -> bool {
        self.instrumental.is_finite()
            && self.format.is_finite()
            && self.input.is_finite()
            && self.audio_visual.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_is_sum() {
        let offsets = Offsets::new(10.0, -4.5, 20.0, 1.5);
        assert_eq!(offsets.combined(), 27.0);
        assert!(!offsets.is_zero());
        assert!(Offsets::default().is_zero());
    }

    #[test]
    fn test_combined_tracks_field_changes() {
        let mut offsets = Offsets::default();
        offsets.input = 12.0;
        assert_eq!(offsets.combined(), 12.0);
        offsets.audio_visual = -12.0;
        assert_eq!(offsets.combined(), 0.0);
        // Cancelling knobs are still configured
        assert!(!offsets.is_zero());
    }

    #[test]
    fn test_non_finite_knob_is_detected() {
        assert!(Offsets::new(10.0, -4.5, 20.0, 1.5).is_finite());
        assert!(!Offsets::new(0.0, f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Offsets::new(0.0, 0.0, 0.0, f64::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let offsets: Offsets = serde_json::from_str(r#"{ "input": 8.0 }"#).unwrap();
        assert_eq!(offsets, Offsets::new(0.0, 0.0, 8.0, 0.0));
    }
}
