// Conductor configuration
// Default tempo/signature used when a song carries none, plus the player's offset calibration

use crate::chart::ChartError;
use crate::chart::serialization::{DocumentFormat, from_str_as, to_string_as};
use crate::sequencer::offsets::Offsets;
use crate::sequencer::timeline::{Tempo, TimeSignature};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conductor configuration
///
/// Every field is optional in the serialized form:
/// ```ron
/// (
///     default_bpm: 100.0,
///     offsets: (input: 12.0, audio_visual: -8.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    /// BPM used when a song is mapped with an invalid tempo
    pub default_bpm: f64,
    /// Time signature used when a song does not specify one
    pub default_time_signature: TimeSignature,
    /// Latency calibration applied to every tick
    pub offsets: Offsets,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            default_bpm: Tempo::DEFAULT_BPM,
            default_time_signature: TimeSignature::default(),
            offsets: Offsets::default(),
        }
    }
}

impl ConductorConfig {
    /// Default tempo, falling back to 120 BPM when the configured value is unusable
    pub fn default_tempo(&self) -> Tempo {
        Tempo::try_new(self.default_bpm).unwrap_or_else(|| {
            log::warn!(
                "Configured default BPM {} is invalid, using {}",
                self.default_bpm,
                Tempo::DEFAULT_BPM
            );
            Tempo::default()
        })
    }

    /// Default time signature, falling back to 4/4 when the configured value is unusable
    pub fn default_time_signature(&self) -> TimeSignature {
        if self.default_time_signature.is_valid() {
            self.default_time_signature
        } else {
            log::warn!(
                "Configured default time signature {} is invalid, using 4/4",
                self.default_time_signature
            );
            TimeSignature::default()
        }
    }

    /// Load from a `.ron` or `.json` file
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let format = DocumentFormat::from_path(path)?;
        let data = std::fs::read_to_string(path)?;
        let config = from_str_as(&data, format)?;
        log::debug!("Loaded conductor config from {}", path.display());
        Ok(config)
    }

    /// Save to a `.ron` or `.json` file
    pub fn save(&self, path: &Path) -> Result<(), ChartError> {
        let format = DocumentFormat::from_path(path)?;
        std::fs::write(path, to_string_as(self, format)?)?;
        Ok(())
    }
}
