// Conductor - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod chart;
pub mod config;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use audio::clock::{AudioClock, PlaybackClock, TransportState};
pub use chart::{ChartDocument, ChartError, ChartLoader, SongTiming, TimeChangeEntry};
pub use config::ConductorConfig;
pub use sequencer::{
    Conductor, ConductorEvent, ConductorState, EventKind, ListenerId, MusicalPosition, Offsets,
    Tempo, TempoMap, TempoMapError, TickOptions, TimeChangePoint, TimeSignature,
};
