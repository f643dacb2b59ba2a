// Module audio - Playback position source consumed by the conductor

pub mod clock;

pub use clock::{AudioClock, PlaybackClock, TransportState};
