// Sequencer module
// Tempo map, conductor clock, latency offsets and boundary events

pub mod conductor;
pub mod events;
pub mod offsets;
pub mod tempo_map;
pub mod timeline;

pub use conductor::{Conductor, ConductorState, TickOptions};
pub use events::{ConductorEvent, EventDispatcher, EventKind, ListenerId};
pub use offsets::Offsets;
pub use tempo_map::{TempoMap, TempoMapError, TimeChangePoint};
pub use timeline::{MusicalPosition, STEPS_PER_BEAT, Tempo, TimeSignature};
