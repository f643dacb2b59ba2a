// Events - Boundary-crossing notifications emitted by the conductor
// Ordered listener list, invoked synchronously from inside a tick

use std::fmt;

/// Event emitted by the conductor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConductorEvent {
    /// A new step was entered
    StepHit { step: i64 },
    /// A new step that starts a beat was entered
    BeatHit { beat: i64 },
    /// A new beat that starts a measure was entered
    MeasureHit { measure: i64 },
    /// The effective tempo changed (new song, tempo segment or forced BPM)
    BpmChanged { bpm: f64 },
}

impl ConductorEvent {
    /// Short name of the event kind, for logs
    pub fn kind(&self) -> EventKind {
        match self {
            ConductorEvent::StepHit { .. } => EventKind::StepHit,
            ConductorEvent::BeatHit { .. } => EventKind::BeatHit,
            ConductorEvent::MeasureHit { .. } => EventKind::MeasureHit,
            ConductorEvent::BpmChanged { .. } => EventKind::BpmChanged,
        }
    }
}

impl fmt::Display for ConductorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConductorEvent::StepHit { step } => write!(f, "step {}", step),
            ConductorEvent::BeatHit { beat } => write!(f, "beat {}", beat),
            ConductorEvent::MeasureHit { measure } => write!(f, "measure {}", measure),
            ConductorEvent::BpmChanged { bpm } => write!(f, "bpm -> {:.2}", bpm),
        }
    }
}

/// Event kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StepHit,
    BeatHit,
    MeasureHit,
    BpmChanged,
}

/// Handle returned on subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ConductorEvent)>;

/// Ordered list of event listeners
///
/// Listeners run in registration order. Not `Send`: the conductor lives on the
/// thread that drives the update loop.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ConductorEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Register a listener for a single event kind
    pub fn subscribe_kind<F>(&mut self, kind: EventKind, mut listener: F) -> ListenerId
    where
        F: FnMut(&ConductorEvent) + 'static,
    {
        self.subscribe(move |event| {
            if event.kind() == kind {
                listener(event);
            }
        })
    }

    /// Remove a listener; returns false if the id is unknown
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Invoke every listener with the event, in registration order
    pub fn dispatch(&mut self, event: ConductorEvent) {
        log::trace!("Dispatching {} to {} listener(s)", event, self.listeners.len());
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
