// Audio clock - Playback position source polled by the conductor
// The conductor never owns audio playback; it only reads a position through AudioClock

/// Playback position source
///
/// Implemented by whatever plays the song's audio. The position is expected to be
/// monotonically non-decreasing while playing, except when the user seeks.
pub trait AudioClock {
    /// Whether audio is currently playing
    fn is_playing(&self) -> bool;

    /// Raw playback position in milliseconds, before any offset
    fn raw_position_ms(&self) -> f64;
}

impl<T: AudioClock + ?Sized> AudioClock for &T {
    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn raw_position_ms(&self) -> f64 {
        (**self).raw_position_ms()
    }
}

/// Transport state (play/pause/stop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

/// Manually driven clock
///
/// Stands in for an audio engine in tools, simulations and tests: the host advances
/// it by its frame delta, and may seek or loop it like a real player.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    state: TransportState,
    position_ms: f64,
    loop_region: Option<(f64, f64)>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn position_ms(&self) -> f64 {
        self.position_ms
    }

    /// Play
    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    /// Pause (keep current position)
    pub fn pause(&mut self) {
        self.state = TransportState::Paused;
    }

    /// Stop (reset position to 0)
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.position_ms = 0.0;
    }

    /// Toggle play/pause
    pub fn toggle_play(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to a position, in either direction
    pub fn seek(&mut self, position_ms: f64) {
        self.position_ms = position_ms;
    }

    /// Advance by `delta_ms` if playing; returns the new position
    /// Wraps back into the loop region when one is set
    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        if !self.state.is_playing() {
            return self.position_ms;
        }

        let mut new_pos = self.position_ms + delta_ms;
        if let Some((loop_start, loop_end)) = self.loop_region {
            if new_pos >= loop_end {
                let loop_length = loop_end - loop_start;
                let overflow = new_pos - loop_end;
                new_pos = loop_start + overflow % loop_length;
            }
        }

        self.position_ms = new_pos;
        new_pos
    }

    /// Set loop region; `None` disables looping
    /// An empty or inverted region is ignored
    pub fn set_loop_region(&mut self, region: Option<(f64, f64)>) {
        match region {
            Some((start, end)) if end <= start => {
                log::warn!("Ignoring loop region {}..{} ms: end must be after start", start, end);
            }
            _ => self.loop_region = region,
        }
    }

    pub fn loop_region(&self) -> Option<(f64, f64)> {
        self.loop_region
    }
}

impl AudioClock for PlaybackClock {
    fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    fn raw_position_ms(&self) -> f64 {
        self.position_ms
    }
}
