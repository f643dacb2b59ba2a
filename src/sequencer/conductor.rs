// Conductor - Live musical clock
// Derives step/beat/measure from a polled playback position and emits boundary events

use super::events::{ConductorEvent, EventDispatcher, EventKind, ListenerId};
use super::offsets::Offsets;
use super::tempo_map::{TempoMap, TimeChangePoint};
use super::timeline::{
    MusicalPosition, STEPS_PER_BEAT, Tempo, TimeSignature, crochet_ms, step_crochet_ms,
};
use crate::audio::clock::AudioClock;
use crate::chart::types::SongTiming;
use crate::config::ConductorConfig;

/// Decimal places kept on the fractional step count, so a position landing exactly
/// on a boundary does not floor to the previous step
const STEP_TIME_PRECISION: f64 = 1e6;

/// Conductor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductorState {
    /// No song mapped; ticks and queries are no-ops
    Idle,
    /// A tempo map is installed
    Active,
}

/// Per-tick options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOptions {
    /// Add the combined offset to the raw position
    pub apply_offsets: bool,
    /// Dispatch boundary events even if the step did not change
    pub force_dispatch: bool,
}

impl Default for TickOptions {
    fn default() -> Self {
        Self {
            apply_offsets: true,
            force_dispatch: false,
        }
    }
}

/// Tempo-mapped musical clock
///
/// Owned by whatever drives the update loop. Call [`Conductor::update`] (or
/// [`Conductor::tick`] with a raw position) once per frame; listeners registered
/// with [`Conductor::subscribe`] are invoked synchronously from inside the tick.
///
/// # Example
/// ```
/// use conductor::{Conductor, PlaybackClock};
///
/// let mut conductor = Conductor::new();
/// conductor.map_song(120.0, Vec::new());
/// conductor.on_beat_hit(|beat| println!("beat {}", beat));
///
/// let mut clock = PlaybackClock::new();
/// clock.play();
/// clock.advance(1000.0);
/// conductor.update(&clock);
///
/// assert_eq!(conductor.current_step(), 8);
/// assert_eq!(conductor.current_beat(), 2);
/// ```
#[derive(Debug)]
pub struct Conductor {
    config: ConductorConfig,
    tempo_map: Option<TempoMap>,
    offsets: Offsets,
    bpm_override: Option<f64>,

    // Recomputed every tick
    song_position_ms: f64,
    current_step_time: f64,
    current: MusicalPosition,

    // Edge detection
    last_dispatched: Option<MusicalPosition>,
    last_bpm: Option<f64>,

    events: EventDispatcher,
}

impl Conductor {
    /// Create an idle conductor with default configuration
    pub fn new() -> Self {
        Self::with_config(ConductorConfig::default())
    }

    /// Create an idle conductor; offsets start from the configured calibration
    ///
    /// Non-finite configured offsets are logged and replaced by zero offsets.
    pub fn with_config(config: ConductorConfig) -> Self {
        let offsets = if config.offsets.is_finite() {
            config.offsets
        } else {
            log::warn!("Rejected non-finite configured offsets {:?}", config.offsets);
            Offsets::default()
        };
        Self {
            offsets,
            config,
            tempo_map: None,
            bpm_override: None,
            song_position_ms: 0.0,
            current_step_time: 0.0,
            current: MusicalPosition::default(),
            last_dispatched: None,
            last_bpm: None,
            events: EventDispatcher::new(),
        }
    }

    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    pub fn state(&self) -> ConductorState {
        if self.tempo_map.is_some() {
            ConductorState::Active
        } else {
            ConductorState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.tempo_map.is_some()
    }

    pub fn tempo_map(&self) -> Option<&TempoMap> {
        self.tempo_map.as_ref()
    }

    /// Map a song: install a fresh tempo map and reset the clock
    ///
    /// With no time changes the map is a single segment at `bpm`. An invalid `bpm`
    /// is logged and replaced by the configured default. Fires `BpmChanged` with
    /// that song tempo; the next tick always fires a fresh step event.
    pub fn map_song(&mut self, bpm: f64, time_changes: impl IntoIterator<Item = TimeChangePoint>) {
        let time_signature = self.config.default_time_signature();
        self.install_map(bpm, time_signature, time_changes);
    }

    /// Map a song from a chart timing section, applying its instrumental offset
    ///
    /// A non-finite instrumental offset is logged and the current one is kept.
    pub fn map_song_timing(&mut self, timing: &SongTiming) {
        let time_signature = if timing.time_signature.is_valid() {
            timing.time_signature
        } else {
            log::warn!(
                "Invalid chart time signature {}, using default",
                timing.time_signature
            );
            self.config.default_time_signature()
        };
        self.set_instrumental_offset(timing.instrumental_offset);
        self.install_map(timing.bpm, time_signature, timing.points());
    }

    fn install_map(
        &mut self,
        bpm: f64,
        time_signature: TimeSignature,
        time_changes: impl IntoIterator<Item = TimeChangePoint>,
    ) {
        let tempo = Tempo::try_new(bpm).unwrap_or_else(|| {
            log::warn!("Rejected song BPM {}, using default", bpm);
            self.config.default_tempo()
        });

        if self.tempo_map.is_some() {
            log::debug!("Remapping song, resetting conductor");
        }

        let map = TempoMap::new(time_changes, tempo, time_signature);
        log::debug!(
            "Mapped song at {} BPM, first segment at {} BPM",
            tempo.bpm(),
            map.first().bpm
        );
        self.tempo_map = Some(map);
        self.reset_clock();

        // The song tempo is announced as given; a first segment at another tempo is
        // announced by the first tick that enters it
        self.last_bpm = Some(tempo.bpm());
        self.events.dispatch(ConductorEvent::BpmChanged { bpm: tempo.bpm() });
    }

    /// Drop the current song and go idle
    pub fn unmap_song(&mut self) {
        if self.tempo_map.take().is_some() {
            log::debug!("Song unmapped, conductor idle");
        }
        self.reset_clock();
    }

    fn reset_clock(&mut self) {
        self.bpm_override = None;
        self.song_position_ms = 0.0;
        self.current_step_time = 0.0;
        self.current = MusicalPosition::default();
        self.last_dispatched = None;
        self.last_bpm = None;
    }

    /// Insert a tempo change into the active map
    ///
    /// Safe mid-playback: the active segment is re-derived on the next tick.
    /// Invalid changes are logged and dropped, leaving the map unchanged.
    /// Returns whether the change was accepted.
    pub fn add_time_change(
        &mut self,
        position_ms: f64,
        bpm: f64,
        numerator: u32,
        denominator: u32,
    ) -> bool {
        let Some(map) = self.tempo_map.as_mut() else {
            log::warn!("Ignoring time change at {} ms: no song mapped", position_ms);
            return false;
        };

        match map.add_point(TimeChangePoint::from_parts(
            position_ms,
            bpm,
            numerator,
            denominator,
        )) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Rejected time change: {}", e);
                false
            }
        }
    }

    /// Override the tempo of every segment, or clear the override with `None`
    ///
    /// Fires `BpmChanged` when the effective tempo changes. Invalid values are
    /// logged and ignored.
    pub fn force_bpm(&mut self, bpm: Option<f64>) {
        if let Some(value) = bpm {
            if !Tempo::is_valid_bpm(value) {
                log::warn!("Rejected forced BPM {}", value);
                return;
            }
        }
        self.bpm_override = bpm;

        if let Some(effective) = self.bpm() {
            self.announce_bpm(effective);
        }
    }

    pub fn forced_bpm(&self) -> Option<f64> {
        self.bpm_override
    }

    fn announce_bpm(&mut self, bpm: f64) {
        if self.last_bpm != Some(bpm) {
            self.last_bpm = Some(bpm);
            self.events.dispatch(ConductorEvent::BpmChanged { bpm });
        }
    }

    /// Poll the audio clock and tick if it is playing
    /// Returns whether a tick ran
    pub fn update(&mut self, clock: &impl AudioClock) -> bool {
        if !self.is_active() || !clock.is_playing() {
            return false;
        }
        self.tick(clock.raw_position_ms());
        true
    }

    /// Recompute the clock from a raw playback position
    pub fn tick(&mut self, raw_position_ms: f64) {
        self.tick_with(raw_position_ms, TickOptions::default());
    }

    /// Recompute the clock from a raw playback position with explicit options
    ///
    /// At most one `StepHit` fires per tick, however many step boundaries were
    /// crossed since the previous one. `BeatHit` and `MeasureHit` only fire
    /// alongside it, when the new step starts a beat (and that beat a measure).
    pub fn tick_with(&mut self, raw_position_ms: f64, options: TickOptions) {
        let Some(map) = self.tempo_map.as_ref() else {
            return;
        };
        if !raw_position_ms.is_finite() {
            log::warn!("Ignoring tick at non-finite position {}", raw_position_ms);
            return;
        }

        let position = if options.apply_offsets {
            raw_position_ms + self.offsets.combined()
        } else {
            raw_position_ms
        };

        let segment = *map.segment_for(position);
        let bpm = self.bpm_override.unwrap_or(segment.bpm);
        let step_time = segment.cumulative_steps()
            + (position - segment.position_ms) / step_crochet_ms(bpm);
        let step_time = (step_time * STEP_TIME_PRECISION).round() / STEP_TIME_PRECISION;

        let numerator = segment.numerator();
        let new = MusicalPosition::from_step(step_time.floor() as i64, numerator);

        self.song_position_ms = position;
        self.current_step_time = step_time;
        self.current = new;

        self.announce_bpm(bpm);

        let step_changed = self.last_dispatched.map(|last| last.step) != Some(new.step);
        if step_changed || options.force_dispatch {
            self.events.dispatch(ConductorEvent::StepHit { step: new.step });
            if new.is_beat_boundary() {
                self.events.dispatch(ConductorEvent::BeatHit { beat: new.beat });
                if new.is_measure_boundary(numerator) {
                    self.events.dispatch(ConductorEvent::MeasureHit {
                        measure: new.measure,
                    });
                }
            }
            self.last_dispatched = Some(new);
        }
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    /// Replace all four offsets; applied from the next tick
    ///
    /// If any value is non-finite the call is logged and nothing changes.
    pub fn set_offsets(&mut self, instrumental: f64, format: f64, input: f64, audio_visual: f64) {
        let offsets = Offsets::new(instrumental, format, input, audio_visual);
        if !offsets.is_finite() {
            log::warn!("Rejected non-finite offsets {:?}", offsets);
            return;
        }
        self.offsets = offsets;
    }

    pub fn instrumental_offset(&self) -> f64 {
        self.offsets.instrumental
    }

    pub fn set_instrumental_offset(&mut self, offset_ms: f64) {
        if accept_offset("instrumental", offset_ms) {
            self.offsets.instrumental = offset_ms;
        }
    }

    pub fn format_offset(&self) -> f64 {
        self.offsets.format
    }

    pub fn set_format_offset(&mut self, offset_ms: f64) {
        if accept_offset("format", offset_ms) {
            self.offsets.format = offset_ms;
        }
    }

    pub fn input_offset(&self) -> f64 {
        self.offsets.input
    }

    pub fn set_input_offset(&mut self, offset_ms: f64) {
        if accept_offset("input", offset_ms) {
            self.offsets.input = offset_ms;
        }
    }

    pub fn audio_visual_offset(&self) -> f64 {
        self.offsets.audio_visual
    }

    pub fn set_audio_visual_offset(&mut self, offset_ms: f64) {
        if accept_offset("audio/visual", offset_ms) {
            self.offsets.audio_visual = offset_ms;
        }
    }

    /// Sum of the four offsets
    pub fn combined_offset(&self) -> f64 {
        self.offsets.combined()
    }

    /// Fractional step at `time_ms`, `None` while idle
    pub fn step_at(&self, time_ms: f64) -> Option<f64> {
        self.tempo_map.as_ref().map(|map| map.step_at(time_ms))
    }

    /// Time in milliseconds of a (fractional) step, `None` while idle
    pub fn time_at_step(&self, step: f64) -> Option<f64> {
        self.tempo_map.as_ref().map(|map| map.time_at_step(step))
    }

    /// Fractional beat at `time_ms`, `None` while idle
    pub fn beat_at(&self, time_ms: f64) -> Option<f64> {
        self.tempo_map.as_ref().map(|map| map.beat_at(time_ms))
    }

    /// Time in milliseconds of a (fractional) beat, `None` while idle
    pub fn time_at_beat(&self, beat: f64) -> Option<f64> {
        self.tempo_map.as_ref().map(|map| map.time_at_beat(beat))
    }

    /// Offset-adjusted position used by the last tick
    pub fn song_position_ms(&self) -> f64 {
        self.song_position_ms
    }

    pub fn position(&self) -> MusicalPosition {
        self.current
    }

    pub fn current_step(&self) -> i64 {
        self.current.step
    }

    pub fn current_beat(&self) -> i64 {
        self.current.beat
    }

    pub fn current_measure(&self) -> i64 {
        self.current.measure
    }

    /// Fractional step count at the last tick
    pub fn current_step_time(&self) -> f64 {
        self.current_step_time
    }

    /// Fractional beat count at the last tick
    pub fn current_beat_time(&self) -> f64 {
        self.current_step_time / STEPS_PER_BEAT as f64
    }

    /// Fractional measure count at the last tick
    pub fn current_measure_time(&self) -> f64 {
        match self.time_signature() {
            Some(ts) => self.current_beat_time() / ts.numerator as f64,
            None => 0.0,
        }
    }

    fn active_segment(&self) -> Option<&TimeChangePoint> {
        self.tempo_map
            .as_ref()
            .map(|map| map.segment_for(self.song_position_ms))
    }

    /// Effective tempo of the active segment, forced BPM included
    pub fn bpm(&self) -> Option<f64> {
        self.active_segment()
            .map(|segment| self.bpm_override.unwrap_or(segment.bpm))
    }

    /// Tempo of the first segment
    pub fn starting_bpm(&self) -> Option<f64> {
        self.tempo_map.as_ref().map(|map| map.first().bpm)
    }

    pub fn time_signature(&self) -> Option<TimeSignature> {
        self.active_segment().map(|segment| segment.time_signature)
    }

    /// Beat length in milliseconds at the active tempo
    pub fn crochet_ms(&self) -> Option<f64> {
        self.bpm().map(crochet_ms)
    }

    /// Step length in milliseconds at the active tempo
    pub fn step_crochet_ms(&self) -> Option<f64> {
        self.bpm().map(step_crochet_ms)
    }

    /// Measure length in milliseconds at the active tempo and signature
    pub fn measure_length_ms(&self) -> Option<f64> {
        let crochet = self.crochet_ms()?;
        let ts = self.time_signature()?;
        Some(crochet * ts.numerator as f64)
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ConductorEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn on_step_hit<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(i64) + 'static,
    {
        self.events.subscribe_kind(EventKind::StepHit, move |event| {
            if let ConductorEvent::StepHit { step } = event {
                listener(*step);
            }
        })
    }

    pub fn on_beat_hit<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(i64) + 'static,
    {
        self.events.subscribe_kind(EventKind::BeatHit, move |event| {
            if let ConductorEvent::BeatHit { beat } = event {
                listener(*beat);
            }
        })
    }

    pub fn on_measure_hit<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(i64) + 'static,
    {
        self.events.subscribe_kind(EventKind::MeasureHit, move |event| {
            if let ConductorEvent::MeasureHit { measure } = event {
                listener(*measure);
            }
        })
    }

    pub fn on_bpm_changed<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(f64) + 'static,
    {
        self.events.subscribe_kind(EventKind::BpmChanged, move |event| {
            if let ConductorEvent::BpmChanged { bpm } = event {
                listener(*bpm);
            }
        })
    }
}

fn accept_offset(name: &str, offset_ms: f64) -> bool {
    if offset_ms.is_finite() {
        return true;
    }
    log::warn!("Rejected non-finite {} offset {}", name, offset_ms);
    false
}

impl Default for Conductor {
    fn default() -> Self {
        Self::new()
    }
}
