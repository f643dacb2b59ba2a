// Tempo map - Piecewise tempo/time-signature schedule
// Integrates beats across tempo changes and converts between milliseconds and steps

use super::timeline::{STEPS_PER_BEAT, Tempo, TimeSignature, crochet_ms, step_crochet_ms};

/// Errors raised when a time change cannot enter a tempo map
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TempoMapError {
    #[error("Invalid BPM {bpm} at {position_ms} ms: BPM must be finite and > 0")]
    InvalidBpm { position_ms: f64, bpm: f64 },

    #[error("Invalid time signature {numerator}/{denominator} at {position_ms} ms")]
    InvalidTimeSignature {
        position_ms: f64,
        numerator: u32,
        denominator: u32,
    },

    #[error("Invalid time change position: {0}")]
    InvalidPosition(f64),
}

/// One tempo/time-signature change point
///
/// `cumulative_beats` is derived by the owning [`TempoMap`]: the number of beats
/// elapsed from 0 ms up to `position_ms`, integrated across all earlier segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeChangePoint {
    pub position_ms: f64,
    pub bpm: f64,
    pub time_signature: TimeSignature,
    cumulative_beats: f64,
}

impl TimeChangePoint {
    pub fn new(position_ms: f64, bpm: f64, time_signature: TimeSignature) -> Self {
        Self {
            position_ms,
            bpm,
            time_signature,
            cumulative_beats: 0.0,
        }
    }

    /// Build from raw parts as they come out of a chart
    pub fn from_parts(position_ms: f64, bpm: f64, numerator: u32, denominator: u32) -> Self {
        Self::new(
            position_ms,
            bpm,
            TimeSignature {
                numerator,
                denominator,
            },
        )
    }

    pub fn cumulative_beats(&self) -> f64 {
        self.cumulative_beats
    }

    /// Whole steps elapsed before this point
    pub fn cumulative_steps(&self) -> f64 {
        self.cumulative_beats * STEPS_PER_BEAT as f64
    }

    pub fn numerator(&self) -> u32 {
        self.time_signature.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.time_signature.denominator
    }

    pub fn crochet_ms(&self) -> f64 {
        crochet_ms(self.bpm)
    }

    pub fn step_crochet_ms(&self) -> f64 {
        step_crochet_ms(self.bpm)
    }

    /// Check the caller-supplied fields
    pub fn validate(&self) -> Result<(), TempoMapError> {
        if !self.position_ms.is_finite() {
            return Err(TempoMapError::InvalidPosition(self.position_ms));
        }
        if !Tempo::is_valid_bpm(self.bpm) {
            return Err(TempoMapError::InvalidBpm {
                position_ms: self.position_ms,
                bpm: self.bpm,
            });
        }
        if !self.time_signature.is_valid() {
            return Err(TempoMapError::InvalidTimeSignature {
                position_ms: self.position_ms,
                numerator: self.time_signature.numerator,
                denominator: self.time_signature.denominator,
            });
        }
        Ok(())
    }
}

/// Ordered schedule of tempo changes for one song
///
/// Invariants: sorted ascending by `position_ms` and never empty.
///
/// Queries before the first point extrapolate backwards with the first
/// point's tempo, so `step_at` returns negative steps for times before it.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    points: Vec<TimeChangePoint>,
}

impl TempoMap {
    /// Build a map from caller points
    ///
    /// Invalid points are logged and dropped. When nothing valid remains, a single
    /// point at 0 ms is synthesized from the fallback tempo and signature.
    pub fn new(
        points: impl IntoIterator<Item = TimeChangePoint>,
        fallback_tempo: Tempo,
        fallback_signature: TimeSignature,
    ) -> Self {
        let mut points: Vec<TimeChangePoint> = points
            .into_iter()
            .filter(|point| match point.validate() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Dropping time change: {}", e);
                    false
                }
            })
            .collect();

        if points.is_empty() {
            points.push(TimeChangePoint::new(
                0.0,
                fallback_tempo.bpm(),
                fallback_signature,
            ));
        }

        // Stable: points sharing a position keep their input order
        points.sort_by(|a, b| a.position_ms.total_cmp(&b.position_ms));

        let mut map = Self { points };
        map.recompute();
        log::debug!(
            "Tempo map built with {} point(s), starting at {} BPM",
            map.points.len(),
            map.points[0].bpm
        );
        map
    }

    /// Single-segment map at 0 ms
    pub fn constant(tempo: Tempo, time_signature: TimeSignature) -> Self {
        Self::new(std::iter::empty(), tempo, time_signature)
    }

    /// Recompute cumulative beats for the whole sequence
    pub fn recompute(&mut self) {
        self.recompute_from(0);
    }

    /// Recompute cumulative beats for points at `index` and after
    ///
    /// Points before `index` are left untouched.
    pub fn recompute_from(&mut self, index: usize) {
        if index == 0 {
            self.points[0].cumulative_beats = 0.0;
        }
        for i in index.max(1)..self.points.len() {
            let prev = self.points[i - 1];
            let elapsed_beats = (self.points[i].position_ms - prev.position_ms) / prev.crochet_ms();
            self.points[i].cumulative_beats = prev.cumulative_beats + elapsed_beats;
        }
    }

    pub fn points(&self) -> &[TimeChangePoint] {
        &self.points
    }

    pub fn first(&self) -> &TimeChangePoint {
        &self.points[0]
    }

    /// Number of change points (always >= 1)
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Index of the segment active at `position_ms`
    pub fn segment_index_for(&self, position_ms: f64) -> usize {
        self.points
            .partition_point(|p| p.position_ms <= position_ms)
            .saturating_sub(1)
    }

    /// Last point at or before `position_ms`, or the first point when earlier
    pub fn segment_for(&self, position_ms: f64) -> &TimeChangePoint {
        &self.points[self.segment_index_for(position_ms)]
    }

    /// Fractional step count at `position_ms`
    pub fn step_at(&self, position_ms: f64) -> f64 {
        let segment = self.segment_for(position_ms);
        let delta_ms = position_ms - segment.position_ms;
        segment.cumulative_steps() + delta_ms / segment.step_crochet_ms()
    }

    /// Fractional beat count at `position_ms`
    pub fn beat_at(&self, position_ms: f64) -> f64 {
        self.step_at(position_ms) / STEPS_PER_BEAT as f64
    }

    /// Fractional measure count at `position_ms`, divided by the active numerator
    pub fn measure_at(&self, position_ms: f64) -> f64 {
        let segment = self.segment_for(position_ms);
        self.beat_at(position_ms) / segment.numerator() as f64
    }

    /// Inverse of [`TempoMap::step_at`]
    pub fn time_at_step(&self, step: f64) -> f64 {
        let index = self
            .points
            .partition_point(|p| p.cumulative_steps() <= step)
            .saturating_sub(1);
        let segment = &self.points[index];
        let delta_steps = step - segment.cumulative_steps();
        segment.position_ms + delta_steps * segment.step_crochet_ms()
    }

    /// Inverse of [`TempoMap::beat_at`]
    pub fn time_at_beat(&self, beat: f64) -> f64 {
        self.time_at_step(beat * STEPS_PER_BEAT as f64)
    }

    /// Insert a change point, keeping the map sorted
    ///
    /// A point sharing its position with existing points goes after them, so it
    /// becomes the active segment from that position on. Returns the insertion index.
    /// On error the map is left untouched.
    pub fn add_point(&mut self, point: TimeChangePoint) -> Result<usize, TempoMapError> {
        point.validate()?;

        let index = self
            .points
            .partition_point(|p| p.position_ms <= point.position_ms);
        self.points.insert(index, point);
        self.recompute_from(index);

        log::debug!(
            "Inserted time change at {} ms ({} BPM, {}) as point {}",
            point.position_ms,
            point.bpm,
            point.time_signature,
            index
        );
        Ok(index)
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::constant(Tempo::default(), TimeSignature::default())
    }
}
