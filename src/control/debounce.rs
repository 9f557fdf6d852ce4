//! Per-sensor motion debounce with hysteresis
//!
//! Turns successive samples into a binary motion flag.  Motion is
//! declared only after more than `on_run_limit` consecutive over-threshold
//! deltas, and cleared only after more than `off_run_limit` consecutive
//! quiet ones.

use crate::sensors::{AxisMask, Sample};

/// Debounce parameters shared by every sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceParams {
    /// Per-axis delta (g) above which a sample counts as movement.
    pub threshold: f32,
    pub on_run_limit: u32,
    pub off_run_limit: u32,
    pub axes: AxisMask,
}

/// Mutable per-sensor record.
///
/// `on_run` and `off_run` are never both non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorState {
    pub last_sample: Sample,
    pub on_run: u32,
    pub off_run: u32,
    pub motion: bool,
}

impl SensorState {
    /// Fresh state seeded with the first reading of a newly discovered sensor.
    pub fn new(first: Sample) -> Self {
        Self {
            last_sample: first,
            on_run: 0,
            off_run: 0,
            motion: false,
        }
    }
}

/// Feed one sample and return the updated state.
#[must_use]
pub fn update(mut state: SensorState, sample: Sample, params: &DebounceParams) -> SensorState {
    let delta = sample.max_delta(&state.last_sample, params.axes);

    if delta > params.threshold {
        state.on_run = state.on_run.saturating_add(1);
        state.off_run = 0;
        if state.on_run > params.on_run_limit {
            state.motion = true;
            state.on_run = 0;
        }
    } else {
        state.off_run = state.off_run.saturating_add(1);
        state.on_run = 0;
        if state.off_run > params.off_run_limit {
            state.motion = false;
            state.off_run = 0;
        }
    }

    state.last_sample = sample;
    state
}
