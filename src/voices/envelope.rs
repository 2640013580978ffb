//! The note gain envelope shared by every instrument.
//!
//! # Shape
//!
//! ```text
//!   Gain
//!   1.0 ┐  ╱╲
//!       │ ╱  ╲              attack   linear       0   → 1.0  by start + 0.02
//!   0.5 │╱    ╲__           decay    exponential  1.0 → 0.5  by start + 0.1
//!   0.2 │        ╲______    sustain  exponential  0.5 → 0.2  by start + d - 0.1
//!       │               ╲   release  linear       0.2 → 0    by start + d
//!   0.0 └────────────────╲──→ time
//! ```
//!
//! For a note of duration `d > 0.2` the control points are strictly ordered.
//! Shorter notes push the sustain point at or before the decay point; the
//! points are scheduled as-is and the automation timeline orders them by
//! time, so the curve for such notes is degenerate but deterministic.

use crate::dsp::automation::AutomationKind;
use crate::graph::{AudioParam, GraphError};

pub const ATTACK_TIME: f64 = 0.02;
pub const PEAK_LEVEL: f32 = 1.0;
pub const DECAY_TIME: f64 = 0.1;
pub const DECAY_LEVEL: f32 = 0.5;
pub const SUSTAIN_LEVEL: f32 = 0.2;
/// Time before the note's end at which the sustain level is reached.
pub const RELEASE_TIME: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePoint {
    pub kind: AutomationKind,
    pub time: f64,
    pub value: f32,
}

impl EnvelopePoint {
    const fn new(kind: AutomationKind, time: f64, value: f32) -> Self {
        Self { kind, time, value }
    }
}

/// The five control points of a note starting at `start` and lasting
/// `duration` seconds, in scheduling order.
///
/// Times are floored at zero; a parameter timeline cannot hold events before
/// the context started.
pub fn envelope_points(start: f64, duration: f64) -> [EnvelopePoint; 5] {
    use AutomationKind::*;

    let at = |offset: f64| (start + offset).max(0.0);
    [
        EnvelopePoint::new(SetValue, at(0.0), 0.0),
        EnvelopePoint::new(LinearRamp, at(ATTACK_TIME), PEAK_LEVEL),
        EnvelopePoint::new(ExponentialRamp, at(DECAY_TIME), DECAY_LEVEL),
        EnvelopePoint::new(ExponentialRamp, at(duration - RELEASE_TIME), SUSTAIN_LEVEL),
        EnvelopePoint::new(LinearRamp, at(duration), 0.0),
    ]
}

/// Schedule the note envelope on a gain parameter.
pub fn apply(gain: &mut AudioParam, start: f64, duration: f64) -> Result<(), GraphError> {
    for point in envelope_points(start, duration) {
        match point.kind {
            AutomationKind::SetValue => gain.set_value_at_time(point.value, point.time)?,
            AutomationKind::LinearRamp => gain.linear_ramp_to_value_at_time(point.value, point.time)?,
            AutomationKind::ExponentialRamp => {
                gain.exponential_ramp_to_value_at_time(point.value, point.time)?
            }
        }
    }
    Ok(())
}
