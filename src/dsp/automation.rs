/*
Parameter Automation
====================

A parameter (gain, frequency, cutoff) is not a single number: it is a curve
over time, described by a list of scheduled events. Rendering asks the
curve "what is your value at time t?" once per sample.

Vocabulary
----------

  event       A point on the timeline: (kind, time, target value).

  set         Jump to the value at the event time and hold it.

  linear      Ramp in a straight line from the previous event's value to
              this event's value, arriving exactly at this event's time.

  exponential Ramp along a constant-ratio curve. Each equal slice of time
              multiplies the value by the same factor, which is how our ears
              hear loudness change evenly.

  default     The value before any event has taken effect.


The Shape of a Note Envelope
----------------------------

  Gain
    1.0 ┐  ╱╲
        │ ╱  ╲
    0.5 │╱    ╲___
    0.2 │         ╲_______________
        │                         ╲
    0.0 └──────────────────────────╲──→ Time
        0  .02  .1             d-.1  d
         set lin  exp           exp   lin


Ramp Math
---------

A ramp event only knows where it ends. It starts wherever the previous event
left off (time T0, value V0) and ends at its own (T1, V1):

  linear:       v(t) = V0 + (V1 - V0) * (t - T0) / (T1 - T0)
  exponential:  v(t) = V0 * (V1 / V0) ^ ((t - T0) / (T1 - T0))

An exponential curve can never pass through zero, so when V0 is zero or V0
and V1 have different signs the value holds at V0 until T1 and then jumps.


Ordering
--------

Events are kept sorted by time. An event scheduled at a time that already has
events goes after them. Nothing is reordered or clamped beyond that, so a
ramp scheduled to end before an earlier-scheduled one simply takes effect
first. A ramp with no preceding event starts from the default value at time
zero.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationKind {
    SetValue,
    LinearRamp,
    ExponentialRamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationEvent {
    pub kind: AutomationKind,
    pub time: f64,
    pub value: f32,
}

/// Time-ordered automation curve for one parameter.
#[derive(Debug, Clone)]
pub struct ParamTimeline {
    default_value: f32,
    events: Vec<AutomationEvent>,
}

impl ParamTimeline {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Insert an event after every event at or before its time.
    pub fn insert(&mut self, kind: AutomationKind, time: f64, value: f32) {
        let idx = self.events.partition_point(|e| e.time <= time);
        self.events.insert(idx, AutomationEvent { kind, time, value });
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationKind::SetValue, time, value);
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationKind::LinearRamp, time, value);
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationKind::ExponentialRamp, time, value);
    }

    /// Drop every event, keeping the allocation.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Value of the curve at `time` seconds.
    pub fn value_at(&self, time: f64) -> f32 {
        let idx = self.events.partition_point(|e| e.time <= time);

        if let Some(next) = self.events.get(idx) {
            if next.kind != AutomationKind::SetValue {
                let (t0, v0) = match idx.checked_sub(1) {
                    Some(prev) => (self.events[prev].time, self.events[prev].value),
                    None => (0.0, self.default_value),
                };
                return ramp(next.kind, t0, v0, next.time, next.value, time);
            }
        }

        match idx.checked_sub(1) {
            Some(prev) => self.events[prev].value,
            None => self.default_value,
        }
    }

    /// Fill `out` with one value per sample, starting at `start_time`.
    pub fn render(&self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        if self.events.is_empty() {
            out.fill(self.default_value);
            return;
        }

        let dt = 1.0 / f64::from(sample_rate);
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start_time + i as f64 * dt);
        }
    }
}

fn ramp(kind: AutomationKind, t0: f64, v0: f32, t1: f64, v1: f32, t: f64) -> f32 {
    if t1 <= t0 {
        return v1;
    }

    let progress = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    match kind {
        AutomationKind::LinearRamp => v0 + (v1 - v0) * progress as f32,
        AutomationKind::ExponentialRamp => {
            if v0 == 0.0 || v0.is_sign_negative() != v1.is_sign_negative() {
                v0
            } else {
                let ratio = f64::from(v1) / f64::from(v0);
                (f64::from(v0) * ratio.powf(progress)) as f32
            }
        }
        AutomationKind::SetValue => v1,
    }
}
