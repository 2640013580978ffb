use crate::dsp::automation::{AutomationEvent, ParamTimeline};
use crate::graph::node::GraphError;

/// A schedulable node parameter.
///
/// Validates inputs, then hands them to the [`ParamTimeline`], which owns
/// the curve math.
#[derive(Debug, Clone)]
pub struct AudioParam {
    timeline: ParamTimeline,
}

fn check_time(time: f64) -> Result<(), GraphError> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidTime(time))
    }
}

fn check_value(value: f32) -> Result<(), GraphError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GraphError::InvalidRampTarget(value))
    }
}

impl AudioParam {
    pub fn new(default_value: f32) -> Self {
        Self {
            timeline: ParamTimeline::new(default_value),
        }
    }

    pub fn default_value(&self) -> f32 {
        self.timeline.default_value()
    }

    pub fn events(&self) -> &[AutomationEvent] {
        self.timeline.events()
    }

    pub fn value_at(&self, time: f64) -> f32 {
        self.timeline.value_at(time)
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> Result<(), GraphError> {
        check_time(time)?;
        check_value(value)?;
        self.timeline.set_value_at_time(value, time);
        Ok(())
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> Result<(), GraphError> {
        check_time(time)?;
        check_value(value)?;
        self.timeline.linear_ramp_to_value_at_time(value, time);
        Ok(())
    }

    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f32,
        time: f64,
    ) -> Result<(), GraphError> {
        check_time(time)?;
        check_value(value)?;
        if value == 0.0 {
            return Err(GraphError::InvalidRampTarget(value));
        }
        self.timeline.exponential_ramp_to_value_at_time(value, time);
        Ok(())
    }

    /// Forget all scheduled automation.
    pub(crate) fn reset(&mut self) {
        self.timeline.clear();
    }

    pub(crate) fn render(&self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        self.timeline.render(out, start_time, sample_rate);
    }
}
