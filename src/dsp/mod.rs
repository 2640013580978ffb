//! Low-level DSP primitives used by the graph nodes.
//!
//! Rendering through these components never allocates. They stay focused on
//! the signal-processing math; scheduling and routing live in the graph.

/// Parameter automation timeline: set, linear and exponential ramps.
pub mod automation;
/// State-variable low-pass filter.
pub mod filter;
/// Band-unlimited oscillator waveforms.
pub mod oscillator;

pub use automation::{AutomationEvent, AutomationKind, ParamTimeline};
