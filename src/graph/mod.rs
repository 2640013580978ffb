//! A small scheduled audio graph.
//!
//! Nodes wrap the low-level DSP primitives with what a note needs to play:
//! sample-accurate start/stop, automatable parameters, and routing to a
//! single destination. The [`AudioContext`] owns the nodes and the clock;
//! callers hold typed handles.

/// Node arena, routing, clock and block rendering.
pub mod context;
/// Biquad-style filter node with an automatable cutoff.
pub mod filter;
/// Gain node; carries a note's volume envelope.
pub mod gain;
/// Core traits, handles and errors shared by all graph nodes.
pub mod node;
/// Scheduled one-shot oscillator.
pub mod oscillator;
/// Validated automation parameters.
pub mod param;

pub use context::{AudioContext, ContextState};
pub use node::{
    AudioNodeHandle, DestinationHandle, FilterHandle, GainHandle, GraphError, GraphNode, NodeId,
    OscillatorHandle, RenderCtx,
};
pub use param::AudioParam;
