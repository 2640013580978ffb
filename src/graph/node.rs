use std::fmt;

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Context time of the first sample in the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Time of sample `index` within the block.
    #[inline]
    pub fn time_at(&self, index: usize) -> f64 {
        self.time + index as f64 / f64::from(self.sample_rate)
    }
}

/// Core trait for audio processing graph nodes
///
/// `buffer` arrives holding the sum of the node's inputs and leaves holding
/// its output.
pub trait GraphNode: Send {
    fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx);

    /// Check whether this node is done producing sound for good.
    ///
    /// Finished nodes are released from the context after the block.
    fn has_finished(&self, _time: f64) -> bool {
        false
    }
}

/// Slot index plus generation. A released slot bumps its generation, so an
/// old id never matches a node created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Anything that names a node in an [`AudioContext`](super::AudioContext).
pub trait AudioNodeHandle {
    fn id(&self) -> NodeId;
}

/// Owning handle to an oscillator. Not `Clone`: whoever holds it decides
/// when the oscillator starts and stops.
#[derive(Debug, PartialEq, Eq)]
pub struct OscillatorHandle(pub(crate) NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainHandle(pub(crate) NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterHandle(pub(crate) NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationHandle(pub(crate) NodeId);

macro_rules! impl_handle {
    ($($ty:ty),*) => {
        $(impl AudioNodeHandle for $ty {
            fn id(&self) -> NodeId {
                self.0
            }
        })*
    };
}

impl_handle!(OscillatorHandle, GainHandle, FilterHandle, DestinationHandle);

/// Errors raised by the audio graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The node was never created here, or has already been released.
    UnknownNode(NodeId),
    /// The operation is not valid in the node's current state.
    InvalidState(&'static str),
    /// The connection would feed a source or close a cycle.
    InvalidConnection { from: NodeId, to: NodeId },
    /// Automation times must be finite and non-negative.
    InvalidTime(f64),
    /// Ramp targets must be finite; exponential targets also non-zero.
    InvalidRampTarget(f32),
    /// The context has been closed.
    Closed,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::UnknownNode(id) => write!(f, "node {id} does not exist"),
            GraphError::InvalidState(what) => write!(f, "invalid state: {what}"),
            GraphError::InvalidConnection { from, to } => {
                write!(f, "cannot connect node {from} to node {to}")
            }
            GraphError::InvalidTime(time) => write!(f, "invalid automation time {time}"),
            GraphError::InvalidRampTarget(value) => write!(f, "invalid ramp target {value}"),
            GraphError::Closed => write!(f, "audio context is closed"),
        }
    }
}

impl std::error::Error for GraphError {}
