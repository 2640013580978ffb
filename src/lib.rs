pub mod dsp;
pub mod graph; // Scheduled audio graph: context, nodes, parameters
pub mod input; // Held-key tracking
pub mod pitch; // Note names to frequencies
pub mod synth; // Note voices, timers and the voice bank
pub mod voices; // Instrument profiles and the note envelope

pub const MAX_BLOCK_SIZE: usize = 2048;

pub use pitch::{resolve, Note, NoteError, PitchClass};
pub use synth::note_voice::{NoteVoice, PlayingSignal, VoiceError, DEFAULT_DURATION};
pub use voices::{Instrument, InstrumentSelector};
