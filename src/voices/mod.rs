//! Instrument profiles: how a resolved frequency becomes a sounding note.
//!
//! Each profile picks a waveform and a signal path, and every profile shares
//! the same gain envelope (see [`envelope`]). The set is closed.
//!
//! # Example
//!
//! ```
//! use keynote::graph::AudioContext;
//! use keynote::voices::{self, Instrument};
//!
//! let mut ctx = AudioContext::new(48_000.0);
//! let osc = ctx.create_oscillator().unwrap();
//! let now = ctx.current_time();
//! let osc = voices::build(&mut ctx, Instrument::Piano, osc, 440.0, now, 1.0).unwrap();
//! ctx.oscillator_mut(&osc).unwrap().start(now).unwrap();
//! ```

mod bass;
pub mod envelope;
mod piano;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::graph::{AudioContext, GraphError, OscillatorHandle};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Instrument {
    #[default]
    Piano = 0,
    Bass = 1,
}

/// Where the oscillator's output goes before the gain envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routing {
    /// oscillator → gain → destination
    Direct,
    /// oscillator → low-pass filter → gain → destination
    LowPass { cutoff_hz: f32 },
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Piano, Instrument::Bass];

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Bass => "bass",
        }
    }

    pub fn waveform(self) -> Waveform {
        match self {
            Instrument::Piano => piano::WAVEFORM,
            Instrument::Bass => bass::WAVEFORM,
        }
    }

    pub fn filter_cutoff(self) -> Option<f32> {
        match self {
            Instrument::Piano => Some(piano::FILTER_CUTOFF),
            Instrument::Bass => None,
        }
    }

    pub fn routing(self) -> Routing {
        match self.filter_cutoff() {
            Some(cutoff_hz) => Routing::LowPass { cutoff_hz },
            None => Routing::Direct,
        }
    }

    /// The other instrument; handy for a toggle key.
    pub fn next(self) -> Self {
        match self {
            Instrument::Piano => Instrument::Bass,
            Instrument::Bass => Instrument::Piano,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Instrument::Bass,
            _ => Instrument::Piano,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInstrument(pub String);

impl fmt::Display for UnknownInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown instrument {:?} (expected piano or bass)", self.0)
    }
}

impl std::error::Error for UnknownInstrument {}

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .into_iter()
            .find(|i| i.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}

/// Shared, observable instrument choice.
///
/// Clones share one cell: setting it on the UI thread changes what every
/// voice built from a clone plays next. Notes already sounding keep their
/// instrument.
#[derive(Debug, Clone, Default)]
pub struct InstrumentSelector {
    current: Arc<AtomicU8>,
}

impl InstrumentSelector {
    pub fn new(instrument: Instrument) -> Self {
        Self {
            current: Arc::new(AtomicU8::new(instrument as u8)),
        }
    }

    pub fn get(&self) -> Instrument {
        Instrument::from_u8(self.current.load(Ordering::Relaxed))
    }

    pub fn set(&self, instrument: Instrument) {
        self.current.store(instrument as u8, Ordering::Relaxed);
    }
}

/// Configure an unstarted oscillator as a note of `instrument`.
///
/// The oscillator's frequency is set at the context's current time, the
/// gain envelope is scheduled from `start` over `duration` seconds, and the
/// chain is wired to the destination. The oscillator is handed back without
/// being started or stopped.
pub fn build(
    ctx: &mut AudioContext,
    instrument: Instrument,
    oscillator: OscillatorHandle,
    frequency: f64,
    start: f64,
    duration: f64,
) -> Result<OscillatorHandle, GraphError> {
    match instrument {
        Instrument::Piano => piano::build(ctx, oscillator, frequency, start, duration),
        Instrument::Bass => bass::build(ctx, oscillator, frequency, start, duration),
    }
}
