//! Real-world scenario benchmarks.
//!
//! These model what the keynote binary actually renders: single sounding
//! notes and a whole keyboard row mixed together.

mod bank;
mod voices;

pub use bank::bench_bank;
pub use voices::bench_voices;
