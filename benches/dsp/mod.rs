//! Low-level DSP primitive benchmarks.

mod automation;
mod filter;
mod oscillator;

pub use automation::bench_automation;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
