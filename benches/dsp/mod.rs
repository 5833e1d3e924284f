//! Benchmarks for the oscillator bank and envelope.

mod envelope;
mod oscillator;

pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
