//! Low-level DSP primitives for the synthesis core.
//!
//! Everything here is allocation-free and safe to evaluate from the audio
//! callback. Both primitives are queried by absolute time rather than
//! stepped per sample, so they can be tested at arbitrary instants.

/// Time-keyed attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Stateless waveform generators and noise.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeError, EnvelopeParams, EnvelopeStage};
pub use oscillator::{generate, generate_with, Waveform};
