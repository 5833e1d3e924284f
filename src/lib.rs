pub mod dsp; // Oscillator bank and envelope generator
pub mod io; // Keyboard note controller
pub mod synth; // The voice and its cross-thread plumbing

pub const MAX_BLOCK_SIZE: usize = 2048;
