//! Display state for the terminal UI

use monosynth::dsp::{EnvelopeStage, Waveform};

/// Static information fixed once the stream is running
#[derive(Clone, Debug)]
pub struct UiState {
    /// Output device name
    pub device: String,
    /// Audio sample rate in Hz
    pub sample_rate: f64,
    /// Output channel count
    pub channels: usize,
    /// Oscillator layers in the patch
    pub layers: Vec<Waveform>,
    /// Pitch of the lowest key
    pub base_frequency: f64,
    /// Whether the terminal reports key releases
    pub release_events: bool,
}

/// Per-frame view of the voice, rebuilt before every draw
#[derive(Clone, Copy, Debug)]
pub struct VoiceSnapshot {
    /// Seconds on the sample clock
    pub time: f64,
    /// Layout index of the held key
    pub key: Option<usize>,
    /// Latest pitch written to the voice
    pub frequency: f64,
    pub stage: EnvelopeStage,
    pub level: f64,
}
