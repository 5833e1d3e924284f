//! Command-line argument parsing.

use clap::Parser;

use monosynth::{
    dsp::{
        envelope::{AttackTarget, EnvelopeError, EnvelopeParams, Retrigger},
        Waveform,
    },
    io::keyboard::{BASE_FREQUENCY, DEFAULT_HOLD_TIMEOUT},
    synth::{voice::DEFAULT_MASTER_GAIN, VoiceConfig},
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "monosynth")]
#[command(about = "Monophonic keyboard synthesizer (keys z s x c f v g b n j m k , l . /)", long_about = None)]
pub struct Args {
    /// Attack time in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.2)]
    pub attack: f64,

    /// Decay time in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.1)]
    pub decay: f64,

    /// Sustain level (0.0 - 1.0)
    #[arg(long, value_name = "LEVEL", default_value_t = 0.8)]
    pub sustain: f64,

    /// Release time in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 0.5)]
    pub release: f64,

    /// Level the decay starts from (0.0 - 1.0)
    #[arg(long, value_name = "LEVEL", default_value_t = 1.0)]
    pub peak: f64,

    /// Ramp the attack to the peak level instead of the sustain level
    #[arg(long)]
    pub peak_attack: bool,

    /// Start a retriggered attack from the current level instead of zero
    #[arg(long)]
    pub legato: bool,

    /// Oscillator layers, comma separated
    #[arg(
        long,
        value_name = "WAVES",
        value_delimiter = ',',
        default_values_t = [Waveform::Triangle, Waveform::Square]
    )]
    pub wave: Vec<Waveform>,

    /// Master gain applied after the envelope
    #[arg(long, value_name = "GAIN", default_value_t = DEFAULT_MASTER_GAIN)]
    pub gain: f64,

    /// Pitch of the lowest key in Hz
    #[arg(long, value_name = "HZ", default_value_t = BASE_FREQUENCY)]
    pub base_frequency: f64,

    /// Seconds a key stays held without repeats when the terminal cannot report releases
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_HOLD_TIMEOUT)]
    pub hold_timeout: f64,

    /// Output device name (defaults to the system default)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Print the available output devices and exit
    #[arg(long)]
    pub list_devices: bool,
}

impl Args {
    /// Build the voice patch from the flags, rejecting invalid envelopes up front.
    pub fn voice_config(&self) -> Result<VoiceConfig, EnvelopeError> {
        let envelope = EnvelopeParams::adsr(self.attack, self.decay, self.sustain, self.release)
            .with_peak(self.peak)
            .with_attack_target(if self.peak_attack {
                AttackTarget::Peak
            } else {
                AttackTarget::Sustain
            })
            .with_retrigger(if self.legato {
                Retrigger::Legato
            } else {
                Retrigger::Restart
            });
        envelope.validate()?;

        Ok(VoiceConfig::default()
            .with_envelope(envelope)
            .with_layers(self.wave.clone())
            .with_master_gain(self.gain))
    }
}
