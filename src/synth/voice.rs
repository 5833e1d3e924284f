use rand::{rngs::SmallRng, SeedableRng};
#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeError, EnvelopeParams},
        oscillator::{generate_with, Waveform},
    },
    synth::{
        frequency::SharedFrequency,
        message::{MessageReceiver, NoMessages, SynthMessage},
    },
};

/*
Voice Mixer
===========

One voice = oscillator layers at the shared pitch, summed, shaped by the
envelope and scaled by a master gain:

    out(t) = gain · amplitude(t) · Σ layer(frequency, t)

The default patch is Triangle + Square at gain 0.5. The triangle peaks at
±1 and the square sits at ±0.5, so the sum stays within ±1.5 and the
gained output within ±0.75.

The voice owns its envelope. Gate changes arrive as SynthMessages through
a lock-free SPSC queue and are applied at the top of each rendered block,
so the audio thread is the only one that ever touches envelope state. The
pitch is read from SharedFrequency once per sample.
*/

pub const DEFAULT_MASTER_GAIN: f64 = 0.5;

#[cfg(feature = "rtrb")]
const NOTE_QUEUE_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub envelope: EnvelopeParams,
    pub layers: Vec<Waveform>,
    pub master_gain: f64,
    /// Fixed seed for the noise layer; entropy-seeded when `None`.
    pub noise_seed: Option<u64>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            envelope: EnvelopeParams::default(),
            layers: vec![Waveform::Triangle, Waveform::Square],
            master_gain: DEFAULT_MASTER_GAIN,
            noise_seed: None,
        }
    }
}

impl VoiceConfig {
    pub fn with_envelope(mut self, envelope: EnvelopeParams) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_layers(mut self, layers: impl Into<Vec<Waveform>>) -> Self {
        self.layers = layers.into();
        self
    }

    /// Negative and non-finite gains are treated as silence.
    pub fn with_master_gain(mut self, gain: f64) -> Self {
        self.master_gain = if gain.is_finite() { gain.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }
}

pub struct Voice<R: MessageReceiver = NoMessages> {
    envelope: Envelope,
    frequency: SharedFrequency,
    layers: Vec<Waveform>,
    master_gain: f64,
    rng: SmallRng,
    rx: R,
}

impl Voice<NoMessages> {
    /// A voice driven directly through [`Voice::envelope_mut`].
    pub fn new(config: VoiceConfig, frequency: SharedFrequency) -> Result<Self, EnvelopeError> {
        Self::with_receiver(config, frequency, NoMessages)
    }
}

#[cfg(feature = "rtrb")]
impl Voice<Consumer<SynthMessage>> {
    /// Create the voice for the audio thread and the handle for the input thread.
    pub fn channel(
        config: VoiceConfig,
        frequency: SharedFrequency,
    ) -> Result<(Self, NoteHandle), EnvelopeError> {
        let (tx, rx) = RingBuffer::<SynthMessage>::new(NOTE_QUEUE_SIZE);
        let voice = Self::with_receiver(config, frequency.clone(), rx)?;
        let handle = NoteHandle { tx, frequency };

        Ok((voice, handle))
    }
}

impl<R: MessageReceiver> Voice<R> {
    pub fn with_receiver(
        config: VoiceConfig,
        frequency: SharedFrequency,
        rx: R,
    ) -> Result<Self, EnvelopeError> {
        let envelope = Envelope::new(config.envelope)?;
        let rng = match config.noise_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Ok(Self {
            envelope,
            frequency,
            layers: config.layers,
            master_gain: config.master_gain,
            rng,
            rx,
        })
    }

    /// One output sample at absolute `time` seconds.
    #[inline]
    pub fn sample(&mut self, time: f64) -> f64 {
        let frequency = self.frequency.get();

        let mut sum = 0.0;
        for &layer in &self.layers {
            sum += generate_with(frequency, time, layer, &mut self.rng);
        }

        self.master_gain * self.envelope.amplitude_at(time) * sum
    }

    pub fn apply(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { time } => self.envelope.note_on(time),
            SynthMessage::NoteOff { time } => self.envelope.note_off(time),
        }
    }

    /// Apply every pending gate event.
    pub fn drain_messages(&mut self) {
        while let Some(message) = self.rx.pop() {
            self.apply(message);
        }
    }

    /// Fill `out` with consecutive samples starting at `start_time`.
    pub fn render_block(&mut self, out: &mut [f32], start_time: f64, sample_rate: f64) {
        self.drain_messages();

        let dt = 1.0 / sample_rate;
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.sample(start_time + i as f64 * dt) as f32;
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.get()
    }

    pub fn layers(&self) -> &[Waveform] {
        &self.layers
    }
}

/// Input-thread side of a voice: sets the pitch and queues gate events.
#[cfg(feature = "rtrb")]
pub struct NoteHandle {
    tx: Producer<SynthMessage>,
    frequency: SharedFrequency,
}

#[cfg(feature = "rtrb")]
impl NoteHandle {
    /// Set the pitch and open the gate at `time`.
    pub fn note_on(&mut self, frequency: f64, time: f64) {
        self.frequency.set(frequency);
        self.send(SynthMessage::NoteOn { time });
    }

    pub fn note_off(&mut self, time: f64) {
        self.send(SynthMessage::NoteOff { time });
    }

    pub fn frequency(&self) -> &SharedFrequency {
        &self.frequency
    }

    fn send(&mut self, message: SynthMessage) {
        if self.tx.push(message).is_err() {
            log::warn!("note queue full, dropping {message:?}");
        }
    }
}
