//! Monosynth - audio device setup and the audio callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{PushError, RingBuffer};

use monosynth::{
    dsp::envelope::Envelope,
    io::keyboard::{NoteController, BASE_FREQUENCY, DEFAULT_HOLD_TIMEOUT},
    synth::{SampleClock, SharedFrequency, StopSignal, Voice, VoiceConfig},
    MAX_BLOCK_SIZE,
};

use super::ui::{self, UiApp, UiState, VIS_BUFFER_SIZE};

/// Capacity in visualisation windows for the audio → UI ring
const AUDIO_RING_BLOCKS: usize = 8;

/// Main application builder
pub struct Monosynth {
    config: VoiceConfig,
    base_frequency: f64,
    hold_timeout: f64,
    device: Option<String>,
}

impl Monosynth {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            base_frequency: BASE_FREQUENCY,
            hold_timeout: DEFAULT_HOLD_TIMEOUT,
            device: None,
        }
    }

    /// Pitch of the lowest key
    pub fn base_frequency(mut self, hz: f64) -> Self {
        self.base_frequency = hz;
        self
    }

    pub fn hold_timeout(mut self, seconds: f64) -> Self {
        self.hold_timeout = seconds;
        self
    }

    /// Output device by name; `None` uses the host default
    pub fn device(mut self, name: Option<String>) -> Self {
        self.device = name;
        self
    }

    /// Open the device, start the voice and run the terminal UI until quit
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = match &self.device {
            Some(name) => host
                .output_devices()
                .wrap_err("failed to enumerate output devices")?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| eyre!("no output device named '{name}'"))?,
            None => host
                .default_output_device()
                .ok_or_else(|| eyre!("no default output device available"))?,
        };
        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;

        log::info!("output device: {device_name}");
        log::info!("sample rate: {sample_rate} Hz, channels: {channels}");
        log::info!(
            "layers: {:?}, gain: {}, envelope: {:?}",
            self.config.layers,
            self.config.master_gain,
            self.config.envelope
        );

        // --- Shared state ---
        let frequency = SharedFrequency::default();
        let clock = SampleClock::new(sample_rate);
        let stop = StopSignal::new();

        // The UI mirrors the envelope from the same trigger events to display
        // stage and level without touching the audio thread.
        let mirror = Envelope::new(self.config.envelope)?;
        let layers = self.config.layers.clone();
        let (mut voice, notes) = Voice::channel(self.config, frequency)?;

        let (audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * AUDIO_RING_BLOCKS);

        // Buffer reused by audio callback
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                {
                    let clock = clock.clone();
                    let stop = stop.clone();
                    let mut audio_tx = audio_tx;
                    move |data: &mut [f32], _| {
                        if stop.is_stopped() {
                            data.fill(0.0);
                            return;
                        }

                        let total_frames = data.len() / channels;
                        let mut frames_written = 0;
                        while frames_written < total_frames {
                            let frames_remaining = total_frames - frames_written;
                            let frames_to_render = frames_remaining.min(MAX_BLOCK_SIZE);

                            let block = &mut render_buf[..frames_to_render];
                            voice.render_block(block, clock.now(), sample_rate);

                            // Duplicate mono to all channels and write to device
                            let out_off = frames_written * channels;
                            for (i, &s) in block.iter().enumerate() {
                                for ch in 0..channels {
                                    data[out_off + i * channels + ch] = s;
                                }
                            }

                            // Push mono block to UI ring, non-blocking (drop on overflow)
                            for &s in block.iter() {
                                if let Err(PushError::Full(_)) = audio_tx.push(s) {
                                    break;
                                }
                            }

                            clock.advance(frames_to_render);
                            frames_written += frames_to_render;
                        }
                    }
                },
                |err| log::error!("stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        let mut terminal = ratatui::init();
        let release_events = ui::enable_release_events();

        let controller = NoteController::new(self.base_frequency);
        let controller = if release_events {
            controller
        } else {
            controller.with_hold_timeout(self.hold_timeout)
        };
        let state = UiState {
            device: device_name,
            sample_rate,
            channels,
            layers,
            base_frequency: self.base_frequency,
            release_events,
        };

        let mut app = UiApp::new(
            audio_rx,
            state,
            controller,
            notes,
            mirror,
            clock.clone(),
            stop.clone(),
        );
        let result = app.run(&mut terminal);

        ui::disable_release_events(release_events);
        ratatui::restore();

        stop.stop();
        drop(stream);
        log::info!("stopped after {:.1} s", clock.now());

        result
    }
}

/// Print every output device the default host can open
pub fn list_devices() -> EyreResult<()> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    for device in host
        .output_devices()
        .wrap_err("failed to enumerate output devices")?
    {
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let marker = if Some(&name) == default_name.as_ref() {
            "*"
        } else {
            " "
        };
        println!("{marker} {name}");
    }

    Ok(())
}
