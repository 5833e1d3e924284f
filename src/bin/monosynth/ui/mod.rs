//! TUI module for monosynth
//!
//! Polls the computer keyboard, turns key presses into note events for the
//! voice, and draws the voice state and an oscilloscope of its output.

mod keys;
pub mod state;
mod status;
mod waveform;

use std::{io, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use monosynth::{
    dsp::envelope::Envelope,
    io::keyboard::{key_index, NoteController, NoteEvent},
    synth::{NoteHandle, SampleClock, StopSignal},
};

pub use state::{UiState, VoiceSnapshot};

use keys::render_keys;
use status::render_status;
use waveform::render_waveform;

/// Audio visualization buffer size
pub const VIS_BUFFER_SIZE: usize = 1024;

/// Ask the terminal to report key releases. Returns whether it agreed.
pub fn enable_release_events() -> bool {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

pub fn disable_release_events(enabled: bool) {
    if enabled {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
}

/// UI application state
pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    state: UiState,
    controller: NoteController,
    notes: NoteHandle,
    /// Same triggers as the voice's envelope, for display
    mirror: Envelope,
    clock: SampleClock,
    stop: StopSignal,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        state: UiState,
        controller: NoteController,
        notes: NoteHandle,
        mirror: Envelope,
        clock: SampleClock,
        stop: StopSignal,
    ) -> Self {
        Self {
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            state,
            controller,
            notes,
            mirror,
            clock,
            stop,
        }
    }

    /// Run the input/draw loop until the stop signal is raised
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.stop.is_stopped() {
            self.poll_audio();

            if let Some(event) = self.controller.poll(self.clock.now()) {
                self.dispatch(event);
            }

            let snapshot = self.snapshot();
            terminal.draw(|frame| self.render(frame, &snapshot))?;

            // Keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        if let Some(event) = self.controller.release_all(self.clock.now()) {
            self.dispatch(event);
        }

        Ok(())
    }

    /// Keep the newest VIS_BUFFER_SIZE samples from the ring
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        self.audio_buffer.reserve(available);
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let quit = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        };
        if quit {
            if key.kind == KeyEventKind::Press {
                self.stop.stop();
            }
            return;
        }

        let KeyCode::Char(c) = key.code else {
            return;
        };
        let Some(index) = key_index(c) else {
            return;
        };

        let now = self.clock.now();
        let event = match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.controller.key_down(index, now),
            KeyEventKind::Release => self.controller.key_up(index, now),
        };
        if let Some(event) = event {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::On {
                frequency, time, ..
            } => {
                self.notes.note_on(frequency, time);
                self.mirror.note_on(time);
            }
            NoteEvent::Off { time, .. } => {
                self.notes.note_off(time);
                self.mirror.note_off(time);
            }
        }
    }

    fn snapshot(&self) -> VoiceSnapshot {
        let time = self.clock.now();
        VoiceSnapshot {
            time,
            key: self.controller.current_key(),
            frequency: self.notes.frequency().get(),
            stage: self.mirror.stage_at(time),
            level: self.mirror.amplitude_at(time),
        }
    }

    fn render(&self, frame: &mut Frame, snapshot: &VoiceSnapshot) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(5), // Keys
                Constraint::Min(8),    // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_status(frame, chunks[0], &self.state, snapshot);
        render_keys(frame, chunks[1], &self.state, snapshot);
        render_waveform(frame, chunks[2], &self.audio_buffer);

        let help = if self.state.release_events {
            " [z..,/] Play  [Q/Esc] Quit"
        } else {
            " [z..,/] Play (held while repeating)  [Q/Esc] Quit"
        };
        let help = Paragraph::new(format!(
            "{help}   {} · {}ch",
            self.state.device, self.state.channels
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
