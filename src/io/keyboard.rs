//! Computer-keyboard note controller.
//!
//! Sixteen keys on the bottom two letter rows form a chromatic keyboard
//! starting at [`BASE_FREQUENCY`]:
//!
//! ```text
//!    s     f  g     j  k  l
//!  z  x  c  v  b  n  m  ,  .  /
//! ```
//!
//! The layout index is the semitone offset, so the pitch of key `i` is
//! `base · 2^(i/12)`. [`NoteController`] turns raw key presses and releases
//! into monophonic note events: the newest key wins and retriggers, and a
//! held key repeating does nothing.

/// A2. The lowest key on the layout.
pub const BASE_FREQUENCY: f64 = 110.0;

/// Keys in semitone order.
pub const KEY_LAYOUT: [char; 16] = [
    'z', 's', 'x', 'c', 'f', 'v', 'g', 'b', 'n', 'j', 'm', 'k', ',', 'l', '.', '/',
];

const NOTE_NAMES: [&str; 16] = [
    "A2", "A#2", "B2", "C3", "C#3", "D3", "D#3", "E3", "F3", "F#3", "G3", "G#3", "A3", "A#3",
    "B3", "C4",
];

/// How long a key counts as held without a repeat, for terminals that never
/// report key releases. Longer than the usual 500 ms auto-repeat delay.
pub const DEFAULT_HOLD_TIMEOUT: f64 = 0.6;

/// Layout index for a typed character, if it is a note key.
pub fn key_index(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    KEY_LAYOUT.iter().position(|&k| k == c)
}

/// Equal-tempered pitch of the key at `index` semitones above `base`.
pub fn frequency_for_key(index: usize, base: f64) -> f64 {
    base * 2.0_f64.powf(index as f64 / 12.0)
}

/// Note name of a layout key when played from [`BASE_FREQUENCY`].
pub fn note_name(index: usize) -> Option<&'static str> {
    NOTE_NAMES.get(index).copied()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    On { key: usize, frequency: f64, time: f64 },
    Off { key: usize, time: f64 },
}

pub struct NoteController {
    base_frequency: f64,
    hold_timeout: Option<f64>,
    current: Option<usize>,
    last_seen: f64,
}

impl NoteController {
    pub fn new(base_frequency: f64) -> Self {
        Self {
            base_frequency,
            hold_timeout: None,
            current: None,
            last_seen: 0.0,
        }
    }

    /// Release a held key automatically after `seconds` without a press or repeat.
    pub fn with_hold_timeout(mut self, seconds: f64) -> Self {
        self.hold_timeout = Some(seconds);
        self
    }

    /// A press or auto-repeat of `key`.
    pub fn key_down(&mut self, key: usize, now: f64) -> Option<NoteEvent> {
        if key >= KEY_LAYOUT.len() {
            return None;
        }

        self.last_seen = now;
        if self.current == Some(key) {
            return None;
        }

        self.current = Some(key);
        Some(NoteEvent::On {
            key,
            frequency: frequency_for_key(key, self.base_frequency),
            time: now,
        })
    }

    /// A release of `key`. Releasing anything but the sounding key is ignored.
    pub fn key_up(&mut self, key: usize, now: f64) -> Option<NoteEvent> {
        if self.current != Some(key) {
            return None;
        }

        self.current = None;
        Some(NoteEvent::Off { key, time: now })
    }

    /// Expire a held key whose repeats have stopped arriving.
    pub fn poll(&mut self, now: f64) -> Option<NoteEvent> {
        let timeout = self.hold_timeout?;
        let key = self.current?;

        if now - self.last_seen > timeout {
            self.current = None;
            Some(NoteEvent::Off { key, time: now })
        } else {
            None
        }
    }

    /// Release whatever is held, e.g. on shutdown.
    pub fn release_all(&mut self, now: f64) -> Option<NoteEvent> {
        self.current
            .take()
            .map(|key| NoteEvent::Off { key, time: now })
    }

    pub fn current_key(&self) -> Option<usize> {
        self.current
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }
}

impl Default for NoteController {
    fn default() -> Self {
        Self::new(BASE_FREQUENCY)
    }
}
