use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Time-Keyed ADSR Envelope
========================

This envelope does not advance per sample. It records WHEN the gate opened
and closed, and answers "what is the amplitude at time t?" from those two
timestamps alone. The stage (Attack, Decay, Sustain, Release) is derived
from elapsed time on every query, never stored.

Vocabulary
----------

  gate        Note held (open) or released (closed). note_on opens it,
              note_off closes it.

  trigger     The pair of timestamps (note_on_time, note_off_time) plus the
              gate flag. This is the only mutable state.

  elapsed     time - note_on_time while the gate is open.

  floor       Amplitudes at or below 0.0001 snap to exactly 0.0 so the tail
              of a release never hisses in the denormal range.


The Shape
---------

  Level
    peak ┐       ┌╮
         │      ╱│ ╲
    S    │     ╱ │  ╲___________
         │    ╱  │              ╲
    0.0  └───╱───┴───────────────╲──→ Time
          Attack Decay  Sustain   Release

With the default AttackTarget::Sustain the attack ramps 0 → sustain, and
decay then starts from `peak` and falls back to sustain. The step up to
peak at the attack/decay boundary is part of the sound this envelope has
always had. AttackTarget::Peak gives the textbook shape instead
(0 → peak → sustain) with no step.

  gate open:
    elapsed <= A            start + (target - start) · elapsed/A
    A < elapsed <= A + D    peak + (sustain - peak) · (elapsed - A)/D
    elapsed > A + D         sustain

  gate closed:
    sustain - sustain · (time - note_off_time)/R     clamped, floored

Release always ramps from the sustain level, regardless of where the note
was when the gate closed.


Retrigger
---------

Retrigger::Restart (default) restarts the attack from 0 on every note_on,
even mid-note. Retrigger::Legato captures the amplitude at the retrigger
instant and ramps the new attack from there instead.
*/

/// Amplitudes at or below this are emitted as exactly zero.
pub const AMPLITUDE_FLOOR: f64 = 0.0001;

/// Which level the attack ramp climbs to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttackTarget {
    #[default]
    Sustain,
    Peak,
}

/// What a note_on does to an envelope that is already sounding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retrigger {
    #[default]
    Restart,
    Legato,
}

/// Derived stage at a given query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeError {
    /// Attack, decay or release is zero, negative or not finite.
    NonPositiveDuration { name: &'static str, value: f64 },
    /// Sustain or peak is outside [0, 1] or not finite.
    LevelOutOfRange { name: &'static str, value: f64 },
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeError::NonPositiveDuration { name, value } => {
                write!(f, "{name} time must be a positive number of seconds, got {value}")
            }
            EnvelopeError::LevelOutOfRange { name, value } => {
                write!(f, "{name} level must be within 0.0..=1.0, got {value}")
            }
        }
    }
}

impl std::error::Error for EnvelopeError {}

/// Shape parameters. Times in seconds, levels in 0.0..=1.0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub peak: f64,
    pub attack_target: AttackTarget,
    pub retrigger: Retrigger,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.2,
            decay: 0.1,
            sustain: 0.8,
            release: 0.5,
            peak: 1.0,
            attack_target: AttackTarget::Sustain,
            retrigger: Retrigger::Restart,
        }
    }
}

impl EnvelopeParams {
    pub fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
            ..Self::default()
        }
    }

    pub fn with_peak(mut self, peak: f64) -> Self {
        self.peak = peak;
        self
    }

    pub fn with_attack_target(mut self, target: AttackTarget) -> Self {
        self.attack_target = target;
        self
    }

    pub fn with_retrigger(mut self, retrigger: Retrigger) -> Self {
        self.retrigger = retrigger;
        self
    }

    pub fn validate(&self) -> Result<(), EnvelopeError> {
        for (name, value) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EnvelopeError::NonPositiveDuration { name, value });
            }
        }

        for (name, value) in [("sustain", self.sustain), ("peak", self.peak)] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(EnvelopeError::LevelOutOfRange { name, value });
            }
        }

        Ok(())
    }
}

pub struct Envelope {
    params: EnvelopeParams,

    // Trigger state, written by note_on/note_off only
    note_on_time: f64,
    note_off_time: f64,
    gate_open: bool,
    triggered: bool,         // false until the first note_on
    attack_start_level: f64, // 0.0 unless a legato retrigger captured a level
}

impl Envelope {
    /// Build an envelope, rejecting non-positive durations and out-of-range levels.
    pub fn new(params: EnvelopeParams) -> Result<Self, EnvelopeError> {
        params.validate()?;

        Ok(Self {
            params,
            note_on_time: 0.0,
            note_off_time: 0.0,
            gate_open: false,
            triggered: false,
            attack_start_level: 0.0,
        })
    }

    /// Gate high at `at_time`. Restarts the attack even if the gate is already open.
    pub fn note_on(&mut self, at_time: f64) {
        let at_time = self.monotonic(at_time);

        self.attack_start_level = match self.params.retrigger {
            Retrigger::Restart => 0.0,
            Retrigger::Legato => self.amplitude_at(at_time),
        };

        self.note_on_time = at_time;
        self.gate_open = true;
        self.triggered = true;
    }

    /// Gate low at `at_time`. Release ramps from the sustain level.
    pub fn note_off(&mut self, at_time: f64) {
        self.note_off_time = self.monotonic(at_time);
        self.gate_open = false;
    }

    // Trigger timestamps never move backwards.
    fn monotonic(&self, at_time: f64) -> f64 {
        if self.triggered {
            at_time.max(self.note_on_time).max(self.note_off_time)
        } else {
            at_time
        }
    }

    /// Amplitude at `time`, never negative, snapped to 0.0 below the floor.
    pub fn amplitude_at(&self, time: f64) -> f64 {
        if !self.triggered {
            return 0.0;
        }

        let EnvelopeParams {
            attack,
            decay,
            sustain,
            release,
            peak,
            attack_target,
            ..
        } = self.params;

        let amplitude = if self.gate_open {
            let elapsed = time - self.note_on_time;

            if elapsed <= attack {
                let target = match attack_target {
                    AttackTarget::Sustain => sustain,
                    AttackTarget::Peak => peak,
                };
                let start = self.attack_start_level;
                start + (target - start) * (elapsed / attack)
            } else if elapsed <= attack + decay {
                peak + (sustain - peak) * ((elapsed - attack) / decay)
            } else {
                sustain
            }
        } else {
            let released = time - self.note_off_time;
            sustain - sustain * (released / release)
        };

        if amplitude <= AMPLITUDE_FLOOR {
            0.0
        } else {
            amplitude
        }
    }

    /// Stage the envelope is in at `time`, derived from the trigger timestamps.
    pub fn stage_at(&self, time: f64) -> EnvelopeStage {
        if !self.triggered {
            return EnvelopeStage::Idle;
        }

        let EnvelopeParams {
            attack,
            decay,
            release,
            ..
        } = self.params;

        if self.gate_open {
            let elapsed = time - self.note_on_time;
            if elapsed <= attack {
                EnvelopeStage::Attack
            } else if elapsed <= attack + decay {
                EnvelopeStage::Decay
            } else {
                EnvelopeStage::Sustain
            }
        } else if time - self.note_off_time < release && self.amplitude_at(time) > 0.0 {
            EnvelopeStage::Release
        } else {
            EnvelopeStage::Idle
        }
    }

    /// True while the envelope would produce a non-zero level at `time`.
    pub fn is_active_at(&self, time: f64) -> bool {
        !matches!(self.stage_at(time), EnvelopeStage::Idle)
    }

    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn note_on_time(&self) -> f64 {
        self.note_on_time
    }

    pub fn note_off_time(&self) -> f64 {
        self.note_off_time
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn default_env() -> Envelope {
        Envelope::new(EnvelopeParams::default()).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOL,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn untriggered_envelope_is_silent_and_idle() {
        let env = default_env();
        assert_eq!(env.amplitude_at(0.0), 0.0);
        assert_eq!(env.amplitude_at(3.0), 0.0);
        assert_eq!(env.stage_at(0.0), EnvelopeStage::Idle);
        assert!(!env.gate_open());
    }

    #[test]
    fn attack_ramps_toward_sustain() {
        let mut env = default_env();
        env.note_on(0.0);

        assert_close(env.amplitude_at(0.0), 0.0);
        assert_close(env.amplitude_at(0.1), 0.4);
        assert_close(env.amplitude_at(0.2), 0.8);
        assert_eq!(env.stage_at(0.1), EnvelopeStage::Attack);
    }

    #[test]
    fn decay_falls_from_peak_to_sustain() {
        let mut env = default_env();
        env.note_on(0.0);

        assert_close(env.amplitude_at(0.25), 0.9);
        assert_close(env.amplitude_at(0.3), 0.8);
        assert_eq!(env.stage_at(0.25), EnvelopeStage::Decay);
    }

    #[test]
    fn sustain_holds_while_gate_open() {
        let mut env = default_env();
        env.note_on(1.0);

        for i in 0..100 {
            let t = 1.31 + i as f64 * 0.37;
            assert_close(env.amplitude_at(t), 0.8);
            assert_eq!(env.stage_at(t), EnvelopeStage::Sustain);
        }
    }

    #[test]
    fn release_reaches_exact_zero() {
        let mut env = default_env();
        env.note_on(0.0);
        env.note_off(1.0);

        assert_close(env.amplitude_at(1.25), 0.4);
        assert_eq!(env.stage_at(1.25), EnvelopeStage::Release);
        assert_eq!(env.amplitude_at(1.5), 0.0);
        assert_eq!(env.amplitude_at(7.0), 0.0);
        assert_eq!(env.stage_at(1.6), EnvelopeStage::Idle);
    }

    #[test]
    fn tail_below_floor_snaps_to_zero() {
        let mut env = default_env();
        env.note_on(0.0);
        env.note_off(1.0);

        // 0.8 · (1 - x/0.5) <= 0.0001  =>  x >= 0.4999375
        assert_eq!(env.amplitude_at(1.0 + 0.49995), 0.0);
        assert!(env.amplitude_at(1.0 + 0.4999) > AMPLITUDE_FLOOR);
    }

    #[test]
    fn release_during_attack_ramps_from_sustain() {
        let mut env = default_env();
        env.note_on(0.0);
        env.note_off(0.05);

        assert_close(env.amplitude_at(0.05), 0.8);
        assert_close(env.amplitude_at(0.3), 0.4);
    }

    #[test]
    fn retrigger_restarts_attack_from_zero() {
        let mut env = default_env();
        env.note_on(0.0);
        env.note_off(1.0);
        env.note_on(1.2);

        assert!(env.gate_open());
        assert_close(env.amplitude_at(1.2), 0.0);
        assert_close(env.amplitude_at(1.3), 0.4);
    }

    #[test]
    fn legato_retrigger_keeps_current_level() {
        let params = EnvelopeParams::default().with_retrigger(Retrigger::Legato);
        let mut env = Envelope::new(params).unwrap();
        env.note_on(0.0);
        env.note_on(2.0);

        assert_close(env.amplitude_at(2.0), 0.8);
        assert_close(env.amplitude_at(2.1), 0.8);
    }

    #[test]
    fn peak_target_gives_classic_shape() {
        let params = EnvelopeParams::default().with_attack_target(AttackTarget::Peak);
        let mut env = Envelope::new(params).unwrap();
        env.note_on(0.0);

        assert_close(env.amplitude_at(0.1), 0.5);
        assert_close(env.amplitude_at(0.2), 1.0);
        assert_close(env.amplitude_at(0.25), 0.9);
    }

    #[test]
    fn trigger_times_never_move_backwards() {
        let mut env = default_env();
        env.note_on(2.0);
        env.note_off(1.0);

        assert_eq!(env.note_off_time(), 2.0);
        env.note_on(0.5);
        assert_eq!(env.note_on_time(), 2.0);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let bad = [
            EnvelopeParams::adsr(0.0, 0.1, 0.8, 0.5),
            EnvelopeParams::adsr(0.2, -0.1, 0.8, 0.5),
            EnvelopeParams::adsr(0.2, 0.1, 0.8, f64::NAN),
            EnvelopeParams::adsr(0.2, 0.1, 1.5, 0.5),
            EnvelopeParams::default().with_peak(-0.2),
        ];
        for params in bad {
            assert!(Envelope::new(params).is_err(), "{params:?} should be rejected");
        }

        let err = EnvelopeParams::adsr(0.0, 0.1, 0.8, 0.5).validate().unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::NonPositiveDuration {
                name: "attack",
                value: 0.0
            }
        );
    }
}
