use std::{f64::consts::PI, fmt, str::FromStr};

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Oscillator Bank
===============

Every waveform here is a pure function of (frequency, time). There is no
phase accumulator: the caller supplies absolute time in seconds and the
oscillator evaluates the shape at that instant. This keeps the bank
stateless, so a voice can be evaluated at arbitrary (even non-monotonic)
times for testing, and retuning mid-note never has to carry phase state.

The price is phase continuity on pitch changes: jumping from 110 Hz to
220 Hz at time t lands on whatever phase 220 Hz has at t. For a single
keyboard voice that restarts its envelope on every note this is inaudible.

Vocabulary
----------

  angle       2π · frequency · time. Everything below is a function of it,
              except PerfectSquare (which works from the period directly) and
              Noise (which ignores it).

  headroom    Square is emitted at ±0.5 rather than ±1 so it can be summed
              with a full-scale layer without clipping the mix.


The Shapes
----------

  Sine           sin(angle)
  Square         +0.5 when sin(angle) >= 0, else -0.5
  Triangle       (2/π) · asin(sin(angle))
  WobblySquare   (2/π) · Σ sin(n·angle)/n  for n in 1..=59
                 A band-limited partial sum. Odd AND even harmonics are used,
                 so the result ripples ("wobbles") around a hard edge shape
                 whose sign follows the fundamental.
  PerfectSquare  ±1 from the remainder of time modulo the period. Exact hard
                 edges, so it aliases at high pitches. That is expected.
  Noise          uniform in [-1, 1], fresh each call.


Degenerate Input
----------------

A real-time path must never stop on bad input. Frequencies that are zero,
negative, NaN or infinite evaluate to silence for every shape, including
noise (a voice with no pitch set is silent).
*/

/// Partial-sum length for [`Waveform::WobblySquare`].
///
/// Higher values sharpen the edges and cost one `sin` per harmonic per sample.
pub const WOBBLY_SQUARE_HARMONICS: u32 = 59;

const SQUARE_LEVEL: f64 = 0.5;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    WobblySquare,
    PerfectSquare,
    Noise,
}

impl Waveform {
    pub const ALL: [Waveform; 6] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::WobblySquare,
        Waveform::PerfectSquare,
        Waveform::Noise,
    ];

    /// Look up a waveform by its numeric selector (0 = Sine ... 5 = Noise).
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::WobblySquare => "wobbly-square",
            Waveform::PerfectSquare => "perfect-square",
            Waveform::Noise => "noise",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWaveformError {
    input: String,
}

impl fmt::Display for ParseWaveformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown waveform '{}' (expected one of: sine, square, triangle, wobbly-square, perfect-square, noise)",
            self.input
        )
    }
}

impl std::error::Error for ParseWaveformError {}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|w| w.name() == normalized || w.name().replace('-', "") == normalized)
            .ok_or_else(|| ParseWaveformError {
                input: s.to_string(),
            })
    }
}

/// Angular frequency in radians per second.
#[inline]
fn angular(frequency: f64) -> f64 {
    frequency * 2.0 * PI
}

#[inline]
fn is_audible(frequency: f64) -> bool {
    frequency.is_finite() && frequency > 0.0
}

/// Evaluate `waveform` at `frequency` Hz and absolute `time` seconds.
///
/// Noise draws from the thread-local RNG; use [`generate_with`] when the
/// random source must be controlled.
pub fn generate(frequency: f64, time: f64, waveform: Waveform) -> f64 {
    generate_with(frequency, time, waveform, &mut rand::thread_rng())
}

/// Same as [`generate`] with an injectable random source for noise.
pub fn generate_with<R: Rng>(
    frequency: f64,
    time: f64,
    waveform: Waveform,
    rng: &mut R,
) -> f64 {
    if !is_audible(frequency) {
        return 0.0;
    }

    let angle = angular(frequency) * time;

    match waveform {
        Waveform::Sine => angle.sin(),
        Waveform::Square => {
            if angle.sin() >= 0.0 {
                SQUARE_LEVEL
            } else {
                -SQUARE_LEVEL
            }
        }
        Waveform::Triangle => (2.0 / PI) * angle.sin().asin(),
        Waveform::WobblySquare => {
            let sum: f64 = (1..=WOBBLY_SQUARE_HARMONICS)
                .map(|n| {
                    let n = n as f64;
                    (n * angle).sin() / n
                })
                .sum();
            sum * (2.0 / PI)
        }
        Waveform::PerfectSquare => {
            let period = 1.0 / frequency;
            let remainder = time.rem_euclid(period);
            if remainder < period * 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Noise => rng.gen_range(-1.0..=1.0),
    }
}

/// Evaluate a waveform selected by numeric index. Unknown selectors are silent.
pub fn generate_indexed(frequency: f64, time: f64, index: u8) -> f64 {
    match Waveform::from_index(index) {
        Some(waveform) => generate(frequency, time, waveform),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn times(count: usize, step: f64) -> impl Iterator<Item = f64> {
        (0..count).map(move |i| i as f64 * step)
    }

    #[test]
    fn sine_stays_in_unit_range() {
        for &freq in &[1.0, 110.0, 440.0, 3_520.0, 19_000.0] {
            for t in times(2_000, 1.0 / 44_100.0) {
                let s = generate(freq, t, Waveform::Sine);
                assert!((-1.0..=1.0).contains(&s), "sine({freq}, {t}) = {s}");
            }
        }
    }

    #[test]
    fn square_is_half_scale_and_follows_sine_sign() {
        let freq = 110.0;
        for t in times(4_000, 1.0 / 48_000.0) {
            let sine = generate(freq, t, Waveform::Sine);
            let square = generate(freq, t, Waveform::Square);
            assert_eq!(square.abs(), 0.5);
            if sine.abs() > 1e-9 {
                assert_eq!(square.signum(), sine.signum(), "t = {t}");
            }
        }
    }

    #[test]
    fn square_at_origin_is_positive() {
        assert_eq!(generate(110.0, 0.0, Waveform::Square), 0.5);
    }

    #[test]
    fn triangle_is_bounded_and_continuous() {
        let freq = 220.0;
        let step = 1.0 / 96_000.0;
        // Max slope of the triangle is 4·f per second.
        let max_jump = 4.0 * freq * step * 1.01;

        let mut prev = generate(freq, 0.0, Waveform::Triangle);
        for t in times(10_000, step).skip(1) {
            let s = generate(freq, t, Waveform::Triangle);
            assert!((-1.0..=1.0).contains(&s));
            assert!((s - prev).abs() <= max_jump, "jump at t = {t}");
            prev = s;
        }
    }

    #[test]
    fn sine_and_triangle_share_zero_crossings() {
        let freq = 110.0;
        for k in 0..20 {
            let t = (k as f64 * 0.5) / freq;
            assert!(generate(freq, t, Waveform::Sine).abs() < 1e-9);
            assert!(generate(freq, t, Waveform::Triangle).abs() < 1e-9);
        }
    }

    #[test]
    fn triangle_peaks_at_quarter_period() {
        let freq = 100.0;
        let t = 0.25 / freq;
        assert!((generate(freq, t, Waveform::Triangle) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wobbly_square_tracks_fundamental_sign() {
        let freq = 50.0;
        let period = 1.0 / freq;
        // Sample well away from the edges where the partial sum rings.
        for k in 1..20 {
            let fraction = k as f64 / 20.0;
            if (fraction - 0.5).abs() < 0.06 {
                continue;
            }
            let t = fraction * period;
            let wobbly = generate(freq, t, Waveform::WobblySquare);
            let sine = generate(freq, t, Waveform::Sine);
            assert_eq!(wobbly.signum(), sine.signum(), "fraction {fraction}");
            assert!(wobbly.abs() <= 1.2, "Gibbs overshoot out of range: {wobbly}");
        }
    }

    #[test]
    fn perfect_square_is_hard_edged() {
        let freq = 100.0;
        assert_eq!(generate(freq, 0.001, Waveform::PerfectSquare), 1.0);
        assert_eq!(generate(freq, 0.006, Waveform::PerfectSquare), -1.0);
        assert_eq!(generate(freq, 0.011, Waveform::PerfectSquare), 1.0);
    }

    #[test]
    fn perfect_square_handles_negative_time() {
        let s = generate(100.0, -0.004, Waveform::PerfectSquare);
        assert_eq!(s, generate(100.0, 0.006, Waveform::PerfectSquare));
    }

    #[test]
    fn degenerate_frequency_is_silent() {
        for waveform in Waveform::ALL {
            for &freq in &[0.0, -110.0, f64::NAN, f64::INFINITY] {
                assert_eq!(generate(freq, 0.123, waveform), 0.0, "{waveform} @ {freq}");
            }
        }
    }

    #[test]
    fn noise_is_bounded_and_varies() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f64> = (0..1_000)
            .map(|_| generate_with(440.0, 0.0, Waveform::Noise, &mut rng))
            .collect();
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(samples.iter().any(|&s| (s - samples[0]).abs() > EPS));
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            assert_eq!(
                generate_with(220.0, 0.5, Waveform::Noise, &mut a),
                generate_with(220.0, 0.5, Waveform::Noise, &mut b)
            );
        }
    }

    #[test]
    fn unknown_index_is_silent() {
        assert_eq!(generate_indexed(440.0, 0.1, 6), 0.0);
        assert_eq!(generate_indexed(440.0, 0.1, 255), 0.0);
        let t = 0.25 / 440.0;
        assert!((generate_indexed(440.0, t, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Sine".parse::<Waveform>(), Ok(Waveform::Sine));
        assert_eq!("wobbly_square".parse::<Waveform>(), Ok(Waveform::WobblySquare));
        assert_eq!("perfectsquare".parse::<Waveform>(), Ok(Waveform::PerfectSquare));
        assert!("saw".parse::<Waveform>().is_err());
        for waveform in Waveform::ALL {
            assert_eq!(waveform.to_string().parse::<Waveform>(), Ok(waveform));
        }
    }
}
