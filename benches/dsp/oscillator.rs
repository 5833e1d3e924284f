//! Benchmarks for waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::oscillator::{generate_with, Waveform};
use rand::{rngs::SmallRng, SeedableRng};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let mut rng = SmallRng::seed_from_u64(1);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // WobblySquare is the expensive one: 59 sin() calls per sample
        for waveform in Waveform::ALL {
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    for (i, out) in buffer.iter_mut().enumerate() {
                        let t = i as f64 / SAMPLE_RATE;
                        *out = generate_with(black_box(110.0), t, waveform, &mut rng);
                    }
                })
            });
        }
    }

    group.finish();
}
