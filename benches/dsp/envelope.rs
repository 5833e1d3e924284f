//! Benchmarks for envelope amplitude queries in each stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::envelope::{Envelope, EnvelopeParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn query_block(env: &Envelope, buffer: &mut [f64], start: f64) {
    for (i, out) in buffer.iter_mut().enumerate() {
        *out = env.amplitude_at(start + i as f64 / SAMPLE_RATE);
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Attack phase (ramping up)
        let mut env = Envelope::new(EnvelopeParams::default()).unwrap();
        env.note_on(0.0);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| query_block(&env, black_box(&mut buffer), black_box(0.05)))
        });

        // Sustain phase (holding steady)
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| query_block(&env, black_box(&mut buffer), black_box(1.0)))
        });

        // Release phase (ramping down)
        let mut env = Envelope::new(EnvelopeParams::default()).unwrap();
        env.note_on(0.0);
        env.note_off(1.0);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| query_block(&env, black_box(&mut buffer), black_box(1.1)))
        });
    }

    group.finish();
}
