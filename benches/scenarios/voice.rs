//! Benchmarks for complete voice blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::{
    dsp::Waveform,
    synth::{SharedFrequency, Voice, VoiceConfig},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    let patches = [
        ("default", VoiceConfig::default()),
        ("sine", VoiceConfig::default().with_layers([Waveform::Sine])),
        (
            "wobbly+noise",
            VoiceConfig::default().with_layers([Waveform::WobblySquare, Waveform::Noise]),
        ),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, config) in &patches {
            let (mut voice, mut notes) =
                Voice::channel(config.clone(), SharedFrequency::default()).unwrap();
            notes.note_on(110.0, 0.0);

            let mut start = 0.0;
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    voice.render_block(black_box(&mut buffer), start, SAMPLE_RATE);
                    start += size as f64 / SAMPLE_RATE;
                })
            });
        }
    }

    group.finish();
}
