//! Real-world scenario benchmarks.
//!
//! These render whole blocks through a voice exactly as the audio callback
//! does, including draining the note queue.

mod voice;

pub use voice::bench_voice;
