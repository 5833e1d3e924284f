use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Frame counter advanced by the audio callback and read by the input thread.
///
/// Time is derived from whole frames so it never drifts, and the input
/// thread stamps note events with the same clock the voice renders against.
#[derive(Debug, Clone)]
pub struct SampleClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Seconds of audio rendered so far.
    pub fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }

    /// Called by the audio callback after writing `frames` frames.
    pub fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::Release);
    }
}
