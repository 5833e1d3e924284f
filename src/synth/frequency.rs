use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Pitch shared between the input thread (writer) and the audio thread (reader).
///
/// The `f64` is stored as its bit pattern in an `AtomicU64`, so reads and
/// writes are single lock-free operations that can never tear. Cloning
/// shares the same cell.
#[derive(Debug, Clone, Default)]
pub struct SharedFrequency {
    bits: Arc<AtomicU64>,
}

impl SharedFrequency {
    pub fn new(hz: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(hz.to_bits())),
        }
    }

    /// Latest pitch in Hz. 0.0 until a note has been played.
    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, hz: f64) {
        self.bits.store(hz.to_bits(), Ordering::Relaxed);
    }
}
