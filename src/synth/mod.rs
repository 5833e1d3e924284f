// Purpose: the single voice and the plumbing that connects it to the
// audio thread and the input thread.

pub mod clock;
pub mod control;
pub mod frequency;
pub mod message;
pub mod voice;

pub use clock::SampleClock;
pub use control::StopSignal;
pub use frequency::SharedFrequency;
#[cfg(feature = "rtrb")]
pub use voice::NoteHandle;
pub use voice::{Voice, VoiceConfig};
