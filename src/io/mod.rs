// Purpose - external interfaces: turning user input into note events

pub mod keyboard;

pub use keyboard::{NoteController, NoteEvent};
