//! Models module for the tablature layout engine
//!
//! Input data: pitch spellings, tunings and the note sequence.

pub mod note;
pub mod pitch;
pub mod tuning;

// Re-export commonly used types
pub use note::{notes_of, Event, GraceKind, Note, Rest};
pub use pitch::{Accidental, Letter, Pitch, PitchClass};
pub use tuning::{standard_tuning, Tuning, TuningPreset, TuningSpec, TUNING_PRESETS};
