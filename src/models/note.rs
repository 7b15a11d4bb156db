//! Note sequence input
//!
//! Notes arrive from the song data collaborator in sequence order. The engine
//! never mutates them; every layout pass derives fresh positioned copies.

use crate::models::pitch::Pitch;
use serde::{Deserialize, Serialize};

/// A single note of the melody
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,

    /// Nominal duration in sixteenth-note units (4 = quarter note)
    pub duration: f64,

    #[serde(default)]
    pub is_grace: bool,

    #[serde(default)]
    pub is_dotted: bool,

    #[serde(default)]
    pub lyric: Option<String>,
}

impl Note {
    pub fn new(pitch: Pitch, duration: f64) -> Self {
        Self {
            pitch,
            duration,
            is_grace: false,
            is_dotted: false,
            lyric: None,
        }
    }

    pub fn grace(pitch: Pitch, duration: f64) -> Self {
        Self { is_grace: true, ..Self::new(pitch, duration) }
    }

    pub fn dotted(mut self) -> Self {
        self.is_dotted = true;
        self
    }

    pub fn with_lyric(mut self, lyric: impl Into<String>) -> Self {
        self.lyric = Some(lyric.into());
        self
    }

    /// Ornament class of a grace note, `None` for main notes
    pub fn grace_kind(&self) -> Option<GraceKind> {
        self.is_grace.then(|| GraceKind::from_duration(self.duration))
    }
}

/// Grace note classification by nominal duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraceKind {
    #[serde(rename = "g16th")]
    Sixteenth,
    #[serde(rename = "g8th")]
    Eighth,
    #[serde(rename = "g-other")]
    Other,
}

impl GraceKind {
    pub fn from_duration(duration: f64) -> Self {
        if duration <= 1.0 {
            GraceKind::Sixteenth
        } else if duration <= 2.0 {
            GraceKind::Eighth
        } else {
            GraceKind::Other
        }
    }
}

/// A silent span that only advances the horizontal cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub duration: f64,
}

/// One entry of the input sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Note(Note),
    Rest(Rest),
}

impl Event {
    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Event::Note(note) => Some(note),
            Event::Rest(_) => None,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Event::Note(note) => note.duration,
            Event::Rest(rest) => rest.duration,
        }
    }
}

impl From<Note> for Event {
    fn from(note: Note) -> Self {
        Event::Note(note)
    }
}

impl From<Rest> for Event {
    fn from(rest: Rest) -> Self {
        Event::Rest(rest)
    }
}

/// Iterate the notes of a sequence, skipping rests
///
/// The position in this iteration is the note's sequence index.
pub fn notes_of(events: &[Event]) -> impl Iterator<Item = &Note> {
    events.iter().filter_map(Event::as_note)
}
