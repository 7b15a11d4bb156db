//! Error types for tablature layout
//!
//! `LayoutError` covers failures that stop an operation. Problems that only
//! affect a single note are collected as `LayoutWarning` values so the rest
//! of the piece still renders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the layout engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Pitch lies below the lowest string, so there is no string to bend from
    #[error("Pitch {pitch} lies below the lowest string")]
    UnresolvablePitch { pitch: String },

    /// No strings were configured or extracted for the view
    #[error("No string data available for layout")]
    MissingStringData,

    /// Pitch spelling could not be parsed
    #[error("Invalid pitch: {0}")]
    InvalidPitch(String),

    /// Tuning has no pitch classes
    #[error("Tuning must contain at least one pitch class")]
    EmptyTuning,

    /// Workspace operation referenced a view that was never loaded
    #[error("Unknown view: {0}")]
    UnknownView(String),

    /// Configuration value outside its meaningful range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Non-fatal problem attached to one note of a layout pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// Duration was negative, zero or not a number; default spacing was used
    InvalidDuration { note_index: Option<usize>, duration: f64 },

    /// Pitch could not be placed on the strings; the fallback policy applied
    UnresolvablePitch { note_index: usize, pitch: String, skipped: bool },
}

pub type LayoutResult<T> = Result<T, LayoutError>;
