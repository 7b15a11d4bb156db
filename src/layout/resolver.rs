//! Pitch resolver
//!
//! Maps any pitch onto the string coordinate system. Pitches that are not an
//! open string are placed between the two strings that bracket them, so bend
//! visualization stays continuous in pitch instead of snapping to a string.

use super::strings::TabString;
use crate::config::StringGeometry;
use crate::error::{LayoutError, LayoutResult};
use crate::models::pitch::{Pitch, CENTS_EPSILON, SEMITONE_CENTS};
use serde::{Deserialize, Serialize};

/// Where a pitch sits on the tablature
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Resolution {
    pub y: f64,
    pub requires_bending: bool,

    /// Semitones above the string the note is bent from
    pub bend_magnitude: Option<f64>,

    /// String the note is bent from
    pub bend_from_string: Option<usize>,

    /// Fractional position between the bracketing strings, when bracketed
    pub interpolation: Option<f64>,

    /// String played open, when the pitch matches one exactly
    pub string: Option<usize>,
}

impl Resolution {
    fn open(string: &TabString) -> Self {
        Self {
            y: string.y,
            requires_bending: false,
            bend_magnitude: None,
            bend_from_string: None,
            interpolation: None,
            string: Some(string.index),
        }
    }
}

/// Resolve a pitch against a set of strings
///
/// Strings are compared by canonical cents, so any enharmonic spelling of an
/// open string resolves to that string. `strings` may come in any order.
pub fn resolve_position(
    pitch: &Pitch,
    strings: &[TabString],
    geometry: &StringGeometry,
) -> LayoutResult<Resolution> {
    if strings.is_empty() {
        return Err(LayoutError::MissingStringData);
    }

    let cents = pitch.cents_from(geometry.base_octave);

    if let Some(open) = strings.iter().find(|s| (s.cents - cents).abs() < CENTS_EPSILON) {
        return Ok(Resolution::open(open));
    }

    let lower = strings
        .iter()
        .filter(|s| s.cents < cents)
        .max_by(|a, b| a.cents.total_cmp(&b.cents));
    let upper = strings
        .iter()
        .filter(|s| s.cents > cents)
        .min_by(|a, b| a.cents.total_cmp(&b.cents));

    let lower = lower.ok_or_else(|| LayoutError::UnresolvablePitch { pitch: pitch.to_string() })?;
    let semitones = (cents - lower.cents) / SEMITONE_CENTS;

    let (y, interpolation) = match upper {
        Some(upper) => {
            let fraction = (cents - lower.cents) / (upper.cents - lower.cents);
            (lower.y + (upper.y - lower.y) * fraction, Some(fraction))
        }
        None => (lower.y + semitones * geometry.pixels_per_cent * SEMITONE_CENTS, None),
    };

    Ok(Resolution {
        y,
        requires_bending: true,
        bend_magnitude: Some(semitones),
        bend_from_string: Some(lower.index),
        interpolation,
        string: None,
    })
}
