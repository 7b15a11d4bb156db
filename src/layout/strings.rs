//! String model
//!
//! Expands a cyclic tuning into N strings and places each string vertically
//! in proportion to its pitch distance from the reference C.

use crate::config::StringGeometry;
use crate::models::{Pitch, PitchClass, Tuning};
use serde::{Deserialize, Serialize};

/// One horizontal string line of the tablature
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TabString {
    /// 1-based string number, lowest pitch first
    pub index: usize,
    pub pitch_class: PitchClass,
    pub octave: i32,

    /// Cents above C of the base octave
    pub cents: f64,

    /// Vertical position at 100% zoom
    pub y: f64,
}

impl TabString {
    pub fn pitch(&self) -> Pitch {
        Pitch::new(self.pitch_class, self.octave)
    }

    /// Label drawn in the left column, e.g. `C4`
    pub fn label(&self) -> String {
        self.pitch().to_string()
    }
}

/// Lay out `count` strings for a cyclic tuning
///
/// String `i` takes `pattern[i % len]` in octave `start_octave + i / len`. Its
/// `y` is `reference_y + cents * pixels_per_cent`, so y grows with pitch.
/// Positions rise monotonically only when the tuning itself is monotonic
/// within an octave.
pub fn build_strings(tuning: &Tuning, count: usize, geometry: &StringGeometry) -> Vec<TabString> {
    let pattern = tuning.pattern();

    if !tuning.is_monotonic() {
        log::warn!("Tuning {} is not monotonic within an octave; string positions will not rise with index", tuning);
    }

    let mut strings = Vec::with_capacity(count);
    let mut class_index = 0;
    let mut octave = geometry.start_octave;

    for i in 0..count {
        let pitch_class = pattern[class_index];
        let pitch = Pitch::new(pitch_class, octave);
        let cents = pitch.cents_from(geometry.base_octave);

        strings.push(TabString {
            index: i + 1,
            pitch_class,
            octave,
            cents,
            y: geometry.reference_y + cents * geometry.pixels_per_cent,
        });

        class_index += 1;
        if class_index == pattern.len() {
            class_index = 0;
            octave += 1;
        }
    }

    log::debug!("Built {} strings for tuning {}", strings.len(), tuning);
    strings
}

/// Smallest and largest string y (top and bottom of the tablature)
pub fn string_bounds(strings: &[TabString]) -> Option<(f64, f64)> {
    strings.iter().fold(None, |bounds, s| match bounds {
        None => Some((s.y, s.y)),
        Some((top, bottom)) => Some((top.min(s.y), bottom.max(s.y))),
    })
}

/// Nearest string strictly above `y` on screen (lower pitch)
pub fn nearest_lower_string(strings: &[TabString], y: f64) -> Option<&TabString> {
    strings
        .iter()
        .filter(|s| s.y < y)
        .min_by(|a, b| (y - a.y).total_cmp(&(y - b.y)))
}

/// String whose line is closest to `y`
pub fn nearest_string(strings: &[TabString], y: f64) -> Option<&TabString> {
    strings
        .iter()
        .min_by(|a, b| (a.y - y).abs().total_cmp(&(b.y - y).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TUNING_PRESETS;

    fn tuning(key: &str) -> Tuning {
        key.parse().unwrap()
    }

    #[test]
    fn test_standard_tuning_positions() {
        let strings = build_strings(&tuning("C-D-E-G-A"), 6, &StringGeometry::default());
        let ys: Vec<f64> = strings.iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![100.0, 125.0, 150.0, 187.5, 212.5, 250.0]);

        let labels: Vec<String> = strings.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["C3", "D3", "E3", "G3", "A3", "C4"]);
        assert_eq!(strings[5].index, 6);
        assert_eq!(strings[5].cents, 1200.0);
    }

    #[test]
    fn test_strings_are_monotonic_for_monotonic_tunings() {
        let geometry = StringGeometry::default();
        for preset in TUNING_PRESETS.iter() {
            let tuning = preset.tuning().unwrap();
            if !tuning.is_monotonic() {
                continue;
            }
            for count in 0..40 {
                let strings = build_strings(&tuning, count, &geometry);
                assert_eq!(strings.len(), count);
                assert!(
                    strings.windows(2).all(|w| w[0].y <= w[1].y),
                    "strings of {} not monotonic at count {}",
                    preset.key,
                    count
                );
            }
        }
    }

    #[test]
    fn test_reference_and_scale() {
        let geometry = StringGeometry {
            pixels_per_cent: 0.5,
            reference_y: 10.0,
            base_octave: 4,
            start_octave: 4,
            ..StringGeometry::default()
        };
        let strings = build_strings(&tuning("D-E-F#-A-B"), 2, &geometry);
        assert_eq!(strings[0].y, 110.0);
        assert_eq!(strings[1].y, 210.0);
    }

    #[test]
    fn test_bounds_and_queries() {
        let strings = build_strings(&tuning("C-D-E-G-A"), 5, &StringGeometry::default());
        assert_eq!(string_bounds(&strings), Some((100.0, 212.5)));
        assert_eq!(string_bounds(&[]), None);

        assert_eq!(nearest_lower_string(&strings, 160.0).map(|s| s.index), Some(3));
        assert_eq!(nearest_lower_string(&strings, 100.0).map(|s| s.index), None);
        assert_eq!(nearest_string(&strings, 180.0).map(|s| s.index), Some(4));
    }
}
