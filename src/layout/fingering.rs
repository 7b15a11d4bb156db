//! Right-hand fingering labels
//!
//! Each note gets the finger that plucks it, decided by where the melody goes
//! next on screen. Moving down the surface (larger y) is played with the index
//! finger, moving up with the thumb, and wide moves with the middle finger.
//! Repeated pitches take the finger of the move that follows the run; a run
//! at the very end of the melody is left unlabelled.

use super::scene::PositionedNote;
use crate::config::FingeringConfig;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    #[serde(rename = "i")]
    Index,
    #[serde(rename = "t")]
    Thumb,
    #[serde(rename = "m")]
    Middle,
}

impl Finger {
    pub fn label(self) -> &'static str {
        match self {
            Finger::Index => "i",
            Finger::Thumb => "t",
            Finger::Middle => "m",
        }
    }
}

/// Finger for the move from `y` to `next_y`
fn finger_towards(y: f64, next_y: f64, config: &FingeringConfig) -> Finger {
    let delta = next_y - y;
    if delta > 0.0 {
        Finger::Index
    } else if delta.abs() > config.leap_threshold {
        Finger::Middle
    } else {
        Finger::Thumb
    }
}

/// Fingering for a sequence of note heights
///
/// `None` marks a repeated pitch with no later move to prepare for.
pub fn assign_fingers(ys: &[f64], config: &FingeringConfig) -> Vec<Option<Finger>> {
    let tolerance = config.repeat_tolerance;
    let next_distinct = |i: usize| ys[i + 1..].iter().copied().find(|y| (y - ys[i]).abs() >= tolerance);

    ys.iter()
        .enumerate()
        .map(|(i, &y)| {
            let next = next_distinct(i);
            if i == 0 {
                return Some(match next {
                    Some(next_y) if next_y < y => Finger::Thumb,
                    _ => Finger::Index,
                });
            }

            let from_prev = y - ys[i - 1];
            if from_prev.abs() < tolerance {
                return next.map(|next_y| finger_towards(y, next_y, config));
            }

            let going_down = from_prev > 0.0;
            let turns = next.map_or(false, |next_y| (next_y > y) != going_down);
            Some(match next {
                Some(next_y) if turns => finger_towards(y, next_y, config),
                _ if going_down && from_prev > config.leap_threshold => Finger::Middle,
                _ if going_down => Finger::Index,
                _ => Finger::Thumb,
            })
        })
        .collect()
}

/// Label every note in place, reading base positions in sequence order
pub fn apply_fingering(notes: &mut [PositionedNote], config: &FingeringConfig) {
    let ys: Vec<f64> = notes.iter().map(|n| n.base_y).collect();
    for (note, finger) in notes.iter_mut().zip(assign_fingers(&ys, config)) {
        note.fingering = finger;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingers(ys: &[f64]) -> Vec<Option<Finger>> {
        assign_fingers(ys, &FingeringConfig::default())
    }

    #[test]
    fn test_first_note_looks_ahead() {
        assert_eq!(fingers(&[200.0]), vec![Some(Finger::Index)]);
        assert_eq!(fingers(&[200.0, 202.0, 250.0])[0], Some(Finger::Index));
        assert_eq!(fingers(&[200.0, 150.0])[0], Some(Finger::Thumb));
    }

    #[test]
    fn test_direction_sets_finger() {
        // down, down, then up
        let result = fingers(&[100.0, 150.0, 200.0, 120.0]);
        assert_eq!(
            result,
            vec![Some(Finger::Index), Some(Finger::Index), Some(Finger::Thumb), Some(Finger::Thumb)]
        );
    }

    #[test]
    fn test_leaps_take_the_middle_finger() {
        // Turning upward by more than an octave
        assert_eq!(fingers(&[100.0, 400.0, 200.0])[1], Some(Finger::Middle));
        // Continuing a wide downward move
        assert_eq!(fingers(&[100.0, 120.0, 300.0])[2], Some(Finger::Middle));
        // Small upward turn stays on the thumb
        assert_eq!(fingers(&[100.0, 300.0, 250.0])[1], Some(Finger::Thumb));
    }

    #[test]
    fn test_repeats_prepare_the_next_move() {
        let result = fingers(&[100.0, 150.0, 151.0, 150.0, 120.0]);
        assert_eq!(result[2], Some(Finger::Thumb));
        assert_eq!(result[3], Some(Finger::Thumb));
        assert_eq!(fingers(&[100.0, 150.0, 150.0, 400.0])[2], Some(Finger::Index));

        // Trailing repeats have nothing to lead into
        assert_eq!(fingers(&[100.0, 150.0, 150.0])[2], None);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_string(&Finger::Middle).unwrap(), "\"m\"");
        assert_eq!(Finger::Thumb.label(), "t");
    }
}
