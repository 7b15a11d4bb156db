//! Horizontal layout
//!
//! A left-to-right scan with one running cursor. Main notes and rests advance
//! the cursor by their duration spacing; grace notes advance by a fixed small
//! step since they are ornamental and take no proportional time.

use crate::config::SpacingConfig;
use crate::error::LayoutWarning;
use crate::models::{Event, Note};

const DURATION_EPSILON: f64 = 1e-9;

/// Pixel spacing for standard durations (in sixteenth units)
#[derive(Clone, Debug, PartialEq)]
pub struct DurationTable {
    entries: Vec<(f64, f64)>,
    unit: f64,
}

impl DurationTable {
    /// Sixteenth, eighth, quarter, half and whole, doubling each step
    pub fn standard(unit: f64) -> Self {
        let entries = [1.0, 2.0, 4.0, 8.0, 16.0]
            .into_iter()
            .map(|duration| (duration, duration * unit))
            .collect();
        Self { entries, unit }
    }

    /// Spacing for a duration, or `None` when the duration is unusable
    ///
    /// Durations missing from the table fall back to `duration * unit`.
    pub fn spacing(&self, duration: f64) -> Option<f64> {
        if !duration.is_finite() || duration <= 0.0 {
            return None;
        }
        let mapped = self
            .entries
            .iter()
            .find(|(d, _)| (d - duration).abs() < DURATION_EPSILON)
            .map(|&(_, px)| px);
        Some(mapped.unwrap_or(duration * self.unit))
    }

    /// Spacing used in place of an invalid duration
    pub fn fallback(&self) -> f64 {
        self.unit
    }
}

/// Running cursor state for one layout pass
#[derive(Clone, Debug)]
pub struct HorizontalLayout {
    cursor: f64,
    table: DurationTable,
    grace_spacing: f64,
    warnings: Vec<LayoutWarning>,
}

impl HorizontalLayout {
    pub fn new(config: &SpacingConfig) -> Self {
        Self {
            cursor: config.start_x,
            table: DurationTable::standard(config.unit_spacing),
            grace_spacing: config.grace_spacing,
            warnings: Vec::new(),
        }
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn table(&self) -> &DurationTable {
        &self.table
    }

    /// Spacing a duration consumes, recording a warning when it is invalid
    pub fn spacing_for(&mut self, duration: f64, note_index: Option<usize>) -> f64 {
        match self.table.spacing(duration) {
            Some(px) => px,
            None => {
                log::warn!("Invalid duration {} (note {:?}); using default spacing", duration, note_index);
                self.warnings.push(LayoutWarning::InvalidDuration { note_index, duration });
                self.table.fallback()
            }
        }
    }

    /// Place a note at the cursor and advance past it
    pub fn place(&mut self, note: &Note, note_index: usize) -> f64 {
        let x = self.cursor;
        self.cursor += if note.is_grace {
            self.grace_spacing
        } else {
            self.spacing_for(note.duration, Some(note_index))
        };
        x
    }

    /// Advance past a rest without emitting a position
    pub fn skip_rest(&mut self, duration: f64) {
        self.cursor += self.spacing_for(duration, None);
    }

    /// X position of every note in `events` (rests produce none)
    pub fn layout(&mut self, events: &[Event]) -> Vec<f64> {
        let mut positions = Vec::new();
        for event in events {
            match event {
                Event::Note(note) => {
                    let index = positions.len();
                    positions.push(self.place(note, index));
                }
                Event::Rest(rest) => self.skip_rest(rest.duration),
            }
        }
        positions
    }

    /// Warnings collected so far, leaving the list empty
    pub fn take_warnings(&mut self) -> Vec<LayoutWarning> {
        std::mem::take(&mut self.warnings)
    }
}

/// Lay out a sequence from scratch with the given spacing
pub fn layout_x(events: &[Event], config: &SpacingConfig) -> (Vec<f64>, Vec<LayoutWarning>) {
    let mut layout = HorizontalLayout::new(config);
    let positions = layout.layout(events);
    (positions, layout.take_warnings())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pitch, Rest};

    fn note(duration: f64) -> Event {
        let pitch: Pitch = "C4".parse().unwrap();
        Note::new(pitch, duration).into()
    }

    fn grace(duration: f64) -> Event {
        let pitch: Pitch = "D4".parse().unwrap();
        Note::grace(pitch, duration).into()
    }

    #[test]
    fn test_duration_table() {
        let table = DurationTable::standard(85.0);
        assert_eq!(table.spacing(1.0), Some(85.0));
        assert_eq!(table.spacing(2.0), Some(170.0));
        assert_eq!(table.spacing(4.0), Some(340.0));
        assert_eq!(table.spacing(16.0), Some(1360.0));
        assert_eq!(table.spacing(3.0), Some(255.0));
        assert_eq!(table.spacing(-1.0), None);
        assert_eq!(table.spacing(0.0), None);
        assert_eq!(table.spacing(f64::NAN), None);
    }

    #[test]
    fn test_main_notes_advance_by_duration() {
        let (xs, warnings) = layout_x(&[note(4.0), note(2.0), note(1.0)], &SpacingConfig::default());
        assert_eq!(xs, vec![150.0, 490.0, 660.0]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_grace_notes_use_fixed_spacing() {
        let events = [note(4.0), grace(1.0), grace(8.0), note(4.0)];
        let (xs, _) = layout_x(&events, &SpacingConfig::default());
        assert_eq!(xs, vec![150.0, 490.0, 511.25, 532.5]);
    }

    #[test]
    fn test_rests_advance_without_output() {
        let events = [note(4.0), Rest { duration: 4.0 }.into(), note(4.0)];
        let (xs, _) = layout_x(&events, &SpacingConfig::default());
        assert_eq!(xs, vec![150.0, 830.0]);
    }

    #[test]
    fn test_invalid_duration_falls_back() {
        let events = [note(-2.0), note(f64::NAN), note(4.0)];
        let (xs, warnings) = layout_x(&events, &SpacingConfig::default());
        assert_eq!(xs, vec![150.0, 235.0, 320.0]);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0],
            LayoutWarning::InvalidDuration { note_index: Some(0), .. }
        ));
    }

    #[test]
    fn test_positions_never_decrease() {
        let events: Vec<Event> = (0..50)
            .map(|i| match i % 5 {
                0 => grace(1.0),
                1 => note(0.5 + i as f64),
                2 => Rest { duration: 2.0 }.into(),
                3 => note(-1.0),
                _ => note(4.0),
            })
            .collect();
        let (xs, _) = layout_x(&events, &SpacingConfig::default());
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    }
}
