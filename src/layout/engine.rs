//! Scene computation
//!
//! This module contains the main entry point for layout: it takes a tuning and
//! a note sequence and produces a complete Scene in one pass.

use super::fingering::apply_fingering;
use super::glissando::{self, DurationStat};
use super::horizontal::HorizontalLayout;
use super::resolver::{resolve_position, Resolution};
use super::scene::*;
use super::strings::{build_strings, string_bounds, TabString};
use super::zoom::ZoomState;
use super::chevrons::Point;
use crate::config::{LayoutConfig, UnresolvedPolicy};
use crate::error::{LayoutError, LayoutResult, LayoutWarning};
use crate::models::{Event, Tuning};
use serde::{Deserialize, Serialize};

/// Minimum surface size requested by the host
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(default)]
pub struct SurfaceHint {
    pub width: f64,
    pub height: f64,
}

impl SurfaceHint {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scene plus everything the pass learned along the way
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SceneReport {
    pub scene: Scene,

    /// Per-note problems that did not stop the pass
    pub warnings: Vec<LayoutWarning>,

    /// Notes that can carry a glissando
    pub candidates: Vec<usize>,

    pub duration_stats: Vec<DurationStat>,

    /// Sweep width of the longest-duration glissando
    pub first_priority_delta: Option<f64>,
}

/// Main layout engine for computing scenes
#[derive(Clone, Debug, Default)]
pub struct TablatureEngine {
    config: LayoutConfig,
}

impl TablatureEngine {
    /// Create an engine, rejecting invalid configuration
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Strings for a tuning with the configured geometry
    pub fn strings(&self, tuning: &Tuning) -> Vec<TabString> {
        build_strings(tuning, self.config.strings.count, &self.config.strings)
    }

    /// Compute the complete scene for a note sequence
    ///
    /// Unresolvable pitches and invalid durations become warnings; only a
    /// tuning that yields no strings at all fails the pass.
    pub fn compute_scene(
        &self,
        tuning: &Tuning,
        events: &[Event],
        surface: SurfaceHint,
    ) -> LayoutResult<SceneReport> {
        let config = &self.config;
        let strings = self.strings(tuning);
        let (top, bottom) = string_bounds(&strings).ok_or(LayoutError::MissingStringData)?;
        let lowest = strings
            .iter()
            .min_by(|a, b| a.cents.total_cmp(&b.cents))
            .ok_or(LayoutError::MissingStringData)?;

        let mut layout = HorizontalLayout::new(&config.spacing);
        let mut warnings = Vec::new();
        let mut notes = Vec::new();
        let mut content_end: Option<f64> = None;
        let mut note_index = 0;

        for event in events {
            let note = match event {
                Event::Rest(rest) => {
                    layout.skip_rest(rest.duration);
                    continue;
                }
                Event::Note(note) => note,
            };
            let index = note_index;
            note_index += 1;

            let x = layout.place(note, index);
            if !note.is_grace {
                content_end = Some(layout.cursor());
            }

            let (resolution, status) = match resolve_position(&note.pitch, &strings, &config.strings) {
                Ok(resolution) => (resolution, NoteStatus::Resolved),
                Err(LayoutError::UnresolvablePitch { pitch }) => {
                    let skipped = config.unresolved_policy == UnresolvedPolicy::Skip;
                    log::warn!("Note {} ({}) lies below the lowest string", index, pitch);
                    warnings.push(LayoutWarning::UnresolvablePitch { note_index: index, pitch, skipped });
                    if skipped {
                        continue;
                    }
                    (clamped_to(lowest), NoteStatus::Clamped)
                }
                Err(e) => return Err(e),
            };

            notes.push(PositionedNote {
                index,
                pitch: note.pitch.clone(),
                duration: note.duration,
                is_grace: note.is_grace,
                is_dotted: note.is_dotted,
                lyric: note.lyric.clone(),
                base_x: x,
                base_y: resolution.y,
                x,
                y: resolution.y,
                requires_bending: resolution.requires_bending,
                bend_magnitude: resolution.bend_magnitude,
                bend_from_string: resolution.bend_from_string,
                string: resolution.string,
                radius: if note.is_grace { config.markers.grace_radius } else { config.markers.note_radius },
                grace_kind: note.grace_kind(),
                status,
                fingering: None,
            });
        }
        warnings.extend(layout.take_warnings());
        apply_fingering(&mut notes, &config.fingering);

        let mut render_strings: Vec<RenderString> = strings
            .iter()
            .map(|s| RenderString::from_string(s, config.strings.label_x, config.strings.line_start_x))
            .collect();
        mark_used_strings(&mut render_strings, &notes, config.strings.used_tolerance);

        let bends = bend_indicators(&notes, &strings, config.markers.bend_marker_offset);

        let candidates = glissando::candidates(&notes);
        let paths = glissando::generate_paths(&notes, &strings, &candidates, &config.glissando)?;

        let content_width = content_end.unwrap_or(config.spacing.start_x) + config.spacing.trailing_margin;
        let content_height = bottom + config.spacing.bottom_margin;
        let base_width = surface.width.max(content_width);
        let base_height = surface.height.max(content_height);

        log::info!(
            "Scene: {} strings ({}..{}), {} notes, {} bent, {} candidates, {} warnings",
            strings.len(),
            top,
            bottom,
            notes.len(),
            bends.len(),
            candidates.len(),
            warnings.len()
        );

        let duration_stats = glissando::duration_stats(&notes);
        let first_priority_delta = glissando::first_priority_delta(&notes, &candidates);

        Ok(SceneReport {
            scene: Scene {
                strings: render_strings,
                notes,
                bends,
                paths,
                vibratos: Vec::new(),
                base_width,
                base_height,
                width: base_width,
                height: base_height,
                zoom: ZoomState::default(),
            },
            warnings,
            candidates,
            duration_stats,
            first_priority_delta,
        })
    }
}

fn clamped_to(lowest: &TabString) -> Resolution {
    Resolution {
        y: lowest.y,
        requires_bending: false,
        bend_magnitude: None,
        bend_from_string: None,
        interpolation: None,
        string: Some(lowest.index),
    }
}

/// Flag strings that carry a note or serve as a bend origin
pub fn mark_used_strings(strings: &mut [RenderString], notes: &[PositionedNote], tolerance: f64) {
    for note in notes {
        for string in strings.iter_mut() {
            let on_string = (string.base_y - note.base_y).abs() <= tolerance;
            let bent_from = note.bend_from_string == Some(string.index);
            if on_string || bent_from {
                string.used = true;
            }
        }
    }
}

/// Bend marker on the bend-from string, `offset` left of each bent note
pub fn bend_indicators(notes: &[PositionedNote], strings: &[TabString], offset: f64) -> Vec<BendIndicator> {
    notes
        .iter()
        .filter(|n| n.requires_bending)
        .filter_map(|n| {
            let from = strings.iter().find(|s| Some(s.index) == n.bend_from_string)?;
            let marker = Point::new(n.base_x - offset, from.y);
            let note = Point::new(n.base_x, n.base_y);
            Some(BendIndicator {
                note_index: n.index,
                from_string: from.index,
                base_marker: marker,
                marker,
                base_note: note,
                note,
                magnitude: n.bend_magnitude.unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Note, Rest};

    fn events(pairs: &[(&str, f64)]) -> Vec<Event> {
        pairs.iter()
            .map(|(p, d)| Note::new(p.parse().unwrap(), *d).into())
            .collect()
    }

    fn standard() -> Tuning {
        "C-D-E-G-A".parse().unwrap()
    }

    #[test]
    fn test_basic_scene() {
        let engine = TablatureEngine::default();
        let report = engine
            .compute_scene(&standard(), &events(&[("C4", 4.0), ("F4", 4.0), ("A4", 4.0)]), SurfaceHint::default())
            .unwrap();
        let scene = &report.scene;

        assert_eq!(scene.strings.len(), 20);
        assert_eq!(scene.notes.len(), 3);
        assert_eq!(scene.notes[0].y, 250.0);
        assert_eq!(scene.notes[1].bend_from_string, Some(8));
        assert_eq!(scene.bends.len(), 1);
        assert_eq!(scene.bends[0].marker, Point::new(490.0 - 15.0, 300.0));
        assert_eq!(report.candidates, vec![0, 1]);
        assert_eq!(scene.paths.len(), 2);

        // 830 + 340 + 400
        assert_eq!(scene.base_width, 1570.0);
        assert_eq!(scene.base_height, scene.strings.last().unwrap().base_y + 100.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_notes_carry_fingering() {
        use crate::layout::fingering::Finger;

        let report = TablatureEngine::default()
            .compute_scene(
                &standard(),
                &events(&[("C4", 4.0), ("E4", 4.0), ("E4", 4.0), ("C6", 4.0), ("G5", 4.0)]),
                SurfaceHint::default(),
            )
            .unwrap();
        let fingers: Vec<Option<Finger>> = report.scene.notes.iter().map(|n| n.fingering).collect();
        // C6 to G5 turns upward by 500 cents (62.5 px at default scale)
        assert_eq!(
            fingers,
            vec![Some(Finger::Index), Some(Finger::Index), Some(Finger::Index), Some(Finger::Thumb), Some(Finger::Thumb)]
        );
    }

    #[test]
    fn test_used_strings() {
        let engine = TablatureEngine::default();
        let report = engine
            .compute_scene(&standard(), &events(&[("C4", 4.0), ("F4", 4.0)]), SurfaceHint::default())
            .unwrap();
        let used: Vec<usize> = report.scene.strings.iter().filter(|s| s.used).map(|s| s.index).collect();
        assert_eq!(used, vec![6, 8]);
    }

    #[test]
    fn test_surface_hint_wins_when_larger() {
        let engine = TablatureEngine::default();
        let report = engine
            .compute_scene(&standard(), &events(&[("C4", 4.0)]), SurfaceHint::new(5000.0, 2000.0))
            .unwrap();
        assert_eq!(report.scene.base_width, 5000.0);
        assert_eq!(report.scene.height, 2000.0);
    }

    #[test]
    fn test_clamp_policy() {
        let engine = TablatureEngine::default();
        let report = engine
            .compute_scene(&standard(), &events(&[("A2", 4.0), ("C4", 4.0)]), SurfaceHint::default())
            .unwrap();
        let note = &report.scene.notes[0];
        assert_eq!(note.status, NoteStatus::Clamped);
        assert_eq!(note.y, 100.0);
        assert_eq!(
            report.warnings,
            vec![LayoutWarning::UnresolvablePitch { note_index: 0, pitch: "A2".to_string(), skipped: false }]
        );
    }

    #[test]
    fn test_skip_policy_keeps_indices() {
        let mut config = LayoutConfig::default();
        config.unresolved_policy = UnresolvedPolicy::Skip;
        let engine = TablatureEngine::new(config).unwrap();
        let report = engine
            .compute_scene(
                &standard(),
                &events(&[("C4", 4.0), ("A2", 4.0), ("E4", 4.0)]),
                SurfaceHint::default(),
            )
            .unwrap();
        let indices: Vec<usize> = report.scene.notes.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(report.scene.notes[1].x, 830.0);
        assert_eq!(report.candidates, vec![0]);
        assert_eq!(report.scene.paths[0].to_target_index, 2);
    }

    #[test]
    fn test_rests_and_grace_notes() {
        let engine = TablatureEngine::default();
        let events = vec![
            Note::new("C4".parse().unwrap(), 4.0).into(),
            Rest { duration: 4.0 }.into(),
            Note::grace("D4".parse().unwrap(), 1.0).into(),
            Note::new("E4".parse().unwrap(), 4.0).into(),
        ];
        let report = engine.compute_scene(&standard(), &events, SurfaceHint::default()).unwrap();
        let notes = &report.scene.notes;
        assert_eq!(notes[1].index, 1);
        assert_eq!(notes[1].x, 830.0);
        assert_eq!(notes[1].radius, 6.0);
        assert_eq!(notes[1].grace_kind, Some(crate::models::GraceKind::Sixteenth));
        assert_eq!(notes[2].x, 851.25);
        assert_eq!(report.candidates, vec![0]);
    }

    #[test]
    fn test_zero_strings_fail() {
        let mut config = LayoutConfig::default();
        config.strings.count = 0;
        let engine = TablatureEngine::new(config).unwrap();
        assert_eq!(
            engine.compute_scene(&standard(), &[], SurfaceHint::default()),
            Err(LayoutError::MissingStringData)
        );
    }

    #[test]
    fn test_empty_sequence() {
        let report = TablatureEngine::default()
            .compute_scene(&standard(), &[], SurfaceHint::default())
            .unwrap();
        assert!(report.scene.notes.is_empty());
        assert!(report.scene.paths.is_empty());
        assert_eq!(report.scene.base_width, 550.0);
        assert_eq!(report.first_priority_delta, None);
    }
}
