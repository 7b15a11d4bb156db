//! Scene graph for tablature rendering
//!
//! This module defines the output structure handed to the renderer. A Scene
//! contains every pre-calculated position needed to draw strings, notes, bend
//! indicators and glissando connectors without any layout work on the
//! JavaScript side. Each coordinate is stored twice: the base value from the
//! layout pass at 100% zoom and the live value after the current zoom.

use super::chevrons::{Chevron, ChevronRenderer, Point};
use super::fingering::Finger;
use super::strings::TabString;
use super::vibrato::VibratoPath;
use super::zoom::ZoomState;
use crate::config::GlissandoStyle;
use crate::models::{GraceKind, Pitch, PitchClass};
use serde::{Deserialize, Serialize};

/// Complete render output for one view
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scene {
    /// String lines, lowest pitch first
    pub strings: Vec<RenderString>,

    /// Positioned notes in sequence order
    pub notes: Vec<PositionedNote>,

    /// Bend markers and lines for every bent note
    pub bends: Vec<BendIndicator>,

    /// One connector per glissando candidate; the active set decides which are drawn
    pub paths: Vec<ConnectorPath>,

    /// Vibrato waves for the pitch classes switched on in the view
    #[serde(default)]
    pub vibratos: Vec<VibratoPath>,

    /// Surface size at 100% zoom
    pub base_width: f64,
    pub base_height: f64,

    /// Surface size under the current zoom
    pub width: f64,
    pub height: f64,

    /// Zoom the live coordinates were computed with
    pub zoom: ZoomState,
}

impl Scene {
    pub fn note(&self, index: usize) -> Option<&PositionedNote> {
        self.notes.iter().find(|n| n.index == index)
    }

    /// Connector starting at a candidate
    pub fn path_for(&self, candidate: usize) -> Option<&ConnectorPath> {
        self.paths.iter().find(|p| p.from_candidate_index == candidate)
    }

    pub fn is_candidate(&self, index: usize) -> bool {
        self.path_for(index).is_some()
    }

    pub fn bent_note_count(&self) -> usize {
        self.notes.iter().filter(|n| n.requires_bending).count()
    }

    pub fn used_string_count(&self) -> usize {
        self.strings.iter().filter(|s| s.used).count()
    }

    /// Note closest to a point in live coordinates
    ///
    /// With `max_distance` set, notes farther away than that are ignored.
    pub fn nearest_note(&self, x: f64, y: f64, max_distance: Option<f64>) -> Option<&PositionedNote> {
        self.notes
            .iter()
            .map(|n| (n, (n.x - x).hypot(n.y - y)))
            .filter(|(_, d)| max_distance.map_or(true, |max| *d <= max))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n)
    }

    /// String whose live line is closest to `y`
    pub fn nearest_string(&self, y: f64) -> Option<&RenderString> {
        self.strings
            .iter()
            .min_by(|a, b| (a.y - y).abs().total_cmp(&(b.y - y).abs()))
    }
}

/// A string line with its label
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RenderString {
    /// 1-based string number
    pub index: usize,

    pub pitch_class: PitchClass,
    pub octave: i32,
    pub cents: f64,

    /// Label text, e.g. `"E4"`
    pub label: String,

    /// A note sits on this string or bends from it
    pub used: bool,

    pub base_y: f64,
    pub y: f64,

    /// Label column X (scales about the pivot)
    pub base_label_x: f64,
    pub label_x: f64,

    /// Left end of the line (scales about the pivot)
    pub base_line_start_x: f64,
    pub line_start_x: f64,
}

impl RenderString {
    pub fn from_string(string: &TabString, label_x: f64, line_start_x: f64) -> Self {
        Self {
            index: string.index,
            pitch_class: string.pitch_class,
            octave: string.octave,
            cents: string.cents,
            label: string.label(),
            used: false,
            base_y: string.y,
            y: string.y,
            base_label_x: label_x,
            label_x,
            base_line_start_x: line_start_x,
            line_start_x,
        }
    }
}

/// How a note's vertical position was obtained
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    Resolved,
    /// Pitch lay below the lowest string; drawn on the lowest string instead
    Clamped,
}

/// A note with its resolved position
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PositionedNote {
    /// Position in the note sequence (rests not counted)
    pub index: usize,

    pub pitch: Pitch,
    pub duration: f64,
    pub is_grace: bool,
    pub is_dotted: bool,
    pub lyric: Option<String>,

    pub base_x: f64,
    pub base_y: f64,
    pub x: f64,
    pub y: f64,

    pub requires_bending: bool,

    /// Semitones above the bend-from string
    pub bend_magnitude: Option<f64>,
    pub bend_from_string: Option<usize>,

    /// Open string played, when not bent
    pub string: Option<usize>,

    /// Circle radius; constant under zoom
    pub radius: f64,

    pub grace_kind: Option<GraceKind>,
    pub status: NoteStatus,

    /// Plucking finger; `None` inside a trailing run of repeats
    #[serde(default)]
    pub fingering: Option<Finger>,
}

/// Marker on the bend-from string plus a line up to the sounding pitch
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BendIndicator {
    pub note_index: usize,
    pub from_string: usize,

    pub base_marker: Point,
    pub marker: Point,

    pub base_note: Point,
    pub note: Point,

    /// Semitones of bend
    pub magnitude: f64,
}

/// A chevron glissando connector between two notes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConnectorPath {
    /// Note the glissando belongs to
    pub from_candidate_index: usize,

    /// Note the connector ends on
    pub to_target_index: usize,

    pub base_x_from: f64,
    pub base_y_from: f64,
    pub base_x_to: f64,
    pub base_y_to: f64,

    pub x_from: f64,
    pub y_from: f64,
    pub x_to: f64,
    pub y_to: f64,

    pub color: String,
    pub opacity: f64,
    pub stroke_width: f64,

    /// Chevrons along the live path
    pub chevrons: Vec<Chevron>,
}

impl ConnectorPath {
    /// Build a connector at 100% zoom
    pub fn new(
        from_candidate_index: usize,
        to_target_index: usize,
        from: Point,
        to: Point,
        opacity: f64,
        style: &GlissandoStyle,
    ) -> Self {
        Self {
            from_candidate_index,
            to_target_index,
            base_x_from: from.x,
            base_y_from: from.y,
            base_x_to: to.x,
            base_y_to: to.y,
            x_from: from.x,
            y_from: from.y,
            x_to: to.x,
            y_to: to.y,
            color: style.color.clone(),
            opacity,
            stroke_width: style.stroke_width,
            chevrons: ChevronRenderer::tile(from, to, style.chevron_depth, style.chevron_width),
        }
    }

    pub fn from_point(&self) -> Point {
        Point::new(self.x_from, self.y_from)
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x_to, self.y_to)
    }

    /// Recompute live endpoints from the base ones and re-tile the chevrons
    pub fn rescale(&mut self, zoom: &ZoomState, style: &GlissandoStyle) {
        self.x_from = self.base_x_from * zoom.x_scale;
        self.y_from = self.base_y_from * zoom.y_scale;
        self.x_to = self.base_x_to * zoom.x_scale;
        self.y_to = self.base_y_to * zoom.y_scale;
        self.chevrons = ChevronRenderer::tile(
            self.from_point(),
            self.to_point(),
            style.chevron_depth,
            style.chevron_width,
        );
    }
}

/// Serialize a scene as pretty JSON
pub fn scene_to_json(scene: &Scene) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(scene)
}
