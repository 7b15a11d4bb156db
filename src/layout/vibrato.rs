//! Vibrato waves
//!
//! A vibrato is a sine wave drawn along a note's string from the edge of the
//! note to the edge of the next note on the same string. Vibratos are switched
//! on per pitch class, so every note of an enabled class gets one.
//!
//! Amplitude is a pitch swing in cents and speed is cycles per quarter note.
//! Both are musical quantities: the wave keeps its cycle count when the view
//! is stretched horizontally, and its height follows the vertical zoom.

use super::chevrons::Point;
use super::scene::{PositionedNote, RenderString};
use super::zoom::ZoomState;
use crate::config::{
    LayoutConfig, VibratoStyle, MAX_VIBRATO_CENTS, MAX_VIBRATO_CYCLES, MIN_VIBRATO_CENTS, MIN_VIBRATO_CYCLES,
};
use crate::models::PitchClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Polyline samples per wave cycle
const SAMPLES_PER_CYCLE: usize = 16;

/// Sixteenths per quarter note
const QUARTER_UNITS: f64 = 4.0;

/// Which pitch classes carry a vibrato, plus the wave settings of a view
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VibratoLayer {
    enabled: Vec<PitchClass>,
    amplitude_cents: f64,
    cycles_per_quarter: f64,
}

impl Default for VibratoLayer {
    fn default() -> Self {
        Self::new(&VibratoStyle::default())
    }
}

impl VibratoLayer {
    pub fn new(style: &VibratoStyle) -> Self {
        Self {
            enabled: Vec::new(),
            amplitude_cents: style.amplitude_cents,
            cycles_per_quarter: style.cycles_per_quarter,
        }
    }

    /// Whether any enabled entry is an enharmonic of `class`
    pub fn is_enabled(&self, class: &PitchClass) -> bool {
        self.enabled.iter().any(|c| c.is_enharmonic(class))
    }

    /// Switch a pitch class on; returns false when it already was
    pub fn enable(&mut self, class: PitchClass) -> bool {
        if self.is_enabled(&class) {
            return false;
        }
        self.enabled.push(class);
        true
    }

    pub fn disable(&mut self, class: &PitchClass) {
        self.enabled.retain(|c| !c.is_enharmonic(class));
    }

    /// Flip a pitch class; returns whether it is now enabled
    pub fn toggle(&mut self, class: PitchClass) -> bool {
        if self.is_enabled(&class) {
            self.disable(&class);
            false
        } else {
            self.enable(class)
        }
    }

    pub fn clear(&mut self) {
        self.enabled.clear();
    }

    pub fn enabled(&self) -> &[PitchClass] {
        &self.enabled
    }

    pub fn amplitude_cents(&self) -> f64 {
        self.amplitude_cents
    }

    pub fn cycles_per_quarter(&self) -> f64 {
        self.cycles_per_quarter
    }

    /// Set the wave size and speed, clamped to the supported range
    pub fn set_params(&mut self, amplitude_cents: f64, cycles_per_quarter: f64) {
        if amplitude_cents.is_finite() {
            self.amplitude_cents = amplitude_cents.clamp(MIN_VIBRATO_CENTS, MAX_VIBRATO_CENTS);
        }
        if cycles_per_quarter.is_finite() {
            self.cycles_per_quarter = cycles_per_quarter.clamp(MIN_VIBRATO_CYCLES, MAX_VIBRATO_CYCLES);
        }
    }
}

/// A vibrato wave on one note
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VibratoPath {
    pub note_index: usize,

    /// String the note is drawn on
    pub string: usize,
    pub pitch_class: PitchClass,

    /// Wave ends at 100% zoom, before the marker offsets
    pub base_x_from: f64,
    pub base_x_to: f64,
    pub base_y: f64,

    /// Pixel offsets from the ends (note radii); constant under zoom
    pub from_offset: f64,
    pub to_offset: f64,

    pub x_from: f64,
    pub x_to: f64,
    pub y: f64,

    /// Peak-to-trough height in pixels
    pub base_amplitude: f64,
    pub amplitude: f64,

    /// Quarter-note length at 100% zoom
    pub quarter_px: f64,
    pub cycles_per_quarter: f64,

    /// Wave cycles along the live length
    pub cycles: f64,

    pub stroke_width: f64,

    /// Sampled wave in live coordinates
    pub points: Vec<Point>,
}

impl VibratoPath {
    pub fn length(&self) -> f64 {
        self.x_to - self.x_from
    }

    /// Recompute the live wave from the base values
    pub fn rescale(&mut self, zoom: &ZoomState) {
        let (sx, sy) = (zoom.x_scale, zoom.y_scale);
        self.x_from = self.base_x_from * sx + self.from_offset;
        self.x_to = self.base_x_to * sx + self.to_offset;
        self.y = self.base_y * sy;
        self.amplitude = self.base_amplitude * sy;

        let length = self.length();
        if !(length > 0.0) || !(sx > 0.0) {
            self.cycles = 0.0;
            self.points.clear();
            return;
        }
        self.cycles = length / (self.quarter_px * sx) * self.cycles_per_quarter;
        self.points = sine_points(self.x_from, self.x_to, self.y, self.amplitude / 2.0, self.cycles);
    }

    /// SVG path data through the sampled wave
    pub fn svg_path(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {:.2} {:.2}", if i == 0 { "M" } else { "L" }, p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn sine_points(x_from: f64, x_to: f64, y: f64, half_amplitude: f64, cycles: f64) -> Vec<Point> {
    let samples = ((cycles * SAMPLES_PER_CYCLE as f64).ceil() as usize).max(2);
    (0..=samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            Point::new(
                x_from + (x_to - x_from) * t,
                y + half_amplitude * (TAU * cycles * t).sin(),
            )
        })
        .collect()
}

/// Distinct pitch classes of a note list, lowest chroma first
pub fn used_pitch_classes(notes: &[PositionedNote]) -> Vec<PitchClass> {
    let mut classes: Vec<PitchClass> = Vec::new();
    for note in notes {
        if !classes.iter().any(|c| c.is_enharmonic(&note.pitch.class)) {
            classes.push(note.pitch.class);
        }
    }
    classes.sort_by(|a, b| a.chroma_cents().total_cmp(&b.chroma_cents()));
    classes
}

fn nearest_string(strings: &[RenderString], y: f64) -> Option<&RenderString> {
    strings
        .iter()
        .min_by(|a, b| (a.base_y - y).abs().total_cmp(&(b.base_y - y).abs()))
}

/// Vibrato paths at 100% zoom for every note of an enabled pitch class
///
/// Notes are grouped by the string nearest their base y and ordered by x
/// within each string. A wave runs from the note's edge to the next enabled
/// note's edge on the same string, or for the tail duration when there is
/// none. Waves with no room between two notes are dropped.
pub fn generate_vibratos(
    notes: &[PositionedNote],
    strings: &[RenderString],
    layer: &VibratoLayer,
    config: &LayoutConfig,
) -> Vec<VibratoPath> {
    if layer.enabled().is_empty() {
        return Vec::new();
    }

    let mut by_string: BTreeMap<usize, Vec<&PositionedNote>> = BTreeMap::new();
    for note in notes.iter().filter(|n| layer.is_enabled(&n.pitch.class)) {
        if let Some(string) = nearest_string(strings, note.base_y) {
            by_string.entry(string.index).or_default().push(note);
        }
    }

    let unit = config.spacing.unit_spacing;
    let quarter_px = QUARTER_UNITS * unit;
    let tail = config.vibrato.tail_duration * unit;
    let base_amplitude = layer.amplitude_cents() * config.strings.pixels_per_cent;

    let mut paths = Vec::new();
    for (string, mut on_string) in by_string {
        on_string.sort_by(|a, b| a.base_x.total_cmp(&b.base_x));
        for (i, note) in on_string.iter().enumerate() {
            let (base_x_to, to_offset) = match on_string.get(i + 1) {
                Some(next) => (next.base_x, -next.radius),
                None => (note.base_x + tail, 0.0),
            };
            if base_x_to + to_offset <= note.base_x + note.radius {
                log::debug!("No room for a vibrato after note {}", note.index);
                continue;
            }

            let mut path = VibratoPath {
                note_index: note.index,
                string,
                pitch_class: note.pitch.class,
                base_x_from: note.base_x,
                base_x_to,
                base_y: note.base_y,
                from_offset: note.radius,
                to_offset,
                x_from: 0.0,
                x_to: 0.0,
                y: 0.0,
                base_amplitude,
                amplitude: base_amplitude,
                quarter_px,
                cycles_per_quarter: layer.cycles_per_quarter(),
                cycles: 0.0,
                stroke_width: config.vibrato.stroke_width,
                points: Vec::new(),
            };
            path.rescale(&ZoomState::default());
            paths.push(path);
        }
    }

    paths.sort_by_key(|p| p.note_index);
    log::debug!("{} vibratos on {} enabled classes", paths.len(), layer.enabled().len());
    paths
}
