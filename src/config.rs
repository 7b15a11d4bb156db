//! Layout configuration
//!
//! All values are in SVG user units (pixels at 100% zoom). JavaScript may send
//! a partial object; every missing field keeps its default.

use crate::error::{LayoutError, LayoutResult};
use serde::{Deserialize, Serialize};

/// Upper bounds that keep geometry (and chevron counts) finite
const MAX_PIXELS_PER_CENT: f64 = 2.0;
const MAX_COORDINATE: f64 = 10_000.0;
const MAX_UNIT_SPACING: f64 = 1_000.0;
const MAX_STRING_COUNT: usize = 200;
const MIN_CHEVRON_DEPTH: f64 = 1.0;

fn check_range(name: &str, value: f64, min: f64, max: f64) -> LayoutResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(format!("{} must be within {}..={}, got {}", name, min, max, value)))
    }
}

/// Configuration for a layout pass
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct LayoutConfig {
    pub strings: StringGeometry,
    pub spacing: SpacingConfig,
    pub markers: MarkerConfig,
    pub glissando: GlissandoStyle,
    pub vibrato: VibratoStyle,
    pub fingering: FingeringConfig,
    pub zoom: ZoomLimits,

    /// What to do with notes below the lowest string
    pub unresolved_policy: UnresolvedPolicy,
}

impl LayoutConfig {
    /// Reject values that would produce degenerate or unbounded geometry
    pub fn validate(&self) -> LayoutResult<()> {
        let strings = &self.strings;
        if !(strings.pixels_per_cent.is_finite() && strings.pixels_per_cent > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "pixels_per_cent must be positive, got {}",
                strings.pixels_per_cent
            )));
        }
        check_range("pixels_per_cent", strings.pixels_per_cent, 0.0, MAX_PIXELS_PER_CENT)?;
        check_range("reference_y", strings.reference_y, -MAX_COORDINATE, MAX_COORDINATE)?;
        check_range("label_x", strings.label_x, -MAX_COORDINATE, MAX_COORDINATE)?;
        check_range("line_start_x", strings.line_start_x, -MAX_COORDINATE, MAX_COORDINATE)?;
        if strings.count > MAX_STRING_COUNT {
            return Err(LayoutError::InvalidConfig(format!(
                "at most {} strings are supported, got {}",
                MAX_STRING_COUNT, strings.count
            )));
        }

        let spacing = &self.spacing;
        if !(spacing.unit_spacing.is_finite() && spacing.unit_spacing > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "unit_spacing must be positive, got {}",
                spacing.unit_spacing
            )));
        }
        check_range("unit_spacing", spacing.unit_spacing, 0.0, MAX_UNIT_SPACING)?;
        check_range("grace_spacing", spacing.grace_spacing, 0.0, MAX_UNIT_SPACING)?;
        check_range("start_x", spacing.start_x, -MAX_COORDINATE, MAX_COORDINATE)?;
        check_range("trailing_margin", spacing.trailing_margin, 0.0, MAX_COORDINATE)?;
        check_range("bottom_margin", spacing.bottom_margin, 0.0, MAX_COORDINATE)?;

        check_range("chevron_depth", self.glissando.chevron_depth, MIN_CHEVRON_DEPTH, MAX_COORDINATE)?;
        check_range("chevron_width", self.glissando.chevron_width, 0.0, MAX_COORDINATE)?;

        let vibrato = &self.vibrato;
        check_range("amplitude_cents", vibrato.amplitude_cents, MIN_VIBRATO_CENTS, MAX_VIBRATO_CENTS)?;
        check_range("cycles_per_quarter", vibrato.cycles_per_quarter, MIN_VIBRATO_CYCLES, MAX_VIBRATO_CYCLES)?;
        check_range("tail_duration", vibrato.tail_duration, 0.0, 64.0)?;

        check_range("repeat_tolerance", self.fingering.repeat_tolerance, 0.0, MAX_COORDINATE)?;
        check_range("leap_threshold", self.fingering.leap_threshold, 0.0, MAX_COORDINATE)?;

        if !(self.zoom.min_scale > 0.0 && self.zoom.min_scale <= self.zoom.max_scale) {
            return Err(LayoutError::InvalidConfig(format!(
                "zoom range {}..{} is empty",
                self.zoom.min_scale, self.zoom.max_scale
            )));
        }
        check_range("max_scale", self.zoom.max_scale, 0.0, 100.0)?;
        Ok(())
    }
}

/// Vertical string geometry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StringGeometry {
    /// Number of strings to lay out (17 standard + 3 extension strings)
    pub count: usize,

    /// Vertical pixels per cent of pitch distance
    pub pixels_per_cent: f64,

    /// Y coordinate of C in `base_octave`
    pub reference_y: f64,

    /// Octave whose C sits at `reference_y`
    pub base_octave: i32,

    /// Octave of the first string
    pub start_octave: i32,

    /// Left end of the string lines
    pub line_start_x: f64,

    /// X of the string labels
    pub label_x: f64,

    /// Max distance (px) at which a note counts as sitting on a string
    pub used_tolerance: f64,
}

impl Default for StringGeometry {
    fn default() -> Self {
        Self {
            count: 20,
            pixels_per_cent: 0.125,
            reference_y: 100.0,
            base_octave: 3,
            start_octave: 3,
            line_start_x: 100.0,
            label_x: 20.0,
            used_tolerance: 5.0,
        }
    }
}

/// Horizontal spacing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SpacingConfig {
    /// X of the first event
    pub start_x: f64,

    /// Pixels per sixteenth; also the fallback for invalid durations
    pub unit_spacing: f64,

    /// Fixed advance after a grace note
    pub grace_spacing: f64,

    /// Space kept after the last note when sizing the surface
    pub trailing_margin: f64,

    /// Space kept below the bottom string when sizing the surface
    pub bottom_margin: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            start_x: 150.0,
            unit_spacing: 85.0,
            grace_spacing: 21.25,
            trailing_margin: 400.0,
            bottom_margin: 100.0,
        }
    }
}

/// Marker sizes; constant under zoom
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MarkerConfig {
    pub note_radius: f64,
    pub grace_radius: f64,

    /// Horizontal offset of the bend-from marker left of the note
    pub bend_marker_offset: f64,

    pub label_font_size: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            note_radius: 12.0,
            grace_radius: 6.0,
            bend_marker_offset: 15.0,
            label_font_size: 14.0,
        }
    }
}

/// Glissando connector appearance
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GlissandoStyle {
    /// Distance between chevron tips, and arm length along the path
    pub chevron_depth: f64,

    /// Spread of the two arms across the path
    pub chevron_width: f64,

    pub stroke_width: f64,

    /// Single hue shared by all connectors
    pub color: String,
}

impl Default for GlissandoStyle {
    fn default() -> Self {
        Self {
            chevron_depth: 9.0,
            chevron_width: 14.0,
            stroke_width: 4.0,
            color: "#000000".to_string(),
        }
    }
}

/// Vibrato range accepted from the host controls
pub const MIN_VIBRATO_CENTS: f64 = 40.0;
pub const MAX_VIBRATO_CENTS: f64 = 400.0;
pub const MIN_VIBRATO_CYCLES: f64 = 1.0;
pub const MAX_VIBRATO_CYCLES: f64 = 10.0;

/// Vibrato wave appearance; amplitude and speed are per-view defaults
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct VibratoStyle {
    /// Peak-to-trough pitch swing in cents
    pub amplitude_cents: f64,

    /// Wave cycles per quarter note of length
    pub cycles_per_quarter: f64,

    /// Length (sixteenths) of a vibrato with no later note on its string
    pub tail_duration: f64,

    pub stroke_width: f64,
}

impl Default for VibratoStyle {
    fn default() -> Self {
        Self {
            amplitude_cents: 100.0,
            cycles_per_quarter: 3.0,
            tail_duration: 8.0,
            stroke_width: 3.0,
        }
    }
}

/// Thresholds for fingering labels, in pixels at 100% zoom
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FingeringConfig {
    /// Notes closer than this vertically count as a repeated pitch
    pub repeat_tolerance: f64,

    /// Upward moves larger than this take the middle finger (one octave at default scale)
    pub leap_threshold: f64,
}

impl Default for FingeringConfig {
    fn default() -> Self {
        Self {
            repeat_tolerance: 5.0,
            leap_threshold: 150.0,
        }
    }
}

/// Zoom range and pivot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,

    /// X about which label columns scale
    pub pivot_x: f64,

    /// Horizontal padding subtracted from a container when fitting to width
    pub fit_padding: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.01,
            max_scale: 4.0,
            pivot_x: 60.0,
            fit_padding: 30.0,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return 1.0_f64.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Fallback for notes that cannot be placed on the strings
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Place the note on the lowest string and mark it clamped
    #[default]
    Clamp,
    /// Leave the note out of the scene
    Skip,
}
