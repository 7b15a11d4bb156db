//! Tablature layout
//!
//! Strings, pitch resolution, horizontal spacing, fingering, glissando
//! connectors, vibratos and zoom, tied together by `TablatureEngine`, which
//! produces a `Scene` for the renderer.

pub mod chevrons;
pub mod engine;
pub mod fingering;
pub mod glissando;
pub mod horizontal;
pub mod resolver;
pub mod scene;
pub mod strings;
pub mod vibrato;
pub mod zoom;

pub use chevrons::{Chevron, ChevronRenderer, Point};
pub use engine::{SceneReport, SurfaceHint, TablatureEngine};
pub use fingering::{apply_fingering, assign_fingers, Finger};
pub use glissando::{DurationStat, GlissandoLayer};
pub use horizontal::{layout_x, DurationTable, HorizontalLayout};
pub use resolver::{resolve_position, Resolution};
pub use scene::*;
pub use strings::{build_strings, string_bounds, TabString};
pub use vibrato::{generate_vibratos, used_pitch_classes, VibratoLayer, VibratoPath};
pub use zoom::{apply_zoom, Axis, ZoomChange, ZoomController, ZoomState};
