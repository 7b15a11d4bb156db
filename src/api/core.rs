//! Stateless WASM API
//!
//! Each call takes plain JavaScript values, runs one operation and returns
//! a plain object. Nothing is kept between calls; use `TablatureWorkspace`
//! for views that need zoom and glissando state.

use super::helpers::{deserialize, deserialize_or_default, layout_error, serialize, tuning_from_js};
use crate::analysis;
use crate::config::LayoutConfig;
use crate::layout::{resolve_position, SurfaceHint, TablatureEngine};
use crate::models::{Event, Pitch, Tuning, TuningSpec, TUNING_PRESETS};
use wasm_bindgen::prelude::*;

/// Build an engine from an optional JavaScript config object
pub(crate) fn engine_from_js(config_js: JsValue) -> Result<TablatureEngine, JsValue> {
    let config: LayoutConfig = deserialize_or_default(config_js, "Failed to deserialize layout config")?;
    TablatureEngine::new(config).map_err(layout_error)
}

pub(crate) fn events_from_js(events_js: JsValue) -> Result<Vec<Event>, JsValue> {
    deserialize(events_js, "Failed to deserialize events")
}

/// Lay out the strings of a tuning
///
/// # Parameters
/// - `tuning_js`: key string (`"C-D-E-G-A"`) or array of pitch classes
/// - `config_js`: optional partial `LayoutConfig`
#[wasm_bindgen(js_name = buildStrings)]
pub fn build_strings(tuning_js: JsValue, config_js: JsValue) -> Result<JsValue, JsValue> {
    let tuning = tuning_from_js(tuning_js)?;
    let engine = engine_from_js(config_js)?;
    serialize(&engine.strings(&tuning), "Failed to serialize strings")
}

/// Resolve one pitch against a tuning's strings
#[wasm_bindgen(js_name = resolvePitch)]
pub fn resolve_pitch(pitch: &str, tuning_js: JsValue, config_js: JsValue) -> Result<JsValue, JsValue> {
    let pitch: Pitch = pitch.parse().map_err(layout_error)?;
    let tuning = tuning_from_js(tuning_js)?;
    let engine = engine_from_js(config_js)?;

    let strings = engine.strings(&tuning);
    let resolution = resolve_position(&pitch, &strings, &engine.config().strings).map_err(layout_error)?;
    serialize(&resolution, "Failed to serialize resolution")
}

/// Compute a complete scene
///
/// # Returns
/// A `SceneReport`: `{ scene, warnings, candidates, duration_stats, first_priority_delta }`
#[wasm_bindgen(js_name = computeScene)]
pub fn compute_scene(
    tuning_js: JsValue,
    events_js: JsValue,
    surface_js: JsValue,
    config_js: JsValue,
) -> Result<JsValue, JsValue> {
    let tuning = tuning_from_js(tuning_js)?;
    let events = events_from_js(events_js)?;
    let surface: SurfaceHint = deserialize_or_default(surface_js, "Failed to deserialize surface hint")?;
    let engine = engine_from_js(config_js)?;

    let report = engine.compute_scene(&tuning, &events, surface).map_err(layout_error)?;
    serialize(&report, "Failed to serialize scene")
}

/// Pick the tuning with the fewest bent notes
///
/// `candidates_js` is an optional array of tunings; without it the default
/// dan tranh candidates are tried.
#[wasm_bindgen(js_name = findOptimalTuning)]
pub fn find_optimal_tuning(events_js: JsValue, candidates_js: JsValue) -> Result<JsValue, JsValue> {
    let events = events_from_js(events_js)?;
    let specs: Option<Vec<TuningSpec>> = deserialize_or_default(candidates_js, "Failed to deserialize candidates")?;
    let candidates = match specs {
        Some(specs) => specs
            .into_iter()
            .map(TuningSpec::into_tuning)
            .collect::<Result<Vec<Tuning>, _>>()
            .map_err(layout_error)?,
        None => analysis::default_candidates(),
    };

    let analysis = analysis::find_optimal_tuning(&events, &candidates);
    serialize(&analysis, "Failed to serialize tuning analysis")
}

/// Frequency-based tuning compared against every five-note preset
#[wasm_bindgen(js_name = analyzeTunings)]
pub fn analyze_tunings(events_js: JsValue) -> Result<JsValue, JsValue> {
    let events = events_from_js(events_js)?;
    serialize(&analysis::analyze_all_tunings(&events), "Failed to serialize tuning analysis")
}

/// All named tunings: `[{ key, name, family }]`
#[wasm_bindgen(js_name = listTuningPresets)]
pub fn list_tuning_presets() -> Result<JsValue, JsValue> {
    serialize(&*TUNING_PRESETS, "Failed to serialize tuning presets")
}
