//! `TablatureWorkspace` class for JavaScript
//!
//! Wraps `Workspace` so the host page can keep several views alive, zoom
//! them, link them and toggle glissandos and vibratos without re-sending song
//! data.

use super::core::{engine_from_js, events_from_js};
use super::helpers::{deserialize_or_default, layout_error, serialize, tuning_from_js, validate_percent, validation_error};
use crate::config::LayoutConfig;
use crate::layout::{Axis, SurfaceHint};
use crate::models::PitchClass;
use crate::workspace::Workspace;
use wasm_bindgen::prelude::*;

fn axis_from_str(axis: &str) -> Result<Axis, JsValue> {
    match axis {
        "x" | "X" => Ok(Axis::X),
        "y" | "Y" => Ok(Axis::Y),
        other => Err(validation_error(format!("Invalid zoom axis: '{}' (must be 'x' or 'y')", other))),
    }
}

fn pitch_class_from_str(class: &str) -> Result<PitchClass, JsValue> {
    class.parse().map_err(layout_error)
}

#[wasm_bindgen]
pub struct TablatureWorkspace {
    inner: Workspace,
}

#[wasm_bindgen]
impl TablatureWorkspace {
    /// Create a workspace; `config_js` is an optional partial `LayoutConfig`
    #[wasm_bindgen(constructor)]
    pub fn new(config_js: JsValue) -> Result<TablatureWorkspace, JsValue> {
        // Validates the config before keeping it
        let config: LayoutConfig = engine_from_js(config_js)?.config().clone();
        let inner = Workspace::new(config).map_err(layout_error)?;
        Ok(TablatureWorkspace { inner })
    }

    /// Lay out (or re-lay out) a view and return its `SceneReport`
    #[wasm_bindgen(js_name = loadView)]
    pub fn load_view(
        &mut self,
        id: &str,
        tuning_js: JsValue,
        events_js: JsValue,
        surface_js: JsValue,
    ) -> Result<JsValue, JsValue> {
        let tuning = tuning_from_js(tuning_js)?;
        let events = events_from_js(events_js)?;
        let surface: SurfaceHint = deserialize_or_default(surface_js, "Failed to deserialize surface hint")?;

        let report = self.inner.load_view(id, tuning, events, surface).map_err(layout_error)?;
        serialize(report, "Failed to serialize scene")
    }

    #[wasm_bindgen(js_name = removeView)]
    pub fn remove_view(&mut self, id: &str) -> bool {
        self.inner.remove_view(id)
    }

    #[wasm_bindgen(js_name = viewIds)]
    pub fn view_ids(&self) -> Vec<String> {
        self.inner.view_ids()
    }

    /// Current scene of a view, in live coordinates
    pub fn scene(&self, id: &str) -> Result<JsValue, JsValue> {
        let scene = self.inner.scene(id).map_err(layout_error)?;
        serialize(scene, "Failed to serialize scene")
    }

    /// Scene as pretty JSON, for snapshots and debugging
    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self, id: &str) -> Result<String, JsValue> {
        let scene = self.inner.scene(id).map_err(layout_error)?;
        crate::layout::scene_to_json(scene).map_err(|e| validation_error(format!("Failed to encode scene: {}", e)))
    }

    // ------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------

    /// Set a zoom axis (`"x"` or `"y"`) by percent
    ///
    /// Returns every `{ view, axis, percent }` change, linked views included.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, id: &str, axis: &str, percent: f64) -> Result<JsValue, JsValue> {
        validate_percent(percent).map_err(validation_error)?;
        let changes = self.inner.set_zoom(id, axis_from_str(axis)?, percent).map_err(layout_error)?;
        serialize(&changes, "Failed to serialize zoom changes")
    }

    #[wasm_bindgen(js_name = zoomState)]
    pub fn zoom_state(&self, id: &str) -> Result<JsValue, JsValue> {
        let state = self.inner.zoom_state(id).map_err(layout_error)?;
        serialize(&state, "Failed to serialize zoom state")
    }

    #[wasm_bindgen(js_name = linkZoom)]
    pub fn link_zoom(&mut self, source: &str, target: &str) -> Result<JsValue, JsValue> {
        let changes = self.inner.link(source, target).map_err(layout_error)?;
        serialize(&changes, "Failed to serialize zoom changes")
    }

    #[wasm_bindgen(js_name = unlinkZoom)]
    pub fn unlink_zoom(&mut self, a: &str, b: &str) -> bool {
        self.inner.unlink(a, b)
    }

    #[wasm_bindgen(js_name = unlinkAll)]
    pub fn unlink_all(&mut self, id: &str) {
        self.inner.unlink_all(id);
    }

    #[wasm_bindgen(js_name = isLinked)]
    pub fn is_linked(&self, a: &str, b: &str) -> bool {
        self.inner.is_linked(a, b)
    }

    #[wasm_bindgen(js_name = linksOf)]
    pub fn links_of(&self, id: &str) -> Vec<String> {
        self.inner.links_of(id)
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let changes = self.inner.reset_zoom(id).map_err(layout_error)?;
        serialize(&changes, "Failed to serialize zoom changes")
    }

    #[wasm_bindgen(js_name = resetAllZoom)]
    pub fn reset_all_zoom(&mut self) -> Result<JsValue, JsValue> {
        let changes = self.inner.reset_all_zoom().map_err(layout_error)?;
        serialize(&changes, "Failed to serialize zoom changes")
    }

    #[wasm_bindgen(js_name = fitToWidth)]
    pub fn fit_to_width(&mut self, id: &str, container_width: f64) -> Result<JsValue, JsValue> {
        let changes = self.inner.fit_to_width(id, container_width).map_err(layout_error)?;
        serialize(&changes, "Failed to serialize zoom changes")
    }

    // ------------------------------------------------------------------
    // Glissandos
    // ------------------------------------------------------------------

    /// Flip the glissando of a note; returns whether it is now shown
    #[wasm_bindgen(js_name = toggleGlissando)]
    pub fn toggle_glissando(&mut self, id: &str, note: usize) -> Result<bool, JsValue> {
        self.inner.toggle_glissando(id, note).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = activateGlissando)]
    pub fn activate_glissando(&mut self, id: &str, note: usize) -> Result<bool, JsValue> {
        self.inner.activate_glissando(id, note).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = deactivateGlissando)]
    pub fn deactivate_glissando(&mut self, id: &str, note: usize) -> Result<(), JsValue> {
        self.inner.deactivate_glissando(id, note).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = activateAllGlissandos)]
    pub fn activate_all_glissandos(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.activate_all_glissandos(id).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = clearGlissandos)]
    pub fn clear_glissandos(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.clear_glissandos(id).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = setGlissandosVisible)]
    pub fn set_glissandos_visible(&mut self, id: &str, visible: bool) -> Result<(), JsValue> {
        self.inner.set_glissandos_visible(id, visible).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = isGlissandoActive)]
    pub fn is_glissando_active(&self, id: &str, note: usize) -> Result<bool, JsValue> {
        self.inner.is_glissando_active(id, note).map_err(layout_error)
    }

    /// Connectors to draw, with live chevrons
    #[wasm_bindgen(js_name = activePaths)]
    pub fn active_paths(&self, id: &str) -> Result<JsValue, JsValue> {
        let paths = self.inner.active_paths(id).map_err(layout_error)?;
        serialize(&paths, "Failed to serialize glissando paths")
    }

    /// Pin a fixed-width sweep onto a candidate; `delta_js` may be omitted
    #[wasm_bindgen(js_name = pinSweep)]
    pub fn pin_sweep(&mut self, id: &str, note: usize, delta_js: JsValue) -> Result<bool, JsValue> {
        let delta: Option<f64> = deserialize_or_default(delta_js, "Failed to deserialize sweep width")?;
        self.inner.pin_sweep(id, note, delta).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = pinToNote)]
    pub fn pin_to_note(&mut self, id: &str, note: usize, delta: f64) -> Result<bool, JsValue> {
        self.inner.pin_to_note(id, note, delta).map_err(layout_error)
    }

    // ------------------------------------------------------------------
    // Vibratos
    // ------------------------------------------------------------------

    /// Flip vibrato for a pitch class such as `"C"` or `"Eb"`; returns whether it is now on
    #[wasm_bindgen(js_name = toggleVibrato)]
    pub fn toggle_vibrato(&mut self, id: &str, class: &str) -> Result<bool, JsValue> {
        let class = pitch_class_from_str(class)?;
        self.inner.toggle_vibrato(id, class).map_err(layout_error)
    }

    /// Switch vibrato on for a list of pitch class names
    #[wasm_bindgen(js_name = enableVibrato)]
    pub fn enable_vibrato(&mut self, id: &str, classes: Vec<String>) -> Result<(), JsValue> {
        let classes = classes
            .iter()
            .map(|c| pitch_class_from_str(c))
            .collect::<Result<Vec<_>, _>>()?;
        self.inner.enable_vibrato(id, &classes).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = disableVibrato)]
    pub fn disable_vibrato(&mut self, id: &str, class: &str) -> Result<(), JsValue> {
        let class = pitch_class_from_str(class)?;
        self.inner.disable_vibrato(id, class).map_err(layout_error)
    }

    #[wasm_bindgen(js_name = clearVibratos)]
    pub fn clear_vibratos(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.clear_vibratos(id).map_err(layout_error)
    }

    /// Amplitude in cents (40-400) and cycles per quarter note (1-10)
    #[wasm_bindgen(js_name = setVibratoParams)]
    pub fn set_vibrato_params(&mut self, id: &str, amplitude_cents: f64, cycles_per_quarter: f64) -> Result<(), JsValue> {
        self.inner
            .set_vibrato_params(id, amplitude_cents, cycles_per_quarter)
            .map_err(layout_error)
    }

    /// Pitch classes used in a view, for building the toggle controls
    #[wasm_bindgen(js_name = vibratoClasses)]
    pub fn vibrato_classes(&self, id: &str) -> Result<Vec<String>, JsValue> {
        let classes = self.inner.vibrato_classes(id).map_err(layout_error)?;
        Ok(classes.iter().map(|c| c.to_string()).collect())
    }

    /// Vibrato waves in live coordinates
    pub fn vibratos(&self, id: &str) -> Result<JsValue, JsValue> {
        let vibratos = self.inner.vibratos(id).map_err(layout_error)?;
        serialize(&vibratos, "Failed to serialize vibratos")
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Note nearest a point in live coordinates, or `null`
    #[wasm_bindgen(js_name = noteAt)]
    pub fn note_at(&self, id: &str, x: f64, y: f64, max_distance_js: JsValue) -> Result<JsValue, JsValue> {
        let max_distance: Option<f64> = deserialize_or_default(max_distance_js, "Failed to deserialize max distance")?;
        let note = self.inner.note_at(id, x, y, max_distance).map_err(layout_error)?;
        serialize(&note, "Failed to serialize note")
    }

    #[wasm_bindgen(js_name = stringAt)]
    pub fn string_at(&self, id: &str, y: f64) -> Result<JsValue, JsValue> {
        let string = self.inner.string_at(id, y).map_err(layout_error)?;
        serialize(&string, "Failed to serialize string")
    }
}
