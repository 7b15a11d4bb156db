//! Multi-view workspace
//!
//! A workspace holds several tablature views side by side (typically the
//! same song under different tunings). Each view owns its scene, glissando
//! toggles and vibrato classes; zoom state and zoom links live in one shared controller so a change
//! on one view can be pushed to its linked peers.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::layout::glissando::{self, GlissandoLayer};
use crate::layout::vibrato::{generate_vibratos, used_pitch_classes, VibratoLayer, VibratoPath};
use crate::layout::zoom::{apply_zoom, Axis, ZoomChange, ZoomController, ZoomState};
use crate::layout::{ConnectorPath, PositionedNote, RenderString, Scene, SceneReport, SurfaceHint, TablatureEngine};
use crate::models::{Event, PitchClass, Tuning};
use std::collections::BTreeMap;

/// One tablature view and its inputs
#[derive(Clone, Debug)]
pub struct View {
    tuning: Tuning,
    events: Vec<Event>,
    surface: SurfaceHint,
    report: SceneReport,
    layer: GlissandoLayer,
    vibrato: VibratoLayer,
}

impl View {
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn report(&self) -> &SceneReport {
        &self.report
    }

    pub fn scene(&self) -> &Scene {
        &self.report.scene
    }

    pub fn layer(&self) -> &GlissandoLayer {
        &self.layer
    }

    pub fn vibrato(&self) -> &VibratoLayer {
        &self.vibrato
    }
}

/// Views keyed by id plus their shared zoom controller
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    engine: TablatureEngine,
    views: BTreeMap<String, View>,
    zoom: ZoomController,
}

impl Workspace {
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        let zoom = ZoomController::new(config.zoom.clone());
        Ok(Self {
            engine: TablatureEngine::new(config)?,
            views: BTreeMap::new(),
            zoom,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        self.engine.config()
    }

    /// Lay out a view, replacing any previous content under the same id
    ///
    /// Zoom and links are kept on reload; active glissandos survive when their
    /// note is still a candidate.
    pub fn load_view(
        &mut self,
        id: &str,
        tuning: Tuning,
        events: Vec<Event>,
        surface: SurfaceHint,
    ) -> LayoutResult<&SceneReport> {
        let report = self.engine.compute_scene(&tuning, &events, surface)?;

        let (layer, vibrato) = match self.views.remove(id) {
            Some(previous) => {
                let mut layer = previous.layer;
                layer.set_candidates(report.candidates.iter().copied());
                (layer, previous.vibrato)
            }
            None => (
                GlissandoLayer::new(report.candidates.iter().copied()),
                VibratoLayer::new(&self.engine.config().vibrato),
            ),
        };

        self.zoom.register(id);
        self.views.insert(
            id.to_string(),
            View {
                tuning,
                events,
                surface,
                report,
                layer,
                vibrato,
            },
        );
        self.redraw_vibratos(id)?;
        log::info!("Loaded view {}", id);
        Ok(&self.view(id)?.report)
    }

    /// Re-run layout for a view with its stored inputs
    pub fn recompute(&mut self, id: &str) -> LayoutResult<&SceneReport> {
        let view = self.view(id)?;
        let (tuning, events, surface) = (view.tuning.clone(), view.events.clone(), view.surface);
        self.load_view(id, tuning, events, surface)
    }

    pub fn remove_view(&mut self, id: &str) -> bool {
        self.zoom.remove(id);
        self.views.remove(id).is_some()
    }

    pub fn view_ids(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    pub fn view(&self, id: &str) -> LayoutResult<&View> {
        self.views.get(id).ok_or_else(|| LayoutError::UnknownView(id.to_string()))
    }

    fn view_mut(&mut self, id: &str) -> LayoutResult<&mut View> {
        self.views.get_mut(id).ok_or_else(|| LayoutError::UnknownView(id.to_string()))
    }

    pub fn scene(&self, id: &str) -> LayoutResult<&Scene> {
        Ok(self.view(id)?.scene())
    }

    /// Recompute live coordinates of a view from its current zoom
    fn refresh(&mut self, id: &str) -> LayoutResult<()> {
        let state = self.zoom.state(id)?;
        let config = self.engine.config();
        let view = self.views.get_mut(id).ok_or_else(|| LayoutError::UnknownView(id.to_string()))?;
        apply_zoom(&mut view.report.scene, state, &config.zoom, &config.glissando);
        for path in view.layer.pinned_mut() {
            path.rescale(&state, &config.glissando);
        }
        Ok(())
    }

    /// Rebuild a view's vibrato waves from its layer, then bring them to the current zoom
    fn redraw_vibratos(&mut self, id: &str) -> LayoutResult<()> {
        let config = self.engine.config();
        let view = self.views.get_mut(id).ok_or_else(|| LayoutError::UnknownView(id.to_string()))?;
        let scene = &mut view.report.scene;
        scene.vibratos = generate_vibratos(&scene.notes, &scene.strings, &view.vibrato, config);
        self.refresh(id)
    }

    fn apply_changes(&mut self, changes: Vec<ZoomChange>) -> LayoutResult<Vec<ZoomChange>> {
        let mut refreshed: Vec<&str> = Vec::new();
        for change in &changes {
            if !refreshed.contains(&change.view.as_str()) {
                refreshed.push(&change.view);
            }
        }
        for id in refreshed {
            if self.views.contains_key(id) {
                self.refresh(id)?;
            }
        }
        Ok(changes)
    }

    // ------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------

    pub fn zoom_state(&self, id: &str) -> LayoutResult<ZoomState> {
        self.zoom.state(id)
    }

    /// Zoom one axis by percent; linked views follow
    pub fn set_zoom(&mut self, id: &str, axis: Axis, percent: f64) -> LayoutResult<Vec<ZoomChange>> {
        let changes = self.zoom.set_percent(id, axis, percent)?;
        self.apply_changes(changes)
    }

    /// Link zoom of two views; `target` takes on `source`'s zoom
    pub fn link(&mut self, source: &str, target: &str) -> LayoutResult<Vec<ZoomChange>> {
        let changes = self.zoom.link(source, target)?;
        self.apply_changes(changes)
    }

    pub fn unlink(&mut self, a: &str, b: &str) -> bool {
        self.zoom.unlink(a, b)
    }

    pub fn unlink_all(&mut self, id: &str) {
        self.zoom.unlink_all(id);
    }

    pub fn is_linked(&self, a: &str, b: &str) -> bool {
        self.zoom.is_linked(a, b)
    }

    pub fn links_of(&self, id: &str) -> Vec<String> {
        self.zoom.links_of(id)
    }

    pub fn reset_zoom(&mut self, id: &str) -> LayoutResult<Vec<ZoomChange>> {
        let changes = self.zoom.reset(id)?;
        self.apply_changes(changes)
    }

    pub fn reset_all_zoom(&mut self) -> LayoutResult<Vec<ZoomChange>> {
        let changes = self.zoom.reset_all();
        self.apply_changes(changes)
    }

    /// Horizontal zoom so the whole view fits a container
    pub fn fit_to_width(&mut self, id: &str, container_width: f64) -> LayoutResult<Vec<ZoomChange>> {
        let base_width = self.scene(id)?.base_width;
        let changes = self.zoom.fit_to_width(id, base_width, container_width)?;
        self.apply_changes(changes)
    }

    // ------------------------------------------------------------------
    // Glissandos
    // ------------------------------------------------------------------

    pub fn toggle_glissando(&mut self, id: &str, note: usize) -> LayoutResult<bool> {
        Ok(self.view_mut(id)?.layer.toggle(note))
    }

    pub fn activate_glissando(&mut self, id: &str, note: usize) -> LayoutResult<bool> {
        Ok(self.view_mut(id)?.layer.activate(note))
    }

    pub fn deactivate_glissando(&mut self, id: &str, note: usize) -> LayoutResult<()> {
        self.view_mut(id)?.layer.deactivate(note);
        Ok(())
    }

    pub fn activate_all_glissandos(&mut self, id: &str) -> LayoutResult<()> {
        self.view_mut(id)?.layer.activate_all();
        Ok(())
    }

    pub fn clear_glissandos(&mut self, id: &str) -> LayoutResult<()> {
        self.view_mut(id)?.layer.clear();
        Ok(())
    }

    pub fn set_glissandos_visible(&mut self, id: &str, visible: bool) -> LayoutResult<()> {
        self.view_mut(id)?.layer.set_visible(visible);
        Ok(())
    }

    pub fn is_glissando_active(&self, id: &str, note: usize) -> LayoutResult<bool> {
        Ok(self.view(id)?.layer.is_active(note))
    }

    /// Connectors to draw for a view, in live coordinates
    pub fn active_paths(&self, id: &str) -> LayoutResult<Vec<ConnectorPath>> {
        let view = self.view(id)?;
        Ok(view
            .layer
            .paths_to_draw(&view.report.scene.paths)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Pin a connector with a fixed sweep width onto a candidate
    ///
    /// Without an explicit `delta` the first-priority sweep is used. Returns
    /// false when the note cannot carry one.
    pub fn pin_sweep(&mut self, id: &str, candidate: usize, delta: Option<f64>) -> LayoutResult<bool> {
        let view = self.view(id)?;
        let Some(delta) = delta.or(view.report.first_priority_delta) else {
            return Ok(false);
        };
        let strings = self.engine.strings(&view.tuning);
        let path = glissando::path_with_delta(
            &view.report.scene.notes,
            &strings,
            candidate,
            delta,
            &self.engine.config().glissando,
        )?;
        self.pin(id, path)
    }

    /// Pin a connector that ends on `target`, sweeping in from `delta / 2` before it
    pub fn pin_to_note(&mut self, id: &str, target: usize, delta: f64) -> LayoutResult<bool> {
        let view = self.view(id)?;
        let strings = self.engine.strings(&view.tuning);
        let path = glissando::path_to_note(
            &view.report.scene.notes,
            &strings,
            target,
            delta,
            &self.engine.config().glissando,
        )?;
        self.pin(id, path)
    }

    fn pin(&mut self, id: &str, path: Option<ConnectorPath>) -> LayoutResult<bool> {
        let Some(mut path) = path else {
            return Ok(false);
        };
        let state = self.zoom.state(id)?;
        path.rescale(&state, &self.engine.config().glissando);
        self.view_mut(id)?.layer.pin(path);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Vibratos
    // ------------------------------------------------------------------

    /// Flip vibrato for a pitch class; returns whether it is now on
    pub fn toggle_vibrato(&mut self, id: &str, class: PitchClass) -> LayoutResult<bool> {
        let enabled = self.view_mut(id)?.vibrato.toggle(class);
        self.redraw_vibratos(id)?;
        Ok(enabled)
    }

    pub fn enable_vibrato(&mut self, id: &str, classes: &[PitchClass]) -> LayoutResult<()> {
        let layer = &mut self.view_mut(id)?.vibrato;
        for class in classes {
            layer.enable(*class);
        }
        self.redraw_vibratos(id)
    }

    pub fn disable_vibrato(&mut self, id: &str, class: PitchClass) -> LayoutResult<()> {
        self.view_mut(id)?.vibrato.disable(&class);
        self.redraw_vibratos(id)
    }

    pub fn clear_vibratos(&mut self, id: &str) -> LayoutResult<()> {
        self.view_mut(id)?.vibrato.clear();
        self.redraw_vibratos(id)
    }

    /// Change wave size and speed; values are clamped to the supported range
    pub fn set_vibrato_params(&mut self, id: &str, amplitude_cents: f64, cycles_per_quarter: f64) -> LayoutResult<()> {
        self.view_mut(id)?.vibrato.set_params(amplitude_cents, cycles_per_quarter);
        self.redraw_vibratos(id)
    }

    /// Pitch classes present in a view, lowest first, for the toggle controls
    pub fn vibrato_classes(&self, id: &str) -> LayoutResult<Vec<PitchClass>> {
        Ok(used_pitch_classes(&self.scene(id)?.notes))
    }

    pub fn vibratos(&self, id: &str) -> LayoutResult<&[VibratoPath]> {
        Ok(&self.scene(id)?.vibratos)
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    pub fn note_at(&self, id: &str, x: f64, y: f64, max_distance: Option<f64>) -> LayoutResult<Option<&PositionedNote>> {
        Ok(self.scene(id)?.nearest_note(x, y, max_distance))
    }

    pub fn string_at(&self, id: &str, y: f64) -> LayoutResult<Option<&RenderString>> {
        Ok(self.scene(id)?.nearest_string(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    fn song() -> Vec<Event> {
        ["C4", "E4", "G4", "A4"]
            .iter()
            .map(|p| Note::new(p.parse().unwrap(), 4.0).into())
            .collect()
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::default();
        ws.load_view("optimal", "C-D-E-G-A".parse().unwrap(), song(), SurfaceHint::default())
            .unwrap();
        ws.load_view("alt", "C-D-F-G-A".parse().unwrap(), song(), SurfaceHint::default())
            .unwrap();
        ws
    }

    #[test]
    fn test_views_are_independent() {
        let mut ws = workspace();
        ws.set_zoom("optimal", Axis::X, 200.0).unwrap();
        assert_eq!(ws.scene("optimal").unwrap().notes[1].x, 980.0);
        assert_eq!(ws.scene("alt").unwrap().notes[1].x, 490.0);
        assert_eq!(ws.view_ids(), vec!["alt".to_string(), "optimal".to_string()]);
    }

    #[test]
    fn test_linked_zoom_updates_scenes() {
        let mut ws = workspace();
        let changes = ws.link("optimal", "alt").unwrap();
        assert_eq!(changes.len(), 4);

        let changes = ws.set_zoom("alt", Axis::Y, 50.0).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(ws.scene("optimal").unwrap().notes[0].y, 125.0);

        ws.unlink("alt", "optimal");
        ws.set_zoom("alt", Axis::Y, 100.0).unwrap();
        assert_eq!(ws.scene("optimal").unwrap().notes[0].y, 125.0);
    }

    #[test]
    fn test_reload_keeps_zoom_and_toggles() {
        let mut ws = workspace();
        ws.set_zoom("optimal", Axis::X, 150.0).unwrap();
        assert!(ws.toggle_glissando("optimal", 1).unwrap());
        assert!(ws.toggle_glissando("optimal", 2).unwrap());

        let shorter: Vec<Event> = song().into_iter().take(2).collect();
        ws.load_view("optimal", "C-D-E-G-A".parse().unwrap(), shorter, SurfaceHint::default())
            .unwrap();
        assert_eq!(ws.zoom_state("optimal").unwrap().x_scale, 1.5);
        assert_eq!(ws.scene("optimal").unwrap().notes[1].x, 735.0);
        assert!(!ws.is_glissando_active("optimal", 1).unwrap());
        assert!(!ws.is_glissando_active("optimal", 2).unwrap());
    }

    #[test]
    fn test_active_paths_follow_zoom() {
        let mut ws = workspace();
        ws.activate_glissando("optimal", 0).unwrap();
        let before = ws.active_paths("optimal").unwrap();
        assert_eq!(before.len(), 1);

        ws.set_zoom("optimal", Axis::X, 300.0).unwrap();
        let after = ws.active_paths("optimal").unwrap();
        assert_eq!(after[0].x_to, before[0].x_to * 3.0);
        assert_eq!(after[0].base_x_to, before[0].base_x_to);

        ws.set_glissandos_visible("optimal", false).unwrap();
        assert!(ws.active_paths("optimal").unwrap().is_empty());
    }

    #[test]
    fn test_pinned_paths() {
        let mut ws = workspace();
        assert!(ws.pin_sweep("optimal", 0, None).unwrap());
        assert!(ws.pin_to_note("optimal", 0, 340.0).unwrap());
        assert!(!ws.pin_sweep("optimal", 3, None).unwrap());

        let paths = ws.active_paths("optimal").unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].x_from, -20.0);
    }

    #[test]
    fn test_vibratos_follow_toggles_and_zoom() {
        let mut ws = workspace();
        let c: PitchClass = "C".parse().unwrap();
        assert!(ws.toggle_vibrato("optimal", c).unwrap());
        assert_eq!(ws.vibratos("optimal").unwrap().len(), 1);
        assert!(ws.vibratos("alt").unwrap().is_empty());

        let before = ws.vibratos("optimal").unwrap()[0].clone();
        ws.set_zoom("optimal", Axis::X, 200.0).unwrap();
        let after = ws.vibratos("optimal").unwrap()[0].clone();
        assert_eq!(after.x_from, before.base_x_from * 2.0 + 12.0);
        assert!((after.cycles - before.cycles).abs() < 0.1);

        // Reload keeps the enabled classes
        ws.recompute("optimal").unwrap();
        assert_eq!(ws.vibratos("optimal").unwrap()[0].x_from, after.x_from);

        ws.set_vibrato_params("optimal", 200.0, 6.0).unwrap();
        let doubled = &ws.vibratos("optimal").unwrap()[0];
        assert_eq!(doubled.base_amplitude, before.base_amplitude * 2.0);

        assert!(!ws.toggle_vibrato("optimal", c).unwrap());
        assert!(ws.vibratos("optimal").unwrap().is_empty());

        let classes: Vec<String> = ws.vibrato_classes("optimal").unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(classes, vec!["C", "E", "G", "A"]);
    }

    #[test]
    fn test_unknown_view() {
        let mut ws = workspace();
        assert_eq!(
            ws.set_zoom("missing", Axis::X, 120.0),
            Err(LayoutError::UnknownView("missing".to_string()))
        );
        assert!(ws.toggle_glissando("missing", 0).is_err());
        assert!(ws.remove_view("alt"));
        assert!(ws.scene("alt").is_err());
    }

    #[test]
    fn test_fit_and_hit_test() {
        let mut ws = workspace();
        // base width 150 + 4 * 340 + 400
        ws.fit_to_width("optimal", 985.0).unwrap();
        assert_eq!(ws.zoom_state("optimal").unwrap().x_scale, 0.5);

        let note = ws.note_at("optimal", 245.0, 300.0, Some(20.0)).unwrap().unwrap();
        assert_eq!(note.index, 1);
        assert!(ws.note_at("optimal", 0.0, 0.0, Some(5.0)).unwrap().is_none());
        assert_eq!(ws.string_at("optimal", 301.0).unwrap().map(|s| s.index), Some(8));
    }
}
