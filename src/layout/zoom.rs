//! Zoom and rescale
//!
//! Live coordinates are always recomputed as `base * scale` from the values the
//! layout pass stored, so repeated zooming never accumulates error. Marker
//! sizes stay in pixels. Label columns scale about a pivot X so they stay near
//! the left edge.
//!
//! Views can be linked: a zoom change on one view is pushed to every view in
//! its linked group in one pass, and the caller gets the list of changes to
//! mirror onto its controls.

use super::scene::Scene;
use crate::config::{GlissandoStyle, ZoomLimits};
use crate::error::{LayoutError, LayoutResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Horizontal and vertical scale of one view
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ZoomState {
    pub x_scale: f64,
    pub y_scale: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self { x_scale: 1.0, y_scale: 1.0 }
    }
}

impl ZoomState {
    pub fn new(x_scale: f64, y_scale: f64) -> Self {
        Self { x_scale, y_scale }
    }

    pub fn scale(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_scale,
            Axis::Y => self.y_scale,
        }
    }

    pub fn set_scale(&mut self, axis: Axis, scale: f64) {
        match axis {
            Axis::X => self.x_scale = scale,
            Axis::Y => self.y_scale = scale,
        }
    }

    pub fn percent(&self, axis: Axis) -> f64 {
        self.scale(axis) * 100.0
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// A zoom value pushed onto a view
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ZoomChange {
    pub view: String,
    pub axis: Axis,
    pub percent: f64,
}

/// Scale a label-column X about the pivot
pub fn pivot_scale(base: f64, pivot: f64, scale: f64) -> f64 {
    pivot + (base - pivot) * scale
}

/// Recompute every live coordinate of a scene for `zoom`
pub fn apply_zoom(scene: &mut Scene, zoom: ZoomState, limits: &ZoomLimits, style: &GlissandoStyle) {
    let (sx, sy) = (zoom.x_scale, zoom.y_scale);

    for string in &mut scene.strings {
        string.y = string.base_y * sy;
        string.label_x = pivot_scale(string.base_label_x, limits.pivot_x, sx);
        string.line_start_x = pivot_scale(string.base_line_start_x, limits.pivot_x, sx);
    }

    for note in &mut scene.notes {
        note.x = note.base_x * sx;
        note.y = note.base_y * sy;
    }

    for bend in &mut scene.bends {
        bend.marker.x = bend.base_marker.x * sx;
        bend.marker.y = bend.base_marker.y * sy;
        bend.note.x = bend.base_note.x * sx;
        bend.note.y = bend.base_note.y * sy;
    }

    for path in &mut scene.paths {
        path.rescale(&zoom, style);
    }

    for vibrato in &mut scene.vibratos {
        vibrato.rescale(&zoom);
    }

    scene.width = scene.base_width * sx;
    scene.height = scene.base_height * sy;
    scene.zoom = zoom;
}

/// Zoom state of every view plus the links between them
#[derive(Clone, Debug, Default)]
pub struct ZoomController {
    limits: ZoomLimits,
    states: BTreeMap<String, ZoomState>,
    links: BTreeMap<String, BTreeSet<String>>,
}

impl ZoomController {
    pub fn new(limits: ZoomLimits) -> Self {
        Self { limits, ..Self::default() }
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    /// Start tracking a view at 100%
    pub fn register(&mut self, view: &str) {
        self.states.entry(view.to_string()).or_default();
    }

    /// Forget a view and every link it took part in
    pub fn remove(&mut self, view: &str) {
        self.states.remove(view);
        if let Some(peers) = self.links.remove(view) {
            for peer in peers {
                if let Some(set) = self.links.get_mut(&peer) {
                    set.remove(view);
                }
            }
        }
    }

    pub fn state(&self, view: &str) -> LayoutResult<ZoomState> {
        self.states
            .get(view)
            .copied()
            .ok_or_else(|| LayoutError::UnknownView(view.to_string()))
    }

    fn require(&self, view: &str) -> LayoutResult<()> {
        self.state(view).map(|_| ())
    }

    /// Views reachable from `view` through links, `view` first
    pub fn group(&self, view: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([view.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(peers) = self.links.get(&current) {
                queue.extend(peers.iter().filter(|p| !seen.contains(*p)).cloned());
            }
            order.push(current);
        }
        order
    }

    /// Set one axis of a view by percent and propagate it through its links
    pub fn set_percent(&mut self, view: &str, axis: Axis, percent: f64) -> LayoutResult<Vec<ZoomChange>> {
        self.require(view)?;
        let scale = self.limits.clamp(percent / 100.0);
        Ok(self.propagate(view, axis, scale))
    }

    fn propagate(&mut self, view: &str, axis: Axis, scale: f64) -> Vec<ZoomChange> {
        let mut changes = Vec::new();
        for member in self.group(view) {
            if let Some(state) = self.states.get_mut(&member) {
                state.set_scale(axis, scale);
                changes.push(ZoomChange {
                    view: member,
                    axis,
                    percent: scale * 100.0,
                });
            }
        }
        log::debug!("Zoom {} {:?} -> {}% ({} views)", view, axis, scale * 100.0, changes.len());
        changes
    }

    /// Link two views symmetrically and sync the target's group to the source
    pub fn link(&mut self, source: &str, target: &str) -> LayoutResult<Vec<ZoomChange>> {
        self.require(source)?;
        self.require(target)?;
        if source == target {
            return Ok(Vec::new());
        }

        self.links.entry(source.to_string()).or_default().insert(target.to_string());
        self.links.entry(target.to_string()).or_default().insert(source.to_string());
        log::info!("Linked zoom of {} and {}", source, target);

        let state = self.state(source)?;
        let mut changes = self.propagate(source, Axis::X, state.x_scale);
        changes.extend(self.propagate(source, Axis::Y, state.y_scale));
        Ok(changes)
    }

    /// Remove a link; returns whether one existed
    pub fn unlink(&mut self, a: &str, b: &str) -> bool {
        let removed = self.links.get_mut(a).map_or(false, |set| set.remove(b));
        if let Some(set) = self.links.get_mut(b) {
            set.remove(a);
        }
        removed
    }

    /// Drop every link of a view
    pub fn unlink_all(&mut self, view: &str) {
        if let Some(peers) = self.links.remove(view) {
            for peer in peers {
                self.unlink(&peer, view);
            }
        }
    }

    pub fn is_linked(&self, a: &str, b: &str) -> bool {
        self.links.get(a).map_or(false, |set| set.contains(b))
    }

    /// Directly linked peers of a view
    pub fn links_of(&self, view: &str) -> Vec<String> {
        self.links
            .get(view)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Back to 100% on both axes, propagated like any other change
    pub fn reset(&mut self, view: &str) -> LayoutResult<Vec<ZoomChange>> {
        let mut changes = self.set_percent(view, Axis::X, 100.0)?;
        changes.extend(self.set_percent(view, Axis::Y, 100.0)?);
        Ok(changes)
    }

    pub fn reset_all(&mut self) -> Vec<ZoomChange> {
        let mut changes = Vec::new();
        for (view, state) in &mut self.states {
            *state = ZoomState::default();
            for axis in [Axis::X, Axis::Y] {
                changes.push(ZoomChange { view: view.clone(), axis, percent: 100.0 });
            }
        }
        changes
    }

    /// Horizontal zoom that fits `base_width` into a container
    ///
    /// The percentage is rounded to a whole number and clamped.
    pub fn fit_to_width(
        &mut self,
        view: &str,
        base_width: f64,
        container_width: f64,
    ) -> LayoutResult<Vec<ZoomChange>> {
        self.require(view)?;
        if !(base_width > 0.0) {
            return Err(LayoutError::InvalidConfig(format!("cannot fit scene of width {}", base_width)));
        }
        let available = (container_width - self.limits.fit_padding).max(0.0);
        let percent = (available / base_width * 100.0).round();
        self.set_percent(view, Axis::X, percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(views: &[&str]) -> ZoomController {
        let mut c = ZoomController::new(ZoomLimits::default());
        for v in views {
            c.register(v);
        }
        c
    }

    #[test]
    fn test_pivot_scale() {
        assert_eq!(pivot_scale(100.0, 60.0, 2.0), 140.0);
        assert_eq!(pivot_scale(60.0, 60.0, 3.0), 60.0);
        assert_eq!(pivot_scale(20.0, 60.0, 0.5), 40.0);
    }

    #[test]
    fn test_percent_is_clamped() {
        let mut c = controller(&["a"]);
        let changes = c.set_percent("a", Axis::X, 1000.0).unwrap();
        assert_eq!(changes[0].percent, 400.0);
        c.set_percent("a", Axis::Y, 0.0).unwrap();
        assert_eq!(c.state("a").unwrap(), ZoomState::new(4.0, 0.01));
    }

    #[test]
    fn test_unknown_view() {
        let mut c = controller(&["a"]);
        assert_eq!(
            c.set_percent("b", Axis::X, 50.0),
            Err(LayoutError::UnknownView("b".to_string()))
        );
    }

    #[test]
    fn test_links_propagate_transitively() {
        let mut c = controller(&["a", "b", "c", "d"]);
        c.link("a", "b").unwrap();
        c.link("b", "c").unwrap();

        let changes = c.set_percent("c", Axis::X, 150.0).unwrap();
        let views: Vec<&str> = changes.iter().map(|ch| ch.view.as_str()).collect();
        assert_eq!(views, vec!["c", "b", "a"]);
        assert_eq!(c.state("a").unwrap().x_scale, 1.5);
        assert_eq!(c.state("d").unwrap().x_scale, 1.0);
        assert!(c.is_linked("b", "a"));
    }

    #[test]
    fn test_link_syncs_target() {
        let mut c = controller(&["a", "b"]);
        c.set_percent("a", Axis::Y, 200.0).unwrap();
        c.set_percent("b", Axis::X, 50.0).unwrap();
        c.link("a", "b").unwrap();
        assert_eq!(c.state("b").unwrap(), ZoomState::new(1.0, 2.0));
    }

    #[test]
    fn test_unlink() {
        let mut c = controller(&["a", "b", "c"]);
        c.link("a", "b").unwrap();
        c.link("a", "c").unwrap();
        assert!(c.unlink("b", "a"));
        assert!(!c.unlink("b", "a"));
        assert_eq!(c.links_of("a"), vec!["c".to_string()]);

        c.unlink_all("a");
        assert!(c.links_of("c").is_empty());
        assert_eq!(c.set_percent("a", Axis::X, 300.0).unwrap().len(), 1);
    }

    #[test]
    fn test_fit_to_width() {
        let mut c = controller(&["a"]);
        c.fit_to_width("a", 2000.0, 1030.0).unwrap();
        assert_eq!(c.state("a").unwrap().x_scale, 0.5);
        assert!(c.fit_to_width("a", 0.0, 1000.0).is_err());
    }

    #[test]
    fn test_reset() {
        let mut c = controller(&["a", "b"]);
        c.set_percent("a", Axis::X, 250.0).unwrap();
        c.set_percent("b", Axis::Y, 30.0).unwrap();
        c.reset("a").unwrap();
        assert_eq!(c.state("a").unwrap(), ZoomState::default());
        assert_eq!(c.reset_all().len(), 4);
        assert_eq!(c.state("b").unwrap(), ZoomState::default());
    }
}
