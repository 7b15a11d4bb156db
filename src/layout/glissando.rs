//! Glissando connectors
//!
//! Every main note followed by another note may carry a glissando sweeping
//! in from the edge of the tablature onto the next note. Connectors for all
//! candidates are computed with the scene; `GlissandoLayer` only tracks which
//! of them the user has switched on.

use super::chevrons::Point;
use super::scene::{ConnectorPath, PositionedNote};
use super::strings::{string_bounds, TabString};
use crate::config::GlissandoStyle;
use crate::error::{LayoutError, LayoutResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of opacity steps; rank 4 and beyond share the faintest one
const OPACITY_LEVELS: usize = 5;

/// Indices of notes that can start a glissando
///
/// A candidate is a main note with at least one note after it.
pub fn candidates(notes: &[PositionedNote]) -> Vec<usize> {
    notes
        .iter()
        .enumerate()
        .filter(|(i, note)| !note.is_grace && i + 1 < notes.len())
        .map(|(_, note)| note.index)
        .collect()
}

/// A note and the one immediately after it, looked up by note index
pub fn with_next(notes: &[PositionedNote], index: usize) -> Option<(&PositionedNote, &PositionedNote)> {
    let at = notes.iter().position(|n| n.index == index)?;
    Some((&notes[at], notes.get(at + 1)?))
}

fn by_index(notes: &[PositionedNote], index: usize) -> Option<&PositionedNote> {
    notes.iter().find(|n| n.index == index)
}

/// Whichever of the top and bottom strings lies farther from `target_y`
///
/// A tie picks the bottom.
pub fn farther_boundary(bounds: (f64, f64), target_y: f64) -> f64 {
    let (top, bottom) = bounds;
    if (target_y - top).abs() > (bottom - target_y).abs() {
        top
    } else {
        bottom
    }
}

/// Start X of a connector from `candidate` to `target`
///
/// Halfway across the gap, or a third of the way when the candidate is dotted.
pub fn x_from(candidate: &PositionedNote, target: &PositionedNote) -> f64 {
    let gap = target.base_x - candidate.base_x;
    if candidate.is_dotted {
        candidate.base_x + gap / 3.0
    } else {
        candidate.base_x + gap / 2.0
    }
}

/// Opacity for a duration rank: 1.0, 0.8, 0.6, 0.4 then 0.2
pub fn opacity_for_rank(rank: usize) -> f64 {
    (OPACITY_LEVELS.saturating_sub(rank).max(1)) as f64 / OPACITY_LEVELS as f64
}

/// Distinct candidate durations, longest first
pub fn priority_durations(notes: &[PositionedNote], candidates: &[usize]) -> Vec<f64> {
    let mut durations: Vec<f64> = candidates
        .iter()
        .filter_map(|&i| by_index(notes, i))
        .map(|n| n.duration)
        .collect();
    durations.sort_by(|a, b| b.total_cmp(a));
    durations.dedup();
    durations
}

/// Rank of a duration within `priorities`; equal durations share a rank
pub fn duration_rank(priorities: &[f64], duration: f64) -> usize {
    priorities
        .iter()
        .position(|d| *d == duration)
        .unwrap_or(priorities.len())
}

/// One connector per candidate, at 100% zoom
pub fn generate_paths(
    notes: &[PositionedNote],
    strings: &[TabString],
    candidates: &[usize],
    style: &GlissandoStyle,
) -> LayoutResult<Vec<ConnectorPath>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let bounds = string_bounds(strings).ok_or(LayoutError::MissingStringData)?;
    let priorities = priority_durations(notes, candidates);

    let paths: Vec<ConnectorPath> = candidates
        .iter()
        .filter_map(|&i| with_next(notes, i))
        .map(|(candidate, target)| {
            let opacity = opacity_for_rank(duration_rank(&priorities, candidate.duration));
            ConnectorPath::new(
                candidate.index,
                target.index,
                Point::new(x_from(candidate, target), farther_boundary(bounds, target.base_y)),
                Point::new(target.base_x, target.base_y),
                opacity,
                style,
            )
        })
        .collect();

    log::debug!("Generated {} glissando paths ({} priority levels)", paths.len(), priorities.len());
    Ok(paths)
}

/// X distance from the longest-duration candidate to its target
///
/// The first candidate wins among equal durations.
pub fn first_priority_delta(notes: &[PositionedNote], candidates: &[usize]) -> Option<f64> {
    let mut best: Option<(&PositionedNote, &PositionedNote)> = None;
    for pair in candidates.iter().filter_map(|&i| with_next(notes, i)) {
        if best.map_or(true, |(b, _)| pair.0.duration > b.duration) {
            best = Some(pair);
        }
    }
    let (first, target) = best?;
    Some(target.base_x - first.base_x)
}

/// Connector from a candidate with a fixed sweep width
///
/// Starts `delta / 2` right of the candidate and ends `delta` right of it, at
/// the height of the following note.
pub fn path_with_delta(
    notes: &[PositionedNote],
    strings: &[TabString],
    candidate: usize,
    delta: f64,
    style: &GlissandoStyle,
) -> LayoutResult<Option<ConnectorPath>> {
    let bounds = string_bounds(strings).ok_or(LayoutError::MissingStringData)?;
    let Some((c, t)) = with_next(notes, candidate) else {
        return Ok(None);
    };
    if c.is_grace {
        return Ok(None);
    }

    let priorities = priority_durations(notes, &candidates(notes));
    let opacity = opacity_for_rank(duration_rank(&priorities, c.duration));
    Ok(Some(ConnectorPath::new(
        c.index,
        t.index,
        Point::new(c.base_x + delta / 2.0, farther_boundary(bounds, t.base_y)),
        Point::new(c.base_x + delta, t.base_y),
        opacity,
        style,
    )))
}

/// Connector ending on a note, sweeping in from `delta / 2` to its left
pub fn path_to_note(
    notes: &[PositionedNote],
    strings: &[TabString],
    target: usize,
    delta: f64,
    style: &GlissandoStyle,
) -> LayoutResult<Option<ConnectorPath>> {
    let bounds = string_bounds(strings).ok_or(LayoutError::MissingStringData)?;
    let Some(t) = by_index(notes, target) else {
        return Ok(None);
    };
    Ok(Some(ConnectorPath::new(
        t.index,
        t.index,
        Point::new(t.base_x - delta / 2.0, farther_boundary(bounds, t.base_y)),
        Point::new(t.base_x, t.base_y),
        1.0,
        style,
    )))
}

/// How often a main-note duration occurs
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DurationStat {
    pub duration: f64,
    pub count: usize,

    /// Share of all main notes, 0..=100
    pub percentage: f64,
}

/// Main-note duration histogram, longest duration first
pub fn duration_stats(notes: &[PositionedNote]) -> Vec<DurationStat> {
    let main: Vec<f64> = notes.iter().filter(|n| !n.is_grace).map(|n| n.duration).collect();
    let mut stats: Vec<DurationStat> = Vec::new();

    for duration in &main {
        match stats.iter_mut().find(|s| s.duration == *duration) {
            Some(stat) => stat.count += 1,
            None => stats.push(DurationStat { duration: *duration, count: 1, percentage: 0.0 }),
        }
    }
    for stat in &mut stats {
        stat.percentage = stat.count as f64 * 100.0 / main.len() as f64;
    }
    stats.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    stats
}

/// Which connectors of a view are switched on
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GlissandoLayer {
    active: BTreeSet<usize>,
    candidates: BTreeSet<usize>,
    visible: bool,

    /// Connectors added by hand (custom sweep or note target), base coordinates
    #[serde(default)]
    pinned: Vec<ConnectorPath>,
}

impl Default for GlissandoLayer {
    fn default() -> Self {
        Self {
            active: BTreeSet::new(),
            candidates: BTreeSet::new(),
            visible: true,
            pinned: Vec::new(),
        }
    }
}

impl GlissandoLayer {
    pub fn new(candidates: impl IntoIterator<Item = usize>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Replace the candidate set, dropping active entries that no longer qualify
    pub fn set_candidates(&mut self, candidates: impl IntoIterator<Item = usize>) {
        self.candidates = candidates.into_iter().collect();
        let candidates = &self.candidates;
        self.active.retain(|i| candidates.contains(i));
        self.pinned.clear();
    }

    pub fn is_candidate(&self, index: usize) -> bool {
        self.candidates.contains(&index)
    }

    /// Switch a connector on; refused for notes that are not candidates
    pub fn activate(&mut self, index: usize) -> bool {
        if !self.is_candidate(index) {
            log::debug!("Note {} is not a glissando candidate", index);
            return false;
        }
        self.active.insert(index);
        true
    }

    /// Switch a connector off; a no-op when it was not on
    pub fn deactivate(&mut self, index: usize) {
        self.active.remove(&index);
        self.pinned.retain(|p| p.from_candidate_index != index);
    }

    /// Flip a connector; returns whether it is now active
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.is_active(index) {
            self.deactivate(index);
            false
        } else {
            self.activate(index)
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.contains(&index)
    }

    pub fn activate_all(&mut self) {
        self.active = self.candidates.clone();
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.pinned.clear();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.iter().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Keep a hand-built connector alongside the candidate ones
    pub fn pin(&mut self, path: ConnectorPath) {
        self.pinned.retain(|p| p.from_candidate_index != path.from_candidate_index);
        self.pinned.push(path);
    }

    pub fn pinned(&self) -> &[ConnectorPath] {
        &self.pinned
    }

    pub fn pinned_mut(&mut self) -> &mut [ConnectorPath] {
        &mut self.pinned
    }

    /// Connectors to draw: active candidates, then pinned paths
    ///
    /// Empty while the layer is hidden. A pinned path replaces the candidate
    /// connector of the same note.
    pub fn paths_to_draw<'a>(&'a self, all: &'a [ConnectorPath]) -> Vec<&'a ConnectorPath> {
        if !self.visible {
            return Vec::new();
        }
        let pinned_from: BTreeSet<usize> = self.pinned.iter().map(|p| p.from_candidate_index).collect();
        all.iter()
            .filter(|p| self.is_active(p.from_candidate_index) && !pinned_from.contains(&p.from_candidate_index))
            .chain(self.pinned.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::scene::NoteStatus;

    fn note(index: usize, x: f64, y: f64, duration: f64) -> PositionedNote {
        PositionedNote {
            index,
            pitch: "C4".parse().unwrap(),
            duration,
            is_grace: false,
            is_dotted: false,
            lyric: None,
            base_x: x,
            base_y: y,
            x,
            y,
            requires_bending: false,
            bend_magnitude: None,
            bend_from_string: None,
            string: None,
            radius: 12.0,
            grace_kind: None,
            status: NoteStatus::Resolved,
            fingering: None,
        }
    }

    fn strings(ys: &[f64]) -> Vec<TabString> {
        ys.iter()
            .enumerate()
            .map(|(i, y)| TabString {
                index: i + 1,
                pitch_class: "C".parse().unwrap(),
                octave: 3,
                cents: *y,
                y: *y,
            })
            .collect()
    }

    #[test]
    fn test_farther_boundary() {
        assert_eq!(farther_boundary((100.0, 500.0), 150.0), 500.0);
        assert_eq!(farther_boundary((100.0, 500.0), 450.0), 100.0);
        assert_eq!(farther_boundary((100.0, 500.0), 300.0), 500.0);
    }

    #[test]
    fn test_candidates_skip_grace_and_last() {
        let mut notes = vec![note(0, 150.0, 200.0, 4.0), note(1, 490.0, 250.0, 1.0), note(2, 511.0, 300.0, 4.0)];
        notes[1].is_grace = true;
        assert_eq!(candidates(&notes), vec![0]);
        assert!(candidates(&[]).is_empty());
    }

    #[test]
    fn test_path_geometry() {
        let notes = vec![note(0, 150.0, 400.0, 4.0), note(1, 490.0, 150.0, 4.0)];
        let paths = generate_paths(&notes, &strings(&[100.0, 500.0]), &[0], &GlissandoStyle::default()).unwrap();
        let p = &paths[0];
        assert_eq!((p.x_from, p.y_from), (320.0, 500.0));
        assert_eq!((p.x_to, p.y_to), (490.0, 150.0));
        assert_eq!(p.to_target_index, 1);
        assert_eq!(p.color, "#000000");
    }

    #[test]
    fn test_dotted_starts_a_third_of_the_way() {
        let mut notes = vec![note(0, 150.0, 400.0, 6.0), note(1, 660.0, 150.0, 4.0)];
        notes[0].is_dotted = true;
        let paths = generate_paths(&notes, &strings(&[100.0, 500.0]), &[0], &GlissandoStyle::default()).unwrap();
        assert_eq!(paths[0].x_from, 320.0);
    }

    #[test]
    fn test_opacity_hierarchy() {
        let notes = vec![
            note(0, 0.0, 200.0, 8.0),
            note(1, 100.0, 200.0, 4.0),
            note(2, 200.0, 200.0, 2.0),
            note(3, 300.0, 200.0, 4.0),
            note(4, 400.0, 200.0, 4.0),
        ];
        let paths = generate_paths(&notes, &strings(&[100.0, 500.0]), &candidates(&notes), &GlissandoStyle::default())
            .unwrap();
        let opacities: Vec<f64> = paths.iter().map(|p| p.opacity).collect();
        assert_eq!(opacities, vec![1.0, 0.8, 0.6, 0.8]);

        let ranks: Vec<f64> = (0..7).map(opacity_for_rank).collect();
        assert_eq!(ranks, vec![1.0, 0.8, 0.6, 0.4, 0.2, 0.2, 0.2]);
    }

    #[test]
    fn test_no_strings() {
        let notes = vec![note(0, 0.0, 0.0, 4.0), note(1, 85.0, 0.0, 4.0)];
        assert_eq!(
            generate_paths(&notes, &[], &[0], &GlissandoStyle::default()),
            Err(LayoutError::MissingStringData)
        );
    }

    #[test]
    fn test_first_priority_delta_and_custom_paths() {
        let notes = vec![
            note(0, 150.0, 200.0, 4.0),
            note(1, 490.0, 350.0, 8.0),
            note(2, 1170.0, 200.0, 8.0),
            note(3, 1850.0, 450.0, 4.0),
        ];
        let cands = candidates(&notes);
        assert_eq!(first_priority_delta(&notes, &cands), Some(680.0));

        let style = GlissandoStyle::default();
        let s = strings(&[100.0, 500.0]);
        let sweep = path_with_delta(&notes, &s, 0, 680.0, &style).unwrap().unwrap();
        assert_eq!((sweep.x_from, sweep.x_to), (490.0, 830.0));
        assert_eq!((sweep.y_from, sweep.y_to), (100.0, 350.0));
        assert_eq!(sweep.opacity, 0.8);

        let into = path_to_note(&notes, &s, 3, 680.0, &style).unwrap().unwrap();
        assert_eq!((into.x_from, into.y_from), (1510.0, 100.0));
        assert_eq!((into.from_candidate_index, into.to_target_index), (3, 3));
        assert_eq!(into.opacity, 1.0);

        assert!(path_with_delta(&notes, &s, 3, 100.0, &style).unwrap().is_none());
        assert!(path_to_note(&notes, &s, 9, 100.0, &style).unwrap().is_none());
    }

    #[test]
    fn test_duration_stats() {
        let mut notes = vec![
            note(0, 0.0, 0.0, 4.0),
            note(1, 0.0, 0.0, 4.0),
            note(2, 0.0, 0.0, 1.0),
            note(3, 0.0, 0.0, 8.0),
            note(4, 0.0, 0.0, 1.0),
        ];
        notes[4].is_grace = true;
        let stats = duration_stats(&notes);
        assert_eq!(stats.len(), 3);
        assert_eq!((stats[0].duration, stats[0].count), (8.0, 1));
        assert_eq!((stats[1].duration, stats[1].count, stats[1].percentage), (4.0, 2, 50.0));
        assert!(duration_stats(&[]).is_empty());
    }

    #[test]
    fn test_layer_toggle_idempotence() {
        let mut layer = GlissandoLayer::new([0, 1, 3]);
        assert!(layer.activate(1));
        assert!(layer.activate(1));
        assert_eq!(layer.active_count(), 1);

        layer.deactivate(1);
        layer.deactivate(1);
        assert_eq!(layer.active_count(), 0);

        assert!(!layer.activate(2));
        assert!(!layer.toggle(2));
        assert!(layer.toggle(3));
        assert!(!layer.toggle(3));

        layer.activate_all();
        assert_eq!(layer.active().collect::<Vec<_>>(), vec![0, 1, 3]);
        layer.set_candidates([0, 1]);
        assert_eq!(layer.active().collect::<Vec<_>>(), vec![0, 1]);
        layer.clear();
        assert_eq!(layer.active_count(), 0);
    }

    #[test]
    fn test_paths_to_draw() {
        let style = GlissandoStyle::default();
        let notes = vec![note(0, 0.0, 200.0, 4.0), note(1, 340.0, 300.0, 4.0), note(2, 680.0, 200.0, 4.0)];
        let s = strings(&[100.0, 500.0]);
        let all = generate_paths(&notes, &s, &candidates(&notes), &style).unwrap();

        let mut layer = GlissandoLayer::new(candidates(&notes));
        layer.activate(0);
        layer.activate(1);
        assert_eq!(layer.paths_to_draw(&all).len(), 2);

        layer.pin(path_with_delta(&notes, &s, 0, 100.0, &style).unwrap().unwrap());
        let drawn = layer.paths_to_draw(&all);
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[1].x_to, 100.0);

        layer.set_visible(false);
        assert!(layer.paths_to_draw(&all).is_empty());
    }
}
