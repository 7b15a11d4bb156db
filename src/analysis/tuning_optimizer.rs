//! Tuning optimizer
//!
//! Picks the tuning that leaves the fewest notes to be bent. A main note needs
//! bending when its pitch class is not one of the tuning's open strings in any
//! octave. Grace notes are ornamental and do not count.

use crate::models::{notes_of, Event, PitchClass, Tuning, TuningPreset, TUNING_PRESETS};
use serde::{Deserialize, Serialize};

/// Size of the frequency-based tuning
const FREQUENCY_TUNING_SIZE: usize = 5;

/// Tunings tried when the caller gives none
const DEFAULT_CANDIDATES: [&str; 6] = [
    "C-D-E-G-A",
    "C-D-F-G-A",
    "C-D-E-G-B",
    "C-Eb-F-G-Bb",
    "D-F-G-A-C",
    "A-C-D-E-G",
];

/// Bent-note count for one tuning
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TuningScore {
    pub tuning: Tuning,
    pub bent_notes: usize,
}

/// Outcome of comparing several tunings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TuningAnalysis {
    pub optimal: Tuning,
    pub bent_notes: usize,

    /// Every tuning tried, fewest bent notes first
    pub results: Vec<TuningScore>,

    /// Human-readable name of the optimal tuning
    pub description: String,
}

/// Number of main notes whose pitch class is not an open string
pub fn count_bent_notes(events: &[Event], tuning: &Tuning) -> usize {
    notes_of(events)
        .filter(|n| !n.is_grace && !tuning.contains_class(&n.pitch.class))
        .count()
}

/// Parsed default candidate tunings
pub fn default_candidates() -> Vec<Tuning> {
    DEFAULT_CANDIDATES.iter().filter_map(|key| key.parse().ok()).collect()
}

/// Tuning with the fewest bent notes
///
/// The earliest candidate wins ties. Returns `None` for an empty candidate list.
pub fn find_optimal_tuning(events: &[Event], candidates: &[Tuning]) -> Option<TuningAnalysis> {
    let mut results: Vec<TuningScore> = candidates
        .iter()
        .map(|tuning| TuningScore {
            tuning: tuning.clone(),
            bent_notes: count_bent_notes(events, tuning),
        })
        .collect();

    let best = results
        .iter()
        .enumerate()
        .min_by_key(|(i, score)| (score.bent_notes, *i))
        .map(|(_, score)| score.clone())?;

    // Stable sort keeps candidate order among equal counts
    results.sort_by_key(|score| score.bent_notes);

    log::debug!("Optimal tuning {} ({} bent notes of {} tried)", best.tuning, best.bent_notes, results.len());
    Some(TuningAnalysis {
        description: describe(&best.tuning),
        optimal: best.tuning,
        bent_notes: best.bent_notes,
        results,
    })
}

/// The most frequent main-note pitch classes, lowest pitch first
///
/// Enharmonic spellings are counted together under the first spelling seen.
/// Ties in frequency keep order of first appearance. `None` when the sequence
/// has no main notes.
pub fn frequency_based_tuning(events: &[Event]) -> Option<Tuning> {
    let mut counts: Vec<(PitchClass, usize)> = Vec::new();
    for note in notes_of(events).filter(|n| !n.is_grace) {
        match counts.iter_mut().find(|(class, _)| class.is_enharmonic(&note.pitch.class)) {
            Some((_, count)) => *count += 1,
            None => counts.push((note.pitch.class, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let mut top: Vec<PitchClass> = counts
        .into_iter()
        .take(FREQUENCY_TUNING_SIZE)
        .map(|(class, _)| class)
        .collect();
    top.sort_by(|a, b| a.cents().total_cmp(&b.cents()));

    let tuning = Tuning::new(top).ok()?;
    if tuning.is_monotonic() {
        return Some(tuning);
    }

    // Spellings on both sides of the octave boundary (Cb with B#): respell into 0..1200
    let mut respelled: Vec<PitchClass> = tuning.pattern().iter().map(|class| class.within_octave()).collect();
    respelled.sort_by(|a, b| a.cents().total_cmp(&b.cents()));
    Tuning::new(respelled).ok()
}

/// Frequency-based tuning compared against every five-note preset
///
/// The frequency-based tuning is always the one reported as optimal.
pub fn analyze_all_tunings(events: &[Event]) -> Option<TuningAnalysis> {
    let frequency = frequency_based_tuning(events)?;
    let frequency_bent = count_bent_notes(events, &frequency);

    let presets: Vec<Tuning> = TUNING_PRESETS
        .iter()
        .filter_map(|preset| preset.tuning().ok())
        .filter(|tuning| tuning.len() == FREQUENCY_TUNING_SIZE)
        .collect();
    let comparison = find_optimal_tuning(events, &presets);

    if let Some(best) = &comparison {
        log::info!(
            "Frequency tuning {} ({} bent); best preset {} ({} bent)",
            frequency,
            frequency_bent,
            best.optimal,
            best.bent_notes
        );
    }

    let mut results = vec![TuningScore {
        tuning: frequency.clone(),
        bent_notes: frequency_bent,
    }];
    results.extend(comparison.map(|c| c.results).unwrap_or_default());
    results.sort_by_key(|score| score.bent_notes);

    Some(TuningAnalysis {
        description: format!("Frequency-based ({})", frequency),
        optimal: frequency,
        bent_notes: frequency_bent,
        results,
    })
}

/// Preset name when the tuning matches one, else its key
fn describe(tuning: &Tuning) -> String {
    TUNING_PRESETS
        .iter()
        .find(|preset| preset_matches(preset, tuning))
        .map(|preset| format!("{} ({})", preset.name, preset.key))
        .unwrap_or_else(|| tuning.key())
}

fn preset_matches(preset: &TuningPreset, tuning: &Tuning) -> bool {
    preset.tuning().map_or(false, |p| {
        p.len() == tuning.len()
            && p.pattern().iter().zip(tuning.pattern()).all(|(a, b)| a.is_enharmonic(b))
    })
}
