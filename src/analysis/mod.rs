//! Song analysis
//!
//! Works on the note sequence alone, independent of any rendered scene.

pub mod tuning_optimizer;

pub use tuning_optimizer::{
    analyze_all_tunings, count_bent_notes, default_candidates, find_optimal_tuning, frequency_based_tuning,
    TuningAnalysis, TuningScore,
};
