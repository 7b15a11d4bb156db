//! Utility modules for the tablature engine

pub mod pitch_utils;

pub use pitch_utils::*;
