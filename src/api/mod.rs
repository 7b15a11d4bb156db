//! Tablature WASM API
//!
//! This module provides the JavaScript-facing API for the tablature engine.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, validation and error conversion
//! - `core`: Stateless functions (strings, pitch resolution, scenes, tuning analysis)
//! - `workspace`: The `TablatureWorkspace` class holding views, zoom and glissando state

pub mod helpers;
pub mod core;
pub mod workspace;

pub use core::*;
pub use workspace::TablatureWorkspace;
