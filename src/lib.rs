//! Zither Tablature WASM Module
//!
//! Lays out dan tranh style tablature: strings placed by pitch, notes resolved
//! onto or between strings, bend indicators, chevron glissando connectors and
//! zoom. The output is a plain `Scene` that JavaScript renders as SVG.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod utils;
pub mod workspace;

// Re-export commonly used types
pub use config::{LayoutConfig, UnresolvedPolicy};
pub use error::{LayoutError, LayoutResult, LayoutWarning};
pub use layout::{scene_to_json, Scene, SceneReport, SurfaceHint, TablatureEngine};
pub use models::*;
pub use workspace::Workspace;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only when a logger is already installed
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("Tablature WASM module initialized");
}
