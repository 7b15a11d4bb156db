//! Shared helpers for WASM API operations
//!
//! This module contains common patterns for serialization, deserialization,
//! error conversion and validation across all API operations.

use crate::error::LayoutError;
use crate::models::{Tuning, TuningSpec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Deserialize an optional value; `undefined` and `null` give the default
pub fn deserialize_or_default<T: DeserializeOwned + Default>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    deserialize(value, error_context)
}

/// Serialize a value to JavaScript with automatic error handling
///
/// Maps become plain objects so JavaScript can index them by key.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

// ============================================================================
// Error Conversion
// ============================================================================

/// Convert a layout error to a JsValue, logging it on the way out
pub fn layout_error(error: LayoutError) -> JsValue {
    let msg = error.to_string();
    log::error!("{}", msg);
    JsValue::from_str(&msg)
}

/// Convert a validation error to a JsValue
pub fn validation_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    log::error!("{}", msg);
    JsValue::from_str(&msg)
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Read a tuning given either as a key string or a list of pitch classes
pub fn tuning_from_js(value: JsValue) -> Result<Tuning, JsValue> {
    let spec: TuningSpec = deserialize(value, "Failed to deserialize tuning")?;
    spec.into_tuning().map_err(layout_error)
}

/// Validate a zoom percentage
pub fn validate_percent(percent: f64) -> Result<(), String> {
    if !percent.is_finite() {
        return Err(format!("Invalid zoom percentage: {}", percent));
    }
    Ok(())
}
