//! Shared helpers for the bindings.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::JsValue;

/// Parses a settings object, falling back to defaults when it is absent.
pub(crate) fn settings_from_js<T>(value: JsValue, what: &str) -> Result<T, JsValue>
where
    T: DeserializeOwned + Default,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {what} settings: {e}")))
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Renders an error with its full context chain for the JS side.
pub(crate) fn js_error(prefix: &str, err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{prefix}: {err:#}"))
}

/// Flattens complex values as `[re0, im0, re1, im1, ...]`.
pub(crate) fn interleave(values: &[num_complex::Complex<f64>]) -> Vec<f64> {
    values.iter().flat_map(|c| [c.re, c.im]).collect()
}
