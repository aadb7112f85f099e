//! Built-in nonlinearities exposed to JavaScript.

use harmonic_core::describing::{describing_function_many, DescribingFunctionSettings};
use harmonic_core::diagnostics::Diagnostic;
use harmonic_core::nonlinearity::{Backlash, RelayHysteresis, Saturation};
use harmonic_core::traits::{AnalyticDescribingFunction, Nonlinearity};
use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

use crate::shared::{interleave, settings_from_js, to_js};

pub(crate) enum BuiltinNonlinearity {
    Saturation(Saturation),
    Relay(RelayHysteresis),
    Backlash(Backlash),
}

impl BuiltinNonlinearity {
    pub(crate) fn from_kind(kind: &str, params: &[f64]) -> Result<Self, String> {
        match (kind, params) {
            ("saturation", [ub]) => Ok(Self::Saturation(Saturation::symmetric(*ub))),
            ("saturation", [lb, ub]) => Ok(Self::Saturation(Saturation::new(*lb, *ub))),
            ("relay", [b, c]) => Ok(Self::Relay(RelayHysteresis::new(*b, *c))),
            ("backlash", [b]) => Ok(Self::Backlash(Backlash::new(*b))),
            ("saturation", _) => Err("saturation expects [ub] or [lb, ub]".to_string()),
            ("relay", _) => Err("relay expects [b, c]".to_string()),
            ("backlash", _) => Err("backlash expects [b]".to_string()),
            _ => Err(format!("Unknown nonlinearity: {kind}")),
        }
    }
}

impl Nonlinearity for BuiltinNonlinearity {
    fn evaluate(&mut self, x: f64) -> f64 {
        match self {
            Self::Saturation(s) => s.evaluate(x),
            Self::Relay(r) => r.evaluate(x),
            Self::Backlash(b) => b.evaluate(x),
        }
    }

    fn analytic(&self) -> Option<&dyn AnalyticDescribingFunction> {
        match self {
            Self::Saturation(s) => s.analytic(),
            Self::Relay(r) => r.analytic(),
            Self::Backlash(b) => b.analytic(),
        }
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Saturation(s) => s.diagnostics(),
            Self::Relay(r) => r.diagnostics(),
            Self::Backlash(b) => b.diagnostics(),
        }
    }
}

#[wasm_bindgen]
pub struct WasmNonlinearity {
    pub(crate) inner: BuiltinNonlinearity,
}

#[wasm_bindgen]
impl WasmNonlinearity {
    /// `kind` is one of `"saturation"`, `"relay"` or `"backlash"`.
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str, params: Vec<f64>) -> Result<WasmNonlinearity, JsValue> {
        console_error_panic_hook::set_once();
        let inner =
            BuiltinNonlinearity::from_kind(kind, &params).map_err(|e| JsValue::from_str(&e))?;
        Ok(WasmNonlinearity { inner })
    }

    pub fn evaluate(&mut self, x: f64) -> f64 {
        self.inner.evaluate(x)
    }

    /// Evaluates samples in order; stateful kinds carry state across them.
    pub fn evaluate_many(&mut self, input: Vec<f64>) -> Float64Array {
        let mut out = vec![0.0; input.len()];
        self.inner.evaluate_slice(&input, &mut out);
        Float64Array::from(out.as_slice())
    }

    /// Interleaved `[re, im, ...]` describing function values.
    pub fn describing_function(
        &mut self,
        amplitudes: Vec<f64>,
        settings_val: JsValue,
    ) -> Result<Float64Array, JsValue> {
        let settings: DescribingFunctionSettings =
            settings_from_js(settings_val, "describing function")?;
        let values = describing_function_many(&mut self.inner, &amplitudes, &settings)
            .map_err(|e| {
                JsValue::from_str(&format!("Describing function computation failed: {}", e))
            })?;
        Ok(Float64Array::from(interleave(&values).as_slice()))
    }

    pub fn diagnostics(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.diagnostics())
    }
}
