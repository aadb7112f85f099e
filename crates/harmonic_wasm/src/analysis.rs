//! Describing-function plot data for the front end.

use harmonic_core::analysis::{
    describing_function_analysis, DescribingFunctionAnalysis, LimitCycle, LocatorSettings,
};
use harmonic_core::diagnostics::Diagnostic;
use harmonic_core::plant::TransferFunction;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::nonlinearity::WasmNonlinearity;
use crate::shared::{js_error, settings_from_js, to_js};

/// Runs the full analysis for `num(s)/den(s)` in a loop with `nonlinearity`.
///
/// The result carries the Nyquist curve, the `-1/N(a)` locus, the limit
/// cycles and their labels; drawing them is left to the caller.
#[wasm_bindgen]
pub fn analyze_describing_function(
    num: Vec<f64>,
    den: Vec<f64>,
    nonlinearity: &mut WasmNonlinearity,
    amplitudes: Vec<f64>,
    frequencies: Option<Vec<f64>>,
    settings_val: JsValue,
) -> Result<JsValue, JsValue> {
    let settings: LocatorSettings = settings_from_js(settings_val, "locator")?;
    let plant = TransferFunction::new(num, den)
        .map_err(|e| js_error("Invalid transfer function", e))?;

    let analysis = describing_function_analysis(
        &plant,
        &mut nonlinearity.inner,
        &amplitudes,
        frequencies.as_deref(),
        &settings,
    )
    .map_err(|e| js_error("Describing function analysis failed", e))?;

    to_js(&AnalysisPayload::from(analysis))
}

#[derive(Serialize)]
pub(crate) struct CurvePayload {
    real: Vec<f64>,
    imag: Vec<f64>,
}

#[derive(Serialize)]
pub(crate) struct LabelPayload {
    x: f64,
    y: f64,
    text: String,
}

#[derive(Serialize)]
pub(crate) struct AnalysisPayload {
    plant: CurvePayload,
    omega: Vec<f64>,
    locus: CurvePayload,
    amplitudes: Vec<f64>,
    limit_cycles: Vec<LimitCycle>,
    labels: Vec<LabelPayload>,
    diagnostics: Vec<Diagnostic>,
}

impl From<DescribingFunctionAnalysis> for AnalysisPayload {
    fn from(analysis: DescribingFunctionAnalysis) -> Self {
        let locus = CurvePayload {
            real: analysis.negative_reciprocal.iter().map(|c| c.re).collect(),
            imag: analysis.negative_reciprocal.iter().map(|c| c.im).collect(),
        };
        let labels = analysis
            .labels
            .into_iter()
            .map(|label| LabelPayload {
                x: label.position.re,
                y: label.position.im,
                text: label.text,
            })
            .collect();
        Self {
            plant: CurvePayload {
                real: analysis.plant.real,
                imag: analysis.plant.imag,
            },
            omega: analysis.plant.omega,
            locus,
            amplitudes: analysis.amplitudes,
            limit_cycles: analysis.limit_cycles,
            labels,
            diagnostics: analysis.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisPayload;
    use crate::nonlinearity::BuiltinNonlinearity;
    use harmonic_core::analysis::{describing_function_analysis, LocatorSettings};
    use harmonic_core::plant::TransferFunction;

    #[test]
    fn payload_flattens_curves_and_labels() {
        let plant = TransferFunction::new(vec![12.0], vec![1.0, 3.0, 2.0, 0.0]).expect("plant");
        let mut sat = BuiltinNonlinearity::from_kind("saturation", &[1.0]).expect("saturation");
        let amplitudes: Vec<f64> = (1..=50).map(|k| k as f64 * 0.2).collect();
        let analysis = describing_function_analysis(
            &plant,
            &mut sat,
            &amplitudes,
            None,
            &LocatorSettings::default(),
        )
        .expect("analysis should run");
        let cycles = analysis.limit_cycles.len();

        let payload = AnalysisPayload::from(analysis);
        assert_eq!(payload.plant.real.len(), payload.omega.len());
        assert_eq!(payload.locus.real.len(), amplitudes.len());
        assert_eq!(payload.labels.len(), cycles);
        assert_eq!(cycles, 1);
        assert!((payload.labels[0].x + 2.0).abs() < 1e-3);
    }
}
