//! Limit-cycle prediction by harmonic balance.
//!
//! A loop made of a plant `H` and a static nonlinearity `F` in negative
//! feedback sustains an oscillation of amplitude `a` and frequency `ω` when
//! `H(jω) N(a) = -1`. Graphically that is a crossing between the Nyquist
//! curve of `H` and the negative-reciprocal locus `-1/N(a)`. Each crossing
//! found on the sampled curves gives a coarse `(a, ω)` that is then refined by
//! minimizing `|1 + H(jω) N(a)|^2`.

use anyhow::{Context, Result};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::describing::{describing_function, describing_function_many, DescribingFunctionSettings};
use crate::diagnostics::{record, Diagnostic};
use crate::intersection::{curve_intersections, interpolate, PARALLEL_TOLERANCE};
use crate::optimize::{minimize, MinimizerSettings};
use crate::plant::NyquistCurve;
use crate::traits::{DrawingSurface, FrequencyResponse, Nonlinearity};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    /// Polish each coarse crossing with the minimizer.
    pub refine: bool,
    /// Produce `"<a> @ <ω>"` labels for each limit cycle.
    pub labels: bool,
    pub parallel_tolerance: f64,
    pub estimator: DescribingFunctionSettings,
    pub minimizer: MinimizerSettings,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            refine: true,
            labels: true,
            parallel_tolerance: PARALLEL_TOLERANCE,
            estimator: DescribingFunctionSettings::default(),
            minimizer: MinimizerSettings::default(),
        }
    }
}

/// A predicted limit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitCycle {
    pub amplitude: f64,
    pub frequency: f64,
    pub coarse_amplitude: f64,
    pub coarse_frequency: f64,
    /// False when refinement was disabled or failed.
    pub refined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionLabel {
    pub position: Complex<f64>,
    pub text: String,
}

/// Everything needed to draw and interpret a describing-function plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribingFunctionAnalysis {
    pub plant: NyquistCurve,
    pub amplitudes: Vec<f64>,
    pub describing_function: Vec<Complex<f64>>,
    /// `-1/N(a)` for each amplitude.
    pub negative_reciprocal: Vec<Complex<f64>>,
    pub limit_cycles: Vec<LimitCycle>,
    pub labels: Vec<IntersectionLabel>,
    /// Nonlinearity construction warnings followed by refinement failures.
    pub diagnostics: Vec<Diagnostic>,
}

impl DescribingFunctionAnalysis {
    /// `(amplitude, frequency)` pairs, one per limit cycle.
    pub fn intersections(&self) -> Vec<(f64, f64)> {
        self.limit_cycles
            .iter()
            .map(|cycle| (cycle.amplitude, cycle.frequency))
            .collect()
    }
}

pub fn describing_function_analysis<P, N>(
    plant: &P,
    nonlinearity: &mut N,
    amplitudes: &[f64],
    frequencies: Option<&[f64]>,
    settings: &LocatorSettings,
) -> Result<DescribingFunctionAnalysis>
where
    P: FrequencyResponse + ?Sized,
    N: Nonlinearity + ?Sized,
{
    let curve = plant
        .frequency_response(frequencies)
        .context("Failed to sample the plant frequency response.")?;
    let plant_points = curve.points();

    let df = describing_function_many(nonlinearity, amplitudes, &settings.estimator)
        .context("Failed to evaluate the describing function.")?;
    let negative_reciprocal: Vec<Complex<f64>> = df.iter().map(|n| -n.inv()).collect();

    let crossings = curve_intersections(
        &negative_reciprocal,
        &plant_points,
        settings.parallel_tolerance,
    );
    tracing::debug!(
        plant_samples = plant_points.len(),
        amplitudes = amplitudes.len(),
        crossings = crossings.len(),
        "describing function curves intersected"
    );

    // Construction warnings come first; they were logged when recorded.
    let mut diagnostics = nonlinearity.diagnostics().to_vec();
    let mut limit_cycles = Vec::with_capacity(crossings.len());
    let mut labels = Vec::new();

    for crossing in crossings {
        let coarse_amplitude = interpolate(amplitudes, crossing.first, crossing.s1);
        let coarse_frequency = interpolate(&curve.omega, crossing.second, crossing.s2);

        let mut cycle = LimitCycle {
            amplitude: coarse_amplitude,
            frequency: coarse_frequency,
            coarse_amplitude,
            coarse_frequency,
            refined: false,
        };

        if settings.refine {
            let outcome = refine_crossing(
                plant,
                nonlinearity,
                coarse_amplitude,
                coarse_frequency,
                settings,
            );
            match outcome {
                Ok((amplitude, frequency)) => {
                    cycle.amplitude = amplitude;
                    cycle.frequency = frequency;
                    cycle.refined = true;
                }
                Err(err) => record(
                    &mut diagnostics,
                    Diagnostic::RefinementFailed {
                        amplitude: coarse_amplitude,
                        frequency: coarse_frequency,
                        reason: err.to_string(),
                    },
                ),
            }
        }

        if settings.labels {
            labels.push(IntersectionLabel {
                position: plant.evaluate_at(Complex::new(0.0, cycle.frequency)),
                text: format!(
                    "{} @ {}",
                    format_general(cycle.amplitude, 2),
                    format_general(cycle.frequency, 2)
                ),
            });
        }
        limit_cycles.push(cycle);
    }

    Ok(DescribingFunctionAnalysis {
        plant: curve,
        amplitudes: amplitudes.to_vec(),
        describing_function: df,
        negative_reciprocal,
        limit_cycles,
        labels,
        diagnostics,
    })
}

/// Convenience form returning only the `(amplitude, frequency)` pairs.
pub fn limit_cycles<P, N>(
    plant: &P,
    nonlinearity: &mut N,
    amplitudes: &[f64],
    frequencies: Option<&[f64]>,
    settings: &LocatorSettings,
) -> Result<Vec<(f64, f64)>>
where
    P: FrequencyResponse + ?Sized,
    N: Nonlinearity + ?Sized,
{
    let analysis =
        describing_function_analysis(plant, nonlinearity, amplitudes, frequencies, settings)?;
    Ok(analysis.intersections())
}

/// Draws both loci and the limit-cycle labels on `surface`.
pub fn render(analysis: &DescribingFunctionAnalysis, surface: &mut dyn DrawingSurface) {
    surface.draw_curve(&analysis.plant.points());
    surface.draw_curve(&analysis.negative_reciprocal);
    for label in &analysis.labels {
        surface.annotate(label.position, &label.text);
    }
}

fn refine_crossing<P, N>(
    plant: &P,
    nonlinearity: &mut N,
    amplitude: f64,
    frequency: f64,
    settings: &LocatorSettings,
) -> Result<(f64, f64)>
where
    P: FrequencyResponse + ?Sized,
    N: Nonlinearity + ?Sized,
{
    let cost = |x: &[f64]| {
        match describing_function(&mut *nonlinearity, x[0], &settings.estimator) {
            Ok(n) => {
                let h = plant.evaluate_at(Complex::new(0.0, x[1]));
                (Complex::new(1.0, 0.0) + h * n).norm_sqr()
            }
            // Outside the estimator's domain (a < 0).
            Err(_) => f64::INFINITY,
        }
    };
    let result = minimize(cost, &[amplitude, frequency], settings.minimizer)?;
    Ok((result.x[0], result.x[1]))
}

/// Formats like C's `%.<precision>g`.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
