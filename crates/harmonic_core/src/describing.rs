//! Describing-function estimation.
//!
//! The describing function of a nonlinearity `F` at amplitude `a` is the
//! complex first-harmonic gain of `F(a sin θ)`:
//!
//! ```text
//! F(a sin θ) = Σ_k M_k(a) sin(kθ + φ_k(a)),    N(a) = M_1(a) e^{jφ_1(a)} / a
//! ```
//!
//! Using the orthogonality of `sin θ` and `cos θ` over a full period,
//!
//! ```text
//! ∫ F(a sin θ) sin θ dθ = π M_1 cos φ_1,    ∫ F(a sin θ) cos θ dθ = π M_1 sin φ_1
//! ```
//!
//! so both components are projections of one sampled cycle. The sums are a
//! periodic rectangle rule: higher harmonics alias away only in the limit of
//! fine sampling, so `num_samples` trades accuracy for cost. Closed-form
//! describing functions, when a nonlinearity offers one, are exact.

use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::{DescribingFunctionError, Result};
use crate::traits::Nonlinearity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribingFunctionSettings {
    /// Samples per cycle for the numeric projection.
    pub num_samples: usize,
    /// Require `F(0) == 0` when amplitude zero is requested.
    pub zero_check: bool,
    /// Use a closed-form describing function when the nonlinearity has one.
    pub prefer_analytic: bool,
}

impl Default for DescribingFunctionSettings {
    fn default() -> Self {
        Self {
            num_samples: 100,
            zero_check: true,
            prefer_analytic: true,
        }
    }
}

/// Describing function at a single amplitude.
pub fn describing_function<N: Nonlinearity + ?Sized>(
    nonlinearity: &mut N,
    amplitude: f64,
    settings: &DescribingFunctionSettings,
) -> Result<Complex<f64>> {
    let values = describing_function_many(nonlinearity, &[amplitude], settings)?;
    Ok(values[0])
}

/// Describing function at each amplitude, in the order given.
///
/// Amplitude zero yields `1` by convention. Undefined values (for example a
/// relay driven below its switching level) come back as NaN.
pub fn describing_function_many<N: Nonlinearity + ?Sized>(
    nonlinearity: &mut N,
    amplitudes: &[f64],
    settings: &DescribingFunctionSettings,
) -> Result<Vec<Complex<f64>>> {
    if amplitudes.is_empty() {
        return Err(DescribingFunctionError::EmptyAmplitudes);
    }
    if settings.num_samples < 2 {
        return Err(DescribingFunctionError::TooFewSamples(settings.num_samples));
    }
    for &a in amplitudes {
        if a.is_nan() || a.is_infinite() {
            return Err(DescribingFunctionError::NonFiniteAmplitude(a));
        }
        if a < 0.0 {
            return Err(DescribingFunctionError::NegativeAmplitude(a));
        }
    }

    let unity = Complex::new(1.0, 0.0);
    if settings.zero_check && amplitudes.iter().any(|&a| a == 0.0) {
        let at_zero = nonlinearity.evaluate(0.0);
        if at_zero != 0.0 {
            return Err(DescribingFunctionError::NonzeroAtZero(at_zero));
        }
    }

    if settings.prefer_analytic {
        if let Some(analytic) = nonlinearity.analytic() {
            return Ok(amplitudes
                .iter()
                .map(|&a| {
                    if a == 0.0 {
                        unity
                    } else {
                        analytic.describing_function(a)
                    }
                })
                .collect());
        }
    }

    let mut projector = HarmonicProjector::new(settings.num_samples);

    // A cold-started stateful nonlinearity biases the first cycle; run one
    // cycle at the smallest amplitude to settle it.
    let smallest = amplitudes.iter().copied().fold(f64::INFINITY, f64::min);
    projector.drive(nonlinearity, smallest);

    let mut values = Vec::with_capacity(amplitudes.len());
    for &a in amplitudes {
        if a == 0.0 {
            values.push(unity);
        } else {
            values.push(projector.first_harmonic(nonlinearity, a));
        }
    }
    Ok(values)
}

/// Samples one cycle of `a sin θ` at `θ_k = 2πk/N` and extracts the first
/// harmonic of the nonlinearity's response.
struct HarmonicProjector {
    sin_theta: Vec<f64>,
    input: Vec<f64>,
    output: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    fft: Arc<dyn Fft<f64>>,
}

impl HarmonicProjector {
    fn new(num_samples: usize) -> Self {
        let dtheta = 2.0 * PI / num_samples as f64;
        let sin_theta = (0..num_samples)
            .map(|k| (k as f64 * dtheta).sin())
            .collect();
        let mut planner = FftPlanner::new();
        Self {
            sin_theta,
            input: vec![0.0; num_samples],
            output: vec![0.0; num_samples],
            spectrum: vec![Complex::new(0.0, 0.0); num_samples],
            fft: planner.plan_fft_forward(num_samples),
        }
    }

    /// Feeds one cycle in increasing angle order; stateful models depend on it.
    fn drive<N: Nonlinearity + ?Sized>(&mut self, nonlinearity: &mut N, amplitude: f64) {
        for (x, s) in self.input.iter_mut().zip(&self.sin_theta) {
            *x = amplitude * s;
        }
        nonlinearity.evaluate_slice(&self.input, &mut self.output);
    }

    fn first_harmonic<N: Nonlinearity + ?Sized>(
        &mut self,
        nonlinearity: &mut N,
        amplitude: f64,
    ) -> Complex<f64> {
        self.drive(nonlinearity, amplitude);
        for (bin, y) in self.spectrum.iter_mut().zip(&self.output) {
            *bin = Complex::new(*y, 0.0);
        }
        self.fft.process(&mut self.spectrum);

        // X_1 = Σ y cos θ - j Σ y sin θ
        let first = self.spectrum[1];
        let n = self.output.len() as f64;
        let scale = (2.0 * PI / n) / (PI * amplitude);
        Complex::new(-first.im * scale, first.re * scale)
    }
}
