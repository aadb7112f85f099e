//! Linear plant collaborators and Nyquist sampling.

use anyhow::{bail, Result};
use nalgebra::DMatrix;
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::traits::FrequencyResponse;

pub const DEFAULT_SWEEP_POINTS: usize = 1000;

/// Parallel arrays describing `H(jω)` over an ascending sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NyquistCurve {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
    pub omega: Vec<f64>,
}

impl NyquistCurve {
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    pub fn points(&self) -> Vec<Complex<f64>> {
        self.real
            .iter()
            .zip(&self.imag)
            .map(|(&re, &im)| Complex::new(re, im))
            .collect()
    }
}

/// `10^start .. 10^stop`, `points` samples, logarithmically spaced.
pub fn logspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![10f64.powf(start)],
        _ => {
            let step = (stop - start) / (points - 1) as f64;
            (0..points)
                .map(|i| 10f64.powf(start + step * i as f64))
                .collect()
        }
    }
}

/// Samples `plant` at `jω` for every `ω` in `omega`.
pub fn sample_response<P: FrequencyResponse + ?Sized>(
    plant: &P,
    omega: Vec<f64>,
) -> Result<NyquistCurve> {
    if omega.is_empty() {
        bail!("Frequency sweep must contain at least one frequency.");
    }
    if omega.iter().any(|w| !w.is_finite()) {
        bail!("Frequency sweep must be finite.");
    }
    if omega.windows(2).any(|pair| pair[1] <= pair[0]) {
        bail!("Frequency sweep must be strictly ascending.");
    }

    let mut real = Vec::with_capacity(omega.len());
    let mut imag = Vec::with_capacity(omega.len());
    for &w in &omega {
        let value = plant.evaluate_at(Complex::new(0.0, w));
        real.push(value.re);
        imag.push(value.im);
    }
    Ok(NyquistCurve { real, imag, omega })
}

/// Rational transfer function `num(s) / den(s)`, coefficients highest power
/// first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl TransferFunction {
    pub fn new(num: Vec<f64>, den: Vec<f64>) -> Result<Self> {
        let num = strip_leading_zeros(num);
        let den = strip_leading_zeros(den);
        if den.is_empty() {
            bail!("Denominator must have a non-zero coefficient.");
        }
        if num.iter().chain(&den).any(|c| !c.is_finite()) {
            bail!("Transfer function coefficients must be finite.");
        }
        Ok(Self { num, den })
    }

    pub fn numerator(&self) -> &[f64] {
        &self.num
    }

    pub fn denominator(&self) -> &[f64] {
        &self.den
    }

    pub fn zeros(&self) -> Vec<Complex<f64>> {
        polynomial_roots(&self.num)
    }

    pub fn poles(&self) -> Vec<Complex<f64>> {
        polynomial_roots(&self.den)
    }
}

impl FrequencyResponse for TransferFunction {
    fn evaluate_at(&self, s: Complex<f64>) -> Complex<f64> {
        horner(&self.num, s) / horner(&self.den, s)
    }

    /// Spans the decades of the pole/zero magnitudes, one decade wider on
    /// each side.
    fn default_frequencies(&self) -> Vec<f64> {
        let features: Vec<f64> = self
            .poles()
            .into_iter()
            .chain(self.zeros())
            .map(|root| root.norm())
            .filter(|magnitude| magnitude.is_finite() && *magnitude > 1e-12)
            .collect();
        if features.is_empty() {
            return logspace(-1.0, 1.0, DEFAULT_SWEEP_POINTS);
        }
        let lo = features.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = features.iter().copied().fold(0.0, f64::max);
        logspace(
            lo.log10().floor() - 1.0,
            hi.log10().ceil() + 1.0,
            DEFAULT_SWEEP_POINTS,
        )
    }
}

/// Any closure `s -> H(s)` as a plant.
pub struct ResponseFn<F> {
    func: F,
    frequencies: Option<Vec<f64>>,
}

impl<F: Fn(Complex<f64>) -> Complex<f64>> ResponseFn<F> {
    pub fn new(func: F) -> Self {
        Self {
            func,
            frequencies: None,
        }
    }

    /// Overrides the default sweep.
    pub fn with_frequencies(mut self, frequencies: Vec<f64>) -> Self {
        self.frequencies = Some(frequencies);
        self
    }
}

impl<F: Fn(Complex<f64>) -> Complex<f64>> FrequencyResponse for ResponseFn<F> {
    fn evaluate_at(&self, s: Complex<f64>) -> Complex<f64> {
        (self.func)(s)
    }

    fn default_frequencies(&self) -> Vec<f64> {
        match &self.frequencies {
            Some(values) => values.clone(),
            None => logspace(-1.0, 1.0, DEFAULT_SWEEP_POINTS),
        }
    }
}

fn strip_leading_zeros(coeffs: Vec<f64>) -> Vec<f64> {
    let first = coeffs.iter().position(|c| *c != 0.0).unwrap_or(coeffs.len());
    coeffs[first..].to_vec()
}

fn horner(coeffs: &[f64], s: Complex<f64>) -> Complex<f64> {
    coeffs
        .iter()
        .fold(Complex::zero(), |acc, &c| acc * s + Complex::new(c, 0.0))
}

/// Roots from the eigenvalues of the companion matrix.
fn polynomial_roots(coeffs: &[f64]) -> Vec<Complex<f64>> {
    if coeffs.len() < 2 {
        return Vec::new();
    }
    let degree = coeffs.len() - 1;
    let lead = coeffs[0];
    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for j in 0..degree {
        companion[(0, j)] = -coeffs[j + 1] / lead;
    }
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    companion.complex_eigenvalues().iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::{logspace, polynomial_roots, ResponseFn, TransferFunction};
    use crate::traits::FrequencyResponse;
    use num_complex::Complex;

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn logspace_hits_endpoints() {
        let values = logspace(-1.0, 2.0, 4);
        let expected = [0.1, 1.0, 10.0, 100.0];
        for (value, want) in values.iter().zip(expected) {
            assert!((value - want).abs() < 1e-12 * want);
        }
        assert!(logspace(0.0, 1.0, 0).is_empty());
        assert_eq!(logspace(0.0, 1.0, 1), vec![1.0]);
    }

    #[test]
    fn transfer_function_evaluates_first_order_lag() {
        let plant = TransferFunction::new(vec![1.0], vec![1.0, 1.0]).expect("valid plant");
        let value = plant.evaluate_at(Complex::new(0.0, 1.0));
        assert!((value.re - 0.5).abs() < 1e-12);
        assert!((value.im + 0.5).abs() < 1e-12);
    }

    #[test]
    fn transfer_function_rejects_zero_denominator() {
        assert_err_contains(
            TransferFunction::new(vec![1.0], vec![0.0, 0.0]),
            "Denominator",
        );
    }

    #[test]
    fn leading_zeros_are_stripped() {
        let plant = TransferFunction::new(vec![0.0, 2.0], vec![0.0, 1.0, 3.0]).expect("plant");
        assert_eq!(plant.numerator(), &[2.0]);
        assert_eq!(plant.denominator(), &[1.0, 3.0]);
    }

    #[test]
    fn polynomial_roots_of_quadratic() {
        // (s + 1)(s + 10)
        let mut roots = polynomial_roots(&[1.0, 11.0, 10.0]);
        roots.sort_by(|a, b| a.re.partial_cmp(&b.re).unwrap());
        assert!((roots[0].re + 10.0).abs() < 1e-9);
        assert!((roots[1].re + 1.0).abs() < 1e-9);
        assert!(polynomial_roots(&[3.0]).is_empty());
    }

    #[test]
    fn default_sweep_brackets_pole_magnitudes() {
        // (s + 2)(s + 5)
        let plant = TransferFunction::new(vec![1.0], vec![1.0, 7.0, 10.0]).expect("plant");
        let omega = plant.default_frequencies();
        assert!((omega[0] - 0.1).abs() < 1e-12);
        assert!((omega[omega.len() - 1] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn frequency_response_returns_parallel_arrays() {
        let plant = TransferFunction::new(vec![1.0], vec![1.0, 1.0]).expect("plant");
        let curve = plant
            .frequency_response(Some(&[0.5, 1.0, 2.0][..]))
            .expect("sweep should sample");
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.real.len(), 3);
        assert_eq!(curve.imag.len(), 3);
        assert_eq!(curve.omega, vec![0.5, 1.0, 2.0]);
        assert!((curve.points()[1] - Complex::new(0.5, -0.5)).norm() < 1e-12);
    }

    #[test]
    fn frequency_response_rejects_bad_sweeps() {
        let plant = ResponseFn::new(|s: Complex<f64>| s);
        assert_err_contains(plant.frequency_response(Some(&[][..])), "at least one");
        assert_err_contains(
            plant.frequency_response(Some(&[1.0, 1.0][..])),
            "strictly ascending",
        );
        assert_err_contains(
            plant.frequency_response(Some(&[1.0, f64::INFINITY][..])),
            "finite",
        );
    }

    #[test]
    fn response_fn_uses_configured_sweep() {
        let plant = ResponseFn::new(|s: Complex<f64>| s).with_frequencies(vec![1.0, 2.0]);
        let curve = plant.frequency_response(None).expect("sweep");
        assert_eq!(curve.omega, vec![1.0, 2.0]);
        assert_eq!(curve.imag, vec![1.0, 2.0]);
    }
}
