use std::f64::consts::PI;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{record, Diagnostic};
use crate::traits::{AnalyticDescribingFunction, Nonlinearity};

/// Saturation `y = max(lb, min(x, ub))`.
///
/// Stateless and odd when `lb == -ub`. Other bounds are accepted but flagged
/// with [`Diagnostic::AsymmetricSaturation`]: the describing function ignores
/// the bias such bounds introduce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Saturation {
    lb: f64,
    ub: f64,
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
}

impl Saturation {
    /// Symmetric saturation at `±|ub|`.
    pub fn symmetric(ub: f64) -> Self {
        Self {
            lb: -ub.abs(),
            ub: ub.abs(),
            diagnostics: Vec::new(),
        }
    }

    /// Saturation with explicit bounds. Asymmetric or sign-inconsistent bounds
    /// are reported through [`Nonlinearity::diagnostics`]; inverted bounds are
    /// swapped, anything else is kept as given.
    pub fn new(lb: f64, ub: f64) -> Self {
        let mut diagnostics = Vec::new();
        if lb > 0.0 || ub < 0.0 || lb + ub != 0.0 {
            record(
                &mut diagnostics,
                Diagnostic::AsymmetricSaturation {
                    lower: lb,
                    upper: ub,
                },
            );
        }
        Self {
            lb: lb.min(ub),
            ub: lb.max(ub),
            diagnostics,
        }
    }

    pub fn lower(&self) -> f64 {
        self.lb
    }

    pub fn upper(&self) -> f64 {
        self.ub
    }
}

impl Default for Saturation {
    fn default() -> Self {
        Self::symmetric(1.0)
    }
}

impl Nonlinearity for Saturation {
    fn evaluate(&mut self, x: f64) -> f64 {
        // f64::clamp panics on inverted bounds; saturate the same way numpy does.
        x.min(self.ub).max(self.lb)
    }

    fn analytic(&self) -> Option<&dyn AnalyticDescribingFunction> {
        Some(self)
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl AnalyticDescribingFunction for Saturation {
    fn describing_function(&self, amplitude: f64) -> Complex<f64> {
        if amplitude <= self.ub && -amplitude >= self.lb {
            return Complex::new(1.0, 0.0);
        }
        // A side that never saturates contributes a quarter period (asin(1)); a
        // bound on the wrong side of zero that is never reached gives asin(-1).
        let alpha = (self.ub / amplitude).clamp(-1.0, 1.0).asin();
        let beta = (-self.lb / amplitude).clamp(-1.0, 1.0).asin();
        let value = ((alpha + beta).sin() * (alpha - beta).cos() + (alpha + beta)) / PI;
        Complex::new(value, 0.0)
    }
}
