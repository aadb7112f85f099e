use num_complex::Complex;

use crate::diagnostics::Diagnostic;

/// A static nonlinearity `y = F(x)`, possibly carrying bounded internal memory.
///
/// Stateful implementations process samples strictly in the order they are
/// given: the output at step `n` depends on the state left by step `n - 1`.
pub trait Nonlinearity {
    /// Evaluates the nonlinearity at a single input sample, updating any
    /// internal state.
    fn evaluate(&mut self, x: f64) -> f64;

    /// Evaluates a sequence of samples in order.
    /// input: samples to feed, oldest first
    /// out: buffer receiving one output per input sample
    fn evaluate_slice(&mut self, input: &[f64], out: &mut [f64]) {
        for (x, y) in input.iter().zip(out.iter_mut()) {
            *y = self.evaluate(*x);
        }
    }

    /// Capability lookup for a closed-form describing function.
    /// Numeric-only nonlinearities keep the default `None`.
    fn analytic(&self) -> Option<&dyn AnalyticDescribingFunction> {
        None
    }

    /// Degradations noticed at construction, such as asymmetric bounds.
    fn diagnostics(&self) -> &[Diagnostic] {
        &[]
    }
}

/// Closed-form describing function `N(a)`.
pub trait AnalyticDescribingFunction {
    /// Returns the describing function at `amplitude > 0`. A NaN result marks
    /// an amplitude where the describing function is undefined.
    fn describing_function(&self, amplitude: f64) -> Complex<f64>;
}

/// A nonlinearity whose memory is an explicit state machine.
pub trait StatefulNonlinearity {
    type State: Copy;

    /// Current state.
    fn state(&self) -> Self::State;

    /// Pure transition: given the current state and input sample, returns the
    /// next state and the output sample.
    fn transition(&self, state: Self::State, input: f64) -> (Self::State, f64);
}

/// Linear plant collaborator: anything that can report `H(s)`.
pub trait FrequencyResponse {
    /// Evaluates the response at a complex frequency `s` (usually `jω`).
    fn evaluate_at(&self, s: Complex<f64>) -> Complex<f64>;

    /// Frequency sweep used when the caller does not supply one.
    fn default_frequencies(&self) -> Vec<f64> {
        crate::plant::logspace(-1.0, 1.0, crate::plant::DEFAULT_SWEEP_POINTS)
    }

    /// Samples `H(jω)` over an ascending sweep.
    fn frequency_response(
        &self,
        frequencies: Option<&[f64]>,
    ) -> anyhow::Result<crate::plant::NyquistCurve> {
        let omega = match frequencies {
            Some(values) => values.to_vec(),
            None => self.default_frequencies(),
        };
        crate::plant::sample_response(self, omega)
    }
}

/// Abstract 2D drawing surface. The core never renders on its own; callers
/// inject a surface when they want the analysis drawn.
pub trait DrawingSurface {
    /// Draws a polyline through `points` in the complex plane.
    fn draw_curve(&mut self, points: &[Complex<f64>]);

    /// Writes `text` anchored at `position`.
    fn annotate(&mut self, position: Complex<f64>, text: &str);
}
