use std::f64::consts::PI;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::traits::{AnalyticDescribingFunction, Nonlinearity, StatefulNonlinearity};

/// Branch the relay output currently sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayBranch {
    Lower,
    Upper,
}

/// Relay with hysteresis: output `±b`, switching up above `c` and down below
/// `-c`. Inside `[-c, c]` the previous output is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayHysteresis {
    b: f64,
    c: f64,
    branch: RelayBranch,
}

impl RelayHysteresis {
    /// Starts on the lower branch.
    pub fn new(b: f64, c: f64) -> Self {
        Self {
            b,
            c,
            branch: RelayBranch::Lower,
        }
    }

    pub fn output_level(&self) -> f64 {
        self.b
    }

    pub fn switching_level(&self) -> f64 {
        self.c
    }
}

impl StatefulNonlinearity for RelayHysteresis {
    type State = RelayBranch;

    fn state(&self) -> RelayBranch {
        self.branch
    }

    fn transition(&self, state: RelayBranch, input: f64) -> (RelayBranch, f64) {
        let next = if input > self.c {
            RelayBranch::Upper
        } else if input < -self.c {
            RelayBranch::Lower
        } else {
            state
        };
        let output = match next {
            RelayBranch::Upper => self.b,
            RelayBranch::Lower => -self.b,
        };
        (next, output)
    }
}

impl Nonlinearity for RelayHysteresis {
    fn evaluate(&mut self, x: f64) -> f64 {
        let (next, y) = self.transition(self.branch, x);
        self.branch = next;
        y
    }

    fn analytic(&self) -> Option<&dyn AnalyticDescribingFunction> {
        Some(self)
    }
}

impl AnalyticDescribingFunction for RelayHysteresis {
    /// Undefined (NaN) below the switching level, where the relay never
    /// switches.
    fn describing_function(&self, a: f64) -> Complex<f64> {
        if a < self.c {
            return Complex::new(f64::NAN, f64::NAN);
        }
        let ratio = self.c / a;
        let re = 4.0 * self.b * (1.0 - ratio * ratio).sqrt() / (a * PI);
        let im = -4.0 * self.b * self.c / (PI * a * a);
        Complex::new(re, im)
    }
}
