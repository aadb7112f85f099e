//! Non-fatal conditions reported alongside results.
//!
//! Each diagnostic is also logged as a `tracing` warning when it is recorded,
//! but callers should inspect the returned list rather than rely on logs.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Saturation bounds were not symmetric about zero; the bias is ignored.
    AsymmetricSaturation { lower: f64, upper: f64 },
    /// Refinement of a coarse intersection failed; the coarse estimate stands.
    RefinementFailed {
        amplitude: f64,
        frequency: f64,
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AsymmetricSaturation { lower, upper } => write!(
                f,
                "asymmetric saturation [{lower}, {upper}]; ignoring non-zero bias term"
            ),
            Diagnostic::RefinementFailed {
                amplitude,
                frequency,
                reason,
            } => write!(
                f,
                "not able to refine result at a = {amplitude}, omega = {frequency} ({reason}); returning estimate"
            ),
        }
    }
}

/// Appends `diagnostic` to `sink` and emits it as a warning event.
pub fn record(sink: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!(target: "harmonic_core", "{diagnostic}");
    sink.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::{record, Diagnostic};

    #[test]
    fn record_appends_in_order() {
        let mut sink = Vec::new();
        record(
            &mut sink,
            Diagnostic::AsymmetricSaturation {
                lower: -1.0,
                upper: 2.0,
            },
        );
        record(
            &mut sink,
            Diagnostic::RefinementFailed {
                amplitude: 1.0,
                frequency: 2.0,
                reason: "budget".to_string(),
            },
        );
        assert_eq!(sink.len(), 2);
        assert!(matches!(sink[0], Diagnostic::AsymmetricSaturation { .. }));
        assert!(format!("{}", sink[1]).contains("returning estimate"));
    }
}
