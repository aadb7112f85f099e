use anyhow::{bail, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

// Standard Nelder-Mead coefficients.
const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Offset used for initial simplex coordinates that start at exactly zero.
const ZERO_COORDINATE_STEP: f64 = 0.00025;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimizerSettings {
    pub max_iterations: usize,
    /// Converged once every vertex lies within this distance (per coordinate)
    /// of the best one...
    pub x_tolerance: f64,
    /// ...and every vertex value lies within this of the best value.
    pub f_tolerance: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for MinimizerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            x_tolerance: 1e-9,
            f_tolerance: 1e-14,
            initial_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimizeResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

/// Unconstrained minimization with the Nelder-Mead simplex method.
///
/// NaN cost values are treated as `+inf`, so the cost may simply return NaN
/// outside its domain. Fails when the iteration budget runs out.
pub fn minimize<F>(mut cost: F, x0: &[f64], settings: MinimizerSettings) -> Result<MinimizeResult>
where
    F: FnMut(&[f64]) -> f64,
{
    if x0.is_empty() {
        bail!("Initial guess must have positive dimension.");
    }
    if x0.iter().any(|v| !v.is_finite()) {
        bail!("Initial guess must be finite.");
    }
    if settings.max_iterations == 0 {
        bail!("max_iterations must be greater than zero.");
    }
    if settings.x_tolerance <= 0.0 || settings.f_tolerance <= 0.0 {
        bail!("Tolerances must be positive.");
    }
    if settings.initial_step <= 0.0 {
        bail!("initial_step must be positive.");
    }

    let mut eval = |x: &DVector<f64>| {
        let value = cost(x.as_slice());
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let dim = x0.len();
    let start = DVector::from_column_slice(x0);
    let mut simplex = Vec::with_capacity(dim + 1);
    simplex.push(start.clone());
    for k in 0..dim {
        let mut vertex = start.clone();
        vertex[k] = if vertex[k] != 0.0 {
            vertex[k] * (1.0 + settings.initial_step)
        } else {
            ZERO_COORDINATE_STEP
        };
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(&mut eval).collect();

    let mut iterations = 0usize;
    loop {
        sort_simplex(&mut simplex, &mut values);

        if has_converged(&simplex, &values, &settings) {
            return Ok(MinimizeResult {
                x: simplex[0].iter().copied().collect(),
                value: values[0],
                iterations,
            });
        }

        if iterations >= settings.max_iterations {
            bail!(
                "Nelder-Mead failed to converge in {} iterations (best value = {}).",
                settings.max_iterations,
                values[0]
            );
        }
        iterations += 1;

        let worst = dim;
        let centroid = simplex[..dim]
            .iter()
            .fold(DVector::zeros(dim), |acc, v| acc + v)
            / dim as f64;

        let reflected =
            centroid.scale(1.0 + REFLECT) - simplex[worst].scale(REFLECT);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = centroid.scale(1.0 + REFLECT * EXPAND)
                - simplex[worst].scale(REFLECT * EXPAND);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[worst - 1] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        let shrink = if f_reflected < values[worst] {
            let outside = centroid.scale(1.0 + CONTRACT * REFLECT)
                - simplex[worst].scale(CONTRACT * REFLECT);
            let f_outside = eval(&outside);
            if f_outside <= f_reflected {
                simplex[worst] = outside;
                values[worst] = f_outside;
                false
            } else {
                true
            }
        } else {
            let inside = centroid.scale(1.0 - CONTRACT) + simplex[worst].scale(CONTRACT);
            let f_inside = eval(&inside);
            if f_inside < values[worst] {
                simplex[worst] = inside;
                values[worst] = f_inside;
                false
            } else {
                true
            }
        };

        if shrink {
            let best = simplex[0].clone();
            for j in 1..=dim {
                simplex[j] = &best + (&simplex[j] - &best).scale(SHRINK);
                values[j] = eval(&simplex[j]);
            }
        }
    }
}

fn sort_simplex(simplex: &mut Vec<DVector<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

fn has_converged(simplex: &[DVector<f64>], values: &[f64], settings: &MinimizerSettings) -> bool {
    let best = &simplex[0];
    let x_spread = simplex[1..]
        .iter()
        .map(|v| (v - best).amax())
        .fold(0.0, f64::max);
    let f_spread = values[1..]
        .iter()
        .map(|f| (f - values[0]).abs())
        .fold(0.0, f64::max);
    x_spread <= settings.x_tolerance && f_spread <= settings.f_tolerance
}

#[cfg(test)]
mod tests {
    use super::{minimize, MinimizerSettings};

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn minimizes_shifted_quadratic() {
        let result = minimize(
            |x| (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2),
            &[0.0, 0.0],
            MinimizerSettings::default(),
        )
        .expect("quadratic should converge");
        assert!((result.x[0] - 3.0).abs() < 1e-6);
        assert!((result.x[1] + 1.0).abs() < 1e-6);
        assert!(result.value < 1e-12);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let settings = MinimizerSettings {
            max_iterations: 5000,
            ..MinimizerSettings::default()
        };
        let result = minimize(
            |x| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2),
            &[-1.2, 1.0],
            settings,
        )
        .expect("rosenbrock should converge");
        assert!((result.x[0] - 1.0).abs() < 1e-5);
        assert!((result.x[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn nan_cost_is_treated_as_infinite() {
        let result = minimize(
            |x| {
                if x[0] < 0.5 {
                    f64::NAN
                } else {
                    (x[0] - 2.0).powi(2)
                }
            },
            &[1.0],
            MinimizerSettings::default(),
        )
        .expect("restricted quadratic should converge");
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn reports_exhausted_budget() {
        let settings = MinimizerSettings {
            max_iterations: 1,
            ..MinimizerSettings::default()
        };
        assert_err_contains(
            minimize(|x| x[0] * x[0], &[5.0], settings),
            "failed to converge",
        );
    }

    #[test]
    fn rejects_invalid_inputs() {
        let settings = MinimizerSettings::default();
        assert_err_contains(minimize(|_| 0.0, &[], settings), "positive dimension");
        assert_err_contains(minimize(|_| 0.0, &[f64::NAN], settings), "finite");
        assert_err_contains(
            minimize(
                |_| 0.0,
                &[1.0],
                MinimizerSettings {
                    max_iterations: 0,
                    ..settings
                },
            ),
            "max_iterations",
        );
    }
}
