pub mod analysis;
pub mod describing;
pub mod diagnostics;
pub mod error;
pub mod intersection;
pub mod nonlinearity;
pub mod optimize;
pub mod plant;
/// The `harmonic_core` crate predicts limit cycles in feedback loops made of a
/// linear plant and a static nonlinearity, using the describing-function
/// (harmonic balance) method.
///
/// Key components:
/// - **Traits**: `Nonlinearity` (evaluate + optional closed form),
///   `FrequencyResponse` (plant), `DrawingSurface` (render sink).
/// - **Nonlinearities**: saturation, relay with hysteresis, backlash, and
///   wrapped user functions.
/// - **Describing**: numeric first-harmonic estimation over one sampled cycle.
/// - **Analysis**: Nyquist / negative-reciprocal crossings refined by
///   Nelder-Mead minimization.
pub mod traits;
