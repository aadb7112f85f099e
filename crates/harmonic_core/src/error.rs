use thiserror::Error;

/// Hard failures of the describing-function estimator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescribingFunctionError {
    #[error("cannot evaluate describing function for amplitude {0} < 0")]
    NegativeAmplitude(f64),

    #[error("amplitude {0} is not a finite number")]
    NonFiniteAmplitude(f64),

    #[error("function must evaluate to zero at zero (got {0})")]
    NonzeroAtZero(f64),

    #[error("at least 2 samples per cycle are required (got {0})")]
    TooFewSamples(usize),

    #[error("no amplitudes were requested")]
    EmptyAmplitudes,

    #[error("sector bounds are not implemented for this function")]
    SectorBoundsUnimplemented,
}

pub type Result<T> = std::result::Result<T, DescribingFunctionError>;
