use crate::parameter::ParameterError;
use num_dual::linalg::LinAlgError;
use thiserror::Error;

/// Error type for improperly defined fluids, states and convergence problems.
#[derive(Error, Debug)]
pub enum EosError {
    #[error("{0}")]
    Error(String),
    #[error("Component `{0}` is not in the component database.")]
    UnknownComponent(String),
    #[error("Correlation input for `{name}` out of range: {property} = {value} (valid range {min} to {max}).")]
    InvalidCorrelationInput {
        name: String,
        property: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("No physical root of the cubic equation at T = {temperature} K, p = {pressure} Pa.")]
    NoPhysicalRoot { temperature: f64, pressure: f64 },
    #[error("Stability analysis did not converge within {0} iterations.")]
    StabilityInconclusive(usize),
    #[error("Flash did not converge after {iterations} iterations (residual {residual:e}).")]
    FlashNonConvergent { iterations: usize, residual: f64 },
    #[error("`{0}` encountered illegal values during the iteration.")]
    IterationFailed(String),
    #[error("Unsupported unit `{unit}` for {quantity}.")]
    UnsupportedUnit { quantity: String, unit: String },
    #[error("Stream `{0}` has not been executed.")]
    NotExecuted(String),
    #[error("Invalid composition: {0}.")]
    InvalidComposition(String),
    #[error("Equation of state is initialized for {0} components while the input specifies {1} components.")]
    IncompatibleComponents(usize, usize),
    #[error("Invalid state in {0}: {1} = {2}.")]
    InvalidState(String, String, f64),
    #[error(transparent)]
    ParameterError(#[from] ParameterError),
    #[error(transparent)]
    LinAlgError(#[from] LinAlgError),
    #[cfg(feature = "rayon")]
    #[error(transparent)]
    RayonError(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience type for `Result<T, EosError>`.
pub type EosResult<T> = Result<T, EosError>;
