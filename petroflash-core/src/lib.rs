#![warn(clippy::all)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]

/// Print messages with level `Verbosity::Iter` or higher.
#[macro_export]
macro_rules! log_iter {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Iter {
            println!($($arg)*);
        }
    }
}

/// Print messages with level `Verbosity::Result` or higher.
#[macro_export]
macro_rules! log_result {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Result {
            println!($($arg)*);
        }
    }
}

pub mod cubic;
mod equation_of_state;
mod errors;
pub mod parameter;
mod phase_equilibria;
pub mod si;
mod state;

pub use equation_of_state::{Components, EquationOfState};
pub use errors::{EosError, EosResult};
pub use phase_equilibria::{
    FlashDiagnostics, FlashOptions, FlashStage, MultiphaseFlash, PhaseEquilibrium, PhaseSplit, SolverOptions,
    StabilityOutcome, Verbosity,
};
pub use state::{PhaseType, Root, State};
