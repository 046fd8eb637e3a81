//! Petroflash - multiphase isothermal-isobaric flash calculations.
//!
//! Fluids are built from defined components and TBP fractions, modeled
//! with the Peng-Robinson equation of state and flashed into any number
//! of gas, oil and aqueous phases.
//!
//! ```no_run
//! # use petroflash::{EosResult, Mixture, Stream};
//! # use petroflash::si::{KILOGRAM, MOL};
//! # fn main() -> EosResult<()> {
//! let mut mixture = Mixture::new();
//! mixture.add_component("water", 0.5)?;
//! mixture.add_component("methane", 0.3)?;
//! mixture.add_tbp_fraction("C10+", 0.2, 0.2 * KILOGRAM / MOL, 0.85)?;
//! mixture.use_volume_correction(true);
//!
//! let mut stream = Stream::new("inlet", &mixture);
//! stream.set_pressure(30.0, "bara")?;
//! stream.set_temperature(60.0, "C")?;
//! stream.set_flow_rate(1000.0, "kg/hr")?;
//! stream.run()?;
//! println!("{stream}");
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod components;
mod mixture;
mod stream;
pub mod units;

pub use mixture::Mixture;
#[cfg(feature = "rayon")]
pub use stream::execute_streams;
pub use stream::{PhaseResult, Stream};

pub use petroflash_core::{
    cubic, si, EosError, EosResult, FlashDiagnostics, FlashOptions, FlashStage, MultiphaseFlash,
    PhaseEquilibrium, PhaseType, Root, SolverOptions, StabilityOutcome, State, Verbosity,
};
