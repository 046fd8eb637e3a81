use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::si::{Pressure, Temperature};
use crate::state::{PhaseType, State};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

mod flash_machine;
mod multiphase;
mod stability_analysis;
mod tp_flash;
mod vle_pure;
pub use flash_machine::{FlashStage, MultiphaseFlash};
pub use multiphase::PhaseSplit;
pub use stability_analysis::StabilityOutcome;

/// Level of detail in the iteration output.
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Do not print output.
    #[default]
    None,
    /// Print information about the success of failure of the iteration.
    Result,
    /// Print a detailed outpur for every iteration.
    Iter,
}

/// Options for the various phase equilibria solvers.
///
/// If the values are [None], solver specific default
/// values are used.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,
    /// Tolerance.
    pub tol: Option<f64>,
    /// Iteration outpput indicated by the [Verbosity] enum.
    #[serde(default)]
    pub verbosity: Verbosity,
}

impl From<(Option<usize>, Option<f64>, Option<Verbosity>)> for SolverOptions {
    fn from(options: (Option<usize>, Option<f64>, Option<Verbosity>)) -> Self {
        Self {
            max_iter: options.0,
            tol: options.1,
            verbosity: options.2.unwrap_or(Verbosity::None),
        }
    }
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn unwrap_or(self, max_iter: usize, tol: f64) -> (usize, f64, Verbosity) {
        (
            self.max_iter.unwrap_or(max_iter),
            self.tol.unwrap_or(tol),
            self.verbosity,
        )
    }
}

/// Options of the multiphase flash.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct FlashOptions {
    /// Allow more than two phases.
    pub multiphase_check: bool,
    /// Upper limit of the number of phases.
    pub max_phases: usize,
    /// Options of the successive substitution of the phase compositions.
    #[serde(default)]
    pub equilibrium: SolverOptions,
    /// Options of the tangent plane distance minimization.
    #[serde(default)]
    pub stability: SolverOptions,
}

impl Default for FlashOptions {
    fn default() -> Self {
        Self {
            multiphase_check: false,
            max_phases: 3,
            equilibrium: SolverOptions::default(),
            stability: SolverOptions::default(),
        }
    }
}

impl FlashOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiphase_check(mut self, multiphase_check: bool) -> Self {
        self.multiphase_check = multiphase_check;
        self
    }

    pub fn max_phases(mut self, max_phases: usize) -> Self {
        self.max_phases = max_phases;
        self
    }

    pub fn equilibrium(mut self, equilibrium: SolverOptions) -> Self {
        self.equilibrium = equilibrium;
        self
    }

    pub fn stability(mut self, stability: SolverOptions) -> Self {
        self.stability = stability;
        self
    }

    /// Set the verbosity of all solvers.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.equilibrium.verbosity = verbosity;
        self.stability.verbosity = verbosity;
        self
    }

    /// Largest number of phases that the flash may report.
    pub fn phase_limit(&self) -> usize {
        if self.multiphase_check {
            self.max_phases.max(1)
        } else {
            self.max_phases.clamp(1, 2)
        }
    }
}

/// Convergence information of a flash calculation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashDiagnostics {
    /// Total number of successive substitution steps.
    pub iterations: usize,
    /// Largest deviation of the logarithmic fugacities between phases.
    pub residual: f64,
    /// Number of state transitions of the flash.
    pub stages: usize,
    /// Molar Gibbs energy of the phase split divided by RT.
    pub gibbs_energy: f64,
}

/// A thermodynamic equilibrium of an arbitrary number of phases.
///
/// Phases are ordered vapor, hydrocarbon liquid, aqueous liquid. Phases
/// of the same kind are ordered by increasing mass density.
///
/// ## Contents
///
/// + [Flash calculations](#flash-calculations)
/// + [Pure component phase equilibria](#pure-component-phase-equilibria)
/// + [Utility functions](#utility-functions)
#[derive(Debug)]
pub struct PhaseEquilibrium<E> {
    states: Vec<State<E>>,
    phase_fractions: Array1<f64>,
    phase_types: Vec<PhaseType>,
    diagnostics: FlashDiagnostics,
}

impl<E> Clone for PhaseEquilibrium<E> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            phase_fractions: self.phase_fractions.clone(),
            phase_types: self.phase_types.clone(),
            diagnostics: self.diagnostics,
        }
    }
}

impl<E: EquationOfState> fmt::Display for PhaseEquilibrium<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.states.iter().enumerate() {
            writeln!(
                f,
                "phase {} ({}, beta = {:.8}): {}",
                i, self.phase_types[i], self.phase_fractions[i], s
            )?;
        }
        Ok(())
    }
}

impl<E: EquationOfState> PhaseEquilibrium<E> {
    /// Creates a new `PhaseEquilibrium` from phases and their mole fractions.
    ///
    /// The phases are classified and sorted. The states are not checked
    /// for equilibrium.
    pub fn new(
        states: Vec<State<E>>,
        phase_fractions: Vec<f64>,
        diagnostics: FlashDiagnostics,
    ) -> EosResult<Self> {
        if states.is_empty() || states.len() != phase_fractions.len() {
            return Err(EosError::Error(format!(
                "{} phases with {} phase fractions",
                states.len(),
                phase_fractions.len()
            )));
        }
        let types: Vec<_> = states.iter().map(|s| s.phase_type()).collect();
        Ok(Self::with_phase_types(states, phase_fractions, types, diagnostics))
    }

    /// Same as [PhaseEquilibrium::new] with predetermined phase types.
    pub(crate) fn with_phase_types(
        states: Vec<State<E>>,
        phase_fractions: Vec<f64>,
        phase_types: Vec<PhaseType>,
        diagnostics: FlashDiagnostics,
    ) -> Self {
        let mut phases: Vec<_> = states
            .into_iter()
            .zip(phase_fractions)
            .zip(phase_types)
            .map(|((s, b), t)| {
                let rho = s.mass_density();
                (s, b, t, rho)
            })
            .collect();
        phases.sort_by(|a, b| {
            a.2.cmp(&b.2)
                .then_with(|| a.3.partial_cmp(&b.3).unwrap_or(Ordering::Equal))
        });
        let total: f64 = phases.iter().map(|p| p.1).sum();
        let phase_fractions = phases.iter().map(|p| p.1 / total).collect();
        let phase_types = phases.iter().map(|p| p.2).collect();
        let states = phases.into_iter().map(|p| p.0).collect();
        Self {
            states,
            phase_fractions,
            phase_types,
            diagnostics,
        }
    }

    pub fn states(&self) -> &[State<E>] {
        &self.states
    }

    pub fn number_of_phases(&self) -> usize {
        self.states.len()
    }

    /// Mole fractions of the phases in the total amount of substance.
    pub fn phase_fractions(&self) -> &Array1<f64> {
        &self.phase_fractions
    }

    pub fn phase_types(&self) -> &[PhaseType] {
        &self.phase_types
    }

    pub fn diagnostics(&self) -> &FlashDiagnostics {
        &self.diagnostics
    }

    pub fn temperature(&self) -> Temperature {
        self.states[0].temperature
    }

    pub fn pressure(&self) -> Pressure {
        self.states[0].pressure
    }

    pub fn has_phase_type(&self, phase_type: PhaseType) -> bool {
        self.phase_types.contains(&phase_type)
    }

    /// The first phase of the given kind and its phase fraction.
    pub fn phase(&self, phase_type: PhaseType) -> Option<(&State<E>, f64)> {
        self.phase_types
            .iter()
            .position(|&t| t == phase_type)
            .map(|i| (&self.states[i], self.phase_fractions[i]))
    }

    /// Overall composition recovered from the phases.
    pub fn overall_molefracs(&self) -> Array1<f64> {
        self.states
            .iter()
            .zip(self.phase_fractions.iter())
            .fold(Array1::zeros(self.states[0].molefracs.len()), |acc, (s, &b)| {
                acc + &s.molefracs * b
            })
    }

    /// Molar Gibbs energy of mixing of all phases divided by RT.
    pub fn total_gibbs_energy(&self) -> f64 {
        self.states
            .iter()
            .zip(self.phase_fractions.iter())
            .map(|(s, &b)| b * s.reduced_gibbs_energy())
            .sum()
    }

    /// Re-evaluate the phases with an equation of state for a larger
    /// set of components.
    ///
    /// `component_list` maps the components of the current equation of state
    /// onto the components of `eos`; all other mole fractions are zero.
    pub(crate) fn embed<E2: EquationOfState>(
        &self,
        eos: &Arc<E2>,
        component_list: &[usize],
    ) -> EosResult<PhaseEquilibrium<E2>> {
        let states = self
            .states
            .iter()
            .map(|s| {
                let mut x = Array1::zeros(eos.components());
                for (&i, &xi) in component_list.iter().zip(s.molefracs.iter()) {
                    x[i] = xi;
                }
                State::new_tpx(eos, s.temperature, s.pressure, &x, s.root())
            })
            .collect::<EosResult<Vec<_>>>()?;
        Ok(PhaseEquilibrium::with_phase_types(
            states,
            self.phase_fractions.to_vec(),
            self.phase_types.clone(),
            self.diagnostics,
        ))
    }
}

const TRIVIAL_DEVIATION: f64 = 1e-6;

/// Check if two compositions describe the same phase.
pub(crate) fn is_trivial_solution(x1: &Array1<f64>, x2: &Array1<f64>) -> bool {
    (x1 - x2).mapv(|d| d * d).sum() < TRIVIAL_DEVIATION
}

/// # Utility functions
impl<E: EquationOfState> PhaseEquilibrium<E> {
    /// Largest difference of $\ln(x_i\varphi_i)$ between any phase and the first phase.
    ///
    /// Components absent from a phase are skipped.
    pub fn fugacity_residual(states: &[State<E>]) -> f64 {
        let reference = &states[0];
        let mut residual: f64 = 0.0;
        for s in states.iter().skip(1) {
            for i in 0..s.molefracs.len() {
                let (x0, x) = (reference.molefracs[i], s.molefracs[i]);
                if x0 > 0.0 && x > 0.0 {
                    let d = x.ln() + s.ln_phi()[i] - x0.ln() - reference.ln_phi()[i];
                    residual = residual.max(d.abs());
                }
            }
        }
        residual
    }
}
