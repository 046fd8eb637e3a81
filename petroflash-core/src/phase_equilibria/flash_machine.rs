use super::multiphase::PhaseSplit;
use super::{is_trivial_solution, FlashDiagnostics, FlashOptions, PhaseEquilibrium};
use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::si::{Pressure, Temperature, KELVIN, PASCAL};
use crate::state::{Root, State};
use ndarray::{Array1, Axis};
use std::mem;
use std::sync::Arc;

const MAX_STAGES: usize = 64;
const FEED_TOL: f64 = 1e-6;
const PURE_TOL: f64 = 1e-8;

/// Stages of the multiphase flash.
#[derive(Debug)]
pub enum FlashStage<E> {
    /// Stability analysis of the feed.
    Initializing,
    /// Successive substitution of the phase compositions.
    IteratingEquilibrium(PhaseSplit<E>),
    /// Stability analysis of a converged phase split.
    CheckingStability(PhaseEquilibrium<E>),
    /// A trial phase lowers the Gibbs energy of the converged split.
    Escalating {
        converged: PhaseEquilibrium<E>,
        trial: State<E>,
    },
    Converged(PhaseEquilibrium<E>),
    Failed(EosError),
}

impl<E> FlashStage<E> {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Converged(_) | Self::Failed(_))
    }
}

/// Isothermal-isobaric flash with an arbitrary number of phases.
///
/// Starting from the stability analysis of the feed, phases are added one
/// by one as long as the stability analysis of the phase split finds a
/// phase with lower Gibbs energy.
pub struct MultiphaseFlash<E> {
    feed: State<E>,
    options: FlashOptions,
    stage: FlashStage<E>,
    stages: usize,
    iterations: usize,
    escalated_from: Option<usize>,
}

impl<E: EquationOfState> MultiphaseFlash<E> {
    pub fn new(
        eos: &Arc<E>,
        temperature: Temperature,
        pressure: Pressure,
        feed: &Array1<f64>,
        options: FlashOptions,
    ) -> EosResult<Self> {
        let feed = State::new_tpx(eos, temperature, pressure, feed, Root::MinimumGibbs)?;
        Ok(Self {
            feed,
            options,
            stage: FlashStage::Initializing,
            stages: 0,
            iterations: 0,
            escalated_from: None,
        })
    }

    pub fn stage(&self) -> &FlashStage<E> {
        &self.stage
    }

    /// Perform a single transition of the flash.
    pub fn next_stage(&mut self) {
        let stage = mem::replace(&mut self.stage, FlashStage::Initializing);
        if stage.is_finished() {
            self.stage = stage;
            return;
        }
        self.stages += 1;
        self.stage = if self.stages > MAX_STAGES {
            FlashStage::Failed(EosError::FlashNonConvergent {
                iterations: self.iterations,
                residual: f64::NAN,
            })
        } else {
            self.transition(stage).unwrap_or_else(FlashStage::Failed)
        };
        if let FlashStage::Converged(phase_equilibrium) = &mut self.stage {
            phase_equilibrium.diagnostics.stages = self.stages;
            phase_equilibrium.diagnostics.iterations = self.iterations;
        }
    }

    /// Iterate until the flash converged or failed.
    pub fn run(mut self) -> EosResult<PhaseEquilibrium<E>> {
        loop {
            self.next_stage();
            match mem::replace(&mut self.stage, FlashStage::Initializing) {
                FlashStage::Converged(phase_equilibrium) => return Ok(phase_equilibrium),
                FlashStage::Failed(error) => return Err(error),
                stage => self.stage = stage,
            }
        }
    }

    fn transition(&mut self, stage: FlashStage<E>) -> EosResult<FlashStage<E>> {
        let verbosity = self.options.equilibrium.verbosity;
        Ok(match stage {
            FlashStage::Initializing => {
                if self.feed.eos.components() == 1 {
                    FlashStage::Converged(self.pure_component()?)
                } else {
                    match self.feed.stability_analysis(self.options.stability) {
                        Ok(candidates) if candidates.is_empty() || self.options.phase_limit() < 2 => {
                            FlashStage::Converged(self.single_phase()?)
                        }
                        Ok(mut candidates) => {
                            let trial = candidates.swap_remove(0);
                            FlashStage::IteratingEquilibrium(PhaseSplit::new(vec![
                                self.feed.clone(),
                                trial,
                            ]))
                        }
                        Err(EosError::StabilityInconclusive(i)) => {
                            log_result!(
                                verbosity,
                                "Flash: stability of the feed inconclusive after {} step(s)",
                                i
                            );
                            FlashStage::Converged(self.single_phase()?)
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
            FlashStage::IteratingEquilibrium(split) => {
                let (split, iterations, residual) =
                    split.equilibrate(&self.feed.molefracs, self.options.equilibrium)?;
                self.iterations += iterations;
                let diagnostics = FlashDiagnostics {
                    iterations: self.iterations,
                    residual,
                    stages: self.stages,
                    gibbs_energy: split.reduced_gibbs_energy(),
                };
                let phase_equilibrium =
                    PhaseEquilibrium::new(split.states, split.fractions.to_vec(), diagnostics)?;
                match self.escalated_from.take() {
                    // the added phase vanished during the iteration
                    Some(n) if phase_equilibrium.number_of_phases() <= n => {
                        FlashStage::Converged(phase_equilibrium)
                    }
                    _ => FlashStage::CheckingStability(phase_equilibrium),
                }
            }
            FlashStage::CheckingStability(phase_equilibrium) => {
                if phase_equilibrium.number_of_phases() >= self.options.phase_limit() {
                    return Ok(FlashStage::Converged(phase_equilibrium));
                }
                match self.unstable_trial(&phase_equilibrium)? {
                    Some(trial) => FlashStage::Escalating {
                        converged: phase_equilibrium,
                        trial,
                    },
                    None => FlashStage::Converged(phase_equilibrium),
                }
            }
            FlashStage::Escalating { converged, trial } => {
                log_result!(
                    verbosity,
                    "Flash: adding phase {} to {} phase(s)",
                    converged.number_of_phases() + 1,
                    converged.number_of_phases()
                );
                self.escalated_from = Some(converged.number_of_phases());
                let mut states = converged.states;
                states.push(trial);
                FlashStage::IteratingEquilibrium(PhaseSplit::new(states))
            }
            stage @ (FlashStage::Converged(_) | FlashStage::Failed(_)) => stage,
        })
    }

    /// Stability analysis of every phase of a converged split.
    ///
    /// Returns the trial phase with the lowest tangent plane distance that
    /// does not coincide with one of the existing phases. Phases whose
    /// stability analysis is inconclusive are skipped.
    fn unstable_trial(
        &self,
        phase_equilibrium: &PhaseEquilibrium<E>,
    ) -> EosResult<Option<State<E>>> {
        let states = phase_equilibrium.states();
        let mut best: Option<(f64, State<E>)> = None;
        for (i, tested) in states.iter().enumerate() {
            let candidates = match tested.stability_analysis(self.options.stability) {
                Ok(candidates) => candidates,
                Err(EosError::StabilityInconclusive(k)) => {
                    log_result!(
                        self.options.equilibrium.verbosity,
                        "Flash: stability of phase {} inconclusive after {} step(s)",
                        i,
                        k
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            for trial in candidates {
                if states
                    .iter()
                    .any(|s| is_trivial_solution(&s.molefracs, &trial.molefracs))
                {
                    continue;
                }
                // equal fugacities make the distance independent of the tested phase
                let tpd = tested.tangent_plane_distance(&trial);
                if best.as_ref().map_or(true, |(b, _)| tpd < *b) {
                    best = Some((tpd, trial));
                }
            }
        }
        Ok(best.map(|(_, trial)| trial))
    }

    fn diagnostics(&self, residual: f64, gibbs_energy: f64) -> FlashDiagnostics {
        FlashDiagnostics {
            iterations: self.iterations,
            residual,
            stages: self.stages,
            gibbs_energy,
        }
    }

    fn single_phase(&self) -> EosResult<PhaseEquilibrium<E>> {
        let diagnostics = self.diagnostics(0.0, self.feed.reduced_gibbs_energy());
        PhaseEquilibrium::new(vec![self.feed.clone()], vec![1.0], diagnostics)
    }

    /// A pure component splits into two phases only at its saturation pressure.
    fn pure_component(&self) -> EosResult<PhaseEquilibrium<E>> {
        let eos = &self.feed.eos;
        let (t, p) = (
            self.feed.temperature.convert_into(KELVIN),
            self.feed.pressure.convert_into(PASCAL),
        );
        if eos.compressibility_roots(t, p, &self.feed.molefracs).len() >= 2 {
            let vapor = self.feed.update_root(Root::Vapor)?;
            let liquid = self.feed.update_root(Root::Liquid)?;
            let residual = (vapor.ln_phi()[0] - liquid.ln_phi()[0]).abs();
            if residual < PURE_TOL {
                let diagnostics = self.diagnostics(residual, self.feed.reduced_gibbs_energy());
                return PhaseEquilibrium::new(vec![vapor, liquid], vec![0.5, 0.5], diagnostics);
            }
        }
        self.single_phase()
    }
}

/// # Flash calculations
impl<E: EquationOfState> PhaseEquilibrium<E> {
    /// Perform an isothermal-isobaric flash of a feed with the given mole
    /// fractions.
    ///
    /// The mole fractions have to sum to one within a tolerance of 1e-6.
    /// Components with zero mole fraction are removed from the equation of
    /// state for the calculation and reported with zero mole fraction in
    /// every phase.
    pub fn tp_flash(
        eos: &Arc<E>,
        temperature: Temperature,
        pressure: Pressure,
        feed: &Array1<f64>,
        options: FlashOptions,
    ) -> EosResult<Self> {
        if feed.len() != eos.components() {
            return Err(EosError::IncompatibleComponents(
                eos.components(),
                feed.len(),
            ));
        }
        if feed.iter().any(|&x| !x.is_finite() || x < 0.0) {
            return Err(EosError::InvalidComposition(format!(
                "mole fractions {} contain negative or non-finite values",
                feed
            )));
        }
        let sum = feed.sum();
        if (sum - 1.0).abs() > FEED_TOL {
            return Err(EosError::InvalidComposition(format!(
                "mole fractions sum to {}",
                sum
            )));
        }
        let feed = feed / sum;

        let active: Vec<usize> = (0..feed.len()).filter(|&i| feed[i] > 0.0).collect();
        if active.len() == feed.len() {
            return MultiphaseFlash::new(eos, temperature, pressure, &feed, options)?.run();
        }
        let eos_active = Arc::new(eos.subset(&active)?);
        let feed_active = feed.select(Axis(0), &active);
        MultiphaseFlash::new(&eos_active, temperature, pressure, &feed_active, options)?
            .run()?
            .embed(eos, &active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubic::{PengRobinson, PengRobinsonParameters};
    use crate::si::BAR;
    use crate::{Components, PhaseType, SolverOptions};
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn methane_decane_water() -> Arc<PengRobinson> {
        let parameters = PengRobinsonParameters::new_simple(
            &[190.564, 617.7, 647.096],
            &[4599200.0, 2103000.0, 22064000.0],
            &[0.01142, 0.4884, 0.3443],
            &[16.0428, 142.282, 18.01528],
        )
        .expect("consistent input");
        Arc::new(PengRobinson::new(Arc::new(parameters)))
    }

    #[test]
    fn test_two_phase_flash() -> EosResult<()> {
        let eos = methane_decane_water();
        let feed = arr1(&[0.5, 0.5, 0.0]);
        let vle = PhaseEquilibrium::tp_flash(
            &eos,
            344.0 * KELVIN,
            50.0 * BAR,
            &feed,
            FlashOptions::default(),
        )?;
        assert_eq!(vle.number_of_phases(), 2);
        assert_eq!(vle.phase_types(), &[PhaseType::Vapor, PhaseType::LiquidHydrocarbon]);
        assert_relative_eq!(&vle.overall_molefracs(), &feed, epsilon = 1e-8);
        assert!(PhaseEquilibrium::fugacity_residual(vle.states()) < 1e-8);
        for s in vle.states() {
            assert_eq!(s.molefracs[2], 0.0);
        }
        Ok(())
    }

    #[test]
    fn test_stage_sequence() -> EosResult<()> {
        let eos = Arc::new(methane_decane_water().subset(&[0, 1])?);
        let mut flash = MultiphaseFlash::new(
            &eos,
            344.0 * KELVIN,
            50.0 * BAR,
            &arr1(&[0.5, 0.5]),
            FlashOptions::default(),
        )?;
        assert!(matches!(flash.stage(), FlashStage::Initializing));
        flash.next_stage();
        assert!(matches!(flash.stage(), FlashStage::IteratingEquilibrium(_)));
        flash.next_stage();
        assert!(matches!(flash.stage(), FlashStage::CheckingStability(_)));
        flash.next_stage();
        assert!(matches!(flash.stage(), FlashStage::Converged(_)));
        flash.next_stage();
        assert!(flash.stage().is_finished());
        Ok(())
    }

    #[test]
    fn test_minor_phase_unstable() -> EosResult<()> {
        let eos = Arc::new(methane_decane_water().subset(&[0, 1])?);
        let (t, p) = (300.0 * KELVIN, 10.0 * BAR);
        let flash = MultiphaseFlash::new(&eos, t, p, &arr1(&[0.05, 0.95]), FlashOptions::default())?;
        let major = State::new_tpx(&eos, t, p, &arr1(&[0.01, 0.99]), Root::MinimumGibbs)?;
        let minor = State::new_tpx(&eos, t, p, &arr1(&[0.5, 0.5]), Root::MinimumGibbs)?;
        assert!(major.is_stable(SolverOptions::default())?);
        assert!(!minor.is_stable(SolverOptions::default())?);

        let split = PhaseEquilibrium::new(
            vec![major.clone(), minor.clone()],
            vec![0.9, 0.1],
            FlashDiagnostics::default(),
        )?;
        let trial = flash.unstable_trial(&split)?;
        assert!(trial.is_some());
        if let Some(trial) = trial {
            assert!(!is_trivial_solution(&trial.molefracs, &major.molefracs));
            assert!(!is_trivial_solution(&trial.molefracs, &minor.molefracs));
            assert!(minor.tangent_plane_distance(&trial) < 0.0);
        }
        Ok(())
    }

    #[test]
    fn test_single_phase() -> EosResult<()> {
        let eos = methane_decane_water();
        let feed = arr1(&[0.5, 0.5, 0.0]);
        let vle = PhaseEquilibrium::tp_flash(
            &eos,
            600.0 * KELVIN,
            1.0 * BAR,
            &feed,
            FlashOptions::default(),
        )?;
        assert_eq!(vle.number_of_phases(), 1);
        assert_eq!(vle.phase_fractions()[0], 1.0);
        assert!(vle.has_phase_type(PhaseType::Vapor));
        Ok(())
    }

    #[test]
    fn invalid_feed() {
        let eos = methane_decane_water();
        let flash = |x: Array1<f64>| {
            PhaseEquilibrium::tp_flash(&eos, 300.0 * KELVIN, BAR, &x, FlashOptions::default())
        };
        assert!(matches!(
            flash(arr1(&[0.2, 0.2, 0.1])),
            Err(EosError::InvalidComposition(_))
        ));
        assert!(matches!(
            flash(arr1(&[1.2, -0.2, 0.0])),
            Err(EosError::InvalidComposition(_))
        ));
        assert!(matches!(
            flash(arr1(&[1.0, 0.0])),
            Err(EosError::IncompatibleComponents(3, 2))
        ));
    }
}
