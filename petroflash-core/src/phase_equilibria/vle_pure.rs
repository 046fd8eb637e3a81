use super::{FlashDiagnostics, PhaseEquilibrium, SolverOptions};
use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::si::{Pressure, Temperature, KELVIN, PASCAL};
use crate::state::{Root, State};
use ndarray::arr1;
use std::sync::Arc;

const SCALE_P_BRACKET: f64 = 1.2;
const MAX_ITER_PURE: usize = 200;
const TOL_PURE: f64 = 1e-10;

/// # Pure component phase equilibria
impl<E: EquationOfState> PhaseEquilibrium<E> {
    /// Calculate a phase equilibrium for a pure component at the given
    /// temperature.
    ///
    /// Both phases are reported with a phase fraction of 0.5.
    pub fn pure_t(eos: &Arc<E>, temperature: Temperature, options: SolverOptions) -> EosResult<Self> {
        let (states, iterations, residual) = saturation(eos, temperature, options)?;
        let gibbs_energy = states[1].reduced_gibbs_energy();
        let diagnostics = FlashDiagnostics {
            iterations,
            residual,
            stages: 0,
            gibbs_energy,
        };
        PhaseEquilibrium::new(states.to_vec(), vec![0.5, 0.5], diagnostics)
    }

    /// Saturation pressure of a pure component at the given temperature.
    pub fn pure_saturation_pressure(
        eos: &Arc<E>,
        temperature: Temperature,
        options: SolverOptions,
    ) -> EosResult<Pressure> {
        Ok(saturation(eos, temperature, options)?.0[0].pressure)
    }
}

fn saturation<E: EquationOfState>(
    eos: &Arc<E>,
    temperature: Temperature,
    options: SolverOptions,
) -> EosResult<([State<E>; 2], usize, f64)> {
    if eos.components() != 1 {
        return Err(EosError::IncompatibleComponents(1, eos.components()));
    }
    let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_PURE, TOL_PURE);
    let t = temperature.convert_into(KELVIN);
    let x = arr1(&[1.0]);

    // Wilson estimate of the saturation pressure
    let p_ref = 1e5;
    let mut p = p_ref * eos.wilson_k(t, p_ref)[0];
    if !(p.is_finite() && p > 0.0) {
        return Err(EosError::InvalidState(
            String::from("pure_saturation_pressure"),
            String::from("pressure"),
            p,
        ));
    }

    log_iter!(verbosity, " iter |    residual    |  pressure");
    log_iter!(verbosity, "{:-<40}", "");

    for i in 1..=max_iter {
        let pressure = p * PASCAL;
        let roots = eos.compressibility_roots(t, p, &x);
        if roots.len() < 2 {
            // move towards the pressure region with a vapor and a liquid root
            let state = State::new_tpx(eos, temperature, pressure, &x, Root::MinimumGibbs)?;
            if state.phase_identification_parameter() < 1.0 {
                p *= SCALE_P_BRACKET;
            } else {
                p /= SCALE_P_BRACKET;
            }
            log_iter!(verbosity, " {:4} | {:>14} | {:.8}", i, "", pressure);
            continue;
        }
        let vapor = State::new_tpx(eos, temperature, pressure, &x, Root::Vapor)?;
        let liquid = State::new_tpx(eos, temperature, pressure, &x, Root::Liquid)?;
        let delta = liquid.ln_phi()[0] - vapor.ln_phi()[0];
        log_iter!(verbosity, " {:4} | {:14.8e} | {:.8}", i, delta.abs(), pressure);
        if delta.abs() < tol {
            log_result!(
                verbosity,
                "Saturation pressure: calculation converged in {} step(s)\n",
                i
            );
            return Ok(([vapor, liquid], i, delta.abs()));
        }
        p *= delta.exp();
    }
    log_result!(verbosity, "Saturation pressure: calculation did not converge");
    Err(EosError::IterationFailed(String::from(
        "pure_saturation_pressure",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubic::{PengRobinson, PengRobinsonParameters};
    use crate::si::BAR;
    use crate::{FlashOptions, PhaseType};
    use approx::assert_relative_eq;

    fn propane() -> Arc<PengRobinson> {
        let parameters = PengRobinsonParameters::new_simple(
            &[369.89],
            &[4251200.0],
            &[0.1521],
            &[44.0956],
        )
        .expect("consistent input");
        Arc::new(PengRobinson::new(Arc::new(parameters)))
    }

    #[test]
    fn test_pure_t() -> EosResult<()> {
        let eos = propane();
        let t = 300.0 * KELVIN;
        let vle = PhaseEquilibrium::pure_t(&eos, t, SolverOptions::default())?;
        let p = vle.pressure().convert_into(BAR);
        assert!(p > 9.0 && p < 10.5);
        assert_eq!(vle.phase_types(), &[PhaseType::Vapor, PhaseType::LiquidHydrocarbon]);
        assert_relative_eq!(
            vle.states()[0].ln_phi()[0],
            vle.states()[1].ln_phi()[0],
            epsilon = 1e-9
        );

        // a flash at the saturation pressure reports both phases
        let flash = PhaseEquilibrium::tp_flash(
            &eos,
            t,
            vle.pressure(),
            &arr1(&[1.0]),
            FlashOptions::default(),
        )?;
        assert_eq!(flash.number_of_phases(), 2);
        assert_relative_eq!(flash.phase_fractions()[0], 0.5);
        Ok(())
    }

    #[test]
    fn pure_flash_away_from_saturation() -> EosResult<()> {
        let eos = propane();
        let flash = PhaseEquilibrium::tp_flash(
            &eos,
            300.0 * KELVIN,
            20.0 * BAR,
            &arr1(&[1.0]),
            FlashOptions::default(),
        )?;
        assert_eq!(flash.number_of_phases(), 1);
        assert_eq!(flash.phase_types(), &[PhaseType::LiquidHydrocarbon]);
        Ok(())
    }

    #[test]
    fn mixtures_are_rejected() {
        let parameters = PengRobinsonParameters::new_simple(
            &[190.564, 369.89],
            &[4599200.0, 4251200.0],
            &[0.01142, 0.1521],
            &[16.0428, 44.0956],
        )
        .expect("consistent input");
        let eos = Arc::new(PengRobinson::new(Arc::new(parameters)));
        let p = PhaseEquilibrium::pure_saturation_pressure(&eos, 200.0 * KELVIN, SolverOptions::default());
        assert!(matches!(p, Err(EosError::IncompatibleComponents(1, 2))));
    }
}
