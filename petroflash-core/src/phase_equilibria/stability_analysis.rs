use super::is_trivial_solution;
use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::state::{Root, State};
use crate::SolverOptions;
use ndarray::Array1;

const X_DOMINANT: f64 = 0.99;
const MINIMIZE_TOL: f64 = 1E-10;
const MINIMIZE_KMAX: usize = 500;
const ZERO_TPD: f64 = -1E-08;
const TRIVIAL_TOL: f64 = 1E-10;

/// Outcome of the minimization of the tangent plane distance of one trial phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StabilityOutcome {
    /// Stationary point with negative tangent plane distance.
    Unstable { tpd: f64 },
    /// Stationary point with non-negative tangent plane distance.
    Stable { tpd: f64 },
    /// The trial phase converged to the tested phase.
    Trivial,
    /// The iteration limit was reached.
    Inconclusive,
}

/// # Stability analysis
impl<E: EquationOfState> State<E> {
    /// Determine if the state is stable, i.e. if a phase split should
    /// occur or not.
    pub fn is_stable(&self, options: SolverOptions) -> EosResult<bool> {
        Ok(self.stability_analysis(options)?.is_empty())
    }

    /// Perform a stability analysis. The result is a list of [State]s with
    /// negative tangent plane distance (i.e. lower Gibbs energy) that can be
    /// used as initial estimates for a phase equilibrium calculation. The
    /// list is ordered by increasing tangent plane distance.
    ///
    /// If no trial phase has a negative tangent plane distance but at least one
    /// trial did not converge, [EosError::StabilityInconclusive] is returned.
    pub fn stability_analysis(&self, options: SolverOptions) -> EosResult<Vec<State<E>>> {
        let d = self.ln_fugacity_coefficient_product();
        let mut candidates: Vec<(f64, State<E>)> = Vec::new();
        let mut inconclusive = None;
        for (phase, x_trial) in self.trial_compositions() {
            let (outcome, trial, i) = self.minimize_tpd(&d, &x_trial, options)?;
            let msg = match outcome {
                StabilityOutcome::Unstable { tpd } => {
                    if candidates
                        .iter()
                        .any(|(_, s)| is_trivial_solution(&s.molefracs, &trial.molefracs))
                    {
                        "Found already identified minimum"
                    } else {
                        candidates.push((tpd, trial));
                        "Found candidate"
                    }
                }
                StabilityOutcome::Stable { .. } => "Found minimum > 0",
                StabilityOutcome::Trivial => "Found trivial solution",
                StabilityOutcome::Inconclusive => {
                    inconclusive = Some(i);
                    "Not converged"
                }
            };
            log_result!(options.verbosity, "{}: {} in {} step(s)", phase, msg, i);
        }
        if candidates.is_empty() {
            if let Some(i) = inconclusive {
                return Err(EosError::StabilityInconclusive(i));
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(candidates.into_iter().map(|(_, s)| s).collect())
    }

    /// Tangent plane distance $\sum_iy_i\left(\ln y_i+\ln\varphi_i(y)-\ln x_i-\ln\varphi_i(x)\right)$
    /// of `trial` with respect to this state.
    pub fn tangent_plane_distance(&self, trial: &State<E>) -> f64 {
        tangent_plane_distance(trial, &self.ln_fugacity_coefficient_product())
    }

    /// Initial estimates: Wilson vapor and liquid phases and one nearly
    /// pure phase of every component present.
    fn trial_compositions(&self) -> Vec<(String, Array1<f64>)> {
        let x_feed = &self.molefracs;
        let n = x_feed.len();
        let k = self.eos.wilson_k(
            self.temperature.convert_into(crate::si::KELVIN),
            self.pressure.convert_into(crate::si::PASCAL),
        );
        let mut trials = Vec::with_capacity(n + 2);

        let vapor = x_feed * &k;
        trials.push(("Vapor phase".to_string(), &vapor / vapor.sum()));
        let liquid = x_feed / &k;
        trials.push(("Liquid phase".to_string(), &liquid / liquid.sum()));

        for i in (0..n).filter(|&i| x_feed[i] > 0.0) {
            let rest = x_feed.sum() - x_feed[i];
            if rest <= 0.0 {
                continue;
            }
            let factor = (1.0 - X_DOMINANT) / rest;
            let x_trial = Array1::from_shape_fn(n, |j| {
                if j == i {
                    X_DOMINANT
                } else {
                    x_feed[j] * factor
                }
            });
            trials.push((format!("Liquid phase {}", i + 1), x_trial));
        }
        trials
    }

    /// Successive substitution of $\ln W_i = d_i - \ln\varphi_i(w)$ in
    /// logarithmic variables.
    fn minimize_tpd(
        &self,
        d: &Array1<f64>,
        x_trial: &Array1<f64>,
        options: SolverOptions,
    ) -> EosResult<(StabilityOutcome, State<E>, usize)> {
        let (max_iter, tol, verbosity) = options.unwrap_or(MINIMIZE_KMAX, MINIMIZE_TOL);
        let new_trial = |y: &Array1<f64>| {
            State::new_tpx(
                &self.eos,
                self.temperature,
                self.pressure,
                y,
                Root::MinimumGibbs,
            )
        };
        let mut trial = new_trial(x_trial)?;
        let mut ln_w = x_trial.mapv(f64::ln);

        log_iter!(verbosity, " iter |    residual    |      tpd      ");
        log_iter!(verbosity, "{:-<38}", "");

        for i in 1..=max_iter {
            let ln_w_new = d - trial.ln_phi();
            let error = ln_w_new
                .iter()
                .zip(ln_w.iter())
                .filter(|(a, _)| a.is_finite())
                .fold(0.0, |acc: f64, (a, b)| acc.max((a - b).abs()));
            ln_w = ln_w_new;
            let (y, ln_sum_w) = normalize_ln(&ln_w);
            let tpd = -ln_sum_w.exp_m1();
            trial = new_trial(&y)?;
            log_iter!(verbosity, " {:4} | {:14.8e} | {:13.6e}", i, error, tpd);

            if (&y - &self.molefracs).mapv(|v| v * v).sum() < TRIVIAL_TOL {
                return Ok((StabilityOutcome::Trivial, trial, i));
            }
            if error < tol {
                let outcome = if tpd < ZERO_TPD {
                    StabilityOutcome::Unstable { tpd }
                } else {
                    StabilityOutcome::Stable { tpd }
                };
                return Ok((outcome, trial, i));
            }
        }

        // a negative tangent plane distance of any composition proves instability
        let tpd = tangent_plane_distance(&trial, d);
        let outcome = if tpd < ZERO_TPD {
            StabilityOutcome::Unstable { tpd }
        } else {
            StabilityOutcome::Inconclusive
        };
        Ok((outcome, trial, max_iter))
    }
}

fn tangent_plane_distance<E: EquationOfState>(trial: &State<E>, d: &Array1<f64>) -> f64 {
    trial
        .molefracs
        .iter()
        .zip(trial.ln_phi().iter())
        .zip(d.iter())
        .filter(|((&y, _), _)| y > 0.0)
        .map(|((&y, &l), &di)| y * (y.ln() + l - di))
        .sum()
}

/// Normalized composition and $\ln\sum_iW_i$ from $\ln W_i$.
fn normalize_ln(ln_w: &Array1<f64>) -> (Array1<f64>, f64) {
    let max = ln_w
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let w = ln_w.mapv(|l| (l - max).exp());
    let sum = w.sum();
    (w / sum, max + sum.ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubic::{PengRobinson, PengRobinsonParameters};
    use crate::si::{BAR, KELVIN};
    use crate::{EosResult, Verbosity};
    use std::sync::Arc;

    fn methane_decane() -> Arc<PengRobinson> {
        let parameters = PengRobinsonParameters::new_simple(
            &[190.564, 617.7],
            &[4599200.0, 2103000.0],
            &[0.01142, 0.4884],
            &[16.0428, 142.282],
        )
        .expect("consistent input");
        Arc::new(PengRobinson::new(Arc::new(parameters)))
    }

    #[test]
    fn test_stability_analysis() -> EosResult<()> {
        let eos = methane_decane();
        let options = SolverOptions::new().verbosity(Verbosity::Iter);
        let x = Array1::from_vec(vec![0.5, 0.5]);

        let two_phase = State::new_tpx(&eos, 344.0 * KELVIN, 50.0 * BAR, &x, Root::MinimumGibbs)?;
        let candidates = two_phase.stability_analysis(options)?;
        assert!(!candidates.is_empty());
        assert!(!two_phase.is_stable(options)?);
        // the most unstable trial phase is rich in methane
        assert!(candidates[0].molefracs[0] > 0.9);

        let gas = State::new_tpx(&eos, 600.0 * KELVIN, 1.0 * BAR, &x, Root::MinimumGibbs)?;
        assert!(gas.is_stable(options)?);
        Ok(())
    }

    #[test]
    fn log_normalization() {
        let ln_w = Array1::from_vec(vec![800.0, 800.0 + 2f64.ln(), f64::NEG_INFINITY]);
        let (y, ln_sum) = normalize_ln(&ln_w);
        assert!((y[0] - 1.0 / 3.0).abs() < 1e-14);
        assert!((y[1] - 2.0 / 3.0).abs() < 1e-14);
        assert_eq!(y[2], 0.0);
        assert!((ln_sum - (800.0 + 3f64.ln())).abs() < 1e-12);
    }
}
