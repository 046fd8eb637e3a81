use super::tp_flash::{rachford_rice, split_compositions};
use super::PhaseEquilibrium;
use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::state::State;
use crate::SolverOptions;
use ndarray::{arr1, Array1, Array2};
use num_dual::linalg::LU;

const MAX_ITER_SS: usize = 2000;
const TOL_SS: f64 = 1e-10;
const MAX_ITER_Q: usize = 100;
const TOL_Q: f64 = 1e-12;
const ZERO_FRACTION: f64 = 1e-12;

/// A set of phases and their phase fractions that are not
/// necessarily in equilibrium.
#[derive(Debug)]
pub struct PhaseSplit<E> {
    pub states: Vec<State<E>>,
    pub fractions: Array1<f64>,
}

impl<E> Clone for PhaseSplit<E> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            fractions: self.fractions.clone(),
        }
    }
}

impl<E: EquationOfState> PhaseSplit<E> {
    /// Phases with equal phase fractions.
    pub fn new(states: Vec<State<E>>) -> Self {
        let n = states.len();
        Self {
            states,
            fractions: Array1::from_elem(n, 1.0 / n as f64),
        }
    }

    pub fn number_of_phases(&self) -> usize {
        self.states.len()
    }

    /// Molar Gibbs energy of mixing of all phases divided by RT.
    pub fn reduced_gibbs_energy(&self) -> f64 {
        self.states
            .iter()
            .zip(self.fractions.iter())
            .map(|(s, &b)| b * s.reduced_gibbs_energy())
            .sum()
    }

    /// Successive substitution of the phase compositions until the
    /// fugacities of all components are equal in all phases.
    ///
    /// Returns the converged split, the number of iterations and the
    /// final residual. Phases whose fraction vanishes are removed.
    pub fn equilibrate(
        mut self,
        feed: &Array1<f64>,
        options: SolverOptions,
    ) -> EosResult<(Self, usize, f64)> {
        let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_SS, TOL_SS);

        log_iter!(verbosity, " iter | phases |    residual    | phase fractions");
        log_iter!(verbosity, "{:-<60}", "");

        let mut residual = PhaseEquilibrium::fugacity_residual(&self.states);
        for i in 0..max_iter {
            log_iter!(
                verbosity,
                " {:4} | {:6} | {:14.8e} | {:.8}",
                i,
                self.number_of_phases(),
                residual,
                self.fractions
            );
            if residual < tol {
                log_result!(
                    verbosity,
                    "Phase split: calculation converged in {} step(s)\n",
                    i
                );
                return Ok((self, i, residual));
            }
            self.substitution_step(feed)?;
            residual = PhaseEquilibrium::fugacity_residual(&self.states);
        }
        if residual < tol {
            return Ok((self, max_iter, residual));
        }
        log_result!(verbosity, "Phase split: calculation did not converge");
        Err(EosError::FlashNonConvergent {
            iterations: max_iter,
            residual,
        })
    }

    fn substitution_step(&mut self, feed: &Array1<f64>) -> EosResult<()> {
        let phi: Vec<_> = self
            .states
            .iter()
            .map(|s| s.ln_phi().mapv(f64::exp))
            .collect();

        let mut two_phase = None;
        if self.states.len() == 2 {
            let k = &phi[0] / &phi[1];
            if let Ok(beta) = rachford_rice(feed, &k, Some(self.fractions[1])) {
                two_phase = Some((k, beta));
            }
        }
        let compositions = match two_phase {
            Some((k, beta)) => {
                self.fractions = arr1(&[1.0 - beta, beta]);
                let (x, y) = split_compositions(feed, &k, beta);
                vec![x, y]
            }
            None => {
                self.fractions = phase_amounts(feed, &phi, &self.fractions)?;
                let e = weighted_inverse_sum(&phi, &self.fractions);
                phi.iter()
                    .map(|p| {
                        let x = feed / &(p * &e);
                        &x / x.sum()
                    })
                    .collect()
            }
        };

        let mut states = Vec::with_capacity(compositions.len());
        let mut fractions = Vec::with_capacity(compositions.len());
        for ((s, x), &b) in self
            .states
            .iter()
            .zip(compositions.iter())
            .zip(self.fractions.iter())
        {
            if b > ZERO_FRACTION {
                states.push(s.update_molefracs(x)?);
                fractions.push(b);
            }
        }
        if states.is_empty() {
            return Err(EosError::IterationFailed(String::from("phase split")));
        }
        let total: f64 = fractions.iter().sum();
        self.fractions = Array1::from_vec(fractions) / total;
        self.states = states;
        Ok(())
    }
}

/// $E_i=\sum_k\beta_k/\varphi_{ik}$
fn weighted_inverse_sum(phi: &[Array1<f64>], beta: &Array1<f64>) -> Array1<f64> {
    phi.iter()
        .zip(beta.iter())
        .fold(Array1::zeros(phi[0].len()), |acc, (p, &b)| acc + b / p)
}

/// $Q=\sum_k\beta_k-\sum_iz_i\ln E_i$
fn q_function(feed: &Array1<f64>, e: &Array1<f64>, beta: &Array1<f64>) -> f64 {
    let mut q = beta.sum();
    for (&z, &e) in feed.iter().zip(e.iter()).filter(|(&z, _)| z > 0.0) {
        if e <= 0.0 {
            return f64::INFINITY;
        }
        q -= z * e.ln();
    }
    q
}

/// Phase fractions that minimize the convex function $Q$ for fixed
/// fugacity coefficients subject to $\beta_k\geq 0$.
fn phase_amounts(
    feed: &Array1<f64>,
    phi: &[Array1<f64>],
    beta_in: &Array1<f64>,
) -> EosResult<Array1<f64>> {
    let np = phi.len();
    let mut beta = beta_in.clone();
    for _ in 0..MAX_ITER_Q {
        let e = weighted_inverse_sum(phi, &beta);
        let w = Array1::from_shape_fn(feed.len(), |i| {
            if feed[i] > 0.0 {
                feed[i] / e[i]
            } else {
                0.0
            }
        });
        let g: Vec<f64> = phi.iter().map(|p| 1.0 - (&w / p).sum()).collect();
        let active: Vec<usize> = (0..np).filter(|&k| beta[k] > 0.0 || g[k] < 0.0).collect();
        if active.is_empty() {
            break;
        }

        let q = &w / &e;
        let n = active.len();
        let mut hessian = Array2::from_shape_fn((n, n), |(a, b)| {
            (&q / &(&phi[active[a]] * &phi[active[b]])).sum()
        });
        // keeps the Hessian regular if two phases are identical
        for a in 0..n {
            hessian[[a, a]] *= 1.0 + 1e-12;
        }
        let rhs = Array1::from_shape_fn(n, |a| -g[active[a]]);
        let dx = LU::new(hessian)?.solve(&rhs);

        let mut d = Array1::zeros(np);
        for (a, &k) in active.iter().enumerate() {
            if beta[k] > 0.0 || dx[a] > 0.0 {
                d[k] = dx[a];
            }
        }

        // largest step that keeps all phase fractions non-negative
        let mut alpha: f64 = 1.0;
        for k in 0..np {
            if d[k] < 0.0 {
                alpha = alpha.min(-beta[k] / d[k]);
            }
        }

        let q0 = q_function(feed, &e, &beta);
        let mut beta_new;
        loop {
            beta_new = (&beta + &(alpha * &d)).mapv(|b| if b > 1e-15 { b } else { 0.0 });
            let q1 = q_function(feed, &weighted_inverse_sum(phi, &beta_new), &beta_new);
            if q1 <= q0 + 1e-14 || alpha < 1e-10 {
                break;
            }
            alpha *= 0.5;
        }
        beta = beta_new;
        if d.iter().fold(0.0, |acc: f64, v| acc.max((alpha * v).abs())) < TOL_Q {
            break;
        }
    }
    if !beta.iter().all(|b| b.is_finite()) || beta.sum() <= 0.0 {
        return Err(EosError::IterationFailed(String::from("phase_amounts")));
    }
    Ok(beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn phase_amounts_reproduce_rachford_rice() -> EosResult<()> {
        let feed = arr1(&[0.4, 0.6]);
        // phase 0 with phi = 1, phase 1 with phi = 1/K
        let phi = vec![arr1(&[1.0, 1.0]), arr1(&[1.0 / 3.0, 2.0])];
        let beta = phase_amounts(&feed, &phi, &arr1(&[0.5, 0.5]))?;
        assert_relative_eq!(beta[1], 0.5, max_relative = 1e-8);
        assert_relative_eq!(beta.sum(), 1.0, max_relative = 1e-8);
        Ok(())
    }

    #[test]
    fn vanishing_phase() -> EosResult<()> {
        let feed = arr1(&[0.4, 0.6]);
        // no split possible: the second phase is removed
        let phi = vec![arr1(&[1.0, 1.0]), arr1(&[1.2, 2.0])];
        let beta = phase_amounts(&feed, &phi, &arr1(&[0.5, 0.5]))?;
        assert!(beta[1] < 1e-12);
        assert_relative_eq!(beta[0], 1.0, max_relative = 1e-8);
        Ok(())
    }
}
