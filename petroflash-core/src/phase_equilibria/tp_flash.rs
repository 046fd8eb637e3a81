use crate::errors::{EosError, EosResult};
use ndarray::Array1;

const MAX_ITER_RR: usize = 50;
const ABS_TOL_RR: f64 = 1e-14;

/// Solve the Rachford-Rice equation for the fraction of the phase with
/// composition $y_i=K_ix_i$.
///
/// Returns an error if no root exists in the open interval $(0,1)$.
pub(super) fn rachford_rice(
    feed: &Array1<f64>,
    k: &Array1<f64>,
    beta_in: Option<f64>,
) -> EosResult<f64> {
    // check if solution exists
    let (mut beta_min, mut beta_max) = if (feed * k).sum() > 1.0
        && (feed / k).iter().filter(|x| !x.is_nan()).sum::<f64>() > 1.0
    {
        (0.0_f64, 1.0_f64)
    } else {
        return Err(EosError::IterationFailed(String::from("rachford_rice")));
    };

    // look for tighter bounds
    for (&k, &f) in k.iter().zip(feed.iter()).filter(|(_, &f)| f > 0.0) {
        if k > 1.0 {
            beta_min = beta_min.max((k * f - 1.0) / (k - 1.0));
        }
        if k < 1.0 {
            beta_max = beta_max.min((1.0 - f) / (1.0 - k));
        }
    }

    let mut beta = 0.5 * (beta_min + beta_max);
    if let Some(b) = beta_in {
        if b > beta_min && b < beta_max {
            beta = b;
        }
    }

    for _ in 0..MAX_ITER_RR {
        let frac = (k - 1.0) / (1.0 - beta + beta * k);
        let g = (feed * &frac).sum();
        let dg = -(feed * &frac * &frac).sum();
        if g > 0.0 {
            beta_min = beta;
        } else {
            beta_max = beta;
        }

        let dbeta = g / dg;
        beta -= dbeta;

        if beta <= beta_min || beta >= beta_max {
            beta = 0.5 * (beta_min + beta_max);
        }
        if dbeta.abs() < ABS_TOL_RR || beta_max - beta_min < ABS_TOL_RR {
            return Ok(beta);
        }
    }

    Ok(beta)
}

/// Compositions of both phases for a given vapor fraction.
pub(super) fn split_compositions(
    feed: &Array1<f64>,
    k: &Array1<f64>,
    beta: f64,
) -> (Array1<f64>, Array1<f64>) {
    let x = feed / &(1.0 + beta * (k - 1.0));
    let y = &x * k;
    (&x / x.sum(), &y / y.sum())
}
