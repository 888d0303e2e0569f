//! Lagrange interpolation at zero, in the scalar field or in the exponent.
//! See Boneh-Shoup, Sec 22.1.1 and Corollary 22.2.

use ark_ec::CurveGroup;
use ark_ff::{Field, batch_inversion};

use crate::SchemeError;

/// Given evaluation points `{x_i}` and evaluations `{y_i = f(x_i)}`, returns `f(0)`.
pub(crate) fn interpolate<C: CurveGroup>(
    eval_points: &[C::ScalarField],
    evals: &[C::ScalarField],
) -> Result<C::ScalarField, SchemeError> {
    check_points(eval_points, evals.len())?;
    let coeffs = lagrange_coeffs_at_zero(eval_points);
    Ok(coeffs.iter().zip(evals).map(|(l, y)| *l * *y).sum())
}

/// Given evaluation points `{x_i}` and evaluations in the exponent `{g^y_i}`, returns `g^f(0)`.
pub(crate) fn interpolate_in_exponent<C: CurveGroup>(
    eval_points: &[C::ScalarField],
    evals_in_exp: &[C::Affine],
) -> Result<C, SchemeError> {
    check_points(eval_points, evals_in_exp.len())?;
    let coeffs = lagrange_coeffs_at_zero(eval_points);
    C::msm(evals_in_exp, &coeffs)
        .map_err(|n| SchemeError::Internal(format!("msm length mismatch: {n}")))
}

fn check_points<F: Field>(eval_points: &[F], n: usize) -> Result<(), SchemeError> {
    if eval_points.is_empty() {
        return Err(SchemeError::NoShares);
    }
    if eval_points.len() != n {
        return Err(SchemeError::Internal(format!(
            "{} eval points for {n} evaluations",
            eval_points.len()
        )));
    }
    // zero or repeated points make the barycentric weights non-invertible
    for (i, x) in eval_points.iter().enumerate() {
        if x.is_zero() || eval_points[..i].contains(x) {
            return Err(SchemeError::Internal("degenerate eval points".to_string()));
        }
    }
    Ok(())
}

/// Barycentric Lagrange coefficients at 0 for the given eval points.
fn lagrange_coeffs_at_zero<F: Field>(eval_points: &[F]) -> Vec<F> {
    let n = eval_points.len();
    let mut w = vec![F::one(); n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                w[i] *= eval_points[i] - eval_points[j];
            }
        }
    }
    batch_inversion(&mut w);
    let l0 = eval_points.iter().fold(F::one(), |acc, x_i| acc * (-*x_i));
    eval_points
        .iter()
        .zip(w.iter())
        .map(|(x_i, w_i)| l0 * w_i / (-*x_i))
        .collect()
}
