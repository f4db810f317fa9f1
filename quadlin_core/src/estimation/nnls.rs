// quadlin_core/src/estimation/nnls.rs

use crate::error::EstimationError;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Solves `min ||A x - b||^2` subject to `x >= 0` (Lawson-Hanson active set).
///
/// Returns the solution together with a flag telling whether any bound was
/// active at the optimum.
pub fn solve_nonnegative_least_squares(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<(DVector<f64>, bool), EstimationError> {
    let (m, n) = a.shape();
    if b.nrows() != m {
        return Err(EstimationError::ShapeMismatch {
            commands: m,
            rows: b.nrows(),
        });
    }

    let mut x = DVector::zeros(n);
    let mut passive = vec![false; n];
    // Only the dual vector is compared against `tol`; coefficients are tested
    // against zero since their scale is unrelated to the gradient's. `tol`
    // scales with both `A` and `b`, so tiny responses are not clamped.
    let tol = 10.0 * f64::EPSILON * a.norm() * b.norm() * (m.max(n) as f64);
    let max_outer = 3 * n.max(1);

    // Dual vector (negative gradient of the objective).
    let mut w = a.transpose() * (b - a * &x);

    for outer in 0..max_outer {
        // 1. Pick the most promising variable still held at its bound.
        let candidate = (0..n)
            .filter(|&j| !passive[j] && w[j] > tol)
            .max_by(|&i, &j| w[i].total_cmp(&w[j]));
        let Some(t) = candidate else {
            break;
        };
        passive[t] = true;
        debug!(outer, freed = t, "nnls: releasing bound");

        // 2. Solve unconstrained on the passive set, stepping back while any
        //    passive coefficient would go non-positive.
        loop {
            let z = solve_on_passive_set(a, b, &passive)?;
            let blocked: Vec<usize> = (0..n).filter(|&j| passive[j] && z[j] <= 0.0).collect();
            if blocked.is_empty() {
                x = z;
                break;
            }

            // Step towards z until the first blocked coefficient reaches zero.
            let (limiting, alpha) = blocked
                .iter()
                .map(|&j| {
                    let step = if x[j] <= 0.0 { 0.0 } else { x[j] / (x[j] - z[j]) };
                    (j, step)
                })
                .fold((blocked[0], f64::INFINITY), |best, cur| {
                    if cur.1 < best.1 {
                        cur
                    } else {
                        best
                    }
                });
            x += (z - &x) * alpha;
            x[limiting] = 0.0;
            for j in 0..n {
                if passive[j] && x[j] <= 0.0 {
                    x[j] = 0.0;
                    passive[j] = false;
                }
            }
            if !passive.iter().any(|&p| p) {
                break;
            }
        }

        w = a.transpose() * (b - a * &x);
    }

    let bound_active = (0..n).any(|j| !passive[j]);
    Ok((x, bound_active))
}

/// Least squares restricted to the passive columns; other coefficients are zero.
fn solve_on_passive_set(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    passive: &[bool],
) -> Result<DVector<f64>, EstimationError> {
    let columns: Vec<usize> = (0..passive.len()).filter(|&j| passive[j]).collect();
    let mut z = DVector::zeros(passive.len());
    if columns.is_empty() {
        return Ok(z);
    }

    let a_p = a.select_columns(columns.iter());
    let solution = a_p
        .svd(true, true)
        .solve(b, f64::EPSILON)
        .map_err(|msg| EstimationError::Solver(msg.to_string()))?;

    for (k, &j) in columns.iter().enumerate() {
        z[j] = solution[k];
    }
    Ok(z)
}
