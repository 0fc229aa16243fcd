//! Conjugate gradient solver for symmetric positive definite systems
//!
use crate::error::{LssvmError, Result};
use crate::hyperparams::SolverParams;
use linfa::Float;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Solution of a single linear system
#[derive(Debug, Clone)]
pub struct Solution<F: Float> {
    pub x: Array1<F>,
    pub iterations: usize,
    pub residual: F,
}

/// Solve `A x = b` for a symmetric positive definite `A`
///
/// Starts from `x = 0` and stops once `‖r‖ <= tolerance * ‖b‖`. A step with non-positive
/// curvature `pᵀAp` means that `A` is not positive definite, which is reported as degenerate
/// instead of continuing with a meaningless direction.
pub fn solve<F: Float>(
    a: ArrayView2<F>,
    b: ArrayView1<F>,
    params: &SolverParams<F>,
) -> Result<Solution<F>> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(LssvmError::Degenerate(format!(
            "system matrix has shape {:?}, but right-hand side has length {}",
            a.dim(),
            n
        )));
    }

    let mut x = Array1::zeros(n);
    let b_norm = b.dot(&b).sqrt();
    if b_norm == F::zero() {
        return Ok(Solution {
            x,
            iterations: 0,
            residual: F::zero(),
        });
    }

    let threshold = params.tolerance * b_norm;
    let mut r = b.to_owned();
    let mut p = r.clone();
    let mut rs_old = r.dot(&r);

    for iteration in 1..=params.max_iterations {
        let ap = a.dot(&p);
        let curvature = p.dot(&ap);
        if !curvature.is_finite() || curvature <= F::zero() {
            return Err(LssvmError::Degenerate(format!(
                "non-positive curvature {} in iteration {}",
                curvature, iteration
            )));
        }

        let step = rs_old / curvature;
        x.scaled_add(step, &p);
        r.scaled_add(-step, &ap);

        let rs_new = r.dot(&r);
        if !rs_new.is_finite() {
            return Err(LssvmError::Degenerate(format!(
                "residual diverged in iteration {}",
                iteration
            )));
        }

        if rs_new.sqrt() <= threshold {
            return Ok(Solution {
                x,
                iterations: iteration,
                residual: rs_new.sqrt() / b_norm,
            });
        }

        let beta = rs_new / rs_old;
        p = &r + &(p * beta);
        rs_old = rs_new;
    }

    Err(LssvmError::NotConverged {
        iterations: params.max_iterations,
        residual: (rs_old.sqrt() / b_norm).to_f32().unwrap_or(f32::NAN),
    })
}

#[cfg(test)]
mod tests {
    use super::solve;
    use crate::error::LssvmError;
    use crate::hyperparams::SolverParams;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn params(max_iterations: usize) -> SolverParams<f64> {
        SolverParams {
            tolerance: 1e-12,
            max_iterations,
        }
    }

    #[test]
    fn solves_small_spd_system() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let b = array![1.0, 2.0];

        let sol = solve(a.view(), b.view(), &params(100)).unwrap();

        assert_abs_diff_eq!(sol.x, array![1. / 11., 7. / 11.], epsilon = 1e-10);
        assert!(sol.iterations <= 2);
    }

    #[test]
    fn zero_rhs_needs_no_iterations() {
        let a = array![[2.0, 0.0], [0.0, 2.0]];
        let b = Array1::zeros(2);

        let sol = solve(a.view(), b.view(), &params(10)).unwrap();
        assert_eq!(sol.iterations, 0);
        assert_abs_diff_eq!(sol.x, Array1::zeros(2));
    }

    #[test]
    fn indefinite_matrix_is_degenerate() {
        let a = array![[1.0, 0.0], [0.0, -1.0]];
        let b = array![0.0, 1.0];

        let res = solve(a.view(), b.view(), &params(10));
        assert!(matches!(res, Err(LssvmError::Degenerate(_))));
    }

    #[test]
    fn iteration_limit_is_reported() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = array![1.0, 2.0, 3.0];

        let res = solve(a.view(), b.view(), &params(1));
        assert!(matches!(
            res,
            Err(LssvmError::NotConverged { iterations: 1, .. })
        ));
    }
}
