use linfa::dataset::{AsSingleTargets, DatasetBase};
use linfa::traits::{Fit, PredictInplace};
use linfa::Float;
use linfa_kernel::KernelMethod;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

use crate::error::{LssvmError, Result};
use crate::hyperparams::LssvmValidParams;
use crate::solver_cg;
use crate::Lssvm;

/// Dense kernel matrix of `records`, only the upper triangle is evaluated
fn kernel_matrix<F: Float, D: Data<Elem = F>>(
    records: &ArrayBase<D, Ix2>,
    method: &KernelMethod<F>,
) -> Array2<F> {
    let n = records.nrows();
    let mut kernel = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let val = method.distance(records.row(i), records.row(j));
            kernel[(i, j)] = val;
            kernel[(j, i)] = val;
        }
    }

    kernel
}

/// Fit binary classification problem
///
/// Positive targets are encoded as `+1` and negative targets as `-1`. The model predicts `true`
/// whenever the decision function is non-negative.
impl<F, D, T> Fit<ArrayBase<D, Ix2>, T, LssvmError> for LssvmValidParams<F>
where
    F: Float,
    D: Data<Elem = F>,
    T: AsSingleTargets<Elem = bool>,
{
    type Object = Lssvm<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let records = dataset.records();
        let targets = dataset.as_single_targets();
        let nsamples = records.nrows();

        if nsamples < 2 {
            return Err(LssvmError::NotEnoughSamples(nsamples));
        }
        if targets.len() != nsamples {
            return Err(linfa::Error::Parameters(format!(
                "{} records but {} targets",
                nsamples,
                targets.len()
            ))
            .into());
        }

        let mut system = kernel_matrix(records, self.kernel_method());
        let ridge = F::one() / self.gamma();
        system.diag_mut().mapv_inplace(|x| x + ridge);

        let y = targets.mapv(|t| if t { F::one() } else { -F::one() });
        let ones = Array1::ones(nsamples);

        let eta = solver_cg::solve(system.view(), ones.view(), self.solver_params())?;
        let nu = solver_cg::solve(system.view(), y.view(), self.solver_params())?;

        let eta_sum = eta.x.sum();
        if !eta_sum.is_finite() || eta_sum <= F::zero() {
            return Err(LssvmError::Degenerate(format!(
                "bias denominator is {}",
                eta_sum
            )));
        }

        let bias = nu.x.sum() / eta_sum;
        let alpha = &nu.x - &(eta.x * bias);

        Ok(Lssvm {
            alpha,
            bias,
            support_vectors: records.to_owned(),
            kernel_method: self.kernel_method().clone(),
            iterations: eta.iterations + nu.iterations,
        })
    }
}

/// Classify observations
///
/// Returns `true` for records on the positive side of the decision function.
impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<bool>> for Lssvm<F> {
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<bool>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.nfeatures(),
            "Number of data features must match the number of features the model was trained with."
        );

        for (row, out) in x.outer_iter().zip(y.iter_mut()) {
            *out = self.decision_value(&row) >= F::zero();
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<bool> {
        Array1::from_elem(x.nrows(), false)
    }
}
