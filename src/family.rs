//! Model families compared by the benchmark
//!
//! Every family is a binary kernel machine lifted to multi-class problems with
//! [`OneVsRest`](crate::multi_class::OneVsRest). Dispatch happens on the [`ModelFamily`] tag,
//! fitted models are stored in the matching [`FittedModel`] variant.

use std::collections::BTreeSet;
use std::fmt;

use linfa::dataset::DatasetBase;
use linfa::traits::Fit;
use linfa_lssvm::Lssvm;
use linfa_svm::Svm;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::hyperparams::{HyperPoint, ParamRange, SearchSpace};
use crate::multi_class::{Classifier, DecisionFunction, OneVsRest};

/// Supported classifier families
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelFamily {
    /// Least-squares SVM solved with conjugate gradients
    Lssvm,
    /// C-SVM solved with sequential minimal optimization
    KernelSvm,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 2] = [ModelFamily::Lssvm, ModelFamily::KernelSvm];

    /// Hyperparameters used when training without search
    ///
    /// A kernel width equal to the number of features corresponds to libSVM's default
    /// `gamma = 1 / nfeatures`.
    pub fn default_point(&self, nfeatures: usize) -> HyperPoint {
        HyperPoint::new(1.0, nfeatures.max(1) as f64)
    }

    /// Bounded region explored by the hyperparameter search
    pub fn search_space(&self) -> SearchSpace {
        match self {
            ModelFamily::Lssvm | ModelFamily::KernelSvm => SearchSpace::new(
                ParamRange::from_bounds(0.1, 100.0),
                ParamRange::from_bounds(0.1, 10.0),
            ),
        }
    }

    /// Fit a multi-class classifier at `point`
    ///
    /// Requires at least two classes among `targets`. Solver errors of a family are converted
    /// into [`BenchError::TrainingFailure`] carrying the offending point.
    pub fn fit(
        &self,
        records: ArrayView2<f64>,
        targets: ArrayView1<usize>,
        point: HyperPoint,
    ) -> Result<FittedModel> {
        if records.nrows() != targets.len() {
            return Err(BenchError::ShapeMismatch(format!(
                "{} records but {} targets",
                records.nrows(),
                targets.len()
            )));
        }
        point.validate()?;

        let classes = targets.iter().copied().collect::<BTreeSet<_>>();
        if classes.len() < 2 {
            return Err(BenchError::InvalidArgument(format!(
                "at least two classes are required for training, but found {}",
                classes.len()
            )));
        }

        let nfeatures = records.ncols();
        let failure = |reason: String| BenchError::TrainingFailure {
            family: *self,
            point,
            reason,
        };

        match self {
            ModelFamily::Lssvm => {
                let params = Lssvm::params()
                    .gamma(point.regularization)
                    .gaussian_kernel(point.kernel_width);

                let models = classes
                    .iter()
                    .map(|&class| {
                        let dataset = binary_dataset(records, targets, class);
                        params
                            .fit(&dataset)
                            .map(|model| (class, model))
                            .map_err(|err| failure(err.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(FittedModel::Lssvm(OneVsRest::new(models, nfeatures)))
            }
            ModelFamily::KernelSvm => {
                let params = Svm::<f64, bool>::params()
                    .pos_neg_weights(point.regularization, point.regularization)
                    .gaussian_kernel(point.kernel_width);

                let models = classes
                    .iter()
                    .map(|&class| {
                        let dataset = binary_dataset(records, targets, class);
                        let model = params
                            .fit(&dataset)
                            .map_err(|err| failure(err.to_string()))?;
                        if !model.rho.is_finite() {
                            return Err(failure(format!(
                                "solver returned non-finite offset {}",
                                model.rho
                            )));
                        }

                        Ok((class, model))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(FittedModel::KernelSvm(OneVsRest::new(models, nfeatures)))
            }
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Lssvm => write!(f, "LS-SVM"),
            ModelFamily::KernelSvm => write!(f, "kernel SVM"),
        }
    }
}

/// Targets of `class` become `true`, every other class `false`
fn binary_dataset(
    records: ArrayView2<f64>,
    targets: ArrayView1<usize>,
    class: usize,
) -> DatasetBase<Array2<f64>, Array1<bool>> {
    DatasetBase::new(records.to_owned(), targets.mapv(|t| t == class))
}

impl DecisionFunction for Lssvm<f64> {
    fn decision_values(&self, records: ArrayView2<f64>) -> Array1<f64> {
        self.decision_function(&records)
    }
}

impl DecisionFunction for Svm<f64, bool> {
    fn decision_values(&self, records: ArrayView2<f64>) -> Array1<f64> {
        records
            .outer_iter()
            .map(|x| self.weighted_sum(&x) - self.rho)
            .collect()
    }
}

/// Trained classifier of one of the model families
///
/// Immutable after training, only used for prediction.
pub enum FittedModel {
    Lssvm(OneVsRest<Lssvm<f64>>),
    KernelSvm(OneVsRest<Svm<f64, bool>>),
}

impl FittedModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            FittedModel::Lssvm(_) => ModelFamily::Lssvm,
            FittedModel::KernelSvm(_) => ModelFamily::KernelSvm,
        }
    }

    pub fn classes(&self) -> &[usize] {
        match self {
            FittedModel::Lssvm(model) => model.classes(),
            FittedModel::KernelSvm(model) => model.classes(),
        }
    }

    pub fn nfeatures(&self) -> usize {
        match self {
            FittedModel::Lssvm(model) => model.nfeatures(),
            FittedModel::KernelSvm(model) => model.nfeatures(),
        }
    }
}

impl Classifier for FittedModel {
    fn predict_labels(&self, records: ArrayView2<f64>) -> Result<Array1<usize>> {
        match self {
            FittedModel::Lssvm(model) => model.predict_labels(records),
            FittedModel::KernelSvm(model) => model.predict_labels(records),
        }
    }
}

impl fmt::Debug for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedModel")
            .field("family", &self.family())
            .field("classes", &self.classes())
            .field("nfeatures", &self.nfeatures())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ModelFamily;
    use crate::error::BenchError;
    use crate::hyperparams::HyperPoint;
    use crate::multi_class::Classifier;
    use ndarray::{array, Array2};

    fn three_clusters() -> (Array2<f64>, ndarray::Array1<usize>) {
        let records = array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [4.0, 4.0],
            [4.2, 3.9],
            [3.8, 4.1],
            [0.0, 4.0],
            [0.2, 4.2],
            [-0.1, 3.9]
        ];
        let targets = array![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (records, targets)
    }

    #[test]
    fn both_families_separate_clusters() {
        let (records, targets) = three_clusters();

        for family in ModelFamily::ALL {
            let model = family
                .fit(records.view(), targets.view(), HyperPoint::new(10.0, 2.0))
                .unwrap();

            assert_eq!(model.family(), family);
            assert_eq!(model.classes(), &[0, 1, 2]);
            assert_eq!(model.predict_labels(records.view()).unwrap(), targets);
        }
    }

    #[test]
    fn single_class_is_rejected() {
        let records = array![[0.0], [1.0]];
        let targets = array![3, 3];

        let res = ModelFamily::Lssvm.fit(records.view(), targets.view(), HyperPoint::new(1., 1.));
        assert!(matches!(res, Err(BenchError::InvalidArgument(_))));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let records = array![[0.0], [1.0], [2.0]];
        let targets = array![0, 1];

        let res =
            ModelFamily::KernelSvm.fit(records.view(), targets.view(), HyperPoint::new(1., 1.));
        assert!(matches!(res, Err(BenchError::ShapeMismatch(_))));
    }

    #[test]
    fn solver_failure_carries_point() {
        let (mut records, targets) = three_clusters();
        records[(4, 1)] = f64::NAN;
        let point = HyperPoint::new(1.0, 1.0);

        match ModelFamily::Lssvm.fit(records.view(), targets.view(), point) {
            Err(BenchError::TrainingFailure {
                family,
                point: failed,
                ..
            }) => {
                assert_eq!(family, ModelFamily::Lssvm);
                assert_eq!(failed, point);
            }
            other => panic!("expected training failure, got {:?}", other),
        }
    }

    #[test]
    fn invalid_point_is_rejected() {
        let (records, targets) = three_clusters();
        let res = ModelFamily::KernelSvm.fit(
            records.view(),
            targets.view(),
            HyperPoint::new(-1.0, 1.0),
        );

        assert!(matches!(res, Err(BenchError::InvalidArgument(_))));
    }
}
