//! Merge binary models to a one-vs-rest multi-class classifier
//!
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{BenchError, Result};

/// Real valued decision function of a binary classifier
///
/// Positive values vote for the positive class, larger values mean more confidence.
pub trait DecisionFunction {
    fn decision_values(&self, records: ArrayView2<f64>) -> Array1<f64>;
}

/// Predicts labels of a dataset
///
/// This is the interface the evaluator and the benchmark pipeline work with, fitted models of
/// every family implement it.
pub trait Classifier {
    fn predict_labels(&self, records: ArrayView2<f64>) -> Result<Array1<usize>>;
}

/// One binary model per class, each trained to separate its class from all others
#[derive(Debug, Clone)]
pub struct OneVsRest<M> {
    classes: Vec<usize>,
    models: Vec<M>,
    nfeatures: usize,
}

impl<M> OneVsRest<M> {
    /// Combine `(label, model)` pairs
    ///
    /// Pairs are sorted by label, on equal decision values the smaller label wins.
    pub fn new(mut models: Vec<(usize, M)>, nfeatures: usize) -> Self {
        models.sort_by_key(|(label, _)| *label);
        let (classes, models) = models.into_iter().unzip();

        OneVsRest {
            classes,
            models,
            nfeatures,
        }
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn models(&self) -> &[M] {
        &self.models
    }

    pub fn nfeatures(&self) -> usize {
        self.nfeatures
    }
}

impl<M: DecisionFunction> OneVsRest<M> {
    /// Decision values with shape `(nclasses, nsamples)`
    pub fn scores(&self, records: ArrayView2<f64>) -> Array2<f64> {
        let mut scores = Array2::zeros((self.models.len(), records.nrows()));
        for (mut row, model) in scores.outer_iter_mut().zip(self.models.iter()) {
            row.assign(&model.decision_values(records));
        }

        scores
    }
}

impl<M: DecisionFunction> Classifier for OneVsRest<M> {
    fn predict_labels(&self, records: ArrayView2<f64>) -> Result<Array1<usize>> {
        if records.ncols() != self.nfeatures {
            return Err(BenchError::ShapeMismatch(format!(
                "model was trained with {} features, but records have {}",
                self.nfeatures,
                records.ncols()
            )));
        }
        if self.models.is_empty() {
            return Err(BenchError::InvalidArgument(
                "one-vs-rest model without classes".into(),
            ));
        }

        let scores = self.scores(records);
        let labels = scores
            .axis_iter(Axis(1))
            .map(|col| {
                let (best, _) = col.iter().enumerate().fold(
                    (0, f64::NEG_INFINITY),
                    |(best, max), (idx, val)| {
                        if *val > max {
                            (idx, *val)
                        } else {
                            (best, max)
                        }
                    },
                );
                self.classes[best]
            })
            .collect();

        Ok(labels)
    }
}
