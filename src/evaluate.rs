//! Classification accuracy of fitted models
//!
use ndarray::{ArrayView1, ArrayView2};

use crate::error::{BenchError, Result};
use crate::multi_class::Classifier;

/// Fraction of exactly matching labels
pub fn accuracy(predicted: ArrayView1<usize>, truth: ArrayView1<usize>) -> Result<f64> {
    if predicted.len() != truth.len() {
        return Err(BenchError::ShapeMismatch(format!(
            "{} predictions but {} ground truth labels",
            predicted.len(),
            truth.len()
        )));
    }
    if truth.is_empty() {
        return Err(BenchError::InvalidArgument(
            "accuracy of an empty set is undefined".into(),
        ));
    }

    let matches = predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();

    Ok(matches as f64 / truth.len() as f64)
}

/// Predicts `records` with `model` and compares against `targets`
pub fn evaluate<C: Classifier + ?Sized>(
    model: &C,
    records: ArrayView2<f64>,
    targets: ArrayView1<usize>,
) -> Result<f64> {
    if records.nrows() != targets.len() {
        return Err(BenchError::ShapeMismatch(format!(
            "{} records but {} targets",
            records.nrows(),
            targets.len()
        )));
    }

    let predicted = model.predict_labels(records)?;
    accuracy(predicted.view(), targets)
}
