//! Error types of the benchmark harness
//!

use thiserror::Error;

use crate::family::ModelFamily;
use crate::hyperparams::HyperPoint;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("training {family} at {point} failed: {reason}")]
    TrainingFailure {
        family: ModelFamily,
        point: HyperPoint,
        reason: String,
    },
    #[error("cross-validation fold {fold} contains no samples of class {label}")]
    EmptyFold { fold: usize, label: usize },
    #[error(transparent)]
    Linfa(#[from] linfa::Error),
}
