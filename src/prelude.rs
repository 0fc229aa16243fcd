//! Benchmark prelude.
//!
//! This module contains the most used types and traits of the harness that you can import
//! easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{BenchError, Result};

#[doc(no_inline)]
pub use crate::benchmarks::{BenchmarkParams, BenchmarkResult, Budget};

#[doc(no_inline)]
pub use crate::datasets::DatasetSource;

#[doc(no_inline)]
pub use crate::evaluate::{accuracy, evaluate};

#[doc(no_inline)]
pub use crate::experiment::{ExperimentParams, ExperimentRecord};

#[doc(no_inline)]
pub use crate::family::{FittedModel, ModelFamily};

#[doc(no_inline)]
pub use crate::hyperparams::{HyperPoint, ParamRange, SearchSpace};

#[doc(no_inline)]
pub use crate::multi_class::{Classifier, DecisionFunction};

#[doc(no_inline)]
pub use crate::partition::{partition, Split};

#[doc(no_inline)]
pub use crate::search::{SearchOutcome, SearchParams, SearchStrategy};

#[doc(no_inline)]
pub use crate::standardize::{FittedStandardizer, Standardizer};

#[doc(no_inline)]
pub use crate::trainer::{TrainedModel, TrainerParams};
