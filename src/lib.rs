//! `linfa-svm-bench` compares two kernel classifiers in a uniform, fair protocol: the
//! least-squares SVM of [`linfa-lssvm`](linfa_lssvm), solved with conjugate gradients, and the
//! classical SMO solved SVM of [`linfa-svm`](linfa_svm).
//!
//! ## The protocol
//!
//! Every experiment
//!
//! 1. loads a [dataset](datasets::DatasetSource) (Iris or two moons),
//! 2. [partitions](partition::partition) its rows into disjoint train and test sets,
//! 3. [standardizes](standardize::Standardizer) all rows with statistics of the training rows,
//! 4. trains the [model family](family::ModelFamily), either at fixed hyperparameters or after a
//!    cross-validated [search](search::SearchParams) over regularization and kernel width,
//! 5. [benchmarks](benchmarks::BenchmarkParams) training and prediction and
//! 6. [evaluates](evaluate::accuracy) the accuracy on the test rows.
//!
//! The result is an [`ExperimentRecord`](experiment::ExperimentRecord).
//!
//! ## Example
//!
//! ```rust,no_run
//! use linfa::ParamGuard;
//! use linfa_svm_bench::prelude::*;
//!
//! for family in ModelFamily::ALL {
//!     let record = ExperimentParams::new(DatasetSource::Iris, family)
//!         .search(SearchParams::new().random(50))
//!         .seed(42)
//!         .check()?
//!         .run()?;
//!
//!     println!("{}", record);
//! }
//! # Ok::<(), BenchError>(())
//! ```
//!
//! Both families are binary classifiers; multi-class problems are handled one-vs-rest, see
//! [`multi_class`]. Everything runs on a single thread.
//!
//! Memory figures are only collected when the
//! [`CountingAllocator`](benchmarks::alloc::CountingAllocator) is registered as
//! `#[global_allocator]`, otherwise they read zero.

pub mod benchmarks;
pub mod cross_validation;
pub mod datasets;
pub mod error;
pub mod evaluate;
pub mod experiment;
pub mod family;
pub mod hyperparams;
pub mod multi_class;
pub mod partition;
pub mod prelude;
pub mod search;
pub mod standardize;
pub mod trainer;

pub use error::{BenchError, Result};
