//! # Least-Squares Support Vector Machines
//!
//! The least-squares formulation of the support vector machine (Suykens and Vandewalle, 1999)
//! replaces the hinge loss of the classical SVM with a squared error and the inequality
//! constraints with equalities. Instead of a quadratic program the dual becomes the linear system
//!
//! ```ignore
//! | 0   1ᵀ       | | b |   | 0 |
//! | 1   K + I/γ  | | α | = | y |
//! ```
//!
//! with `K` the kernel matrix of the training records and `y ∈ {-1, 1}` the binary targets.
//!
//! # The solver
//! `H = K + I/γ` is symmetric positive definite, so the system is split into two conjugate
//! gradient solves `Hη = 1` and `Hν = y`. The bias follows from the constraint `1ᵀα = 0` as
//! `b = 1ᵀν / 1ᵀη` and the dual coefficients as `α = ν - bη`. No matrix factorisation is needed,
//! which keeps the crate free of LAPACK.
//!
//! Unlike the SMO based [`linfa-svm`](https://docs.rs/linfa-svm) the solution is not sparse, every
//! training record contributes to the decision function.
//!
//! # Example
//! ```ignore
//! use linfa::prelude::*;
//! use linfa_lssvm::Lssvm;
//!
//! let (train, valid) = linfa_datasets::iris()
//!     .map_targets(|x| *x == 0)
//!     .split_with_ratio(0.7);
//!
//! let model = Lssvm::params()
//!     .gamma(10.0)
//!     .gaussian_kernel(4.0)
//!     .fit(&train)?;
//!
//! let cm = model.predict(&valid).confusion_matrix(&valid)?;
//! println!("accuracy {}", cm.accuracy());
//! ```
use linfa::Float;
use linfa_kernel::KernelMethod;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};

use std::fmt;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod classification;
pub mod error;
pub mod hyperparams;
pub mod solver_cg;

pub use error::{LssvmError, Result};
pub use hyperparams::{LssvmParams, LssvmValidParams, SolverParams};

/// Fitted Least-Squares Support Vector Machine
///
/// Holds the dual coefficients of every training record, the bias and the kernel method needed
/// to evaluate the decision function on new records.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Lssvm<F: Float> {
    alpha: Array1<F>,
    bias: F,
    support_vectors: Array2<F>,
    kernel_method: KernelMethod<F>,
    iterations: usize,
}

impl<F: Float> Lssvm<F> {
    /// Dual coefficients, one per training record
    pub fn alpha(&self) -> &Array1<F> {
        &self.alpha
    }

    pub fn bias(&self) -> F {
        self.bias
    }

    /// Conjugate gradient steps spent on both linear systems
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn kernel_method(&self) -> &KernelMethod<F> {
        &self.kernel_method
    }

    /// Number of features the model was trained with
    pub fn nfeatures(&self) -> usize {
        self.support_vectors.ncols()
    }

    /// Evaluates `Σ α_i K(x_i, sample) + b` for a single sample
    ///
    /// ## Panics
    ///
    /// If the length of `sample` differs from the number of training features
    pub fn decision_value<D: Data<Elem = F>>(&self, sample: &ArrayBase<D, Ix1>) -> F {
        self.support_vectors
            .outer_iter()
            .zip(self.alpha.iter())
            .map(|(x, a)| self.kernel_method.distance(x, sample.view()) * *a)
            .sum::<F>()
            + self.bias
    }

    /// Evaluates the decision function for every row of `records`
    pub fn decision_function<D: Data<Elem = F>>(&self, records: &ArrayBase<D, Ix2>) -> Array1<F> {
        records
            .outer_iter()
            .map(|x| self.decision_value(&x))
            .collect()
    }
}

impl<F: Float> fmt::Display for Lssvm<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LS-SVM with {} support vectors and bias {} after {} iterations",
            self.alpha.len(),
            self.bias,
            self.iterations
        )
    }
}
