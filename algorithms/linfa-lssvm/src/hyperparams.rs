use crate::{Lssvm, LssvmError};
use linfa::{Float, ParamGuard};
use linfa_kernel::KernelMethod;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Solver settings of the conjugate gradient iteration
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams<F: Float> {
    /// Relative residual `‖r‖ / ‖b‖` at which the iteration stops
    pub tolerance: F,
    /// Hard limit on conjugate gradient steps per linear system
    pub max_iterations: usize,
}

/// LS-SVM Hyperparameters
///
/// The least-squares formulation replaces the inequality constraints of the classical SVM with
/// equality constraints. Every training sample therefore becomes a support vector and training
/// reduces to a single symmetric positive definite linear system, which is solved here with
/// conjugate gradients.
///
/// `gamma` weighs the squared error term against the regularizer, large values fit the training
/// data more closely.
///
/// ## Example
///
/// ```ignore
/// use linfa_lssvm::Lssvm;
/// let model = Lssvm::params()
///     .gamma(10.0)
///     .gaussian_kernel(2.0)
///     .fit(&dataset)?;
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LssvmValidParams<F: Float> {
    gamma: F,
    kernel: KernelMethod<F>,
    solver_params: SolverParams<F>,
}

impl<F: Float> LssvmValidParams<F> {
    pub fn gamma(&self) -> F {
        self.gamma
    }

    pub fn kernel_method(&self) -> &KernelMethod<F> {
        &self.kernel
    }

    pub fn solver_params(&self) -> &SolverParams<F> {
        &self.solver_params
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LssvmParams<F: Float>(LssvmValidParams<F>);

impl<F: Float> LssvmParams<F> {
    /// Create hyper parameter set
    ///
    /// This creates a `LssvmParams` and sets it to the default values:
    ///  * gamma of 1
    ///  * Gaussian kernel with width 1
    ///  * relative tolerance of 1e-8
    ///  * at most 10000 iterations
    pub fn new() -> Self {
        Self(LssvmValidParams {
            gamma: F::one(),
            kernel: KernelMethod::Gaussian(F::one()),
            solver_params: SolverParams {
                tolerance: F::cast(1e-8),
                max_iterations: 10_000,
            },
        })
    }

    /// Set the regularization weight of the squared errors
    pub fn gamma(mut self, gamma: F) -> Self {
        self.0.gamma = gamma;
        self
    }

    /// Sets the model to use the Gaussian kernel. For this kernel the
    /// distance between two points is computed as: `d(x, x') = exp(-norm(x - x')/eps)`
    pub fn gaussian_kernel(mut self, eps: F) -> Self {
        self.0.kernel = KernelMethod::Gaussian(eps);
        self
    }

    /// Sets the model to use the Linear kernel. For this kernel the
    /// distance between two points is computed as : `d(x, x') = <x, x'>`
    pub fn linear_kernel(mut self) -> Self {
        self.0.kernel = KernelMethod::Linear;
        self
    }

    /// Use an arbitrary kernel method
    pub fn with_kernel_method(mut self, kernel: KernelMethod<F>) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Set stopping condition
    ///
    /// The iteration stops once the residual norm relative to the right-hand side drops below
    /// this threshold.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.solver_params.tolerance = tolerance;
        self
    }

    /// Set the maximal number of conjugate gradient steps per solve
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.0.solver_params.max_iterations = max_iterations;
        self
    }
}

impl<F: Float> Default for LssvmParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Lssvm<F> {
    pub fn params() -> LssvmParams<F> {
        LssvmParams::new()
    }
}

impl<F: Float> ParamGuard for LssvmParams<F> {
    type Checked = LssvmValidParams<F>;
    type Error = LssvmError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let gamma = self.0.gamma;
        if gamma <= F::zero() || !gamma.is_finite() {
            return Err(LssvmError::InvalidGamma(gamma.to_f32().unwrap_or(f32::NAN)));
        }

        let tolerance = self.0.solver_params.tolerance;
        if tolerance <= F::zero() || !tolerance.is_finite() {
            return Err(LssvmError::InvalidTolerance(
                tolerance.to_f32().unwrap_or(f32::NAN),
            ));
        }

        if self.0.solver_params.max_iterations == 0 {
            return Err(LssvmError::InvalidMaxIterations);
        }

        if let KernelMethod::Gaussian(eps) = self.0.kernel {
            if eps <= F::zero() || !eps.is_finite() {
                return Err(LssvmError::InvalidKernelWidth(
                    eps.to_f32().unwrap_or(f32::NAN),
                ));
            }
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
