use thiserror::Error;

pub type Result<T> = std::result::Result<T, LssvmError>;

#[derive(Error, Debug)]
pub enum LssvmError {
    #[error("gamma should be positive and finite, but is {0}")]
    InvalidGamma(f32),
    #[error("tolerance should be positive and finite, but is {0}")]
    InvalidTolerance(f32),
    #[error("kernel width should be positive and finite, but is {0}")]
    InvalidKernelWidth(f32),
    #[error("maximal number of iterations must be bigger than 0")]
    InvalidMaxIterations,
    #[error("at least two samples are required, but got {0}")]
    NotEnoughSamples(usize),
    #[error("conjugate gradient did not converge after {iterations} iterations (residual {residual})")]
    NotConverged { iterations: usize, residual: f32 },
    #[error("system matrix is degenerate: {0}")]
    Degenerate(String),
    #[error(transparent)]
    BaseCrate(#[from] linfa::Error),
}
