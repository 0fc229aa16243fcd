//! Benchmark datasets
//!
//! Iris is taken from `linfa-datasets`, two interleaving half circles are generated with the
//! random number generator handed in by the caller.

use std::f64::consts::PI;
use std::fmt;

use linfa::Dataset;
use ndarray::{concatenate, Array, Array1, Array2, Axis, Ix1};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Named dataset provider
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DatasetSource {
    /// 150 iris flowers with four features and three species
    Iris,
    /// Two interleaving half circles with Gaussian noise of standard deviation `noise`
    TwoMoons { samples: usize, noise: f64 },
}

impl DatasetSource {
    pub fn name(&self) -> &'static str {
        match self {
            DatasetSource::Iris => "iris",
            DatasetSource::TwoMoons { .. } => "two-moons",
        }
    }

    /// Load or generate the dataset
    pub fn load<R: Rng>(&self, rng: &mut R) -> Result<Dataset<f64, usize, Ix1>> {
        match *self {
            DatasetSource::Iris => Ok(linfa_datasets::iris()),
            DatasetSource::TwoMoons { samples, noise } => two_moons(samples, noise, rng),
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Iris => write!(f, "iris"),
            DatasetSource::TwoMoons { samples, noise } => {
                write!(f, "two-moons ({} samples, noise {})", samples, noise)
            }
        }
    }
}

/// Generate two interleaving half circles
///
/// The first `samples / 2` points lie on the upper unit half circle and are labeled `0`, the
/// remaining points lie on the lower half circle shifted by `(1, -0.5)` and are labeled `1`.
/// Each coordinate is perturbed by Gaussian noise with standard deviation `noise`.
pub fn two_moons<R: Rng>(
    samples: usize,
    noise: f64,
    rng: &mut R,
) -> Result<Dataset<f64, usize, Ix1>> {
    if samples < 2 {
        return Err(BenchError::InvalidArgument(format!(
            "two moons need at least two samples, but got {}",
            samples
        )));
    }
    if !noise.is_finite() || noise < 0.0 {
        return Err(BenchError::InvalidArgument(format!(
            "noise must be a finite non-negative number, but is {}",
            noise
        )));
    }

    let nouter = samples / 2;
    let ninner = samples - nouter;

    let outer = half_circle(nouter, |t| [t.cos(), t.sin()]);
    let inner = half_circle(ninner, |t| [1.0 - t.cos(), 0.5 - t.sin()]);

    let mut records = concatenate(Axis(0), &[outer.view(), inner.view()])
        .map_err(|err| BenchError::ShapeMismatch(err.to_string()))?;
    if noise > 0.0 {
        let distribution = Normal::new(0.0, noise)
            .map_err(|err| BenchError::InvalidArgument(err.to_string()))?;
        records += &Array::random_using(records.dim(), distribution, rng);
    }

    let targets = Array1::from_shape_fn(samples, |i| usize::from(i >= nouter));

    Ok(Dataset::new(records, targets).with_feature_names(vec!["x", "y"]))
}

fn half_circle(n: usize, point: impl Fn(f64) -> [f64; 2]) -> Array2<f64> {
    let mut out = Array2::zeros((n, 2));
    for (mut row, t) in out.outer_iter_mut().zip(Array1::linspace(0.0, PI, n)) {
        let [x, y] = point(t);
        row[0] = x;
        row[1] = y;
    }

    out
}
