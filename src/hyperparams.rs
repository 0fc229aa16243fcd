//! Hyperparameter points and the bounded space they are drawn from
//!
//! Both model families are tuned over the same two axes: an intrinsic regularization weight
//! (`C` for the kernel SVM, `γ` for the LS-SVM) and the width of the Gaussian kernel.

use std::fmt;

use ndarray::Array1;
use rand::Rng;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// A point in the two dimensional hyperparameter space
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HyperPoint {
    pub regularization: f64,
    pub kernel_width: f64,
}

impl HyperPoint {
    pub fn new(regularization: f64, kernel_width: f64) -> Self {
        HyperPoint {
            regularization,
            kernel_width,
        }
    }

    /// Both coordinates have to be positive and finite
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("regularization", self.regularization),
            ("kernel width", self.kernel_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BenchError::InvalidArgument(format!(
                    "{} should be positive and finite, but is {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for HyperPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(regularization = {}, kernel width = {})",
            self.regularization, self.kernel_width
        )
    }
}

/// Closed interval `[lower, upper]` of a single hyperparameter
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ParamRange {
    lower: f64,
    upper: f64,
}

impl ParamRange {
    /// Fails unless `0 < lower < upper < inf`
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite()) || lower <= 0.0 || lower >= upper {
            return Err(BenchError::InvalidArgument(format!(
                "range [{}, {}] must satisfy 0 < lower < upper",
                lower, upper
            )));
        }

        Ok(ParamRange { lower, upper })
    }

    /// Re-check the bounds, e.g. of a deserialized range
    pub fn validate(&self) -> Result<()> {
        ParamRange::new(self.lower, self.upper).map(|_| ())
    }

    /// Bounds the caller already knows to be valid
    pub(crate) const fn from_bounds(lower: f64, upper: f64) -> Self {
        ParamRange { lower, upper }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// `n` evenly spaced values including both bounds
    ///
    /// A single value degenerates to the lower bound.
    pub fn linspace(&self, n: usize) -> Array1<f64> {
        if n == 1 {
            return Array1::from_elem(1, self.lower);
        }

        Array1::linspace(self.lower, self.upper, n).mapv(|x| x.clamp(self.lower, self.upper))
    }

    /// Uniform sample from the interval
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.lower..=self.upper)
    }
}

/// Axis aligned box spanned by a regularization and a kernel width range
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SearchSpace {
    pub regularization: ParamRange,
    pub kernel_width: ParamRange,
}

impl SearchSpace {
    pub fn new(regularization: ParamRange, kernel_width: ParamRange) -> Self {
        SearchSpace {
            regularization,
            kernel_width,
        }
    }

    /// Both ranges have to satisfy `0 < lower < upper < inf`
    pub fn validate(&self) -> Result<()> {
        self.regularization.validate()?;
        self.kernel_width.validate()
    }

    pub fn contains(&self, point: &HyperPoint) -> bool {
        self.regularization.contains(point.regularization)
            && self.kernel_width.contains(point.kernel_width)
    }
}

#[cfg(test)]
mod tests {
    use super::{HyperPoint, ParamRange, SearchSpace};
    use crate::error::BenchError;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn flipped_range_is_rejected() {
        assert!(matches!(
            ParamRange::new(2.0, 1.0),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(matches!(
            ParamRange::new(1.0, 1.0),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(matches!(
            ParamRange::new(0.0, 1.0),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(matches!(
            ParamRange::new(1.0, f64::INFINITY),
            Err(BenchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unchecked_bounds_fail_validation() {
        let valid = ParamRange::from_bounds(0.1, 10.0);
        let inverted = ParamRange::from_bounds(10.0, 0.1);

        assert!(valid.validate().is_ok());
        assert!(matches!(
            inverted.validate(),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(SearchSpace::new(valid, valid).validate().is_ok());
        assert!(SearchSpace::new(valid, inverted).validate().is_err());
        assert!(SearchSpace::new(inverted, valid).validate().is_err());
    }

    #[test]
    fn linspace_includes_bounds() {
        let range = ParamRange::new(0.5, 2.5).unwrap();
        let values = range.linspace(5);

        assert_eq!(values.len(), 5);
        assert_abs_diff_eq!(values[0], 0.5);
        assert_abs_diff_eq!(values[2], 1.5);
        assert_abs_diff_eq!(values[4], 2.5);
        assert!(values.iter().all(|x| range.contains(*x)));

        assert_eq!(range.linspace(1).to_vec(), vec![0.5]);
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let range = ParamRange::new(0.1, 0.2).unwrap();

        assert!((0..1000).all(|_| range.contains(range.sample(&mut rng))));
    }

    #[test]
    fn points_are_validated() {
        assert!(HyperPoint::new(1.0, 2.0).validate().is_ok());
        assert!(HyperPoint::new(0.0, 2.0).validate().is_err());
        assert!(HyperPoint::new(1.0, f64::NAN).validate().is_err());
    }
}
