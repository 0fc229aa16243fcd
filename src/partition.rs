//! Train/test partitioning of sample indices
//!
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use crate::error::{BenchError, Result};

/// Disjoint train and test indices covering `0..n` exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl Split {
    /// Partition `0..n` with an explicit random number generator
    ///
    /// The indices are permuted with `rng` when `shuffle` is set and kept in ascending order
    /// otherwise. The first `round(n * train_fraction)` indices form the training set.
    pub fn with_rng<R: Rng>(
        n: usize,
        train_fraction: f64,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self> {
        if n < 2 {
            return Err(BenchError::InvalidArgument(format!(
                "at least two samples are needed for a split, but got {}",
                n
            )));
        }
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(BenchError::InvalidArgument(format!(
                "train fraction must lie in (0, 1), but is {}",
                train_fraction
            )));
        }

        let mut indices = (0..n).collect::<Vec<_>>();
        if shuffle {
            indices.shuffle(rng);
        }

        let ntrain = (n as f64 * train_fraction).round() as usize;
        let test = indices.split_off(ntrain);

        Ok(Split {
            train: indices,
            test,
        })
    }

    /// Partition `0..n`, seeding the generator with `seed` or with OS entropy if absent
    pub fn new(n: usize, train_fraction: f64, shuffle: bool, seed: Option<u64>) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };

        Self::with_rng(n, train_fraction, shuffle, &mut rng)
    }

    pub fn train(&self) -> &[usize] {
        &self.train
    }

    pub fn test(&self) -> &[usize] {
        &self.test
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.train, self.test)
    }
}

/// Shorthand for [`Split::new`]
pub fn partition(n: usize, train_fraction: f64, shuffle: bool, seed: Option<u64>) -> Result<Split> {
    Split::new(n, train_fraction, shuffle, seed)
}

#[cfg(test)]
mod tests {
    use super::{partition, Split};
    use crate::error::BenchError;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;
    use std::collections::HashSet;

    #[test]
    fn covers_all_indices_once() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        for &(n, fraction) in &[(2, 0.5), (10, 0.3), (150, 0.6), (101, 0.75), (7, 0.01)] {
            let split = Split::with_rng(n, fraction, true, &mut rng).unwrap();

            let train = split.train().iter().copied().collect::<HashSet<_>>();
            let test = split.test().iter().copied().collect::<HashSet<_>>();

            assert_eq!(train.len(), split.train().len());
            assert_eq!(test.len(), split.test().len());
            assert!(train.is_disjoint(&test));
            assert_eq!(
                train.union(&test).copied().collect::<HashSet<_>>(),
                (0..n).collect::<HashSet<_>>()
            );
            assert_eq!(split.train().len(), (n as f64 * fraction).round() as usize);
        }
    }

    #[test]
    fn seeded_split_is_reproducible() {
        let a = partition(150, 0.6, true, Some(42)).unwrap();
        let b = partition(150, 0.6, true, Some(42)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.train().len(), 90);
        assert_eq!(a.test().len(), 60);
    }

    #[test]
    fn without_shuffle_keeps_order() {
        let split = Split::new(5, 0.6, false, None).unwrap();

        assert_eq!(split.train(), &[0, 1, 2]);
        assert_eq!(split.test(), &[3, 4]);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                Split::new(10, fraction, true, Some(0)),
                Err(BenchError::InvalidArgument(_))
            ));
        }

        assert!(matches!(
            Split::new(1, 0.5, true, Some(0)),
            Err(BenchError::InvalidArgument(_))
        ));
    }
}
