//! K-fold assignment and cross-validated scoring
//!
use std::collections::BTreeSet;

use ndarray::{ArrayView1, ArrayView2, Axis};
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::evaluate::evaluate;
use crate::family::ModelFamily;
use crate::hyperparams::HyperPoint;

/// Partition of a set of sample indices into `k` disjoint folds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KFold {
    folds: Vec<Vec<usize>>,
}

impl KFold {
    /// Split `indices` into `k` contiguous folds
    ///
    /// The first `len % k` folds receive one extra sample.
    pub fn sequential(indices: &[usize], k: usize) -> Result<Self> {
        check_k(indices.len(), k)?;

        let base = indices.len() / k;
        let extra = indices.len() % k;
        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            folds.push(indices[start..start + size].to_vec());
            start += size;
        }

        Ok(KFold { folds })
    }

    /// Split `indices` into `k` folds with approximately equal class proportions
    ///
    /// Indices are ordered by their label (ties keep the input order) and dealt out round-robin,
    /// so fold sizes differ by at most one and every class is spread evenly.
    pub fn stratified(indices: &[usize], labels: ArrayView1<usize>, k: usize) -> Result<Self> {
        check_k(indices.len(), k)?;
        check_indices(indices, labels.len())?;

        let mut ordered = indices.to_vec();
        ordered.sort_by_key(|&idx| labels[idx]);

        let mut folds = vec![Vec::with_capacity(indices.len() / k + 1); k];
        for (pos, idx) in ordered.into_iter().enumerate() {
            folds[pos % k].push(idx);
        }
        for fold in folds.iter_mut() {
            fold.sort_unstable();
        }

        Ok(KFold { folds })
    }

    pub fn k(&self) -> usize {
        self.folds.len()
    }

    pub fn folds(&self) -> &[Vec<usize>] {
        &self.folds
    }

    /// Training indices and held-out indices of fold `i`
    pub fn split(&self, i: usize) -> (Vec<usize>, &[usize]) {
        let train = self
            .folds
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, fold)| fold.iter().copied())
            .collect();

        (train, &self.folds[i])
    }

    /// Every fold has to hold at least one sample of every class in `labels[indices]`
    ///
    /// Otherwise a held-out fold could not score a class, or with few samples a class would be
    /// missing from the remaining training folds.
    pub fn check_classes(&self, labels: ArrayView1<usize>) -> Result<()> {
        let classes = self
            .folds
            .iter()
            .flatten()
            .map(|&idx| labels[idx])
            .collect::<BTreeSet<_>>();

        for (i, fold) in self.folds.iter().enumerate() {
            let present = fold.iter().map(|&idx| labels[idx]).collect::<BTreeSet<_>>();
            if let Some(&label) = classes.difference(&present).next() {
                return Err(BenchError::EmptyFold { fold: i, label });
            }
        }

        Ok(())
    }
}

/// Every index has to address one of `n` samples
pub fn check_indices(indices: &[usize], n: usize) -> Result<()> {
    match indices.iter().find(|&&idx| idx >= n) {
        Some(&idx) => Err(BenchError::ShapeMismatch(format!(
            "index {} out of range for {} samples",
            idx, n
        ))),
        None => Ok(()),
    }
}

fn check_k(n: usize, k: usize) -> Result<()> {
    if k < 2 {
        return Err(BenchError::InvalidArgument(format!(
            "cross-validation needs at least two folds, but got {}",
            k
        )));
    }
    if n == 0 {
        return Err(BenchError::InvalidArgument(
            "cannot cross-validate without samples".into(),
        ));
    }

    Ok(())
}

/// Accuracy of `family` at `point` on every held-out fold, in fold order
///
/// Folds are evaluated one after another. The first failing fit aborts the whole evaluation.
pub fn cross_validate(
    family: ModelFamily,
    point: HyperPoint,
    records: ArrayView2<f64>,
    targets: ArrayView1<usize>,
    kfold: &KFold,
) -> Result<Vec<f64>> {
    (0..kfold.k())
        .map(|i| {
            let (train, valid) = kfold.split(i);

            let model = family.fit(
                records.select(Axis(0), &train).view(),
                targets.select(Axis(0), &train).view(),
                point,
            )?;
            let accuracy = evaluate(
                &model,
                records.select(Axis(0), valid).view(),
                targets.select(Axis(0), valid).view(),
            )?;

            debug!(%family, %point, fold = i, accuracy, "scored fold");
            Ok(accuracy)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{check_indices, cross_validate, KFold};
    use crate::error::BenchError;
    use crate::family::ModelFamily;
    use crate::hyperparams::HyperPoint;
    use ndarray::{Array1, Array2};
    use std::collections::HashSet;

    fn assert_disjoint_cover(kfold: &KFold, n: usize) {
        let all = kfold.folds().iter().flatten().copied().collect::<Vec<_>>();
        let unique = all.iter().copied().collect::<HashSet<_>>();

        assert_eq!(all.len(), n);
        assert_eq!(unique, (0..n).collect::<HashSet<_>>());
    }

    #[test]
    fn five_folds_of_twenty() {
        let indices = (0..100).collect::<Vec<_>>();
        let labels = Array1::from_shape_fn(100, |i| i % 3);

        for kfold in [
            KFold::sequential(&indices, 5).unwrap(),
            KFold::stratified(&indices, labels.view(), 5).unwrap(),
        ] {
            assert_eq!(kfold.k(), 5);
            assert!(kfold.folds().iter().all(|f| f.len() == 20));
            assert_disjoint_cover(&kfold, 100);
        }
    }

    #[test]
    fn uneven_sizes_differ_by_one() {
        let indices = (0..23).collect::<Vec<_>>();
        let kfold = KFold::sequential(&indices, 5).unwrap();

        let sizes = kfold.folds().iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);
        assert_disjoint_cover(&kfold, 23);
    }

    #[test]
    fn stratified_folds_balance_classes() {
        let indices = (0..60).collect::<Vec<_>>();
        let labels = Array1::from_shape_fn(60, |i| if i < 30 { 0 } else { 1 + i % 2 });
        let kfold = KFold::stratified(&indices, labels.view(), 5).unwrap();

        for fold in kfold.folds() {
            let count = |c| fold.iter().filter(|&&i| labels[i] == c).count();
            assert_eq!(count(0), 6);
            assert_eq!(count(1), 3);
            assert_eq!(count(2), 3);
        }
        kfold.check_classes(labels.view()).unwrap();
    }

    #[test]
    fn split_excludes_held_out_fold() {
        let indices = (0..10).collect::<Vec<_>>();
        let kfold = KFold::sequential(&indices, 5).unwrap();

        let (train, valid) = kfold.split(2);
        assert_eq!(valid, &[4, 5]);
        assert_eq!(train, vec![0, 1, 2, 3, 6, 7, 8, 9]);
    }

    #[test]
    fn rare_class_is_reported() {
        let indices = (0..10).collect::<Vec<_>>();
        let labels = Array1::from_shape_fn(10, |i| usize::from(i >= 8));
        let kfold = KFold::stratified(&indices, labels.view(), 5).unwrap();

        assert!(matches!(
            kfold.check_classes(labels.view()),
            Err(BenchError::EmptyFold { label: 1, .. })
        ));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let labels = Array1::from_shape_fn(10, |i| i % 2);
        let indices = vec![0, 1, 2, 3, 10];

        assert!(check_indices(&indices[..4], 10).is_ok());
        assert!(matches!(
            check_indices(&indices, 10),
            Err(BenchError::ShapeMismatch(_))
        ));
        assert!(matches!(
            KFold::stratified(&indices, labels.view(), 2),
            Err(BenchError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn invalid_k_is_rejected() {
        let indices = (0..10).collect::<Vec<_>>();
        assert!(matches!(
            KFold::sequential(&indices, 1),
            Err(BenchError::InvalidArgument(_))
        ));
        assert!(matches!(
            KFold::sequential(&[], 3),
            Err(BenchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn scores_every_fold() {
        let records = Array2::from_shape_fn((20, 1), |(i, _)| if i % 2 == 0 { -1.0 } else { 1.0 });
        let targets = Array1::from_shape_fn(20, |i| i % 2);
        let indices = (0..20).collect::<Vec<_>>();
        let kfold = KFold::stratified(&indices, targets.view(), 4).unwrap();

        let scores = cross_validate(
            ModelFamily::Lssvm,
            HyperPoint::new(10.0, 1.0),
            records.view(),
            targets.view(),
            &kfold,
        )
        .unwrap();

        assert_eq!(scores, vec![1.0; 4]);
    }
}
