//! Direct and tuned training of a model family
//!
use linfa::ParamGuard;
use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::Rng;
use tracing::info;

use crate::error::{BenchError, Result};
use crate::family::{FittedModel, ModelFamily};
use crate::hyperparams::HyperPoint;
use crate::search::{SearchOutcome, SearchParams};

/// Checked trainer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerValidParams {
    family: ModelFamily,
    point: Option<HyperPoint>,
    search: Option<SearchParams>,
}

impl TrainerValidParams {
    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Explicit hyperparameters of a direct fit
    pub fn point(&self) -> Option<HyperPoint> {
        self.point
    }

    /// Search configuration of a tuned fit
    pub fn search(&self) -> Option<&SearchParams> {
        self.search.as_ref()
    }

    pub fn is_tuned(&self) -> bool {
        self.search.is_some()
    }
}

/// Trainer configuration
///
/// Without further configuration the family is fitted directly at its
/// [default point](ModelFamily::default_point). Either fix a point with
/// [`point`](TrainerParams::point) or tune with [`search`](TrainerParams::search), not both.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerParams(TrainerValidParams);

impl TrainerParams {
    pub fn new(family: ModelFamily) -> Self {
        TrainerParams(TrainerValidParams {
            family,
            point: None,
            search: None,
        })
    }

    /// Fit directly at `point`
    pub fn point(mut self, point: HyperPoint) -> Self {
        self.0.point = Some(point);
        self
    }

    /// Select hyperparameters by cross-validated search before the final fit
    pub fn search(mut self, search: SearchParams) -> Self {
        self.0.search = Some(search);
        self
    }
}

impl ParamGuard for TrainerParams {
    type Checked = TrainerValidParams;
    type Error = BenchError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        match (&self.0.point, &self.0.search) {
            (Some(_), Some(_)) => Err(BenchError::InvalidArgument(
                "a fixed hyperparameter point cannot be combined with a search".into(),
            )),
            (Some(point), None) => point.validate().map(|_| &self.0),
            (None, Some(search)) => search.check_ref().map(|_| &self.0),
            (None, None) => Ok(&self.0),
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fitted model together with the hyperparameters it was trained at
#[derive(Debug)]
pub struct TrainedModel {
    pub model: FittedModel,
    pub point: HyperPoint,
    /// Present for tuned fits
    pub search: Option<SearchOutcome>,
}

impl TrainedModel {
    /// Number of model fits spent, including the final one
    pub fn fits(&self) -> usize {
        self.search.as_ref().map_or(1, |outcome| outcome.fits)
    }
}

impl TrainerValidParams {
    /// Train on the rows `train` of already standardized `records`
    ///
    /// `rng` is forwarded to the search and left untouched by direct fits.
    pub fn train<R: Rng>(
        &self,
        records: ArrayView2<f64>,
        targets: ArrayView1<usize>,
        train: &[usize],
        rng: &mut R,
    ) -> Result<TrainedModel> {
        if records.nrows() != targets.len() {
            return Err(BenchError::ShapeMismatch(format!(
                "{} records but {} targets",
                records.nrows(),
                targets.len()
            )));
        }
        if let Some(&idx) = train.iter().find(|&&idx| idx >= records.nrows()) {
            return Err(BenchError::ShapeMismatch(format!(
                "training index {} out of range for {} records",
                idx,
                records.nrows()
            )));
        }

        match &self.search {
            Some(search) => {
                let (model, outcome) =
                    search
                        .check_ref()?
                        .search(self.family, records, targets, train, rng)?;

                Ok(TrainedModel {
                    model,
                    point: outcome.best,
                    search: Some(outcome),
                })
            }
            None => {
                let point = self
                    .point
                    .unwrap_or_else(|| self.family.default_point(records.ncols()));
                let model = self.family.fit(
                    records.select(Axis(0), train).view(),
                    targets.select(Axis(0), train).view(),
                    point,
                )?;
                info!(family = %self.family, %point, "fitted with fixed hyperparameters");

                Ok(TrainedModel {
                    model,
                    point,
                    search: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrainerParams;
    use crate::error::BenchError;
    use crate::family::ModelFamily;
    use crate::hyperparams::HyperPoint;
    use crate::search::SearchParams;
    use linfa::ParamGuard;
    use ndarray::{Array1, Array2};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn blobs() -> (Array2<f64>, Array1<usize>) {
        let records = Array2::from_shape_fn((30, 2), |(i, j)| {
            let center = [[-2.0, -2.0], [2.0, 2.0], [-2.0, 2.0]][i % 3][j];
            center + 0.05 * (i / 3) as f64
        });
        let targets = Array1::from_shape_fn(30, |i| i % 3);
        (records, targets)
    }

    #[test]
    fn direct_fit_uses_default_point() {
        let (records, targets) = blobs();
        let train = (0..30).collect::<Vec<_>>();
        let mut rng = Xoshiro256Plus::seed_from_u64(0);

        for family in ModelFamily::ALL {
            let trained = TrainerParams::new(family)
                .check()
                .unwrap()
                .train(records.view(), targets.view(), &train, &mut rng)
                .unwrap();

            assert_eq!(trained.point, HyperPoint::new(1.0, 2.0));
            assert_eq!(trained.fits(), 1);
            assert!(trained.search.is_none());
            assert_eq!(trained.model.family(), family);
        }
    }

    #[test]
    fn tuned_fit_reports_search() {
        let (records, targets) = blobs();
        let train = (0..30).collect::<Vec<_>>();
        let mut rng = Xoshiro256Plus::seed_from_u64(0);

        let trained = TrainerParams::new(ModelFamily::Lssvm)
            .search(SearchParams::new().grid(9).n_folds(3))
            .check()
            .unwrap()
            .train(records.view(), targets.view(), &train, &mut rng)
            .unwrap();

        let outcome = trained.search.as_ref().unwrap();
        assert_eq!(trained.point, outcome.best);
        assert_eq!(trained.fits(), 9 * 3 + 1);
        assert!(ModelFamily::Lssvm.search_space().contains(&trained.point));
    }

    #[test]
    fn conflicting_or_invalid_configuration_fails() {
        let both = TrainerParams::new(ModelFamily::KernelSvm)
            .point(HyperPoint::new(1.0, 1.0))
            .search(SearchParams::new());
        assert!(matches!(both.check(), Err(BenchError::InvalidArgument(_))));

        let bad_point = TrainerParams::new(ModelFamily::Lssvm).point(HyperPoint::new(0.0, 1.0));
        assert!(matches!(
            bad_point.check(),
            Err(BenchError::InvalidArgument(_))
        ));

        let bad_search = TrainerParams::new(ModelFamily::Lssvm).search(SearchParams::new().n_folds(0));
        assert!(matches!(
            bad_search.check(),
            Err(BenchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn out_of_range_training_index_fails() {
        let (records, targets) = blobs();
        let mut rng = Xoshiro256Plus::seed_from_u64(0);

        let res = TrainerParams::new(ModelFamily::Lssvm)
            .check()
            .unwrap()
            .train(records.view(), targets.view(), &[0, 1, 30], &mut rng);
        assert!(matches!(res, Err(BenchError::ShapeMismatch(_))));
    }
}
