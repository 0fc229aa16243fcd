//! Cross-validated hyperparameter search
//!
//! Candidates are scored one after another by k-fold cross-validation on the training split.
//! The fold assignment is computed once per search, so every candidate sees the same folds and
//! the number of fits is `ncandidates * k + 1` including the final refit.

use std::fmt;

use linfa::ParamGuard;
use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::Rng;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::cross_validation::{check_indices, cross_validate, KFold};
use crate::error::{BenchError, Result};
use crate::family::{FittedModel, ModelFamily};
use crate::hyperparams::{HyperPoint, SearchSpace};

/// How candidates are generated
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Cartesian grid with `ceil(sqrt(goal))` values per axis
    Grid { goal: usize },
    /// `samples` independent uniform draws from the search space
    Random { samples: usize },
}

impl SearchStrategy {
    /// Number of candidates this strategy evaluates
    pub fn ncandidates(&self) -> usize {
        match *self {
            SearchStrategy::Grid { goal } => {
                let per_axis = grid_resolution(goal);
                per_axis.saturating_mul(per_axis)
            }
            SearchStrategy::Random { samples } => samples,
        }
    }

    /// Generate candidates in evaluation order
    ///
    /// Grid points are ordered by ascending regularization, then ascending kernel width. Random
    /// points keep their generation order.
    pub fn candidates<R: Rng>(&self, space: &SearchSpace, rng: &mut R) -> Vec<HyperPoint> {
        match *self {
            SearchStrategy::Grid { goal } => {
                let per_axis = grid_resolution(goal);
                let widths = space.kernel_width.linspace(per_axis);

                space
                    .regularization
                    .linspace(per_axis)
                    .iter()
                    .flat_map(|&reg| widths.iter().map(move |&width| HyperPoint::new(reg, width)))
                    .collect()
            }
            SearchStrategy::Random { samples } => (0..samples)
                .map(|_| {
                    let reg = space.regularization.sample(rng);
                    let width = space.kernel_width.sample(rng);
                    HyperPoint::new(reg, width)
                })
                .collect(),
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Grid { goal } => write!(f, "grid search (goal {})", goal),
            SearchStrategy::Random { samples } => write!(f, "random search ({} samples)", samples),
        }
    }
}

/// Smallest `m` with `m * m >= goal`
fn grid_resolution(goal: usize) -> usize {
    let mut m = (goal as f64).sqrt().ceil() as usize;
    // an overflowing square is always large enough
    while m.checked_mul(m).map_or(false, |sq| sq < goal) {
        m += 1;
    }
    while m > 1 && (m - 1).checked_mul(m - 1).map_or(true, |sq| sq >= goal) {
        m -= 1;
    }

    m
}

/// Checked search configuration
///
/// See [`SearchParams`] for the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchValidParams {
    strategy: SearchStrategy,
    space: Option<SearchSpace>,
    n_folds: usize,
    stratified: bool,
}

impl SearchValidParams {
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Explicit search space, `None` uses the family's default space
    pub fn space(&self) -> Option<&SearchSpace> {
        self.space.as_ref()
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn stratified(&self) -> bool {
        self.stratified
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams(SearchValidParams);

impl SearchParams {
    /// Create search configuration
    ///
    /// Defaults to:
    ///  * grid search with a goal of 625 candidates (25 values per axis)
    ///  * the search space of the model family
    ///  * 5 stratified folds
    pub fn new() -> Self {
        SearchParams(SearchValidParams {
            strategy: SearchStrategy::Grid { goal: 625 },
            space: None,
            n_folds: 5,
            stratified: true,
        })
    }

    pub fn strategy(mut self, strategy: SearchStrategy) -> Self {
        self.0.strategy = strategy;
        self
    }

    /// Grid search with about `goal` candidates
    pub fn grid(self, goal: usize) -> Self {
        self.strategy(SearchStrategy::Grid { goal })
    }

    /// Random search with `samples` candidates
    pub fn random(self, samples: usize) -> Self {
        self.strategy(SearchStrategy::Random { samples })
    }

    /// Override the family's default search space
    pub fn space(mut self, space: SearchSpace) -> Self {
        self.0.space = Some(space);
        self
    }

    /// Number of cross-validation folds
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.0.n_folds = n_folds;
        self
    }

    /// Whether folds preserve class proportions
    pub fn stratified(mut self, stratified: bool) -> Self {
        self.0.stratified = stratified;
        self
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for SearchParams {
    type Checked = SearchValidParams;
    type Error = BenchError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        match self.0.strategy {
            SearchStrategy::Grid { goal: 0 } => Err(BenchError::InvalidArgument(
                "grid search needs a positive goal".into(),
            )),
            SearchStrategy::Random { samples: 0 } => Err(BenchError::InvalidArgument(
                "random search needs at least one sample".into(),
            )),
            _ if self.0.n_folds < 2 => Err(BenchError::InvalidArgument(format!(
                "cross-validation needs at least two folds, but got {}",
                self.0.n_folds
            ))),
            _ => {
                if let Some(space) = &self.0.space {
                    space.validate()?;
                }
                Ok(&self.0)
            }
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Mean cross-validation accuracy of a single candidate
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub point: HyperPoint,
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
}

/// Result of a search: all candidate scores, the winner and the number of fits spent
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub scores: Vec<CandidateScore>,
    pub best: HyperPoint,
    pub best_accuracy: f64,
    pub fits: usize,
}

impl SearchValidParams {
    /// Search the best hyperparameters of `family` on the rows `train` and refit there
    ///
    /// `rng` is only consumed by random search. Any failing fit or fold aborts the search.
    pub fn search<R: Rng>(
        &self,
        family: ModelFamily,
        records: ArrayView2<f64>,
        targets: ArrayView1<usize>,
        train: &[usize],
        rng: &mut R,
    ) -> Result<(FittedModel, SearchOutcome)> {
        if records.nrows() != targets.len() {
            return Err(BenchError::ShapeMismatch(format!(
                "{} records but {} targets",
                records.nrows(),
                targets.len()
            )));
        }

        check_indices(train, targets.len())?;

        let kfold = if self.stratified {
            KFold::stratified(train, targets, self.n_folds)?
        } else {
            KFold::sequential(train, self.n_folds)?
        };
        kfold.check_classes(targets)?;

        let space = self.space.unwrap_or_else(|| family.search_space());
        let candidates = self.strategy.candidates(&space, rng);

        let mut scores = Vec::with_capacity(candidates.len());
        let mut best: Option<(usize, f64)> = None;
        let mut fits = 0;

        for point in candidates {
            let fold_accuracies = cross_validate(family, point, records, targets, &kfold)?;
            fits += kfold.k();

            let mean_accuracy = fold_accuracies.iter().sum::<f64>() / kfold.k() as f64;
            debug!(%family, %point, mean_accuracy, "scored candidate");

            // strictly greater keeps the first candidate on ties
            if best.map_or(true, |(_, acc)| mean_accuracy > acc) {
                best = Some((scores.len(), mean_accuracy));
            }

            scores.push(CandidateScore {
                point,
                fold_accuracies,
                mean_accuracy,
            });
        }

        let (best_idx, best_accuracy) = best.ok_or_else(|| {
            BenchError::InvalidArgument("search space produced no candidates".into())
        })?;
        let best = scores[best_idx].point;

        let model = family.fit(
            records.select(Axis(0), train).view(),
            targets.select(Axis(0), train).view(),
            best,
        )?;
        fits += 1;

        info!(
            %family,
            strategy = %self.strategy,
            %best,
            best_accuracy,
            fits,
            "finished hyperparameter search"
        );

        Ok((
            model,
            SearchOutcome {
                scores,
                best,
                best_accuracy,
                fits,
            },
        ))
    }
}
