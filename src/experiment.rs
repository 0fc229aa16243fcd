//! End-to-end benchmark of one model family on one dataset
//!
//! An experiment loads the data, splits it, standardizes all rows with statistics of the
//! training rows, benchmarks training and prediction and reports the test accuracy.

use std::fmt;

use linfa::dataset::{DatasetBase, Records};
use linfa::traits::Fit;
use linfa::ParamGuard;
use ndarray::Axis;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use tracing::info;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::benchmarks::BenchmarkParams;
use crate::datasets::DatasetSource;
use crate::error::{BenchError, Result};
use crate::evaluate::accuracy;
use crate::family::ModelFamily;
use crate::hyperparams::HyperPoint;
use crate::multi_class::Classifier;
use crate::partition::Split;
use crate::search::SearchParams;
use crate::standardize::Standardizer;
use crate::trainer::TrainerParams;

/// Checked experiment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentValidParams {
    source: DatasetSource,
    family: ModelFamily,
    point: Option<HyperPoint>,
    search: Option<SearchParams>,
    train_fraction: f64,
    shuffle: bool,
    seed: Option<u64>,
    benchmark: BenchmarkParams,
}

impl ExperimentValidParams {
    pub fn source(&self) -> DatasetSource {
        self.source
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_tuned(&self) -> bool {
        self.search.is_some()
    }

    fn trainer(&self) -> TrainerParams {
        let trainer = TrainerParams::new(self.family);
        let trainer = match self.point {
            Some(point) => trainer.point(point),
            None => trainer,
        };

        match &self.search {
            Some(search) => trainer.search(search.clone()),
            None => trainer,
        }
    }
}

/// Experiment configuration
///
/// Defaults to a direct fit at the family's default point, a shuffled 60/40 split, an unseeded
/// random number generator and five benchmark repetitions.
///
/// ```rust,no_run
/// use linfa::ParamGuard;
/// use linfa_svm_bench::prelude::*;
///
/// let record = ExperimentParams::new(DatasetSource::Iris, ModelFamily::Lssvm)
///     .search(SearchParams::new().grid(25))
///     .seed(42)
///     .check()
///     .unwrap()
///     .run()
///     .unwrap();
///
/// println!("{}", record);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentParams(ExperimentValidParams);

impl ExperimentParams {
    pub fn new(source: DatasetSource, family: ModelFamily) -> Self {
        ExperimentParams(ExperimentValidParams {
            source,
            family,
            point: None,
            search: None,
            train_fraction: 0.6,
            shuffle: true,
            seed: None,
            benchmark: BenchmarkParams::new(),
        })
    }

    /// Fit at a fixed hyperparameter point
    pub fn point(mut self, point: HyperPoint) -> Self {
        self.0.point = Some(point);
        self
    }

    /// Tune hyperparameters on the training split
    pub fn search(mut self, search: SearchParams) -> Self {
        self.0.search = Some(search);
        self
    }

    pub fn train_fraction(mut self, train_fraction: f64) -> Self {
        self.0.train_fraction = train_fraction;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.0.shuffle = shuffle;
        self
    }

    /// Seed of the generator shared by data generation, splitting and random search
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = Some(seed);
        self
    }

    pub fn benchmark(mut self, benchmark: BenchmarkParams) -> Self {
        self.0.benchmark = benchmark;
        self
    }
}

impl ParamGuard for ExperimentParams {
    type Checked = ExperimentValidParams;
    type Error = BenchError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !(self.0.train_fraction > 0.0 && self.0.train_fraction < 1.0) {
            return Err(BenchError::InvalidArgument(format!(
                "train fraction must lie in (0, 1), but is {}",
                self.0.train_fraction
            )));
        }
        self.0.trainer().check_ref()?;
        self.0.benchmark.check_ref()?;

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Outcome of one experiment
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentRecord {
    pub dataset: String,
    pub model_family: ModelFamily,
    pub tuned: bool,
    pub regularization: f64,
    pub kernel_width: f64,
    /// Model fits of one training run, including cross-validation
    pub fits: usize,
    pub train_time_median_seconds: f64,
    pub train_memory_bytes: u64,
    pub test_accuracy: f64,
    pub predict_time_median_seconds: f64,
}

impl fmt::Display for ExperimentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} on {} ({})",
            self.model_family,
            self.dataset,
            if self.tuned { "tuned" } else { "default" }
        )?;
        writeln!(
            f,
            "  hyperparameters:  regularization {:.4}, kernel width {:.4} ({} fits)",
            self.regularization, self.kernel_width, self.fits
        )?;
        writeln!(
            f,
            "  training:         {:.6} s median, {} bytes allocated",
            self.train_time_median_seconds, self.train_memory_bytes
        )?;
        writeln!(
            f,
            "  prediction:       {:.6} s median",
            self.predict_time_median_seconds
        )?;
        write!(f, "  test accuracy:    {:.4}", self.test_accuracy)
    }
}

impl ExperimentValidParams {
    /// Run the experiment
    ///
    /// Every training repetition starts from an identical copy of the random number generator,
    /// so repetitions do the same work and produce the same model.
    pub fn run(&self) -> Result<ExperimentRecord> {
        let mut rng = match self.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };

        let dataset = self.source.load(&mut rng)?;
        let split = Split::with_rng(
            dataset.nsamples(),
            self.train_fraction,
            self.shuffle,
            &mut rng,
        )?;
        let targets = dataset.targets();

        let scaler = Standardizer.fit(&DatasetBase::new(
            dataset.records().select(Axis(0), split.train()),
            targets.select(Axis(0), split.train()),
        ))?;
        let records = scaler.transform(dataset.records().view())?;

        let trainer = self.trainer().check()?;
        let benchmark = self.benchmark.check_ref()?;

        let training = benchmark.run(|| {
            let mut rng = rng.clone();
            trainer.train(records.view(), targets.view(), split.train(), &mut rng)
        })?;
        let train_time = training.median_secs();
        let train_memory = training.allocated_bytes();
        let trained = training.into_output();

        let test_records = records.select(Axis(0), split.test());
        let test_targets = targets.select(Axis(0), split.test());

        let prediction = benchmark.run(|| trained.model.predict_labels(test_records.view()))?;
        let test_accuracy = accuracy(prediction.output.view(), test_targets.view())?;

        let record = ExperimentRecord {
            dataset: self.source.name().to_string(),
            model_family: self.family,
            tuned: self.is_tuned(),
            regularization: trained.point.regularization,
            kernel_width: trained.point.kernel_width,
            fits: trained.fits(),
            train_time_median_seconds: train_time,
            train_memory_bytes: train_memory,
            test_accuracy,
            predict_time_median_seconds: prediction.median_secs(),
        };

        info!(
            dataset = %record.dataset,
            family = %record.model_family,
            tuned = record.tuned,
            accuracy = record.test_accuracy,
            train_seconds = record.train_time_median_seconds,
            "finished experiment"
        );

        Ok(record)
    }
}
