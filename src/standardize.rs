//! Standard scaling fitted on the training split
//!
use approx::abs_diff_eq;
use linfa::dataset::DatasetBase;
use linfa::traits::Fit;
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2, Zip};

use crate::error::{BenchError, Result};

/// Learns per-feature mean and standard deviation from a dataset
///
/// ### Example
///
/// ```rust
/// use linfa::traits::Fit;
/// use linfa_svm_bench::standardize::Standardizer;
///
/// let dataset = linfa_datasets::iris();
/// let scaler = Standardizer.fit(&dataset).unwrap();
/// let records = scaler.transform(dataset.records().view()).unwrap();
/// assert_eq!(records.dim(), (150, 4));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Standardizer;

impl<D: Data<Elem = f64>, T> Fit<ArrayBase<D, Ix2>, T, BenchError> for Standardizer {
    type Object = FittedStandardizer;

    /// Computes column means and population standard deviations of the records. Fails if the
    /// dataset has no samples.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        FittedStandardizer::from_records(dataset.records())
    }
}

/// Means and inverse standard deviations learned by [`Standardizer`]
///
/// The parameters never change after fitting, test records are scaled with the statistics of
/// the training records.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedStandardizer {
    means: Array1<f64>,
    std_devs: Array1<f64>,
    scales: Array1<f64>,
}

impl FittedStandardizer {
    pub(crate) fn from_records<D: Data<Elem = f64>>(records: &ArrayBase<D, Ix2>) -> Result<Self> {
        let means = records.mean_axis(Axis(0)).ok_or_else(|| {
            BenchError::InvalidArgument("cannot standardize an empty dataset".into())
        })?;
        let std_devs = records.std_axis(Axis(0), 0.0);
        let scales = std_devs.mapv(|s| {
            if abs_diff_eq!(s, 0.0) {
                // constant features are only centered
                1.0
            } else {
                1.0 / s
            }
        });

        Ok(FittedStandardizer {
            means,
            std_devs,
            scales,
        })
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn std_devs(&self) -> &Array1<f64> {
        &self.std_devs
    }

    pub fn nfeatures(&self) -> usize {
        self.means.len()
    }

    /// Applies `(x - mean) / std` to every column
    pub fn transform(&self, records: ArrayView2<f64>) -> Result<Array2<f64>> {
        if records.ncols() != self.nfeatures() {
            return Err(BenchError::ShapeMismatch(format!(
                "standardizer was fitted on {} features, but records have {}",
                self.nfeatures(),
                records.ncols()
            )));
        }

        let mut out = records.to_owned();
        Zip::from(out.columns_mut())
            .and(&self.means)
            .and(&self.scales)
            .for_each(|mut col, &mean, &scale| col.mapv_inplace(|x| (x - mean) * scale));

        Ok(out)
    }
}
