//! RawScale - Percentile clipping and range normalization of raw data.
//!
//! Raw data seldom fits the unipolar or bipolar interval a bit-stream can
//! encode. `RawScale` clips outliers to a central percentile window and
//! stretches the result linearly onto the target interval.
//!
//! # Algorithm
//!
//! 1. `low = (100 - percentile) / 2`, `high = 100 - low`
//! 2. `clamp_min`/`clamp_max` = the `low`/`high` percentiles of the raw data
//! 3. clamp every raw value into `[clamp_min, clamp_max]`
//! 4. `x -> (x - min) / (max - min)`, then `2x - 1` for bipolar
//!
//! The clamped array is immutable after construction, so its extremes are
//! exactly `clamp_min` and `clamp_max`.
//!
//! # Examples
//!
//! ```
//! use ndarray::array;
//! use unarysim::stream::{Polarity, RawScale};
//!
//! let raw = array![[-3.0, 0.0], [1.0, 5.0]];
//! let scaled = RawScale::new(&raw, Polarity::Unipolar, 100.0)
//!     .unwrap()
//!     .forward()
//!     .unwrap();
//! assert_eq!(scaled.values()[[0, 0]], 0.0);
//! assert_eq!(scaled.values()[[1, 1]], 1.0);
//! ```

use super::Polarity;
use crate::utils::{check_finite, percentile};
use crate::{Result, UnaryError};
use itertools::{Itertools, MinMaxResult};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Normalized source data, same shape as the raw input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledSource {
    polarity: Polarity,
    values: ArrayD<f64>,
}

impl ScaledSource {
    /// Polarity the values are normalized for.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Normalized values.
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Consume and return the normalized values.
    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }
}

/// Map `values` linearly from `[min, max]` onto the polarity's interval.
fn normalize(values: &ArrayD<f64>, min: f64, max: f64, polarity: Polarity) -> Result<ArrayD<f64>> {
    let span = max - min;
    if span == 0.0 {
        return Err(UnaryError::DegenerateInput { min, max });
    }
    Ok(values.mapv(|x| polarity.from_unipolar((x - min) / span)))
}

/// Percentile-clipping range scaler.
#[derive(Debug, Clone)]
pub struct RawScale {
    polarity: Polarity,
    percentile: f64,
    clamp_min: f64,
    clamp_max: f64,
    clamped: ArrayD<f64>,
}

impl RawScale {
    /// Compute clamp bounds for `raw` and store the clamped data.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw data of any shape
    /// * `polarity` - Target interval
    /// * `percentile` - Width of the kept central window, in `(0, 100]`
    ///
    /// # Errors
    ///
    /// - [`UnaryError::Configuration`] if `percentile` is outside `(0, 100]`
    /// - [`UnaryError::EmptyInput`] if `raw` has no elements
    /// - [`UnaryError::NonFinite`] if `raw` contains NaN or infinity
    pub fn new<S, D>(raw: &ArrayBase<S, D>, polarity: Polarity, percentile: f64) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        if !(percentile > 0.0 && percentile <= 100.0) {
            return Err(UnaryError::config(format!(
                "percentile must be in (0, 100], got {}",
                percentile
            )));
        }

        let flat: Vec<f64> = raw.iter().copied().collect();
        let low = (100.0 - percentile) / 2.0;
        let high = 100.0 - low;
        let clamp_min = self::percentile(&flat, low)?;
        let clamp_max = self::percentile(&flat, high)?;
        debug!(low, high, clamp_min, clamp_max, "computed clamp bounds");

        let clamped = raw
            .to_owned()
            .into_dyn()
            .mapv_into(|x| x.clamp(clamp_min, clamp_max));

        Ok(Self {
            polarity,
            percentile,
            clamp_min,
            clamp_max,
            clamped,
        })
    }

    /// Normalize the clamped data onto the polarity's interval.
    ///
    /// Returns a fresh value on every call; the scaler itself never changes,
    /// so repeated calls give identical results.
    ///
    /// # Errors
    ///
    /// [`UnaryError::DegenerateInput`] if `clamp_min == clamp_max`.
    pub fn forward(&self) -> Result<ScaledSource> {
        let values = normalize(&self.clamped, self.clamp_min, self.clamp_max, self.polarity)?;
        Ok(ScaledSource {
            polarity: self.polarity,
            values,
        })
    }

    /// Renormalize a previously scaled value to its own current extremes.
    ///
    /// The input is left untouched; the result is a new [`ScaledSource`] in
    /// this scaler's polarity.
    pub fn rescale(&self, prev: &ScaledSource) -> Result<ScaledSource> {
        check_finite(prev.values.iter().copied())?;
        let (min, max) = match prev.values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return Err(UnaryError::EmptyInput),
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let values = normalize(&prev.values, min, max, self.polarity)?;
        Ok(ScaledSource {
            polarity: self.polarity,
            values,
        })
    }

    /// Polarity of the output.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Width of the central percentile window.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Lower clamp bound.
    pub fn clamp_min(&self) -> f64 {
        self.clamp_min
    }

    /// Upper clamp bound.
    pub fn clamp_max(&self) -> f64 {
        self.clamp_max
    }

    /// Raw data after clamping, before normalization.
    pub fn clamped(&self) -> &ArrayD<f64> {
        &self.clamped
    }
}
