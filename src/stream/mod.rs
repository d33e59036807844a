//! Stream components - from raw data to bit-stream samples.
//!
//! Data flows through four stages:
//!
//! 1. [`RawScale`] clips raw data to a percentile window and normalizes it
//!    to the unipolar `[0, 1]` or bipolar `[-1, 1]` interval
//! 2. [`SourceGen`] quantizes normalized probabilities to integer
//!    thresholds in `[0, 2^bitwidth]`
//! 3. [`BSGen`] / [`BSGenMulti`] compare thresholds against a sequence value
//!    per time step, emitting one [`BitSample`]
//! 4. [`StreamRunner`] drives the time-step loop and decodes full periods

pub mod bsgen;
pub mod raw_scale;
pub mod runner;
pub mod source_gen;

pub use bsgen::{BSGen, BSGenMulti, BitSample};
pub use raw_scale::{RawScale, ScaledSource};
pub use runner::StreamRunner;
pub use source_gen::SourceGen;

use crate::{Result, UnaryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Probability encoding of a bit-stream.
///
/// Used both for range scaling and for quantization. Serializes as
/// `"unipolar"` / `"bipolar"`, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Polarity {
    /// Values in `[0, 1]`, frequency of ones equals the value
    Unipolar,
    /// Values in `[-1, 1]`, frequency of ones equals `(value + 1) / 2`
    Bipolar,
}

impl Default for Polarity {
    fn default() -> Self {
        Self::Bipolar
    }
}

impl Polarity {
    /// Closed interval a value of this polarity lives in.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Polarity::Unipolar => (0.0, 1.0),
            Polarity::Bipolar => (-1.0, 1.0),
        }
    }

    /// Map a value of this polarity to the probability of a one.
    #[inline]
    pub fn to_unipolar(self, value: f64) -> f64 {
        match self {
            Polarity::Unipolar => value,
            Polarity::Bipolar => (value + 1.0) / 2.0,
        }
    }

    /// Map a probability of a one back to a value of this polarity.
    #[inline]
    pub fn from_unipolar(self, prob: f64) -> f64 {
        match self {
            Polarity::Unipolar => prob,
            Polarity::Bipolar => prob * 2.0 - 1.0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Unipolar => f.write_str("unipolar"),
            Polarity::Bipolar => f.write_str("bipolar"),
        }
    }
}

impl FromStr for Polarity {
    type Err = UnaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unipolar" => Ok(Polarity::Unipolar),
            "bipolar" => Ok(Polarity::Bipolar),
            _ => Err(UnaryError::config(format!(
                "polarity mode is not implemented: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Polarity {
    type Error = UnaryError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Polarity> for String {
    fn from(polarity: Polarity) -> Self {
        polarity.to_string()
    }
}
