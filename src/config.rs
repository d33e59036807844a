//! Stream configuration.
//!
//! [`StreamConfig`] captures every parameter needed to rebuild a bit-stream
//! pipeline: bitwidth, sequence mode, polarity, clipping percentile and the
//! RNG seed. It serializes to JSON so simulation runs can be reproduced.
//!
//! # Example
//!
//! ```
//! use unarysim::config::StreamConfig;
//! use unarysim::rng::SequenceMode;
//! use unarysim::stream::Polarity;
//!
//! let cfg = StreamConfig::builder()
//!     .bitwidth(10)
//!     .sequence_mode(SequenceMode::MaxLengthPrng)
//!     .polarity(Polarity::Unipolar)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let json = cfg.to_json().unwrap();
//! assert_eq!(StreamConfig::from_json(&json).unwrap(), cfg);
//! ```

use crate::rng::{SequenceMode, SOBOL_MAX_DIMS};
use crate::stream::Polarity;
use crate::utils::{seq_len, MAX_BITWIDTH};
use crate::{Result, UnaryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of one bit-stream pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream period is `2^bitwidth`
    #[serde(default = "default_bitwidth")]
    pub bitwidth: u32,

    /// Number of sequence dimensions; selects the Sobol coordinate
    #[serde(default = "default_dim")]
    pub dim: usize,

    /// How the driving sequence is generated
    #[serde(default)]
    pub sequence_mode: SequenceMode,

    /// Probability encoding
    #[serde(default)]
    pub polarity: Polarity,

    /// Central percentile window kept by range scaling, in `(0, 100]`
    #[serde(default = "default_percentile")]
    pub percentile: f64,

    /// RNG seed; `None` draws from system entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_bitwidth() -> u32 {
    8
}

fn default_dim() -> usize {
    1
}

fn default_percentile() -> f64 {
    100.0
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            bitwidth: default_bitwidth(),
            dim: default_dim(),
            sequence_mode: SequenceMode::default(),
            polarity: Polarity::default(),
            percentile: default_percentile(),
            seed: None,
        }
    }
}

impl StreamConfig {
    /// Start a builder from the default configuration.
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::new()
    }

    /// Sequence length `2^bitwidth`.
    pub fn period(&self) -> Result<usize> {
        seq_len(self.bitwidth)
    }

    /// Check every field, reporting the first problem found.
    ///
    /// # Validated invariants
    ///
    /// - `bitwidth` in `[1, 24]`
    /// - `dim >= 1`, and `dim <= 21` for quasi-random sequences
    /// - `percentile` in `(0, 100]`
    pub fn validate(&self) -> Result<()> {
        if self.bitwidth == 0 || self.bitwidth > MAX_BITWIDTH {
            return Err(UnaryError::config(format!(
                "bitwidth must be in [1, {}], got {}",
                MAX_BITWIDTH, self.bitwidth
            )));
        }
        if self.dim == 0 {
            return Err(UnaryError::config("dim must be at least 1"));
        }
        if self.sequence_mode == SequenceMode::QuasiRandom && self.dim > SOBOL_MAX_DIMS {
            return Err(UnaryError::config(format!(
                "dim must be at most {} for Sobol sequences, got {}",
                SOBOL_MAX_DIMS, self.dim
            )));
        }
        if !(self.percentile > 0.0 && self.percentile <= 100.0) {
            return Err(UnaryError::config(format!(
                "percentile must be in (0, 100], got {}",
                self.percentile
            )));
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: StreamConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write the configuration as JSON to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read and validate a JSON configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Builder for [`StreamConfig`].
#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    /// Start from [`StreamConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bitwidth.
    pub fn bitwidth(mut self, bitwidth: u32) -> Self {
        self.config.bitwidth = bitwidth;
        self
    }

    /// Set the sequence dimension.
    pub fn dim(mut self, dim: usize) -> Self {
        self.config.dim = dim;
        self
    }

    /// Set the sequence mode.
    pub fn sequence_mode(mut self, mode: SequenceMode) -> Self {
        self.config.sequence_mode = mode;
        self
    }

    /// Set the polarity.
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.config.polarity = polarity;
        self
    }

    /// Set the clipping percentile.
    pub fn percentile(mut self, percentile: f64) -> Self {
        self.config.percentile = percentile;
        self
    }

    /// Fix the RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<StreamConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
