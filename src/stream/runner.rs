//! StreamRunner - Time-step driver for a complete bit-stream pipeline.
//!
//! Builds `RawScale -> SourceGen -> Sequence -> BSGen` from a
//! [`StreamConfig`] and walks the time index, wrapping at the period.
//!
//! # Examples
//!
//! ```
//! use ndarray::array;
//! use unarysim::config::StreamConfig;
//! use unarysim::rng::SequenceMode;
//! use unarysim::stream::{Polarity, StreamRunner};
//!
//! let cfg = StreamConfig::builder()
//!     .bitwidth(4)
//!     .sequence_mode(SequenceMode::Race)
//!     .polarity(Polarity::Unipolar)
//!     .build()
//!     .unwrap();
//!
//! let mut runner = StreamRunner::from_probabilities(&array![0.25, 0.75], &cfg).unwrap();
//! let decoded = runner.run_period().unwrap();
//! assert_eq!(decoded.as_slice().unwrap(), &[0.25, 0.75]);
//! ```

use super::{BSGen, BitSample, Polarity, RawScale, SourceGen};
use crate::config::StreamConfig;
use crate::rng::Sequence;
use crate::utils::make_rng;
use crate::{Result, UnaryError};
use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension};
use tracing::debug;

/// Drives one bit-stream generator through time.
#[derive(Debug, Clone)]
pub struct StreamRunner {
    polarity: Polarity,
    source: SourceGen,
    bsgen: BSGen,
    t: usize,
}

impl StreamRunner {
    /// Scale raw data per `config`, then build the generator.
    ///
    /// # Errors
    ///
    /// Any configuration, scaling or quantization error from the stages.
    pub fn new<S, D>(raw: &ArrayBase<S, D>, config: &StreamConfig) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        config.validate()?;
        let scaled = RawScale::new(raw, config.polarity, config.percentile)?.forward()?;
        let source = SourceGen::from_scaled(&scaled, config.bitwidth)?;
        Self::with_source(source, config)
    }

    /// Build the generator from values already in the polarity's interval,
    /// skipping range scaling.
    pub fn from_probabilities<S, D>(prob: &ArrayBase<S, D>, config: &StreamConfig) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        config.validate()?;
        let source = SourceGen::new(prob, config.bitwidth, config.polarity)?;
        Self::with_source(source, config)
    }

    fn with_source(source: SourceGen, config: &StreamConfig) -> Result<Self> {
        let mut rng = make_rng(config.seed);
        let seq = Sequence::generate(config.bitwidth, config.dim, config.sequence_mode, &mut rng)?;
        let bsgen = BSGen::new(&source, seq)?;
        debug!(
            bitwidth = config.bitwidth,
            mode = %config.sequence_mode,
            polarity = %config.polarity,
            elements = source.forward().len(),
            "stream runner ready"
        );
        Ok(Self {
            polarity: config.polarity,
            source,
            bsgen,
            t: 0,
        })
    }

    /// Current time index, in `[0, period)`.
    pub fn time(&self) -> usize {
        self.t
    }

    /// Stream period `2^bitwidth`.
    pub fn period(&self) -> usize {
        self.bsgen.period()
    }

    /// Quantized thresholds driving the comparison.
    pub fn source(&self) -> &SourceGen {
        &self.source
    }

    /// The underlying generator.
    pub fn bsgen(&self) -> &BSGen {
        &self.bsgen
    }

    /// Rewind to time 0.
    pub fn reset(&mut self) {
        self.t = 0;
    }

    /// Emit the sample for the current time and advance, wrapping at the period.
    pub fn step(&mut self) -> Result<BitSample> {
        let sample = self.bsgen.sample(self.t)?;
        self.t = (self.t + 1) % self.period();
        Ok(sample)
    }

    /// Run one full period from the current time and decode each element's
    /// ones-frequency back into its polarity.
    pub fn run_period(&mut self) -> Result<ArrayD<f64>> {
        let period = self.period();
        let mut ones = vec![0u32; self.source.forward().len()];
        for _ in 0..period {
            let sample = self.step()?;
            for act in sample.bits().get_acts() {
                ones[act] += 1;
            }
        }

        let decoded: Vec<f64> = ones
            .into_iter()
            .map(|n| self.polarity.from_unipolar(f64::from(n) / period as f64))
            .collect();
        Array::from_shape_vec(self.source.forward().raw_dim(), decoded).map_err(|_| {
            UnaryError::ShapeMismatch {
                expected: self.source.forward().shape().to_vec(),
                actual: vec![self.source.forward().len()],
            }
        })
    }

    /// Value a full period decodes to when every threshold is hit exactly,
    /// i.e. the quantized probability.
    pub fn expected(&self) -> ArrayD<f64> {
        let period = self.period() as f64;
        self.source
            .forward()
            .mapv(|q| self.polarity.from_unipolar(f64::from(q) / period))
    }
}
