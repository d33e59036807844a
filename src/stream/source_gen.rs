//! SourceGen - Quantizes probabilities into comparison thresholds.
//!
//! A probability `p` becomes the integer count of sequence values a bit must
//! beat over one period of `L = 2^bitwidth` steps:
//!
//! - unipolar: `round(p * L)`
//! - bipolar: `round((p + 1) / 2 * L)`
//!
//! Rounding is half-to-even. Values outside the polarity's interval are
//! saturated to `[0, L]`.

use super::{Polarity, ScaledSource};
use crate::utils::seq_len;
use crate::{Result, UnaryError};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use tracing::warn;

/// Quantized thresholds for one source tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGen {
    polarity: Polarity,
    bitwidth: u32,
    binary: ArrayD<u32>,
}

impl SourceGen {
    /// Quantize `prob` for a `bitwidth`-bit stream.
    ///
    /// The thresholds are computed once from the values `prob` holds now;
    /// later changes to the caller's array do not reach this generator.
    ///
    /// # Errors
    ///
    /// - [`UnaryError::Configuration`] for a bitwidth outside `[1, 24]`
    /// - [`UnaryError::NonFinite`] if `prob` contains NaN or infinity
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::array;
    /// use unarysim::stream::{Polarity, SourceGen};
    ///
    /// let src = SourceGen::new(&array![0.0, 0.5, 1.0], 2, Polarity::Unipolar).unwrap();
    /// assert_eq!(src.forward().as_slice().unwrap(), &[0, 2, 4]);
    /// ```
    pub fn new<S, D>(prob: &ArrayBase<S, D>, bitwidth: u32, polarity: Polarity) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let len = seq_len(bitwidth)?;
        let scale = len as f64;

        let mut non_finite = false;
        let mut saturated = 0usize;
        let binary = prob.map(|&p| {
            if !p.is_finite() {
                non_finite = true;
                return 0;
            }
            let count = (polarity.to_unipolar(p) * scale).round_ties_even();
            if count < 0.0 || count > scale {
                saturated += 1;
            }
            count.clamp(0.0, scale) as u32
        });

        if non_finite {
            return Err(UnaryError::NonFinite);
        }
        if saturated > 0 {
            warn!(
                saturated,
                %polarity,
                "probabilities outside the polarity interval were saturated"
            );
        }

        Ok(Self {
            polarity,
            bitwidth,
            binary: binary.into_dyn(),
        })
    }

    /// Quantize a [`ScaledSource`] using its own polarity.
    pub fn from_scaled(source: &ScaledSource, bitwidth: u32) -> Result<Self> {
        Self::new(source.values(), bitwidth, source.polarity())
    }

    /// Quantized thresholds, each in `[0, 2^bitwidth]`.
    pub fn forward(&self) -> &ArrayD<u32> {
        &self.binary
    }

    /// Consume and return the thresholds.
    pub fn into_binary(self) -> ArrayD<u32> {
        self.binary
    }

    /// Polarity used for quantization.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Stream bitwidth.
    pub fn bitwidth(&self) -> u32 {
        self.bitwidth
    }
}
