//! BSGen / BSGenMulti - Stochastic comparison of thresholds against sequences.
//!
//! At time step `t` every source element emits `1` when its quantized
//! threshold is strictly greater than the sequence value selected for it,
//! and `0` otherwise. Over a full period of `2^bitwidth` steps the fraction
//! of ones approximates the element's probability.
//!
//! - [`BSGen`] reads one shared sequence; every element uses the same time
//!   index, or an explicit per-element index array.
//! - [`BSGenMulti`] reads a table of sequences and gathers a value per
//!   element along one axis, so elements can advance through their streams
//!   independently.
//!
//! # Examples
//!
//! ```
//! use ndarray::array;
//! use unarysim::rng::{Sequence, SequenceMode};
//! use unarysim::stream::{BSGen, Polarity, SourceGen};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let seq = Sequence::generate(2, 1, SequenceMode::Race, &mut rng).unwrap();
//! let src = SourceGen::new(&array![0.5], 2, Polarity::Unipolar).unwrap();
//! let bsg = BSGen::new(&src, seq).unwrap();
//!
//! let bits: Vec<u8> = (0..4).map(|t| bsg.sample(t).unwrap().get(&[0]).unwrap()).collect();
//! assert_eq!(bits, vec![1, 1, 0, 0]);
//! ```

use super::SourceGen;
use crate::bitfield::BitField;
use crate::rng::{Sequence, SequenceTable};
use crate::{Result, UnaryError};
use ndarray::{Array, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One time step of a bit-stream tensor: one bit per source element.
///
/// Bits are stored packed in row-major element order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitSample {
    shape: Vec<usize>,
    bits: BitField,
}

impl BitSample {
    fn new(shape: &[usize], bits: BitField) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), bits.num_bits());
        Self {
            shape: shape.to_vec(),
            bits,
        }
    }

    /// Shape of the sample, equal to the source shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bits.num_bits()
    }

    /// True for a sample over an empty source.
    pub fn is_empty(&self) -> bool {
        self.bits.num_bits() == 0
    }

    /// Bit at a multi-dimensional index.
    ///
    /// # Errors
    ///
    /// [`UnaryError::ShapeMismatch`] if the index rank differs from the shape,
    /// [`UnaryError::IndexOutOfRange`] if any coordinate is out of bounds.
    pub fn get(&self, index: &[usize]) -> Result<u8> {
        if index.len() != self.shape.len() {
            return Err(UnaryError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: index.to_vec(),
            });
        }
        let mut flat = 0;
        for (&i, &n) in index.iter().zip(&self.shape) {
            if i >= n {
                return Err(UnaryError::IndexOutOfRange {
                    index: i,
                    length: n,
                });
            }
            flat = flat * n + i;
        }
        Ok(self.bits.get_bit(flat))
    }

    /// Number of ones in this step.
    pub fn num_set(&self) -> usize {
        self.bits.num_set()
    }

    /// Fraction of ones in this step.
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.num_set() as f64 / self.len() as f64
        }
    }

    /// Packed bit storage.
    pub fn bits(&self) -> &BitField {
        &self.bits
    }

    /// Unpack into a `0`/`1` array of the sample's shape.
    ///
    /// # Errors
    ///
    /// [`UnaryError::ShapeMismatch`] if the shape does not cover exactly the
    /// stored bits, which can only happen for a deserialized sample.
    pub fn to_array(&self) -> Result<ArrayD<u8>> {
        Array::from_shape_vec(IxDyn(&self.shape), self.bits.get_bits()).map_err(|_| {
            UnaryError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: vec![self.bits.num_bits()],
            }
        })
    }
}

/// Broadcast `thresholds` to the source shape and compare element-wise.
fn compare(source: &ArrayD<u32>, thresholds: &ArrayD<u32>) -> Result<BitSample> {
    let view = thresholds
        .broadcast(source.raw_dim())
        .ok_or_else(|| UnaryError::ShapeMismatch {
            expected: source.shape().to_vec(),
            actual: thresholds.shape().to_vec(),
        })?;
    let bits: BitField = source.iter().zip(view.iter()).map(|(s, r)| s > r).collect();
    Ok(BitSample::new(source.shape(), bits))
}

/// Bit-stream generator over one shared sequence.
#[derive(Debug, Clone)]
pub struct BSGen {
    source: ArrayD<u32>,
    seq: Sequence,
}

impl BSGen {
    /// Pair quantized thresholds with a sequence of the same bitwidth.
    ///
    /// # Errors
    ///
    /// [`UnaryError::Configuration`] if the bitwidths differ.
    pub fn new(source: &SourceGen, seq: Sequence) -> Result<Self> {
        if source.bitwidth() != seq.bitwidth() {
            return Err(UnaryError::config(format!(
                "source bitwidth {} does not match sequence bitwidth {}",
                source.bitwidth(),
                seq.bitwidth()
            )));
        }
        Ok(Self {
            source: source.forward().clone(),
            seq,
        })
    }

    /// Sequence length `L`.
    pub fn period(&self) -> usize {
        self.seq.len()
    }

    /// The driving sequence.
    pub fn sequence(&self) -> &Sequence {
        &self.seq
    }

    /// Bits for time step `t`: `source > seq[t]` for every element.
    ///
    /// # Errors
    ///
    /// [`UnaryError::IndexOutOfRange`] if `t >= L`.
    pub fn sample(&self, t: usize) -> Result<BitSample> {
        let threshold = self.seq.get(t)?;
        trace!(t, threshold, "bit-stream sample");
        let bits: BitField = self.source.iter().map(|&s| s > threshold).collect();
        Ok(BitSample::new(self.source.shape(), bits))
    }

    /// Bits with a per-element time index: `source > seq[idx]`, where `idx`
    /// is broadcast to the source shape.
    ///
    /// # Errors
    ///
    /// [`UnaryError::IndexOutOfRange`] if any index is `>= L`,
    /// [`UnaryError::ShapeMismatch`] if `idx` cannot broadcast to the source.
    pub fn sample_indexed(&self, idx: &ArrayD<usize>) -> Result<BitSample> {
        let mut thresholds = Vec::with_capacity(idx.len());
        for &t in idx.iter() {
            thresholds.push(self.seq.get(t)?);
        }
        let thresholds = Array::from_shape_vec(idx.raw_dim(), thresholds).map_err(|_| {
            UnaryError::ShapeMismatch {
                expected: idx.shape().to_vec(),
                actual: vec![idx.len()],
            }
        })?;
        compare(&self.source, &thresholds)
    }
}

/// Bit-stream generator over a table of sequences with per-element indices.
#[derive(Debug, Clone)]
pub struct BSGenMulti {
    source: ArrayD<u32>,
    table: ArrayD<u32>,
    axis: usize,
}

impl BSGenMulti {
    /// Use a [`SequenceTable`] in its time-major `[L, dim]` layout, gathering
    /// along axis 0.
    pub fn new(source: &SourceGen, table: &SequenceTable) -> Result<Self> {
        if source.bitwidth() != table.bitwidth() {
            return Err(UnaryError::config(format!(
                "source bitwidth {} does not match table bitwidth {}",
                source.bitwidth(),
                table.bitwidth()
            )));
        }
        Self::with_axis(source, table.table().clone().into_dyn(), 0)
    }

    /// Use an arbitrary table whose `axis` dimension has length `2^bitwidth`,
    /// e.g. the `[dim, L]` layout from [`SequenceTable::transposed`] with
    /// `axis = 1`.
    ///
    /// # Errors
    ///
    /// [`UnaryError::Configuration`] if `axis` is not a table axis,
    /// [`UnaryError::ShapeMismatch`] if that axis is not `2^bitwidth` long.
    pub fn with_axis(source: &SourceGen, table: ArrayD<u32>, axis: usize) -> Result<Self> {
        if axis >= table.ndim() {
            return Err(UnaryError::config(format!(
                "gather axis {} out of range for a {}-d table",
                axis,
                table.ndim()
            )));
        }
        let len = 1usize << source.bitwidth();
        if table.shape()[axis] != len {
            let mut expected = table.shape().to_vec();
            expected[axis] = len;
            return Err(UnaryError::ShapeMismatch {
                expected,
                actual: table.shape().to_vec(),
            });
        }
        Ok(Self {
            source: source.forward().clone(),
            table,
            axis,
        })
    }

    /// Sequence length `L`.
    pub fn period(&self) -> usize {
        self.table.shape()[self.axis]
    }

    /// Gather axis.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Gather one table value per index: the output has `idx`'s shape and
    /// `out[p] = table[p with p[axis] replaced by idx[p]]`.
    ///
    /// # Errors
    ///
    /// [`UnaryError::ShapeMismatch`] if `idx` has a different rank than the
    /// table or exceeds it on a non-gather axis,
    /// [`UnaryError::IndexOutOfRange`] if an index is `>= L`.
    pub fn gather(&self, idx: &ArrayD<usize>) -> Result<ArrayD<u32>> {
        let table_shape = self.table.shape();
        let fits = idx.ndim() == self.table.ndim()
            && idx
                .shape()
                .iter()
                .zip(table_shape)
                .enumerate()
                .all(|(d, (&i, &t))| d == self.axis || i <= t);
        if !fits {
            return Err(UnaryError::ShapeMismatch {
                expected: table_shape.to_vec(),
                actual: idx.shape().to_vec(),
            });
        }

        let period = self.period();
        let mut values = Vec::with_capacity(idx.len());
        for (mut pos, &t) in idx.indexed_iter() {
            if t >= period {
                return Err(UnaryError::IndexOutOfRange {
                    index: t,
                    length: period,
                });
            }
            pos[self.axis] = t;
            values.push(self.table[pos]);
        }
        Array::from_shape_vec(idx.raw_dim(), values).map_err(|_| UnaryError::ShapeMismatch {
            expected: idx.shape().to_vec(),
            actual: vec![idx.len()],
        })
    }

    /// Bits for per-element time indices: `source > gather(table, axis, idx)`,
    /// with the gathered thresholds broadcast to the source shape.
    pub fn sample(&self, idx: &ArrayD<usize>) -> Result<BitSample> {
        let thresholds = self.gather(idx)?;
        trace!(shape = ?idx.shape(), "multi-sequence bit-stream sample");
        compare(&self.source, &thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceMode;
    use crate::stream::Polarity;
    use ndarray::{array, Array2};
    use rand::SeedableRng;

    fn race(bitwidth: u32) -> Sequence {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        Sequence::generate(bitwidth, 1, SequenceMode::Race, &mut rng).unwrap()
    }

    #[test]
    fn test_full_probability_all_ones() {
        let src = SourceGen::new(&array![1.0], 2, Polarity::Unipolar).unwrap();
        let bsg = BSGen::new(&src, race(2)).unwrap();
        for t in 0..4 {
            assert_eq!(bsg.sample(t).unwrap().num_set(), 1);
        }
    }

    #[test]
    fn test_half_probability() {
        let src = SourceGen::new(&array![0.5], 2, Polarity::Unipolar).unwrap();
        let bsg = BSGen::new(&src, race(2)).unwrap();
        let bits: Vec<usize> = (0..4).map(|t| bsg.sample(t).unwrap().num_set()).collect();
        assert_eq!(bits, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_sample_out_of_range() {
        let src = SourceGen::new(&array![0.5], 2, Polarity::Unipolar).unwrap();
        let bsg = BSGen::new(&src, race(2)).unwrap();
        assert!(matches!(
            bsg.sample(4),
            Err(UnaryError::IndexOutOfRange { index: 4, length: 4 })
        ));
    }

    #[test]
    fn test_bitwidth_mismatch() {
        let src = SourceGen::new(&array![0.5], 3, Polarity::Unipolar).unwrap();
        assert!(BSGen::new(&src, race(2)).is_err());
    }

    #[test]
    fn test_sample_shape_and_unpack() {
        let src = SourceGen::new(&array![[0.0, 0.5], [0.75, 1.0]], 2, Polarity::Unipolar).unwrap();
        let bsg = BSGen::new(&src, race(2)).unwrap();
        let sample = bsg.sample(2).unwrap();
        assert_eq!(sample.shape(), &[2, 2]);
        assert_eq!(sample.to_array().unwrap(), array![[0u8, 0], [1, 1]].into_dyn());
        assert_eq!(sample.get(&[1, 0]).unwrap(), 1);
        assert!(sample.get(&[2, 0]).is_err());
        assert!(sample.get(&[0]).is_err());
    }

    #[test]
    fn test_to_array_rejects_inconsistent_shape() {
        let json = serde_json::to_value(BitSample::new(&[2], BitField::from_fn(2, |i| i == 0)))
            .unwrap();
        let mut tampered = json.clone();
        tampered["shape"] = serde_json::json!([3]);

        let good: BitSample = serde_json::from_value(json).unwrap();
        assert_eq!(good.to_array().unwrap(), array![1u8, 0].into_dyn());

        let bad: BitSample = serde_json::from_value(tampered).unwrap();
        assert!(matches!(
            bad.to_array(),
            Err(UnaryError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_sample_indexed() {
        let src = SourceGen::new(&array![0.5, 0.5, 0.5, 0.5], 2, Polarity::Unipolar).unwrap();
        let bsg = BSGen::new(&src, race(2)).unwrap();
        let idx = array![0usize, 1, 2, 3].into_dyn();
        assert_eq!(bsg.sample_indexed(&idx).unwrap().bits().get_bits(), vec![1, 1, 0, 0]);

        let bad = array![0usize, 4, 0, 0].into_dyn();
        assert!(bsg.sample_indexed(&bad).is_err());
    }

    #[test]
    fn test_gather_axis0() {
        let src = SourceGen::new(&array![[0.5, 0.5]], 1, Polarity::Unipolar).unwrap();
        let table: Array2<u32> = array![[0, 1], [1, 0]];
        let multi = BSGenMulti::with_axis(&src, table.into_dyn(), 0).unwrap();

        let idx = array![[1usize, 1]].into_dyn();
        assert_eq!(multi.gather(&idx).unwrap(), array![[1u32, 0]].into_dyn());
        // threshold 1 > [1, 0]
        assert_eq!(multi.sample(&idx).unwrap().bits().get_bits(), vec![0, 1]);
    }

    #[test]
    fn test_gather_errors() {
        let src = SourceGen::new(&array![[0.5, 0.5]], 1, Polarity::Unipolar).unwrap();
        let table: Array2<u32> = array![[0, 1], [1, 0]];
        let multi = BSGenMulti::with_axis(&src, table.into_dyn(), 0).unwrap();

        assert!(matches!(
            multi.gather(&array![[2usize, 0]].into_dyn()),
            Err(UnaryError::IndexOutOfRange { index: 2, length: 2 })
        ));
        assert!(matches!(
            multi.gather(&array![0usize, 0].into_dyn()),
            Err(UnaryError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            multi.gather(&array![[0usize, 0, 0]].into_dyn()),
            Err(UnaryError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_with_axis_validation() {
        let src = SourceGen::new(&array![0.5], 2, Polarity::Unipolar).unwrap();
        let table = Array2::<u32>::zeros((3, 2)).into_dyn();
        assert!(BSGenMulti::with_axis(&src, table.clone(), 0).is_err());
        assert!(BSGenMulti::with_axis(&src, table, 2).is_err());
    }
}
