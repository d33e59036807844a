//! BitField - Packed storage for one time step of a bit-stream.
//!
//! A comparator sample holds one bit per source element. Storing those bits
//! packed in 32-bit words keeps large tensors cheap and makes counting the
//! ones (the quantity a stochastic bit-stream encodes) a popcount.
//!
//! # Design
//!
//! - Uses `BitVec<u32, Lsb0>` for storage (32-bit words, LSB-first ordering)
//! - Bit `i` corresponds to element `i` of the source in row-major order
//!
//! # Examples
//!
//! ```
//! use unarysim::BitField;
//!
//! let bf = BitField::from_fn(8, |i| i % 2 == 1);
//! assert_eq!(bf.num_set(), 4);
//! assert_eq!(bf.get_acts(), vec![1, 3, 5, 7]);
//! ```

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Word type for bit storage (32-bit unsigned integer)
pub type Word = u32;

/// Number of bits per word
pub const BITS_PER_WORD: usize = 32;

/// Packed bit array with word-level access.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BitField {
    bv: BitVec<Word, Lsb0>,
}

impl BitField {
    /// Create a new BitField with `n` bits, all initialized to 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarysim::BitField;
    ///
    /// let bf = BitField::new(1024);
    /// assert_eq!(bf.num_bits(), 1024);
    /// assert_eq!(bf.num_set(), 0);
    /// ```
    #[inline]
    pub fn new(n: usize) -> Self {
        Self {
            bv: BitVec::repeat(false, n),
        }
    }

    /// Create a BitField of `n` bits where bit `i` is `f(i)`.
    pub fn from_fn<F: FnMut(usize) -> bool>(n: usize, mut f: F) -> Self {
        Self {
            bv: (0..n).map(&mut f).collect(),
        }
    }

    /// Get total number of bits.
    #[inline(always)]
    pub fn num_bits(&self) -> usize {
        self.bv.len()
    }

    /// Get number of storage words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.bv.as_raw_slice().len()
    }

    /// Get bit at position `b` (returns 0 or 1 as u8).
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `b >= num_bits`.
    #[inline]
    pub fn get_bit(&self, b: usize) -> u8 {
        debug_assert!(b < self.bv.len(), "bit index {} out of bounds (length: {})", b, self.bv.len());
        u8::from(self.bv[b])
    }

    /// Get all bit values as vector of 0s and 1s.
    pub fn get_bits(&self) -> Vec<u8> {
        self.bv.iter().map(|b| u8::from(*b)).collect()
    }

    /// Get indices of all set bits in ascending order.
    pub fn get_acts(&self) -> Vec<usize> {
        self.bv.iter_ones().collect()
    }

    /// Count number of set bits (population count).
    #[inline]
    pub fn num_set(&self) -> usize {
        self.bv.count_ones()
    }

    /// Count number of cleared bits.
    #[inline]
    pub fn num_cleared(&self) -> usize {
        self.bv.count_zeros()
    }

    /// Direct read-only access to word storage.
    #[inline(always)]
    pub fn words(&self) -> &[Word] {
        self.bv.as_raw_slice()
    }
}

impl FromIterator<bool> for BitField {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bv: iter.into_iter().collect(),
        }
    }
}

impl PartialEq for BitField {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bv == other.bv
    }
}

impl Eq for BitField {}
