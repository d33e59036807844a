//! Utility functions for UnarySim.
//!
//! This module provides the small numeric and random helpers shared by the
//! sequence generators and the stream components: RNG construction,
//! Fisher-Yates shuffling and percentile computation.

use crate::{Result, UnaryError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest supported bitwidth. Sequences hold `2^bitwidth` entries.
pub const MAX_BITWIDTH: u32 = 24;

/// Return the sequence length `2^bitwidth` after validating the bitwidth.
///
/// # Examples
///
/// ```
/// use unarysim::utils::seq_len;
///
/// assert_eq!(seq_len(8).unwrap(), 256);
/// assert!(seq_len(0).is_err());
/// ```
pub fn seq_len(bitwidth: u32) -> Result<usize> {
    if bitwidth == 0 || bitwidth > MAX_BITWIDTH {
        return Err(UnaryError::config(format!(
            "bitwidth must be in [1, {}], got {}",
            MAX_BITWIDTH, bitwidth
        )));
    }
    Ok(1usize << bitwidth)
}

/// Build the random source used for sequence generation.
///
/// A seed gives a reproducible generator; `None` seeds from system entropy.
///
/// # Examples
///
/// ```
/// use unarysim::utils::make_rng;
/// use rand::Rng;
///
/// let mut a = make_rng(Some(7));
/// let mut b = make_rng(Some(7));
/// assert_eq!(a.gen::<u64>(), b.gen::<u64>());
/// ```
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Shuffle a slice of u32 values in-place using Fisher-Yates algorithm.
///
/// # Examples
///
/// ```
/// use unarysim::utils::shuffle;
/// use rand::SeedableRng;
///
/// let mut arr: Vec<u32> = (0..16).collect();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// shuffle(&mut arr, &mut rng);
/// let mut sorted = arr.clone();
/// sorted.sort();
/// assert_eq!(sorted, (0..16).collect::<Vec<u32>>());
/// ```
pub fn shuffle<R: Rng + ?Sized>(arr: &mut [u32], rng: &mut R) {
    for i in (1..arr.len()).rev() {
        let j = rng.gen_range(0..=i);
        arr.swap(i, j);
    }
}

/// Compute the `q`-th percentile (`q` in `[0, 100]`) of `values`.
///
/// Uses linear interpolation between the two nearest ranks, which matches
/// the default method of numpy's `percentile`.
///
/// # Errors
///
/// - [`UnaryError::EmptyInput`] if `values` is empty
/// - [`UnaryError::NonFinite`] if any value is NaN or infinite
/// - [`UnaryError::Configuration`] if `q` is outside `[0, 100]`
///
/// # Examples
///
/// ```
/// use unarysim::utils::percentile;
///
/// let v = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile(&v, 0.0).unwrap(), 1.0);
/// assert_eq!(percentile(&v, 50.0).unwrap(), 2.5);
/// assert_eq!(percentile(&v, 100.0).unwrap(), 4.0);
/// ```
pub fn percentile(values: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&q) {
        return Err(UnaryError::config(format!(
            "percentile rank must be in [0, 100], got {}",
            q
        )));
    }
    if values.is_empty() {
        return Err(UnaryError::EmptyInput);
    }
    check_finite(values.iter().copied())?;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Fail with [`UnaryError::NonFinite`] if any value is NaN or infinite.
pub fn check_finite<I: IntoIterator<Item = f64>>(values: I) -> Result<()> {
    if values.into_iter().all(f64::is_finite) {
        Ok(())
    } else {
        Err(UnaryError::NonFinite)
    }
}
