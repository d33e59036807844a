//! Fibonacci linear-feedback shift register with primitive feedback polynomials.
//!
//! A polynomial `x^m + x^a + ... + 1` is written as its exponent list
//! `[m, a, ...]`. On each step the feedback bit is the XOR of `state[e - 1]`
//! for every exponent `e`, the register rotates right by one and the
//! feedback bit enters at index 0. With a primitive polynomial and a
//! non-zero seed the register walks all `2^m - 1` non-zero states before
//! repeating.

use crate::utils::MAX_BITWIDTH;
use crate::{Result, UnaryError};
use rand::Rng;

/// Known primitive polynomials per degree (index = degree - 1). The
/// reciprocal of a primitive polynomial is primitive too, so
/// [`primitive_polynomials`] also yields each entry's reciprocal.
const PRIMITIVE_POLYS: [&[&[u32]]; MAX_BITWIDTH as usize] = [
    &[&[1]],
    &[&[2, 1]],
    &[&[3, 2]],
    &[&[4, 3]],
    &[&[5, 3], &[5, 4, 3, 2], &[5, 4, 2, 1]],
    &[&[6, 5], &[6, 5, 2, 1], &[6, 4, 3, 1]],
    &[&[7, 6], &[7, 4]],
    &[&[8, 6, 5, 4]],
    &[&[9, 5]],
    &[&[10, 7]],
    &[&[11, 9]],
    &[&[12, 6, 4, 1]],
    &[&[13, 4, 3, 1]],
    &[&[14, 5, 3, 1]],
    &[&[15, 14]],
    &[&[16, 15, 13, 4]],
    &[&[17, 14]],
    &[&[18, 11]],
    &[&[19, 6, 2, 1]],
    &[&[20, 17]],
    &[&[21, 19]],
    &[&[22, 21]],
    &[&[23, 18]],
    &[&[24, 23, 22, 17]],
];

/// Exponent list of the reciprocal polynomial `x^m * p(1/x)`.
fn reciprocal(poly: &[u32]) -> Vec<u32> {
    let m = poly[0];
    let mut taps: Vec<u32> = std::iter::once(m)
        .chain(poly[1..].iter().map(|&e| m - e))
        .collect();
    taps[1..].sort_unstable_by(|a, b| b.cmp(a));
    taps
}

/// All primitive feedback polynomials of the given degree that this crate knows.
///
/// # Errors
///
/// [`UnaryError::Configuration`] if no polynomial of that degree is known.
pub fn primitive_polynomials(degree: u32) -> Result<Vec<Vec<u32>>> {
    let base = degree
        .checked_sub(1)
        .and_then(|i| PRIMITIVE_POLYS.get(i as usize))
        .ok_or_else(|| {
            UnaryError::config(format!("no primitive polynomial of degree {}", degree))
        })?;

    let mut polys: Vec<Vec<u32>> = Vec::with_capacity(base.len() * 2);
    for poly in base.iter() {
        for candidate in [poly.to_vec(), reciprocal(poly)] {
            if !polys.contains(&candidate) {
                polys.push(candidate);
            }
        }
    }
    Ok(polys)
}

/// A Fibonacci LFSR over `degree` bits.
#[derive(Debug, Clone)]
pub struct Lfsr {
    poly: Vec<u32>,
    state: Vec<u8>,
}

impl Lfsr {
    /// Create a register with polynomial `poly` and explicit initial `state`.
    ///
    /// # Errors
    ///
    /// [`UnaryError::Configuration`] if the state length does not match the
    /// polynomial degree, an exponent is out of range, or the state is all zero.
    pub fn new(poly: Vec<u32>, state: Vec<u8>) -> Result<Self> {
        let degree = poly.first().copied().unwrap_or(0) as usize;
        if degree == 0 || state.len() != degree {
            return Err(UnaryError::config(format!(
                "LFSR state length {} does not match polynomial degree {}",
                state.len(),
                degree
            )));
        }
        if poly.iter().any(|&e| e == 0 || e as usize > degree) {
            return Err(UnaryError::config(format!(
                "LFSR polynomial {:?} has an exponent outside [1, {}]",
                poly, degree
            )));
        }
        if state.iter().all(|&b| b == 0) {
            return Err(UnaryError::config("LFSR initial state must be non-zero"));
        }
        Ok(Self { poly, state })
    }

    /// Pick a random primitive polynomial of `degree` and a random non-zero seed.
    pub fn random<R: Rng + ?Sized>(degree: u32, rng: &mut R) -> Result<Self> {
        let polys = primitive_polynomials(degree)?;
        let poly = polys[rng.gen_range(0..polys.len())].clone();

        let seed: u32 = rng.gen_range(1..(1u32 << degree));
        let state = (0..degree).map(|j| ((seed >> j) & 1) as u8).collect();
        Self::new(poly, state)
    }

    /// Feedback polynomial as an exponent list.
    pub fn poly(&self) -> &[u32] {
        &self.poly
    }

    /// Current register contents, index 0 first.
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    /// Register contents packed MSB-first: `state[j]` weighs `2^(degree-1-j)`.
    pub fn value(&self) -> u32 {
        self.state
            .iter()
            .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit))
    }

    /// Advance the register by one step.
    pub fn step(&mut self) {
        let fb = self
            .poly
            .iter()
            .fold(0u8, |acc, &e| acc ^ self.state[e as usize - 1]);
        self.state.rotate_right(1);
        self.state[0] = fb;
    }

    /// Packed values for `n` consecutive steps, starting with the current state.
    pub fn values(&mut self, n: usize) -> Vec<u32> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.value());
            self.step();
        }
        out
    }
}
