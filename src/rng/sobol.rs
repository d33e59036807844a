//! Unscrambled Sobol low-discrepancy points.
//!
//! Points are produced in gray-code order with Joe & Kuo direction numbers,
//! so the first point is the origin and, for every coordinate, the first
//! `2^m` points hit each cell `k / 2^m` exactly once. Scaling a coordinate
//! by `2^bitwidth` therefore yields a permutation of `[0, 2^bitwidth)`.
//!
//! Coordinates are kept as 32-bit fixed-point fractions, which makes the
//! integer scaling exact.

use crate::{Result, UnaryError};

/// Number of coordinates the direction-number table covers.
pub const SOBOL_MAX_DIMS: usize = 21;

const DIRECTION_BITS: usize = 32;

/// Joe & Kuo primitive polynomial data for coordinates 2..=21:
/// (degree `s`, coefficient bits `a`, initial direction numbers `m`).
/// Coordinate 1 is the van der Corput sequence and needs no entry.
const JOE_KUO: [(u32, u32, &[u32]); SOBOL_MAX_DIMS - 1] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
    (6, 19, &[1, 1, 1, 15, 7, 5]),
    (6, 22, &[1, 3, 1, 15, 13, 25]),
    (6, 25, &[1, 1, 5, 5, 19, 61]),
    (7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    (7, 4, &[1, 3, 7, 13, 13, 15, 69]),
];

/// Direction numbers `v[0..32]` for one coordinate (0-based).
fn direction_numbers(coord: usize) -> [u32; DIRECTION_BITS] {
    let mut v = [0u32; DIRECTION_BITS];

    if coord == 0 {
        for (k, vk) in v.iter_mut().enumerate() {
            *vk = 1u32 << (DIRECTION_BITS - 1 - k);
        }
        return v;
    }

    let (s, a, m) = JOE_KUO[coord - 1];
    let s = s as usize;
    for k in 0..s.min(DIRECTION_BITS) {
        v[k] = m[k] << (DIRECTION_BITS - 1 - k);
    }
    for k in s..DIRECTION_BITS {
        let mut vk = v[k - s] ^ (v[k - s] >> s);
        for i in 1..s {
            if (a >> (s - 1 - i)) & 1 == 1 {
                vk ^= v[k - i];
            }
        }
        v[k] = vk;
    }
    v
}

/// Unscrambled Sobol engine over `dims` coordinates.
#[derive(Debug, Clone)]
pub struct SobolEngine {
    directions: Vec<[u32; DIRECTION_BITS]>,
}

impl SobolEngine {
    /// Create an engine for `dims` coordinates.
    ///
    /// # Errors
    ///
    /// [`UnaryError::Configuration`] if `dims` is 0 or exceeds [`SOBOL_MAX_DIMS`].
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 || dims > SOBOL_MAX_DIMS {
            return Err(UnaryError::config(format!(
                "Sobol dimension count must be in [1, {}], got {}",
                SOBOL_MAX_DIMS, dims
            )));
        }
        Ok(Self {
            directions: (0..dims).map(direction_numbers).collect(),
        })
    }

    /// Number of coordinates per point.
    pub fn dims(&self) -> usize {
        self.directions.len()
    }

    /// Draw the first `n` points, returning coordinate `coord` of each as a
    /// 32-bit fixed-point fraction of 1.
    pub fn draw_coord(&self, coord: usize, n: usize) -> Vec<u32> {
        let v = &self.directions[coord];
        let mut x = 0u32;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(x);
            // Gray-code step: flip the direction number of the lowest zero bit of i.
            let c = (!i).trailing_zeros() as usize;
            if c < DIRECTION_BITS {
                x ^= v[c];
            }
        }
        out
    }

    /// Draw the first `2^bitwidth` points of coordinate `coord`, scaled to
    /// integers in `[0, 2^bitwidth)`.
    pub fn draw_scaled(&self, coord: usize, bitwidth: u32) -> Vec<u32> {
        let n = 1usize << bitwidth;
        let shift = DIRECTION_BITS as u32 - bitwidth;
        self.draw_coord(coord, n)
            .into_iter()
            .map(|x| x >> shift)
            .collect()
    }
}
