//! Random-number sequences that drive bit-stream comparison.
//!
//! A [`Sequence`] is a fixed-length list of `2^bitwidth` integers in
//! `[0, 2^bitwidth)`. A [`SequenceTable`] holds `dim` independent sequences
//! side by side for components that need one stream source per element.
//!
//! # Modes
//!
//! | Mode            | Source                                  | Deterministic |
//! |-----------------|-----------------------------------------|---------------|
//! | `QuasiRandom`   | unscrambled Sobol points                | yes           |
//! | `Race`          | identity `0, 1, ..., L-1`               | yes           |
//! | `MaxLengthPrng` | maximal-length LFSR, random poly + seed | per RNG seed  |
//! | `SystemRandom`  | Fisher-Yates permutation of `0..L`      | per RNG seed  |
//!
//! # Examples
//!
//! ```
//! use unarysim::rng::{Sequence, SequenceMode};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let seq = Sequence::generate(2, 1, SequenceMode::Race, &mut rng).unwrap();
//! assert_eq!(seq.values(), &[0, 1, 2, 3]);
//! ```

pub mod lfsr;
pub mod sobol;

pub use lfsr::{primitive_polynomials, Lfsr};
pub use sobol::{SobolEngine, SOBOL_MAX_DIMS};

use crate::utils::{seq_len, shuffle};
use crate::{Result, UnaryError};
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Strategy used to build a sequence.
///
/// Serializes as its display name (`"Sobol"`, `"Race"`, `"LFSR"`, `"SYS"`)
/// and deserializes through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SequenceMode {
    /// Low-discrepancy Sobol points
    QuasiRandom,
    /// Identity ordering, for baselines and debugging
    Race,
    /// Maximal-length linear-feedback shift register
    MaxLengthPrng,
    /// Uniformly random permutation
    SystemRandom,
}

impl Default for SequenceMode {
    fn default() -> Self {
        Self::QuasiRandom
    }
}

impl fmt::Display for SequenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequenceMode::QuasiRandom => "Sobol",
            SequenceMode::Race => "Race",
            SequenceMode::MaxLengthPrng => "LFSR",
            SequenceMode::SystemRandom => "SYS",
        };
        f.write_str(name)
    }
}

impl FromStr for SequenceMode {
    type Err = UnaryError;

    /// Parse a mode name, accepting both the short historical names
    /// (`Sobol`, `Race`, `LFSR`, `SYS`) and the variant names.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sobol" | "quasirandom" => Ok(SequenceMode::QuasiRandom),
            "race" => Ok(SequenceMode::Race),
            "lfsr" | "maxlengthprng" => Ok(SequenceMode::MaxLengthPrng),
            "sys" | "systemrandom" => Ok(SequenceMode::SystemRandom),
            _ => Err(UnaryError::config(format!(
                "RNG mode is not implemented: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for SequenceMode {
    type Error = UnaryError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SequenceMode> for String {
    fn from(mode: SequenceMode) -> Self {
        mode.to_string()
    }
}

fn check_dim(dim: usize) -> Result<()> {
    if dim == 0 {
        return Err(UnaryError::config("sequence dimension must be at least 1"));
    }
    Ok(())
}

/// Build one sequence column. `coord` selects the Sobol coordinate.
fn build_column<R: Rng + ?Sized>(
    bitwidth: u32,
    mode: SequenceMode,
    sobol: Option<&SobolEngine>,
    coord: usize,
    rng: &mut R,
) -> Result<Vec<u32>> {
    let len = seq_len(bitwidth)?;
    let values = match mode {
        SequenceMode::QuasiRandom => match sobol {
            Some(engine) => engine.draw_scaled(coord, bitwidth),
            None => SobolEngine::new(coord + 1)?.draw_scaled(coord, bitwidth),
        },
        SequenceMode::Race => (0..len as u32).collect(),
        SequenceMode::MaxLengthPrng => {
            let mut lfsr = Lfsr::random(bitwidth, rng)?;
            debug!(poly = ?lfsr.poly(), "selected LFSR feedback polynomial");
            lfsr.values(len)
        }
        SequenceMode::SystemRandom => {
            let mut perm: Vec<u32> = (0..len as u32).collect();
            shuffle(&mut perm, rng);
            perm
        }
    };
    Ok(values)
}

/// Fail unless every value lies in `[0, len)`.
fn check_values<'a, I: IntoIterator<Item = &'a u32>>(values: I, len: usize) -> Result<()> {
    match values.into_iter().find(|&&v| v as usize >= len) {
        Some(&bad) => Err(UnaryError::config(format!(
            "sequence value {} outside [0, {})",
            bad, len
        ))),
        None => Ok(()),
    }
}

/// A single immutable sequence of `2^bitwidth` values in `[0, 2^bitwidth)`.
///
/// Deserialization goes through [`Sequence::from_values`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SequenceParts")]
pub struct Sequence {
    bitwidth: u32,
    mode: SequenceMode,
    values: Vec<u32>,
}

impl Sequence {
    /// Generate one sequence.
    ///
    /// For `QuasiRandom` the sequence is coordinate `dim - 1` of a
    /// `dim`-dimensional Sobol engine, so sequences requested with different
    /// `dim` are decorrelated. The other modes ignore `dim` beyond validating it.
    ///
    /// # Errors
    ///
    /// [`UnaryError::Configuration`] for a bitwidth outside `[1, 24]`, `dim == 0`,
    /// or a Sobol dimension beyond [`SOBOL_MAX_DIMS`].
    pub fn generate<R: Rng + ?Sized>(
        bitwidth: u32,
        dim: usize,
        mode: SequenceMode,
        rng: &mut R,
    ) -> Result<Self> {
        check_dim(dim)?;
        let values = build_column(bitwidth, mode, None, dim - 1, rng)?;
        debug!(%mode, bitwidth, dim, "generated sequence");
        Ok(Self {
            bitwidth,
            mode,
            values,
        })
    }

    /// Wrap explicit values, checking length and range.
    pub fn from_values(bitwidth: u32, mode: SequenceMode, values: Vec<u32>) -> Result<Self> {
        let len = seq_len(bitwidth)?;
        if values.len() != len {
            return Err(UnaryError::ShapeMismatch {
                expected: vec![len],
                actual: vec![values.len()],
            });
        }
        check_values(&values, len)?;
        Ok(Self {
            bitwidth,
            mode,
            values,
        })
    }

    /// Bitwidth `B`; the sequence holds `2^B` values.
    pub fn bitwidth(&self) -> u32 {
        self.bitwidth
    }

    /// Mode the sequence was generated with.
    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    /// Number of values (`2^bitwidth`).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a sequence holds at least two values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in time order.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Value at time index `t`.
    ///
    /// # Errors
    ///
    /// [`UnaryError::IndexOutOfRange`] if `t >= len()`.
    pub fn get(&self, t: usize) -> Result<u32> {
        self.values
            .get(t)
            .copied()
            .ok_or(UnaryError::IndexOutOfRange {
                index: t,
                length: self.values.len(),
            })
    }
}

#[derive(Deserialize)]
struct SequenceParts {
    bitwidth: u32,
    mode: SequenceMode,
    values: Vec<u32>,
}

impl TryFrom<SequenceParts> for Sequence {
    type Error = UnaryError;

    fn try_from(parts: SequenceParts) -> Result<Self> {
        Sequence::from_values(parts.bitwidth, parts.mode, parts.values)
    }
}

/// `dim` independent sequences stored time-major as an `[L, dim]` table.
///
/// Deserialization goes through [`SequenceTable::from_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SequenceTableParts")]
pub struct SequenceTable {
    bitwidth: u32,
    mode: SequenceMode,
    table: Array2<u32>,
}

impl SequenceTable {
    /// Generate `dim` sequences, one per column.
    ///
    /// Sobol columns are the `dim` coordinates of a single engine; LFSR and
    /// system-random columns each draw their own polynomial, seed or
    /// permutation from `rng`; Race columns are all the identity.
    pub fn generate<R: Rng + ?Sized>(
        bitwidth: u32,
        dim: usize,
        mode: SequenceMode,
        rng: &mut R,
    ) -> Result<Self> {
        check_dim(dim)?;
        let len = seq_len(bitwidth)?;
        let sobol = match mode {
            SequenceMode::QuasiRandom => Some(SobolEngine::new(dim)?),
            _ => None,
        };

        let mut table = Array2::<u32>::zeros((len, dim));
        for d in 0..dim {
            let column = build_column(bitwidth, mode, sobol.as_ref(), d, rng)?;
            table
                .column_mut(d)
                .assign(&ArrayView1::from(column.as_slice()));
        }
        debug!(%mode, bitwidth, dim, "generated sequence table");

        Ok(Self {
            bitwidth,
            mode,
            table,
        })
    }

    /// Wrap an explicit time-major `[L, dim]` table, checking its shape and
    /// value range.
    ///
    /// # Errors
    ///
    /// [`UnaryError::ShapeMismatch`] if the table does not have `2^bitwidth`
    /// rows and at least one column, [`UnaryError::Configuration`] for a bad
    /// bitwidth or a value outside `[0, 2^bitwidth)`.
    pub fn from_table(bitwidth: u32, mode: SequenceMode, table: Array2<u32>) -> Result<Self> {
        let len = seq_len(bitwidth)?;
        if table.nrows() != len || table.ncols() == 0 {
            return Err(UnaryError::ShapeMismatch {
                expected: vec![len, table.ncols().max(1)],
                actual: table.shape().to_vec(),
            });
        }
        check_values(table.iter(), len)?;
        Ok(Self {
            bitwidth,
            mode,
            table,
        })
    }

    /// Bitwidth `B`; each column holds `2^B` values.
    pub fn bitwidth(&self) -> u32 {
        self.bitwidth
    }

    /// Mode the table was generated with.
    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    /// Sequence length `L`.
    pub fn len(&self) -> usize {
        self.table.nrows()
    }

    /// Always false; a table holds at least one sequence.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of independent sequences.
    pub fn dim(&self) -> usize {
        self.table.ncols()
    }

    /// Time-major `[L, dim]` view.
    pub fn table(&self) -> &Array2<u32> {
        &self.table
    }

    /// Sequence-major `[dim, L]` copy.
    pub fn transposed(&self) -> Array2<u32> {
        self.table.t().to_owned()
    }

    /// Column `d` as a standalone [`Sequence`].
    pub fn sequence(&self, d: usize) -> Result<Sequence> {
        if d >= self.dim() {
            return Err(UnaryError::IndexOutOfRange {
                index: d,
                length: self.dim(),
            });
        }
        Ok(Sequence {
            bitwidth: self.bitwidth,
            mode: self.mode,
            values: self.table.column(d).to_vec(),
        })
    }
}

#[derive(Deserialize)]
struct SequenceTableParts {
    bitwidth: u32,
    mode: SequenceMode,
    table: Array2<u32>,
}

impl TryFrom<SequenceTableParts> for SequenceTable {
    type Error = UnaryError;

    fn try_from(parts: SequenceTableParts) -> Result<Self> {
        SequenceTable::from_table(parts.bitwidth, parts.mode, parts.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Sobol".parse::<SequenceMode>().unwrap(), SequenceMode::QuasiRandom);
        assert_eq!("LFSR".parse::<SequenceMode>().unwrap(), SequenceMode::MaxLengthPrng);
        assert_eq!("sys".parse::<SequenceMode>().unwrap(), SequenceMode::SystemRandom);
        assert_eq!("Race".parse::<SequenceMode>().unwrap(), SequenceMode::Race);
        assert!(matches!(
            "Halton".parse::<SequenceMode>(),
            Err(UnaryError::Configuration(_))
        ));
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [
            SequenceMode::QuasiRandom,
            SequenceMode::Race,
            SequenceMode::MaxLengthPrng,
            SequenceMode::SystemRandom,
        ] {
            assert_eq!(mode.to_string().parse::<SequenceMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_race_identity() {
        let seq = Sequence::generate(3, 1, SequenceMode::Race, &mut rng()).unwrap();
        assert_eq!(seq.values(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(seq.len(), 8);
    }

    #[test]
    fn test_sobol_single_uses_last_coordinate() {
        let seq = Sequence::generate(2, 2, SequenceMode::QuasiRandom, &mut rng()).unwrap();
        assert_eq!(seq.values(), &[0, 2, 1, 3]);
    }

    #[test]
    fn test_get_out_of_range() {
        let seq = Sequence::generate(2, 1, SequenceMode::Race, &mut rng()).unwrap();
        assert_eq!(seq.get(3).unwrap(), 3);
        assert!(matches!(
            seq.get(4),
            Err(UnaryError::IndexOutOfRange { index: 4, length: 4 })
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Sequence::generate(0, 1, SequenceMode::Race, &mut rng()).is_err());
        assert!(Sequence::generate(4, 0, SequenceMode::Race, &mut rng()).is_err());
        assert!(SequenceTable::generate(4, SOBOL_MAX_DIMS + 1, SequenceMode::QuasiRandom, &mut rng()).is_err());
    }

    #[test]
    fn test_from_values_checks_range() {
        assert!(Sequence::from_values(1, SequenceMode::Race, vec![0, 1]).is_ok());
        assert!(Sequence::from_values(1, SequenceMode::Race, vec![0, 2]).is_err());
        assert!(Sequence::from_values(1, SequenceMode::Race, vec![0]).is_err());
    }

    #[test]
    fn test_table_shape_and_transpose() {
        let table = SequenceTable::generate(4, 3, SequenceMode::SystemRandom, &mut rng()).unwrap();
        assert_eq!(table.table().dim(), (16, 3));
        assert_eq!(table.transposed().dim(), (3, 16));
        assert_eq!(table.transposed()[[2, 5]], table.table()[[5, 2]]);
        assert!(table.sequence(3).is_err());
    }

    #[test]
    fn test_table_sobol_columns_match_single_sequences() {
        let table = SequenceTable::generate(5, 4, SequenceMode::QuasiRandom, &mut rng()).unwrap();
        for d in 0..4 {
            let single = Sequence::generate(5, d + 1, SequenceMode::QuasiRandom, &mut rng()).unwrap();
            assert_eq!(table.sequence(d).unwrap().values(), single.values());
        }
    }

    #[test]
    fn test_mode_serializes_as_display_name() {
        let json = serde_json::to_string(&SequenceMode::MaxLengthPrng).unwrap();
        assert_eq!(json, r#""LFSR""#);
        let mode: SequenceMode = serde_json::from_str(r#""sobol""#).unwrap();
        assert_eq!(mode, SequenceMode::QuasiRandom);
        assert!(serde_json::from_str::<SequenceMode>(r#""QuasiRandom""#).is_ok());
        assert!(serde_json::from_str::<SequenceMode>(r#""Halton""#).is_err());
    }

    #[test]
    fn test_sequence_deserialize_validates() {
        let seq = Sequence::generate(3, 1, SequenceMode::SystemRandom, &mut rng()).unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(serde_json::from_str::<Sequence>(&json).unwrap(), seq);

        let short = r#"{ "bitwidth": 2, "mode": "Race", "values": [0, 1, 2] }"#;
        assert!(serde_json::from_str::<Sequence>(short).is_err());
        let out_of_range = r#"{ "bitwidth": 2, "mode": "Race", "values": [0, 1, 2, 4] }"#;
        assert!(serde_json::from_str::<Sequence>(out_of_range).is_err());
    }

    #[test]
    fn test_table_deserialize_validates() {
        let table = SequenceTable::generate(2, 2, SequenceMode::Race, &mut rng()).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(serde_json::from_value::<SequenceTable>(json.clone()).unwrap(), table);

        let mut wrong_width = json.clone();
        wrong_width["bitwidth"] = serde_json::json!(3);
        assert!(serde_json::from_value::<SequenceTable>(wrong_width).is_err());

        let mut bad_value = json;
        bad_value["table"]["data"][0] = serde_json::json!(9);
        assert!(serde_json::from_value::<SequenceTable>(bad_value).is_err());
    }

    #[test]
    fn test_from_table_checks_shape() {
        assert!(SequenceTable::from_table(1, SequenceMode::Race, Array2::zeros((2, 1))).is_ok());
        assert!(matches!(
            SequenceTable::from_table(1, SequenceMode::Race, Array2::zeros((3, 1))),
            Err(UnaryError::ShapeMismatch { .. })
        ));
        assert!(SequenceTable::from_table(1, SequenceMode::Race, Array2::zeros((2, 0))).is_err());
    }
}
