//! UnarySim - Bit-stream generation for stochastic computing simulation
//!
//! Stochastic (unary) computing represents a real value as the long-run
//! frequency of ones in a bit-stream. This crate builds those streams from
//! ordinary tensors: raw data is clipped and normalized, quantized to integer
//! thresholds, and compared step by step against a random-number sequence.
//!
//! # Architecture
//!
//! - **rng**: sequence generation (Sobol, Race, LFSR, system random)
//! - **stream**: range scaling, quantization, comparison and the time-step driver
//! - **BitField**: packed storage for one step of bits
//! - **config**: serializable pipeline parameters
//!
//! # Examples
//!
//! ## Manual pipeline
//!
//! ```
//! use ndarray::array;
//! use rand::SeedableRng;
//! use unarysim::rng::{Sequence, SequenceMode};
//! use unarysim::stream::{BSGen, Polarity, RawScale, SourceGen};
//!
//! let raw = array![[0.2, -1.3], [2.4, 0.9]];
//! let scaled = RawScale::new(&raw, Polarity::Bipolar, 100.0)?.forward()?;
//! let source = SourceGen::from_scaled(&scaled, 8)?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let seq = Sequence::generate(8, 1, SequenceMode::QuasiRandom, &mut rng)?;
//! let bsg = BSGen::new(&source, seq)?;
//!
//! let mut ones = 0;
//! for t in 0..256 {
//!     ones += usize::from(bsg.sample(t)?.get(&[1, 0])?);
//! }
//! // 2.4 is the maximum, bipolar 1.0, so it fires every step
//! assert_eq!(ones, 256);
//! # Ok::<(), unarysim::UnaryError>(())
//! ```
//!
//! ## Config-driven runner
//!
//! ```
//! use ndarray::array;
//! use unarysim::{StreamConfig, StreamRunner};
//!
//! let cfg = StreamConfig::builder().bitwidth(6).seed(1).build()?;
//! let mut runner = StreamRunner::new(&array![1.0, 2.0, 3.0], &cfg)?;
//! let decoded = runner.run_period()?;
//! assert_eq!(decoded, runner.expected());
//! # Ok::<(), unarysim::UnaryError>(())
//! ```

pub mod bitfield;
pub mod config;
pub mod error;
pub mod rng;
pub mod stream;
pub mod utils;

// Re-exports for convenient access
pub use bitfield::{BitField, Word, BITS_PER_WORD};
pub use config::{StreamConfig, StreamConfigBuilder};
pub use error::{Result, UnaryError};
pub use rng::{Sequence, SequenceMode, SequenceTable};
pub use stream::{
    BSGen, BSGenMulti, BitSample, Polarity, RawScale, ScaledSource, SourceGen, StreamRunner,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "UnarySim";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
