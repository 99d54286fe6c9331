//! Error types for building codes, distributions and decoding bitstrings.
//!
//! Every failure is local and synchronous: nothing here is transient, so
//! nothing is worth retrying.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A name, shape or parameter that does not describe anything buildable.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Weights did not sum to 1 after dividing by their total.
    #[error("probabilities do not sum to 1: got {sum}")]
    Normalization { sum: f64 },

    /// A symbol outside the tree's alphabet was offered to `encode`.
    #[error("symbol {symbol} has no codeword in this tree")]
    Encoding { symbol: String },

    #[error("decoding error: {0}")]
    Decoding(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown distribution `{0}`")]
    UnknownDistribution(String),

    #[error("unknown tree shape `{0}`")]
    UnknownShape(String),

    /// The shape descriptor does not form a complete binary prefix tree.
    #[error("invalid tree shape: {0}")]
    InvalidShape(String),

    #[error("empty alphabet: cannot build a code")]
    EmptyAlphabet,

    /// Weights must be finite and non-negative.
    #[error("invalid weight {weight}")]
    InvalidWeight { weight: f64 },

    #[error("chunk size must be at least 1")]
    ZeroChunkSize,

    #[error("sample size must be at least 1")]
    ZeroSampleSize,

    #[error("bias pair is not in the joint alphabet")]
    UnknownBiasPair,

    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Bits ran out while still inside the tree.
    #[error("bitstring ends mid-codeword: {pending} dangling bits starting at position {position}")]
    Truncated { position: usize, pending: usize },

    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },

    /// A lone-leaf tree has the empty codeword and cannot consume any bits.
    #[error("single-symbol tree cannot decode {bits} bits")]
    SingleSymbolTree { bits: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
