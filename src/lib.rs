//! Prefix codes and the information measures read off their code lengths.
//!
//! - [`distribution`]: symbol counts and normalized distributions with a
//!   reproducible inverse-CDF sampler
//! - [`tree`]: prefix-code trees from fixed shapes or the Huffman algorithm,
//!   with encode and decode
//! - [`joint`]: distributions over symbol pairs
//! - [`metrics`]: entropy, cross-entropy and KL-divergence
//!
//! ```
//! use prefix_code::{bits, PrefixTree};
//!
//! let tree = PrefixTree::manual("3bit").unwrap();
//! let encoded = tree.encode(b"abcdefgh").unwrap();
//! assert_eq!(bits::to_bit_string(&encoded), "000001010011100101110111");
//! assert_eq!(tree.decode(&encoded).unwrap(), b"abcdefgh");
//! ```

pub mod bits;
pub mod config;
pub mod distribution;
pub mod error;
pub mod joint;
pub mod metrics;
pub mod tree;

pub use config::ExperimentConfig;
pub use distribution::{FrequencyTable, WeightedDistribution};
pub use error::{ConfigError, DecodeError, Error, Result};
pub use joint::{Bias, JointDistribution};
pub use tree::{PrefixTree, Shape};
