//! Symbol counts and normalized probability distributions.
//!
//! Both types key their tables with a `BTreeMap`, so iteration order is the
//! symbol order. Sampling walks that order, which makes every draw
//! reproducible for a seeded generator.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Error, Result};

/// Largest accepted distance between the normalized total and 1.
pub const TOLERANCE: f64 = 1e-9;

/// Occurrence counts per distinct symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S> {
    counts: BTreeMap<S, u64>,
}

impl<S: Ord> FrequencyTable<S> {
    pub fn from_symbols(symbols: impl IntoIterator<Item = S>) -> Self {
        let mut counts = BTreeMap::new();
        for s in symbols {
            *counts.entry(s).or_default() += 1;
        }

        Self { counts }
    }

    pub fn count(&self, symbol: &S) -> u64 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, u64)> + '_ {
        self.counts.iter().map(|(s, &c)| (s, c))
    }
}

impl FrequencyTable<Vec<u8>> {
    /// Counts consecutive `chunk_size`-byte chunks of `corpus`. The final
    /// chunk is shorter when the length is not a multiple of `chunk_size`.
    pub fn from_corpus(corpus: &[u8], chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize.into());
        }

        Ok(Self::from_symbols(corpus.chunks(chunk_size).map(<[u8]>::to_vec)))
    }
}

/// A normalized map from symbol to probability mass. Immutable once built;
/// transformations produce a new distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<S, f64>", into = "BTreeMap<S, f64>")]
#[serde(bound(
    serialize = "S: Serialize + Clone",
    deserialize = "S: Deserialize<'de> + Ord"
))]
pub struct WeightedDistribution<S> {
    weights: BTreeMap<S, f64>,
}

/// Divides every weight by the total, then checks the result sums to 1.
///
/// An empty, all-zero or NaN table fails the check.
pub(crate) fn normalize<K>(mut weights: BTreeMap<K, f64>) -> Result<BTreeMap<K, f64>> {
    let total: f64 = weights.values().sum();
    for w in weights.values_mut() {
        *w /= total;
    }

    let sum: f64 = weights.values().sum();
    // written so that a NaN sum fails too
    if !((sum - 1.0).abs() <= TOLERANCE) {
        return Err(Error::Normalization { sum });
    }

    Ok(weights)
}

/// `-Σ p·log2(p)`, skipping zero-probability entries.
pub(crate) fn entropy_of<'a>(probabilities: impl IntoIterator<Item = &'a f64>) -> f64 {
    -probabilities
        .into_iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

impl<S: Ord> WeightedDistribution<S> {
    /// Builds a distribution from unnormalized, non-negative weights.
    pub fn new(weights: BTreeMap<S, f64>) -> Result<Self> {
        if let Some(&weight) = weights.values().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ConfigError::InvalidWeight { weight }.into());
        }

        let weights = normalize(weights)?;
        debug!(symbols = weights.len(), "built weighted distribution");
        Ok(Self { weights })
    }

    pub fn from_frequencies(frequencies: &FrequencyTable<S>) -> Result<Self>
    where
        S: Clone,
    {
        Self::new(
            frequencies
                .iter()
                .map(|(s, c)| (s.clone(), c as f64))
                .collect(),
        )
    }

    pub fn probability(&self, symbol: &S) -> f64 {
        self.weights.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn entropy(&self) -> f64 {
        entropy_of(self.weights.values())
    }

    /// Draws `count` independent symbols by inverse-CDF lookup.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<S>
    where
        S: Clone,
    {
        (0..count).map(|_| self.sample_one(rng).clone()).collect()
    }

    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> &S {
        self.pick(rng.gen::<f64>())
    }

    /// Returns the symbol whose interval `[before, before + p)` holds `r`.
    ///
    /// Rounding can leave the final cumulative sum just under 1; a draw past
    /// the last interval lands on the last symbol with positive weight.
    fn pick(&self, r: f64) -> &S {
        let mut before = 0.0;
        let mut last = None;
        for (s, &p) in &self.weights {
            if p > 0.0 {
                if r < before + p {
                    return s;
                }
                last = Some(s);
            }
            before += p;
        }

        last.expect("a normalized distribution has a positive weight")
    }
}

impl WeightedDistribution<Vec<u8>> {
    /// Chunk frequencies of `corpus` taken as unnormalized weights.
    pub fn from_corpus(corpus: &[u8], chunk_size: usize) -> Result<Self> {
        Self::from_frequencies(&FrequencyTable::from_corpus(corpus, chunk_size)?)
    }
}

impl WeightedDistribution<u8> {
    /// Looks up one of the built-in reference distributions.
    pub fn named(name: &str) -> Result<Self> {
        let weights: Vec<(u8, f64)> = match name {
            "3bit" => (b'a'..=b'h').map(|c| (c, 0.125)).collect(),
            "3bit-skewed" => vec![
                (b'a', 0.5),
                (b'b', 0.25),
                (b'c', 0.125),
                (b'd', 0.0625),
                (b'e', 0.03125),
                (b'f', 0.015625),
                (b'g', 0.0078125),
                (b'h', 0.0078125),
            ],
            "nums" => vec![(b'0', 0.2119), (b'1', 0.0364), (b'2', 0.2641), (b'3', 0.4876)],
            "letters" => vec![(b'a', 0.5577), (b'b', 0.0402), (b'c', 0.2180), (b'd', 0.1841)],
            _ => return Err(ConfigError::UnknownDistribution(name.to_owned()).into()),
        };

        Self::new(weights.into_iter().collect())
    }
}

impl<S> WeightedDistribution<S> {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &S> + '_ {
        self.weights.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> + '_ {
        self.weights.iter().map(|(s, &p)| (s, p))
    }
}

impl<S: Ord> TryFrom<BTreeMap<S, f64>> for WeightedDistribution<S> {
    type Error = Error;

    fn try_from(weights: BTreeMap<S, f64>) -> Result<Self> {
        Self::new(weights)
    }
}

impl<S> From<WeightedDistribution<S>> for BTreeMap<S, f64> {
    fn from(dist: WeightedDistribution<S>) -> Self {
        dist.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn normalizes_on_construction() {
        let d = WeightedDistribution::new(BTreeMap::from([('x', 2.0), ('y', 6.0)])).unwrap();
        assert_eq!(d.probability(&'x'), 0.25);
        assert_eq!(d.probability(&'y'), 0.75);
        assert_eq!(d.probability(&'z'), 0.0);
        assert!((d.total_weight() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn named_distributions_are_normalized() {
        for name in ["3bit", "3bit-skewed", "nums", "letters"] {
            let d = WeightedDistribution::named(name).unwrap();
            assert!((d.total_weight() - 1.0).abs() < TOLERANCE, "{}", name);
        }
    }

    #[test]
    fn unknown_name() {
        let err = WeightedDistribution::named("5bit").unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::UnknownDistribution(n)) if n == "5bit"
        ));
    }

    #[test]
    fn degenerate_weights_fail_normalization() {
        let zeros = BTreeMap::from([(1u8, 0.0), (2, 0.0)]);
        assert!(matches!(
            WeightedDistribution::new(zeros),
            Err(Error::Normalization { .. })
        ));

        let empty: BTreeMap<u8, f64> = BTreeMap::new();
        assert!(matches!(
            WeightedDistribution::new(empty),
            Err(Error::Normalization { .. })
        ));
    }

    #[test]
    fn negative_and_nan_weights_rejected() {
        let negative = BTreeMap::from([(1u8, 0.5), (2, -0.1)]);
        assert!(matches!(
            WeightedDistribution::new(negative),
            Err(Error::Configuration(ConfigError::InvalidWeight { .. }))
        ));

        let nan = BTreeMap::from([(1u8, f64::NAN)]);
        assert!(matches!(
            WeightedDistribution::new(nan),
            Err(Error::Configuration(ConfigError::InvalidWeight { .. }))
        ));
    }

    #[test]
    fn uniform_entropy_is_exact() {
        let d = WeightedDistribution::named("3bit").unwrap();
        assert_eq!(d.entropy(), 3.0);
    }

    #[test]
    fn entropy_bounds() {
        for name in ["3bit-skewed", "nums", "letters"] {
            let d = WeightedDistribution::named(name).unwrap();
            let h = d.entropy();
            assert!(h >= 0.0);
            assert!(h < (d.len() as f64).log2(), "{} not uniform", name);
        }
    }

    #[test]
    fn zero_weight_contributes_nothing() {
        let d = WeightedDistribution::new(BTreeMap::from([('a', 1.0), ('b', 1.0), ('c', 0.0)]))
            .unwrap();
        assert_eq!(d.entropy(), 1.0);
    }

    #[test]
    fn corpus_chunks_with_short_tail() {
        let freq = FrequencyTable::from_corpus(b"ababc", 2).unwrap();
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.count(&b"ab".to_vec()), 2);
        assert_eq!(freq.count(&b"c".to_vec()), 1);
        assert_eq!(freq.total(), 3);

        let d = WeightedDistribution::from_corpus(b"ababc", 2).unwrap();
        assert!((d.probability(&b"ab".to_vec()) - 2.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn zero_chunk_size() {
        assert!(matches!(
            FrequencyTable::from_corpus(b"abc", 0),
            Err(Error::Configuration(ConfigError::ZeroChunkSize))
        ));
    }

    #[test]
    fn pick_walks_cumulative_intervals() {
        let d = WeightedDistribution::new(BTreeMap::from([('a', 1.0), ('b', 0.0), ('c', 3.0)]))
            .unwrap();
        assert_eq!(*d.pick(0.0), 'a');
        assert_eq!(*d.pick(0.2499), 'a');
        assert_eq!(*d.pick(0.25), 'c');
        assert_eq!(*d.pick(0.9999), 'c');
    }

    #[test]
    fn draw_past_last_interval_falls_back() {
        let d = WeightedDistribution::new(BTreeMap::from([('a', 1.0), ('b', 1.0), ('c', 0.0)]))
            .unwrap();
        assert_eq!(*d.pick(1.0), 'b');
    }

    #[test]
    fn sampling_matches_weights() {
        let d = WeightedDistribution::named("nums").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 20_000;
        let freq = FrequencyTable::from_symbols(d.sample(n, &mut rng));

        assert_eq!(freq.total(), n as u64);
        for (s, p) in d.iter() {
            let observed = freq.count(s) as f64 / n as f64;
            assert!((observed - p).abs() < 0.02, "{} {} {}", *s as char, observed, p);
        }
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let d = WeightedDistribution::named("3bit-skewed").unwrap();
        let a = d.sample(100, &mut ChaCha8Rng::seed_from_u64(1));
        let b = d.sample(100, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn serialized_weights_are_revalidated() {
        let d = WeightedDistribution::named("letters").unwrap();
        let bytes = rmp_serde::to_vec(&d).unwrap();
        let back: WeightedDistribution<u8> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back.len(), 4);
        assert!((back.probability(&b'a') - d.probability(&b'a')).abs() < TOLERANCE);

        let raw = rmp_serde::to_vec(&BTreeMap::from([(1u8, 3.0), (2u8, 1.0)])).unwrap();
        let scaled: WeightedDistribution<u8> = rmp_serde::from_slice(&raw).unwrap();
        assert_eq!(scaled.probability(&1), 0.75);

        let zeros = rmp_serde::to_vec(&BTreeMap::from([(1u8, 0.0)])).unwrap();
        assert!(rmp_serde::from_slice::<WeightedDistribution<u8>>(&zeros).is_err());
    }
}
