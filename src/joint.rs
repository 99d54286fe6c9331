//! Distributions over symbol pairs built from two component distributions.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::distribution::{entropy_of, WeightedDistribution};
use crate::error::{ConfigError, Result};

/// Extra weight added to one pair before renormalizing, which makes the two
/// components dependent.
#[derive(Debug, Clone, PartialEq)]
pub struct Bias<A, B> {
    pub pair: (A, B),
    pub delta: f64,
}

/// A normalized distribution over the Cartesian product of two alphabets.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDistribution<A, B> {
    dist: WeightedDistribution<(A, B)>,
}

impl<A, B> JointDistribution<A, B>
where
    A: Ord + Clone,
    B: Ord + Clone,
{
    /// Weighs each pair `(a, b)` by `p1(a)·p2(b)`, adds `bias.delta` to the
    /// biased pair and renormalizes the table.
    pub fn join(
        d1: &WeightedDistribution<A>,
        d2: &WeightedDistribution<B>,
        bias: Option<Bias<A, B>>,
    ) -> Result<Self> {
        let mut weights = BTreeMap::new();
        for (a, p1) in d1.iter() {
            for (b, p2) in d2.iter() {
                weights.insert((a.clone(), b.clone()), p1 * p2);
            }
        }

        if let Some(bias) = bias {
            let w = weights
                .get_mut(&bias.pair)
                .ok_or(ConfigError::UnknownBiasPair)?;
            *w += bias.delta;
        }

        let dist = WeightedDistribution::new(weights)?;
        debug!(
            left = d1.len(),
            right = d2.len(),
            pairs = dist.len(),
            "joined distributions"
        );
        Ok(Self { dist })
    }

    pub fn independent(d1: &WeightedDistribution<A>, d2: &WeightedDistribution<B>) -> Result<Self> {
        Self::join(d1, d2, None)
    }

    pub fn probability(&self, a: &A, b: &B) -> f64 {
        self.dist.probability(&(a.clone(), b.clone()))
    }

    pub fn joint_entropy(&self) -> f64 {
        self.dist.entropy()
    }

    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<(A, B)> {
        self.dist.sample(count, rng)
    }

    fn marginal_weights(&self) -> (BTreeMap<A, f64>, BTreeMap<B, f64>) {
        let mut left = BTreeMap::new();
        let mut right = BTreeMap::new();
        for ((a, b), p) in self.dist.iter() {
            *left.entry(a.clone()).or_insert(0.0) += p;
            *right.entry(b.clone()).or_insert(0.0) += p;
        }

        (left, right)
    }

    pub fn marginals(&self) -> Result<(WeightedDistribution<A>, WeightedDistribution<B>)> {
        let (left, right) = self.marginal_weights();
        Ok((WeightedDistribution::new(left)?, WeightedDistribution::new(right)?))
    }

    /// `H(X) + H(Y) - H(X,Y)` over this joint's own marginals. Zero, up to
    /// rounding, when the components are independent.
    pub fn mutual_information(&self) -> f64 {
        let (left, right) = self.marginal_weights();
        entropy_of(left.values()) + entropy_of(right.values()) - self.joint_entropy()
    }

    /// The pair-keyed distribution, e.g. for building a Huffman code over pairs.
    pub fn as_distribution(&self) -> &WeightedDistribution<(A, B)> {
        &self.dist
    }

    pub fn len(&self) -> usize {
        self.dist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }
}

impl JointDistribution<u8, u8> {
    /// Samples `count` pairs laid out back to back as a byte corpus, ready to
    /// be counted in 2-byte chunks.
    pub fn sample_corpus<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<u8> {
        self.sample(count, rng)
            .into_iter()
            .flat_map(|(a, b)| [a, b])
            .collect()
    }
}
