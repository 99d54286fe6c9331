//! Entropy, cross-entropy and KL-divergence measured through code lengths.
//!
//! The `*_estimate` functions are Monte Carlo estimators: they sample from
//! a distribution, encode the sample and average the bit length. Results
//! carry sampling variance that shrinks as `sample_size` grows. The
//! closed-form counterparts weigh each codeword length by its probability.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;
use tracing::trace;

use crate::distribution::WeightedDistribution;
use crate::error::{ConfigError, Error, Result};
use crate::tree::PrefixTree;

pub fn entropy<S: Ord>(dist: &WeightedDistribution<S>) -> f64 {
    dist.entropy()
}

/// Average bits per symbol when `sample_size` draws from `dist` are encoded
/// with `tree`.
pub fn cross_entropy_estimate<S, R>(
    tree: &PrefixTree<S>,
    dist: &WeightedDistribution<S>,
    sample_size: usize,
    rng: &mut R,
) -> Result<f64>
where
    S: Ord + Hash + Clone + Debug,
    R: Rng + ?Sized,
{
    if sample_size == 0 {
        return Err(ConfigError::ZeroSampleSize.into());
    }

    let sample = dist.sample(sample_size, rng);
    let bits = tree.encode(&sample)?.len();
    let estimate = bits as f64 / sample_size as f64;

    trace!(sample_size, bits, estimate, "cross-entropy estimate");
    Ok(estimate)
}

/// Extra bits per symbol paid for coding `dist_b` with `tree_a` instead of
/// `tree_b`. Each term draws its own sample.
///
/// When `tree_b` is optimal for `dist_b` this approximates `KL(B‖A)` in the
/// code-length sense. Swap the arguments for the other direction; the two
/// generally differ.
pub fn kl_divergence_estimate<S, R>(
    tree_a: &PrefixTree<S>,
    tree_b: &PrefixTree<S>,
    dist_b: &WeightedDistribution<S>,
    sample_size: usize,
    rng: &mut R,
) -> Result<f64>
where
    S: Ord + Hash + Clone + Debug,
    R: Rng + ?Sized,
{
    let mismatched = cross_entropy_estimate(tree_a, dist_b, sample_size, rng)?;
    let matched = cross_entropy_estimate(tree_b, dist_b, sample_size, rng)?;
    Ok(mismatched - matched)
}

/// `Σ p(s)·len(codeword(s))`: the exact bits per symbol of coding `dist`
/// with `tree`.
pub fn expected_code_length<S>(tree: &PrefixTree<S>, dist: &WeightedDistribution<S>) -> Result<f64>
where
    S: Ord + Hash + Clone + Debug,
{
    dist.iter()
        .map(|(s, p)| -> Result<f64> {
            let code = tree.codeword_of(s).ok_or_else(|| Error::Encoding {
                symbol: format!("{:?}", s),
            })?;
            Ok(p * code.len() as f64)
        })
        .sum()
}

/// Closed-form counterpart of [`kl_divergence_estimate`].
pub fn kl_divergence_exact<S>(
    tree_a: &PrefixTree<S>,
    tree_b: &PrefixTree<S>,
    dist_b: &WeightedDistribution<S>,
) -> Result<f64>
where
    S: Ord + Hash + Clone + Debug,
{
    Ok(expected_code_length(tree_a, dist_b)? - expected_code_length(tree_b, dist_b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::TOLERANCE;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn reference() -> (
        WeightedDistribution<u8>,
        WeightedDistribution<u8>,
        PrefixTree<u8>,
        PrefixTree<u8>,
    ) {
        (
            WeightedDistribution::named("3bit").unwrap(),
            WeightedDistribution::named("3bit-skewed").unwrap(),
            PrefixTree::manual("3bit").unwrap(),
            PrefixTree::manual("3bit-skewed").unwrap(),
        )
    }

    #[test]
    fn fixed_length_code_costs_three_bits_on_any_input() {
        let (uniform, skewed, balanced, _) = reference();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        assert_eq!(cross_entropy_estimate(&balanced, &uniform, 1000, &mut rng).unwrap(), 3.0);
        assert_eq!(cross_entropy_estimate(&balanced, &skewed, 1000, &mut rng).unwrap(), 3.0);
    }

    #[test]
    fn zero_sample_size() {
        let (uniform, _, balanced, _) = reference();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            cross_entropy_estimate(&balanced, &uniform, 0, &mut rng),
            Err(Error::Configuration(ConfigError::ZeroSampleSize))
        ));
    }

    #[test]
    fn estimate_fails_on_uncovered_symbols() {
        let (_, _, balanced, _) = reference();
        let nums = WeightedDistribution::named("nums").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            cross_entropy_estimate(&balanced, &nums, 10, &mut rng),
            Err(Error::Encoding { .. })
        ));
        assert!(expected_code_length(&balanced, &nums).is_err());
    }

    #[test]
    fn expected_lengths_of_reference_codes() {
        let (uniform, skewed, balanced, staircase) = reference();

        assert_eq!(expected_code_length(&balanced, &uniform).unwrap(), 3.0);
        assert_eq!(expected_code_length(&staircase, &uniform).unwrap(), 4.375);
        // dyadic weights: the staircase code meets the entropy exactly
        let h = skewed.entropy();
        assert!((expected_code_length(&staircase, &skewed).unwrap() - h).abs() < TOLERANCE);
    }

    #[test]
    fn huffman_beats_fixed_length_on_skewed_input() {
        let (_, skewed, balanced, _) = reference();
        let huffman = PrefixTree::from_distribution(&skewed).unwrap();

        let optimal = expected_code_length(&huffman, &skewed).unwrap();
        assert!(optimal <= expected_code_length(&balanced, &skewed).unwrap());
        assert!((optimal - skewed.entropy()).abs() < TOLERANCE);
    }

    #[test]
    fn exact_kl_is_asymmetric() {
        let (uniform, skewed, balanced, staircase) = reference();

        let kl_skewed = kl_divergence_exact(&balanced, &staircase, &skewed).unwrap();
        let kl_uniform = kl_divergence_exact(&staircase, &balanced, &uniform).unwrap();

        assert!((kl_skewed - (3.0 - skewed.entropy())).abs() < TOLERANCE);
        assert!((kl_uniform - 1.375).abs() < TOLERANCE);
        assert!((kl_skewed - kl_uniform).abs() > 0.1);
    }

    #[test]
    fn kl_estimate_near_exact() {
        let (_, skewed, balanced, staircase) = reference();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let estimate = kl_divergence_estimate(&balanced, &staircase, &skewed, 20_000, &mut rng).unwrap();
        let exact = kl_divergence_exact(&balanced, &staircase, &skewed).unwrap();
        assert!((estimate - exact).abs() < 0.05, "{} vs {}", estimate, exact);
    }
}
