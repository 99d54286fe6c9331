//! Joint entropy of two independent distributions, then of the same pair
//! with one combination made more likely.
//!
//! Usage: `cargo run --example joint [config.json]`

use prefix_code::{Bias, ExperimentConfig, JointDistribution, WeightedDistribution};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> prefix_code::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    let mut rng = config.rng();

    let cg1 = WeightedDistribution::named("nums")?;
    let cg2 = WeightedDistribution::named("letters")?;
    println!("H(cg1) = {:.6}", cg1.entropy());
    println!("H(cg2) = {:.6}", cg2.entropy());
    println!("H(cg1) + H(cg2) = {:.6}", cg1.entropy() + cg2.entropy());

    let independent = JointDistribution::independent(&cg1, &cg2)?;
    println!("H(jcg) independent = {:.6}", independent.joint_entropy());

    let bias = Bias {
        pair: (b'0', b'a'),
        delta: config.bias_delta,
    };
    info!(delta = bias.delta, "biasing pair 0a");
    let biased = JointDistribution::join(&cg1, &cg2, Some(bias))?;
    println!("H(jcg) biased = {:.6}", biased.joint_entropy());
    println!("I(cg1; cg2) biased = {:.6}", biased.mutual_information());

    for ((a, b), p) in biased.as_distribution().iter() {
        println!("{}{}: {:.4}", *a as char, *b as char, p);
    }
    println!("{}", String::from_utf8_lossy(&biased.sample_corpus(10, &mut rng)));

    Ok(())
}
