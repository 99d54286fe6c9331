//! Encodes samples from the uniform and the skewed 8-letter distributions
//! with both reference codes and reports the extra bits a mismatched code
//! costs. Then builds a Huffman code over 2-byte chunks of a joint sample.
//!
//! Usage: `cargo run --example mismatch [config.json]`

use prefix_code::metrics::{cross_entropy_estimate, kl_divergence_estimate};
use prefix_code::{bits, ExperimentConfig, FrequencyTable, JointDistribution, PrefixTree, WeightedDistribution};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn preview(text: &str, n: usize) -> &str {
    &text[..n.min(text.len())]
}

fn main() -> prefix_code::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    info!(?config, "starting");
    let mut rng = config.rng();
    let n = config.sample_size;

    let cg1 = WeightedDistribution::named("3bit")?;
    let cg2 = WeightedDistribution::named("3bit-skewed")?;
    let src1 = cg1.sample(n, &mut rng);
    let src2 = cg2.sample(n, &mut rng);
    println!("src1: {}...", preview(&String::from_utf8_lossy(&src1), 50));
    println!("src2: {}...", preview(&String::from_utf8_lossy(&src2), 50));
    println!();

    // t1 is optimal for cg1, t2 for cg2
    let t1 = PrefixTree::manual("3bit")?;
    let t2 = PrefixTree::manual("3bit-skewed")?;

    for (label, tree, src) in [
        ("t1(src1)", &t1, &src1),
        ("t2(src2)", &t2, &src2),
        ("t1(src2)", &t1, &src2),
        ("t2(src1)", &t2, &src1),
    ] {
        let encoded = tree.encode(src)?;
        println!("{}: {}...", label, preview(&bits::to_bit_string(&encoded), 40));
        println!("len({}): {}", label, encoded.len());
        println!("avg bit length per char ({}): {:.6}", label, encoded.len() as f64 / n as f64);
        println!();
    }

    println!("H(cg1) = {:.6}, H(cg2) = {:.6}", cg1.entropy(), cg2.entropy());
    println!(
        "approximated H(cg2; t1): {:.6}",
        cross_entropy_estimate(&t1, &cg2, n, &mut rng)?
    );
    println!(
        "approximated KL, t1 on cg2: {:.6}",
        kl_divergence_estimate(&t1, &t2, &cg2, n, &mut rng)?
    );
    println!(
        "approximated KL, t2 on cg1: {:.6}",
        kl_divergence_estimate(&t2, &t1, &cg1, n, &mut rng)?
    );
    println!();

    let cg3 = JointDistribution::independent(&cg1, &WeightedDistribution::named("nums")?)?;
    let t3 = PrefixTree::huffman(&FrequencyTable::from_corpus(
        &cg3.sample_corpus(n, &mut rng),
        config.chunk_size,
    )?)?;
    let src3: Vec<Vec<u8>> = cg3
        .sample_corpus(n, &mut rng)
        .chunks(config.chunk_size)
        .map(<[u8]>::to_vec)
        .collect();
    let encoded = t3.encode(&src3)?;
    println!("t3(src3): {}...", preview(&bits::to_bit_string(&encoded), 50));
    println!(
        "avg bits per pair: {:.6}, H(cg3) = {:.6}",
        encoded.len() as f64 / src3.len() as f64,
        cg3.joint_entropy()
    );

    Ok(())
}
