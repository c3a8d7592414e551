//! A small end-to-end demo: sample from a prior, weight the samples, pick a
//! deweighted subset, then drain part of a dataset-backed pool.
//!
//! Usage: `demo [config.json]`. Without an argument the mixed Ackley domain is used.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use sober_priors::config::PriorConfig;
use sober_priors::continuous::Gaussian;
use sober_priors::dataset::DatasetPrior;
use sober_priors::weights::WeightStabiliser;
use sober_priors::Prior;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const N_SAMPLES: usize = 2_000;
const N_SUBSET: usize = 100;
const SEED: u64 = 42;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PriorConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PriorConfig::ackley(),
    };
    run(&config)
}

fn run(config: &PriorConfig) -> Result<(), Box<dyn Error>> {
    let prior = config.build()?;
    let mut rng = SmallRng::seed_from_u64(SEED);

    let samples = prior.sample(N_SAMPLES, &mut rng)?;
    let logp = prior.logpdf(samples.view())?;
    info!(kind = %prior.kind(), n_dims = prior.n_dims(), "sampled prior");
    info!(
        mean_logpdf = logp.mean().unwrap_or(f64::NAN),
        "evaluated log-density"
    );

    // Importance weights of a narrower Gaussian proposal relative to the prior.
    let d = prior.n_dims();
    let proposal = Gaussian::new(Array1::zeros(d), Array2::eye(d) * 0.25)?;
    let log_w = proposal.logpdf(samples.view())? - &logp;
    let max_log_w = log_w.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let stabiliser = WeightStabiliser::default();
    let weights = stabiliser.cleanse(log_w.mapv(|l| (l - max_log_w).exp()).view());
    if stabiliser.is_degenerate(weights.view()) {
        info!("weights have too few distinct values to be informative");
    }
    let subset = stabiliser.deweighted_resample(weights.view(), N_SUBSET, &mut rng)?;
    let picked = samples.select(Axis(0), &subset);
    info!(
        subset = picked.nrows(),
        first = ?picked.row(0).to_vec(),
        "selected deweighted subset"
    );

    // A toy dataset of every 4-bit string labelled by its popcount.
    let features = Array2::from_shape_fn((16, 4), |(i, j)| ((i >> j) & 1) as f64);
    let labels = features.sum_axis(Axis(1));
    let mut pool = DatasetPrior::new(features.view(), labels.view())?;
    let (x, y) = pool.sample(4, &mut rng)?;
    info!(drawn = ?y.to_vec(), remaining = pool.n_available(), "drew from dataset pool");
    let peek = pool.sample_feature(2, &mut rng)?;
    let y_peek = pool.query(peek.view())?;
    info!(
        queried = ?y_peek.to_vec(),
        remaining = pool.n_available(),
        first_drawn = ?x.row(0).to_vec(),
        "queried peeked candidates"
    );
    Ok(())
}

#[test]
fn test_run() {
    run(&PriorConfig::ackley()).expect("Expected the demo to not return an error.");
    run(&PriorConfig::shekel()).expect("Expected the demo to not return an error.");
}
