//! Tests checking that the generative priors produce samples from the distribution they claim.
//!
//! This file includes:
//! 1. Support and density checks for the uniform box, including the boundary policy.
//! 2. Two-sample KS tests comparing quasi-random and Monte Carlo marginals.
//! 3. A KS test comparing Gaussian prior marginals with reference normal draws.
//! 4. Ordering checks for the mixed priors.

use ndarray::{array, s, Array1, Array2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sober_priors::continuous::{Gaussian, Uniform};
use sober_priors::mixed::{MixedBinaryPrior, MixedCategoricalPrior};
use sober_priors::Prior;

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 42;

    #[test]
    fn test_unit_square_scenario() {
        let prior = Uniform::new(array![0.0, 0.0], array![1.0, 1.0]).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let x = prior.sample(5, &mut rng).unwrap();
        assert_eq!(x.dim(), (5, 2));
        assert!(x.iter().all(|&v| v > 0.0 && v < 1.0));

        let p = prior.pdf(array![[0.0, 0.0], [0.5, 0.5]].view()).unwrap();
        assert_eq!(p, array![0.0, 1.0]);
    }

    #[test]
    fn test_uniform_density_on_own_samples() {
        let mins = array![-3.0, 0.0, 100.0, -0.5];
        let maxs = array![2.0, 0.5, 101.0, 0.5];
        let prior = Uniform::new(mins.clone(), maxs.clone()).unwrap();
        let expected = 1.0 / (5.0 * 0.5 * 1.0 * 1.0);
        let mut rng = SmallRng::seed_from_u64(SEED);
        for quasi in [true, false] {
            let x = prior.sample_with(1_000, quasi, &mut rng).unwrap();
            let p = prior.pdf(x.view()).unwrap();
            assert!(
                p.iter().all(|&v| (v - expected).abs() < 1e-12),
                "Expected constant density {expected}"
            );
        }
    }

    #[test]
    fn test_uniform_boundary_points_have_zero_density() {
        let prior = Uniform::cube(3, -1.0, 1.0).unwrap();
        let mut x = Array2::from_elem((6, 3), 0.25);
        for d in 0..3 {
            x[[2 * d, d]] = -1.0;
            x[[2 * d + 1, d]] = 1.0;
        }
        let p = prior.pdf(x.view()).unwrap();
        assert_eq!(p, Array1::<f64>::zeros(6));
        let lp = prior.logpdf(x.view()).unwrap();
        assert!(lp.iter().all(|&v| v == f64::NEG_INFINITY));
    }

    #[test]
    fn test_quasi_and_monte_carlo_agree() {
        let prior = Uniform::cube(3, 0.0, 10.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let quasi = prior.sample_with(1_024, true, &mut rng).unwrap();
        let mc = prior.sample_with(1_024, false, &mut rng).unwrap();
        for d in 0..3 {
            let a = quasi.column(d).to_vec();
            let b = mc.column(d).to_vec();
            let result = kolmogorov_smirnov::test_f64(&a, &b, 0.999);
            assert!(
                !result.is_rejected,
                "KS test rejected equal marginals in dim {d}: statistic {}",
                result.statistic
            );
        }
    }

    #[test]
    fn test_shifted_uniform_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(SEED);
        let a = Uniform::cube(1, 0.0, 1.0)
            .unwrap()
            .sample(1_000, &mut rng)
            .unwrap();
        let b = Uniform::cube(1, 0.4, 1.4)
            .unwrap()
            .sample(1_000, &mut rng)
            .unwrap();
        let (a, b) = (a.column(0).to_vec(), b.column(0).to_vec());
        let result = kolmogorov_smirnov::test_f64(&a, &b, 0.95);
        assert!(result.is_rejected, "Expected the KS test to reject shifted samples.");
    }

    #[test]
    fn test_gaussian_marginals_match_reference() {
        let prior = Gaussian::new(array![2.0, -1.0], array![[4.0, 1.0], [1.0, 1.0]]).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let x = prior.sample(1_000, &mut rng).unwrap();

        // The first marginal is N(2, 4).
        let reference: Vec<f64> = (0..1_000)
            .map(|_| 2.0 + 2.0 * rng.sample::<f64, _>(StandardNormal))
            .collect();
        let result = kolmogorov_smirnov::test_f64(&x.column(0).to_vec(), &reference, 0.999);
        assert!(!result.is_rejected, "Gaussian marginal rejected: {}", result.statistic);

        let lp = prior.logpdf(x.view()).unwrap();
        assert!(lp.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_mixed_ordering_is_symmetric() {
        let mut rng = SmallRng::seed_from_u64(SEED);
        let leading = MixedBinaryPrior::binary(3, 20, -1.0, 1.0, true).unwrap();
        let trailing = MixedBinaryPrior::binary(3, 20, -1.0, 1.0, false).unwrap();

        let x = leading.sample(64, &mut rng).unwrap();
        // Move the continuous block from the front to the back.
        let swapped = ndarray::concatenate(
            ndarray::Axis(1),
            &[x.slice(s![.., 3..]), x.slice(s![.., ..3])],
        )
        .unwrap();
        let p_leading = leading.logpdf(x.view()).unwrap();
        let p_trailing = trailing.logpdf(swapped.view()).unwrap();
        assert_eq!(p_leading, p_trailing);
        assert!(p_leading.iter().all(|v| v.is_finite()));

        // Feeding the unswapped layout to the trailing prior puts binary values
        // where it expects continuous ones and vice versa.
        let wrong = trailing.pdf(x.view()).unwrap();
        assert!(wrong.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mixed_categorical_indices_rebuild_values() {
        let prior = MixedCategoricalPrior::categorical(2, 4, 3, -2.0, 2.0, false).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let (values, indices) = prior.sample_both(32, &mut rng).unwrap();
        let levels = prior.discrete().levels();
        for (v_row, i_row) in values.rows().into_iter().zip(indices.rows()) {
            for d in 0..4 {
                let level = levels[i_row[d] as usize];
                assert!((v_row[d] - level).abs() < 1e-12);
            }
            assert_eq!(v_row.slice(s![4..]), i_row.slice(s![4..]));
        }
    }
}
