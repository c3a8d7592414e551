//! Scrambled Sobol point sets on the unit hypercube.
//!
//! Points come from an Owen-scrambled Sobol sequence (Burley 2020). The
//! scrambling seed is drawn from the caller's generator, so two calls with the
//! same seeded RNG yield identical point sets while successive calls on one
//! generator give independent randomisations.

use ndarray::Array2;
use rand::Rng;
use tracing::warn;

use crate::error::{Error, Result};

/// Highest dimensionality the Sobol tables support.
pub const MAX_DIMS: usize = sobol_burley::NUM_DIMENSIONS as usize;

/// Longest point set the Sobol tables can index.
pub const MAX_POINTS: usize = 1 << 16;

/// Draws `n` scrambled Sobol points in `[0, 1)^n_dims`.
///
/// Requests longer than [`MAX_POINTS`] fall back to Monte Carlo points.
pub fn sobol<R: Rng + ?Sized>(n: usize, n_dims: usize, rng: &mut R) -> Result<Array2<f64>> {
    if n_dims > MAX_DIMS {
        return Err(Error::InvalidConfig(format!(
            "quasi-random sampling supports at most {MAX_DIMS} dimensions, got {n_dims}"
        )));
    }
    if n > MAX_POINTS {
        warn!(
            requested = n,
            max = MAX_POINTS,
            "too many points for a Sobol sequence; drawing Monte Carlo points instead"
        );
        return Ok(monte_carlo(n, n_dims, rng));
    }
    let seed: u32 = rng.gen();
    Ok(Array2::from_shape_fn((n, n_dims), |(i, d)| {
        f64::from(sobol_burley::sample(i as u32, d as u32, seed))
    }))
}

/// Draws `n` independent uniform points in `[0, 1)^n_dims`.
pub fn monte_carlo<R: Rng + ?Sized>(n: usize, n_dims: usize, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_simple_fn((n, n_dims), || rng.gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn sobol_points_lie_in_unit_cube() {
        let mut rng = SmallRng::seed_from_u64(42);
        let points = sobol(256, 5, &mut rng).unwrap();
        assert_eq!(points.dim(), (256, 5));
        assert!(points.iter().all(|&u| (0.0..1.0).contains(&u)));
    }

    #[test]
    fn sobol_is_reproducible_for_a_seed() {
        let a = sobol(32, 3, &mut SmallRng::seed_from_u64(7)).unwrap();
        let b = sobol(32, 3, &mut SmallRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sobol_fills_strata_evenly() {
        // Any 2^k prefix of a Sobol sequence places exactly one point per 1/2^k stratum.
        let mut rng = SmallRng::seed_from_u64(3);
        let points = sobol(16, 2, &mut rng).unwrap();
        for d in 0..2 {
            let mut counts = [0usize; 16];
            for &u in points.column(d) {
                counts[(u * 16.0) as usize] += 1;
            }
            assert!(counts.iter().all(|&c| c == 1), "Uneven strata: {counts:?}");
        }
    }

    #[test]
    fn sobol_rejects_too_many_dims() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(sobol(4, MAX_DIMS + 1, &mut rng).is_err());
    }

    #[test]
    fn long_requests_fall_back_to_monte_carlo() {
        let mut rng = SmallRng::seed_from_u64(11);
        let points = sobol(MAX_POINTS + 1, 2, &mut rng).unwrap();
        assert_eq!(points.dim(), (MAX_POINTS + 1, 2));
        assert!(points.iter().all(|&u| (0.0..1.0).contains(&u)));

        let full = sobol(MAX_POINTS, 1, &mut rng).unwrap();
        assert_eq!(full.nrows(), MAX_POINTS);
    }

    #[test]
    fn monte_carlo_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let points = monte_carlo(10, 4, &mut rng);
        assert_eq!(points.dim(), (10, 4));
        assert!(points.iter().all(|&u| (0.0..1.0).contains(&u)));
    }
}
