/*!
Discrete priors over independent coordinates.

[`CategoricalPrior`] places uniform mass on `n_discrete` evenly spaced levels
spanning `[min, max]` (both ends included). [`BinaryPrior`] is an independent
fair Bernoulli per coordinate.
*/

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Bernoulli, Uniform as UniformInt};
use rand::Rng;

use crate::core::{check_columns, Prior, PriorKind};
use crate::error::{Error, Result};

/// Uniform categorical distribution over an evenly spaced grid, independently per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalPrior {
    n_dims: usize,
    levels: Array1<f64>,
}

impl CategoricalPrior {
    pub fn new(n_dims: usize, min: f64, max: f64, n_discrete: usize) -> Result<Self> {
        if n_dims == 0 {
            return Err(Error::InvalidConfig(
                "categorical prior needs at least one dimension".into(),
            ));
        }
        if n_discrete == 0 {
            return Err(Error::InvalidConfig(
                "categorical prior needs at least one level".into(),
            ));
        }
        if !(min < max) && n_discrete > 1 {
            return Err(Error::InvalidBounds { dim: 0, min, max });
        }
        Ok(Self {
            n_dims,
            levels: Array1::linspace(min, max, n_discrete),
        })
    }

    /// The grid of values each coordinate can take.
    pub fn levels(&self) -> &Array1<f64> {
        &self.levels
    }

    pub fn n_discrete(&self) -> usize {
        self.levels.len()
    }

    /// Mass of a single level, `1 / n_discrete`.
    pub fn pmf(&self) -> f64 {
        1.0 / self.levels.len() as f64
    }

    /// Draws `n` rows of level indices in `0..n_discrete`.
    pub fn sample_indices<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Array2<usize> {
        let levels = UniformInt::new(0, self.levels.len());
        Array2::from_shape_simple_fn((n, self.n_dims), || rng.sample(&levels))
    }

    /// Maps level indices to their grid values.
    pub fn values_from_indices(&self, indices: &Array2<usize>) -> Array2<f64> {
        indices.mapv(|i| self.levels[i])
    }

    /// Draws `n` samples, returning both the grid values and their level indices.
    pub fn sample_both<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> (Array2<f64>, Array2<usize>) {
        let indices = self.sample_indices(n, rng);
        (self.values_from_indices(&indices), indices)
    }
}

impl Prior for CategoricalPrior {
    fn kind(&self) -> PriorKind {
        PriorKind::Categorical
    }

    fn n_dims(&self) -> usize {
        self.n_dims
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        Ok(self.sample_both(n, rng).0)
    }

    /// Product of the per-dimension level mass. Values are not checked against the grid.
    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        check_columns(&x, self.n_dims)?;
        Ok(Array1::from_elem(
            x.nrows(),
            self.pmf().powi(self.n_dims as i32),
        ))
    }

    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        check_columns(&x, self.n_dims)?;
        Ok(Array1::from_elem(
            x.nrows(),
            self.n_dims as f64 * self.pmf().ln(),
        ))
    }
}

/// Independent Bernoulli(0.5) coordinates taking values in `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryPrior {
    n_dims: usize,
}

impl BinaryPrior {
    const P: f64 = 0.5;

    pub fn new(n_dims: usize) -> Result<Self> {
        if n_dims == 0 {
            return Err(Error::InvalidConfig(
                "binary prior needs at least one dimension".into(),
            ));
        }
        Ok(Self { n_dims })
    }

    fn log_mass(v: f64) -> f64 {
        if v == 1.0 {
            Self::P.ln()
        } else if v == 0.0 {
            (1.0 - Self::P).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl Prior for BinaryPrior {
    fn kind(&self) -> PriorKind {
        PriorKind::Binary
    }

    fn n_dims(&self) -> usize {
        self.n_dims
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        let coin = Bernoulli::new(Self::P).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(Array2::from_shape_simple_fn((n, self.n_dims), || {
            if rng.sample(&coin) {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.logpdf(x)?.mapv(f64::exp))
    }

    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        check_columns(&x, self.n_dims)?;
        Ok(x.map_axis(Axis(1), |row| row.iter().map(|&v| Self::log_mass(v)).sum::<f64>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn categorical_levels_include_endpoints() {
        let prior = CategoricalPrior::new(3, -1.0, 1.0, 5).unwrap();
        assert_abs_diff_eq!(
            prior.levels().clone(),
            array![-1.0, -0.5, 0.0, 0.5, 1.0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn categorical_sample_both_is_consistent() {
        let prior = CategoricalPrior::new(4, 0.0, 3.0, 4).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let (values, indices) = prior.sample_both(200, &mut rng);
        assert_eq!(values.dim(), (200, 4));
        assert_eq!(indices.dim(), (200, 4));
        for (v, &i) in values.iter().zip(indices.iter()) {
            assert!(i < 4);
            assert_abs_diff_eq!(*v, i as f64, epsilon = 1e-12);
        }
        // Every level shows up in 800 draws.
        for level in 0..4 {
            assert!(indices.iter().any(|&i| i == level));
        }
    }

    #[test]
    fn categorical_pdf_is_product_of_masses() {
        let prior = CategoricalPrior::new(2, 0.0, 1.0, 4).unwrap();
        let x = array![[0.0, 1.0], [1.0 / 3.0, 2.0 / 3.0]];
        let p = prior.pdf(x.view()).unwrap();
        assert_abs_diff_eq!(p, array![1.0 / 16.0, 1.0 / 16.0], epsilon = 1e-15);
        let lp = prior.logpdf(x.view()).unwrap();
        assert_abs_diff_eq!(lp[0], (1.0f64 / 16.0).ln(), epsilon = 1e-12);
        assert!(prior.pdf(Array2::zeros((1, 3)).view()).is_err());
    }

    #[test]
    fn binary_samples_are_zero_or_one() {
        let prior = BinaryPrior::new(6).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let x = prior.sample(1000, &mut rng).unwrap();
        assert_eq!(x.dim(), (1000, 6));
        assert!(x.iter().all(|&v| v == 0.0 || v == 1.0));
        let frac = x.sum() / x.len() as f64;
        assert!((frac - 0.5).abs() < 0.05, "Unexpected frequency {frac}");
    }

    #[test]
    fn binary_mass() {
        let prior = BinaryPrior::new(3).unwrap();
        let x = array![[0.0, 1.0, 1.0], [0.0, 0.5, 1.0]];
        let p = prior.pdf(x.view()).unwrap();
        assert_abs_diff_eq!(p, array![0.125, 0.0], epsilon = 1e-15);
        let lp = prior.logpdf(x.view()).unwrap();
        assert_abs_diff_eq!(lp[0], 3.0 * 0.5f64.ln(), epsilon = 1e-12);
        assert_eq!(lp[1], f64::NEG_INFINITY);
    }
}
