/*!
Continuous priors: an axis-aligned [`Uniform`] box and a full-covariance [`Gaussian`].

# Examples

```rust
use sober_priors::continuous::Uniform;
use sober_priors::core::Prior;
use ndarray::array;
use rand::{rngs::SmallRng, SeedableRng};

let prior = Uniform::new(array![0.0, 0.0], array![1.0, 1.0]).unwrap();
let mut rng = SmallRng::seed_from_u64(42);
let x = prior.sample(5, &mut rng).unwrap();
assert_eq!(x.dim(), (5, 2));

let p = prior.pdf(array![[0.5, 0.5], [0.0, 0.0]].view()).unwrap();
assert_eq!(p, array![1.0, 0.0]);
```
*/

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

use crate::core::{check_columns, Prior, PriorKind};
use crate::error::{Error, Result};
use crate::quasi;

/// Uniform distribution over the open box `(mins, maxs)`.
///
/// Points lying exactly on a face of the box are treated as outside it, so two
/// boxes sharing a face never both claim the shared boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    mins: Array1<f64>,
    maxs: Array1<f64>,
    quasi: bool,
}

impl Uniform {
    /// Creates a uniform prior; `n_dims` is the length of the bound vectors.
    pub fn new(mins: Array1<f64>, maxs: Array1<f64>) -> Result<Self> {
        if mins.len() != maxs.len() {
            return Err(Error::DimensionMismatch {
                expected: mins.len(),
                got: maxs.len(),
            });
        }
        if mins.is_empty() {
            return Err(Error::InvalidConfig(
                "uniform prior needs at least one dimension".into(),
            ));
        }
        for (dim, (&min, &max)) in mins.iter().zip(maxs.iter()).enumerate() {
            // Also rejects NaN bounds.
            if !(min < max) {
                return Err(Error::InvalidBounds { dim, min, max });
            }
        }
        Ok(Self {
            mins,
            maxs,
            quasi: true,
        })
    }

    /// Creates an `n_dims`-dimensional cube `(min, max)^n_dims`.
    pub fn cube(n_dims: usize, min: f64, max: f64) -> Result<Self> {
        Self::new(Array1::from_elem(n_dims, min), Array1::from_elem(n_dims, max))
    }

    /// Chooses between scrambled Sobol (`true`, the default) and plain Monte
    /// Carlo draws for [`Prior::sample`].
    pub fn with_quasi(mut self, quasi: bool) -> Self {
        self.quasi = quasi;
        self
    }

    pub fn mins(&self) -> ArrayView1<f64> {
        self.mins.view()
    }

    pub fn maxs(&self) -> ArrayView1<f64> {
        self.maxs.view()
    }

    /// Draws `n` points, from a scrambled Sobol sequence when `quasi` is set.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        n: usize,
        quasi: bool,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        let unit = if quasi {
            quasi::sobol(n, self.mins.len(), rng)?
        } else {
            quasi::monte_carlo(n, self.mins.len(), rng)
        };
        let width = &self.maxs - &self.mins;
        Ok(unit * &width + &self.mins)
    }

    /// `1 / ∏(maxs - mins)`, the density anywhere inside the box.
    pub fn density(&self) -> f64 {
        Zip::from(&self.mins)
            .and(&self.maxs)
            .fold(1.0, |acc, &lo, &hi| acc / (hi - lo))
    }

    /// Per-row strict-interior test: `mins < x < maxs` on every coordinate.
    pub fn contains(&self, x: ArrayView2<f64>) -> Result<Array1<bool>> {
        check_columns(&x, self.mins.len())?;
        Ok(x.map_axis(Axis(1), |row| {
            Zip::from(&row)
                .and(&self.mins)
                .and(&self.maxs)
                .all(|&v, &lo, &hi| lo < v && v < hi)
        }))
    }
}

impl Prior for Uniform {
    fn kind(&self) -> PriorKind {
        PriorKind::Continuous
    }

    fn n_dims(&self) -> usize {
        self.mins.len()
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        self.sample_with(n, self.quasi, rng)
    }

    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let density = self.density();
        Ok(self
            .contains(x)?
            .mapv(|inside| if inside { density } else { 0.0 }))
    }

    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let log_density = self.density().ln();
        Ok(self.contains(x)?.mapv(|inside| {
            if inside {
                log_density
            } else {
                f64::NEG_INFINITY
            }
        }))
    }
}

/// Multivariate normal distribution with mean `mean` and covariance `cov`.
#[derive(Debug, Clone)]
pub struct Gaussian {
    mean: Array1<f64>,
    cov: Array2<f64>,
    /// Lower Cholesky factor of `cov`.
    chol: DMatrix<f64>,
    log_det: f64,
}

impl Gaussian {
    /// Creates a Gaussian prior. Fails unless `cov` is square, matches `mean`,
    /// and is positive definite.
    pub fn new(mean: Array1<f64>, cov: Array2<f64>) -> Result<Self> {
        let d = mean.len();
        if d == 0 {
            return Err(Error::InvalidConfig(
                "gaussian prior needs at least one dimension".into(),
            ));
        }
        if cov.dim() != (d, d) {
            return Err(Error::InvalidCovariance(format!(
                "expected a {d}x{d} matrix, got {:?}",
                cov.dim()
            )));
        }
        let matrix = DMatrix::from_fn(d, d, |i, j| cov[[i, j]]);
        let chol = nalgebra::Cholesky::new(matrix)
            .ok_or_else(|| Error::InvalidCovariance("matrix is not positive definite".into()))?
            .l();
        let log_det = 2.0 * chol.diagonal().iter().map(|l| l.ln()).sum::<f64>();
        Ok(Self {
            mean,
            cov,
            chol,
            log_det,
        })
    }

    pub fn mean(&self) -> ArrayView1<f64> {
        self.mean.view()
    }

    pub fn cov(&self) -> ArrayView2<f64> {
        self.cov.view()
    }

    fn log_prob_row(&self, row: ArrayView1<f64>) -> f64 {
        let d = self.mean.len();
        let diff = DVector::from_iterator(d, row.iter().zip(self.mean.iter()).map(|(x, m)| x - m));
        // `chol` has a strictly positive diagonal, so the solve cannot fail.
        let maha = self
            .chol
            .solve_lower_triangular(&diff)
            .map_or(f64::INFINITY, |z| z.norm_squared());
        -0.5 * (d as f64 * (2.0 * PI).ln() + self.log_det + maha)
    }
}

impl Prior for Gaussian {
    fn kind(&self) -> PriorKind {
        PriorKind::Continuous
    }

    fn n_dims(&self) -> usize {
        self.mean.len()
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        let d = self.mean.len();
        let mut out = Array2::<f64>::zeros((n, d));
        for mut row in out.rows_mut() {
            let z = DVector::from_fn(d, |_, _| rng.sample::<f64, _>(StandardNormal));
            let x = &self.chol * z;
            Zip::from(&mut row)
                .and(&self.mean)
                .and(x.as_slice())
                .for_each(|o, &m, &v| *o = m + v);
        }
        Ok(out)
    }

    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.logpdf(x)?.mapv(f64::exp))
    }

    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        check_columns(&x, self.mean.len())?;
        Ok(x.map_axis(Axis(1), |row| self.log_prob_row(row)))
    }
}
