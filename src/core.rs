//! The [`Prior`] capability shared by every distribution in this crate.

use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Tag naming the family a prior belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorKind {
    Continuous,
    Categorical,
    Binary,
    MixedBinary,
    MixedCategorical,
    Dataset,
}

impl fmt::Display for PriorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriorKind::Continuous => "continuous",
            PriorKind::Categorical => "categorical",
            PriorKind::Binary => "binary",
            PriorKind::MixedBinary => "mixedbinary",
            PriorKind::MixedCategorical => "mixedcategorical",
            PriorKind::Dataset => "dataset",
        };
        f.write_str(name)
    }
}

/// A distribution over an `n_dims`-dimensional search space.
///
/// `sample(n)` always yields an `n × n_dims` array. `pdf` and `logpdf` return
/// one value per input row, aligned with the input.
pub trait Prior {
    /// The family this prior belongs to.
    fn kind(&self) -> PriorKind;

    /// Number of coordinates per sample, fixed at construction.
    fn n_dims(&self) -> usize;

    /// Draws `n` samples using the caller's random number generator.
    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>>;

    /// Evaluates the density (or mass) at every row of `x`.
    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>>;

    /// Evaluates the log-density at every row of `x`.
    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.pdf(x)?.mapv(f64::ln))
    }
}

/// Fails with [`Error::DimensionMismatch`] unless `x` has exactly `expected` columns.
pub(crate) fn check_columns(x: &ArrayView2<f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            got: x.ncols(),
        });
    }
    Ok(())
}
