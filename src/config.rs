/*!
Declarative prior configuration.

A [`PriorConfig`] describes any generative prior and can be read from JSON
(or any serde format). [`PriorConfig::build`] validates it and produces an
[`AnyPrior`], which implements [`Prior`] by delegating to the concrete type.

```rust
use sober_priors::config::PriorConfig;
use sober_priors::core::Prior;

let config: PriorConfig = serde_json::from_str(
    r#"{ "type": "mixed_binary", "n_cont": 3, "n_binary": 20, "min": -1.0, "max": 1.0 }"#,
).unwrap();
let prior = config.build().unwrap();
assert_eq!(prior.n_dims(), 23);
```
*/

use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::continuous::{Gaussian, Uniform};
use crate::core::{Prior, PriorKind};
use crate::discrete::{BinaryPrior, CategoricalPrior};
use crate::error::{Error, Result};
use crate::mixed::{MixedBinaryPrior, MixedCategoricalPrior};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PriorConfig {
    Uniform {
        mins: Vec<f64>,
        maxs: Vec<f64>,
        #[serde(default = "default_true")]
        quasi: bool,
    },
    Gaussian {
        mean: Vec<f64>,
        cov: Vec<Vec<f64>>,
    },
    Categorical {
        n_dims: usize,
        min: f64,
        max: f64,
        n_discrete: usize,
    },
    Binary {
        n_dims: usize,
    },
    MixedBinary {
        n_cont: usize,
        n_binary: usize,
        min: f64,
        max: f64,
        #[serde(default = "default_true")]
        continuous_first: bool,
    },
    MixedCategorical {
        n_cont: usize,
        n_disc: usize,
        n_discrete: usize,
        min: f64,
        max: f64,
        #[serde(default = "default_true")]
        continuous_first: bool,
    },
}

impl PriorConfig {
    /// Four continuous dimensions on `(0, 10)`, the Shekel benchmark domain.
    pub fn shekel() -> Self {
        PriorConfig::Uniform {
            mins: vec![0.0; 4],
            maxs: vec![10.0; 4],
            quasi: true,
        }
    }

    /// Three continuous dimensions on `(-1, 1)` followed by twenty binary
    /// ones, the mixed Ackley benchmark domain.
    pub fn ackley() -> Self {
        PriorConfig::MixedBinary {
            n_cont: 3,
            n_binary: 20,
            min: -1.0,
            max: 1.0,
            continuous_first: true,
        }
    }

    /// Reads a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Validates the configuration and constructs the prior.
    pub fn build(&self) -> Result<AnyPrior> {
        let prior = match self {
            PriorConfig::Uniform { mins, maxs, quasi } => AnyPrior::Uniform(
                Uniform::new(Array1::from(mins.clone()), Array1::from(maxs.clone()))?
                    .with_quasi(*quasi),
            ),
            PriorConfig::Gaussian { mean, cov } => {
                let d = cov.len();
                if cov.iter().any(|row| row.len() != d) {
                    return Err(Error::InvalidCovariance(
                        "covariance rows must all have the same length as the matrix height"
                            .into(),
                    ));
                }
                let cov = Array2::from_shape_fn((d, d), |(i, j)| cov[i][j]);
                AnyPrior::Gaussian(Gaussian::new(Array1::from(mean.clone()), cov)?)
            }
            PriorConfig::Categorical {
                n_dims,
                min,
                max,
                n_discrete,
            } => AnyPrior::Categorical(CategoricalPrior::new(*n_dims, *min, *max, *n_discrete)?),
            PriorConfig::Binary { n_dims } => AnyPrior::Binary(BinaryPrior::new(*n_dims)?),
            PriorConfig::MixedBinary {
                n_cont,
                n_binary,
                min,
                max,
                continuous_first,
            } => AnyPrior::MixedBinary(MixedBinaryPrior::binary(
                *n_cont,
                *n_binary,
                *min,
                *max,
                *continuous_first,
            )?),
            PriorConfig::MixedCategorical {
                n_cont,
                n_disc,
                n_discrete,
                min,
                max,
                continuous_first,
            } => AnyPrior::MixedCategorical(MixedCategoricalPrior::categorical(
                *n_cont,
                *n_disc,
                *n_discrete,
                *min,
                *max,
                *continuous_first,
            )?),
        };
        Ok(prior)
    }
}

/// Any generative prior built from a [`PriorConfig`].
#[derive(Debug, Clone)]
pub enum AnyPrior {
    Uniform(Uniform),
    Gaussian(Gaussian),
    Categorical(CategoricalPrior),
    Binary(BinaryPrior),
    MixedBinary(MixedBinaryPrior),
    MixedCategorical(MixedCategoricalPrior),
}

macro_rules! delegate {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            AnyPrior::Uniform($p) => $body,
            AnyPrior::Gaussian($p) => $body,
            AnyPrior::Categorical($p) => $body,
            AnyPrior::Binary($p) => $body,
            AnyPrior::MixedBinary($p) => $body,
            AnyPrior::MixedCategorical($p) => $body,
        }
    };
}

impl Prior for AnyPrior {
    fn kind(&self) -> PriorKind {
        delegate!(self, p => p.kind())
    }

    fn n_dims(&self) -> usize {
        delegate!(self, p => p.n_dims())
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        delegate!(self, p => p.sample(n, rng))
    }

    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        delegate!(self, p => p.pdf(x))
    }

    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        delegate!(self, p => p.logpdf(x))
    }
}
