/*!
Mixed continuous/discrete priors.

A [`MixedPrior`] joins a [`Uniform`] block with a discrete block (binary or
categorical). The two groups are independent, so the joint density is the
product of the marginals. Column placement is governed by a [`BlockLayout`]
that is shared by sampling and density evaluation.

# Examples

```rust
use sober_priors::core::Prior;
use sober_priors::mixed::MixedBinaryPrior;
use rand::{rngs::SmallRng, SeedableRng};

// Three continuous coordinates in (-1, 1) followed by twenty binary ones.
let prior = MixedBinaryPrior::binary(3, 20, -1.0, 1.0, true).unwrap();
let mut rng = SmallRng::seed_from_u64(0);
let x = prior.sample(8, &mut rng).unwrap();
assert_eq!(x.dim(), (8, 23));
let lp = prior.logpdf(x.view()).unwrap();
assert_eq!(lp.len(), 8);
```
*/

use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;

use crate::continuous::Uniform;
use crate::core::{Prior, PriorKind};
use crate::discrete::{BinaryPrior, CategoricalPrior};
use crate::error::{Error, Result};
use crate::layout::{BlockKind, BlockLayout};

/// Product of a uniform continuous block and a discrete block `D`.
#[derive(Debug, Clone)]
pub struct MixedPrior<D> {
    continuous: Uniform,
    discrete: D,
    layout: BlockLayout,
    kind: PriorKind,
}

/// Uniform continuous coordinates mixed with Bernoulli coordinates.
pub type MixedBinaryPrior = MixedPrior<BinaryPrior>;

/// Uniform continuous coordinates mixed with categorical grid coordinates.
pub type MixedCategoricalPrior = MixedPrior<CategoricalPrior>;

impl<D: Prior> MixedPrior<D> {
    /// Combines two priors; the discrete one must be binary or categorical.
    pub fn new(continuous: Uniform, discrete: D, continuous_first: bool) -> Result<Self> {
        let kind = match discrete.kind() {
            PriorKind::Binary => PriorKind::MixedBinary,
            PriorKind::Categorical => PriorKind::MixedCategorical,
            other => {
                return Err(Error::InvalidConfig(format!(
                    "cannot mix a continuous block with a {other} prior"
                )))
            }
        };
        let layout = BlockLayout::continuous_discrete(
            continuous.n_dims(),
            discrete.n_dims(),
            continuous_first,
        );
        Ok(Self {
            continuous,
            discrete,
            layout,
            kind,
        })
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn continuous(&self) -> &Uniform {
        &self.continuous
    }

    pub fn discrete(&self) -> &D {
        &self.discrete
    }

    /// Splits joint samples into `(continuous, discrete)` column views.
    pub fn separate<'a>(
        &self,
        x: &ArrayView2<'a, f64>,
    ) -> Result<(ArrayView2<'a, f64>, ArrayView2<'a, f64>)> {
        Ok((
            self.layout.block(x, BlockKind::Continuous)?,
            self.layout.block(x, BlockKind::Discrete)?,
        ))
    }

    fn join<'a>(
        &self,
        continuous: ArrayView2<'a, f64>,
        discrete: ArrayView2<'a, f64>,
    ) -> Result<Array2<f64>> {
        self.layout.join(&[
            (BlockKind::Continuous, continuous),
            (BlockKind::Discrete, discrete),
        ])
    }
}

impl MixedBinaryPrior {
    /// `n_cont` coordinates uniform on `(min, max)` plus `n_binary` Bernoulli coordinates.
    pub fn binary(
        n_cont: usize,
        n_binary: usize,
        min: f64,
        max: f64,
        continuous_first: bool,
    ) -> Result<Self> {
        Self::new(
            Uniform::cube(n_cont, min, max)?,
            BinaryPrior::new(n_binary)?,
            continuous_first,
        )
    }
}

impl MixedCategoricalPrior {
    /// `n_cont` coordinates uniform on `(min, max)` plus `n_disc` categorical
    /// coordinates on `n_discrete` levels spanning `[min, max]`.
    pub fn categorical(
        n_cont: usize,
        n_disc: usize,
        n_discrete: usize,
        min: f64,
        max: f64,
        continuous_first: bool,
    ) -> Result<Self> {
        Self::new(
            Uniform::cube(n_cont, min, max)?,
            CategoricalPrior::new(n_disc, min, max, n_discrete)?,
            continuous_first,
        )
    }

    /// Draws `n` joint samples, also returning a copy in which the categorical
    /// block holds level indices instead of level values.
    pub fn sample_both<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<(Array2<f64>, Array2<f64>)> {
        let cont = self.continuous.sample(n, rng)?;
        let (values, indices) = self.discrete.sample_both(n, rng);
        let indices = indices.mapv(|i| i as f64);
        Ok((
            self.join(cont.view(), values.view())?,
            self.join(cont.view(), indices.view())?,
        ))
    }
}

impl<D: Prior> Prior for MixedPrior<D> {
    fn kind(&self) -> PriorKind {
        self.kind
    }

    fn n_dims(&self) -> usize {
        self.layout.n_dims()
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        let cont = self.continuous.sample(n, rng)?;
        let disc = self.discrete.sample(n, rng)?;
        self.join(cont.view(), disc.view())
    }

    fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let (cont, disc) = self.separate(&x)?;
        Ok(self.continuous.pdf(cont)? * self.discrete.pdf(disc)?)
    }

    fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let (cont, disc) = self.separate(&x)?;
        Ok(self.continuous.logpdf(cont)? + self.discrete.logpdf(disc)?)
    }
}
