/*!
Stabilising importance weights and resampling by weight.

Upstream weight computations routinely produce zeros, infinities and NaNs.
[`WeightStabiliser::cleanse`] turns such a vector into a proper probability
vector, [`WeightStabiliser::weighted_resample`] selects a subset of indices in
proportion to weight, and [`WeightStabiliser::deweighted_resample`] selects in
proportion to inverse weight to undo importance-sampling bias.

# Examples

```rust
use sober_priors::weights::WeightStabiliser;
use ndarray::array;
use rand::{rngs::SmallRng, SeedableRng};

let stabiliser = WeightStabiliser::default();
let w = stabiliser.cleanse(array![1.0, f64::NAN, 0.0, 3.0].view());
assert!((w.sum() - 1.0).abs() < 1e-12);

let mut rng = SmallRng::seed_from_u64(42);
let picked = stabiliser.weighted_resample(w.view(), 2, &mut rng).unwrap();
assert_eq!(picked.len(), 2);
```
*/

use ndarray::{Array1, ArrayView1};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Weight-cleaning and resampling policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightStabiliser {
    /// Entries below this are treated as zero; infinite and NaN entries are replaced by it.
    pub eps: f64,
    /// Minimum number of distinct weight values for a vector to be usable.
    pub thresh: usize,
}

impl Default for WeightStabiliser {
    fn default() -> Self {
        Self {
            eps: f64::EPSILON,
            thresh: 5,
        }
    }
}

impl WeightStabiliser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_threshold(mut self, thresh: usize) -> Self {
        self.thresh = thresh;
        self
    }

    /// Returns a cleaned, normalised copy of `weights`.
    ///
    /// Entries below `eps` (including negatives and `-inf`) become zero, while
    /// `+inf` and NaN become `eps` so they stay selectable when the remaining
    /// mass is small. The vector is then normalised and any entry that drops
    /// below `eps` is cut, repeating until the support is stable. When nothing
    /// survives, the uniform vector is returned instead.
    ///
    /// A cleansed vector is a fixed point: cleansing it again returns it unchanged.
    pub fn cleanse(&self, weights: ArrayView1<f64>) -> Array1<f64> {
        let eps = self.eps;
        let mut w = weights.mapv(|v| {
            if v.is_nan() || v == f64::INFINITY {
                eps
            } else if v < eps {
                0.0
            } else {
                v
            }
        });
        while !self.is_cleansed(w.view()) {
            let total = w.sum();
            if total == 0.0 || !total.is_finite() {
                if !w.is_empty() {
                    warn!(n = w.len(), "weights carry no mass; falling back to uniform");
                }
                return Array1::from_elem(w.len(), 1.0 / w.len() as f64);
            }
            w /= total;
            w.mapv_inplace(|v| if v < eps { 0.0 } else { v });
        }
        w
    }

    /// Every entry is zero or at least `eps` and the total is one up to rounding.
    fn is_cleansed(&self, weights: ArrayView1<f64>) -> bool {
        let tol = 4.0 * weights.len() as f64 * f64::EPSILON;
        weights.iter().all(|&v| v == 0.0 || (v >= self.eps && v.is_finite()))
            && (weights.sum() - 1.0).abs() <= tol
    }

    /// `false` when the weights sum to zero or hold fewer than `thresh`
    /// distinct values, `true` otherwise.
    pub fn is_usable(&self, weights: ArrayView1<f64>) -> bool {
        if weights.sum() == 0.0 {
            return false;
        }
        let mut values = weights.to_vec();
        values.sort_unstable_by(f64::total_cmp);
        values.dedup_by(|a, b| a.total_cmp(b).is_eq());
        values.len() >= self.thresh
    }

    pub fn is_degenerate(&self, weights: ArrayView1<f64>) -> bool {
        !self.is_usable(weights)
    }

    /// Draws `k` distinct indices with probability proportional to `weights`.
    ///
    /// Each positive entry gets the key `ln(u) / w` with `u` uniform on `[0, 1)`,
    /// and the `k` largest keys win, in decreasing key order. Entries that are
    /// zero or negative are never drawn this way.
    ///
    /// When at most `k` entries are strictly positive a weighted draw cannot
    /// fill the request; all positive indices are returned, topped up with
    /// indices drawn uniformly from the remaining entries.
    pub fn weighted_resample<R: Rng + ?Sized>(
        &self,
        weights: ArrayView1<f64>,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let n = weights.len();
        if k > n {
            return Err(Error::ResampleTooLarge {
                requested: k,
                available: n,
            });
        }
        if let Some(i) = weights.iter().position(|w| w.is_nan()) {
            return Err(Error::InvalidWeights(format!("weight {i} is NaN")));
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let (positive, rest): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| weights[i] > 0.0);
        if positive.len() > k {
            let mut keyed: Vec<(f64, usize)> = positive
                .into_iter()
                .map(|i| (rng.gen::<f64>().ln() / weights[i], i))
                .collect();
            keyed.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
            return Ok(keyed.into_iter().take(k).map(|(_, i)| i).collect());
        }

        let n_missing = k - positive.len();
        warn!(
            positive = positive.len(),
            requested = k,
            "fewer positive weights than requested resamples; topping up uniformly"
        );
        let mut picked = positive;
        picked.extend(
            index::sample(rng, rest.len(), n_missing)
                .into_iter()
                .map(|j| rest[j]),
        );
        Ok(picked)
    }

    /// Draws `k` indices with probability proportional to the cleansed inverse
    /// of `weights`, favouring the points the weights under-represent.
    pub fn deweighted_resample<R: Rng + ?Sized>(
        &self,
        weights: ArrayView1<f64>,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let inverse = self.cleanse(weights.mapv(f64::recip).view());
        self.weighted_resample(inverse.view(), k, rng)
    }
}
