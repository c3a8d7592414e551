/*!
String keys for binary feature vectors.

[`Featurizer`] maps a binary vector of length `d` to a `d`-character string of
`'0'`/`'1'` and back. [`FeatureIndex`] keeps those keys in row order alongside a
hash map from key to row positions, giving constant-time lookup of a dataset
row from its features.

# Examples

```rust
use sober_priors::featurize::Featurizer;
use ndarray::array;

let key = Featurizer::encode(array![1.0, 0.0, 1.0].view()).unwrap();
assert_eq!(key, "101");
assert_eq!(Featurizer::decode(&key).unwrap(), array![1.0, 0.0, 1.0]);
```
*/

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Codec between binary feature vectors and `'0'`/`'1'` strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Featurizer;

impl Featurizer {
    /// Encodes one feature vector. Each coordinate is rounded to the nearest
    /// integer and must then be exactly 0 or 1.
    pub fn encode(feature: ArrayView1<f64>) -> Result<String> {
        feature
            .iter()
            .map(|&v| match v.round() {
                r if r == 0.0 => Ok('0'),
                r if r == 1.0 => Ok('1'),
                _ => Err(Error::InvalidFeature(format!(
                    "coordinate {v} is not binary"
                ))),
            })
            .collect()
    }

    /// Decodes a key back into its feature vector.
    pub fn decode(key: &str) -> Result<Array1<f64>> {
        key.chars()
            .map(|c| match c {
                '0' => Ok(0.0),
                '1' => Ok(1.0),
                other => Err(Error::InvalidFeature(format!(
                    "unexpected character {other:?} in key {key:?}"
                ))),
            })
            .collect()
    }

    /// Encodes every row of `features`, in parallel.
    pub fn encode_batch(features: ArrayView2<f64>) -> Result<Vec<String>> {
        (0..features.nrows())
            .into_par_iter()
            .map(|i| Self::encode(features.row(i)))
            .collect()
    }

    /// Decodes a batch of keys into an `n × d` array. All keys must share one length.
    pub fn decode_batch<S: AsRef<str>>(keys: &[S]) -> Result<Array2<f64>> {
        let width = keys.first().map_or(0, |k| k.as_ref().len());
        let mut out = Array2::<f64>::zeros((keys.len(), width));
        for (mut row, key) in out.rows_mut().into_iter().zip(keys) {
            let decoded = Self::decode(key.as_ref())?;
            if decoded.len() != width {
                return Err(Error::DimensionMismatch {
                    expected: width,
                    got: decoded.len(),
                });
            }
            row.assign(&decoded);
        }
        Ok(out)
    }
}

/// Row-ordered keys of a binary dataset with a key → positions map.
///
/// Several rows may share a key; their positions are kept in ascending order.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    keys: Vec<String>,
    rows: HashMap<String, Vec<usize>>,
    n_features: usize,
}

impl FeatureIndex {
    /// Indexes every row of a binary feature table.
    pub fn new(features: ArrayView2<f64>) -> Result<Self> {
        let keys = Featurizer::encode_batch(features)?;
        Ok(Self::from_keys(keys, features.ncols()))
    }

    fn from_keys(keys: Vec<String>, n_features: usize) -> Self {
        let mut rows: HashMap<String, Vec<usize>> = HashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            rows.entry(key.clone()).or_default().push(position);
        }
        Self {
            keys,
            rows,
            n_features,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn key(&self, position: usize) -> Option<&str> {
        self.keys.get(position).map(String::as_str)
    }

    /// All positions holding `key`, ascending.
    pub fn positions(&self, key: &str) -> &[usize] {
        self.rows.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First position holding `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions(key).first().copied()
    }

    /// Feature vectors at `positions`, one row each.
    pub fn features(&self, positions: &[usize]) -> Result<Array2<f64>> {
        let mut out = Array2::<f64>::zeros((positions.len(), self.n_features));
        for (mut row, &position) in out.rows_mut().into_iter().zip(positions) {
            let key = self
                .keys
                .get(position)
                .ok_or(Error::RowUnavailable(position))?;
            for (slot, c) in row.iter_mut().zip(key.bytes()) {
                *slot = if c == b'1' { 1.0 } else { 0.0 };
            }
        }
        Ok(out)
    }

    /// Keeps only the rows at `keep` (in that order) and renumbers them `0..keep.len()`.
    pub(crate) fn retain(&mut self, keep: &[usize]) {
        let keys = keep.iter().map(|&p| self.keys[p].clone()).collect();
        *self = Self::from_keys(keys, self.n_features);
    }
}
