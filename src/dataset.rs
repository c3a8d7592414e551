/*!
A dataset-backed prior that hands out candidates without replacement.

[`DatasetPrior`] wraps a finite table of binary features and their labels.
Every row can be consumed at most once: [`DatasetPrior::sample`] and
[`DatasetPrior::query`] remove the rows they return, while
[`DatasetPrior::sample_feature`], [`DatasetPrior::available_candidates`] and
[`DatasetPrior::lookup`] only read. The split is visible in the signatures:
reading takes `&self`, consuming takes `&mut self`, so one owner at a time can
shrink the pool.

Positions always refer to the current pool and are renumbered `0..n_available`
after every removal. Never keep a position across a consuming call.

# Examples

```rust
use sober_priors::dataset::DatasetPrior;
use ndarray::array;

let features = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
let labels = array![10.0, 20.0, 30.0, 40.0];
let mut prior = DatasetPrior::new(features.view(), labels.view()).unwrap();

let y = prior.query(array![[1.0, 0.0]].view()).unwrap();
assert_eq!(y, array![30.0]);
assert_eq!(prior.n_available(), 3);
```
*/

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::core::{check_columns, PriorKind};
use crate::error::{Error, Result};
use crate::featurize::{FeatureIndex, Featurizer};

/// A query row that resolved to an available dataset row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Row of the query batch.
    pub query_row: usize,
    /// Position of the matching row in the current pool.
    pub position: usize,
    /// Label stored for that row.
    pub label: f64,
}

/// Outcome of resolving a batch of feature vectors against the pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
    pub matches: Vec<Match>,
    /// Rows of the query batch with no available counterpart.
    pub missing: Vec<usize>,
}

impl Lookup {
    /// `true` when every query row was matched.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.position).collect()
    }

    pub fn labels(&self) -> Array1<f64> {
        self.matches.iter().map(|m| m.label).collect()
    }
}

/// Finite pool of labelled binary candidates, consumed without replacement.
#[derive(Debug, Clone)]
pub struct DatasetPrior {
    index: FeatureIndex,
    labels: Array1<f64>,
}

impl DatasetPrior {
    /// Builds the pool from an `N × d` binary feature table and `N` labels.
    pub fn new(features: ArrayView2<f64>, labels: ArrayView1<f64>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::LabelMismatch {
                features: features.nrows(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            index: FeatureIndex::new(features)?,
            labels: labels.to_owned(),
        })
    }

    /// Number of rows not yet consumed.
    pub fn n_available(&self) -> usize {
        self.labels.len()
    }

    /// Positions of the remaining rows, always `0..n_available`.
    pub fn available_index(&self) -> Vec<usize> {
        (0..self.n_available()).collect()
    }

    /// Labels of the remaining rows, aligned with [`Self::available_index`].
    pub fn labels(&self) -> ArrayView1<f64> {
        self.labels.view()
    }

    /// Feature vectors of the rows at `positions`.
    pub fn index_to_feature(&self, positions: &[usize]) -> Result<Array2<f64>> {
        self.index.features(positions)
    }

    /// Features of every remaining row.
    pub fn available_candidates(&self) -> Result<Array2<f64>> {
        self.index.features(&self.available_index())
    }

    /// Picks `n` distinct positions uniformly from the pool.
    fn draw_positions<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<usize>> {
        let available = self.n_available();
        if n > available {
            return Err(Error::PoolExhausted {
                requested: n,
                available,
            });
        }
        Ok(index::sample(rng, available, n).into_vec())
    }

    /// Draws `n` distinct rows without touching the pool.
    pub fn sample_feature<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array2<f64>> {
        let positions = self.draw_positions(n, rng)?;
        self.index.features(&positions)
    }

    /// Draws `n` distinct rows, returns their features and labels, and removes
    /// them from the pool.
    pub fn sample<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        rng: &mut R,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        let positions = self.draw_positions(n, rng)?;
        let features = self.index.features(&positions)?;
        let labels = self.labels.select(Axis(0), &positions);
        self.consume(&positions)?;
        Ok((features, labels))
    }

    /// Resolves each query row to a distinct available row with the same features.
    ///
    /// Rows sharing a key are claimed in position order, so asking for the same
    /// features twice needs two matching rows in the pool.
    pub fn lookup(&self, x: ArrayView2<f64>) -> Result<Lookup> {
        check_columns(&x, self.index.n_features())?;
        let mut claimed = HashSet::new();
        let mut lookup = Lookup::default();
        for (query_row, row) in x.rows().into_iter().enumerate() {
            let position = Featurizer::encode(row).ok().and_then(|key| {
                self.index
                    .positions(&key)
                    .iter()
                    .copied()
                    .find(|p| !claimed.contains(p))
            });
            match position {
                Some(position) => {
                    claimed.insert(position);
                    lookup.matches.push(Match {
                        query_row,
                        position,
                        label: self.labels[position],
                    });
                }
                None => lookup.missing.push(query_row),
            }
        }
        Ok(lookup)
    }

    /// Returns the labels of the rows matching `x` and removes those rows.
    ///
    /// Asking for more rows than remain fails with [`Error::PoolExhausted`]. If
    /// any query row has no available match the pool is left untouched and
    /// [`Error::UnmatchedQuery`] lists the offending query rows.
    pub fn query(&mut self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if x.nrows() > self.n_available() {
            return Err(Error::PoolExhausted {
                requested: x.nrows(),
                available: self.n_available(),
            });
        }
        let lookup = self.lookup(x)?;
        if !lookup.is_complete() {
            return Err(Error::UnmatchedQuery {
                rows: lookup.missing,
            });
        }
        self.consume(&lookup.positions())?;
        Ok(lookup.labels())
    }

    /// Removes the rows at `positions` and renumbers the rest.
    pub fn consume(&mut self, positions: &[usize]) -> Result<()> {
        let available = self.n_available();
        let mut removed = vec![false; available];
        for &p in positions {
            *removed.get_mut(p).ok_or(Error::RowUnavailable(p))? = true;
        }
        let keep: Vec<usize> = (0..available).filter(|&p| !removed[p]).collect();
        self.index.retain(&keep);
        self.labels = self.labels.select(Axis(0), &keep);
        debug!(
            removed = available - keep.len(),
            remaining = keep.len(),
            "consumed dataset rows"
        );
        Ok(())
    }
}

impl DatasetPrior {
    pub fn kind(&self) -> PriorKind {
        PriorKind::Dataset
    }

    pub fn n_dims(&self) -> usize {
        self.index.n_features()
    }

    /// Empirical mass over the remaining pool: each available row carries
    /// `1 / n_available`, so duplicated features add up and absent ones get zero.
    pub fn pdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        check_columns(&x, self.index.n_features())?;
        if self.n_available() == 0 {
            return Ok(Array1::zeros(x.nrows()));
        }
        let mass = 1.0 / self.n_available() as f64;
        Ok(x.map_axis(Axis(1), |row| {
            let count = Featurizer::encode(row)
                .map(|key| self.index.positions(&key).len())
                .unwrap_or(0);
            count as f64 * mass
        }))
    }

    pub fn logpdf(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self.pdf(x)?.mapv(f64::ln))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn four_rows() -> DatasetPrior {
        let features = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let labels = array![10.0, 20.0, 30.0, 40.0];
        DatasetPrior::new(features.view(), labels.view()).unwrap()
    }

    #[test]
    fn query_returns_label_and_removes_row() {
        let mut prior = four_rows();
        let y = prior.query(array![[1.0, 0.0]].view()).unwrap();
        assert_eq!(y, array![30.0]);
        assert_eq!(prior.n_available(), 3);
        assert_eq!(prior.available_index(), vec![0, 1, 2]);
        let left = prior.available_candidates().unwrap();
        assert!(left.rows().into_iter().all(|r| r != array![1.0, 0.0]));
        assert_eq!(prior.labels(), array![10.0, 20.0, 40.0]);
    }

    #[test]
    fn unmatched_query_leaves_pool_intact() {
        let mut prior = four_rows();
        prior.query(array![[0.0, 1.0]].view()).unwrap();
        match prior.query(array![[1.0, 1.0], [0.0, 1.0], [0.5, 3.0]].view()) {
            Err(Error::UnmatchedQuery { rows }) => assert_eq!(rows, vec![1, 2]),
            other => panic!("Expected an unmatched query, got {other:?}"),
        }
        assert_eq!(prior.n_available(), 3);
    }

    #[test]
    fn oversized_query_reports_exhaustion() {
        let mut prior = four_rows();
        prior.consume(&[0, 1]).unwrap();
        let x = array![[1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        assert!(matches!(
            prior.query(x.view()),
            Err(Error::PoolExhausted {
                requested: 3,
                available: 2
            })
        ));
        assert_eq!(prior.n_available(), 2);
    }

    #[test]
    fn lookup_does_not_mutate() {
        let prior = four_rows();
        let lookup = prior.lookup(array![[1.0, 1.0], [1.0, 1.0]].view()).unwrap();
        assert_eq!(lookup.matches.len(), 1);
        assert_eq!(lookup.matches[0].label, 40.0);
        assert_eq!(lookup.missing, vec![1]);
        assert_eq!(prior.n_available(), 4);
    }

    #[test]
    fn duplicate_rows_are_consumed_one_at_a_time() {
        let features = array![[1.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let labels = array![1.0, 2.0, 3.0];
        let mut prior = DatasetPrior::new(features.view(), labels.view()).unwrap();
        let y = prior.query(array![[1.0, 0.0], [1.0, 0.0]].view()).unwrap();
        assert_eq!(y, array![1.0, 2.0]);
        assert_eq!(prior.n_available(), 1);
        assert!(prior.query(array![[1.0, 0.0]].view()).is_err());
    }

    #[test]
    fn sample_shrinks_pool_without_repeats() {
        let mut prior = four_rows();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut seen = Vec::new();
        for k in 1..=4 {
            let (x, y) = prior.sample(1, &mut rng).unwrap();
            assert_eq!(x.dim(), (1, 2));
            assert_eq!(prior.n_available(), 4 - k);
            // Labels were assigned as 10 * (1 + 2 * x0 + x1).
            assert_eq!(y[0], 10.0 * (1.0 + 2.0 * x[[0, 0]] + x[[0, 1]]));
            assert!(!seen.contains(&(y[0] as i64)));
            seen.push(y[0] as i64);
        }
        assert!(matches!(
            prior.sample(1, &mut rng),
            Err(Error::PoolExhausted {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn sample_feature_is_read_only() {
        let prior = four_rows();
        let mut rng = SmallRng::seed_from_u64(3);
        let x = prior.sample_feature(4, &mut rng).unwrap();
        assert_eq!(x.dim(), (4, 2));
        assert_eq!(prior.n_available(), 4);
        let mut keys = Featurizer::encode_batch(x.view()).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["00", "01", "10", "11"]);
        assert!(prior.sample_feature(5, &mut rng).is_err());
    }

    #[test]
    fn consume_validates_positions() {
        let mut prior = four_rows();
        assert!(matches!(
            prior.consume(&[0, 4]),
            Err(Error::RowUnavailable(4))
        ));
        assert_eq!(prior.n_available(), 4);
        prior.consume(&[2, 2, 0]).unwrap();
        assert_eq!(prior.labels(), array![20.0, 40.0]);
    }

    #[test]
    fn empirical_mass_over_remaining_rows() {
        let mut prior = four_rows();
        prior.consume(&[0]).unwrap();
        let p = prior.pdf(array![[0.0, 0.0], [1.0, 1.0], [0.3, 2.0]].view()).unwrap();
        assert_eq!(p, array![0.0, 1.0 / 3.0, 0.0]);
        assert_eq!(prior.kind(), PriorKind::Dataset);
        assert_eq!(prior.n_dims(), 2);
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let features = array![[0.0], [1.0]];
        let labels = array![1.0];
        assert!(matches!(
            DatasetPrior::new(features.view(), labels.view()),
            Err(Error::LabelMismatch { .. })
        ));
    }
}
