//! Error type shared by every prior, the dataset pool, and the weight stabiliser.

/// Errors produced while constructing priors, sampling, or resampling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when an input's column count disagrees with the prior's `n_dims`.
    #[error("dimension mismatch: expected {expected} columns but got {got}")]
    DimensionMismatch {
        /// The prior's configured dimensionality.
        expected: usize,
        /// The number of columns actually supplied.
        got: usize,
    },

    /// Returned when a lower bound is not strictly below its upper bound.
    #[error("invalid bounds in dimension {dim}: min ({min}) must be less than max ({max})")]
    InvalidBounds {
        /// The offending dimension.
        dim: usize,
        /// The lower bound.
        min: f64,
        /// The upper bound.
        max: f64,
    },

    /// Returned when a Gaussian covariance is not square or not positive definite.
    #[error("invalid covariance: {0}")]
    InvalidCovariance(String),

    /// Returned when a prior is configured with nonsensical sizes.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when more rows are requested than remain in a dataset pool.
    #[error("pool exhausted: requested {requested} rows but only {available} remain")]
    PoolExhausted {
        /// Rows requested by the caller.
        requested: usize,
        /// Rows still available.
        available: usize,
    },

    /// Returned when queried feature vectors have no available row in the pool.
    /// `rows` lists the offending positions within the query batch.
    #[error("no available dataset row matches query rows {rows:?}")]
    UnmatchedQuery {
        /// Row positions (within the query) that could not be matched.
        rows: Vec<usize>,
    },

    /// Returned when a row position is outside the currently available pool.
    #[error("row {0} is not available in the pool")]
    RowUnavailable(usize),

    /// Returned when a feature vector or key is not a valid binary string.
    #[error("invalid binary feature: {0}")]
    InvalidFeature(String),

    /// Returned when feature and label tables disagree on the number of rows.
    #[error("dataset has {features} feature rows but {labels} labels")]
    LabelMismatch {
        /// Number of feature rows.
        features: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Returned when weights cannot be used for a weighted draw.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// Returned when a resample asks for more indices than there are candidates.
    #[error("cannot resample {requested} indices from {available} candidates")]
    ResampleTooLarge {
        /// Number of indices requested.
        requested: usize,
        /// Number of candidate weights.
        available: usize,
    },

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
