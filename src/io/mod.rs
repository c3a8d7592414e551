//! Reading and writing samples and labelled datasets.

#[cfg(feature = "csv")]
pub mod csv;
