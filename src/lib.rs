/*!
Prior distributions, dataset-backed candidate pools and importance-weight
stabilisation for batch Bayesian quadrature and optimisation.

- [`continuous`], [`discrete`] and [`mixed`] provide generative priors behind
  the common [`core::Prior`] trait.
- [`dataset`] turns a finite labelled table into a prior whose rows are
  handed out without replacement, using [`featurize`] for row lookup.
- [`weights`] cleans pathological weights and resamples indices by weight.
- [`config`] builds any generative prior from a serde description.
*/

pub mod config;
pub mod continuous;
pub mod core;
pub mod dataset;
pub mod discrete;
pub mod error;
pub mod featurize;
pub mod io;
pub mod layout;
pub mod mixed;
pub mod quasi;
pub mod weights;

pub use crate::core::{Prior, PriorKind};
pub use crate::error::{Error, Result};
