//! Ordered coordinate blocks of a joint sample.
//!
//! A [`BlockLayout`] is the single source of truth for where each variable
//! group lives inside a joint vector. Sampling joins blocks and density
//! evaluation splits them through the same layout, so the two directions
//! can never disagree about the ordering.

use ndarray::{concatenate, s, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::core::check_columns;
use crate::error::{Error, Result};

/// The variable group a block of coordinates belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Continuous,
    Discrete,
}

/// A contiguous run of `size` coordinates of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLayout {
    blocks: Vec<Block>,
}

impl BlockLayout {
    /// Builds a layout from blocks in column order. Each kind may appear at most once.
    pub fn new(blocks: Vec<Block>) -> Result<Self> {
        for (i, block) in blocks.iter().enumerate() {
            if blocks[..i].iter().any(|b| b.kind == block.kind) {
                return Err(Error::InvalidConfig(format!(
                    "block kind {:?} appears more than once",
                    block.kind
                )));
            }
        }
        Ok(Self { blocks })
    }

    /// A continuous block and a discrete block, continuous leading when `continuous_first`.
    pub fn continuous_discrete(n_cont: usize, n_disc: usize, continuous_first: bool) -> Self {
        let cont = Block {
            kind: BlockKind::Continuous,
            size: n_cont,
        };
        let disc = Block {
            kind: BlockKind::Discrete,
            size: n_disc,
        };
        let blocks = if continuous_first {
            vec![cont, disc]
        } else {
            vec![disc, cont]
        };
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Total number of coordinates.
    pub fn n_dims(&self) -> usize {
        self.blocks.iter().map(|b| b.size).sum()
    }

    /// Column range occupied by `kind`.
    pub fn range(&self, kind: BlockKind) -> Result<Range<usize>> {
        let mut start = 0;
        for block in &self.blocks {
            if block.kind == kind {
                return Ok(start..start + block.size);
            }
            start += block.size;
        }
        Err(Error::InvalidConfig(format!("layout has no {kind:?} block")))
    }

    /// View of the columns of `x` that belong to `kind`.
    pub fn block<'a>(
        &self,
        x: &ArrayView2<'a, f64>,
        kind: BlockKind,
    ) -> Result<ArrayView2<'a, f64>> {
        check_columns(x, self.n_dims())?;
        let range = self.range(kind)?;
        Ok(x.clone().slice_move(s![.., range]))
    }

    /// Concatenates per-kind column blocks in layout order.
    ///
    /// Every block of the layout must be supplied exactly once with matching width.
    pub fn join(&self, parts: &[(BlockKind, ArrayView2<f64>)]) -> Result<Array2<f64>> {
        let mut ordered = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let part = parts
                .iter()
                .find(|(kind, _)| *kind == block.kind)
                .map(|(_, part)| part.view())
                .ok_or_else(|| {
                    Error::InvalidConfig(format!("missing {:?} block", block.kind))
                })?;
            check_columns(&part, block.size)?;
            ordered.push(part);
        }
        if parts.len() != ordered.len() {
            return Err(Error::InvalidConfig(format!(
                "expected {} blocks, got {}",
                ordered.len(),
                parts.len()
            )));
        }
        concatenate(Axis(1), &ordered).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}
