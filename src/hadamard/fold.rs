//! Folding a Hadamard matrix into a balanced two-level design.

use ndarray::{s, Array2, ArrayView1};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::HadamardMatrix;

/// A `(2n) x n` matrix of `0`/`1` levels derived from a Hadamard matrix.
///
/// Rows `0..n` are the Hadamard matrix with `-1 -> 0` and `+1 -> 1`; rows
/// `n..2n` are the complement of those rows. Every column therefore holds
/// exactly `n` zeros and `n` ones, which is what keeps the low and high
/// sub-bands equally populated when the design is sampled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FoldedDesign {
    data: Array2<u8>,
}

impl FoldedDesign {
    pub(super) fn from_hadamard(h: &HadamardMatrix) -> Self {
        let n = h.order();
        let levels = h.data().mapv(|v| u8::from(v > 0));

        let mut data = Array2::zeros((2 * n, n));
        data.slice_mut(s![0..n, ..]).assign(&levels);
        data.slice_mut(s![n..2 * n, ..])
            .assign(&levels.mapv(|v| 1 - v));

        Self { data }
    }

    /// Number of rows (`2n`).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns (`n`).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Get the level bit at a specific position.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of bounds.
    #[must_use]
    pub fn bit(&self, row: usize, col: usize) -> u8 {
        self.data[[row, col]]
    }

    /// Get one column of level bits.
    #[must_use]
    pub fn column(&self, col: usize) -> ArrayView1<'_, u8> {
        self.data.column(col)
    }

    /// Get a reference to the underlying data.
    #[must_use]
    pub fn data(&self) -> &Array2<u8> {
        &self.data
    }

    /// Count the ones in each column.
    ///
    /// For a correctly folded design every count equals `cols()`.
    #[must_use]
    pub fn column_ones(&self) -> Vec<usize> {
        self.data
            .columns()
            .into_iter()
            .map(|c| c.iter().filter(|&&b| b == 1).count())
            .collect()
    }

    /// Check that every column holds as many zeros as ones.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let half = self.cols();
        self.column_ones().into_iter().all(|ones| ones == half)
    }
}
