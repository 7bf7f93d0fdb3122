//! Hadamard matrix construction and folding.
//!
//! An IFFD assigns each parameter, in each replicate block, to one column of a
//! Hadamard matrix. Orders of the form `n = 2^e * p` with `p` in `{1, 12, 20}`
//! are supported: the matrix starts from a tabulated seed of order `p` and is
//! grown by Kronecker doubling,
//!
//! - H_{2m} = \[\[H_m, H_m\], \[H_m, -H_m\]\]
//!
//! which preserves `H * H^T = n * I` at every step.
//!
//! ## Example
//!
//! ```
//! use iffd::hadamard::HadamardMatrix;
//!
//! let h = HadamardMatrix::new(24).unwrap();   // 12 * 2
//! assert_eq!(h.order(), 24);
//! assert!(h.is_orthogonal());
//!
//! let folded = h.fold();
//! assert_eq!(folded.rows(), 48);
//! assert_eq!(folded.cols(), 24);
//!
//! assert!(HadamardMatrix::new(28).is_err());  // 4 * 7 has no seed
//! ```

mod fold;
mod tables;

pub use fold::FoldedDesign;

use ndarray::{s, Array2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::{decompose_order, OrderFactorization};

/// A square matrix of `+1`/`-1` entries with pairwise orthogonal rows.
///
/// The seed tables behind the non-power-of-two orders are private; callers
/// only ever see the finished matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HadamardMatrix {
    data: Array2<i8>,
    base: usize,
    doublings: u32,
}

impl HadamardMatrix {
    /// Build the Hadamard matrix of order `n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `n` is not `2^e * p` for `p` in
    /// `{1, 12, 20}`. The check happens before any matrix storage is allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use iffd::hadamard::HadamardMatrix;
    ///
    /// assert!(HadamardMatrix::new(1).is_ok());
    /// assert!(HadamardMatrix::new(20).is_ok());
    /// assert!(HadamardMatrix::new(80).is_ok());
    ///
    /// assert!(HadamardMatrix::new(0).is_err());
    /// assert!(HadamardMatrix::new(6).is_err());
    /// ```
    pub fn new(n: usize) -> Result<Self> {
        let factorization = decompose_order(n).ok_or(Error::InvalidOrder(n))?;
        Ok(Self::from_factorization(factorization))
    }

    fn from_factorization(f: OrderFactorization) -> Self {
        let n = f.order();
        let mut h = Array2::zeros((n, n));

        // Seed the top-left corner with H_p.
        match f.base {
            12 => seed(&mut h, &tables::H12),
            20 => seed(&mut h, &tables::H20),
            _ => h[[0, 0]] = 1,
        }

        // At each step h[0..size, 0..size] holds H_size; fill the other three
        // quadrants of the 2*size block.
        let mut size = f.base;
        for _ in 0..f.doublings {
            let block = h.slice(s![0..size, 0..size]).to_owned();
            h.slice_mut(s![0..size, size..2 * size]).assign(&block);
            h.slice_mut(s![size..2 * size, 0..size]).assign(&block);
            h.slice_mut(s![size..2 * size, size..2 * size])
                .assign(&block.mapv(|v: i8| -v));
            size *= 2;
        }

        Self {
            data: h,
            base: f.base,
            doublings: f.doublings,
        }
    }

    /// Get the order `n` of the matrix.
    #[must_use]
    pub fn order(&self) -> usize {
        self.data.nrows()
    }

    /// Get the seed order `p` the matrix was grown from.
    #[must_use]
    pub fn base_order(&self) -> usize {
        self.base
    }

    /// Get the number of Kronecker doublings applied to the seed.
    #[must_use]
    pub fn doublings(&self) -> u32 {
        self.doublings
    }

    /// Get the entry at a specific position.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.data[[row, col]]
    }

    /// Get a reference to the underlying `±1` data.
    #[must_use]
    pub fn data(&self) -> &Array2<i8> {
        &self.data
    }

    /// Check `H * H^T == n * I` exactly.
    #[must_use]
    pub fn is_orthogonal(&self) -> bool {
        let h = self.data.mapv(i32::from);
        let gram = h.dot(&h.t());
        let n = self.order() as i32;

        gram.indexed_iter()
            .all(|((i, j), &v)| v == if i == j { n } else { 0 })
    }

    /// Fold the matrix into a balanced two-level design.
    ///
    /// See [`FoldedDesign`].
    #[must_use]
    pub fn fold(&self) -> FoldedDesign {
        FoldedDesign::from_hadamard(self)
    }
}

fn seed<const N: usize>(h: &mut Array2<i8>, table: &[[i8; N]; N]) {
    for (i, row) in table.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            h[[i, j]] = v;
        }
    }
}

/// Check whether a Hadamard matrix of order `n` can be built.
///
/// # Example
///
/// ```
/// use iffd::hadamard::is_valid_order;
///
/// assert!(is_valid_order(12));
/// assert!(is_valid_order(64));
/// assert!(!is_valid_order(36));
/// ```
#[must_use]
pub fn is_valid_order(n: usize) -> bool {
    decompose_order(n).is_some()
}

/// List every buildable order up to and including `max`.
///
/// # Example
///
/// ```
/// use iffd::hadamard::valid_orders;
///
/// assert_eq!(valid_orders(24), vec![1, 2, 4, 8, 12, 16, 20, 24]);
/// ```
#[must_use]
pub fn valid_orders(max: usize) -> Vec<usize> {
    (1..=max).filter(|&n| is_valid_order(n)).collect()
}

/// Find the smallest buildable order that is at least `min`.
///
/// Useful when the number of interacting groups is dictated by the problem
/// rather than chosen from the list of valid orders.
///
/// # Example
///
/// ```
/// use iffd::hadamard::smallest_valid_order;
///
/// assert_eq!(smallest_valid_order(9), Some(12));
/// assert_eq!(smallest_valid_order(17), Some(20));
/// assert_eq!(smallest_valid_order(21), Some(24));
/// ```
#[must_use]
pub fn smallest_valid_order(min: usize) -> Option<usize> {
    (min.max(1)..=min.max(1).checked_mul(2)?).find(|&n| is_valid_order(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hadamard_creation() {
        for n in [1, 2, 4, 8, 12, 16, 20, 24, 32, 40, 48, 64, 80] {
            let h = HadamardMatrix::new(n).unwrap();
            assert_eq!(h.order(), n);
            assert_eq!(h.data().dim(), (n, n));
        }
    }

    #[test]
    fn test_hadamard_invalid() {
        for n in [0, 3, 5, 6, 7, 9, 10, 18, 28, 36] {
            assert_eq!(HadamardMatrix::new(n), Err(Error::InvalidOrder(n)));
        }
    }

    #[test]
    fn test_hadamard_trivial_order() {
        let h = HadamardMatrix::new(1).unwrap();
        assert_eq!(h.get(0, 0), 1);
        assert!(h.is_orthogonal());
    }

    #[test]
    fn test_hadamard_order_two() {
        let h = HadamardMatrix::new(2).unwrap();
        assert_eq!(h.data(), &ndarray::array![[1, 1], [1, -1]]);
    }

    #[test]
    fn test_hadamard_matrix_orthogonality() {
        // Base orders and several doublings of each
        for n in [1, 2, 4, 8, 12, 20, 24, 40, 48, 80, 96] {
            let h = HadamardMatrix::new(n).unwrap();
            assert!(h.is_orthogonal(), "order {n} should be orthogonal");
        }
    }

    #[test]
    fn test_hadamard_entries_are_signs() {
        let h = HadamardMatrix::new(40).unwrap();
        assert!(h.data().iter().all(|&v| v == 1 || v == -1));
    }

    #[test]
    fn test_hadamard_doubling_structure() {
        // H_24 = [[H_12, H_12], [H_12, -H_12]]
        let h = HadamardMatrix::new(24).unwrap();
        assert_eq!(h.base_order(), 12);
        assert_eq!(h.doublings(), 1);

        for i in 0..12 {
            for j in 0..12 {
                let v = tables::H12[i][j];
                assert_eq!(h.get(i, j), v);
                assert_eq!(h.get(i, j + 12), v);
                assert_eq!(h.get(i + 12, j), v);
                assert_eq!(h.get(i + 12, j + 12), -v);
            }
        }
    }

    #[test]
    fn test_hadamard_first_row_all_ones() {
        for n in [8, 12, 20, 40] {
            let h = HadamardMatrix::new(n).unwrap();
            assert!(h.data().row(0).iter().all(|&v| v == 1));
        }
    }

    #[test]
    fn test_order_helpers() {
        assert_eq!(valid_orders(12), vec![1, 2, 4, 8, 12]);
        assert_eq!(smallest_valid_order(0), Some(1));
        assert_eq!(smallest_valid_order(13), Some(16));
        assert_eq!(smallest_valid_order(25), Some(32));
        assert_eq!(smallest_valid_order(33), Some(40));
    }

    proptest! {
        #[test]
        fn prop_doubled_orders_stay_orthogonal(base_idx in 0usize..3, doublings in 0u32..4) {
            let base = crate::utils::BASE_ORDERS[base_idx];
            let n = base << doublings;
            let h = HadamardMatrix::new(n).unwrap();
            prop_assert!(h.is_orthogonal());
        }
    }
}
