//! Random assignment of parameters to Hadamard columns, per replicate.

use ndarray::Array2;
use rand::seq::index;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How one parameter is sampled inside one replicate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Every row of the block is drawn from the central band.
    Baseline,
    /// Rows follow a folded-design column, optionally complemented.
    Column {
        /// Zero-based column of the folded design.
        column: usize,
        /// Whether the column's bits are complemented (negative code).
        flipped: bool,
    },
}

/// The `replicates x parameters` matrix of group codes.
///
/// A code of `0` marks a baseline replicate; a code `±k` (`1 <= k <= order`)
/// selects folded-design column `k - 1`, complemented when negative. Each
/// parameter column holds exactly `zero_replicates` zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupMap {
    codes: Array2<i32>,
    order: usize,
    zero_replicates: usize,
}

impl GroupMap {
    /// Draw a random group map.
    ///
    /// For each parameter, `zero_replicates` distinct replicates are chosen
    /// without replacement and marked baseline. Every other replicate gets a
    /// column drawn uniformly from `1..=order` and a random sign.
    ///
    /// # Errors
    ///
    /// Returns an error if `replicates` or `order` is zero, or if
    /// `zero_replicates > replicates`.
    pub fn random<R: Rng + ?Sized>(
        replicates: usize,
        params: usize,
        order: usize,
        zero_replicates: usize,
        rng: &mut R,
    ) -> Result<Self> {
        validate_counts(replicates, order, zero_replicates)?;

        let max_code = i32::try_from(order)
            .map_err(|_| Error::invalid_params(format!("order {order} is too large")))?;

        let mut codes = Array2::zeros((replicates, params));
        let mut baseline = vec![false; replicates];

        for param in 0..params {
            baseline.iter_mut().for_each(|b| *b = false);
            for rep in index::sample(rng, replicates, zero_replicates).into_iter() {
                baseline[rep] = true;
            }

            for rep in 0..replicates {
                if baseline[rep] {
                    codes[[rep, param]] = 0;
                    continue;
                }
                let k = rng.gen_range(1..=max_code);
                codes[[rep, param]] = if rng.gen_bool(0.5) { k } else { -k };
            }
        }

        Ok(Self {
            codes,
            order,
            zero_replicates,
        })
    }

    /// Wrap an existing code matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if a code falls outside `-order..=order`, or if the
    /// parameter columns disagree on the number of baseline replicates.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use iffd::design::{Assignment, GroupMap};
    ///
    /// let map = GroupMap::from_codes(array![[0, 2], [-1, 0]], 2).unwrap();
    /// assert_eq!(map.zero_replicates(), 1);
    /// assert_eq!(map.assignment(1, 0), Assignment::Column { column: 0, flipped: true });
    ///
    /// assert!(GroupMap::from_codes(array![[3, 0]], 2).is_err());
    /// ```
    pub fn from_codes(codes: Array2<i32>, order: usize) -> Result<Self> {
        let replicates = codes.nrows();
        let params = codes.ncols();

        let zero_replicates = if params == 0 {
            0
        } else {
            codes.column(0).iter().filter(|&&c| c == 0).count()
        };
        validate_counts(replicates, order, zero_replicates)?;

        for ((rep, param), &code) in codes.indexed_iter() {
            if code.unsigned_abs() as usize > order {
                return Err(Error::invalid_params(format!(
                    "group code {code} at replicate {rep}, parameter {param} exceeds order {order}"
                )));
            }
        }

        for param in 1..params {
            let zeros = codes.column(param).iter().filter(|&&c| c == 0).count();
            if zeros != zero_replicates {
                return Err(Error::invalid_params(format!(
                    "parameter {param} has {zeros} baseline replicates, expected {zero_replicates}"
                )));
            }
        }

        Ok(Self {
            codes,
            order,
            zero_replicates,
        })
    }

    /// Number of replicate blocks.
    #[must_use]
    pub fn replicates(&self) -> usize {
        self.codes.nrows()
    }

    /// Number of parameters.
    #[must_use]
    pub fn params(&self) -> usize {
        self.codes.ncols()
    }

    /// Hadamard order the codes index into.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Baseline replicates per parameter.
    #[must_use]
    pub fn zero_replicates(&self) -> usize {
        self.zero_replicates
    }

    /// Raw signed code for one replicate and parameter.
    #[must_use]
    pub fn code(&self, replicate: usize, param: usize) -> i32 {
        self.codes[[replicate, param]]
    }

    /// Decoded assignment for one replicate and parameter.
    #[must_use]
    pub fn assignment(&self, replicate: usize, param: usize) -> Assignment {
        match self.code(replicate, param) {
            0 => Assignment::Baseline,
            k => Assignment::Column {
                column: k.unsigned_abs() as usize - 1,
                flipped: k < 0,
            },
        }
    }

    /// Get a reference to the code matrix.
    #[must_use]
    pub fn codes(&self) -> &Array2<i32> {
        &self.codes
    }
}

fn validate_counts(replicates: usize, order: usize, zero_replicates: usize) -> Result<()> {
    if replicates == 0 {
        return Err(Error::invalid_params("replicates must be at least 1"));
    }
    if order == 0 {
        return Err(Error::invalid_params("order must be at least 1"));
    }
    if zero_replicates > replicates {
        return Err(Error::invalid_params(format!(
            "zero replicates ({zero_replicates}) cannot exceed replicates ({replicates})"
        )));
    }
    Ok(())
}
