//! Utility functions for order factorization, pair indexing and summary statistics.
//!
//! These helpers are shared by the Hadamard builder (which must split an order
//! into `2^e * p`) and by the ANOVA engine (which lays interaction statistics
//! out in lexicographic pair order).

/// Base orders for which a Hadamard seed matrix is tabulated.
pub const BASE_ORDERS: [usize; 3] = [1, 12, 20];

/// Factorization of a Hadamard order as `base * 2^doublings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFactorization {
    /// The seed order `p` (1, 12 or 20).
    pub base: usize,
    /// Number of Kronecker doubling steps `e`.
    pub doublings: u32,
}

impl OrderFactorization {
    /// The order this factorization describes.
    #[must_use]
    pub fn order(&self) -> usize {
        self.base << self.doublings
    }
}

/// Split `n` into `p * 2^e` with `p` one of [`BASE_ORDERS`].
///
/// Returns `None` for `n == 0` and for any order whose odd part is not 1, 3
/// or 5, or whose odd part is 3 or 5 without at least a factor of 4 alongside
/// (so that the remaining seed is 12 or 20).
///
/// # Examples
///
/// ```
/// use iffd::utils::decompose_order;
///
/// let f = decompose_order(48).unwrap();
/// assert_eq!((f.base, f.doublings), (12, 2));
///
/// let f = decompose_order(8).unwrap();
/// assert_eq!((f.base, f.doublings), (1, 3));
///
/// assert!(decompose_order(28).is_none()); // 4 * 7
/// assert!(decompose_order(6).is_none());  // 2 * 3
/// ```
#[must_use]
pub fn decompose_order(n: usize) -> Option<OrderFactorization> {
    if n == 0 {
        return None;
    }

    let twos = n.trailing_zeros();
    let odd = n >> twos;

    let (base, doublings) = match odd {
        1 => (1, twos),
        3 if twos >= 2 => (12, twos - 2),
        5 if twos >= 2 => (20, twos - 2),
        _ => return None,
    };

    Some(OrderFactorization { base, doublings })
}

/// Number of unordered pairs `(i, j)` with `i < j < n`.
///
/// # Examples
///
/// ```
/// use iffd::utils::pair_count;
///
/// assert_eq!(pair_count(2), 1);
/// assert_eq!(pair_count(104), 5356);
/// assert_eq!(pair_count(0), 0);
/// ```
#[must_use]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Position of the pair `(i, j)`, `i < j < n`, in lexicographic order.
///
/// # Panics
///
/// Panics if `i >= j` or `j >= n`.
///
/// # Examples
///
/// ```
/// use iffd::utils::pair_rank;
///
/// assert_eq!(pair_rank(0, 1, 4), 0);
/// assert_eq!(pair_rank(0, 3, 4), 2);
/// assert_eq!(pair_rank(1, 2, 4), 3);
/// assert_eq!(pair_rank(2, 3, 4), 5);
/// ```
#[must_use]
pub fn pair_rank(i: usize, j: usize, n: usize) -> usize {
    assert!(i < j && j < n, "pair ({i}, {j}) is not ordered within 0..{n}");
    i * (2 * n - i - 1) / 2 + (j - i - 1)
}

/// Iterate over all pairs `(i, j)` with `i < j < n` in lexicographic order.
///
/// # Examples
///
/// ```
/// use iffd::utils::pairs;
///
/// let all: Vec<(usize, usize)> = pairs(3).collect();
/// assert_eq!(all, vec![(0, 1), (0, 2), (1, 2)]);
/// ```
pub fn pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
}

/// Mean and sample standard deviation (denominator `len - 1`).
///
/// Returns `None` when fewer than two values are supplied.
#[must_use]
pub fn mean_and_sample_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

    Some((mean, (ss / (n - 1.0)).sqrt()))
}
