//! Seed Hadamard matrices for the non-power-of-two orders.
//!
//! Both tables are normalized (first row and first column all `+1`) and
//! satisfy `H * H^T = n * I`. Orders `2^e` need no table: they grow from the
//! 1x1 seed `[1]`.

/// Order-12 seed matrix.
#[rustfmt::skip]
pub(crate) const H12: [[i8; 12]; 12] = [
    [ 1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1],
    [ 1, -1,  1, -1,  1,  1,  1, -1, -1, -1,  1, -1],
    [ 1, -1, -1,  1, -1,  1,  1,  1, -1, -1, -1,  1],
    [ 1,  1, -1, -1,  1, -1,  1,  1,  1, -1, -1, -1],
    [ 1, -1,  1, -1, -1,  1, -1,  1,  1,  1, -1, -1],
    [ 1, -1, -1,  1, -1, -1,  1, -1,  1,  1,  1, -1],
    [ 1, -1, -1, -1,  1, -1, -1,  1, -1,  1,  1,  1],
    [ 1,  1, -1, -1, -1,  1, -1, -1,  1, -1,  1,  1],
    [ 1,  1,  1, -1, -1, -1,  1, -1, -1,  1, -1,  1],
    [ 1,  1,  1,  1, -1, -1, -1,  1, -1, -1,  1, -1],
    [ 1, -1,  1,  1,  1, -1, -1, -1,  1, -1, -1,  1],
    [ 1,  1, -1,  1,  1,  1, -1, -1, -1,  1, -1, -1],
];

/// Order-20 seed matrix.
#[rustfmt::skip]
pub(crate) const H20: [[i8; 20]; 20] = [
    [ 1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1],
    [ 1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1],
    [ 1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1],
    [ 1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1],
    [ 1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1],
    [ 1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1],
    [ 1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1],
    [ 1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1],
    [ 1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1],
    [ 1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1],
    [ 1, -1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1],
    [ 1,  1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1],
    [ 1, -1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1],
    [ 1,  1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1],
    [ 1,  1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1],
    [ 1,  1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1],
    [ 1,  1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1],
    [ 1, -1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1],
    [ 1, -1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1],
    [ 1,  1, -1, -1,  1,  1, -1, -1, -1, -1,  1, -1,  1, -1,  1,  1,  1,  1, -1, -1],
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthogonal<const N: usize>(h: &[[i8; N]; N]) {
        for i in 0..N {
            for j in 0..N {
                let dot: i32 = (0..N).map(|k| i32::from(h[i][k]) * i32::from(h[j][k])).sum();
                let expected = if i == j { N as i32 } else { 0 };
                assert_eq!(dot, expected, "rows {i} and {j}");
            }
        }
    }

    #[test]
    fn test_seed_tables_orthogonal() {
        assert_orthogonal(&H12);
        assert_orthogonal(&H20);
    }

    #[test]
    fn test_seed_tables_normalized() {
        assert!(H12[0].iter().all(|&v| v == 1));
        assert!(H20[0].iter().all(|&v| v == 1));
        assert!(H12.iter().all(|row| row[0] == 1));
        assert!(H20.iter().all(|row| row[0] == 1));
    }
}
