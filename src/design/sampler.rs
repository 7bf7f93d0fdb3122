//! Stratified sampling of an iterated fractional factorial design.
//!
//! Each replicate block spans `2 * order` rows (the rows of the folded design).
//! Within a block, a parameter either sits in its central band for every row
//! (baseline) or follows one folded-design column, drawing from the low
//! sub-band where the bit is 0 and the high sub-band where it is 1.

use ndarray::Array2;
use rand::Rng;

use super::group::{Assignment, GroupMap};
use super::level::Level;
use super::{LevelMatrix, ParameterBound, SampleMatrix};
use crate::hadamard::FoldedDesign;

/// Fill the sample and level matrices for a group map.
///
/// Draw order is replicate-major, then parameter, then row, so a seeded
/// generator always yields the same design.
pub(crate) fn sample_design<R: Rng + ?Sized>(
    bounds: &[ParameterBound],
    groups: &GroupMap,
    folded: &FoldedDesign,
    rng: &mut R,
) -> (SampleMatrix, LevelMatrix) {
    let block = folded.rows();
    let nsample = groups.replicates() * block;
    let nparam = bounds.len();
    let mid_fraction = groups.zero_replicates() as f64 / groups.replicates() as f64;

    let mut samples = Array2::zeros((nsample, nparam));
    let mut levels = Array2::from_elem((nsample, nparam), Level::Mid);

    for rep in 0..groups.replicates() {
        let first = rep * block;

        for (param, bound) in bounds.iter().enumerate() {
            let mid_width = bound.mid_width(mid_fraction);

            for k in 0..block {
                let level = match groups.assignment(rep, param) {
                    Assignment::Baseline => Level::Mid,
                    Assignment::Column { column, flipped } => {
                        let bit = folded.bit(k, column);
                        Level::from_bit(if flipped { 1 - bit } else { bit })
                    }
                };

                let (lo, hi) = bound.band(level, mid_width);
                samples[[first + k, param]] = rng.gen_range(lo..=hi);
                levels[[first + k, param]] = level;
            }
        }
    }

    (samples, levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hadamard::HadamardMatrix;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_bounds(n: usize) -> Vec<ParameterBound> {
        vec![ParameterBound::new(0.0, 1.0); n]
    }

    #[test]
    fn test_block_layout() {
        // Two replicates: parameter 0 follows column 1, then is baseline;
        // parameter 1 is baseline, then follows column 0 flipped.
        let groups = GroupMap::from_codes(array![[2, 0], [0, -1]], 4).unwrap();
        let folded = HadamardMatrix::new(4).unwrap().fold();
        let mut rng = StdRng::seed_from_u64(1);

        let (samples, levels) = sample_design(&unit_bounds(2), &groups, &folded, &mut rng);
        assert_eq!(samples.dim(), (16, 2));
        assert_eq!(levels.dim(), (16, 2));

        for k in 0..8 {
            let expected = Level::from_bit(folded.bit(k, 1));
            assert_eq!(levels[[k, 0]], expected);
            assert_eq!(levels[[k, 1]], Level::Mid);

            assert_eq!(levels[[8 + k, 0]], Level::Mid);
            let flipped = Level::from_bit(1 - folded.bit(k, 0));
            assert_eq!(levels[[8 + k, 1]], flipped);
        }
    }

    #[test]
    fn test_values_follow_bands() {
        let groups = GroupMap::from_codes(array![[1, 0], [0, 3], [-2, 4]], 4).unwrap();
        let folded = HadamardMatrix::new(4).unwrap().fold();
        let bounds = vec![ParameterBound::new(-5.0, 5.0), ParameterBound::new(10.0, 40.0)];
        let mut rng = StdRng::seed_from_u64(42);

        let (samples, levels) = sample_design(&bounds, &groups, &folded, &mut rng);
        let mid_fraction = 1.0 / 3.0;

        for ((row, param), &value) in samples.indexed_iter() {
            let bound = bounds[param];
            let (lo, hi) = bound.band(levels[[row, param]], bound.mid_width(mid_fraction));
            assert!(value >= lo && value <= hi, "row {row} param {param}: {value} not in [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_all_baseline_stays_central() {
        let groups = GroupMap::from_codes(array![[0], [0]], 2).unwrap();
        let folded = HadamardMatrix::new(2).unwrap().fold();
        let mut rng = StdRng::seed_from_u64(5);

        let (samples, levels) = sample_design(&unit_bounds(1), &groups, &folded, &mut rng);
        assert!(levels.iter().all(|&l| l == Level::Mid));
        // Mid band spans the whole range when every replicate is baseline
        assert!(samples.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
