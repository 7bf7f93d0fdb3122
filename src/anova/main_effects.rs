//! One-way decomposition for each parameter's main effect.

use ndarray::ArrayView1;

use super::types::{Effect, EffectEntry};
use super::{EffectSums, Totals};
use crate::design::{Level, LEVEL_COUNT};

/// Per-level counts and means of the responses for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LevelStats {
    pub counts: [usize; LEVEL_COUNT],
    /// Zero for empty levels, so `count * mean` terms vanish.
    pub means: [f64; LEVEL_COUNT],
}

impl LevelStats {
    pub fn new(responses: &[f64], column: ArrayView1<'_, Level>) -> Self {
        let mut counts = [0usize; LEVEL_COUNT];
        let mut sums = [0.0; LEVEL_COUNT];

        for (&y, level) in responses.iter().zip(column) {
            counts[level.index()] += 1;
            sums[level.index()] += y;
        }

        let means = std::array::from_fn(|l| {
            if counts[l] > 0 {
                sums[l] / counts[l] as f64
            } else {
                0.0
            }
        });

        Self { counts, means }
    }

    pub fn mean(&self, level: Level) -> f64 {
        self.means[level.index()]
    }

    pub fn empty_levels(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }
}

/// Main-effect row for `param`.
///
/// SSTR = Σ n_l (Ȳ_l - Ȳ)², SSE = Σ (y - Ȳ_level)², df = (2, n - 3).
pub(crate) fn main_effect(
    param: usize,
    stats: &LevelStats,
    responses: &[f64],
    column: ArrayView1<'_, Level>,
    totals: &Totals,
) -> EffectEntry {
    let treatment_ss: f64 = stats
        .counts
        .iter()
        .zip(stats.means)
        .map(|(&n, mean)| n as f64 * (mean - totals.grand_mean).powi(2))
        .sum();

    let error_ss: f64 = responses
        .iter()
        .zip(column)
        .map(|(&y, &level)| (y - stats.mean(level)).powi(2))
        .sum();

    EffectEntry::from_sums(
        Effect::Main(param),
        EffectSums {
            sum_of_squares: treatment_ss,
            treatment_ss,
            error_ss,
            degrees_of_freedom: LEVEL_COUNT - 1,
            lost_df: LEVEL_COUNT,
            empty_cells: stats.empty_levels(),
        },
        totals,
    )
}
