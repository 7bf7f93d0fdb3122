//! Two-way decomposition for each parameter pair.

use ndarray::ArrayView1;

use super::main_effects::LevelStats;
use super::types::{Effect, EffectEntry};
use super::{EffectSums, Totals};
use crate::design::{Level, LEVEL_COUNT};

const CELL_COUNT: usize = LEVEL_COUNT * LEVEL_COUNT;

/// Counts and means over the 3 x 3 joint level cells of two parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CellStats {
    pub counts: [[usize; LEVEL_COUNT]; LEVEL_COUNT],
    pub means: [[f64; LEVEL_COUNT]; LEVEL_COUNT],
}

impl CellStats {
    pub fn new(
        responses: &[f64],
        first: ArrayView1<'_, Level>,
        second: ArrayView1<'_, Level>,
    ) -> Self {
        let mut counts = [[0usize; LEVEL_COUNT]; LEVEL_COUNT];
        let mut sums = [[0.0; LEVEL_COUNT]; LEVEL_COUNT];

        for ((&y, a), b) in responses.iter().zip(first).zip(second) {
            counts[a.index()][b.index()] += 1;
            sums[a.index()][b.index()] += y;
        }

        let means = std::array::from_fn(|k| {
            std::array::from_fn(|l| {
                if counts[k][l] > 0 {
                    sums[k][l] / counts[k][l] as f64
                } else {
                    0.0
                }
            })
        });

        Self { counts, means }
    }

    pub fn mean(&self, a: Level, b: Level) -> f64 {
        self.means[a.index()][b.index()]
    }

    pub fn empty_cells(&self) -> usize {
        self.counts.iter().flatten().filter(|&&c| c == 0).count()
    }
}

/// Interaction row for the pair `(i, j)`.
///
/// SSTRAB = Σ n_kl (Ȳ_kl - Ȳ)² and SSAB = Σ n_kl (Ȳ_kl - Ȳ_k - Ȳ_l + Ȳ)²,
/// with error SSEAB = Σ (y - Ȳ_cell)² and df = (4, n - 9).
pub(crate) fn interaction_effect(
    (i, j): (usize, usize),
    (stats_i, stats_j): (&LevelStats, &LevelStats),
    responses: &[f64],
    (first, second): (ArrayView1<'_, Level>, ArrayView1<'_, Level>),
    totals: &Totals,
) -> EffectEntry {
    let cells = CellStats::new(responses, first, second);
    let gy = totals.grand_mean;

    let mut treatment_ss = 0.0;
    let mut interaction_ss = 0.0;
    for a in Level::ALL {
        for b in Level::ALL {
            let n = cells.counts[a.index()][b.index()] as f64;
            let cell = cells.mean(a, b);
            treatment_ss += n * (cell - gy).powi(2);
            interaction_ss += n * (cell - stats_i.mean(a) - stats_j.mean(b) + gy).powi(2);
        }
    }

    let error_ss: f64 = responses
        .iter()
        .zip(first)
        .zip(second)
        .map(|((&y, &a), &b)| (y - cells.mean(a, b)).powi(2))
        .sum();

    EffectEntry::from_sums(
        Effect::Interaction(i, j),
        EffectSums {
            sum_of_squares: interaction_ss,
            treatment_ss,
            error_ss,
            degrees_of_freedom: (LEVEL_COUNT - 1) * (LEVEL_COUNT - 1),
            lost_df: CELL_COUNT,
            empty_cells: cells.empty_cells(),
        },
        totals,
    )
}
