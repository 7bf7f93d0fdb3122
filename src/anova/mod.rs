//! ANOVA decomposition of simulated responses.
//!
//! Given one response per design row and the row's [`Level`](crate::design::Level) labels, this
//! module estimates how much of the response variance each parameter's main
//! effect and each pairwise interaction explains:
//!
//! - Main effects: a one-way ANOVA per parameter over the three levels,
//!   with `(2, n - 3)` degrees of freedom.
//! - Interactions: a two-way ANOVA per pair over the 3 x 3 joint cells,
//!   with `(4, n - 9)` degrees of freedom.
//! - R²: the additive shares `SS / SSTO` of the main effects, and of the
//!   main effects plus interactions.
//!
//! Sampling variability of the F-statistics is estimated by [`bootstrap`].
//!
//! ## Example
//!
//! ```
//! use iffd::IffdBuilder;
//! use iffd::anova::{analyze, Effect};
//!
//! let design = IffdBuilder::new()
//!     .parameter(0.0, 1.0)
//!     .parameter(0.0, 1.0)
//!     .replicates(40)
//!     .order(12)
//!     .zero_replicates(8)
//!     .seed(3)
//!     .build()
//!     .unwrap();
//!
//! // Only the first parameter matters
//! let responses: Vec<f64> = design.samples().rows().into_iter().map(|x| 5.0 * x[0]).collect();
//! let result = analyze(&responses, design.levels()).unwrap();
//!
//! assert_eq!(result.f_values().len(), 3);
//! let f0 = result.entry(Effect::Main(0)).f_value();
//! let f1 = result.entry(Effect::Main(1)).f_value();
//! assert!(f0 > f1);
//! ```
//!
//! ## Degenerate statistics
//!
//! An F-ratio needs every level (or joint cell) observed and a positive error
//! mean square. When the responses are constant, a level or cell is empty,
//! the error sum of squares vanishes, or there are too few samples for any
//! error degrees of freedom, the entry's `f_ratio` is `None` and its
//! [`Degeneracy`] says why. Sums of squares and `empty_cells` are still
//! filled in, and the rest of the table is unaffected.

mod bootstrap;
mod interactions;
mod main_effects;
mod report;
mod types;

pub use bootstrap::{bootstrap, BootstrapCi, BootstrapConfig};
pub use report::AnalysisReport;
pub use types::{AnovaResult, Degeneracy, Effect, EffectEntry};

#[cfg(feature = "parallel")]
pub(crate) use bootstrap::{resample_f_values, statistic_count, summarize};

use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use tracing::{debug, warn};

use crate::design::LevelMatrix;
use crate::error::{Error, Result};
use crate::utils::{pair_count, pairs};

use interactions::interaction_effect;
use main_effects::{main_effect, LevelStats};

/// Error sums of squares below this share of SSTO count as zero.
const RELATIVE_EPSILON: f64 = 1e-12;

/// Per-sample rounding allowance, in ulps of the largest response.
const ROUNDING_ULPS: f64 = 4.0;

/// Response totals shared by every effect.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Totals {
    pub samples: usize,
    pub grand_mean: f64,
    pub total_ss: f64,
    /// SSTO is zero up to rounding.
    pub constant: bool,
}

impl Totals {
    pub fn new(responses: &[f64]) -> Self {
        let samples = responses.len();
        let grand_mean = responses.iter().sum::<f64>() / samples as f64;
        let total_ss: f64 = responses.iter().map(|y| (y - grand_mean).powi(2)).sum();
        let max_abs = responses.iter().fold(0.0_f64, |acc, y| acc.max(y.abs()));
        // The mean of equal responses can be off by a few ulps, so SSTO of a
        // constant vector is bounded by n squared rounding errors
        let rounding = ROUNDING_ULPS * f64::EPSILON * max_abs;
        let all_equal = responses
            .first()
            .map_or(true, |&first| responses.iter().all(|&y| y == first));

        Self {
            samples,
            grand_mean,
            total_ss,
            constant: all_equal || total_ss <= samples as f64 * rounding * rounding,
        }
    }
}

/// Raw sums for one effect before the F-ratio is formed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EffectSums {
    pub sum_of_squares: f64,
    pub treatment_ss: f64,
    pub error_ss: f64,
    pub degrees_of_freedom: usize,
    /// Degrees of freedom consumed by the fitted means (3 or 9).
    pub lost_df: usize,
    pub empty_cells: usize,
}

impl EffectEntry {
    pub(crate) fn from_sums(effect: Effect, sums: EffectSums, totals: &Totals) -> Self {
        let error_df = totals.samples.saturating_sub(sums.lost_df);
        let mean_square = sums.sum_of_squares / sums.degrees_of_freedom as f64;
        let error_mean_square = if error_df > 0 {
            sums.error_ss / error_df as f64
        } else {
            f64::NAN
        };

        let degeneracy = if totals.constant {
            Some(Degeneracy::ZeroTotalVariance)
        } else if sums.empty_cells > 0 {
            Some(Degeneracy::EmptyCell)
        } else if error_df == 0 {
            Some(Degeneracy::NoErrorDegreesOfFreedom)
        } else if sums.error_ss <= RELATIVE_EPSILON * totals.total_ss {
            Some(Degeneracy::ZeroErrorVariance)
        } else {
            None
        };

        let f_ratio = degeneracy.is_none().then(|| mean_square / error_mean_square);
        let contribution = if totals.constant {
            0.0
        } else {
            sums.sum_of_squares / totals.total_ss
        };

        Self {
            effect,
            sum_of_squares: sums.sum_of_squares,
            treatment_ss: sums.treatment_ss,
            error_ss: sums.error_ss,
            degrees_of_freedom: sums.degrees_of_freedom,
            error_df,
            mean_square,
            error_mean_square,
            f_ratio,
            p_value: None,
            contribution,
            empty_cells: sums.empty_cells,
            degeneracy,
        }
    }
}

/// Run the ANOVA decomposition.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if `responses` and `levels` disagree
/// on the number of rows, [`Error::NonFiniteResponse`] for a NaN or infinite
/// response, and [`Error::InvalidParams`] for an empty input.
pub fn analyze(responses: &[f64], levels: &LevelMatrix) -> Result<AnovaResult> {
    validate_inputs(responses, levels)?;

    debug!(
        samples = responses.len(),
        nparam = levels.ncols(),
        statistics = levels.ncols() + pair_count(levels.ncols()),
        "running ANOVA"
    );

    let mut result = decompose(responses, levels);
    for entry in &mut result.effects {
        entry.p_value = entry
            .f_ratio
            .and_then(|f| f_p_value(f, entry.degrees_of_freedom, entry.error_df));
    }

    let degenerate = result.degenerate_count();
    if degenerate > 0 {
        let first = result.effects.iter().find_map(|e| e.degeneracy.map(|d| (e.effect, d)));
        if let Some((effect, reason)) = first {
            warn!(
                degenerate,
                first = %effect,
                reason = %reason,
                "ANOVA produced degenerate statistics"
            );
        }
    }

    Ok(result)
}

/// Upper-tail probability of `f` under F(df1, df2).
fn f_p_value(f: f64, df1: usize, df2: usize) -> Option<f64> {
    FisherSnedecor::new(df1 as f64, df2 as f64)
        .ok()
        .map(|dist| dist.sf(f))
}

pub(crate) fn validate_inputs(responses: &[f64], levels: &LevelMatrix) -> Result<()> {
    if responses.len() != levels.nrows() {
        return Err(Error::dimension_mismatch(
            format!("{} responses (one per design row)", levels.nrows()),
            format!("{} responses", responses.len()),
        ));
    }
    if responses.is_empty() {
        return Err(Error::invalid_params("at least one response is required"));
    }
    if levels.ncols() == 0 {
        return Err(Error::invalid_params("at least one parameter is required"));
    }
    if let Some((index, &value)) = responses.iter().enumerate().find(|(_, y)| !y.is_finite()) {
        return Err(Error::NonFiniteResponse { index, value });
    }
    Ok(())
}

/// Decompose validated inputs. Leaves p-values unset.
pub(crate) fn decompose(responses: &[f64], levels: &LevelMatrix) -> AnovaResult {
    let nparam = levels.ncols();
    let totals = Totals::new(responses);

    let stats: Vec<LevelStats> = levels
        .columns()
        .into_iter()
        .map(|column| LevelStats::new(responses, column))
        .collect();

    let mut effects = Vec::with_capacity(nparam + pair_count(nparam));
    for (param, param_stats) in stats.iter().enumerate() {
        effects.push(main_effect(
            param,
            param_stats,
            responses,
            levels.column(param),
            &totals,
        ));
    }
    let r2_main: f64 = effects.iter().map(|e| e.contribution).sum();

    for (i, j) in pairs(nparam) {
        effects.push(interaction_effect(
            (i, j),
            (&stats[i], &stats[j]),
            responses,
            (levels.column(i), levels.column(j)),
            &totals,
        ));
    }
    let r2_interactions: f64 = effects[nparam..].iter().map(|e| e.contribution).sum();

    AnovaResult {
        nparam,
        samples: totals.samples,
        grand_mean: totals.grand_mean,
        total_ss: totals.total_ss,
        effects,
        r2_main,
        r2_total: r2_main + r2_interactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Level;
    use ndarray::{array, Array2};

    fn full_layout(reps: usize) -> LevelMatrix {
        let mut rows = Vec::new();
        for a in Level::ALL {
            for b in Level::ALL {
                for _ in 0..reps {
                    rows.extend([a, b]);
                }
            }
        }
        Array2::from_shape_vec((9 * reps, 2), rows).unwrap()
    }

    #[test]
    fn test_dimension_mismatch() {
        let levels = full_layout(1);
        let err = analyze(&[1.0; 5], &levels).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_non_finite_response() {
        let levels = full_layout(1);
        let mut y = vec![1.0; 9];
        y[4] = f64::NAN;
        let err = analyze(&y, &levels).unwrap_err();
        assert!(matches!(err, Error::NonFiniteResponse { index: 4, .. }));
    }

    #[test]
    fn test_empty_input() {
        let levels: LevelMatrix = Array2::from_elem((0, 2), Level::Mid);
        assert!(analyze(&[], &levels).is_err());
    }

    #[test]
    fn test_constant_response_is_degenerate() {
        let levels = full_layout(3);
        let result = analyze(&[2.5; 27], &levels).unwrap();

        assert_eq!(result.total_ss, 0.0);
        assert_eq!(result.degenerate_count(), 3);
        for entry in &result.effects {
            assert_eq!(entry.degeneracy, Some(Degeneracy::ZeroTotalVariance));
            assert!(entry.p_value.is_none());
        }
        assert!(result.f_values().iter().all(|f| f.is_nan()));
        assert_eq!(result.r2(), [0.0, 0.0]);
    }

    #[test]
    fn test_large_offset_keeps_f_values() {
        let levels = full_layout(3);
        let y: Vec<f64> = levels
            .rows()
            .into_iter()
            .enumerate()
            .map(|(k, r)| f64::from(r[0].code()) + 0.1 * (k % 3) as f64)
            .collect();
        let shifted: Vec<f64> = y.iter().map(|v| 1e7 + v).collect();

        let base = analyze(&y, &levels).unwrap();
        let result = analyze(&shifted, &levels).unwrap();
        assert_eq!(base.degenerate_count(), 0);
        assert_eq!(result.degenerate_count(), 0);

        let f_base = base.entry(Effect::Main(0)).f_ratio.unwrap();
        let f = result.entry(Effect::Main(0)).f_ratio.unwrap();
        assert!((f - f_base).abs() < 1e-6 * f_base, "{f} vs {f_base}");
        assert!((result.r2_main - base.r2_main).abs() < 1e-9);
    }

    #[test]
    fn test_constant_offset_response_is_degenerate() {
        let levels = full_layout(3);
        let result = analyze(&[1e7 + 0.1; 27], &levels).unwrap();
        assert!(result
            .effects
            .iter()
            .all(|e| e.degeneracy == Some(Degeneracy::ZeroTotalVariance)));
    }

    #[test]
    fn test_missing_central_level_is_degenerate() {
        // No baseline replicates: the central level never occurs
        let mut rows = Vec::new();
        for a in [Level::Low, Level::High] {
            for b in [Level::Low, Level::High] {
                for _ in 0..4 {
                    rows.extend([a, b]);
                }
            }
        }
        let levels = Array2::from_shape_vec((16, 2), rows).unwrap();
        let y: Vec<f64> = levels
            .rows()
            .into_iter()
            .enumerate()
            .map(|(k, r)| f64::from(r[0].code() * r[1].code()) + 0.1 * (k % 2) as f64)
            .collect();
        let result = analyze(&y, &levels).unwrap();

        for param in 0..2 {
            let entry = result.entry(Effect::Main(param));
            assert_eq!(entry.empty_cells, 1);
            assert_eq!(entry.degeneracy, Some(Degeneracy::EmptyCell));
            assert!(entry.f_ratio.is_none());
            assert!(entry.p_value.is_none());
        }
        let inter = result.entry(Effect::Interaction(0, 1));
        assert_eq!(inter.empty_cells, 5);
        assert_eq!(inter.degeneracy, Some(Degeneracy::EmptyCell));
        // Sums of squares are still reported
        assert!(inter.sum_of_squares > 0.0);
        assert_eq!(result.degenerate_count(), 3);
        assert!(result.f_values().iter().all(|f| f.is_nan()));
    }

    #[test]
    fn test_sparse_joint_layout() {
        // Both parameters always share a level: every level is observed but
        // only the three diagonal joint cells are
        let mut rows = Vec::new();
        for level in Level::ALL {
            for _ in 0..4 {
                rows.extend([level, level]);
            }
        }
        let levels = Array2::from_shape_vec((12, 2), rows).unwrap();
        let y: Vec<f64> = levels
            .rows()
            .into_iter()
            .enumerate()
            .map(|(k, r)| 2.0 * f64::from(r[0].code()) + 0.1 * (k % 2) as f64)
            .collect();
        let result = analyze(&y, &levels).unwrap();

        for param in 0..2 {
            let entry = result.entry(Effect::Main(param));
            assert_eq!(entry.empty_cells, 0);
            assert!(entry.f_ratio.is_some());
        }
        let inter = result.entry(Effect::Interaction(0, 1));
        assert_eq!(inter.empty_cells, 6);
        assert_eq!(inter.degeneracy, Some(Degeneracy::EmptyCell));
        assert!(inter.f_ratio.is_none());
    }

    #[test]
    fn test_no_error_degrees_of_freedom() {
        let levels = array![[Level::Low], [Level::Mid], [Level::High]];
        let result = analyze(&[1.0, 2.0, 4.0], &levels).unwrap();
        assert_eq!(
            result.effects[0].degeneracy,
            Some(Degeneracy::NoErrorDegreesOfFreedom)
        );
        assert_eq!(result.effects.len(), 1);
    }

    #[test]
    fn test_zero_error_variance() {
        // Response fully determined by parameter 0's level
        let levels = full_layout(2);
        let y: Vec<f64> = levels.rows().into_iter().map(|r| f64::from(r[0].code())).collect();
        let result = analyze(&y, &levels).unwrap();

        assert_eq!(
            result.entry(Effect::Main(0)).degeneracy,
            Some(Degeneracy::ZeroErrorVariance)
        );
        assert!((result.entry(Effect::Main(0)).contribution - 1.0).abs() < 1e-12);
        // Parameter 1 explains nothing but still gets an F
        let f1 = result.entry(Effect::Main(1)).f_ratio.unwrap();
        assert!(f1.abs() < 1e-12);
    }

    #[test]
    fn test_p_values_follow_f() {
        let levels = full_layout(4);
        let y: Vec<f64> = levels
            .rows()
            .into_iter()
            .enumerate()
            .map(|(k, r)| 3.0 * f64::from(r[0].code()) + if k % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let result = analyze(&y, &levels).unwrap();

        let strong = result.entry(Effect::Main(0));
        let weak = result.entry(Effect::Main(1));
        assert!(strong.p_value.unwrap() < 1e-6);
        assert!(weak.p_value.unwrap() > strong.p_value.unwrap());
        assert!(weak.p_value.unwrap() <= 1.0);
    }

    #[test]
    fn test_r2_accumulation() {
        let levels = full_layout(3);
        let y: Vec<f64> = levels
            .rows()
            .into_iter()
            .enumerate()
            .map(|(k, r)| {
                let a = f64::from(r[0].code());
                let b = f64::from(r[1].code());
                a + a * b + 0.1 * (k % 3) as f64
            })
            .collect();
        let result = analyze(&y, &levels).unwrap();

        let main: f64 = result.main_effects().iter().map(|e| e.contribution).sum();
        let inter: f64 = result.interactions().iter().map(|e| e.contribution).sum();
        assert!((result.r2_main - main).abs() < 1e-12);
        assert!((result.r2_total - main - inter).abs() < 1e-12);
        assert!(result.r2_total > result.r2_main);
    }
}
