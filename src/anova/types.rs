//! ANOVA result types.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::pair_rank;

/// The term an F-statistic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Effect {
    /// Main effect of one parameter.
    Main(usize),
    /// Two-way interaction of parameters `i < j`.
    Interaction(usize, usize),
}

impl Effect {
    /// Position of this effect in the flat F array of a result with
    /// `nparam` parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use iffd::anova::Effect;
    ///
    /// assert_eq!(Effect::Main(2).flat_index(4), 2);
    /// assert_eq!(Effect::Interaction(0, 1).flat_index(4), 4);
    /// assert_eq!(Effect::Interaction(2, 3).flat_index(4), 9);
    /// ```
    #[must_use]
    pub fn flat_index(self, nparam: usize) -> usize {
        match self {
            Effect::Main(i) => i,
            Effect::Interaction(i, j) => nparam + pair_rank(i, j, nparam),
        }
    }

    /// Whether this is a main effect.
    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Effect::Main(_))
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Main(i) => write!(f, "parameter {i}"),
            Effect::Interaction(i, j) => write!(f, "parameters {i} & {j}"),
        }
    }
}

/// Why an F-statistic could not be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Degeneracy {
    /// The responses do not vary at all.
    ZeroTotalVariance,
    /// A level (main effect) or joint cell (interaction) has no observations.
    EmptyCell,
    /// The error sum of squares is zero.
    ZeroErrorVariance,
    /// Too few samples to leave any error degrees of freedom.
    NoErrorDegreesOfFreedom,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::ZeroTotalVariance => write!(f, "zero total variance"),
            Degeneracy::EmptyCell => write!(f, "empty level or joint cell"),
            Degeneracy::ZeroErrorVariance => write!(f, "zero error variance"),
            Degeneracy::NoErrorDegreesOfFreedom => write!(f, "no error degrees of freedom"),
        }
    }
}

/// One row of the ANOVA table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectEntry {
    /// Which term this row describes.
    pub effect: Effect,
    /// Sum of squares attributed to the term (SSTR, or the pure interaction SSAB).
    pub sum_of_squares: f64,
    /// Sum of squares between level means (SSTR, or SSTRAB across the 9 joint cells).
    pub treatment_ss: f64,
    /// Within-level (or within-cell) error sum of squares.
    pub error_ss: f64,
    /// Treatment degrees of freedom (2 or 4).
    pub degrees_of_freedom: usize,
    /// Error degrees of freedom (`n - 3` or `n - 9`, zero when not positive).
    pub error_df: usize,
    /// `sum_of_squares / degrees_of_freedom`.
    pub mean_square: f64,
    /// `error_ss / error_df`, or NaN without error degrees of freedom.
    pub error_mean_square: f64,
    /// F-ratio, `None` when degenerate.
    pub f_ratio: Option<f64>,
    /// Upper-tail p-value of the F-ratio.
    pub p_value: Option<f64>,
    /// `sum_of_squares / SSTO`, zero when the responses do not vary.
    pub contribution: f64,
    /// Levels (out of 3) or joint cells (out of 9) with no observations.
    pub empty_cells: usize,
    /// Set when `f_ratio` is `None`.
    pub degeneracy: Option<Degeneracy>,
}

impl EffectEntry {
    /// F-ratio, NaN when degenerate.
    #[must_use]
    pub fn f_value(&self) -> f64 {
        self.f_ratio.unwrap_or(f64::NAN)
    }

    /// Whether an F-ratio could be formed.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.degeneracy.is_some()
    }
}

/// Result of an ANOVA decomposition.
///
/// `effects` holds the `nparam` main effects in parameter order followed by
/// the `nparam * (nparam - 1) / 2` interactions in lexicographic `(i, j)`
/// order, matching [`Effect::flat_index`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnovaResult {
    /// Number of parameters.
    pub nparam: usize,
    /// Number of samples analysed.
    pub samples: usize,
    /// Mean of all responses.
    pub grand_mean: f64,
    /// Total sum of squares (SSTO).
    pub total_ss: f64,
    /// All effect rows, main effects first.
    pub effects: Vec<EffectEntry>,
    /// Sum of main-effect contributions.
    pub r2_main: f64,
    /// Sum of main-effect and interaction contributions.
    ///
    /// The IFFD is not orthogonal, so this is an additive approximation and
    /// may exceed the true share of explained variance (or even 1).
    pub r2_total: f64,
}

impl AnovaResult {
    /// The flat F array, NaN marking degenerate entries.
    #[must_use]
    pub fn f_values(&self) -> Vec<f64> {
        self.effects.iter().map(EffectEntry::f_value).collect()
    }

    /// `[r2_main, r2_total]`.
    #[must_use]
    pub fn r2(&self) -> [f64; 2] {
        [self.r2_main, self.r2_total]
    }

    /// Main-effect rows.
    #[must_use]
    pub fn main_effects(&self) -> &[EffectEntry] {
        &self.effects[..self.nparam]
    }

    /// Interaction rows.
    #[must_use]
    pub fn interactions(&self) -> &[EffectEntry] {
        &self.effects[self.nparam..]
    }

    /// Row for one effect.
    ///
    /// # Panics
    ///
    /// Panics if the effect refers to a parameter outside the result.
    #[must_use]
    pub fn entry(&self, effect: Effect) -> &EffectEntry {
        &self.effects[effect.flat_index(self.nparam)]
    }

    /// Number of entries without an F-ratio.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.effects.iter().filter(|e| e.is_degenerate()).count()
    }

    /// Effects ordered by F-ratio, largest first, degenerate entries last.
    #[must_use]
    pub fn ranked(&self) -> Vec<&EffectEntry> {
        let mut ranked: Vec<&EffectEntry> = self.effects.iter().collect();
        ranked.sort_by(|a, b| match (a.f_ratio, b.f_ratio) {
            (Some(fa), Some(fb)) => fb.partial_cmp(&fa).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ranked
    }
}
