//! Iterated fractional factorial design generation.
//!
//! A design is `replicates` blocks of `2 * order` rows. Inside each block a
//! parameter is either held in its central band (a baseline replicate) or
//! switched between its low and high sub-bands by one column of a folded
//! Hadamard matrix. Every sampled value carries a [`Level`] label so the
//! responses can later be decomposed by [`crate::anova`].
//!
//! ## Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use iffd::design::{generate, DesignConfig, ParameterBound};
//!
//! let bounds = vec![ParameterBound::new(0.0, 1.0), ParameterBound::new(-2.0, 2.0)];
//! let config = DesignConfig { replicates: 10, order: 12, zero_replicates: 2, seed: 0 };
//!
//! let design = generate(&bounds, &config, &mut StdRng::seed_from_u64(1)).unwrap();
//! assert_eq!(design.nsample(), 10 * 24);
//! assert_eq!(design.nparam(), 2);
//! ```

mod group;
mod level;
mod sampler;
mod verify;

pub use group::{Assignment, GroupMap};
pub use level::{levels_from_codes, Level, LEVEL_COUNT};
pub use verify::{verify_design, DesignIssue, DesignReport};

use ndarray::{Array2, ArrayView1, Axis};
use rand::Rng;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hadamard::HadamardMatrix;

/// Continuous parameter values, one row per sample.
pub type SampleMatrix = Array2<f64>;

/// Level labels, row-aligned with a [`SampleMatrix`].
pub type LevelMatrix = Array2<Level>;

/// The closed range a parameter is sampled from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterBound {
    /// Lower end of the range.
    pub lower: f64,
    /// Upper end of the range.
    pub upper: f64,
}

impl ParameterBound {
    /// Create a bound. Validity is checked when a design is generated.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// The unit interval `[0, 1]`.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Width of the range.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Midpoint of the range.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.lower + 0.5 * self.width()
    }

    /// Width of the central band when `fraction` of the replicates are
    /// baseline replicates.
    #[must_use]
    pub fn mid_width(&self, fraction: f64) -> f64 {
        fraction * self.width()
    }

    /// The sub-band a value with `level` is drawn from.
    ///
    /// Band edges are clamped to the range so the returned interval is never
    /// inverted, even when the central band covers the whole range.
    ///
    /// # Example
    ///
    /// ```
    /// use iffd::design::{Level, ParameterBound};
    ///
    /// let b = ParameterBound::new(0.0, 10.0);
    /// assert_eq!(b.band(Level::Low, 2.0), (0.0, 4.0));
    /// assert_eq!(b.band(Level::Mid, 2.0), (4.0, 6.0));
    /// assert_eq!(b.band(Level::High, 2.0), (6.0, 10.0));
    /// ```
    #[must_use]
    pub fn band(&self, level: Level, mid_width: f64) -> (f64, f64) {
        let mid = self.midpoint();
        let inner_lo = (mid - 0.5 * mid_width).clamp(self.lower, self.upper);
        let inner_hi = (mid + 0.5 * mid_width).clamp(inner_lo, self.upper);

        match level {
            Level::Low => (self.lower, inner_lo),
            Level::Mid => (inner_lo, inner_hi),
            Level::High => (inner_hi, self.upper),
        }
    }

    /// Check whether `value` lies in `[lower, upper]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Default for ParameterBound {
    fn default() -> Self {
        Self::unit()
    }
}

/// Check every bound is finite with `lower < upper` and a finite width.
///
/// # Errors
///
/// Returns [`Error::BoundsViolation`] for the first offending parameter, or
/// [`Error::InvalidParams`] if there are no parameters at all.
pub fn validate_bounds(bounds: &[ParameterBound]) -> Result<()> {
    if bounds.is_empty() {
        return Err(Error::invalid_params("at least one parameter is required"));
    }

    for (parameter, b) in bounds.iter().enumerate() {
        let finite = b.lower.is_finite() && b.upper.is_finite() && b.width().is_finite();
        if !finite || b.lower >= b.upper {
            return Err(Error::BoundsViolation {
                parameter,
                lower: b.lower,
                upper: b.upper,
            });
        }
    }
    Ok(())
}

/// Sizes and seed for a design.
///
/// The defaults are 100 replicates of a 20-column Hadamard design with 15
/// baseline replicates per parameter, giving 4000 samples.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignConfig {
    /// Number of replicate blocks (`nrep`).
    pub replicates: usize,
    /// Hadamard order (`ncol`); each block has `2 * order` rows.
    pub order: usize,
    /// Baseline replicates per parameter (`nzero`).
    pub zero_replicates: usize,
    /// Seed used by [`crate::IffdBuilder`] to create its generator.
    pub seed: u64,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            replicates: 100,
            order: 20,
            zero_replicates: 15,
            seed: 0,
        }
    }
}

impl DesignConfig {
    /// Number of sample rows the configuration produces.
    #[must_use]
    pub fn nsample(&self) -> usize {
        self.replicates * 2 * self.order
    }

    /// Check the configuration, order first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] for an unbuildable order, then
    /// [`Error::InvalidParams`] for bad replicate counts.
    pub fn validate(&self) -> Result<()> {
        if !crate::hadamard::is_valid_order(self.order) {
            return Err(Error::InvalidOrder(self.order));
        }
        if self.replicates == 0 {
            return Err(Error::invalid_params("replicates must be at least 1"));
        }
        if self.zero_replicates > self.replicates {
            return Err(Error::invalid_params(format!(
                "zero replicates ({}) cannot exceed replicates ({})",
                self.zero_replicates, self.replicates
            )));
        }
        Ok(())
    }
}

/// A generated design: samples and levels kept row-aligned.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Design {
    samples: SampleMatrix,
    levels: LevelMatrix,
    groups: GroupMap,
    bounds: Vec<ParameterBound>,
    config: DesignConfig,
    source_rows: Option<Vec<usize>>,
}

impl Design {
    /// Number of sample rows.
    #[must_use]
    pub fn nsample(&self) -> usize {
        self.samples.nrows()
    }

    /// Number of parameters.
    #[must_use]
    pub fn nparam(&self) -> usize {
        self.samples.ncols()
    }

    /// Rows per replicate block (`2 * order`).
    #[must_use]
    pub fn block_rows(&self) -> usize {
        2 * self.config.order
    }

    /// Continuous values to feed the simulator, one row per run.
    #[must_use]
    pub fn samples(&self) -> &SampleMatrix {
        &self.samples
    }

    /// Level labels for the analysis.
    #[must_use]
    pub fn levels(&self) -> &LevelMatrix {
        &self.levels
    }

    /// Level labels as signed codes.
    #[must_use]
    pub fn level_codes(&self) -> Array2<i8> {
        self.levels.mapv(Level::code)
    }

    /// The group map the design was sampled from.
    #[must_use]
    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    /// Parameter bounds.
    #[must_use]
    pub fn bounds(&self) -> &[ParameterBound] {
        &self.bounds
    }

    /// Configuration the design was generated with.
    #[must_use]
    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    /// Original row index of each row, if the design has been filtered.
    #[must_use]
    pub fn source_rows(&self) -> Option<&[usize]> {
        self.source_rows.as_deref()
    }

    /// Whether rows have been dropped by [`Design::retain_rows`].
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.source_rows.is_some()
    }

    /// Keep only the rows whose sample values satisfy `keep`.
    ///
    /// Samples and levels stay aligned, and [`Design::source_rows`] maps each
    /// remaining row back to its position in the unfiltered design. Block
    /// structure no longer holds afterwards.
    ///
    /// # Example
    ///
    /// ```
    /// use iffd::IffdBuilder;
    ///
    /// let design = IffdBuilder::new()
    ///     .parameter(0.0, 1.0)
    ///     .parameter(0.0, 1.0)
    ///     .replicates(4)
    ///     .order(4)
    ///     .zero_replicates(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// let feasible = design.retain_rows(|row| row[0] + row[1] <= 1.5);
    /// assert!(feasible.nsample() <= design.nsample());
    /// assert_eq!(feasible.levels().nrows(), feasible.nsample());
    /// ```
    #[must_use]
    pub fn retain_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(ArrayView1<'_, f64>) -> bool,
    {
        let kept: Vec<usize> = self
            .samples
            .rows()
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| keep(row).then_some(i))
            .collect();

        let dropped = self.nsample() - kept.len();
        if dropped > 0 {
            warn!(dropped, kept = kept.len(), "design filter dropped sample rows");
        }

        let source_rows = match &self.source_rows {
            Some(prev) => kept.iter().map(|&i| prev[i]).collect(),
            None => kept.clone(),
        };

        Self {
            samples: self.samples.select(Axis(0), &kept),
            levels: self.levels.select(Axis(0), &kept),
            groups: self.groups.clone(),
            bounds: self.bounds.clone(),
            config: self.config.clone(),
            source_rows: Some(source_rows),
        }
    }

    /// Decompose into `(samples, levels)`.
    #[must_use]
    pub fn into_parts(self) -> (SampleMatrix, LevelMatrix) {
        (self.samples, self.levels)
    }
}

/// Generate a design for `bounds` using `rng` for every random draw.
///
/// Checks run in order: Hadamard order, bounds, replicate counts. Nothing is
/// allocated before all three pass.
///
/// # Errors
///
/// Returns [`Error::InvalidOrder`], [`Error::BoundsViolation`] or
/// [`Error::InvalidParams`].
pub fn generate<R: Rng + ?Sized>(
    bounds: &[ParameterBound],
    config: &DesignConfig,
    rng: &mut R,
) -> Result<Design> {
    if !crate::hadamard::is_valid_order(config.order) {
        return Err(Error::InvalidOrder(config.order));
    }
    validate_bounds(bounds)?;
    config.validate()?;

    let folded = HadamardMatrix::new(config.order)?.fold();
    let groups = GroupMap::random(
        config.replicates,
        bounds.len(),
        config.order,
        config.zero_replicates,
        rng,
    )?;
    let (samples, levels) = sampler::sample_design(bounds, &groups, &folded, rng);

    debug!(
        replicates = config.replicates,
        order = config.order,
        zero_replicates = config.zero_replicates,
        nparam = bounds.len(),
        nsample = samples.nrows(),
        "generated IFFD design"
    );

    Ok(Design {
        samples,
        levels,
        groups,
        bounds: bounds.to_vec(),
        config: config.clone(),
        source_rows: None,
    })
}
