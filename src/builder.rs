//! Builder pattern for generating IFFD designs.
//!
//! The builder collects parameter bounds and design sizes, validates them
//! eagerly and seeds its own generator, so a fixed seed always reproduces the
//! same design.
//!
//! # Example
//!
//! ```
//! use iffd::IffdBuilder;
//!
//! let design = IffdBuilder::new()
//!     .parameter(0.0, 1.0)
//!     .parameter(10.0, 20.0)
//!     .replicates(20)
//!     .order(12)
//!     .zero_replicates(4)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(design.nsample(), 20 * 24);
//! assert_eq!(design.nparam(), 2);
//! ```
//!
//! # Order Selection
//!
//! The Hadamard order is taken from, in priority order:
//!
//! - an explicit [`IffdBuilder::order`], which must be buildable
//! - the smallest buildable order at least [`IffdBuilder::min_order`]
//! - the default of 20

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::design::{generate, validate_bounds, Design, DesignConfig, ParameterBound};
use crate::error::{Error, Result};
use crate::hadamard::{is_valid_order, smallest_valid_order};

/// Builder for IFFD designs.
///
/// Unset sizes fall back to [`DesignConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct IffdBuilder {
    bounds: Vec<ParameterBound>,
    replicates: Option<usize>,
    order: Option<usize>,
    min_order: Option<usize>,
    zero_replicates: Option<usize>,
    seed: Option<u64>,
}

impl IffdBuilder {
    /// Create a new builder with no parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one parameter with range `[lower, upper]`.
    #[must_use]
    pub fn parameter(mut self, lower: f64, upper: f64) -> Self {
        self.bounds.push(ParameterBound::new(lower, upper));
        self
    }

    /// Replace all parameter bounds.
    #[must_use]
    pub fn bounds(mut self, bounds: Vec<ParameterBound>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the number of replicate blocks.
    #[must_use]
    pub fn replicates(mut self, replicates: usize) -> Self {
        self.replicates = Some(replicates);
        self
    }

    /// Set the Hadamard order exactly.
    #[must_use]
    pub fn order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Use the smallest buildable order that is at least `min_order`.
    ///
    /// Ignored when [`IffdBuilder::order`] is also set.
    #[must_use]
    pub fn min_order(mut self, min_order: usize) -> Self {
        self.min_order = Some(min_order);
        self
    }

    /// Set the number of baseline replicates per parameter.
    #[must_use]
    pub fn zero_replicates(mut self, zero_replicates: usize) -> Self {
        self.zero_replicates = Some(zero_replicates);
        self
    }

    /// Set the generator seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resolve the design configuration without generating anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if no buildable order satisfies
    /// [`IffdBuilder::min_order`], or any error from [`DesignConfig::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use iffd::IffdBuilder;
    ///
    /// let config = IffdBuilder::new().min_order(13).config().unwrap();
    /// assert_eq!(config.order, 16);
    /// assert_eq!(config.replicates, 100);
    /// ```
    pub fn config(&self) -> Result<DesignConfig> {
        let config = self.resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Fill unset sizes from the defaults without validating them.
    fn resolve(&self) -> Result<DesignConfig> {
        let defaults = DesignConfig::default();

        let order = match (self.order, self.min_order) {
            (Some(order), _) => order,
            (None, Some(min)) => smallest_valid_order(min).ok_or(Error::InvalidOrder(min))?,
            (None, None) => defaults.order,
        };

        let config = DesignConfig {
            replicates: self.replicates.unwrap_or(defaults.replicates),
            order,
            zero_replicates: self.zero_replicates.unwrap_or(defaults.zero_replicates),
            seed: self.seed.unwrap_or(defaults.seed),
        };
        Ok(config)
    }

    /// Generate the design with a generator seeded from [`IffdBuilder::seed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the order, bounds or replicate counts are invalid,
    /// checked in that order.
    pub fn build(self) -> Result<Design> {
        let config = self.checked_config()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        generate(&self.bounds, &config, &mut rng)
    }

    /// Generate the design drawing from a caller-supplied generator.
    ///
    /// The configured seed is recorded on the design but not used.
    ///
    /// # Errors
    ///
    /// Returns an error if the order, bounds or replicate counts are invalid,
    /// checked in that order.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Design> {
        let config = self.checked_config()?;
        generate(&self.bounds, &config, rng)
    }

    /// Resolve the configuration, reporting errors in the same order as
    /// [`generate`].
    fn checked_config(&self) -> Result<DesignConfig> {
        let config = self.resolve()?;
        if !is_valid_order(config.order) {
            return Err(Error::InvalidOrder(config.order));
        }
        validate_bounds(&self.bounds)?;
        config.validate()?;
        Ok(config)
    }
}
