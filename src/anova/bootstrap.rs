//! Bootstrap confidence intervals on the F-statistics.
//!
//! Each resample draws `n` rows with replacement, reruns the decomposition
//! and records the flat F array. The half-width reported for a statistic is
//! `z * s`, where `s` is the sample standard deviation of that statistic
//! across resamples (a normal approximation, not a percentile interval).
//!
//! Resample `r` draws from its own generator seeded with `seed + r`, so the
//! result does not depend on the order resamples are computed in. The
//! parallel variant in [`crate::parallel`] relies on this.

use ndarray::Axis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{decompose, validate_inputs};
use crate::design::LevelMatrix;
use crate::error::{Error, Result};
use crate::utils::{mean_and_sample_std, pair_count};

/// Settings for [`bootstrap`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BootstrapConfig {
    /// Number of resamples (default: 1000).
    pub resamples: usize,
    /// Multiplier applied to the standard deviation (default: 1.96).
    pub z_multiplier: f64,
    /// Base seed; resample `r` uses `seed + r`.
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: 1000,
            z_multiplier: 1.96,
            seed: 0,
        }
    }
}

impl BootstrapConfig {
    /// Default settings with the multiplier for a two-sided normal interval
    /// at `level` confidence.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < level < 1`.
    ///
    /// # Example
    ///
    /// ```
    /// use iffd::anova::BootstrapConfig;
    ///
    /// let config = BootstrapConfig::with_confidence(0.95).unwrap();
    /// assert!((config.z_multiplier - 1.96).abs() < 1e-3);
    ///
    /// assert!(BootstrapConfig::with_confidence(1.0).is_err());
    /// ```
    pub fn with_confidence(level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(Error::invalid_params(format!(
                "confidence level {level} must lie strictly between 0 and 1"
            )));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| Error::invalid_params(format!("standard normal: {e}")))?;

        Ok(Self {
            z_multiplier: normal.inverse_cdf(0.5 + 0.5 * level),
            ..Self::default()
        })
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than two resamples or a multiplier that is
    /// not finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.resamples < 2 {
            return Err(Error::invalid_params(format!(
                "at least 2 resamples are needed for a standard deviation, got {}",
                self.resamples
            )));
        }
        if !(self.z_multiplier.is_finite() && self.z_multiplier > 0.0) {
            return Err(Error::invalid_params(format!(
                "z multiplier {} must be finite and positive",
                self.z_multiplier
            )));
        }
        Ok(())
    }
}

/// Bootstrap summary, one slot per F-statistic in flat order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BootstrapCi {
    /// `z * std` per statistic; NaN with fewer than two finite resamples.
    pub half_widths: Vec<f64>,
    /// Mean F per statistic over the finite resamples.
    pub means: Vec<f64>,
    /// Resamples that produced a finite F, per statistic.
    pub valid_resamples: Vec<usize>,
    /// Total resamples drawn.
    pub resamples: usize,
    /// Multiplier used.
    pub z_multiplier: f64,
}

impl BootstrapCi {
    /// Number of statistics covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.half_widths.len()
    }

    /// Whether no statistics are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.half_widths.is_empty()
    }

    /// `(f - h, f + h)` for statistic `index` centred on `f`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`BootstrapCi::len`].
    #[must_use]
    pub fn interval(&self, index: usize, f: f64) -> (f64, f64) {
        let h = self.half_widths[index];
        (f - h, f + h)
    }
}

/// Estimate confidence half-widths for every F-statistic.
///
/// # Errors
///
/// Returns the input errors of [`super::analyze`], or an error from
/// [`BootstrapConfig::validate`].
///
/// # Example
///
/// ```
/// use iffd::IffdBuilder;
/// use iffd::anova::{analyze, bootstrap, BootstrapConfig};
///
/// let design = IffdBuilder::new()
///     .parameter(0.0, 1.0)
///     .parameter(0.0, 1.0)
///     .replicates(20)
///     .order(12)
///     .zero_replicates(4)
///     .build()
///     .unwrap();
/// let y: Vec<f64> = design.samples().rows().into_iter().map(|x| x[0] + x[0] * x[1]).collect();
///
/// let config = BootstrapConfig { resamples: 50, ..Default::default() };
/// let ci = bootstrap(&y, design.levels(), &config).unwrap();
/// assert_eq!(ci.len(), analyze(&y, design.levels()).unwrap().f_values().len());
/// ```
pub fn bootstrap(
    responses: &[f64],
    levels: &LevelMatrix,
    config: &BootstrapConfig,
) -> Result<BootstrapCi> {
    validate_inputs(responses, levels)?;
    config.validate()?;

    debug!(
        resamples = config.resamples,
        samples = responses.len(),
        mode = "sequential",
        "starting bootstrap"
    );

    let draws: Vec<Vec<f64>> = (0..config.resamples)
        .map(|r| resample_f_values(responses, levels, config.seed, r))
        .collect();

    let ci = summarize(&draws, statistic_count(levels), config);
    debug!(resamples = ci.resamples, "bootstrap finished");
    Ok(ci)
}

pub(crate) fn statistic_count(levels: &LevelMatrix) -> usize {
    levels.ncols() + pair_count(levels.ncols())
}

/// Flat F array of resample `r`.
pub(crate) fn resample_f_values(
    responses: &[f64],
    levels: &LevelMatrix,
    seed: u64,
    r: usize,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(r as u64));
    let n = responses.len();
    let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

    let y: Vec<f64> = rows.iter().map(|&i| responses[i]).collect();
    let resampled = levels.select(Axis(0), &rows);

    let f = decompose(&y, &resampled).f_values();
    trace!(resample = r, "bootstrap resample done");
    f
}

/// Reduce per-resample F arrays to half-widths.
pub(crate) fn summarize(draws: &[Vec<f64>], statistics: usize, config: &BootstrapConfig) -> BootstrapCi {
    let mut half_widths = Vec::with_capacity(statistics);
    let mut means = Vec::with_capacity(statistics);
    let mut valid_resamples = Vec::with_capacity(statistics);

    let mut finite = Vec::with_capacity(draws.len());
    for stat in 0..statistics {
        finite.clear();
        finite.extend(draws.iter().map(|f| f[stat]).filter(|v| v.is_finite()));

        let (mean, std) = mean_and_sample_std(&finite)
            .unwrap_or_else(|| (finite.first().copied().unwrap_or(f64::NAN), f64::NAN));
        half_widths.push(config.z_multiplier * std);
        means.push(mean);
        valid_resamples.push(finite.len());
    }

    BootstrapCi {
        half_widths,
        means,
        valid_resamples,
        resamples: draws.len(),
        z_multiplier: config.z_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Level;
    use ndarray::Array2;

    fn layout() -> (Vec<f64>, LevelMatrix) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for (k, a) in Level::ALL.into_iter().cycle().take(60).enumerate() {
            let b = Level::ALL[(k / 3) % 3];
            rows.extend([a, b]);
            y.push(2.0 * f64::from(a.code()) + 0.3 * ((k * 7) % 5) as f64);
        }
        (y, Array2::from_shape_vec((60, 2), rows).unwrap())
    }

    #[test]
    fn test_config_validation() {
        assert!(BootstrapConfig::default().validate().is_ok());
        let one = BootstrapConfig {
            resamples: 1,
            ..Default::default()
        };
        assert!(one.validate().is_err());
        let bad_z = BootstrapConfig {
            z_multiplier: -1.0,
            ..Default::default()
        };
        assert!(bad_z.validate().is_err());
    }

    #[test]
    fn test_with_confidence() {
        let c90 = BootstrapConfig::with_confidence(0.90).unwrap();
        let c99 = BootstrapConfig::with_confidence(0.99).unwrap();
        assert!((c90.z_multiplier - 1.6449).abs() < 1e-3);
        assert!((c99.z_multiplier - 2.5758).abs() < 1e-3);
        assert!(BootstrapConfig::with_confidence(0.0).is_err());
        assert!(BootstrapConfig::with_confidence(f64::NAN).is_err());
    }

    #[test]
    fn test_bootstrap_shape_and_determinism() {
        let (y, levels) = layout();
        let config = BootstrapConfig {
            resamples: 40,
            seed: 9,
            ..Default::default()
        };

        let a = bootstrap(&y, &levels, &config).unwrap();
        let b = bootstrap(&y, &levels, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.resamples, 40);
        assert!(a.half_widths.iter().all(|h| h.is_finite() && *h >= 0.0));
    }

    #[test]
    fn test_resample_is_order_independent() {
        let (y, levels) = layout();
        let forward: Vec<Vec<f64>> = (0..5).map(|r| resample_f_values(&y, &levels, 1, r)).collect();
        let backward: Vec<Vec<f64>> = (0..5).rev().map(|r| resample_f_values(&y, &levels, 1, r)).collect();
        for (r, f) in forward.iter().enumerate() {
            assert_eq!(f, &backward[4 - r]);
        }
    }

    #[test]
    fn test_summarize_skips_degenerate() {
        let draws = vec![
            vec![1.0, f64::NAN],
            vec![3.0, 2.0],
            vec![5.0, f64::NAN],
        ];
        let config = BootstrapConfig::default();
        let ci = summarize(&draws, 2, &config);

        assert_eq!(ci.valid_resamples, vec![3, 1]);
        assert_eq!(ci.means[0], 3.0);
        assert!((ci.half_widths[0] - 1.96 * 2.0).abs() < 1e-12);
        assert!(ci.half_widths[1].is_nan());
        assert_eq!(ci.means[1], 2.0);
        assert_eq!(ci.interval(0, 10.0), (10.0 - 3.92, 10.0 + 3.92));
    }

    #[test]
    #[should_panic]
    fn test_interval_out_of_range_panics() {
        let ci = summarize(&[vec![1.0], vec![2.0]], 1, &BootstrapConfig::default());
        let _ = ci.interval(1, 0.0);
    }

    #[test]
    fn test_constant_response_gives_nan_widths() {
        let (_, levels) = layout();
        let y = vec![1.0; 60];
        let config = BootstrapConfig {
            resamples: 10,
            ..Default::default()
        };
        let ci = bootstrap(&y, &levels, &config).unwrap();
        assert!(ci.half_widths.iter().all(|h| h.is_nan()));
        assert!(ci.valid_resamples.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_rejects_bad_input() {
        let (y, levels) = layout();
        let config = BootstrapConfig::default();
        assert!(bootstrap(&y[..10], &levels, &config).is_err());
    }
}
