//! Parallel bootstrap support.
//!
//! This module provides a parallel version of [`crate::anova::bootstrap`]
//! using Rayon. Enable with the `parallel` feature flag (on by default).
//!
//! # Usage
//!
//! ```
//! use iffd::IffdBuilder;
//! use iffd::anova::{bootstrap, BootstrapConfig};
//! use iffd::parallel::par_bootstrap;
//!
//! let design = IffdBuilder::new()
//!     .parameter(0.0, 1.0)
//!     .parameter(0.0, 1.0)
//!     .replicates(40)
//!     .order(12)
//!     .zero_replicates(15)
//!     .build()
//!     .unwrap();
//! let y: Vec<f64> = design.samples().rows().into_iter().map(|x| x[0] - x[1]).collect();
//!
//! let config = BootstrapConfig { resamples: 20, ..Default::default() };
//! let par = par_bootstrap(&y, design.levels(), &config).unwrap();
//! let seq = bootstrap(&y, design.levels(), &config).unwrap();
//! assert_eq!(par, seq);
//! ```
//!
//! # Performance
//!
//! Each resample reruns the full decomposition, so the bootstrap dominates
//! the cost of an analysis. Resamples are independent and share only the
//! read-only inputs, so they split cleanly across cores. For a handful of
//! resamples on a small design the sequential version may be faster due to
//! parallelization overhead.

use rayon::prelude::*;
use tracing::debug;

use crate::anova::{
    resample_f_values, statistic_count, summarize, validate_inputs, BootstrapCi, BootstrapConfig,
};
use crate::design::LevelMatrix;
use crate::error::Result;

/// Parallel bootstrap over the F-statistics.
///
/// Resample `r` uses the generator seeded with `config.seed + r`, exactly as
/// the sequential version does, so both return identical results.
///
/// # Errors
///
/// Same as [`crate::anova::bootstrap`].
pub fn par_bootstrap(
    responses: &[f64],
    levels: &LevelMatrix,
    config: &BootstrapConfig,
) -> Result<BootstrapCi> {
    validate_inputs(responses, levels)?;
    config.validate()?;

    debug!(
        resamples = config.resamples,
        samples = responses.len(),
        threads = rayon::current_num_threads(),
        mode = "parallel",
        "starting bootstrap"
    );

    // Collecting an indexed parallel iterator keeps resample order.
    let draws: Vec<Vec<f64>> = (0..config.resamples)
        .into_par_iter()
        .map(|r| resample_f_values(responses, levels, config.seed, r))
        .collect();

    let ci = summarize(&draws, statistic_count(levels), config);
    debug!(resamples = ci.resamples, "bootstrap finished");
    Ok(ci)
}
