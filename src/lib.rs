//! # IFFD
//!
//! Global sensitivity analysis of black-box simulation models with
//! Iterated Fractional Factorial Designs and ANOVA.
//!
//! ## Overview
//!
//! A sensitivity study has three steps:
//! - **Design**: draw parameter samples whose low, central and high sub-bands
//!   follow the columns of a folded Hadamard matrix, replicated many times
//!   with random column assignments.
//! - **Simulate**: run the model once per sample row (outside this crate) and
//!   collect one scalar response per row.
//! - **Analyse**: decompose the response variance into main effects and
//!   pairwise interactions, yielding F-ratios, additive R² shares and
//!   bootstrap confidence half-widths.
//!
//! This library provides:
//! - Hadamard matrices of order `2^e * p`, `p` in `{1, 12, 20}`, with folding
//! - Seeded, reproducible design generation with per-row level labels
//! - Design verification and feasibility filtering
//! - One-way and two-way ANOVA with per-statistic degeneracy reporting
//! - Bootstrap intervals, sequential or parallel with identical results
//!
//! ## Quick Start
//!
//! ```rust
//! use iffd::IffdBuilder;
//! use iffd::anova::{analyze, bootstrap, AnalysisReport, BootstrapConfig};
//!
//! let design = IffdBuilder::new()
//!     .parameter(0.0, 1.0)
//!     .parameter(0.0, 1.0)
//!     .replicates(20)
//!     .order(12)
//!     .zero_replicates(3)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! // Stand-in for a simulation model
//! let responses: Vec<f64> = design
//!     .samples()
//!     .rows()
//!     .into_iter()
//!     .map(|x| x[0] * x[1])
//!     .collect();
//!
//! let result = analyze(&responses, design.levels()).unwrap();
//! let ci = bootstrap(&responses, design.levels(), &BootstrapConfig { resamples: 50, ..Default::default() }).unwrap();
//!
//! assert_eq!(result.f_values().len(), 3);   // 2 main effects + 1 interaction
//! println!("{}", AnalysisReport::new(&result).with_ci(&ci));
//! ```
//!
//! ## Notation
//!
//! - **nrep**: replicate blocks
//! - **ncol**: Hadamard order; each block spans `2 * ncol` rows
//! - **nzero**: baseline replicates per parameter, held in the central band
//!   whose width is `nzero / nrep` of the parameter range
//!
//! ## Features
//!
//! - `parallel`: Enable the parallel bootstrap using rayon (default)
//! - `serde`: Enable serialization/deserialization of designs and results

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod anova;
pub mod builder;
pub mod design;
pub mod error;
pub mod hadamard;
pub mod utils;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::anova::{
        analyze, bootstrap, AnalysisReport, AnovaResult, BootstrapCi, BootstrapConfig, Degeneracy,
        Effect, EffectEntry,
    };
    pub use crate::builder::IffdBuilder;
    pub use crate::design::{
        generate, verify_design, Design, DesignConfig, DesignReport, GroupMap, Level,
        ParameterBound,
    };
    pub use crate::error::{Error, Result};
    pub use crate::hadamard::{
        is_valid_order, smallest_valid_order, valid_orders, FoldedDesign, HadamardMatrix,
    };

    #[cfg(feature = "parallel")]
    pub use crate::parallel::par_bootstrap;
}

// Re-export commonly used items at crate root
pub use anova::{analyze, bootstrap, AnovaResult, BootstrapCi, BootstrapConfig};
pub use builder::IffdBuilder;
pub use design::{generate, Design, DesignConfig, ParameterBound};
pub use error::{Error, Result};

#[cfg(feature = "parallel")]
pub use parallel::par_bootstrap;
