//! Design verification.
//!
//! Checks that a design satisfies the properties the analysis relies on:
//! every value lies in the band of its level, each parameter has the
//! configured number of baseline blocks, and every non-baseline block splits
//! evenly between the low and high sub-bands.

use std::fmt;

use super::{Design, Level};

/// Result of verifying a design.
#[derive(Debug, Clone, Default)]
pub struct DesignReport {
    /// Whether the design passes verification.
    pub is_valid: bool,
    /// Whether the block checks were run (they are skipped on filtered designs).
    pub blocks_checked: bool,
    /// Details about any issues found.
    pub issues: Vec<DesignIssue>,
}

/// A specific issue found during verification.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignIssue {
    /// A value falls outside its parameter's range.
    OutOfBounds {
        row: usize,
        param: usize,
        value: f64,
    },
    /// A value lies in range but outside the band of its level.
    BandMismatch {
        row: usize,
        param: usize,
        value: f64,
        level: Level,
    },
    /// The unfiltered design does not have `replicates * 2 * order` rows.
    RowCount { expected: usize, actual: usize },
    /// A parameter has the wrong number of baseline blocks.
    BaselineCount {
        param: usize,
        expected: usize,
        actual: usize,
    },
    /// A block mixes central-band rows with low or high rows.
    MixedBlock { replicate: usize, param: usize },
    /// A non-baseline block has unequal low and high counts.
    UnbalancedBlock {
        replicate: usize,
        param: usize,
        low: usize,
        high: usize,
    },
}

impl fmt::Display for DesignIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { row, param, value } => {
                write!(f, "row {row}, parameter {param}: value {value} outside bounds")
            }
            Self::BandMismatch {
                row,
                param,
                value,
                level,
            } => write!(
                f,
                "row {row}, parameter {param}: value {value} outside band of level {level}"
            ),
            Self::RowCount { expected, actual } => {
                write!(f, "expected {expected} rows, found {actual}")
            }
            Self::BaselineCount {
                param,
                expected,
                actual,
            } => write!(
                f,
                "parameter {param}: {actual} baseline replicates, expected {expected}"
            ),
            Self::MixedBlock { replicate, param } => {
                write!(f, "replicate {replicate}, parameter {param}: block mixes baseline and switched rows")
            }
            Self::UnbalancedBlock {
                replicate,
                param,
                low,
                high,
            } => write!(
                f,
                "replicate {replicate}, parameter {param}: {low} low rows vs {high} high rows"
            ),
        }
    }
}

/// Verify a design.
///
/// Value checks run on every design. Block checks need the unfiltered row
/// layout and are skipped once [`Design::retain_rows`] has been applied.
///
/// # Example
///
/// ```
/// use iffd::IffdBuilder;
/// use iffd::design::verify_design;
///
/// let design = IffdBuilder::new()
///     .parameter(0.0, 1.0)
///     .replicates(8)
///     .order(12)
///     .zero_replicates(2)
///     .build()
///     .unwrap();
///
/// let report = verify_design(&design);
/// assert!(report.is_valid, "{:?}", report.issues);
/// ```
#[must_use]
pub fn verify_design(design: &Design) -> DesignReport {
    let mut issues = Vec::new();
    check_values(design, &mut issues);

    let blocks_checked = !design.is_filtered();
    if blocks_checked {
        check_blocks(design, &mut issues);
    }

    DesignReport {
        is_valid: issues.is_empty(),
        blocks_checked,
        issues,
    }
}

fn check_values(design: &Design, issues: &mut Vec<DesignIssue>) {
    let config = design.config();
    let fraction = config.zero_replicates as f64 / config.replicates as f64;

    for (param, bound) in design.bounds().iter().enumerate() {
        let mid_width = bound.mid_width(fraction);
        let tol = 1e-12 * bound.width();

        for (row, (&value, &level)) in design
            .samples()
            .column(param)
            .iter()
            .zip(design.levels().column(param))
            .enumerate()
        {
            if !bound.contains(value) {
                issues.push(DesignIssue::OutOfBounds { row, param, value });
                continue;
            }
            let (lo, hi) = bound.band(level, mid_width);
            if value < lo - tol || value > hi + tol {
                issues.push(DesignIssue::BandMismatch {
                    row,
                    param,
                    value,
                    level,
                });
            }
        }
    }
}

fn check_blocks(design: &Design, issues: &mut Vec<DesignIssue>) {
    let config = design.config();
    let block = design.block_rows();

    if design.nsample() != config.nsample() {
        issues.push(DesignIssue::RowCount {
            expected: config.nsample(),
            actual: design.nsample(),
        });
        return;
    }

    for param in 0..design.nparam() {
        let column = design.levels().column(param);
        let mut baselines = 0;

        for replicate in 0..config.replicates {
            let mut counts = [0usize; 3];
            for k in 0..block {
                counts[column[replicate * block + k].index()] += 1;
            }
            let [low, mid, high] = counts;

            if mid == block {
                baselines += 1;
            } else if mid > 0 {
                issues.push(DesignIssue::MixedBlock { replicate, param });
            } else if low != high {
                issues.push(DesignIssue::UnbalancedBlock {
                    replicate,
                    param,
                    low,
                    high,
                });
            }
        }

        if baselines != config.zero_replicates {
            issues.push(DesignIssue::BaselineCount {
                param,
                expected: config.zero_replicates,
                actual: baselines,
            });
        }
    }
}
