//! Ternary factor levels.

use std::fmt;

use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The sub-band a sampled parameter value was drawn from.
///
/// The analysis is built around exactly three levels; [`Level::index`] maps
/// them onto `0..3` for the per-level and per-cell accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Level {
    /// Low sub-band `[lower, mid - w/2]`, code `-1`.
    Low,
    /// Central band `[mid - w/2, mid + w/2]`, code `0`.
    Mid,
    /// High sub-band `[mid + w/2, upper]`, code `+1`.
    High,
}

/// Number of factor levels.
pub const LEVEL_COUNT: usize = 3;

impl Level {
    /// All levels in index order.
    pub const ALL: [Level; LEVEL_COUNT] = [Level::Low, Level::Mid, Level::High];

    /// The signed level code (`-1`, `0`, `+1`).
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            Level::Low => -1,
            Level::Mid => 0,
            Level::High => 1,
        }
    }

    /// Parse a signed level code.
    #[must_use]
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Level::Low),
            0 => Some(Level::Mid),
            1 => Some(Level::High),
            _ => None,
        }
    }

    /// Accumulator index (`Low -> 0`, `Mid -> 1`, `High -> 2`).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Level::Low => 0,
            Level::Mid => 1,
            Level::High => 2,
        }
    }

    /// Map a folded-design bit onto the low or high sub-band.
    #[must_use]
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Level::Low
        } else {
            Level::High
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "-1"),
            Level::Mid => write!(f, "0"),
            Level::High => write!(f, "+1"),
        }
    }
}

/// Convert a table of signed level codes into a level matrix.
///
/// Level tables produced elsewhere (for example read back from disk next to
/// the responses they belong to) arrive as plain integers.
///
/// # Errors
///
/// Returns an error naming the first entry that is not `-1`, `0` or `+1`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use iffd::design::{levels_from_codes, Level};
///
/// let levels = levels_from_codes(&array![[-1, 0], [1, 1]]).unwrap();
/// assert_eq!(levels[[0, 0]], Level::Low);
/// assert_eq!(levels[[1, 1]], Level::High);
///
/// assert!(levels_from_codes(&array![[2, 0]]).is_err());
/// ```
pub fn levels_from_codes(codes: &Array2<i8>) -> Result<Array2<Level>> {
    if let Some(((row, col), &code)) = codes
        .indexed_iter()
        .find(|(_, c)| Level::from_code(**c).is_none())
    {
        return Err(Error::invalid_params(format!(
            "level code {code} at row {row}, parameter {col} is not -1, 0 or +1"
        )));
    }

    Ok(codes.mapv(|c| Level::from_code(c).unwrap_or(Level::Mid)))
}
