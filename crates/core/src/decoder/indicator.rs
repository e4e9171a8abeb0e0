//! Decoded label values.

use serde::Serialize;
use thiserror::Error;

use crate::constants::{INVALID_INDICATOR, MAX_INDICATOR};

/// Why a token value could not become an [`Indicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("not a base-10 integer")]
    NotInteger,
    #[error("{0} is outside {{0, 1, 2}}")]
    OutOfDomain(i64),
}

/// Integer value of one named label for one row.
///
/// Observed values are `0` (absent), `1` (present) and `2` (ambiguous).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Indicator(i64);

impl Indicator {
    /// Parse a base-10 integer without a range check.
    pub fn parse(raw: &str) -> Result<Self, IndicatorError> {
        raw.trim().parse::<i64>().map(Self).map_err(|_| IndicatorError::NotInteger)
    }

    /// Parse a base-10 integer and require it to lie in `0..=2`.
    pub fn parse_bounded(raw: &str) -> Result<Self, IndicatorError> {
        let parsed = Self::parse(raw)?;
        if (0..=MAX_INDICATOR).contains(&parsed.0) {
            Ok(parsed)
        } else {
            Err(IndicatorError::OutOfDomain(parsed.0))
        }
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// True for the value that disqualifies a row when it appears in the
    /// first indicator column.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == INVALID_INDICATOR
    }
}

impl From<Indicator> for crate::Value {
    fn from(v: Indicator) -> Self {
        Self::Integer(v.0)
    }
}
