//! RoundNumber value object parsed from notification payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Height of a consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundNumber(u64);

impl RoundNumber {
    /// Creates a round number from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parses a decimal payload such as `"123"`.
    ///
    /// Surrounding whitespace is ignored. Empty, signed, fractional and
    /// non-numeric payloads are rejected instead of being coerced.
    pub fn parse(payload: &str) -> Result<Self, ValidationError> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("round"));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "round",
                format!("'{}' is not a round number", trimmed),
            ));
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("round", e.to_string()))
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The round after this one, or `None` on overflow.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RoundNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
