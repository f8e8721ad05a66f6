//! Run identity.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::Utc;

/// Identifier for one lifecycle run.
///
/// Embedded into every generated payload so that records from
/// concurrent or repeated runs never collide, and so cleanup can later
/// target a single run's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl RunId {
    /// Generate a run id from the current wall clock (unix millis).
    #[must_use]
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis().unsigned_abs())
    }

    /// Build a run id from a raw value, for reproducible runs.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Last three digits, used where a short discriminator is enough.
    pub(crate) const fn short(self) -> u64 {
        self.0 % 1000
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_its_own_display() {
        let run = RunId::from_raw(1_712_345_678_901);
        let parsed: RunId = run.to_string().parse().expect("parse");
        assert_eq!(parsed, run);
    }

    #[test]
    fn short_is_last_three_digits() {
        assert_eq!(RunId::from_raw(1_712_345_678_901).short(), 901);
    }
}
