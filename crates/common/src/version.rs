use serde::{Deserialize, Serialize};

/// Monotonically increasing version of an aggregate.
///
/// Every successful persist bumps the version by one; stores compare the
/// version carried by an update against the stored one and reject the write
/// on mismatch (optimistic concurrency).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for a freshly created aggregate.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_zero() {
        assert_eq!(Version::initial().as_i64(), 0);
    }

    #[test]
    fn next_increments() {
        let v = Version::initial().next().next();
        assert_eq!(v.as_i64(), 2);
        assert!(v > Version::initial());
    }

    #[test]
    fn display_shows_raw_value() {
        assert_eq!(Version::new(7).to_string(), "7");
    }
}
