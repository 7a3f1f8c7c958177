//! Error types.
//!
//! Cache operations never fail: misses and rejected inserts are ordinary
//! return values. Errors only come from two places:
//!
//! - [`ConfigError`]: a fallible constructor was given parameters it cannot
//!   honour (`k == 0`, a non-finite decay factor, ...).
//! - [`InvariantError`]: a `check_invariants` walk found internal state that
//!   disagrees with itself.
//!
//! ```
//! use raincache::error::ConfigError;
//! use raincache::policy::lru_k::LrukCache;
//!
//! let cache: Result<LrukCache<u64, String>, ConfigError> =
//!     LrukCache::try_with_history(100, 50, 2);
//! assert!(cache.is_ok());
//!
//! let bad = LrukCache::<u64, String>::try_with_history(100, 50, 0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Returned when internal cache invariants are violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

/// Returned when cache configuration parameters are invalid.
///
/// ```
/// use raincache::policy::arc::ArcCache;
///
/// let err = ArcCache::<u64, u64>::try_with_threshold(8, 0).unwrap_err();
/// assert!(err.to_string().contains("transform_threshold"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_error_displays_message() {
        let err = InvariantError::new("map and list disagree");
        assert_eq!(err.to_string(), "map and list disagree");
        assert_eq!(err.message(), "map and list disagree");
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn config_error_displays_message() {
        let err = ConfigError::new("k must be at least 1");
        assert_eq!(err.to_string(), "k must be at least 1");
        assert!(format!("{:?}", err).contains("k must be"));
    }

    #[test]
    fn both_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
    }
}
