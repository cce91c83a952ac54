//! The shared director password.

use std::fmt;

/// Deployment-wide secret that gates director claims.
///
/// Compared by plain equality; there is no rate limiting.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectorPassword(String);

impl DirectorPassword {
    /// Wraps the configured secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Whether `candidate` matches the configured secret.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for DirectorPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DirectorPassword(***)")
    }
}
