//! Error type shared by the credential hasher and the encoded-credential codec.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("secure random source unavailable")]
    EntropyUnavailable,
    #[error("malformed credential encoding: {0}")]
    MalformedEncoding(String),
    #[error("unsupported argon2 version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("unsupported credential algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid hash parameters: {0}")]
    InvalidParameters(String),
}

impl CryptoError {
    /// Stable tag for internal logs. Callers must not show it to end users.
    pub fn reason(&self) -> &'static str {
        match self {
            CryptoError::EntropyUnavailable => "entropy-unavailable",
            CryptoError::MalformedEncoding(_) => "malformed-encoding",
            CryptoError::UnsupportedVersion { .. } => "unsupported-version",
            CryptoError::UnsupportedAlgorithm(_) => "unsupported-algorithm",
            CryptoError::InvalidParameters(_) => "invalid-parameters",
        }
    }

    /// True for credentials written by a newer or foreign scheme, which points
    /// at a data migration problem rather than a corrupt row.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            CryptoError::UnsupportedVersion { .. } | CryptoError::UnsupportedAlgorithm(_)
        )
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        CryptoError::MalformedEncoding(detail.into())
    }
}
