//! Error types for request signing.

/// Errors raised while building or signing a request.
///
/// Every variant describes bad caller input. Nothing here is transient, so
/// retrying the same call yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// A required value is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested HMAC algorithm is not registered.
    #[error("{0} algorithm not available")]
    UnsupportedAlgorithm(String),

    /// The secret cannot be used as HMAC key material.
    #[error("invalid key: secret must not be empty")]
    InvalidKey,
}

impl SignerError {
    /// Shorthand for [`SignerError::InvalidArgument`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// The error raised when one of the canonical fields is absent.
    pub(crate) fn missing(field: &str) -> Self {
        Self::InvalidArgument(format!("{field} must be given"))
    }
}

/// Convenience result type for signing operations.
pub type SignerResult<T> = Result<T, SignerError>;
