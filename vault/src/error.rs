//! Vault error types using thiserror 2.0.
//!
//! Every failure the supervisor or the reader can observe maps onto one of
//! these variants, and each variant carries an [`ErrorKind`] used as a
//! metric label.

use thiserror::Error;

/// Vault-specific errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Vault could not be reached, rejected the token, or answered with a
    /// non-success status.
    #[error("Vault unavailable: {0}")]
    StoreUnavailable(String),

    /// The current token cannot be extended.
    #[error("Vault token is not renewable")]
    TokenNotRenewable,

    /// Nothing to read at the given path and key.
    #[error("Secret not found at path {path} with key {key}")]
    SecretNotFound {
        /// Requested path
        path: String,
        /// Requested key
        key: String,
    },

    /// The token TTL could not be decoded as an integer.
    #[error("Could not decode token TTL: {0}")]
    TtlDecode(String),

    /// A token lookup field had an unexpected shape.
    #[error("Malformed Vault response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Coarse classification of a [`VaultError`], used for metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport, auth or status failure
    StoreUnavailable,
    /// Token cannot be renewed
    TokenNotRenewable,
    /// Nothing to read
    SecretNotFound,
    /// TTL could not be decoded
    TtlDecode,
    /// Renewable flag had an unexpected shape
    MalformedResponse,
    /// Startup configuration problem
    InvalidConfig,
}

impl ErrorKind {
    /// Label value for metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoreUnavailable => "store_unavailable",
            Self::TokenNotRenewable => "token_not_renewable",
            Self::SecretNotFound => "secret_not_found",
            Self::TtlDecode => "ttl_decode",
            Self::MalformedResponse => "malformed_response",
            Self::InvalidConfig => "invalid_config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VaultError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::StoreUnavailable(_) | Self::Http(_) | Self::Serialization(_) => {
                ErrorKind::StoreUnavailable
            }
            Self::TokenNotRenewable => ErrorKind::TokenNotRenewable,
            Self::SecretNotFound { .. } => ErrorKind::SecretNotFound,
            Self::TtlDecode(_) => ErrorKind::TtlDecode,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Collapse any store-call failure into [`VaultError::StoreUnavailable`].
    #[must_use]
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::StoreUnavailable(_) => self,
            other => Self::StoreUnavailable(other.to_string()),
        }
    }

    /// Create a secret not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self::SecretNotFound {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::unavailable("connection refused");
        assert_eq!(err.to_string(), "Vault unavailable: connection refused");

        let err = VaultError::not_found("secret/app", "password");
        assert_eq!(
            err.to_string(),
            "Secret not found at path secret/app with key password"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            VaultError::unavailable("x").kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            VaultError::TokenNotRenewable.kind(),
            ErrorKind::TokenNotRenewable
        );
        assert_eq!(
            VaultError::not_found("p", "k").kind(),
            ErrorKind::SecretNotFound
        );
        assert_eq!(
            VaultError::TtlDecode("nan".to_string()).kind(),
            ErrorKind::TtlDecode
        );
        assert_eq!(
            VaultError::MalformedResponse("renewable flag 1".to_string()).kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_from_serde_error() {
        let Err(json_err) = serde_json::from_str::<serde_json::Value>("{") else {
            panic!("invalid json parsed");
        };
        let err: VaultError = json_err.into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_into_unavailable() {
        let err = VaultError::invalid_config("bad").into_unavailable();
        assert!(matches!(err, VaultError::StoreUnavailable(ref msg) if msg.contains("bad")));

        let err = VaultError::unavailable("down").into_unavailable();
        assert_eq!(err.to_string(), "Vault unavailable: down");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::SecretNotFound.as_str(), "secret_not_found");
        assert_eq!(ErrorKind::StoreUnavailable.to_string(), "store_unavailable");
    }
}
