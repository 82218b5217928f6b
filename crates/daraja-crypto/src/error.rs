//! Error types for credential derivation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for credential derivation.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while deriving gateway secrets.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A required account field is missing or empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The public key certificate does not exist.
    #[error("certificate not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    /// The public key certificate exists but could not be read.
    #[error("certificate unreadable: {}: {reason}", .path.display())]
    CertificateUnreadable {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO failure
        reason: String,
    },

    /// The certificate is empty, malformed, or not an RSA key.
    #[error("invalid certificate: {0}")]
    CertificateInvalid(String),
}

impl CryptoError {
    /// Create a new Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new CertificateInvalid error.
    pub fn certificate_invalid(msg: impl Into<String>) -> Self {
        Self::CertificateInvalid(msg.into())
    }
}
