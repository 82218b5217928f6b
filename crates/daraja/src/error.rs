//! Error types for the Daraja client.

use std::path::PathBuf;

use daraja_crypto::CryptoError;
use thiserror::Error;

/// Result type for Daraja operations.
pub type DarajaResult<T> = Result<T, DarajaError>;

/// Errors returned by every public Daraja operation.
#[derive(Debug, Error)]
pub enum DarajaError {
    /// A required configuration or account field is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The environment's public key certificate does not exist.
    #[error("certificate not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    /// The certificate exists but could not be read.
    #[error("certificate unreadable: {}: {reason}", .path.display())]
    CertificateUnreadable {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO failure
        reason: String,
    },

    /// The certificate is empty or malformed.
    #[error("invalid certificate: {0}")]
    CertificateInvalid(String),

    /// The HTTP exchange with the gateway failed.
    #[error("gateway transport error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    RemoteTransport {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Description of the failure
        message: String,
    },

    /// The gateway's response could not be decoded or lacks an expected field.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),

    /// A callback payload lacks an expected container.
    #[error("unexpected callback shape: {0}")]
    CallbackShape(String),
}

impl DarajaError {
    /// Create a new Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a transport error without an HTTP status.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::RemoteTransport {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a transport error for a non-success HTTP status.
    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::RemoteTransport {
            status: Some(status),
            message: msg.into(),
        }
    }

    /// Create a new MalformedResponse error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a new CallbackShape error.
    pub fn callback_shape(msg: impl Into<String>) -> Self {
        Self::CallbackShape(msg.into())
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Configuration(_) => "Set the missing field in the Daraja configuration",
            Self::CertificateNotFound(_) => {
                "Download the gateway certificate and set cert.file or cert.path"
            }
            Self::CertificateUnreadable { .. } => "Check the certificate file permissions",
            Self::CertificateInvalid(_) => {
                "Replace the certificate with the PEM/DER file published by the gateway"
            }
            Self::RemoteTransport { .. } => "Check connectivity to the gateway and retry",
            Self::MalformedResponse(_) => "Inspect the gateway response; the API may have changed",
            Self::CallbackShape(_) => "Confirm the callback was posted by the gateway",
        }
    }

    /// Returns true if the call may succeed if the caller retries it.
    ///
    /// The client itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RemoteTransport { status: None, .. } => true,
            Self::RemoteTransport {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<CryptoError> for DarajaError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Configuration(msg) => Self::Configuration(msg),
            CryptoError::CertificateNotFound(path) => Self::CertificateNotFound(path),
            CryptoError::CertificateUnreadable { path, reason } => {
                Self::CertificateUnreadable { path, reason }
            }
            CryptoError::CertificateInvalid(msg) => Self::CertificateInvalid(msg),
        }
    }
}

impl From<reqwest::Error> for DarajaError {
    fn from(e: reqwest::Error) -> Self {
        Self::RemoteTransport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for DarajaError {
    fn from(e: toml::de::Error) -> Self {
        Self::Configuration(format!("invalid TOML: {}", e))
    }
}
