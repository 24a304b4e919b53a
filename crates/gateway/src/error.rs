//! Error types for the gateway crate

use pushgate_core::WireError;
use thiserror::Error;

/// Errors surfaced by registration, submission and feedback
#[derive(Error, Debug)]
pub enum PushError {
    /// PEM path missing or unreadable, or an identity not ready for use
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Certificate or key could not be parsed, or the passphrase is wrong
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Unknown application: {0}")]
    UnknownApplication(String),

    /// Connect, write or read failure
    #[error("Network error: {0}")]
    Network(String),

    /// TLS handshake failure
    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Wire error: {0}")]
    Wire(#[from] WireError),
}

/// Error class, for callers that only branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Crypto,
    UnknownApplication,
    Network,
    Tls,
    Wire,
}

impl PushError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PushError::Configuration(_) => ErrorKind::Configuration,
            PushError::Crypto(_) => ErrorKind::Crypto,
            PushError::UnknownApplication(_) => ErrorKind::UnknownApplication,
            PushError::Network(_) => ErrorKind::Network,
            PushError::Tls(_) => ErrorKind::Tls,
            PushError::Wire(_) => ErrorKind::Wire,
        }
    }
}

impl From<openssl::error::ErrorStack> for PushError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        PushError::Crypto(e.to_string())
    }
}

pub type PushResult<T> = std::result::Result<T, PushError>;
