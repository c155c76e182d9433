//! Error types for Printboard
//!
//! Each component has its own error so callers can tell a recoverable
//! failure (collection, transport) from one that must stop an operation
//! (derivation). `Error` wraps all of them for binaries and tests.

use thiserror::Error;

/// A single signal could not be acquired. Never fatal: the collector
/// substitutes a sentinel and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("capability unavailable: {0}")]
    Unavailable(&'static str),

    #[error("probe {probe} failed: {message}")]
    ProbeFailed { probe: &'static str, message: String },
}

impl CollectionError {
    pub fn probe_failed(probe: &'static str, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            probe,
            message: message.into(),
        }
    }
}

/// Identity derivation failed. The caller must not register anything.
#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

/// Registry backend failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend {backend} failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}

impl StoreError {
    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    /// Rejections caused by the input itself. These never trigger a
    /// backend degrade.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFingerprint(_))
    }
}

/// Network or HTTP failure between a client session and the server.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP error! status: {status}, details: {details}")]
    Status { status: u16, details: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
