//! Error types for the Zenzap API client.
//!
//! # Design
//! Neither type escapes a resource operation on `ZenzapClient`: both are
//! folded into an `ApiResponse` with status 0. They surface directly only
//! from the lower-level `build_*` methods and from `Transport::execute`.

use std::fmt;

use thiserror::Error;

/// Failure while building a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Category of a request that never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    HostNotFound,
    ConnectionFailed,
    Tls,
    Io,
    InvalidRequest,
    Other,
}

impl TransportErrorKind {
    /// Tag stored under `data["type"]` of a transport-failure response.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "Timeout",
            TransportErrorKind::HostNotFound => "HostNotFound",
            TransportErrorKind::ConnectionFailed => "ConnectionFailed",
            TransportErrorKind::Tls => "Tls",
            TransportErrorKind::Io => "Io",
            TransportErrorKind::InvalidRequest => "InvalidRequest",
            TransportErrorKind::Other => "Other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request never completed: DNS, connect, TLS, timeout or I/O failure.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ApiError> for TransportError {
    fn from(err: ApiError) -> Self {
        TransportError::new(TransportErrorKind::InvalidRequest, err.to_string())
    }
}
