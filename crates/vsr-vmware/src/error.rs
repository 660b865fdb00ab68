//! Error types for the VMware reporting crate.

use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmwareErrorKind {
    /// Endpoint unreachable or TLS handshake failed
    ConnectionError,
    /// Login rejected or no session id returned
    AuthenticationError,
    /// Resource not found (404)
    NotFound,
    /// HTTP / API error with status code
    ApiError(u16),
    /// Timeout
    Timeout,
    /// Permission denied (403)
    AccessDenied,
    /// JSON parse / deserialization error
    ParseError,
    /// vim25 method fault, carrying the fault type name (e.g. "InvalidLogin")
    Fault(String),
    /// Report cancelled by Ctrl-C
    Interrupted,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone)]
pub struct VmwareError {
    pub kind: VmwareErrorKind,
    pub message: String,
}

impl VmwareError {
    pub fn new(kind: VmwareErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::AuthenticationError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::NotFound, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ApiError(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ParseError, msg)
    }

    pub fn fault(fault_type: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::Fault(fault_type.into()), msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::Timeout, msg)
    }

    pub fn interrupted() -> Self {
        Self::new(VmwareErrorKind::Interrupted, "Interrupted")
    }

    /// Whether this error is a vim25 method fault raised by the server.
    pub fn is_fault(&self) -> bool {
        matches!(self.kind, VmwareErrorKind::Fault(_))
    }

    /// Whether this error means the session could never be established.
    pub fn is_auth(&self) -> bool {
        self.kind == VmwareErrorKind::AuthenticationError
    }
}

impl fmt::Display for VmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            VmwareErrorKind::Fault(t) => write!(f, "[{t}] {}", self.message),
            kind => write!(f, "[{kind:?}] {}", self.message),
        }
    }
}

impl std::error::Error for VmwareError {}

impl From<reqwest::Error> for VmwareError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(VmwareErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for VmwareError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

impl From<url::ParseError> for VmwareError {
    fn from(e: url::ParseError) -> Self {
        Self::connection(format!("Invalid endpoint URL: {e}"))
    }
}

/// Convenience alias.
pub type VmwareResult<T> = Result<T, VmwareError>;
