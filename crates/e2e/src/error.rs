//! Error types for the Playwright driver

use std::fmt;
use std::time::Duration;

use screenplay::driver::DriverError;
use serde::Deserialize;
use thiserror::Error;

/// Failure category reported by the bridge script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    Timeout,
    NotFound,
    Navigation,
    Closed,
    Detached,
    #[serde(other)]
    Other,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteErrorKind::Timeout => "timeout",
            RemoteErrorKind::NotFound => "not found",
            RemoteErrorKind::Navigation => "navigation",
            RemoteErrorKind::Closed => "closed",
            RemoteErrorKind::Detached => "detached",
            RemoteErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("node not found. Install Node.js and make sure it is on PATH")]
    NodeNotFound,

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Unsupported browser: {0} (expected chromium, firefox or webkit)")]
    UnsupportedBrowser(String),

    #[error("Bridge failed to start: {0}")]
    BridgeStartup(String),

    #[error("Bridge exited before replying")]
    BridgeClosed,

    #[error("Bridge did not answer {op} within {}ms", .after.as_millis())]
    Timeout { op: String, after: Duration },

    #[error("Playwright error ({kind}): {message}")]
    Remote { kind: RemoteErrorKind, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

impl From<E2eError> for DriverError {
    fn from(error: E2eError) -> Self {
        match error {
            E2eError::Timeout { op, after } => DriverError::Timeout {
                what: format!("bridge reply to {}", op),
                timeout: after,
            },
            E2eError::BridgeClosed => DriverError::Closed("playwright bridge".to_string()),
            E2eError::Remote {
                kind: RemoteErrorKind::Closed,
                message,
            } => DriverError::Closed(message),
            other => DriverError::Protocol(other.to_string()),
        }
    }
}
