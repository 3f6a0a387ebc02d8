//! Request outcomes and transport error definitions

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Failures below the HTTP status level
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Short label used for metrics and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Connect(_) => "connect",
            TransportError::Decode(_) => "decode",
            TransportError::Other(_) => "other",
        }
    }
}

/// Result of issuing one API request
///
/// Every behavior matches on all three arms, so a failure path cannot be
/// silently skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx response with its decoded JSON body
    Success { status: u16, body: Value },
    /// Non-2xx response
    Failure { status: u16 },
    /// No usable response
    Error(TransportError),
}

impl Outcome {
    pub fn ok(body: Value) -> Self {
        Outcome::Success { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Outcome::Failure { status }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}
