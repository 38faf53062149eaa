//! Failures at the chat completions boundary

use std::fmt;
use thiserror::Error;

/// Where an upstream request broke down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// No usable credentials, or the endpoint rejected them (401, 403)
    Auth,
    /// The request got no HTTP response: connect failure, timeout, reset
    Transport,
    /// The endpoint answered with any other non-success status
    Status,
    /// A success response whose body is not a chat completion
    Decode,
}

impl LlmErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmErrorKind::Auth => "auth",
            LlmErrorKind::Transport => "transport",
            LlmErrorKind::Status => "status",
            LlmErrorKind::Decode => "decode",
        }
    }
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upstream failure. The loop surfaces it unchanged as `UpstreamError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// HTTP status, when the endpoint answered at all
    pub status: Option<u16>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Decode, message)
    }

    /// Error for a non-success HTTP response. `detail` is the provider's own
    /// error message, or the raw body when it has none.
    pub fn from_status(status: u16, detail: &str) -> Self {
        let kind = match status {
            401 | 403 => LlmErrorKind::Auth,
            _ => LlmErrorKind::Status,
        };
        Self {
            kind,
            message: format!("HTTP {status}: {detail}"),
            status: Some(status),
        }
    }
}
