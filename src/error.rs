//! Error kinds surfaced to callers of `Inquiry::answer`

use crate::functions::DispatchError;
use crate::llm::LlmError;
use crate::schema::SchemaError;
use crate::state_machine::TransitionError;
use thiserror::Error;

/// Flat classification of every failure, for callers that branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedInputKind,
    UnknownPrimitiveType,
    DeadlineExceeded,
    Cancelled,
    UpstreamError,
    NoChoicesReturned,
    ArgumentParseError,
    UnknownFunction,
    ArityMismatch,
    ArgumentCoercionError,
    IterationLimitReached,
    InvalidTransition,
}

/// Why an `answer` call failed. Every variant is terminal for that call.
#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("inquiry cancelled")]
    Cancelled,

    #[error("upstream LLM request failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("no choices returned")]
    NoChoicesReturned,

    #[error("could not parse arguments for `{function}`: {reason}")]
    ArgumentParse { function: String, reason: String },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("gave up after {limit} model requests without a final answer")]
    IterationLimitReached { limit: u32 },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl InquiryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InquiryError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            InquiryError::Cancelled => ErrorKind::Cancelled,
            InquiryError::Upstream(_) => ErrorKind::UpstreamError,
            InquiryError::NoChoicesReturned => ErrorKind::NoChoicesReturned,
            InquiryError::ArgumentParse { .. } => ErrorKind::ArgumentParseError,
            InquiryError::Dispatch(e) => e.kind(),
            InquiryError::IterationLimitReached { .. } => ErrorKind::IterationLimitReached,
            InquiryError::Transition(_) => ErrorKind::InvalidTransition,
        }
    }
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            DispatchError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            DispatchError::ArgumentCoercion { .. } => ErrorKind::ArgumentCoercionError,
        }
    }
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::UnsupportedInputKind { .. } => ErrorKind::UnsupportedInputKind,
            SchemaError::UnknownPrimitiveType { .. } => ErrorKind::UnknownPrimitiveType,
        }
    }
}
