//! Events that drive the loop

use crate::functions::DispatchError;
use crate::llm::{LlmError, LlmResponse};

/// Events that trigger state transitions
#[derive(Debug)]
pub enum Event {
    // Model events
    ModelReplied {
        response: LlmResponse,
    },
    ModelFailed {
        error: LlmError,
    },

    // Caller context, checked before each model request
    DeadlineElapsed,
    Cancelled,

    // Dispatch events
    CallCompleted {
        name: String,
        output: String,
    },
    CallFailed {
        error: DispatchError,
    },
}
