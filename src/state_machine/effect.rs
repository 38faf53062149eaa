//! Effects produced by state transitions

use crate::llm::{FunctionCall, Message};
use crate::state_machine::state::PendingCall;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the conversation and function menu to the model
    RequestModel,

    /// Invoke a host function
    Dispatch { call: PendingCall },

    /// Append a message to the conversation
    Append { message: Message },
}

impl Effect {
    pub fn append_call(call: FunctionCall) -> Self {
        Effect::Append {
            message: Message::function_call(call),
        }
    }

    pub fn append_result(name: impl Into<String>, output: impl Into<String>) -> Self {
        Effect::Append {
            message: Message::function_result(name, output),
        }
    }

    pub fn append_answer(answer: impl Into<String>) -> Self {
        Effect::Append {
            message: Message::assistant(answer),
        }
    }

    pub fn dispatch(call: PendingCall) -> Self {
        Effect::Dispatch { call }
    }
}
