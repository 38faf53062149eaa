//! Pure state transition function

use super::{Effect, Event, LoopContext, LoopState, PendingCall};
use crate::error::InquiryError;
use crate::llm::LlmResponse;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: LoopState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: LoopState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn with_prepended(mut self, effect: Effect) -> Self {
        self.effects.insert(0, effect);
        self
    }

    fn failed(error: impl Into<InquiryError>) -> Self {
        Self::new(LoopState::Failed {
            error: error.into(),
        })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs. All I/O is
/// described by the returned effects.
pub fn transition(
    state: &LoopState,
    context: &LoopContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Interruption, checked before every model request
        // ============================================================
        (LoopState::AwaitingModel { .. }, Event::DeadlineElapsed) => {
            Ok(TransitionResult::failed(InquiryError::DeadlineExceeded))
        }

        (LoopState::AwaitingModel { .. }, Event::Cancelled) => {
            Ok(TransitionResult::failed(InquiryError::Cancelled))
        }

        // ============================================================
        // Model Response Processing
        // ============================================================
        (LoopState::AwaitingModel { .. }, Event::ModelFailed { error }) => {
            Ok(TransitionResult::failed(error))
        }

        (LoopState::AwaitingModel { iteration }, Event::ModelReplied { response }) => {
            Ok(handle_model_reply(*iteration, context, &response))
        }

        // ============================================================
        // Function Dispatch
        // ============================================================
        (LoopState::DispatchingCall { call, iteration }, Event::CallCompleted { name, output }) => {
            if call.name != name {
                return Err(TransitionError::InvalidTransition(format!(
                    "result for `{name}` while `{}` is pending",
                    call.name
                )));
            }
            Ok(next_request(*iteration, context)
                .with_prepended(Effect::append_result(name, output)))
        }

        (LoopState::DispatchingCall { .. }, Event::CallFailed { error }) => {
            Ok(TransitionResult::failed(error))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {}",
            state.name(),
            event_name(&event)
        ))),
    }
}

fn handle_model_reply(
    iteration: u32,
    context: &LoopContext,
    response: &LlmResponse,
) -> TransitionResult {
    let Some(choice) = response.first_choice() else {
        return TransitionResult::failed(InquiryError::NoChoicesReturned);
    };

    if let Some(call) = choice.requested_call() {
        return match PendingCall::parse(call) {
            Ok(pending) => TransitionResult::new(LoopState::DispatchingCall {
                call: pending.clone(),
                iteration,
            })
            .with_effect(Effect::append_call(call.clone()))
            .with_effect(Effect::dispatch(pending)),
            Err(reason) => TransitionResult::failed(InquiryError::ArgumentParse {
                function: call.name.clone(),
                reason,
            }),
        };
    }

    if choice.content.is_empty() {
        // Neither an answer nor a call: ask again
        return next_request(iteration, context);
    }

    TransitionResult::new(LoopState::Done {
        answer: choice.content.clone(),
    })
    .with_effect(Effect::append_answer(choice.content.clone()))
}

/// Either schedule another model request or stop at the iteration cap
fn next_request(iteration: u32, context: &LoopContext) -> TransitionResult {
    match context.max_iterations {
        Some(limit) if iteration >= limit => {
            TransitionResult::failed(InquiryError::IterationLimitReached { limit })
        }
        _ => TransitionResult::new(LoopState::AwaitingModel {
            iteration: iteration.saturating_add(1),
        })
        .with_effect(Effect::RequestModel),
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::ModelReplied { .. } => "ModelReplied",
        Event::ModelFailed { .. } => "ModelFailed",
        Event::DeadlineElapsed => "DeadlineElapsed",
        Event::Cancelled => "Cancelled",
        Event::CallCompleted { .. } => "CallCompleted",
        Event::CallFailed { .. } => "CallFailed",
    }
}
