//! Question answering over an LLM with host function calls
//!
//! `Inquiry` ties the pieces together: it seeds a fresh conversation per
//! question, then runs the pure state machine, executing each effect (model
//! request, host dispatch, conversation append) and feeding the resulting
//! events back in until the loop reaches `Done` or `Failed`.

#[cfg(test)]
mod testing;

use crate::conversation::Conversation;
use crate::error::InquiryError;
use crate::functions::FunctionRegistry;
use crate::llm::{FunctionDefinition, LlmRequest, LlmService, Sampling};
use crate::state_machine::{
    transition, Effect, Event, LoopContext, LoopState, TransitionError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SYSTEM_PROMPT: &str = "Only use the functions and parameters you have been provided with. Argument responses should take the strict form of a map of numeric keys to string values.";
pub const DEFAULT_MAX_ITERATIONS: u32 = 25;

// ============================================================================
// Configuration
// ============================================================================

/// Per-inquiry settings
#[derive(Debug, Clone, PartialEq)]
pub struct InquiryConfig {
    pub system_prompt: String,
    /// Cap on model requests per question; `None` disables the cap
    pub max_iterations: Option<u32>,
    pub sampling: Sampling,
    /// Overall time budget per question, applied on top of the caller's
    /// own deadline
    pub deadline: Option<Duration>,
}

impl Default for InquiryConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            sampling: Sampling::default(),
            deadline: None,
        }
    }
}

impl InquiryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `INQUIRY_MAX_ITERATIONS=0` disables the cap. Unset or unparsable
    /// values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_iterations = match lookup("INQUIRY_MAX_ITERATIONS")
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => defaults.max_iterations,
        };

        Self {
            system_prompt: lookup("INQUIRY_SYSTEM_PROMPT")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.system_prompt),
            max_iterations,
            sampling: defaults.sampling,
            deadline: lookup("INQUIRY_DEADLINE_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs),
        }
    }
}

// ============================================================================
// Caller Context
// ============================================================================

/// Deadline and cancellation supplied by the caller of `answer`.
///
/// Both are checked before every model request. A request already in flight
/// is bounded by the HTTP client's own timeout.
#[derive(Debug, Clone, Default)]
pub struct AnswerContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl AnswerContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the loop before its next model request once cancelled
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Keep the earlier of the current deadline and `now + timeout`
    fn bounded_by(&self, timeout: Option<Duration>) -> Self {
        let budget = timeout.and_then(|t| Instant::now().checked_add(t));
        let deadline = match (self.deadline, budget) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            deadline,
            cancel: self.cancel.clone(),
        }
    }

    /// The event that should stop the loop, if any. A deadline equal to now
    /// has elapsed.
    fn interruption(&self) -> Option<Event> {
        if self.cancel.is_cancelled() {
            return Some(Event::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Event::DeadlineElapsed),
            _ => None,
        }
    }
}

// ============================================================================
// Inquiry
// ============================================================================

/// Answers questions with an LLM that may call registered host functions
pub struct Inquiry<L> {
    llm: L,
    functions: Arc<FunctionRegistry>,
    config: InquiryConfig,
}

impl<L: LlmService> Inquiry<L> {
    pub fn new(llm: L, functions: Arc<FunctionRegistry>) -> Self {
        Self {
            llm,
            functions,
            config: InquiryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: InquiryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &InquiryConfig {
        &self.config
    }

    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// Start a session for one question without running it
    pub fn session(&self, question: impl Into<String>) -> Session<'_, L> {
        Session {
            inquiry: self,
            conversation: Conversation::seeded(self.config.system_prompt.clone(), question),
            definitions: self.functions.definitions(),
            context: LoopContext {
                max_iterations: self.config.max_iterations,
            },
            finished: false,
        }
    }

    /// Answer one question.
    ///
    /// # Errors
    ///
    /// Any `InquiryError`; each is terminal for this call and leaves the
    /// `Inquiry` usable for further questions.
    pub async fn answer(
        &self,
        ctx: &AnswerContext,
        question: impl Into<String>,
    ) -> Result<String, InquiryError> {
        self.session(question).run(ctx).await
    }
}

// ============================================================================
// Session
// ============================================================================

/// One question's conversation and loop run
pub struct Session<'a, L> {
    inquiry: &'a Inquiry<L>,
    conversation: Conversation,
    definitions: Vec<FunctionDefinition>,
    context: LoopContext,
    finished: bool,
}

impl<L: LlmService> Session<'_, L> {
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run the loop to a final answer or error. A session runs once.
    ///
    /// # Errors
    ///
    /// The error that moved the loop to `Failed`, or a transition error if
    /// the session was already run.
    pub async fn run(&mut self, ctx: &AnswerContext) -> Result<String, InquiryError> {
        if self.finished {
            return Err(TransitionError::InvalidTransition(
                "session has already run".to_string(),
            )
            .into());
        }
        self.finished = true;

        let ctx = ctx.bounded_by(self.inquiry.config.deadline);
        tracing::info!(
            functions = self.definitions.len(),
            max_iterations = ?self.context.max_iterations,
            "Answering question"
        );

        let mut state = LoopState::initial();
        let mut events_to_process = Vec::new();
        for effect in LoopState::initial_effects() {
            if let Some(event) = self.execute_effect(effect, &ctx).await {
                events_to_process.push(event);
            }
        }

        while let Some(event) = events_to_process.pop() {
            let result = transition(&state, &self.context, event)?;
            tracing::debug!(
                from = state.name(),
                to = result.new_state.name(),
                effects = result.effects.len(),
                "Loop transition"
            );
            state = result.new_state;

            for effect in result.effects {
                if let Some(event) = self.execute_effect(effect, &ctx).await {
                    events_to_process.push(event);
                }
            }
        }

        match state {
            LoopState::Done { answer } => {
                tracing::info!(messages = self.conversation.messages().len(), "Question answered");
                Ok(answer)
            }
            LoopState::Failed { error } => {
                tracing::warn!(error = %error, kind = ?error.kind(), "Inquiry failed");
                Err(error)
            }
            other => Err(TransitionError::InvalidTransition(format!(
                "loop stopped in non-terminal state {}",
                other.name()
            ))
            .into()),
        }
    }

    async fn execute_effect(&mut self, effect: Effect, ctx: &AnswerContext) -> Option<Event> {
        match effect {
            Effect::Append { message } => {
                self.conversation.push(message);
                None
            }

            Effect::RequestModel => {
                if let Some(interruption) = ctx.interruption() {
                    return Some(interruption);
                }

                let request = LlmRequest {
                    messages: self.conversation.messages().to_vec(),
                    functions: self.definitions.clone(),
                    sampling: self.inquiry.config.sampling,
                };
                tracing::debug!(messages = request.messages.len(), "Requesting model");

                Some(match self.inquiry.llm.complete(&request).await {
                    Ok(response) => Event::ModelReplied { response },
                    Err(error) => Event::ModelFailed { error },
                })
            }

            Effect::Dispatch { call } => {
                tracing::debug!(
                    function = %call.name,
                    arguments = call.arguments.len(),
                    "Dispatching host function"
                );
                Some(
                    match self.inquiry.functions.invoke(&call.name, &call.arguments) {
                        Ok(output) => Event::CallCompleted {
                            name: call.name,
                            output,
                        },
                        Err(error) => {
                            tracing::warn!(function = %call.name, error = %error, "Dispatch failed");
                            Event::CallFailed { error }
                        }
                    },
                )
            }
        }
    }
}
