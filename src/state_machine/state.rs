//! Loop state types

use super::Effect;
use crate::error::InquiryError;
use crate::llm::FunctionCall;
use serde_json::Value;

// ============================================================================
// Pending Call - a parsed function-call directive
// ============================================================================

/// A function call requested by the model, with arguments in positional order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub name: String,
    pub arguments: Vec<String>,
}

impl PendingCall {
    /// Parse the model's directive.
    ///
    /// The argument payload must be a JSON object whose keys are positional
    /// indices running from "0" without gaps. String values are used as-is;
    /// numbers, booleans, arrays and objects are passed on as their JSON text.
    /// An empty payload means no arguments.
    ///
    /// # Errors
    ///
    /// A human-readable reason when the payload does not have that shape.
    pub fn parse(call: &FunctionCall) -> Result<Self, String> {
        let raw = call.arguments.trim();
        let object: serde_json::Map<String, Value> = if raw.is_empty() {
            serde_json::Map::new()
        } else {
            serde_json::from_str(raw).map_err(|e| format!("not a JSON object: {e}"))?
        };

        let mut indexed = object
            .into_iter()
            .map(|(key, value)| {
                let index = key
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("key `{key}` is not a positional index"))?;
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other @ (Value::Array(_) | Value::Object(_)) => other.to_string(),
                    Value::Null => return Err(format!("argument `{key}` is null")),
                };
                Ok((index, text))
            })
            .collect::<Result<Vec<_>, String>>()?;

        indexed.sort_by_key(|(index, _)| *index);
        for (expected, (index, _)) in indexed.iter().enumerate() {
            if *index != expected {
                return Err(format!(
                    "argument indices must run from 0 without gaps, found {index} where {expected} was expected"
                ));
            }
        }

        Ok(Self {
            name: call.name.clone(),
            arguments: indexed.into_iter().map(|(_, text)| text).collect(),
        })
    }
}

// ============================================================================
// Loop State
// ============================================================================

/// Orchestration loop state
#[derive(Debug)]
pub enum LoopState {
    /// A model request is due. `iteration` counts model requests, from 1.
    AwaitingModel { iteration: u32 },

    /// The model asked for a function call; waiting for its result
    DispatchingCall { call: PendingCall, iteration: u32 },

    /// Final answer produced
    Done { answer: String },

    /// The inquiry failed; no further transitions
    Failed { error: InquiryError },
}

impl LoopState {
    pub fn initial() -> Self {
        LoopState::AwaitingModel { iteration: 1 }
    }

    /// Effects that start a fresh loop
    pub fn initial_effects() -> Vec<Effect> {
        vec![Effect::RequestModel]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done { .. } | LoopState::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoopState::AwaitingModel { .. } => "awaiting_model",
            LoopState::DispatchingCall { .. } => "dispatching_call",
            LoopState::Done { .. } => "done",
            LoopState::Failed { .. } => "failed",
        }
    }
}

/// Immutable settings for one loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopContext {
    /// Maximum number of model requests; `None` loops until an answer,
    /// an error or the deadline.
    pub max_iterations: Option<u32>,
}
