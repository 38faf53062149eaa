//! Common types for LLM interactions

use serde::{Deserialize, Serialize};

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub functions: Vec<FunctionDefinition>,
    pub sampling: Sampling,
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            top_p: Some(1.0),
            max_tokens: None,
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Result of a host function call
    Function,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Function => "function",
        }
    }
}

/// A function-call directive from the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it
    pub arguments: String,
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Called function name; only set on `Function` messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Only set on assistant turns that requested a call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            name: None,
            function_call: Some(call),
        }
    }

    pub fn function_result(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Function,
            content: content.into(),
            name: Some(name.into()),
            function_call: None,
        }
    }

    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            function_call: None,
        }
    }

    pub fn is_function_call(&self) -> bool {
        self.function_call.is_some()
    }

    pub fn is_function_result(&self) -> bool {
        self.role == MessageRole::Function
    }
}

/// Function definition offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Why the model stopped generating a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    FunctionCall,
    ContentFilter,
    Other(String),
}

impl From<&str> for FinishReason {
    fn from(s: &str) -> Self {
        match s {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "function_call" => FinishReason::FunctionCall,
            "content_filter" => FinishReason::ContentFilter,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// One candidate response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub finish_reason: FinishReason,
    pub content: String,
    pub function_call: Option<FunctionCall>,
}

impl Choice {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            finish_reason: FinishReason::Stop,
            content: content.into(),
            function_call: None,
        }
    }

    pub fn call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            finish_reason: FinishReason::FunctionCall,
            content: String::new(),
            function_call: Some(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }

    /// The function call this candidate asks for, if any.
    ///
    /// A directive counts even when the provider reports a different finish
    /// reason alongside it.
    pub fn requested_call(&self) -> Option<&FunctionCall> {
        self.function_call.as_ref()
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl LlmResponse {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self {
            choices,
            usage: Usage::default(),
        }
    }

    /// The top candidate
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_parsing() {
        assert_eq!(FinishReason::from("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from("function_call"), FinishReason::FunctionCall);
        assert_eq!(
            FinishReason::from("tool_calls"),
            FinishReason::Other("tool_calls".to_string())
        );
    }

    #[test]
    fn test_message_constructors() {
        let result = Message::function_result("lookup", "52.5");
        assert!(result.is_function_result());
        assert_eq!(result.name.as_deref(), Some("lookup"));

        let call = Message::function_call(FunctionCall {
            name: "lookup".to_string(),
            arguments: "{}".to_string(),
        });
        assert_eq!(call.role, MessageRole::Assistant);
        assert!(call.is_function_call());
        assert!(!Message::assistant("done").is_function_call());
    }

    #[test]
    fn test_choice_requested_call() {
        assert!(Choice::text("hi").requested_call().is_none());
        let choice = Choice::call("f", r#"{"0":"a"}"#);
        assert_eq!(choice.requested_call().unwrap().name, "f");
    }
}
