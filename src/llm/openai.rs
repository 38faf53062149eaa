//! `OpenAI`-compatible chat completions provider
//!
//! Uses the `functions` / `function_call` protocol: function results travel
//! back as messages with role `function` and the called function's name.

use super::types::{
    Choice, FinishReason, FunctionCall, LlmRequest, LlmResponse, Message, Usage,
};
use super::{LlmConfig, LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAIService {
    /// # Errors
    ///
    /// Fails when no API key is configured or the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::auth("OPENAI_API_KEY is not set"))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let functions = if request.functions.is_empty() {
            None
        } else {
            Some(
                request
                    .functions
                    .iter()
                    .map(|f| OpenAIFunction {
                        name: f.name.clone(),
                        description: f.description.clone(),
                        parameters: f.parameters.clone(),
                    })
                    .collect(),
            )
        };

        OpenAIRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(translate_message).collect(),
            functions,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
            max_tokens: request.sampling.max_tokens,
        }
    }

    async fn complete_chat_api(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                let what = if e.is_timeout() {
                    "Request timeout"
                } else if e.is_connect() {
                    "Connection failed"
                } else {
                    "Request failed"
                };
                LlmError::transport(format!("{what}: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &error_detail(body)));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(normalize_response(openai_response))
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.complete_chat_api(request).await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

pub(crate) fn translate_message(msg: &Message) -> OpenAIMessage {
    let function_call = msg.function_call.as_ref().map(|c| OpenAIFunctionCall {
        name: c.name.clone(),
        arguments: c.arguments.clone(),
    });

    // Call turns carry no text; the API expects `content: null` there
    let content = if function_call.is_some() && msg.content.is_empty() {
        None
    } else {
        Some(msg.content.clone())
    };

    OpenAIMessage {
        role: msg.role.as_str().to_string(),
        content,
        name: msg.name.clone(),
        function_call,
    }
}

pub(crate) fn normalize_response(resp: OpenAIResponse) -> LlmResponse {
    let choices = resp
        .choices
        .into_iter()
        .map(|choice| {
            let function_call = choice
                .message
                .function_call
                .filter(|c| !c.name.is_empty())
                .map(|c| FunctionCall {
                    name: c.name,
                    arguments: c.arguments,
                });

            Choice {
                finish_reason: choice
                    .finish_reason
                    .as_deref()
                    .map_or(FinishReason::Stop, FinishReason::from),
                content: choice.message.content.unwrap_or_default(),
                function_call,
            }
        })
        .collect();

    let usage = resp.usage.unwrap_or_default();
    LlmResponse {
        choices,
        usage: Usage {
            input_tokens: u64::from(usage.prompt_tokens),
            output_tokens: u64::from(usage.completion_tokens),
        },
    }
}

/// The provider's `{"error": {"message": ..}}` text, or the raw body
fn error_detail(body: String) -> String {
    serde_json::from_str::<OpenAIErrorResponse>(&body).map_or(body, |e| e.error.message)
}

// OpenAI API types

#[derive(Debug, Serialize)]
pub(crate) struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<OpenAIFunction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAIMessage {
    pub(crate) role: String,
    // Serialized even when null: assistant call turns require `content: null`
    pub(crate) content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) function_call: Option<OpenAIFunctionCall>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAIFunctionCall {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIResponse {
    pub(crate) choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub(crate) usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIChoice {
    pub(crate) message: OpenAIMessage,
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[allow(clippy::struct_field_names)]
pub(crate) struct OpenAIUsage {
    pub(crate) prompt_tokens: u32,
    pub(crate) completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
