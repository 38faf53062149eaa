//! Inquiry - function-calling orchestration for LLM chat endpoints
//!
//! Register plain Rust functions, ask a question, and let the model call
//! those functions until it can produce a final answer.

pub mod conversation;
pub mod error;
pub mod functions;
pub mod inquiry;
pub mod llm;
pub mod schema;
pub mod state_machine;
pub mod tools;

pub use conversation::Conversation;
pub use error::{ErrorKind, InquiryError};
pub use functions::{DispatchError, FunctionRegistry, HostFunction};
pub use inquiry::{AnswerContext, Inquiry, InquiryConfig, Session, DEFAULT_SYSTEM_PROMPT};
pub use llm::{LlmConfig, LlmService, LoggingService, OpenAIService};
pub use schema::{FunctionDescriptor, PrimitiveType, SchemaError};
