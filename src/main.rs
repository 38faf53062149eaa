//! Weather demo
//!
//! Registers the sample lookup functions and asks the model about the
//! weather in Berlin.

use inquiry::llm::LlmService;
use inquiry::tools::register_sample_tools;
use inquiry::{
    AnswerContext, FunctionRegistry, Inquiry, InquiryConfig, LlmConfig, LoggingService,
    OpenAIService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const QUESTION: &str = "What is the weather like in Berlin right now?";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inquiry=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let llm_config = LlmConfig::from_env();
    let config = InquiryConfig {
        sampling: llm_config.sampling,
        ..InquiryConfig::from_env()
    };

    let service = OpenAIService::new(&llm_config).inspect_err(|e| {
        tracing::error!(error = %e, "Failed to create LLM client");
    })?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(service)));
    tracing::info!(model = %llm.model_id(), base_url = %llm_config.base_url, "LLM configured");

    let mut registry = FunctionRegistry::new();
    register_sample_tools(&mut registry)?;

    let inquiry = Inquiry::new(llm, Arc::new(registry)).with_config(config);
    tracing::info!(
        functions = ?inquiry.functions().names(),
        max_iterations = ?inquiry.config().max_iterations,
        deadline_secs = ?inquiry.config().deadline.map(|d| d.as_secs()),
        "Inquiry ready"
    );

    // Ctrl-C stops the loop before its next model request
    let ctx = AnswerContext::new();
    let cancel = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT - cancelling inquiry");
            cancel.cancel();
        }
    });

    match inquiry.answer(&ctx, QUESTION).await {
        Ok(answer) => {
            println!("{answer}");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "Failed to answer question");
            Err(e.into())
        }
    }
}
