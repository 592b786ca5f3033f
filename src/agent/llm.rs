//! LLM completion seam.
//!
//! [`ChatModel`] performs one model turn. [`GenaiChat`] is the production
//! implementation: it streams through the genai multi-provider client,
//! forwards text chunks as [`RunEvent::Text`] and returns what the stream
//! captured. Provider API keys are read by genai from the environment
//! (validated at config load).

use async_trait::async_trait;
use futures::StreamExt;
use genai::Client;
use genai::chat::{ChatOptions, ChatRequest, ChatStreamEvent, ToolCall};
use tokio::sync::mpsc::UnboundedSender;

use super::agent_loop::RunEvent;
use super::types::ModelSpec;
use crate::error::AgentError;

/// What a single model turn produced.
#[derive(Debug, Default)]
pub struct Completion {
    /// Assistant text, if any.
    pub text: Option<String>,
    /// Tool calls requested by the model. Empty means the turn is final.
    pub tool_calls: Vec<ToolCall>,
}

/// One model turn for a given model binding.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        model: &ModelSpec,
        request: ChatRequest,
        events: Option<&UnboundedSender<RunEvent>>,
    ) -> Result<Completion, AgentError>;
}

/// genai-backed [`ChatModel`].
pub struct GenaiChat {
    client: Client,
}

impl GenaiChat {
    pub fn new() -> Self {
        Self {
            client: Client::default(),
        }
    }
}

impl Default for GenaiChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for GenaiChat {
    async fn complete(
        &self,
        model: &ModelSpec,
        request: ChatRequest,
        events: Option<&UnboundedSender<RunEvent>>,
    ) -> Result<Completion, AgentError> {
        let options = ChatOptions::default()
            .with_capture_content(true)
            .with_capture_tool_calls(true)
            .with_temperature(model.temperature)
            .with_max_tokens(model.max_tokens);

        let stream_res = self
            .client
            .exec_chat_stream(&model.qualified_name(), request, Some(&options))
            .await
            .map_err(|e| AgentError::LlmError(format!("{}: {e}", model.qualified_name())))?;

        let mut stream = stream_res.stream;
        let mut completion = Completion::default();

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    if let Some(tx) = events {
                        let _ = tx.send(RunEvent::Text(chunk.content));
                    }
                }
                Ok(ChatStreamEvent::End(end)) => {
                    if let Some(text) = end.captured_first_text() {
                        completion.text = Some(text.to_string());
                    }
                    if let Some(calls) = end.captured_tool_calls() {
                        completion.tool_calls = calls.into_iter().cloned().collect();
                    }
                }
                Ok(_) => {
                    // Start, ReasoningChunk, ToolCallChunk -- ignore.
                }
                Err(e) => {
                    // Continue -- the End event may still arrive.
                    tracing::warn!(model = %model.qualified_name(), "Stream error: {e}");
                }
            }
        }

        Ok(completion)
    }
}
