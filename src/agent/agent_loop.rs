//! Tool-calling conversation loop shared by the orchestrator and sub-agents.
//!
//! Each turn asks the model for a completion. A turn without tool calls ends
//! the run with its text as the reply. Otherwise the tool-call message is
//! appended, every call is dispatched, each result is appended as a tool
//! response, and the loop continues, up to a fixed number of turns.

use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatRequest, Tool, ToolResponse};
use tokio::sync::mpsc::UnboundedSender;

use super::llm::ChatModel;
use super::truncate_chars;
use super::types::ModelSpec;
use crate::error::AgentError;

/// Progress notifications emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A streamed chunk of assistant text.
    Text(String),
    /// The model asked `agent` to call `tool`.
    ToolCallStarted {
        agent: String,
        tool: String,
        args_summary: String,
    },
    /// A tool call returned.
    ToolCallCompleted {
        agent: String,
        tool: String,
        result_summary: String,
    },
}

/// Routes tool calls to their implementation.
///
/// Always returns a `String` -- a success payload or an error description --
/// so the model can observe failures and react.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> String;
}

/// Static parameters of one agent run.
pub struct AgentRun<'a> {
    /// Agent name, used in events and logs.
    pub agent: &'a str,
    pub model: &'a ModelSpec,
    pub system_prompt: &'a str,
    pub tools: Vec<Tool>,
    pub max_iterations: usize,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Final assistant text. Empty when the model ended without text.
    pub reply: String,
    /// Full conversation after the run, excluding the system prompt.
    pub messages: Vec<ChatMessage>,
    /// Model turns taken.
    pub iterations: usize,
    /// Tool calls dispatched.
    pub tool_calls: usize,
}

/// Run the conversation loop until the model answers without tool calls.
///
/// `history` seeds the conversation (earlier turns plus the new user
/// message). Returns [`AgentError::IterationLimit`] if the model is still
/// calling tools after `max_iterations` turns.
pub async fn run_agent(
    chat: &dyn ChatModel,
    run: &AgentRun<'_>,
    history: Vec<ChatMessage>,
    dispatcher: &dyn ToolDispatcher,
    events: Option<&UnboundedSender<RunEvent>>,
) -> Result<RunOutcome, AgentError> {
    let send_event = |event: RunEvent| {
        if let Some(tx) = events {
            let _ = tx.send(event);
        }
    };

    let mut chat_req = ChatRequest::from_system(run.system_prompt);
    if !run.tools.is_empty() {
        chat_req = chat_req.with_tools(run.tools.clone());
    }
    for msg in history {
        chat_req = chat_req.append_message(msg);
    }

    let mut tool_call_count = 0;

    for turn in 1..=run.max_iterations {
        tracing::debug!(agent = run.agent, turn, "Requesting completion");
        let completion = chat.complete(run.model, chat_req.clone(), events).await?;

        if completion.tool_calls.is_empty() {
            let reply = completion.text.unwrap_or_default();
            if !reply.is_empty() {
                chat_req = chat_req.append_message(ChatMessage::assistant(reply.clone()));
            }
            tracing::debug!(
                agent = run.agent,
                turns = turn,
                tool_calls = tool_call_count,
                "Run finished"
            );
            return Ok(RunOutcome {
                reply,
                messages: chat_req.messages,
                iterations: turn,
                tool_calls: tool_call_count,
            });
        }

        // Append the assistant message with tool calls to the conversation.
        chat_req = chat_req.append_message(ChatMessage::from(completion.tool_calls.clone()));

        for call in &completion.tool_calls {
            let args_summary = serde_json::to_string(&call.fn_arguments)
                .unwrap_or_else(|_| "{}".to_string());
            tracing::info!(
                agent = run.agent,
                tool = %call.fn_name,
                args = truncate_chars(&args_summary, 100),
                "Tool call"
            );
            send_event(RunEvent::ToolCallStarted {
                agent: run.agent.to_string(),
                tool: call.fn_name.clone(),
                args_summary: truncate_chars(&args_summary, 100).to_string(),
            });

            tool_call_count += 1;
            let result = dispatcher
                .dispatch(&call.fn_name, call.fn_arguments.clone())
                .await;

            send_event(RunEvent::ToolCallCompleted {
                agent: run.agent.to_string(),
                tool: call.fn_name.clone(),
                result_summary: truncate_chars(&result, 200).to_string(),
            });

            chat_req = chat_req.append_message(ToolResponse::new(call.call_id.clone(), result));
        }
    }

    Err(AgentError::IterationLimit {
        agent: run.agent.to_string(),
        limit: run.max_iterations,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::llm::Completion;
    use crate::agent::types::Provider;
    use genai::chat::{ChatRole, ToolCall};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Chat model that replays a fixed script of completions.
    pub(crate) struct ScriptedModel {
        script: Mutex<VecDeque<Completion>>,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(script: Vec<Completion>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            _model: &ModelSpec,
            request: ChatRequest,
            _events: Option<&UnboundedSender<RunEvent>>,
        ) -> Result<Completion, AgentError> {
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::LlmError("script exhausted".to_string()))
        }
    }

    pub(crate) fn text(reply: &str) -> Completion {
        Completion {
            text: Some(reply.to_string()),
            tool_calls: Vec::new(),
        }
    }

    pub(crate) fn call(id: &str, name: &str, args: serde_json::Value) -> Completion {
        Completion {
            text: None,
            tool_calls: vec![ToolCall {
                call_id: id.to_string(),
                fn_name: name.to_string(),
                fn_arguments: args,
                thought_signatures: None,
            }],
        }
    }

    struct EchoDispatcher {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolDispatcher for EchoDispatcher {
        async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> String {
            self.seen.lock().unwrap().push(name.to_string());
            format!("{name} ran with {arguments}")
        }
    }

    fn model() -> ModelSpec {
        ModelSpec {
            provider: Provider::Ollama,
            model: "test-model".to_string(),
            temperature: 0.0,
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn returns_text_when_no_tools_are_called() {
        let chat = ScriptedModel::new(vec![text("Xin chào")]);
        let dispatcher = EchoDispatcher { seen: Mutex::new(Vec::new()) };
        let spec = model();
        let run = AgentRun {
            agent: "tester",
            model: &spec,
            system_prompt: "system",
            tools: Vec::new(),
            max_iterations: 3,
        };

        let outcome = run_agent(&chat, &run, vec![ChatMessage::user("hi")], &dispatcher, None)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "Xin chào");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(outcome.messages.len(), 2);
        assert!(dispatcher.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatches_tool_calls_and_feeds_results_back() {
        let chat = ScriptedModel::new(vec![
            call("c1", "lookup", serde_json::json!({"q": "rust"})),
            text("done"),
        ]);
        let dispatcher = EchoDispatcher { seen: Mutex::new(Vec::new()) };
        let spec = model();
        let run = AgentRun {
            agent: "tester",
            model: &spec,
            system_prompt: "system",
            tools: Vec::new(),
            max_iterations: 3,
        };
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let outcome = run_agent(
            &chat,
            &run,
            vec![ChatMessage::user("find")],
            &dispatcher,
            Some(&tx),
        )
        .await
        .unwrap();

        assert_eq!(outcome.reply, "done");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls, 1);
        assert_eq!(*dispatcher.seen.lock().unwrap(), vec!["lookup"]);

        // user, assistant(tool call), tool response, assistant text
        let roles: Vec<ChatRole> = outcome.messages.iter().map(|m| m.role.clone()).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::Tool, ChatRole::Assistant]
        );

        // The second request carries the tool response.
        let requests = chat.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].messages.iter().any(|m| m.role == ChatRole::Tool));

        drop(tx);
        let mut started = 0;
        while let Some(event) = rx.recv().await {
            if matches!(event, RunEvent::ToolCallStarted { .. }) {
                started += 1;
            }
        }
        assert_eq!(started, 1);
    }

    #[tokio::test]
    async fn stops_at_iteration_limit() {
        let chat = ScriptedModel::new(vec![
            call("c1", "lookup", serde_json::json!({})),
            call("c2", "lookup", serde_json::json!({})),
            call("c3", "lookup", serde_json::json!({})),
        ]);
        let dispatcher = EchoDispatcher { seen: Mutex::new(Vec::new()) };
        let spec = model();
        let run = AgentRun {
            agent: "looper",
            model: &spec,
            system_prompt: "system",
            tools: Vec::new(),
            max_iterations: 2,
        };

        let result = run_agent(&chat, &run, vec![ChatMessage::user("go")], &dispatcher, None).await;

        match result {
            Err(AgentError::IterationLimit { agent, limit }) => {
                assert_eq!(agent, "looper");
                assert_eq!(limit, 2);
            }
            other => panic!("expected IterationLimit, got {other:?}"),
        }
        assert_eq!(dispatcher.seen.lock().unwrap().len(), 2);
    }
}
