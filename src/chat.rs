//! Terminal front end: single-shot queries and the interactive chat loop.

use std::io::{BufRead, Write};

use genai::chat::ChatMessage;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::agent::agent_loop::{RunEvent, RunOutcome};
use crate::agent::llm::ChatModel;
use crate::error::AgentError;
use crate::orchestration::Orchestrator;

/// A line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    History,
    Agents,
    Quit,
    Message(String),
    Empty,
}

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    match trimmed {
        "" => ReplCommand::Empty,
        "/new" => ReplCommand::New,
        "/history" => ReplCommand::History,
        "/agents" => ReplCommand::Agents,
        "/quit" | "/exit" => ReplCommand::Quit,
        _ => ReplCommand::Message(trimmed.to_string()),
    }
}

/// One conversation thread with the orchestrator.
///
/// With memory enabled every turn sees the full thread; without it each
/// query starts from an empty conversation.
pub struct ChatSession<'a> {
    orchestrator: &'a Orchestrator,
    chat: &'a dyn ChatModel,
    enable_memory: bool,
    thread_id: Uuid,
    messages: Vec<ChatMessage>,
    transcript: Vec<(String, String)>,
}

impl<'a> ChatSession<'a> {
    pub fn new(
        orchestrator: &'a Orchestrator,
        chat: &'a dyn ChatModel,
        enable_memory: bool,
    ) -> Self {
        Self {
            orchestrator,
            chat,
            enable_memory,
            thread_id: Uuid::new_v4(),
            messages: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn thread_id(&self) -> Uuid {
        self.thread_id
    }

    /// `(speaker, text)` pairs for the current thread.
    pub fn transcript(&self) -> &[(String, String)] {
        &self.transcript
    }

    /// Start a new thread with no history.
    pub fn reset(&mut self) {
        self.thread_id = Uuid::new_v4();
        self.messages.clear();
        self.transcript.clear();
    }

    /// Send one user message and return the orchestrator's reply.
    pub async fn send(
        &mut self,
        input: &str,
        events: Option<&mpsc::UnboundedSender<RunEvent>>,
    ) -> Result<String, AgentError> {
        let mut history = if self.enable_memory {
            self.messages.clone()
        } else {
            Vec::new()
        };
        history.push(ChatMessage::user(input));

        let outcome = self.orchestrator.invoke(self.chat, history, events).await?;

        if self.enable_memory {
            self.messages = outcome.messages;
        }
        self.transcript.push(("user".to_string(), input.to_string()));
        self.transcript
            .push(("assistant".to_string(), outcome.reply.clone()));
        Ok(outcome.reply)
    }
}

/// Print streamed text to stdout and tool activity to stderr until the
/// sender side is dropped.
async fn print_events(mut rx: mpsc::UnboundedReceiver<RunEvent>) {
    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::Text(chunk) => {
                print!("{chunk}");
                let _ = stdout.flush();
            }
            RunEvent::ToolCallStarted {
                agent,
                tool,
                args_summary,
            } => {
                eprintln!("\n[{agent}] -> {tool} {args_summary}");
            }
            RunEvent::ToolCallCompleted { agent, tool, .. } => {
                tracing::debug!(agent = %agent, tool = %tool, "Tool call completed");
            }
        }
    }
}

/// Run one query with streamed output.
pub async fn ask(
    orchestrator: &Orchestrator,
    chat: &dyn ChatModel,
    query: &str,
) -> Result<RunOutcome, AgentError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(rx));

    let result = orchestrator
        .invoke(chat, vec![ChatMessage::user(query)], Some(&tx))
        .await;

    drop(tx);
    let _ = printer.await;
    println!();
    result
}

/// Lines typed on stdin.
///
/// Read on a dedicated OS thread: a pending tokio stdin read cannot be
/// cancelled and would hold up runtime shutdown after Ctrl-C.
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Interactive loop over `input` lines until `/quit` or end of input.
pub async fn run_repl(
    orchestrator: &Orchestrator,
    chat: &dyn ChatModel,
    enable_memory: bool,
    mut input: mpsc::UnboundedReceiver<String>,
) -> anyhow::Result<()> {
    let mut session = ChatSession::new(orchestrator, chat, enable_memory);

    println!(
        "Chat started (thread {}). Commands: /new, /history, /agents, /quit",
        session.thread_id()
    );

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = input.recv().await else {
            break;
        };

        match parse_line(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::New => {
                session.reset();
                println!("New thread {}", session.thread_id());
            }
            ReplCommand::History => {
                if session.transcript().is_empty() {
                    println!("(no messages in this thread)");
                }
                for (speaker, text) in session.transcript() {
                    println!("{speaker}: {text}");
                }
            }
            ReplCommand::Agents => {
                let caps = orchestrator.capabilities();
                if caps.is_empty() {
                    println!("No sub-agents registered.");
                }
                for cap in caps {
                    let tools: Vec<&str> = cap.tools.iter().map(|t| t.name.as_str()).collect();
                    println!("{} ({}): {}", cap.agent, cap.server, tools.join(", "));
                }
            }
            ReplCommand::Message(text) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let printer = tokio::spawn(print_events(rx));
                let result = session.send(&text, Some(&tx)).await;
                drop(tx);
                let _ = printer.await;
                println!();
                if let Err(e) = result {
                    eprintln!("Error: {e}");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::agent_loop::tests::{ScriptedModel, text};
    use crate::agent::types::{ModelSpec, Provider};

    fn orchestrator() -> Orchestrator {
        let model = ModelSpec {
            provider: Provider::Ollama,
            model: "llama3.2".to_string(),
            temperature: 0.0,
            max_tokens: 500,
        };
        Orchestrator::assemble(model, "PERSONA", Vec::new(), 5)
    }

    #[test]
    fn parses_commands_and_messages() {
        assert_eq!(parse_line("  /new "), ReplCommand::New);
        assert_eq!(parse_line("/quit"), ReplCommand::Quit);
        assert_eq!(parse_line("/exit"), ReplCommand::Quit);
        assert_eq!(parse_line(""), ReplCommand::Empty);
        assert_eq!(
            parse_line(" Xin chào "),
            ReplCommand::Message("Xin chào".to_string())
        );
    }

    #[tokio::test]
    async fn memory_carries_earlier_turns() {
        let orchestrator = orchestrator();
        let chat = ScriptedModel::new(vec![text("first"), text("second")]);
        let mut session = ChatSession::new(&orchestrator, &chat, true);

        session.send("one", None).await.unwrap();
        let reply = session.send("two", None).await.unwrap();

        assert_eq!(reply, "second");
        let requests = chat.requests.lock().unwrap();
        // user, assistant, user
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn without_memory_each_turn_starts_fresh() {
        let orchestrator = orchestrator();
        let chat = ScriptedModel::new(vec![text("first"), text("second")]);
        let mut session = ChatSession::new(&orchestrator, &chat, false);

        session.send("one", None).await.unwrap();
        session.send("two", None).await.unwrap();

        let requests = chat.requests.lock().unwrap();
        assert_eq!(requests[1].messages.len(), 1);
    }

    #[tokio::test]
    async fn repl_runs_until_quit() {
        let orchestrator = orchestrator();
        let chat = ScriptedModel::new(vec![text("Xin chào")]);
        let (tx, rx) = mpsc::unbounded_channel();
        for line in ["hello", "/new", "/quit", "never read"] {
            tx.send(line.to_string()).unwrap();
        }

        run_repl(&orchestrator, &chat, true, rx).await.unwrap();

        assert_eq!(chat.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repl_waiting_for_input_can_be_cancelled() {
        let orchestrator = orchestrator();
        let chat = ScriptedModel::new(Vec::new());
        let (_tx, rx) = mpsc::unbounded_channel::<String>();

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            run_repl(&orchestrator, &chat, true, rx),
        )
        .await;

        assert!(result.is_err(), "repl should still be waiting for input");
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[tokio::test]
    async fn reset_starts_a_new_thread() {
        let orchestrator = orchestrator();
        let chat = ScriptedModel::new(vec![text("hi")]);
        let mut session = ChatSession::new(&orchestrator, &chat, true);
        let first = session.thread_id();

        session.send("hello", None).await.unwrap();
        session.reset();

        assert_ne!(session.thread_id(), first);
        assert!(session.transcript().is_empty());
    }
}
