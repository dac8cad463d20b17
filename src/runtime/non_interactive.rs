use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::{
    app::SessionConfig,
    cli::OutputFormat,
    gateway::Gateway,
    session::{ChatId, SessionManager, TurnKind, TurnOutcome},
    utils::AdewinError,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// Every turn in the order it was sent
    pub turns: Vec<TurnRecord>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnRecord {
    /// What the user sent
    pub prompt: String,
    /// Which backend call answered it
    pub kind: Option<TurnKind>,
    /// The assistant message appended for this turn
    pub response: Option<String>,
    /// Whether the response is the fallback reply
    pub fell_back: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend the turns were sent to
    pub backend: String,
    /// Session bound to the chat, if any
    pub session_id: Option<String>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Runs prompts as consecutive turns of one temporary chat
pub struct NonInteractiveRunner {
    manager: SessionManager,
    gateway: Arc<dyn Gateway>,
    backend: String,
}

impl NonInteractiveRunner {
    pub fn new(gateway: Arc<dyn Gateway>, backend: String, config: SessionConfig) -> Self {
        Self {
            manager: SessionManager::new(config),
            gateway,
            backend,
        }
    }

    /// Send every prompt and collect the transcript
    pub async fn execute(&mut self, prompts: &[String]) -> NonInteractiveResult {
        let start_time = Instant::now();
        let mut turns = Vec::new();
        let mut errors = Vec::new();

        for prompt in prompts {
            let mut record = TurnRecord {
                prompt: prompt.clone(),
                kind: None,
                response: None,
                fell_back: false,
            };

            match self.manager.send_message(self.gateway.as_ref(), prompt).await {
                Ok(outcome) => {
                    record.response = self
                        .manager
                        .messages(outcome.chat_id())
                        .last()
                        .map(|m| m.content.clone());
                    match outcome {
                        TurnOutcome::Answered { kind, .. } => record.kind = Some(kind),
                        TurnOutcome::FellBack { kind, reason, .. } => {
                            record.kind = Some(kind);
                            record.fell_back = true;
                            errors.push(AdewinError::from(reason).to_string());
                        }
                        TurnOutcome::Discarded { .. } => {}
                    }
                }
                Err(rejected) => {
                    errors.push(format!("Prompt {:?} not sent: {}", prompt, rejected));
                }
            }

            turns.push(record);
        }

        let duration_ms = start_time.elapsed().as_millis();
        info!(turns = turns.len(), duration_ms, "non-interactive run finished");

        NonInteractiveResult {
            turns,
            errors,
            metadata: ExecutionMetadata {
                backend: self.backend.clone(),
                session_id: self.manager.session_id(&ChatId::temporary()).cloned(),
                duration_ms,
            },
        }
    }

    /// Format the result for output
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();
                for turn in &result.turns {
                    output.push_str(&format!("{} {}\n", "You:".blue().bold(), turn.prompt));
                    if let Some(response) = &turn.response {
                        let label = if turn.fell_back {
                            "Assistant (fallback):".yellow().bold()
                        } else {
                            "Assistant:".green().bold()
                        };
                        output.push_str(&format!("{} {}\n", label, response));
                    }
                    output.push('\n');
                }

                if !result.errors.is_empty() {
                    output.push_str(&format!("{}\n", "Errors:".red().bold()));
                    for error in &result.errors {
                        output.push_str(&format!("  - {}\n", error));
                    }
                }

                output.trim_end().to_string()
            }
        }
    }
}
