use std::collections::HashMap;

use serde_json::Value;

use crate::errors::{TeamError, TeamResult};
use crate::models::event::TeamEvent;

/// Source name for the synthetic entry that seeds the log with the task
pub const USER_SOURCE: &str = "User";

const TOOL_EXECUTION_ACK: &str = "**Tool result:** data received successfully.";

/// One committed entry in the conversation log.
///
/// The log is append-only; the only mutation ever made is growing the text
/// of the most recently opened `Text` entry for a source.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Text {
        source: String,
        text: String,
    },
    ToolRequest {
        source: String,
        capability: String,
        arguments: Value,
    },
    ToolExecution {
        source: String,
    },
}

/// Folds the scheduler's flat event stream into an ordered conversation log.
///
/// Consecutive streaming fragments from one source merge into a single
/// growing `Text` entry. Instead of rescanning the log tail on every chunk,
/// the log keeps an index from source to its currently open `Text` entry;
/// appending an entry of any other type or source invalidates the index, so
/// a merge can never cross an intervening unrelated entry.
pub struct ConversationLog {
    entries: Vec<LogEntry>,
    open_entries: HashMap<String, usize>,
}

impl ConversationLog {
    /// Create a log seeded with the user's original task
    pub fn new<S: Into<String>>(task: S) -> Self {
        let mut log = Self {
            entries: Vec::new(),
            open_entries: HashMap::new(),
        };
        log.push_text(USER_SOURCE.to_string(), task.into());
        log
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    fn push_text(&mut self, source: String, text: String) {
        self.open_entries.clear();
        self.entries.push(LogEntry::Text {
            source: source.clone(),
            text,
        });
        self.open_entries.insert(source, self.entries.len() - 1);
    }

    fn push_boundary(&mut self, entry: LogEntry) {
        self.open_entries.clear();
        self.entries.push(entry);
    }

    /// Fold one event into the log, in arrival order
    pub fn apply(&mut self, event: TeamEvent) -> TeamResult<()> {
        if event.source().is_empty() {
            return Err(TeamError::MalformedEvent(
                "event carries an empty source name".to_string(),
            ));
        }

        match event {
            TeamEvent::StreamingChunk { source, text } => {
                match self.open_entries.get(&source).copied() {
                    Some(index) => {
                        let LogEntry::Text { text: existing, .. } = &mut self.entries[index]
                        else {
                            return Err(TeamError::MalformedEvent(format!(
                                "open entry for {} is not a text entry",
                                source
                            )));
                        };
                        existing.push_str(&text);
                    }
                    None => self.push_text(source, text),
                }
            }
            TeamEvent::ToolCallRequest { source, calls } => {
                for call in calls {
                    self.push_boundary(LogEntry::ToolRequest {
                        source: source.clone(),
                        capability: call.name,
                        arguments: call.arguments,
                    });
                }
            }
            TeamEvent::ToolCallExecution { source } => {
                self.push_boundary(LogEntry::ToolExecution { source });
            }
        }

        Ok(())
    }

    /// Render the log as a role-labeled document.
    ///
    /// Pure over the committed entries: text entries whose trimmed body is
    /// empty are dropped, tool requests become labeled blocks, executions a
    /// fixed acknowledgement line. Blocks are joined by one blank line.
    pub fn render(&self) -> String {
        let mut blocks = Vec::new();

        for entry in &self.entries {
            match entry {
                LogEntry::Text { source, text } => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        blocks.push(format!("**{}**:\n\n{}", source, trimmed));
                    }
                }
                LogEntry::ToolRequest {
                    source,
                    capability,
                    arguments,
                } => {
                    blocks.push(format!(
                        "**Tool call:** `{}` is planning to call `{}` with arguments:\n```json\n{}\n```",
                        source, capability, arguments
                    ));
                }
                LogEntry::ToolExecution { .. } => {
                    blocks.push(TOOL_EXECUTION_ACK.to_string());
                }
            }
        }

        blocks.join("\n\n")
    }
}
