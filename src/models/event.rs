use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// An observation emitted by the scheduler as the active agent takes its turn.
///
/// The stream of these is strictly ordered: agents never run concurrently, so
/// the concatenation of per-turn streams is also true emission order. The
/// variant set is closed; the aggregator matches it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeamEvent {
    /// The active agent asked for one or more capabilities to be invoked.
    ToolCallRequest { source: String, calls: Vec<ToolCall> },
    /// The requested capabilities finished; results are folded back into the
    /// invoking agent's own context, not carried here.
    ToolCallExecution { source: String },
    /// An incremental fragment of the active agent's text response.
    StreamingChunk { source: String, text: String },
}

impl TeamEvent {
    /// The role name that produced this event
    pub fn source(&self) -> &str {
        match self {
            TeamEvent::ToolCallRequest { source, .. } => source,
            TeamEvent::ToolCallExecution { source } => source,
            TeamEvent::StreamingChunk { source, .. } => source,
        }
    }

    pub fn chunk<S: Into<String>, T: Into<String>>(source: S, text: T) -> Self {
        TeamEvent::StreamingChunk {
            source: source.into(),
            text: text.into(),
        }
    }
}
