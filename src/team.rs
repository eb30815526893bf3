use std::collections::HashSet;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

use crate::agent::Agent;
use crate::errors::TeamResult;
use crate::models::event::TeamEvent;
use crate::models::message::Message;

/// Fixed-order round-robin scheduler over a roster of agents.
///
/// Each step grants the turn to `roster[counter % len]` and fully drains
/// that agent's event stream before the counter advances; agents never run
/// concurrently, so the concatenation of per-turn streams is also true
/// emission order. Turns are atomic: the budget is only checked between
/// turns, never inside one.
pub struct RoundRobinTeam {
    roster: Vec<Agent>,
    max_turns: usize,
}

impl RoundRobinTeam {
    /// Assemble a team. Misassembly is a programming error, not a runtime
    /// condition.
    pub fn new(roster: Vec<Agent>, max_turns: usize) -> Self {
        assert!(!roster.is_empty(), "roster must hold at least one agent");
        assert!(max_turns > 0, "turn budget must be positive");

        // Role names attribute every event; two agents sharing one would
        // merge their text into a single log entry.
        let mut names = HashSet::new();
        for agent in &roster {
            assert!(
                names.insert(agent.name().to_string()),
                "duplicate role name: {}",
                agent.name()
            );
        }

        Self { roster, max_turns }
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Drive the conversation over the task, yielding every agent event in
    /// emission order.
    ///
    /// The run ends when the turn budget is spent, when an agent contributes
    /// neither text nor a tool call, or on the first error. Each completed
    /// turn's text is appended to the shared context as a role-tagged line
    /// so later agents see the full prior conversation.
    pub fn run_stream(&self, task: &str) -> BoxStream<'_, TeamResult<TeamEvent>> {
        let task = task.to_string();

        Box::pin(async_stream::try_stream! {
            let mut context = vec![Message::user().with_text(&task)];

            for counter in 0..self.max_turns {
                let agent = &self.roster[counter % self.roster.len()];
                debug!(turn = counter, agent = %agent.name(), "starting turn");

                let mut turn_text = String::new();
                let mut turn_had_tool_call = false;

                {
                    let mut events = agent.speak(&context);
                    while let Some(event) = events.next().await {
                        let event = event?;
                        match &event {
                            TeamEvent::StreamingChunk { text, .. } => turn_text.push_str(text),
                            TeamEvent::ToolCallRequest { .. } => turn_had_tool_call = true,
                            TeamEvent::ToolCallExecution { .. } => {}
                        }
                        yield event;
                    }
                }

                if turn_text.trim().is_empty() && !turn_had_tool_call {
                    debug!(agent = %agent.name(), "nothing further to contribute; ending run");
                    break;
                }

                context.push(
                    Message::user().with_text(format!("{}: {}", agent.name(), turn_text)),
                );
            }
        })
    }
}
