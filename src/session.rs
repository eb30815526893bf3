use futures::StreamExt;
use tracing::{info, warn};

use crate::errors::TeamError;
use crate::team::RoundRobinTeam;
use crate::transcript::ConversationLog;

/// Outcome of one conversation run: the rendered transcript of everything
/// committed before the run ended, and the error that ended it early, if any.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub transcript: String,
    pub failure: Option<TeamError>,
}

impl RunOutcome {
    pub fn is_abnormal(&self) -> bool {
        self.failure.is_some()
    }
}

/// Owns one assembled team for the lifetime of a user session.
///
/// The embedding application creates a session when the user's session
/// starts and drops it when the session ends; each call to
/// `run_conversation` is one independent run with its own conversation log.
pub struct Session {
    team: RoundRobinTeam,
}

impl Session {
    pub fn new(team: RoundRobinTeam) -> Self {
        Self { team }
    }

    /// Drive the team over one task and aggregate its event stream into a
    /// rendered transcript.
    ///
    /// The first error stops consumption; entries already committed stay in
    /// the transcript and the error is reported alongside it. Dropping the
    /// returned future cancels the run; the log only mutates between awaits,
    /// so committed entries are never corrupted.
    pub async fn run_conversation(&self, task: &str) -> RunOutcome {
        let mut log = ConversationLog::new(task);
        let mut failure = None;

        let mut events = self.team.run_stream(task);
        while let Some(event) = events.next().await {
            let applied = event.and_then(|event| log.apply(event));
            if let Err(e) = applied {
                warn!(error = %e, "run ended abnormally");
                failure = Some(e);
                break;
            }
        }
        drop(events);

        info!(
            entries = log.entries().len(),
            abnormal = failure.is_some(),
            "conversation finished"
        );

        RunOutcome {
            transcript: log.render(),
            failure,
        }
    }
}
