use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum TeamError {
    #[error("Generation failed for {role}: {detail}")]
    Generation { role: String, detail: String },

    #[error("Capability call failed: {0}")]
    Capability(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),
}

impl TeamError {
    pub fn generation<R: Into<String>, D: Into<String>>(role: R, detail: D) -> Self {
        TeamError::Generation {
            role: role.into(),
            detail: detail.into(),
        }
    }
}

pub type TeamResult<T> = Result<T, TeamError>;
