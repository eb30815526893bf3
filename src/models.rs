//! These models represent the objects passed around by the team
//!
//! There are a few related formats in play:
//! - openai-compatible messages/tools, sent from an agent to its backend
//! - team events, emitted by the scheduler as each agent takes its turn
//! - documents, returned by the retrieval capability
//!
//! Wire payloads are converted into these internal structs at the provider
//! boundary; everything above the provider works only with these types.
pub mod document;
pub mod event;
pub mod message;
pub mod role;
pub mod tool;
