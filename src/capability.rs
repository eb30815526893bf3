use async_trait::async_trait;

use crate::errors::TeamResult;
use crate::models::document::Document;
use crate::models::tool::{Tool, ToolCall};

/// A named external operation an agent may request be invoked on its behalf.
///
/// Capabilities never error for "no results"; that is `Ok(vec![])`. Errors
/// are reserved for connectivity or service failure, and the invoking
/// agent's turn folds them into its own failure.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Schema advertised to the generation backend
    fn tool(&self) -> Tool;

    /// Invoke with the backend-supplied arguments
    async fn call(&self, call: ToolCall) -> TeamResult<Vec<Document>>;
}

/// Render retrieved documents as the text block fed back into the invoking
/// agent's context.
pub fn render_documents(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents found.".to_string();
    }
    documents
        .iter()
        .map(|doc| doc.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}
