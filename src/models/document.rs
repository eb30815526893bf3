use std::fmt;

use serde::{Deserialize, Serialize};

/// A paper record returned by the retrieval capability.
///
/// Immutable once produced; the invoking agent passes these downstream as
/// JSON, so every field stays serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub authors: Vec<String>,
    /// Publication date, `YYYY-MM-DD`
    pub published: String,
    pub summary: String,
    pub pdf_url: String,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "PDF URL: {}", self.pdf_url)?;
        writeln!(f, "Authors: {}", self.authors.join(", "))?;
        writeln!(f, "Published: {}", self.published)?;
        write!(f, "Summary: {}", self.summary)
    }
}
