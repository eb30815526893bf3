//! The shipped literature-review team: Researcher, Reviewer, Writer, one
//! turn each.

use anyhow::Result;

use crate::agent::Agent;
use crate::arxiv::ArxivSearch;
use crate::providers::configs::OllamaProviderConfig;
use crate::providers::ollama::OllamaProvider;
use crate::team::RoundRobinTeam;

pub const RESEARCHER: &str = "Researcher";
pub const REVIEWER: &str = "Reviewer";
pub const WRITER: &str = "Writer";

/// Tool-capable model for the Researcher
pub const RESEARCH_MODEL: &str = "granite3.3:2b";
/// Larger prose model shared by the Reviewer and Writer
pub const PROSE_MODEL: &str = "granite3.3:8b";

/// One turn per role in the shipped configuration
pub const DEFAULT_MAX_TURNS: usize = 3;

const RESEARCHER_INSTRUCTION: &str = "\
Given a user topic, think of the best arXiv query and call the search tool. \
When the tool returns, choose exactly the number of papers requested and pass \
them on as JSON with all their information, making sure to include the PDF URL \
field for each paper.";

const REVIEWER_INSTRUCTION: &str = "\
You review the academic papers retrieved by the Researcher. Check that each \
selected paper is clearly connected to the user's query, flag any that are \
off-topic or only loosely related, and note whether the collection covers the \
main question and its important angles. Keep the requested number of papers, \
each formatted with title, authors, published date, summary and PDF URL, and \
close with a short paragraph evaluating the overall match, using only the \
information available in the abstracts.";

const WRITER_INSTRUCTION: &str = "\
You are an expert academic writer. Write a cohesive literature review based \
exclusively on the provided papers, in this order: a two to three sentence \
introduction defining the research area followed by the list of reviewed \
papers with titles, authors and URLs; two or three central themes, one \
paragraph each, comparing and contrasting how the referenced papers \
contribute to the theme; a brief overview of the methodologies and the \
limitations that can be inferred solely from the abstracts; and a closing \
one to two sentence summary of the state of the research with one suggested \
direction for future work.";

/// Assemble the deployed team against an Ollama endpoint taken from the
/// environment.
pub fn literature_review_team() -> Result<RoundRobinTeam> {
    let researcher = Agent::new(
        RESEARCHER,
        RESEARCHER_INSTRUCTION,
        Box::new(OllamaProvider::new(OllamaProviderConfig::from_env(
            RESEARCH_MODEL,
        ))?),
    )
    .with_capability(Box::new(ArxivSearch::new()?));

    let reviewer = Agent::new(
        REVIEWER,
        REVIEWER_INSTRUCTION,
        Box::new(OllamaProvider::new(OllamaProviderConfig::from_env(
            PROSE_MODEL,
        ))?),
    );

    let writer = Agent::new(
        WRITER,
        WRITER_INSTRUCTION,
        Box::new(OllamaProvider::new(OllamaProviderConfig::from_env(
            PROSE_MODEL,
        ))?),
    );

    Ok(RoundRobinTeam::new(
        vec![researcher, reviewer, writer],
        DEFAULT_MAX_TURNS,
    ))
}
