use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::json;

use crate::capability::Capability;
use crate::errors::{TeamError, TeamResult};
use crate::models::document::Document;
use crate::models::tool::{Tool, ToolCall};

pub const ARXIV_API: &str = "http://export.arxiv.org/api/query";
pub const DEFAULT_MAX_RESULTS: u64 = 3;

/// Retrieval capability backed by the arXiv Atom API.
pub struct ArxivSearch {
    client: Client,
    base_url: String,
}

impl ArxivSearch {
    pub fn new() -> TeamResult<Self> {
        Self::with_base_url(ARXIV_API)
    }

    pub fn with_base_url<S: Into<String>>(base_url: S) -> TeamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TeamError::Capability(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub async fn search(&self, query: &str, max_results: u64) -> TeamResult<Vec<Document>> {
        let url = format!(
            "{}?search_query=all:{}&max_results={}&sortBy=relevance",
            self.base_url,
            urlencoding::encode(query),
            max_results
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TeamError::Capability(format!("arXiv request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TeamError::Capability(format!(
                "arXiv returned status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TeamError::Capability(format!("arXiv response unreadable: {}", e)))?;

        Ok(parse_feed(&body))
    }
}

#[async_trait]
impl Capability for ArxivSearch {
    fn tool(&self) -> Tool {
        Tool::new(
            "search",
            "Search arXiv for papers matching a query and return title, authors, \
             published date, summary and PDF URL for each result",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The arXiv search query"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "How many papers to return",
                        "default": DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn call(&self, call: ToolCall) -> TeamResult<Vec<Document>> {
        let query = call
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                TeamError::Capability("search requires a string 'query' argument".to_string())
            })?;

        let max_results = call
            .arguments
            .get("max_results")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .max(1);

        self.search(query, max_results).await
    }
}

/// Extract documents from an arXiv Atom feed.
///
/// The reference stack carries no XML parser, and the handful of fields we
/// need sit in a stable, flat layout per `<entry>`, so a scan is enough.
/// Entries missing a title are skipped; a missing pdf link falls back to the
/// entry id rewritten from /abs/ to /pdf/.
fn parse_feed(atom: &str) -> Vec<Document> {
    let entry_re = Regex::new(r"(?s)<entry>(.*?)</entry>").unwrap();
    let title_re = Regex::new(r"(?s)<title>(.*?)</title>").unwrap();
    let name_re = Regex::new(r"(?s)<name>(.*?)</name>").unwrap();
    let published_re = Regex::new(r"<published>([^<]*)</published>").unwrap();
    let summary_re = Regex::new(r"(?s)<summary>(.*?)</summary>").unwrap();
    let link_re = Regex::new(r"<link[^>]*>").unwrap();
    let href_re = Regex::new(r#"href="([^"]+)""#).unwrap();
    let id_re = Regex::new(r"<id>([^<]*)</id>").unwrap();

    let mut documents = Vec::new();

    for entry in entry_re.captures_iter(atom) {
        let entry = &entry[1];

        let Some(title) = title_re.captures(entry).map(|c| clean_text(&c[1])) else {
            continue;
        };

        let authors = name_re
            .captures_iter(entry)
            .map(|c| clean_text(&c[1]))
            .collect();

        let published = published_re
            .captures(entry)
            .map(|c| c[1].chars().take(10).collect())
            .unwrap_or_default();

        let summary = summary_re
            .captures(entry)
            .map(|c| clean_text(&c[1]))
            .unwrap_or_default();

        let pdf_url = link_re
            .find_iter(entry)
            .map(|m| m.as_str())
            .find(|tag| tag.contains("title=\"pdf\""))
            .and_then(|tag| href_re.captures(tag).map(|c| c[1].to_string()))
            .or_else(|| {
                id_re
                    .captures(entry)
                    .map(|c| c[1].replace("/abs/", "/pdf/"))
            })
            .unwrap_or_default();

        documents.push(Document {
            title,
            authors,
            published,
            summary,
            pdf_url,
        });
    }

    documents
}

/// Collapse the feed's hard-wrapped whitespace and unescape XML entities
fn clean_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>2024-01-05T12:00:00Z</published>
    <title>Multi-Agent Coordination
      for Customer Service</title>
    <summary>We study coordination &amp; hand-off between
      service agents.</summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.00001v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v2</id>
    <published>2024-02-10T09:30:00Z</published>
    <title>Dialogue Scheduling in Agent Teams</title>
    <summary>A scheduling study.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let docs = parse_feed(FEED);
        assert_eq!(docs.len(), 2);

        assert_eq!(docs[0].title, "Multi-Agent Coordination for Customer Service");
        assert_eq!(docs[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(docs[0].published, "2024-01-05");
        assert_eq!(
            docs[0].summary,
            "We study coordination & hand-off between service agents."
        );
        assert_eq!(docs[0].pdf_url, "http://arxiv.org/pdf/2401.00001v1");

        // No pdf link on the second entry: derived from the id
        assert_eq!(docs[1].pdf_url, "http://arxiv.org/pdf/2401.00002v2");
        assert_eq!(docs[1].authors, vec!["Grace Hopper"]);
    }

    #[test]
    fn test_parse_feed_empty() {
        let empty = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
        assert!(parse_feed(empty).is_empty());
    }

    #[tokio::test]
    async fn test_search() -> TeamResult<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(FEED, "application/atom+xml"))
            .mount(&mock_server)
            .await;

        let capability =
            ArxivSearch::with_base_url(format!("{}/api/query", mock_server.uri()))?;
        let docs = capability
            .call(ToolCall::new(
                "search",
                serde_json::json!({"query": "multi-agent customer service", "max_results": 2}),
            ))
            .await?;

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].authors.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_service_failure() -> TeamResult<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let capability =
            ArxivSearch::with_base_url(format!("{}/api/query", mock_server.uri()))?;
        let result = capability.search("anything", 3).await;

        assert!(matches!(result, Err(TeamError::Capability(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_call_requires_query() -> TeamResult<()> {
        let capability = ArxivSearch::new()?;
        let result = capability
            .call(ToolCall::new("search", serde_json::json!({})))
            .await;

        assert!(matches!(result, Err(TeamError::Capability(_))));
        Ok(())
    }
}
