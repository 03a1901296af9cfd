//! Query expansion: widen recall by asking the model for related queries.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use alfred_core::{Llm, Message, strip_code_fence};

/// Turns one user query into several semantically related search queries.
///
/// Expansion is best-effort: a model failure, malformed output, or an empty
/// query list all degrade to the singleton set containing the original
/// query, so the result is never empty. One attempt per call, no retry.
pub struct QueryExpander {
    llm: Arc<dyn Llm>,
    count: usize,
}

#[derive(Deserialize)]
struct ExpansionReply {
    queries: Vec<String>,
}

impl QueryExpander {
    /// Create an expander that asks for `count` related queries.
    pub fn new(llm: Arc<dyn Llm>, count: usize) -> Self {
        Self { llm, count }
    }

    /// Expand a query into related search queries.
    pub async fn expand(&self, query: &str) -> Vec<String> {
        let instruction = format!(
            "You are a helpful assistant that generates multiple search queries based on \
             a single input query. Generate {count} related search queries, one per line, \
             in JSON format. For example: \
             {{\"queries\": [\"query1\", \"query2\", \"query3\"]}}",
            count = self.count,
        );
        let messages = [
            Message::system(instruction),
            Message::user(format!("Generate multiple search queries for: {query}")),
        ];

        let raw = match self.llm.generate(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "query expansion failed; falling back to original query");
                return vec![query.to_string()];
            }
        };

        match parse_queries(&raw) {
            Some(queries) => {
                info!(count = queries.len(), "expanded query");
                queries
            }
            None => {
                warn!("could not parse expansion output; falling back to original query");
                vec![query.to_string()]
            }
        }
    }
}

/// Parse the model's `{"queries": [...]}` reply; `None` unless it yields at
/// least one non-empty query.
fn parse_queries(raw: &str) -> Option<Vec<String>> {
    let reply: ExpansionReply = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let queries: Vec<String> =
        reply.queries.into_iter().filter(|q| !q.trim().is_empty()).collect();
    if queries.is_empty() { None } else { Some(queries) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let queries = parse_queries(r#"{"queries": ["a", "b", "c"]}"#).unwrap();
        assert_eq!(queries, vec!["a", "b", "c"]);
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"queries\": [\"a\"]}\n```";
        assert_eq!(parse_queries(raw).unwrap(), vec!["a"]);
    }

    #[test]
    fn rejects_malformed_and_empty_output() {
        assert!(parse_queries("three related queries: a, b, c").is_none());
        assert!(parse_queries(r#"{"queries": []}"#).is_none());
        assert!(parse_queries(r#"{"queries": ["", "  "]}"#).is_none());
    }
}
