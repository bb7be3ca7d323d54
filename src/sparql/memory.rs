//! In-process endpoint with canned responses
//!
//! Answers each query with the first rule whose kind (and optional text
//! fragment) matches; unmatched queries get an empty result set. Every
//! query is recorded so callers can assert on what was sent.

use super::{parse_results, QueryKind, Solutions, SparqlEndpoint, SparqlError, SparqlQuery, SparqlResult};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Body(String),
    Fail(SparqlError),
}

struct Rule {
    kind: QueryKind,
    needle: Option<String>,
    reply: Reply,
}

impl Rule {
    fn matches(&self, query: &SparqlQuery) -> bool {
        self.kind == query.kind()
            && self
                .needle
                .as_deref()
                .map_or(true, |needle| query.as_str().contains(needle))
    }
}

/// Endpoint that replays fixed SPARQL JSON documents
#[derive(Default)]
pub struct MemoryEndpoint {
    rules: Vec<Rule>,
    latency: Option<Duration>,
    received: Mutex<Vec<SparqlQuery>>,
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `kind` query with `body`
    pub fn respond(mut self, kind: QueryKind, body: impl Into<String>) -> Self {
        self.rules.push(Rule {
            kind,
            needle: None,
            reply: Reply::Body(body.into()),
        });
        self
    }

    /// Answer `kind` queries containing `needle` with `body`
    pub fn respond_when(
        mut self,
        kind: QueryKind,
        needle: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        self.rules.push(Rule {
            kind,
            needle: Some(needle.into()),
            reply: Reply::Body(body.into()),
        });
        self
    }

    /// Fail every `kind` query with `error`
    pub fn fail(mut self, kind: QueryKind, error: SparqlError) -> Self {
        self.rules.push(Rule {
            kind,
            needle: None,
            reply: Reply::Fail(error),
        });
        self
    }

    /// Delay every answer, e.g. to overlap concurrent callers
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of queries received so far
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of queries of one kind received so far
    pub fn calls_of(&self, kind: QueryKind) -> usize {
        self.lock().iter().filter(|q| q.kind() == kind).count()
    }

    /// Every query received, oldest first
    pub fn received(&self) -> Vec<SparqlQuery> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SparqlQuery>> {
        // a panicking test thread must not hide the queries from the others
        self.received.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SparqlEndpoint for MemoryEndpoint {
    async fn select(&self, query: &SparqlQuery) -> SparqlResult<Solutions> {
        self.lock().push(query.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.rules.iter().find(|rule| rule.matches(query)) {
            Some(Rule { reply: Reply::Body(body), .. }) => parse_results(body.as_bytes()),
            Some(Rule { reply: Reply::Fail(error), .. }) => Err(error.clone()),
            None => Ok(Solutions::empty()),
        }
    }
}

/// Builders for SPARQL JSON documents
pub mod fixtures {
    use serde_json::{json, Value};

    /// IRI term
    pub fn uri(value: &str) -> Value {
        json!({ "type": "uri", "value": value })
    }

    /// Plain literal term
    pub fn literal(value: &str) -> Value {
        json!({ "type": "literal", "value": value })
    }

    /// Language-tagged literal term
    pub fn label(value: &str) -> Value {
        json!({ "type": "literal", "value": value, "xml:lang": "en" })
    }

    /// Typed literal term
    pub fn typed(value: &str, datatype: &str) -> Value {
        json!({ "type": "literal", "value": value, "datatype": datatype })
    }

    /// `xsd:decimal` literal, the shape Wikidata uses for quantities
    pub fn decimal(value: &str) -> Value {
        typed(value, "http://www.w3.org/2001/XMLSchema#decimal")
    }

    /// Wikidata entity IRI for a Q-id
    pub fn entity(qid: &str) -> String {
        format!("http://www.wikidata.org/entity/{}", qid)
    }

    /// A results document over `vars` with the given binding rows
    pub fn results(vars: &[&str], rows: Vec<Value>) -> String {
        json!({
            "head": { "vars": vars },
            "results": { "bindings": rows }
        })
        .to_string()
    }
}
