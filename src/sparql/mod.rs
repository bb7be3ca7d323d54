//! Remote SPARQL query client
//!
//! Queries are built by [`WikidataQueries`], validated locally with
//! `spargebra`, sent to a [`SparqlEndpoint`] and returned as a one-shot
//! sequence of [`QuerySolution`]s parsed from the SPARQL 1.1 JSON results
//! format.
//!
//! # Example
//!
//! ```rust,ignore
//! use treatymap::sparql::{HttpEndpoint, SparqlEndpoint, WikidataQueries};
//! use treatymap::config::EndpointConfig;
//! use treatymap::CountryCode;
//!
//! let endpoint = HttpEndpoint::new(&EndpointConfig::default())?;
//! let queries = WikidataQueries::new("en");
//! let query = queries.memberships(&CountryCode::new("NGA")?)?;
//!
//! for solution in endpoint.select(&query).await? {
//!     println!("{:?}", solution.value("organization"));
//! }
//! ```
//!
//! Errors are always returned to the caller; deciding whether a failed
//! query degrades to an empty result is the pipeline's job.

mod http;
mod memory;
mod query;
mod results;

pub use http::HttpEndpoint;
pub use memory::{fixtures, MemoryEndpoint};
pub use query::{QueryKind, SparqlQuery, WikidataQueries};
pub use results::{parse_results, QuerySolution, Solutions};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// SPARQL errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparqlError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response is not a SPARQL JSON results document
    #[error("Parse error: {0}")]
    Parse(String),

    /// A locally built query is not valid SPARQL
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

/// Anything that answers SPARQL SELECT queries
///
/// Implemented by:
/// - `HttpEndpoint` — a remote endpoint such as query.wikidata.org
/// - `MemoryEndpoint` — canned responses for tests and offline runs
#[async_trait]
pub trait SparqlEndpoint: Send + Sync {
    /// Execute a SELECT query and return its solutions
    async fn select(&self, query: &SparqlQuery) -> SparqlResult<Solutions>;
}

#[async_trait]
impl<T: SparqlEndpoint + ?Sized> SparqlEndpoint for Arc<T> {
    async fn select(&self, query: &SparqlQuery) -> SparqlResult<Solutions> {
        (**self).select(query).await
    }
}
