//! SPARQL protocol client over HTTP GET

use super::{parse_results, Solutions, SparqlEndpoint, SparqlError, SparqlQuery, SparqlResult};
use crate::config::EndpointConfig;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

const RESULTS_JSON: &str = "application/sparql-results+json";

/// Remote SPARQL endpoint such as `https://query.wikidata.org/sparql`
pub struct HttpEndpoint {
    url: String,
    client: Client,
}

impl HttpEndpoint {
    /// Create a client for the configured endpoint
    ///
    /// No timeout is set unless `timeout_secs` is configured.
    pub fn new(config: &EndpointConfig) -> SparqlResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SparqlError::Config(e.to_string()))?;

        Ok(Self {
            url: config.url.trim_end_matches('?').to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `<endpoint>?format=json&query=<percent-encoded text>`
    pub fn request_url(&self, query: &SparqlQuery) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}format=json&query={}",
            self.url,
            separator,
            utf8_percent_encode(query.as_str(), NON_ALPHANUMERIC)
        )
    }
}

#[async_trait]
impl SparqlEndpoint for HttpEndpoint {
    async fn select(&self, query: &SparqlQuery) -> SparqlResult<Solutions> {
        debug!("Sending {} query to {}", query.kind().tag(), self.url);

        let response = self
            .client
            .get(self.request_url(query))
            .header(ACCEPT, RESULTS_JSON)
            .send()
            .await
            .map_err(|e| SparqlError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SparqlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SparqlError::Network(e.to_string()))?;
        let solutions = parse_results(&body)?;

        debug!("{} query returned {} rows", query.kind().tag(), solutions.len());
        Ok(solutions)
    }
}
