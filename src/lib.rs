//! Treatymap
//!
//! Aggregates the international-organization memberships of a country from
//! the Wikidata SPARQL endpoint: which organizations it currently belongs
//! to, which of them fall below a chosen member count, which countries it
//! shares them with, how those organizations break down by type, and how
//! the co-member countries compare on population, HDI and GDP.
//!
//! # Architecture
//!
//! - `sparql`: query builders, the [`SparqlEndpoint`] seam, HTTP and
//!   in-memory endpoints, SPARQL JSON results parsing
//! - `dataset`: the bundled membership-size table
//! - `catalog`: category reference table and the 249-code census
//! - `pipeline`: resolver → treaty filter → co-member expander → category
//!   aggregator, producing a [`SelectionReport`]
//! - `stats`: per-country statistics and the top-10 chart series
//! - `session`: single-flight reference loading and selection generations
//! - `http`: JSON API served with axum
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use treatymap::{AtlasConfig, CountryCode, MemberLimit, Session};
//!
//! # async fn run() -> treatymap::AtlasResult<()> {
//! let session = Session::from_config(&AtlasConfig::default())?;
//! let selection = session
//!     .select(CountryCode::new("NGA")?, MemberLimit::Below(100))
//!     .await?;
//!
//! for treaty in &selection.report.treaties {
//!     println!("{} ({} members)", treaty.label, treaty.member_count);
//! }
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod http;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod sparql;
pub mod stats;

// Re-export main types for convenience
pub use catalog::{categorize_type, CategoryLabel};

pub use config::{AtlasConfig, ConfigError, EndpointConfig, ServerConfig};

pub use dataset::{DatasetError, MembershipSizeTable};

pub use error::{AtlasError, AtlasResult};

pub use model::{
    CountryCode, GroupedMembership, MemberLimit, ModelError, OrganizationRef, OrganizationTypeRef,
};

pub use pipeline::{CategoryCounts, Pipeline, SelectionReport, TreatySummary};

pub use session::{ReferenceData, ReferenceLoader, Selection, Session};

pub use sparql::{
    HttpEndpoint, MemoryEndpoint, QueryKind, QuerySolution, SparqlEndpoint, SparqlError,
    SparqlQuery, SparqlResult, WikidataQueries,
};

pub use stats::{ChartDatum, CountryStatRecord, CountryStatisticsTable};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
