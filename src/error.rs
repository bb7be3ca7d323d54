//! Crate-level error type

use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::model::ModelError;
use crate::sparql::SparqlError;

/// Any error surfaced by the library
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("SPARQL error: {0}")]
    Sparql(#[from] SparqlError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A newer selection started before this one finished
    #[error("Selection {generation} was superseded by selection {latest}")]
    Superseded { generation: u64, latest: u64 },
}

pub type AtlasResult<T> = Result<T, AtlasError>;
