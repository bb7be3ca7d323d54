//! Reference data and selection session
//!
//! [`ReferenceLoader`] loads the membership-size table and the census
//! statistics once, sharing a single in-flight load between concurrent
//! callers. [`Session`] runs selections on top of it and keeps the report
//! of the most recent one. Every selection takes a generation ticket; a
//! report is committed only while its ticket is still the latest, so a slow
//! selection can never overwrite a newer one.

use crate::config::AtlasConfig;
use crate::dataset::MembershipSizeTable;
use crate::error::{AtlasError, AtlasResult};
use crate::model::{CountryCode, MemberLimit, OrganizationRef, OrganizationTypeRef};
use crate::pipeline::{LabeledOrganization, Pipeline, SelectionReport};
use crate::sparql::{HttpEndpoint, SparqlEndpoint, WikidataQueries};
use crate::stats::{CountryStatRecord, CountryStatisticsTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

/// Tables loaded once per session
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub membership_sizes: MembershipSizeTable,
    pub statistics: CountryStatisticsTable,
}

/// Single-flight loader for [`ReferenceData`]
pub struct ReferenceLoader {
    dataset_path: PathBuf,
    pipeline: Pipeline,
    cell: OnceCell<Arc<ReferenceData>>,
}

impl ReferenceLoader {
    pub fn new(dataset_path: impl Into<PathBuf>, pipeline: Pipeline) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            pipeline,
            cell: OnceCell::new(),
        }
    }

    /// Loader that already holds `data`
    pub fn preloaded(data: ReferenceData, pipeline: Pipeline) -> Self {
        Self {
            dataset_path: PathBuf::new(),
            pipeline,
            cell: OnceCell::from(Arc::new(data)),
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Load the reference tables, or return the ones already loaded
    ///
    /// Concurrent callers share one load. A missing or malformed dataset
    /// file is an error and leaves the loader empty for a later retry; a
    /// failed statistics query leaves the statistics table empty.
    pub async fn load(&self) -> AtlasResult<Arc<ReferenceData>> {
        let data = self
            .cell
            .get_or_try_init(|| async {
                let endpoint = self.pipeline.endpoint();
                let queries = self.pipeline.queries();
                let (sizes, statistics) = tokio::join!(
                    MembershipSizeTable::load(&self.dataset_path),
                    CountryStatisticsTable::fetch(endpoint, queries),
                );

                let statistics = statistics.unwrap_or_else(|e| {
                    warn!("Statistics query failed, continuing without statistics: {}", e);
                    CountryStatisticsTable::new()
                });

                Ok::<_, AtlasError>(Arc::new(ReferenceData {
                    membership_sizes: sizes?,
                    statistics,
                }))
            })
            .await?;

        Ok(Arc::clone(data))
    }

    /// Reference tables if loading has completed
    pub fn get(&self) -> Option<Arc<ReferenceData>> {
        self.cell.get().cloned()
    }
}

/// A committed selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub generation: u64,
    #[serde(flatten)]
    pub report: SelectionReport,
}

/// Selection state shared by the HTTP API and the CLI
pub struct Session {
    pipeline: Pipeline,
    loader: ReferenceLoader,
    generation: AtomicU64,
    current: RwLock<Option<Arc<Selection>>>,
}

impl Session {
    pub fn new(pipeline: Pipeline, loader: ReferenceLoader) -> Self {
        Self {
            pipeline,
            loader,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Session over an HTTP endpoint as configured
    pub fn from_config(config: &AtlasConfig) -> AtlasResult<Self> {
        let endpoint: Arc<dyn SparqlEndpoint> = Arc::new(HttpEndpoint::new(&config.endpoint)?);
        let pipeline = Pipeline::new(endpoint, WikidataQueries::new(config.endpoint.language.clone()));
        let loader = ReferenceLoader::new(config.dataset_path.clone(), pipeline.clone());
        Ok(Self::new(pipeline, loader))
    }

    /// Session over `endpoint` with reference tables already in hand
    pub fn with_reference(endpoint: Arc<dyn SparqlEndpoint>, data: ReferenceData) -> Self {
        let pipeline = Pipeline::new(endpoint, WikidataQueries::default());
        let loader = ReferenceLoader::preloaded(data, pipeline.clone());
        Self::new(pipeline, loader)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn loader(&self) -> &ReferenceLoader {
        &self.loader
    }

    /// Load the reference tables
    pub async fn reference(&self) -> AtlasResult<Arc<ReferenceData>> {
        self.loader.load().await
    }

    /// Latest generation handed out
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Run a selection and commit its report
    ///
    /// Returns [`AtlasError::Superseded`] without touching the committed
    /// report when another selection started after this one.
    pub async fn select(&self, country: CountryCode, limit: MemberLimit) -> AtlasResult<Arc<Selection>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Selection {} started for {} below {}", generation, country, limit);

        let reference = self.loader.load().await?;
        let report = self.pipeline.run(&reference, &country, limit).await;

        let mut current = self.current.write().await;
        let latest = self.latest_generation();
        if generation != latest {
            info!("Discarding selection {} for {}: superseded by {}", generation, country, latest);
            return Err(AtlasError::Superseded { generation, latest });
        }

        let selection = Arc::new(Selection { generation, report });
        *current = Some(Arc::clone(&selection));
        Ok(selection)
    }

    /// The last committed selection
    pub async fn current(&self) -> Option<Arc<Selection>> {
        self.current.read().await.clone()
    }

    /// Statistics record of one country
    pub async fn country_stats(&self, code: &CountryCode) -> AtlasResult<Option<CountryStatRecord>> {
        let reference = self.loader.load().await?;
        Ok(reference.statistics.get(code).cloned())
    }

    pub async fn treaty_members(&self, org: &OrganizationRef) -> AtlasResult<Vec<CountryCode>> {
        Ok(self.pipeline.treaty_members(org).await?)
    }

    pub async fn memberships_of_type(
        &self,
        country: &CountryCode,
        org_type: &OrganizationTypeRef,
    ) -> AtlasResult<Vec<LabeledOrganization>> {
        Ok(self.pipeline.memberships_of_type(country, org_type).await?)
    }
}
