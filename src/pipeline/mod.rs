//! Membership aggregation pipeline
//!
//! A selection (country code and member limit) flows through four stages:
//!
//! 1. [`resolve_memberships`]: current organizations of the country
//! 2. [`filter_by_size`]: keep organizations below the member limit
//! 3. [`expand`]: member countries of each kept organization
//! 4. [`membership_types`] + [`categorize`]: category counts
//!
//! followed by a statistics lookup for the selected country and its
//! co-members. A failed remote query degrades that stage to an empty result
//! and is logged; the selection as a whole never fails.

mod category;
mod expander;
mod filter;
mod resolver;

pub use category::{categorize, membership_types, CategoryCounts};
pub use expander::{expand, unique_members};
pub use filter::filter_by_size;
pub use resolver::{memberships_of_type, resolve_memberships, treaty_members, LabeledOrganization};

use crate::model::{CountryCode, GroupedMembership, MemberLimit, OrganizationRef, OrganizationTypeRef};
use crate::session::ReferenceData;
use crate::sparql::{SparqlEndpoint, SparqlError, SparqlResult, WikidataQueries};
use crate::stats::{gdp_series, population_series, ChartDatum, CountryStatRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One organization in the treaty list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatySummary {
    pub label: String,
    /// Member countries returned by the co-member query
    pub member_count: usize,
}

/// Everything derived from one selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub country: CountryCode,
    pub limit: MemberLimit,
    /// Organizations that passed the size filter
    pub organizations: Vec<OrganizationRef>,
    /// Member countries per organization label
    pub groups: GroupedMembership,
    /// Treaty list, largest first
    pub treaties: Vec<TreatySummary>,
    /// Countries sharing at least one organization, excluding `country`
    pub co_members: BTreeSet<CountryCode>,
    pub categories: CategoryCounts,
    /// Statistics of `country` and its co-members
    pub stats: Vec<CountryStatRecord>,
    pub population_chart: Vec<ChartDatum>,
    pub gdp_chart: Vec<ChartDatum>,
    /// Stages that degraded to an empty result
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl SelectionReport {
    /// Treaty list from `groups`, by descending member count then label
    pub fn treaty_list(groups: &GroupedMembership) -> Vec<TreatySummary> {
        let mut treaties: Vec<TreatySummary> = groups
            .iter()
            .map(|(label, members)| TreatySummary {
                label: label.clone(),
                member_count: members.len(),
            })
            .collect();
        treaties.sort_by(|a, b| {
            b.member_count
                .cmp(&a.member_count)
                .then_with(|| a.label.cmp(&b.label))
        });
        treaties
    }
}

/// Runs selections against a SPARQL endpoint
#[derive(Clone)]
pub struct Pipeline {
    endpoint: Arc<dyn SparqlEndpoint>,
    queries: WikidataQueries,
}

impl Pipeline {
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>, queries: WikidataQueries) -> Self {
        Self { endpoint, queries }
    }

    pub fn endpoint(&self) -> &dyn SparqlEndpoint {
        self.endpoint.as_ref()
    }

    pub fn queries(&self) -> &WikidataQueries {
        &self.queries
    }

    /// Run every stage for `country` under `limit`
    pub async fn run(
        &self,
        reference: &ReferenceData,
        country: &CountryCode,
        limit: MemberLimit,
    ) -> SelectionReport {
        let mut degraded = Vec::new();

        let memberships = resolve_memberships(self.endpoint(), &self.queries, country)
            .await
            .unwrap_or_else(|e| {
                degrade(&mut degraded, "memberships", country, e);
                Default::default()
            });

        let organizations = filter_by_size(&memberships, &reference.membership_sizes, limit);
        info!(
            "{}: {} memberships, {} below {}",
            country,
            memberships.len(),
            organizations.len(),
            limit
        );

        let groups = expand(self.endpoint(), &self.queries, &organizations)
            .await
            .unwrap_or_else(|e| {
                degrade(&mut degraded, "co-members", country, e);
                GroupedMembership::new()
            });
        let co_members = unique_members(&groups, country);

        let types: Vec<OrganizationTypeRef> =
            membership_types(self.endpoint(), &self.queries, &organizations)
                .await
                .unwrap_or_else(|e| {
                    degrade(&mut degraded, "categories", country, e);
                    Vec::new()
                });
        let categories = categorize(&types);

        let stats = reference
            .statistics
            .stats_for(co_members.iter().chain(std::iter::once(country)));
        let population_chart = population_series(&stats, country);
        let gdp_chart = gdp_series(&stats, country);

        SelectionReport {
            country: country.clone(),
            limit,
            organizations: organizations.into_iter().collect(),
            treaties: SelectionReport::treaty_list(&groups),
            groups,
            co_members,
            categories,
            stats,
            population_chart,
            gdp_chart,
            degraded,
        }
    }

    /// Current member countries of one organization
    pub async fn treaty_members(&self, org: &OrganizationRef) -> SparqlResult<Vec<CountryCode>> {
        treaty_members(self.endpoint(), &self.queries, org).await
    }

    /// The country's current memberships of one organization type
    pub async fn memberships_of_type(
        &self,
        country: &CountryCode,
        org_type: &OrganizationTypeRef,
    ) -> SparqlResult<Vec<LabeledOrganization>> {
        memberships_of_type(self.endpoint(), &self.queries, country, org_type).await
    }
}

fn degrade(degraded: &mut Vec<String>, stage: &str, country: &CountryCode, error: SparqlError) {
    warn!("{} query for {} failed, using empty result: {}", stage, country, error);
    degraded.push(stage.to_string());
}
