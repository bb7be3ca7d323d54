//! Co-member expansion
//!
//! For a set of organizations, fetch every sovereign state that is currently
//! a member and group the codes by organization label.

use crate::model::{CountryCode, GroupedMembership, OrganizationRef};
use crate::sparql::{SparqlEndpoint, SparqlResult, WikidataQueries};
use std::collections::BTreeSet;
use tracing::debug;

/// Member countries of each organization in `orgs`, keyed by label
///
/// An empty input issues no query. Organizations without an English label
/// are keyed by their entity id; rows with a malformed code are dropped.
pub async fn expand<'a, I>(
    endpoint: &dyn SparqlEndpoint,
    queries: &WikidataQueries,
    orgs: I,
) -> SparqlResult<GroupedMembership>
where
    I: IntoIterator<Item = &'a OrganizationRef>,
{
    let orgs: Vec<&OrganizationRef> = orgs.into_iter().collect();
    let mut groups = GroupedMembership::new();
    if orgs.is_empty() {
        return Ok(groups);
    }

    let query = queries.co_members(orgs.iter().copied())?;
    for row in endpoint.select(&query).await? {
        let Some(code) = row.value("isoCode").and_then(|v| CountryCode::new(v).ok()) else {
            continue;
        };
        let label = match (row.value("organizationLabel"), row.iri("organization")) {
            (Some(label), _) => label.to_string(),
            (None, Some(node)) => crate::model::types::local_name(node.as_str()).to_string(),
            (None, None) => continue,
        };
        groups.entry(label).or_default().insert(code);
    }

    debug!(
        "Expanded {} organizations into {} groups",
        orgs.len(),
        groups.len()
    );
    Ok(groups)
}

/// Every country appearing in `groups` except `exclude`
pub fn unique_members(groups: &GroupedMembership, exclude: &CountryCode) -> BTreeSet<CountryCode> {
    groups
        .values()
        .flatten()
        .filter(|code| *code != exclude)
        .cloned()
        .collect()
}
