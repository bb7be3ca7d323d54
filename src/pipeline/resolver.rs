//! Membership lookups: a country's current organizations, the members of
//! one organization, and memberships of a given organization type

use crate::model::{CountryCode, OrganizationRef, OrganizationTypeRef};
use crate::sparql::{SparqlEndpoint, SparqlResult, WikidataQueries};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Organization with its human-readable label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledOrganization {
    pub organization: OrganizationRef,
    pub label: String,
}

/// Organizations `country` currently belongs to
///
/// Memberships with an end date are excluded. An unknown country yields an
/// empty set.
pub async fn resolve_memberships(
    endpoint: &dyn SparqlEndpoint,
    queries: &WikidataQueries,
    country: &CountryCode,
) -> SparqlResult<IndexSet<OrganizationRef>> {
    let query = queries.memberships(country)?;
    let orgs: IndexSet<OrganizationRef> = endpoint
        .select(&query)
        .await?
        .filter_map(|row| row.iri("organization").cloned().map(OrganizationRef::from))
        .collect();

    debug!("{} has {} current memberships", country, orgs.len());
    Ok(orgs)
}

/// Current member countries of one organization, ordered by code
pub async fn treaty_members(
    endpoint: &dyn SparqlEndpoint,
    queries: &WikidataQueries,
    org: &OrganizationRef,
) -> SparqlResult<Vec<CountryCode>> {
    let query = queries.treaty_members(org)?;
    let mut members: Vec<CountryCode> = endpoint
        .select(&query)
        .await?
        .filter_map(|row| row.value("isoCode").and_then(|v| CountryCode::new(v).ok()))
        .collect();
    members.sort();
    members.dedup();
    Ok(members)
}

/// The country's current memberships whose organization type is `org_type`
pub async fn memberships_of_type(
    endpoint: &dyn SparqlEndpoint,
    queries: &WikidataQueries,
    country: &CountryCode,
    org_type: &OrganizationTypeRef,
) -> SparqlResult<Vec<LabeledOrganization>> {
    let query = queries.memberships_of_type(country, org_type)?;
    let mut seen = IndexSet::new();
    let mut result = Vec::new();

    for row in endpoint.select(&query).await? {
        let Some(node) = row.iri("organization") else {
            continue;
        };
        let organization = OrganizationRef::from(node.clone());
        if !seen.insert(organization.clone()) {
            continue;
        }
        let label = row
            .value("organizationLabel")
            .unwrap_or_else(|| organization.local_name())
            .to_string();
        result.push(LabeledOrganization {
            organization,
            label,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::fixtures::*;
    use crate::sparql::{MemoryEndpoint, QueryKind};
    use serde_json::json;

    fn code(c: &str) -> CountryCode {
        CountryCode::new(c).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_deduplicates() {
        let endpoint = MemoryEndpoint::new().respond(
            QueryKind::Memberships,
            results(
                &["organization"],
                vec![
                    json!({ "organization": uri(&entity("Q7159")) }),
                    json!({ "organization": uri(&entity("Q1065")) }),
                    json!({ "organization": uri(&entity("Q7159")) }),
                    json!({ "organization": literal("not an iri binding") }),
                ],
            ),
        );

        let orgs = resolve_memberships(&endpoint, &WikidataQueries::default(), &code("NGA"))
            .await
            .unwrap();
        let iris: Vec<&str> = orgs.iter().map(|o| o.as_str()).collect();
        assert_eq!(iris, vec![entity("Q7159"), entity("Q1065")]);
    }

    #[tokio::test]
    async fn test_unknown_country_is_empty() {
        let endpoint = MemoryEndpoint::new();
        let orgs = resolve_memberships(&endpoint, &WikidataQueries::default(), &code("XXX"))
            .await
            .unwrap();
        assert!(orgs.is_empty());
    }

    #[tokio::test]
    async fn test_treaty_members_sorted() {
        let endpoint = MemoryEndpoint::new().respond(
            QueryKind::TreatyMembers,
            results(
                &["isoCode"],
                vec![
                    json!({ "isoCode": literal("KEN") }),
                    json!({ "isoCode": literal("GHA") }),
                    json!({ "isoCode": literal("KEN") }),
                    json!({ "isoCode": literal("1234") }),
                ],
            ),
        );
        let org = OrganizationRef::new(entity("Q7159")).unwrap();
        let members = treaty_members(&endpoint, &WikidataQueries::default(), &org)
            .await
            .unwrap();
        assert_eq!(members, vec![code("GHA"), code("KEN")]);
    }

    #[tokio::test]
    async fn test_memberships_of_type_labels() {
        let endpoint = MemoryEndpoint::new().respond(
            QueryKind::MembershipsOfType,
            results(
                &["organization", "organizationLabel"],
                vec![
                    json!({ "organization": uri(&entity("Q7184")), "organizationLabel": label("NATO") }),
                    json!({ "organization": uri(&entity("Q1")) }),
                ],
            ),
        );
        let found = memberships_of_type(
            &endpoint,
            &WikidataQueries::default(),
            &code("GBR"),
            &OrganizationTypeRef::new("Q1127126"),
        )
        .await
        .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].label, "NATO");
        assert_eq!(found[1].label, "Q1");
        assert!(endpoint.received()[0].as_str().contains("wd:Q1127126"));
    }
}
