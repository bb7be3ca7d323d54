//! Organization-type category counts

use crate::catalog::{categorize_type, CategoryLabel};
use crate::model::{OrganizationRef, OrganizationTypeRef};
use crate::sparql::{SparqlEndpoint, SparqlResult, WikidataQueries};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Occurrences per category
///
/// Serializes as a JSON object in first-seen order, e.g.
/// `{"General International Orgs": 2, "Uncategorized": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCounts {
    counts: IndexMap<CategoryLabel, usize>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: CategoryLabel) {
        *self.counts.entry(label).or_insert(0) += 1;
    }

    pub fn get(&self, label: CategoryLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Sum of all counts, equal to the number of categorized types
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryLabel, usize)> + '_ {
        self.counts.iter().map(|(label, count)| (*label, *count))
    }

    /// Categories by descending count; ties keep first-seen order
    pub fn sorted(&self) -> Vec<(CategoryLabel, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Count each type occurrence under its category
///
/// Unknown types land in [`CategoryLabel::Uncategorized`], so the total
/// always equals the number of inputs.
pub fn categorize<I, T>(types: I) -> CategoryCounts
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut counts = CategoryCounts::new();
    for type_id in types {
        counts.add(categorize_type(type_id.as_ref()));
    }
    counts
}

/// Type of each organization in `orgs`, one entry per distinct
/// (organization, type) pair
///
/// An empty input issues no query.
pub async fn membership_types<'a, I>(
    endpoint: &dyn SparqlEndpoint,
    queries: &WikidataQueries,
    orgs: I,
) -> SparqlResult<Vec<OrganizationTypeRef>>
where
    I: IntoIterator<Item = &'a OrganizationRef>,
{
    let orgs: Vec<&OrganizationRef> = orgs.into_iter().collect();
    if orgs.is_empty() {
        return Ok(Vec::new());
    }

    let query = queries.membership_types(orgs.iter().copied())?;
    let types = endpoint
        .select(&query)
        .await?
        .filter_map(|row| row.iri("type").map(|node| OrganizationTypeRef::new(node.as_str())))
        .collect();
    Ok(types)
}
