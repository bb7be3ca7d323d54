//! Treaty filter over the local membership-size table

use crate::dataset::MembershipSizeTable;
use crate::model::{MemberLimit, OrganizationRef};
use indexmap::IndexSet;

/// Organizations from `orgs` whose declared member count passes `limit`
///
/// Organizations missing from the table, or whose count is unknown, are
/// dropped even when `limit` is [`MemberLimit::Unlimited`]. The result keeps
/// the input order and is always a subset of `orgs`.
pub fn filter_by_size<'a, I>(
    orgs: I,
    table: &MembershipSizeTable,
    limit: MemberLimit,
) -> IndexSet<OrganizationRef>
where
    I: IntoIterator<Item = &'a OrganizationRef>,
{
    orgs.into_iter()
        .filter(|org| {
            table
                .member_count(org)
                .map_or(false, |count| limit.admits(count))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(qid: &str) -> OrganizationRef {
        OrganizationRef::new(format!("http://www.wikidata.org/entity/{}", qid)).unwrap()
    }

    fn table() -> MembershipSizeTable {
        let mut table = MembershipSizeTable::new();
        table.insert(org("Q7159"), 54);
        table.insert(org("Q1065"), 193);
        table.insert(org("Q161549"), 15);
        table
    }

    #[test]
    fn test_strictly_below_limit() {
        let orgs = vec![org("Q7159"), org("Q1065")];
        let kept = filter_by_size(&orgs, &table(), MemberLimit::Below(100));
        assert_eq!(kept.into_iter().collect::<Vec<_>>(), vec![org("Q7159")]);

        let kept = filter_by_size(&orgs, &table(), MemberLimit::Below(54));
        assert!(kept.is_empty());
    }

    #[test]
    fn test_unlimited_keeps_only_known_orgs() {
        let orgs = vec![org("Q7159"), org("Q999"), org("Q1065")];
        let kept = filter_by_size(&orgs, &table(), MemberLimit::Unlimited);
        assert_eq!(kept.len(), 2);
        assert!(!kept.contains(&org("Q999")));
    }

    #[test]
    fn test_output_is_subset_for_every_preset() {
        let table = table();
        let orgs = vec![org("Q7159"), org("Q1065"), org("Q161549"), org("Q42")];
        for limit in MemberLimit::PRESETS {
            let kept = filter_by_size(&orgs, &table, limit);
            for o in &kept {
                assert!(orgs.contains(o));
                let count = table.member_count(o).unwrap();
                assert!(limit.admits(count));
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let none: Vec<OrganizationRef> = Vec::new();
        assert!(filter_by_size(&none, &table(), MemberLimit::Unlimited).is_empty());
    }
}
