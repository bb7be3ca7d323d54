//! End-to-end pipeline tests against canned SPARQL responses
//!
//! Exercises resolver → treaty filter → co-member expander → category
//! aggregator through the public API, with the bundled membership-size
//! dataset.

use indexmap::IndexSet;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use treatymap::pipeline::{expand, filter_by_size, resolve_memberships, unique_members};
use treatymap::sparql::fixtures::*;
use treatymap::*;

fn code(c: &str) -> CountryCode {
    CountryCode::new(c).unwrap()
}

fn org(qid: &str) -> OrganizationRef {
    OrganizationRef::new(entity(qid)).unwrap()
}

fn bundled_dataset() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/treaty_members.json")
}

fn co_member_row(qid: &str, name: &str, iso: &str) -> serde_json::Value {
    json!({
        "organization": uri(&entity(qid)),
        "organizationLabel": label(name),
        "isoCode": literal(iso),
    })
}

#[tokio::test]
async fn test_nigeria_scenario() {
    // African Union (54 members) passes a limit of 100, the UN (193) does not
    let mut sizes = MembershipSizeTable::new();
    sizes.insert(org("Q7159"), 54);
    sizes.insert(org("Q1065"), 193);

    let endpoint = MemoryEndpoint::new()
        .respond(
            QueryKind::Memberships,
            results(
                &["organization"],
                vec![
                    json!({ "organization": uri(&entity("Q7159")) }),
                    json!({ "organization": uri(&entity("Q1065")) }),
                ],
            ),
        )
        .respond(
            QueryKind::CoMembers,
            results(
                &["organization", "organizationLabel", "isoCode"],
                vec![
                    co_member_row("Q7159", "African Union", "NGA"),
                    co_member_row("Q7159", "African Union", "GHA"),
                    co_member_row("Q7159", "African Union", "KEN"),
                ],
            ),
        );
    let queries = WikidataQueries::default();

    let memberships = resolve_memberships(&endpoint, &queries, &code("NGA"))
        .await
        .unwrap();
    assert_eq!(memberships.len(), 2);

    let treaties = filter_by_size(&memberships, &sizes, MemberLimit::Below(100));
    assert_eq!(treaties.iter().collect::<Vec<_>>(), vec![&org("Q7159")]);

    let groups = expand(&endpoint, &queries, &treaties).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups["African Union"],
        IndexSet::from([code("NGA"), code("GHA"), code("KEN")])
    );

    let co_members: Vec<CountryCode> = unique_members(&groups, &code("NGA")).into_iter().collect();
    assert_eq!(co_members, vec![code("GHA"), code("KEN")]);
}

#[tokio::test]
async fn test_labels_survive_batched_expansion() {
    let organizations = [
        ("Q7159", "African Union", "NGA"),
        ("Q7184", "NATO", "FRA"),
        ("Q458", "European Union", "DEU"),
        ("Q7785", "Commonwealth of Nations", "GHA"),
        ("Q7172", "Arab League", "EGY"),
    ];

    let rows = organizations
        .iter()
        .map(|(qid, name, iso)| co_member_row(qid, name, iso))
        .collect();
    let endpoint = MemoryEndpoint::new().respond(
        QueryKind::CoMembers,
        results(&["organization", "organizationLabel", "isoCode"], rows),
    );

    let orgs: Vec<OrganizationRef> = organizations.iter().map(|(qid, _, _)| org(qid)).collect();
    let groups = expand(&endpoint, &WikidataQueries::default(), &orgs)
        .await
        .unwrap();

    let labels: IndexSet<&str> = groups.keys().map(String::as_str).collect();
    let expected: IndexSet<&str> = organizations.iter().map(|(_, name, _)| *name).collect();
    assert_eq!(labels, expected);

    // one batched query for every organization
    assert_eq!(endpoint.call_count(), 1);
    let sent = endpoint.received();
    for org in &orgs {
        assert!(sent[0].as_str().contains(org.as_str()));
    }
}

#[tokio::test]
async fn test_session_with_bundled_dataset() {
    let endpoint = Arc::new(
        MemoryEndpoint::new()
            .respond(
                QueryKind::CountryStats,
                results(
                    &["isoCode", "countryLabel", "population", "gdp"],
                    vec![
                        json!({ "isoCode": literal("NGA"), "countryLabel": label("Nigeria"),
                                "population": decimal("223800000"), "gdp": decimal("477386000000") }),
                        json!({ "isoCode": literal("GHA"), "countryLabel": label("Ghana"),
                                "population": decimal("33475870"), "gdp": decimal("72839000000") }),
                        json!({ "isoCode": literal("KEN"), "countryLabel": label("Kenya"),
                                "population": decimal("55100000") }),
                    ],
                ),
            )
            .respond(
                QueryKind::Memberships,
                results(
                    &["organization"],
                    vec![
                        json!({ "organization": uri(&entity("Q7159")) }),
                        json!({ "organization": uri(&entity("Q1065")) }),
                        json!({ "organization": uri(&entity("Q8475")) }),
                    ],
                ),
            )
            .respond(
                QueryKind::CoMembers,
                results(
                    &["organization", "organizationLabel", "isoCode"],
                    vec![
                        co_member_row("Q7159", "African Union", "NGA"),
                        co_member_row("Q7159", "African Union", "GHA"),
                        co_member_row("Q7159", "African Union", "KEN"),
                    ],
                ),
            )
            .respond(
                QueryKind::MembershipTypes,
                results(
                    &["organization", "type"],
                    vec![
                        json!({ "organization": uri(&entity("Q7159")), "type": uri(&entity("Q1335818")) }),
                        json!({ "organization": uri(&entity("Q7159")), "type": uri(&entity("Q9999999")) }),
                    ],
                ),
            ),
    );

    let pipeline = Pipeline::new(endpoint.clone(), WikidataQueries::default());
    let loader = ReferenceLoader::new(bundled_dataset(), pipeline.clone());
    let session = Session::new(pipeline, loader);

    let selection = session
        .select(code("NGA"), MemberLimit::Below(100))
        .await
        .unwrap();
    let report = &selection.report;

    assert_eq!(selection.generation, 1);
    assert_eq!(report.organizations, vec![org("Q7159")]);
    assert_eq!(report.treaties.len(), 1);
    assert_eq!(report.treaties[0].member_count, 3);
    assert_eq!(report.categories.total(), 2);
    assert_eq!(report.categories.get(CategoryLabel::Intergovernmental), 1);
    assert_eq!(report.categories.get(CategoryLabel::Uncategorized), 1);

    assert_eq!(report.stats.len(), 3);
    assert_eq!(report.gdp_chart.len(), 2);
    assert!(report.gdp_chart[0].highlight);
    assert_eq!(report.population_chart[0].full_name, "Nigeria");

    // statistics were fetched once, during reference loading
    assert_eq!(endpoint.calls_of(QueryKind::CountryStats), 1);
    session.select(code("GHA"), MemberLimit::Unlimited).await.unwrap();
    assert_eq!(endpoint.calls_of(QueryKind::CountryStats), 1);
}

#[tokio::test]
async fn test_unlimited_keeps_every_known_membership() {
    let sizes = MembershipSizeTable::load(bundled_dataset()).await.unwrap();
    let memberships = vec![org("Q7159"), org("Q1065"), org("Q8475"), org("Q424242")];

    let kept = filter_by_size(&memberships, &sizes, MemberLimit::Unlimited);
    assert_eq!(kept.len(), 3);
    assert!(!kept.contains(&org("Q424242")));

    let kept = filter_by_size(&memberships, &sizes, MemberLimit::Below(5));
    assert!(kept.is_empty());
}
