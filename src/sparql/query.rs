//! SPARQL query construction for the Wikidata endpoint

use super::{SparqlError, SparqlResult};
use crate::catalog::COUNTRY_CODES;
use crate::model::{CountryCode, OrganizationRef, OrganizationTypeRef};
use std::fmt::Write;

/// Prefixes predeclared by Wikidata; spelled out so queries parse anywhere
const PREFIXES: &str = "\
PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX p: <http://www.wikidata.org/prop/>
PREFIX ps: <http://www.wikidata.org/prop/statement/>
PREFIX pq: <http://www.wikidata.org/prop/qualifier/>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX bd: <http://www.bigdata.com/rdf#>
";

/// What a query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Current memberships of one country
    Memberships,
    /// Member countries of a batch of organizations, with labels
    CoMembers,
    /// `instance of` classes of a batch of organizations
    MembershipTypes,
    /// Population, HDI and GDP for the census
    CountryStats,
    /// Current member countries of a single organization
    TreatyMembers,
    /// A country's current memberships of one organization type
    MembershipsOfType,
    /// Caller-supplied text
    Custom,
}

impl QueryKind {
    pub fn tag(&self) -> &'static str {
        match self {
            QueryKind::Memberships => "memberships",
            QueryKind::CoMembers => "co-members",
            QueryKind::MembershipTypes => "membership-types",
            QueryKind::CountryStats => "country-stats",
            QueryKind::TreatyMembers => "treaty-members",
            QueryKind::MembershipsOfType => "memberships-of-type",
            QueryKind::Custom => "custom",
        }
    }
}

/// A syntactically valid SPARQL query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    kind: QueryKind,
    text: String,
}

impl SparqlQuery {
    /// Validate `text` and wrap it
    pub fn new(kind: QueryKind, text: impl Into<String>) -> SparqlResult<Self> {
        let text = text.into();
        spargebra::Query::parse(&text, None)
            .map_err(|e| SparqlError::Syntax(format!("{} query: {}", kind.tag(), e)))?;
        Ok(Self { kind, text })
    }

    pub fn custom(text: impl Into<String>) -> SparqlResult<Self> {
        Self::new(QueryKind::Custom, text)
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Builds the queries the pipeline issues against Wikidata
#[derive(Debug, Clone)]
pub struct WikidataQueries {
    language: String,
}

impl WikidataQueries {
    /// `language` is handed to the label service, e.g. `"en"` or
    /// `"[AUTO_LANGUAGE],en"`
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn label_service(&self) -> String {
        format!(
            "  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{}\" . }}\n",
            self.language.replace(['"', '\\'], "")
        )
    }

    fn build(&self, kind: QueryKind, body: &str) -> SparqlResult<SparqlQuery> {
        SparqlQuery::new(kind, format!("#treatymap:{}\n{}{}", kind.tag(), PREFIXES, body))
    }

    /// Organizations the country currently belongs to (no end date)
    pub fn memberships(&self, country: &CountryCode) -> SparqlResult<SparqlQuery> {
        let body = format!(
            "SELECT DISTINCT ?organization WHERE {{
  ?country wdt:P298 \"{code}\" ;
           p:P463 ?statement .
  ?statement ps:P463 ?organization .
  FILTER NOT EXISTS {{ ?statement pq:P582 ?endTime }}
  FILTER NOT EXISTS {{ ?statement wikibase:rank wikibase:DeprecatedRank }}
}}
",
            code = country.as_str()
        );
        self.build(QueryKind::Memberships, &body)
    }

    /// Every sovereign state that is a current member of one of `orgs`
    pub fn co_members<'a, I>(&self, orgs: I) -> SparqlResult<SparqlQuery>
    where
        I: IntoIterator<Item = &'a OrganizationRef>,
    {
        let body = format!(
            "SELECT ?organization ?organizationLabel ?isoCode WHERE {{
  VALUES ?organization {{ {values} }}
  ?country p:P463 ?statement .
  ?statement ps:P463 ?organization .
  FILTER NOT EXISTS {{ ?statement pq:P582 ?endTime }}
  FILTER NOT EXISTS {{ ?statement wikibase:rank wikibase:DeprecatedRank }}
  ?country wdt:P31 wd:Q6256 ;
           wdt:P298 ?isoCode .
{labels}}}
",
            values = iri_values(orgs),
            labels = self.label_service()
        );
        self.build(QueryKind::CoMembers, &body)
    }

    /// Distinct (organization, type) pairs for `orgs`
    pub fn membership_types<'a, I>(&self, orgs: I) -> SparqlResult<SparqlQuery>
    where
        I: IntoIterator<Item = &'a OrganizationRef>,
    {
        let body = format!(
            "SELECT DISTINCT ?organization ?type WHERE {{
  VALUES ?organization {{ {values} }}
  ?organization wdt:P31 ?type .
}}
",
            values = iri_values(orgs)
        );
        self.build(QueryKind::MembershipTypes, &body)
    }

    /// Population, HDI, IHDI and latest GDP for every census code
    pub fn country_stats(&self) -> SparqlResult<SparqlQuery> {
        let mut codes = String::new();
        for (i, code) in COUNTRY_CODES.iter().enumerate() {
            if i > 0 {
                codes.push(if i % 16 == 0 { '\n' } else { ' ' });
            }
            let _ = write!(codes, "\"{}\"", code);
        }

        let body = format!(
            "SELECT ?country ?countryLabel ?isoCode ?population ?ihdi ?hdi ?gdp ?gdpYear WHERE {{
  VALUES ?isoCode {{
{codes}
  }}
  ?country wdt:P298 ?isoCode .
  OPTIONAL {{
    ?country p:P1082 ?popStatement .
    ?popStatement ps:P1082 ?population ;
                  wikibase:rank wikibase:PreferredRank .
  }}
  OPTIONAL {{
    ?country p:P11593 ?ihdiStatement .
    ?ihdiStatement ps:P11593 ?ihdi ;
                   wikibase:rank wikibase:PreferredRank .
  }}
  OPTIONAL {{
    ?country p:P1081 ?hdiStatement .
    ?hdiStatement ps:P1081 ?hdi ;
                  wikibase:rank wikibase:PreferredRank .
  }}
  OPTIONAL {{
    {{
      SELECT ?country (MAX(?gdpDate) AS ?latestGdpDate) WHERE {{
        ?country p:P2131 ?gdpStmt .
        ?gdpStmt pq:P585 ?gdpDate .
      }}
      GROUP BY ?country
    }}
    ?country p:P2131 ?gdpStmt .
    ?gdpStmt ps:P2131 ?gdp ;
             pq:P585 ?gdpYear .
    FILTER(?gdpYear = ?latestGdpDate)
  }}
{labels}}}
",
            labels = self.label_service()
        );
        self.build(QueryKind::CountryStats, &body)
    }

    /// Current member countries of one organization, ordered by code
    pub fn treaty_members(&self, org: &OrganizationRef) -> SparqlResult<SparqlQuery> {
        let body = format!(
            "SELECT DISTINCT ?isoCode WHERE {{
  ?country wdt:P298 ?isoCode ;
           p:P463 ?statement .
  ?statement ps:P463 <{org}> .
  FILTER NOT EXISTS {{ ?statement pq:P582 ?endTime }}
  FILTER NOT EXISTS {{ ?statement wikibase:rank wikibase:DeprecatedRank }}
}}
ORDER BY ?isoCode
",
            org = org.as_str()
        );
        self.build(QueryKind::TreatyMembers, &body)
    }

    /// The country's current memberships whose type is `org_type`
    pub fn memberships_of_type(
        &self,
        country: &CountryCode,
        org_type: &OrganizationTypeRef,
    ) -> SparqlResult<SparqlQuery> {
        if !is_entity_id(org_type.as_str()) {
            return Err(SparqlError::Syntax(format!(
                "not a Wikidata item id: {}",
                org_type
            )));
        }

        let body = format!(
            "SELECT DISTINCT ?organization ?organizationLabel WHERE {{
  ?country wdt:P298 \"{code}\" ;
           p:P463 ?statement .
  ?statement ps:P463 ?organization .
  FILTER NOT EXISTS {{ ?statement pq:P582 ?endTime }}
  FILTER NOT EXISTS {{ ?statement wikibase:rank wikibase:DeprecatedRank }}
  ?organization wdt:P31 wd:{org_type} .
{labels}}}
ORDER BY ?organizationLabel
",
            code = country.as_str(),
            org_type = org_type.as_str(),
            labels = self.label_service()
        );
        self.build(QueryKind::MembershipsOfType, &body)
    }
}

impl Default for WikidataQueries {
    fn default() -> Self {
        Self::new("en")
    }
}

fn iri_values<'a, I>(orgs: I) -> String
where
    I: IntoIterator<Item = &'a OrganizationRef>,
{
    orgs.into_iter()
        .map(|org| format!("<{}>", org.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_entity_id(id: &str) -> bool {
    id.len() > 1
        && id.starts_with('Q')
        && id[1..].bytes().all(|b| b.is_ascii_digit())
}
