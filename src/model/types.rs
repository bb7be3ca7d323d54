//! Core identifiers shared by every pipeline stage

use oxrdf::NamedNode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Not a three-letter ISO 3166-1 alpha-3 code
    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    /// Not an absolute IRI
    #[error("Invalid organization IRI: {0}")]
    InvalidOrganization(String),

    /// Neither a positive count nor "all"
    #[error("Invalid member limit: {0:?}")]
    InvalidMemberLimit(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// ISO 3166-1 alpha-3 country code (e.g., "NGA")
///
/// Always three ASCII uppercase letters. Parsing trims whitespace and
/// uppercases, so `"nga"` and `" NGA "` name the same country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> ModelResult<Self> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.len() == 3 && normalized.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(CountryCode(normalized))
        } else {
            Err(ModelError::InvalidCountryCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryCode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CountryCode::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        CountryCode::new(&s)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl PartialEq<&str> for CountryCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque identifier of a treaty or organization in the knowledge graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationRef(NamedNode);

impl OrganizationRef {
    pub fn new(iri: impl Into<String>) -> ModelResult<Self> {
        let iri = iri.into();
        NamedNode::new(iri.as_str())
            .map(OrganizationRef)
            .map_err(|_| ModelError::InvalidOrganization(iri))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_named_node(&self) -> &NamedNode {
        &self.0
    }

    /// Last path segment of the IRI, e.g. `Q7159` for an entity IRI
    pub fn local_name(&self) -> &str {
        local_name(self.0.as_str())
    }
}

impl From<NamedNode> for OrganizationRef {
    fn from(node: NamedNode) -> Self {
        OrganizationRef(node)
    }
}

impl TryFrom<String> for OrganizationRef {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        OrganizationRef::new(s)
    }
}

impl From<OrganizationRef> for String {
    fn from(org: OrganizationRef) -> Self {
        org.0.into_string()
    }
}

impl fmt::Display for OrganizationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

/// Organization-type identifier (a bare Q-id such as `Q1127126`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationTypeRef(String);

impl OrganizationTypeRef {
    /// Accepts a bare Q-id or a full entity IRI
    pub fn new(id: &str) -> Self {
        OrganizationTypeRef(local_name(id.trim()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrganizationTypeRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrganizationTypeRef {
    fn from(s: &str) -> Self {
        OrganizationTypeRef::new(s)
    }
}

/// Upper bound on declared member count used by the treaty filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberLimit {
    /// Keep organizations with strictly fewer members
    Below(u64),
    /// No filtering
    Unlimited,
}

impl MemberLimit {
    /// Slider presets offered by the front end
    pub const PRESETS: [MemberLimit; 8] = [
        MemberLimit::Below(5),
        MemberLimit::Below(10),
        MemberLimit::Below(30),
        MemberLimit::Below(50),
        MemberLimit::Below(70),
        MemberLimit::Below(100),
        MemberLimit::Below(150),
        MemberLimit::Unlimited,
    ];

    pub fn admits(&self, member_count: u64) -> bool {
        match self {
            MemberLimit::Below(max) => member_count < *max,
            MemberLimit::Unlimited => true,
        }
    }
}

impl Default for MemberLimit {
    fn default() -> Self {
        MemberLimit::Below(30)
    }
}

impl fmt::Display for MemberLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberLimit::Below(max) => write!(f, "{}", max),
            MemberLimit::Unlimited => write!(f, "All"),
        }
    }
}

impl FromStr for MemberLimit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "all" | "inf" | "infinity" | "unlimited" => Ok(MemberLimit::Unlimited),
            other => other
                .parse::<u64>()
                .map(MemberLimit::Below)
                .map_err(|_| ModelError::InvalidMemberLimit(s.to_string())),
        }
    }
}

impl Serialize for MemberLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MemberLimit::Below(max) => serializer.serialize_u64(*max),
            MemberLimit::Unlimited => serializer.serialize_str("all"),
        }
    }
}

impl<'de> Deserialize<'de> for MemberLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(max) => Ok(MemberLimit::Below(max)),
            Raw::Word(word) => word.parse().map_err(serde::de::Error::custom),
        }
    }
}

pub(crate) fn local_name(iri: &str) -> &str {
    iri.rsplit(['/', '#']).next().unwrap_or(iri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_normalizes() {
        let code = CountryCode::new(" nga ").unwrap();
        assert_eq!(code.as_str(), "NGA");
        assert_eq!(code, "NGA");
    }

    #[test]
    fn test_country_code_rejects_bad_input() {
        assert!(CountryCode::new("NG").is_err());
        assert!(CountryCode::new("NGAA").is_err());
        assert!(CountryCode::new("N1A").is_err());
        assert!(CountryCode::new("").is_err());
        assert!("ÑGA".parse::<CountryCode>().is_err());
    }

    #[test]
    fn test_organization_ref() {
        let org = OrganizationRef::new("http://www.wikidata.org/entity/Q7159").unwrap();
        assert_eq!(org.local_name(), "Q7159");
        assert!(OrganizationRef::new("not an iri").is_err());
    }

    #[test]
    fn test_type_ref_from_iri() {
        let t = OrganizationTypeRef::new("http://www.wikidata.org/entity/Q1127126");
        assert_eq!(t.as_str(), "Q1127126");
        assert_eq!(OrganizationTypeRef::new("Q43229").as_str(), "Q43229");
    }

    #[test]
    fn test_member_limit() {
        assert!(MemberLimit::Below(100).admits(54));
        assert!(!MemberLimit::Below(100).admits(100));
        assert!(MemberLimit::Unlimited.admits(u64::MAX));
        assert_eq!("all".parse::<MemberLimit>().unwrap(), MemberLimit::Unlimited);
        assert_eq!("30".parse::<MemberLimit>().unwrap(), MemberLimit::Below(30));
        assert!("-3".parse::<MemberLimit>().is_err());
        assert_eq!(MemberLimit::default(), MemberLimit::PRESETS[2]);
    }

    #[test]
    fn test_member_limit_serde() {
        assert_eq!(serde_json::to_string(&MemberLimit::Below(50)).unwrap(), "50");
        assert_eq!(serde_json::to_string(&MemberLimit::Unlimited).unwrap(), "\"all\"");
        let parsed: MemberLimit = serde_json::from_str("\"infinity\"").unwrap();
        assert_eq!(parsed, MemberLimit::Unlimited);
        let parsed: MemberLimit = serde_json::from_str("10").unwrap();
        assert_eq!(parsed, MemberLimit::Below(10));
    }

    #[test]
    fn test_country_code_serde() {
        let code: CountryCode = serde_json::from_str("\"gha\"").unwrap();
        assert_eq!(code.as_str(), "GHA");
        assert!(serde_json::from_str::<CountryCode>("\"Ghana\"").is_err());
    }
}
