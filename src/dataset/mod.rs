//! Local membership-size table
//!
//! A bundled JSON dataset declaring how many members each organization has:
//!
//! ```json
//! [
//!   { "organization": "http://www.wikidata.org/entity/Q7159", "memberCount": "55" },
//!   { "organization": "http://www.wikidata.org/entity/Q1065", "memberCount": 193 }
//! ]
//! ```
//!
//! `memberCount` may be a string or a number. Counts that do not start with
//! a digit are kept as unknown, which the treaty filter treats like a
//! missing entry.

use crate::model::OrganizationRef;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Dataset errors
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid dataset: {0}")]
    Format(#[from] serde_json::Error),
}

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    organization: String,
    member_count: Option<RawCount>,
}

/// Organization IRI → declared member count
#[derive(Debug, Clone, Default)]
pub struct MembershipSizeTable {
    counts: IndexMap<OrganizationRef, Option<u64>>,
}

impl MembershipSizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the dataset document
    pub fn from_json(text: &str) -> DatasetResult<Self> {
        let entries: Vec<RawEntry> = serde_json::from_str(text)?;
        let mut table = Self::new();

        for entry in entries {
            let org = match OrganizationRef::new(entry.organization.trim()) {
                Ok(org) => org,
                Err(e) => {
                    warn!("Skipping dataset entry: {}", e);
                    continue;
                }
            };
            let count = entry.member_count.and_then(|raw| match raw {
                RawCount::Number(n) if n.is_finite() && n >= 0.0 => Some(n.trunc() as u64),
                RawCount::Number(_) => None,
                RawCount::Text(text) => leading_integer(&text),
            });
            // first entry wins, matching a linear scan of the array
            table.counts.entry(org).or_insert(count);
        }

        Ok(table)
    }

    /// Read and parse the dataset file
    pub async fn load(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DatasetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let table = Self::from_json(&text)?;
        info!("Loaded {} organizations from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn insert(&mut self, org: OrganizationRef, member_count: u64) {
        self.counts.insert(org, Some(member_count));
    }

    /// Declared member count; `None` when absent or unparseable
    pub fn member_count(&self, org: &OrganizationRef) -> Option<u64> {
        self.counts.get(org).copied().flatten()
    }

    pub fn contains(&self, org: &OrganizationRef) -> bool {
        self.counts.contains_key(org)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Integer prefix of `text` after leading whitespace and an optional `+`
/// ("54 members" → 54, "+55" → 55)
fn leading_integer(text: &str) -> Option<u64> {
    let trimmed = text.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, c)| i + c.len_utf8())?;
    trimmed[..digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(qid: &str) -> OrganizationRef {
        OrganizationRef::new(format!("http://www.wikidata.org/entity/{}", qid)).unwrap()
    }

    #[test]
    fn test_string_and_number_counts() {
        let table = MembershipSizeTable::from_json(
            r#"[
                {"organization": "http://www.wikidata.org/entity/Q7159", "memberCount": "55"},
                {"organization": "http://www.wikidata.org/entity/Q1065", "memberCount": 193},
                {"organization": "http://www.wikidata.org/entity/Q161549", "memberCount": "15 states"},
                {"organization": "http://www.wikidata.org/entity/Q7184", "memberCount": "unknown"},
                {"organization": "http://www.wikidata.org/entity/Q7785"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.member_count(&org("Q7159")), Some(55));
        assert_eq!(table.member_count(&org("Q1065")), Some(193));
        assert_eq!(table.member_count(&org("Q161549")), Some(15));
        assert_eq!(table.member_count(&org("Q7184")), None);
        assert!(table.contains(&org("Q7184")));
        assert_eq!(table.member_count(&org("Q7785")), None);
        assert!(!table.contains(&org("Q1")));
    }

    #[test]
    fn test_invalid_iri_is_skipped() {
        let table = MembershipSizeTable::from_json(
            r#"[{"organization": "not an iri", "memberCount": 3},
                {"organization": "http://www.wikidata.org/entity/Q8475", "memberCount": 196}]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_first_entry_wins() {
        let table = MembershipSizeTable::from_json(
            r#"[{"organization": "http://www.wikidata.org/entity/Q7159", "memberCount": 55},
                {"organization": "http://www.wikidata.org/entity/Q7159", "memberCount": 2}]"#,
        )
        .unwrap();
        assert_eq!(table.member_count(&org("Q7159")), Some(55));
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            MembershipSizeTable::from_json(r#"{"organization": "x"}"#),
            Err(DatasetError::Format(_))
        ));
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer(" 42"), Some(42));
        assert_eq!(leading_integer("7.5"), Some(7));
        assert_eq!(leading_integer("+55"), Some(55));
        assert_eq!(leading_integer(" +12 states"), Some(12));
        assert_eq!(leading_integer("++3"), None);
        assert_eq!(leading_integer("-4"), None);
        assert_eq!(leading_integer("n/a"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treaty_members.json");
        std::fs::write(
            &path,
            r#"[{"organization": "http://www.wikidata.org/entity/Q7159", "memberCount": "55"}]"#,
        )
        .unwrap();

        let table = MembershipSizeTable::load(&path).await.unwrap();
        assert_eq!(table.member_count(&org("Q7159")), Some(55));

        let missing = MembershipSizeTable::load(dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(DatasetError::Io { .. })));
    }

    #[tokio::test]
    async fn test_bundled_dataset_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/treaty_members.json");
        let table = MembershipSizeTable::load(path).await.unwrap();
        assert!(!table.is_empty());
        assert_eq!(table.member_count(&org("Q7159")), Some(55));
    }
}
