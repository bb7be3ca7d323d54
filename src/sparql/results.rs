//! SPARQL 1.1 JSON results parsing
//!
//! Only the tabular shape is accepted:
//! `{ "head": { "vars": [...] }, "results": { "bindings": [ { var: term } ] } }`.

use super::{SparqlError, SparqlResult};
use oxrdf::{NamedNode, Term};
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};
use std::collections::HashMap;

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    pub bindings: HashMap<String, Term>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: impl Into<Term>) {
        self.bindings.insert(variable.into(), term.into());
    }

    /// IRI string, blank node id or literal lexical form
    #[allow(unreachable_patterns)]
    pub fn value(&self, variable: &str) -> Option<&str> {
        match self.get(variable)? {
            Term::NamedNode(node) => Some(node.as_str()),
            Term::BlankNode(node) => Some(node.as_str()),
            Term::Literal(literal) => Some(literal.value()),
            _ => None,
        }
    }

    /// The binding if it is an IRI
    pub fn iri(&self, variable: &str) -> Option<&NamedNode> {
        match self.get(variable)? {
            Term::NamedNode(node) => Some(node),
            _ => None,
        }
    }

    /// Numeric value of a literal binding
    ///
    /// Wikidata returns quantities as `xsd:decimal` lexical forms (with an
    /// optional leading `+`), which `f64` parsing handles directly.
    pub fn number(&self, variable: &str) -> Option<f64> {
        match self.get(variable)? {
            Term::Literal(literal) => literal
                .value()
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

/// One-shot sequence of solutions returned by a SELECT query
#[derive(Debug)]
pub struct Solutions {
    variables: Vec<String>,
    rows: std::vec::IntoIter<QuerySolution>,
}

impl Solutions {
    pub fn new(variables: Vec<String>, rows: Vec<QuerySolution>) -> Self {
        Self {
            variables,
            rows: rows.into_iter(),
        }
    }

    /// Create empty solutions
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Variables declared in the response head
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

impl Iterator for Solutions {
    type Item = QuerySolution;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Solutions {}

/// Parse a SPARQL JSON results document
///
/// Every row is decoded up front, so a malformed term anywhere in the
/// document fails the whole call.
pub fn parse_results(body: &[u8]) -> SparqlResult<Solutions> {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
    let reader = match parser.for_reader(body) {
        Ok(ReaderQueryResultsParserOutput::Solutions(reader)) => reader,
        Ok(ReaderQueryResultsParserOutput::Boolean(_)) => {
            return Err(SparqlError::Parse(
                "expected SELECT bindings, got a boolean result".to_string(),
            ))
        }
        Err(e) => return Err(SparqlError::Parse(format!("unexpected results document: {}", e))),
    };

    let variables: Vec<String> = reader.variables().iter().map(|v| v.as_str().to_string()).collect();
    let mut rows = Vec::new();
    for solution in reader {
        let solution = solution.map_err(|e| SparqlError::Parse(format!("invalid binding: {}", e)))?;
        let mut row = QuerySolution::new();
        for (variable, term) in solution.iter() {
            row.bind(variable.as_str(), term.clone());
        }
        rows.push(row);
    }

    Ok(Solutions::new(variables, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKIDATA_SAMPLE: &str = r#"{
      "head": { "vars": ["organization", "organizationLabel", "isoCode", "population"] },
      "results": { "bindings": [
        {
          "organization": { "type": "uri", "value": "http://www.wikidata.org/entity/Q7159" },
          "organizationLabel": { "xml:lang": "en", "type": "literal", "value": "African Union" },
          "isoCode": { "type": "literal", "value": "GHA" },
          "population": { "datatype": "http://www.w3.org/2001/XMLSchema#decimal", "type": "literal", "value": "+33475870" }
        }
      ] }
    }"#;

    #[test]
    fn test_parse_wikidata_bindings() {
        let mut solutions = parse_results(WIKIDATA_SAMPLE.as_bytes()).unwrap();
        assert_eq!(solutions.variables().len(), 4);
        assert_eq!(solutions.len(), 1);

        let row = solutions.next().unwrap();
        assert_eq!(
            row.iri("organization").map(|n| n.as_str()),
            Some("http://www.wikidata.org/entity/Q7159")
        );
        assert_eq!(row.value("organizationLabel"), Some("African Union"));
        assert_eq!(row.value("isoCode"), Some("GHA"));
        assert_eq!(row.number("population"), Some(33475870.0));
        assert!(row.iri("isoCode").is_none());
        assert!(row.value("missing").is_none());

        // one-shot
        assert!(solutions.next().is_none());
    }

    #[test]
    fn test_missing_bindings_is_parse_error() {
        let err = parse_results(br#"{"head": {}, "boolean": true}"#).unwrap_err();
        assert!(matches!(err, SparqlError::Parse(_)));

        let err = parse_results(b"<html>Rate limited</html>").unwrap_err();
        assert!(matches!(err, SparqlError::Parse(_)));
    }

    #[test]
    fn test_empty_bindings() {
        let solutions = parse_results(br#"{"head": {"vars": ["x"]}, "results": {"bindings": []}}"#).unwrap();
        assert_eq!(solutions.variables(), ["x".to_string()]);
        assert_eq!(solutions.count(), 0);
    }

    #[test]
    fn test_bad_term_is_parse_error() {
        let body = br#"{"head": {"vars": ["x"]}, "results": {"bindings": [{"x": {"type": "uri", "value": "not an iri"}}]}}"#;
        assert!(matches!(parse_results(body), Err(SparqlError::Parse(_))));

        let body = br#"{"head": {"vars": ["x"]}, "results": {"bindings": [{"x": {"type": "number", "value": "1"}}]}}"#;
        assert!(matches!(parse_results(body), Err(SparqlError::Parse(_))));
    }

    #[test]
    fn test_bnode_and_typed_literal() {
        let body = br#"{"head": {"vars": ["b", "d"]}, "results": {"bindings": [{
            "b": {"type": "bnode", "value": "b0"},
            "d": {"type": "literal", "value": "2023-01-01T00:00:00Z", "datatype": "http://www.w3.org/2001/XMLSchema#dateTime"}
        }]}}"#;
        let row = parse_results(body).unwrap().next().unwrap();
        assert!(matches!(row.get("b"), Some(Term::BlankNode(_))));
        assert_eq!(row.value("d"), Some("2023-01-01T00:00:00Z"));
        assert!(row.number("d").is_none());
    }
}
