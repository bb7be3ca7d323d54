//! Country statistics table
//!
//! Population, HDI/IHDI and latest GDP for the whole census, fetched with a
//! single bulk query and then filtered per selection. Missing figures stay
//! `None`; ranking treats a missing population as zero and leaves countries
//! without GDP out of the GDP series.

use crate::model::CountryCode;
use crate::sparql::{Solutions, SparqlEndpoint, SparqlResult, WikidataQueries};
use chrono::{DateTime, Datelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Longest chart label before truncation
pub const MAX_LABEL_LENGTH: usize = 15;

/// Bars per chart
pub const TOP_N: usize = 10;

/// Statistics of one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryStatRecord {
    pub code: CountryCode,
    pub name: String,
    pub population: Option<u64>,
    pub hdi: Option<f64>,
    pub ihdi: Option<f64>,
    /// Nominal GDP in USD at the latest point in time
    pub gdp: Option<f64>,
    pub gdp_year: Option<i32>,
}

impl CountryStatRecord {
    pub fn new(code: CountryCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            population: None,
            hdi: None,
            ihdi: None,
            gdp: None,
            gdp_year: None,
        }
    }

    /// Fill fields that are still missing from `other`
    fn merge(&mut self, other: CountryStatRecord) {
        self.population = self.population.or(other.population);
        self.hdi = self.hdi.or(other.hdi);
        self.ihdi = self.ihdi.or(other.ihdi);
        if self.gdp.is_none() {
            self.gdp = other.gdp;
            self.gdp_year = other.gdp_year;
        }
    }
}

/// One bar of a ranking chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub full_name: String,
    /// Axis label, truncated to [`MAX_LABEL_LENGTH`] characters
    pub category: String,
    pub value: f64,
    /// Set for the selected country
    pub highlight: bool,
}

/// Census statistics keyed by country code
#[derive(Debug, Clone, Default)]
pub struct CountryStatisticsTable {
    records: IndexMap<CountryCode, CountryStatRecord>,
}

impl CountryStatisticsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the bulk census query
    pub async fn fetch(
        endpoint: &dyn SparqlEndpoint,
        queries: &WikidataQueries,
    ) -> SparqlResult<Self> {
        let query = queries.country_stats()?;
        let solutions = endpoint.select(&query).await?;
        let table = Self::from_solutions(solutions);
        info!("Loaded statistics for {} countries", table.len());
        Ok(table)
    }

    /// Build the table from census query rows
    ///
    /// Several rows for one country (e.g. two preferred population
    /// statements) merge; the first value seen for each field wins.
    pub fn from_solutions(solutions: Solutions) -> Self {
        let mut table = Self::new();

        for row in solutions {
            let Some(code) = row.value("isoCode").and_then(|v| CountryCode::new(v).ok()) else {
                debug!("Skipping statistics row without a valid isoCode");
                continue;
            };

            let name = row
                .value("countryLabel")
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string());
            let record = CountryStatRecord {
                population: row
                    .number("population")
                    .filter(|p| *p >= 0.0)
                    .map(|p| p.trunc() as u64),
                hdi: row.number("hdi"),
                ihdi: row.number("ihdi"),
                gdp: row.number("gdp"),
                gdp_year: row.value("gdpYear").and_then(parse_year),
                ..CountryStatRecord::new(code.clone(), name)
            };

            table.insert(record);
        }

        table
    }

    pub fn insert(&mut self, record: CountryStatRecord) {
        match self.records.get_mut(&record.code) {
            Some(existing) => existing.merge(record),
            None => {
                self.records.insert(record.code.clone(), record);
            }
        }
    }

    pub fn get(&self, code: &CountryCode) -> Option<&CountryStatRecord> {
        self.records.get(code)
    }

    /// Records for `codes`, in table order
    pub fn stats_for<'a, I>(&self, codes: I) -> Vec<CountryStatRecord>
    where
        I: IntoIterator<Item = &'a CountryCode>,
    {
        let wanted: HashSet<&CountryCode> = codes.into_iter().collect();
        self.records
            .values()
            .filter(|record| wanted.contains(&record.code))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Top [`TOP_N`] countries by population; missing population ranks as zero
pub fn population_series(records: &[CountryStatRecord], selected: &CountryCode) -> Vec<ChartDatum> {
    ranked(
        records
            .iter()
            .map(|r| (r, r.population.map(|p| p as f64).unwrap_or(0.0))),
        selected,
    )
}

/// Top [`TOP_N`] countries by GDP; countries without GDP are left out
pub fn gdp_series(records: &[CountryStatRecord], selected: &CountryCode) -> Vec<ChartDatum> {
    ranked(
        records.iter().filter_map(|r| r.gdp.map(|gdp| (r, gdp))),
        selected,
    )
}

fn ranked<'a, I>(values: I, selected: &CountryCode) -> Vec<ChartDatum>
where
    I: Iterator<Item = (&'a CountryStatRecord, f64)>,
{
    let mut data: Vec<ChartDatum> = values
        .map(|(record, value)| ChartDatum {
            full_name: record.name.clone(),
            category: truncate_label(&record.name),
            value,
            highlight: &record.code == selected,
        })
        .collect();
    data.sort_by(|a, b| b.value.total_cmp(&a.value));
    data.truncate(TOP_N);
    data
}

/// Shorten `name` to [`MAX_LABEL_LENGTH`] characters plus an ellipsis
pub fn truncate_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_LENGTH {
        let mut short: String = name.chars().take(MAX_LABEL_LENGTH).collect();
        short.push('…');
        short
    } else {
        name.to_string()
    }
}

/// Year of an `xsd:dateTime` such as `2023-01-01T00:00:00Z`
fn parse_year(value: &str) -> Option<i32> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.year());
    }
    // years outside chrono's range or with a leading sign
    let trimmed = value.trim_start_matches('+');
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let year: i32 = digits.split('-').next()?.parse().ok()?;
    Some(if negative { -year } else { year })
}
