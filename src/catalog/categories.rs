//! Organization-type → category reference table
//!
//! Maps Wikidata `instance of` classes of organizations onto the small
//! taxonomy shown in the category donut. Anything not listed falls back to
//! [`CategoryLabel::Uncategorized`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad organization category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryLabel {
    #[serde(rename = "Cultural/Educational")]
    CulturalEducational,
    #[serde(rename = "Economic/Trade Organizations")]
    EconomicTrade,
    #[serde(rename = "Environmental")]
    Environmental,
    #[serde(rename = "General International Orgs")]
    GeneralInternational,
    #[serde(rename = "Intergovernmental Organizations (IGOs)")]
    Intergovernmental,
    #[serde(rename = "Military Alliances")]
    MilitaryAlliance,
    #[serde(rename = "Political Alliances")]
    PoliticalAlliance,
    #[serde(rename = "Religious or Ideological")]
    ReligiousIdeological,
    #[serde(rename = "Scientific & Technical")]
    ScientificTechnical,
    #[serde(rename = "Sports Organizations")]
    Sports,
    /// Fallback for every type missing from the table
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

impl CategoryLabel {
    pub const ALL: [CategoryLabel; 11] = [
        CategoryLabel::CulturalEducational,
        CategoryLabel::EconomicTrade,
        CategoryLabel::Environmental,
        CategoryLabel::GeneralInternational,
        CategoryLabel::Intergovernmental,
        CategoryLabel::MilitaryAlliance,
        CategoryLabel::PoliticalAlliance,
        CategoryLabel::ReligiousIdeological,
        CategoryLabel::ScientificTechnical,
        CategoryLabel::Sports,
        CategoryLabel::Uncategorized,
    ];

    pub const FALLBACK: CategoryLabel = CategoryLabel::Uncategorized;

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryLabel::CulturalEducational => "Cultural/Educational",
            CategoryLabel::EconomicTrade => "Economic/Trade Organizations",
            CategoryLabel::Environmental => "Environmental",
            CategoryLabel::GeneralInternational => "General International Orgs",
            CategoryLabel::Intergovernmental => "Intergovernmental Organizations (IGOs)",
            CategoryLabel::MilitaryAlliance => "Military Alliances",
            CategoryLabel::PoliticalAlliance => "Political Alliances",
            CategoryLabel::ReligiousIdeological => "Religious or Ideological",
            CategoryLabel::ScientificTechnical => "Scientific & Technical",
            CategoryLabel::Sports => "Sports Organizations",
            CategoryLabel::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up the category of an organization-type Q-id
pub fn category_of(type_id: &str) -> Option<CategoryLabel> {
    use CategoryLabel::*;

    let category = match type_id {
        // cultural association, education trade union, language area,
        // language regulator, educational institution, cultural region,
        // academic publisher
        "Q10549978" | "Q10855469" | "Q1149061" | "Q2093358" | "Q2385804" | "Q3502482"
        | "Q96888669" => CulturalEducational,

        // development banks, currency/customs/economic unions, trade blocs
        // and agreements, single markets, fishery bodies
        "Q105758271" | "Q1125321" | "Q1129645" | "Q129060826" | "Q1327750" | "Q1345691"
        | "Q218819" | "Q252550" | "Q3536928" | "Q3623811" | "Q5335686" => EconomicTrade,

        "Q1785733" | "Q3356081" => Environmental,

        "Q163740" | "Q17084016" | "Q1900326" | "Q29300714" | "Q431603" | "Q43229"
        | "Q48204" | "Q6815100" | "Q728646" | "Q79913" | "Q9378718" | "Q938236" => {
            GeneralInternational
        }

        "Q1335818" | "Q15285626" | "Q15925165" | "Q245065" | "Q4120211" | "Q484652"
        | "Q97374157" => Intergovernmental,

        "Q100906234" | "Q1127126" | "Q115365853" | "Q125420442" | "Q1276346" | "Q1772543" => {
            MilitaryAlliance
        }

        "Q1140229" | "Q120121699" | "Q124964" | "Q170156" | "Q2578692" | "Q7210356"
        | "Q769802" => PoliticalAlliance,

        "Q110706912" => ReligiousIdeological,

        "Q109909183" | "Q1254933" | "Q1328899" | "Q1438053" | "Q31855" | "Q4117139"
        | "Q480242" | "Q5227240" | "Q6043746" | "Q7689673" => ScientificTechnical,

        "Q11422536" => Sports,

        _ => return None,
    };

    Some(category)
}

/// Category of a type Q-id, or the fallback label
pub fn categorize_type(type_id: &str) -> CategoryLabel {
    category_of(type_id).unwrap_or(CategoryLabel::FALLBACK)
}
