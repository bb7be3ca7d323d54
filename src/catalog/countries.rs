//! Census of ISO 3166-1 alpha-3 codes
//!
//! The bulk statistics query is issued over exactly this list, so the
//! statistics table never contains a code that is missing here.

use crate::model::CountryCode;
use rand::seq::SliceRandom;
use rand::Rng;

/// Every ISO 3166-1 alpha-3 code known to the front end
pub const COUNTRY_CODES: [&str; 249] = [
    "AFG", "ALA", "ALB", "DZA", "ASM", "AND", "AGO", "AIA", "ATA", "ATG",
    "ARG", "ARM", "ABW", "AUS", "AUT", "AZE", "BHS", "BHR", "BGD", "BRB",
    "BLR", "BEL", "BLZ", "BEN", "BMU", "BTN", "BOL", "BES", "BIH", "BWA",
    "BVT", "BRA", "IOT", "BRN", "BGR", "BFA", "BDI", "CPV", "KHM", "CMR",
    "CAN", "CYM", "CAF", "TCD", "CHL", "CHN", "CXR", "CCK", "COL", "COM",
    "COG", "COD", "COK", "CRI", "CIV", "HRV", "CUB", "CUW", "CYP", "CZE",
    "DNK", "DJI", "DMA", "DOM", "ECU", "EGY", "SLV", "GNQ", "ERI", "EST",
    "SWZ", "ETH", "FLK", "FRO", "FJI", "FIN", "FRA", "GUF", "PYF", "ATF",
    "GAB", "GMB", "GEO", "DEU", "GHA", "GIB", "GRC", "GRL", "GRD", "GLP",
    "GUM", "GTM", "GGY", "GIN", "GNB", "GUY", "HTI", "HMD", "VAT", "HND",
    "HKG", "HUN", "ISL", "IND", "IDN", "IRN", "IRQ", "IRL", "IMN", "ISR",
    "ITA", "JAM", "JPN", "JEY", "JOR", "KAZ", "KEN", "KIR", "PRK", "KOR",
    "KWT", "KGZ", "LAO", "LVA", "LBN", "LSO", "LBR", "LBY", "LIE", "LTU",
    "LUX", "MAC", "MDG", "MWI", "MYS", "MDV", "MLI", "MLT", "MHL", "MTQ",
    "MRT", "MUS", "MYT", "MEX", "FSM", "MDA", "MCO", "MNG", "MNE", "MSR",
    "MAR", "MOZ", "MMR", "NAM", "NRU", "NPL", "NLD", "NCL", "NZL", "NIC",
    "NER", "NGA", "NIU", "NFK", "MKD", "MNP", "NOR", "OMN", "PAK", "PLW",
    "PSE", "PAN", "PNG", "PRY", "PER", "PHL", "PCN", "POL", "PRT", "PRI",
    "QAT", "REU", "ROU", "RUS", "RWA", "BLM", "SHN", "KNA", "LCA", "MAF",
    "SPM", "VCT", "WSM", "SMR", "STP", "SAU", "SEN", "SRB", "SYC", "SLE",
    "SGP", "SXM", "SVK", "SVN", "SLB", "SOM", "ZAF", "SGS", "SSD", "ESP",
    "LKA", "SDN", "SUR", "SJM", "SWE", "CHE", "SYR", "TWN", "TJK", "TZA",
    "THA", "TLS", "TGO", "TKL", "TON", "TTO", "TUN", "TUR", "TKM", "TCA",
    "TUV", "UGA", "UKR", "ARE", "GBR", "USA", "UMI", "URY", "UZB", "VUT",
    "VEN", "VNM", "VGB", "VIR", "WLF", "ESH", "YEM", "ZMB", "ZWE",
];

/// Whether `code` is part of the census
pub fn is_known(code: &CountryCode) -> bool {
    COUNTRY_CODES.contains(&code.as_str())
}

/// The census as parsed country codes
pub fn all() -> Vec<CountryCode> {
    COUNTRY_CODES
        .iter()
        .filter_map(|code| CountryCode::new(code).ok())
        .collect()
}

/// `count` distinct codes drawn at random from the census
pub fn random_sample<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<CountryCode> {
    COUNTRY_CODES
        .choose_multiple(rng, count)
        .filter_map(|code| CountryCode::new(code).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_census_is_unique_and_valid() {
        let codes = all();
        assert_eq!(codes.len(), COUNTRY_CODES.len());
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_random_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample = random_sample(8, &mut rng);
        assert_eq!(sample.len(), 8);
        assert!(sample.iter().all(is_known));

        let unique: HashSet<_> = sample.iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_random_sample_caps_at_census_size() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_sample(1000, &mut rng).len(), COUNTRY_CODES.len());
    }
}
