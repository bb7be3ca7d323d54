//! Static reference data: the category table and the country census

pub mod categories;
pub mod countries;

pub use categories::{categorize_type, category_of, CategoryLabel};
pub use countries::{random_sample, COUNTRY_CODES};
