//! Domain model for the membership pipeline
//!
//! Country codes and organization IRIs are the join keys between the
//! resolver, the treaty filter and the co-member expander.

pub mod types;

use indexmap::{IndexMap, IndexSet};

pub use types::{
    CountryCode, MemberLimit, ModelError, ModelResult, OrganizationRef, OrganizationTypeRef,
};

/// Organization label → member countries, in response order
pub type GroupedMembership = IndexMap<String, IndexSet<CountryCode>>;
