//! Store and location classification.
//!
//! Classification is a fixed, ordered rule table over the lower-cased
//! heading. The first matching store rule picks the retailer (and possibly a
//! retailer-specific location); independently, the first city in [`CITIES`]
//! found in the heading overrides the location. Unmatched headings fall back
//! to the defaults, so classification cannot fail.

use crate::models::Store;

pub const DEFAULT_LOCATION: &str = "UK";

/// One `(predicate, result)` entry of the store table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreRule {
    /// Lower-case substring that must appear in the heading.
    pub needle: &'static str,
    pub store: Store,
    /// Location implied by the retailer, if any.
    pub location: Option<&'static str>,
}

/// Store rules in priority order.
pub const STORE_RULES: &[StoreRule] = &[
    StoreRule {
        needle: "smyths",
        store: Store::SmythsToys,
        location: Some("UK Smyths Stores"),
    },
    StoreRule {
        needle: "john lewis",
        store: Store::JohnLewis,
        location: None,
    },
];

/// Cities that override the location, in priority order.
pub const CITIES: &[&str] = &[
    "London",
    "Manchester",
    "Birmingham",
    "Liverpool",
    "Glasgow",
    "Leeds",
    "Edinburgh",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub store: Store,
    pub location: String,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            store: Store::default(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

/// Classify a heading into a store and a location.
pub fn classify(heading: &str) -> Classification {
    let lower = heading.to_lowercase();
    let mut classification = Classification::default();

    if let Some(rule) = STORE_RULES.iter().find(|rule| lower.contains(rule.needle)) {
        classification.store = rule.store;
        if let Some(location) = rule.location {
            classification.location = location.to_string();
        }
    }

    if let Some(city) = CITIES.iter().find(|city| lower.contains(&city.to_lowercase())) {
        classification.location = city.to_string();
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = classify("Free LEGO set at selected stores");
        assert_eq!(c.store, Store::LegoStore);
        assert_eq!(c.location, "UK");
    }

    #[test]
    fn test_smyths_without_city() {
        let c = classify("Free LEGO make and take at Smyths this weekend");
        assert_eq!(c.store, Store::SmythsToys);
        assert_eq!(c.location, "UK Smyths Stores");
    }

    #[test]
    fn test_city_overrides_smyths_location() {
        let c = classify("Free LEGO build at SMYTHS Glasgow");
        assert_eq!(c.store, Store::SmythsToys);
        assert_eq!(c.location, "Glasgow");
    }

    #[test]
    fn test_john_lewis_keeps_default_location() {
        let c = classify("John Lewis hands out free LEGO polybags");
        assert_eq!(c.store, Store::JohnLewis);
        assert_eq!(c.location, "UK");
    }

    #[test]
    fn test_smyths_has_priority_over_john_lewis() {
        let c = classify("Free LEGO at Smyths and John Lewis");
        assert_eq!(c.store, Store::SmythsToys);
    }

    #[test]
    fn test_first_city_in_list_order_wins() {
        // Edinburgh appears first in the heading, London first in the list.
        let c = classify("Free LEGO in Edinburgh and London");
        assert_eq!(c.location, "London");
    }
}
