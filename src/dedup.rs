//! Merging scraped candidates into the catalog.
//!
//! The exact title string is the dedup key: no case folding, no whitespace
//! normalisation. New events get ids of the form `auto_{n}` where `n` starts
//! at `catalog.len() + 1` and grows by one per added event, so ids strictly
//! increase in candidate order within one call. An id already present in the
//! catalog is never handed out again; numbering skips past it.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument};

use crate::models::{CandidateEvent, Catalog, Event};

/// Prefix of every id assigned by [`merge`].
pub const ID_PREFIX: &str = "auto_";

/// Result of one merge: the updated catalog and the events it gained.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub catalog: Catalog,
    /// Newly inserted events in candidate order; empty when nothing was new.
    pub added: Vec<Event>,
}

impl MergeOutcome {
    /// Whether the merge added anything, i.e. whether the catalog needs saving.
    pub fn has_additions(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Merge `candidates` into `catalog`, stamping new events with the current time.
pub fn merge(catalog: Catalog, candidates: Vec<CandidateEvent>) -> MergeOutcome {
    merge_at(catalog, candidates, Local::now())
}

/// [`merge`] with an explicit insertion timestamp.
#[instrument(level = "info", skip_all, fields(existing = catalog.len(), candidates = candidates.len()))]
pub fn merge_at(
    mut catalog: Catalog,
    candidates: Vec<CandidateEvent>,
    now: DateTime<Local>,
) -> MergeOutcome {
    let mut titles: HashSet<String> = catalog.values().map(|e| e.title.clone()).collect();
    let mut next = catalog.len() + 1;
    let mut added = Vec::new();

    for candidate in candidates {
        if titles.contains(&candidate.title) {
            debug!(title = %candidate.title, "Dropping duplicate title");
            continue;
        }

        let mut id = format!("{ID_PREFIX}{next}");
        while catalog.contains_key(&id) {
            next += 1;
            id = format!("{ID_PREFIX}{next}");
        }
        next += 1;

        titles.insert(candidate.title.clone());
        let event = Event::from_candidate(candidate, id.clone(), now);
        catalog.insert(id, event.clone());
        added.push(event);
    }

    info!(added = added.len(), total = catalog.len(), "Merged candidates into catalog");
    MergeOutcome { catalog, added }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AUTO_SCRAPE_SOURCE, Store, TBA};

    fn candidate(title: &str) -> CandidateEvent {
        CandidateEvent {
            title: title.to_string(),
            location: "UK".to_string(),
            date: TBA.to_string(),
            date_display: "To be announced".to_string(),
            store: Store::LegoStore,
            description: String::new(),
            source: AUTO_SCRAPE_SOURCE.to_string(),
            url: String::new(),
        }
    }

    fn numeric_id(id: &str) -> usize {
        id.trim_start_matches(ID_PREFIX).parse().unwrap()
    }

    #[test]
    fn test_ids_follow_catalog_size() {
        let outcome = merge(Catalog::new(), vec![candidate("Free LEGO a"), candidate("Free LEGO b")]);
        let ids: Vec<_> = outcome.added.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["auto_1", "auto_2"]);
        assert_eq!(outcome.catalog.len(), 2);
        assert_eq!(outcome.catalog["auto_2"].title, "Free LEGO b");
    }

    #[test]
    fn test_second_merge_is_idempotent() {
        let candidates = vec![candidate("Free LEGO a"), candidate("Free LEGO b")];
        let first = merge(Catalog::new(), candidates.clone());
        let second = merge(first.catalog.clone(), candidates);
        assert!(!second.has_additions());
        assert_eq!(second.catalog, first.catalog);
    }

    #[test]
    fn test_duplicate_titles_within_one_batch() {
        let outcome = merge(Catalog::new(), vec![candidate("Free LEGO a"), candidate("Free LEGO a")]);
        assert_eq!(outcome.added.len(), 1);
    }

    #[test]
    fn test_title_match_is_exact() {
        let first = merge(Catalog::new(), vec![candidate("Free LEGO a")]);
        let second = merge(first.catalog, vec![candidate("free lego a"), candidate("Free LEGO a ")]);
        assert_eq!(second.added.len(), 2);
        assert_eq!(second.added[0].id, "auto_2");
        assert_eq!(second.added[1].id, "auto_3");
    }

    #[test]
    fn test_taken_id_is_skipped() {
        let now = Local::now();
        let mut catalog = Catalog::new();
        let manual = Event::from_candidate(candidate("Manual entry"), "auto_2".to_string(), now);
        catalog.insert(manual.id.clone(), manual);

        let outcome = merge_at(catalog, vec![candidate("Free LEGO a"), candidate("Free LEGO b")], now);
        let ids: Vec<_> = outcome.added.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["auto_3", "auto_4"]);
        assert_eq!(outcome.catalog.len(), 3);
    }

    #[test]
    fn test_ids_strictly_increase_and_are_unique() {
        let now = Local::now();
        let base = merge_at(Catalog::new(), (0..3).map(|i| candidate(&format!("old {i}"))).collect(), now);
        let outcome = merge_at(
            base.catalog,
            (0..12).map(|i| candidate(&format!("new {}", i % 9))).collect(),
            now,
        );

        let numbers: Vec<_> = outcome.added.iter().map(|e| numeric_id(&e.id)).collect();
        assert_eq!(numbers.len(), 9);
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(numbers[0], 4);
        assert_eq!(outcome.catalog.len(), 12);
        assert!(outcome.added.iter().all(|e| e.created_at == now));
    }
}
