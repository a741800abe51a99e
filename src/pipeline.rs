//! Entry points used by the front end.
//!
//! - [`run_cycle`]: fetch -> parse -> merge -> persist, returning the events
//!   that were added so the caller can announce them
//! - [`export_event`]: calendar document for one catalog id
//! - [`export_all`]: calendar document for the whole catalog
//! - [`upcoming`]: catalog events ordered by date, for listings
//!
//! A cycle runs to completion in memory and commits the catalog at most once,
//! at the end, and only when something was added. Callers must not run two
//! cycles against the same store at the same time.

use chrono::{DateTime, Datelike, Local};
use itertools::Itertools;
use tracing::{info, instrument};

use crate::calendar;
use crate::dedup;
use crate::error::{EncodeError, StoreError};
use crate::fetcher::DocumentSource;
use crate::models::{Catalog, Event};
use crate::parser::{self, html};
use crate::store::CatalogStore;

/// Run one scrape cycle against `store` and return the newly added events.
///
/// A failed fetch or a page without relevant articles leaves the catalog
/// untouched and yields an empty list. Store errors propagate.
pub async fn run_cycle<S, C>(source: &S, store: &C, block_limit: usize) -> Result<Vec<Event>, StoreError>
where
    S: DocumentSource,
    C: CatalogStore,
{
    run_cycle_at(source, store, block_limit, Local::now()).await
}

/// [`run_cycle`] with an explicit clock.
#[instrument(level = "info", skip_all, fields(block_limit = block_limit))]
pub async fn run_cycle_at<S, C>(
    source: &S,
    store: &C,
    block_limit: usize,
    now: DateTime<Local>,
) -> Result<Vec<Event>, StoreError>
where
    S: DocumentSource,
    C: CatalogStore,
{
    info!("Starting scrape cycle");

    let Some(body) = source.fetch_document().await else {
        info!("No document fetched; nothing to do");
        return Ok(Vec::new());
    };

    let document = html::parse_document(&body, block_limit);
    let candidates = parser::extract_candidates(&document, block_limit, now.year());
    if candidates.is_empty() {
        info!("No candidate events found");
        return Ok(Vec::new());
    }

    let catalog = store.load()?;
    let outcome = dedup::merge_at(catalog, candidates, now);

    if outcome.has_additions() {
        store.save(&outcome.catalog)?;
        info!(added = outcome.added.len(), total = outcome.catalog.len(), "Catalog updated");
    } else {
        info!("No new events");
    }
    Ok(outcome.added)
}

/// Calendar document for the event stored under `id`.
pub fn export_event(catalog: &Catalog, id: &str) -> Result<String, EncodeError> {
    let event = catalog
        .get(id)
        .ok_or_else(|| EncodeError::UnknownEvent(id.to_string()))?;
    calendar::encode_single(event)
}

/// Calendar document for every dated event in the catalog.
pub fn export_all(catalog: &Catalog) -> Result<String, EncodeError> {
    calendar::encode_batch(catalog.values())
}

/// Up to `limit` events, earliest date first; undated events come last.
pub fn upcoming(catalog: &Catalog, limit: usize) -> Vec<&Event> {
    catalog
        .values()
        .sorted_by_key(|event| {
            let start = calendar::parse_event_date(&event.date);
            (start.is_none(), start, event.id.clone())
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateEvent, Store, TBA};
    use crate::store::MemoryStore;

    struct StaticSource(Option<&'static str>);

    impl DocumentSource for StaticSource {
        async fn fetch_document(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    const PAGE: &str = r#"<html><body>
        <article><h2>Get a free LEGO set this 5 December in London</h2>
            <a href="https://www.brickfanatics.com/free-lego-london/">Read</a></article>
        <article><h2>LEGO minifigure giveaway</h2></article>
        <article><h3>Free LEGO polybag at Smyths Glasgow</h3></article>
        <article><h2>New LEGO Star Wars sets revealed</h2></article>
        <article><p>Sponsored</p></article>
    </body></html>"#;

    fn existing(title: &str, id: &str) -> Event {
        let candidate = CandidateEvent {
            title: title.to_string(),
            location: "UK".to_string(),
            date: TBA.to_string(),
            date_display: "To be announced".to_string(),
            store: Store::SmythsToys,
            description: String::new(),
            source: "auto_scrape".to_string(),
            url: String::new(),
        };
        Event::from_candidate(candidate, id.to_string(), Local::now())
    }

    fn fixed_now() -> DateTime<Local> {
        DateTime::parse_from_rfc3339("2026-10-14T09:00:00+01:00")
            .unwrap()
            .with_timezone(&Local)
    }

    #[tokio::test]
    async fn test_end_to_end_one_new_event() {
        let mut catalog = Catalog::new();
        catalog.insert("auto_1".into(), existing("Free LEGO polybag at Smyths Glasgow", "auto_1"));
        catalog.insert("auto_2".into(), existing("Free LEGO keyring at John Lewis", "auto_2"));
        let size_before = catalog.len();
        let store = MemoryStore::new(catalog);

        let added = run_cycle_at(&StaticSource(Some(PAGE)), &store, parser::BLOCK_LIMIT, fixed_now())
            .await
            .unwrap();

        assert_eq!(added.len(), 1);
        let event = &added[0];
        assert_eq!(event.id, format!("auto_{}", size_before + 1));
        assert_eq!(event.date, format!("{}-December-5", fixed_now().year()));
        assert_eq!(event.location, "London");
        assert_eq!(event.url, "https://www.brickfanatics.com/free-lego-london/");
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let store = MemoryStore::new(Catalog::new());
        let source = StaticSource(Some(PAGE));

        let first = run_cycle(&source, &store, parser::BLOCK_LIMIT).await.unwrap();
        assert_eq!(first.len(), 2);
        let second = run_cycle(&source, &store, parser::BLOCK_LIMIT).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_no_op() {
        let store = MemoryStore::new(Catalog::new());
        let added = run_cycle(&StaticSource(None), &store, parser::BLOCK_LIMIT).await.unwrap();
        assert!(added.is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_export_by_id() {
        let mut catalog = Catalog::new();
        let mut dated = existing("Free LEGO dated", "auto_1");
        dated.date = "2025-12-05".to_string();
        catalog.insert("auto_1".into(), dated);
        catalog.insert("auto_2".into(), existing("Free LEGO undated", "auto_2"));

        assert!(export_event(&catalog, "auto_1").unwrap().contains("BEGIN:VALARM"));
        assert!(matches!(export_event(&catalog, "auto_2"), Err(EncodeError::MissingDate { .. })));
        assert_eq!(
            export_event(&catalog, "auto_9").unwrap_err(),
            EncodeError::UnknownEvent("auto_9".to_string())
        );
        assert_eq!(export_all(&catalog).unwrap().matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn test_upcoming_orders_by_date_then_undated() {
        let mut catalog = Catalog::new();
        for (id, date) in [
            ("auto_1", TBA),
            ("auto_2", "2026-December-5"),
            ("auto_3", "2025-12-24"),
            ("auto_4", "2026-01-02"),
        ] {
            let mut event = existing(&format!("Free LEGO {id}"), id);
            event.date = date.to_string();
            catalog.insert(id.to_string(), event);
        }

        let ids: Vec<_> = upcoming(&catalog, 10).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["auto_3", "auto_4", "auto_2", "auto_1"]);
        assert_eq!(upcoming(&catalog, 2).len(), 2);
    }
}
