//! Data models for scraped activity announcements and their catalog.
//!
//! This module defines the records that flow through the pipeline:
//! - [`CandidateEvent`]: what the parser extracts from one article block
//! - [`Event`]: a candidate after the deduplicator has given it an id
//! - [`Catalog`]: every known event keyed by id
//! - [`Subscriber`]: a notification recipient, consumed by [`crate::notify`]
//!
//! Field names match the persisted `events.json` / `users.json` documents.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Sentinel stored in [`Event::date`] when no date could be synthesized.
pub const TBA: &str = "TBA";

/// Provenance tag for events discovered by the scraper.
pub const AUTO_SCRAPE_SOURCE: &str = "auto_scrape";

/// All known events keyed by id.
///
/// The catalog is append-only: nothing in this crate removes or rewrites an
/// entry once it has been inserted.
pub type Catalog = BTreeMap<String, Event>;

/// Subscriber records keyed by recipient identifier.
pub type Subscribers = BTreeMap<String, Subscriber>;

/// The retailer running a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Store {
    #[default]
    #[serde(rename = "LEGO Store")]
    LegoStore,
    #[serde(rename = "Smyths Toys")]
    SmythsToys,
    #[serde(rename = "John Lewis")]
    JohnLewis,
}

impl Store {
    /// Display name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Store::LegoStore => "LEGO Store",
            Store::SmythsToys => "Smyths Toys",
            Store::JohnLewis => "John Lewis",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event extracted from an article heading that has not been merged yet.
///
/// Candidates carry everything an [`Event`] does except the catalog id and
/// the insertion timestamp, which only [`crate::dedup::merge`] assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEvent {
    /// The article heading; also the deduplication key.
    pub title: String,
    pub location: String,
    /// Synthesized date, or [`TBA`].
    pub date: String,
    /// Human-readable counterpart of `date`.
    pub date_display: String,
    pub store: Store,
    pub description: String,
    pub source: String,
    /// First link in the article block, empty when the block has none.
    pub url: String,
}

/// A discovered activity stored in the [`Catalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub location: String,
    pub date: String,
    pub date_display: String,
    #[serde(default)]
    pub store: Store,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Local>,
}

/// Accept RFC 3339 timestamps as well as offset-less ISO 8601 ones
/// (`2025-11-01T10:00:00.123456`), which are read as local time.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| serde::de::Error::custom(format!("invalid created_at {raw:?}: {e}")))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| serde::de::Error::custom(format!("created_at {raw:?} does not exist in local time")))
}

impl Event {
    /// Promote a candidate to a catalog entry.
    pub fn from_candidate(candidate: CandidateEvent, id: String, created_at: DateTime<Local>) -> Self {
        Self {
            id,
            title: candidate.title,
            location: candidate.location,
            date: candidate.date,
            date_display: candidate.date_display,
            store: candidate.store,
            description: candidate.description,
            source: candidate.source,
            url: candidate.url,
            created_at,
        }
    }

    /// Whether the event still waits for an announced date.
    pub fn is_tba(&self) -> bool {
        self.date == TBA
    }
}

/// A notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub subscribed: bool,
    /// Lower-case location tags, or `["all"]`.
    #[serde(default)]
    pub locations: BTreeSet<String>,
}

/// Tag meaning "every location".
pub const ALL_LOCATIONS: &str = "all";

impl Subscriber {
    /// Add a location tag (lower-cased). Subscribing to [`ALL_LOCATIONS`]
    /// replaces every other tag.
    pub fn subscribe_to(&mut self, location: &str) {
        let tag = location.trim().to_lowercase();
        self.subscribed = true;
        if tag == ALL_LOCATIONS {
            self.locations.clear();
        }
        self.locations.insert(tag);
    }
}

impl Default for Subscriber {
    fn default() -> Self {
        Self {
            subscribed: true,
            locations: BTreeSet::new(),
        }
    }
}
