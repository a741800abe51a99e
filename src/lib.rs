//! # Free LEGO Events
//!
//! Tracks free LEGO activity announcements: scrapes a news listing page,
//! extracts structured events from article headings, merges them into an
//! append-only catalog and exports them as iCalendar documents.
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetcher`]): one GET of the listing page; failures become "no document"
//! 2. **Parsing** ([`parser`]): article blocks -> relevance filter -> date synthesis -> classification
//! 3. **Merging** ([`dedup`]): exact-title dedup and `auto_{n}` id assignment
//! 4. **Persisting** ([`store`]): whole-document load/save of the catalog
//! 5. **Announcing** ([`notify`]): paced, at-most-once broadcast of the added events
//!
//! Calendar export ([`calendar`]) reads the catalog on demand. [`pipeline`]
//! ties the steps together.

pub mod calendar;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod utils;

pub use error::{ConfigError, DeliveryError, EncodeError, StoreError};
pub use models::{CandidateEvent, Catalog, Event, Store, Subscriber, Subscribers};
