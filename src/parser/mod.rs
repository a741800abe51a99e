//! Extraction of candidate events from the listing page.
//!
//! The page is modelled as an ordered list of [`ArticleBlock`]s (see
//! [`html::parse_document`]). Each block goes through:
//!
//! 1. **Heading extraction**: first `h2`, else first `h3`; no heading skips the block
//! 2. **Relevance filter**: heading must mention both "free" and "lego"
//! 3. **Date synthesis**: [`dates::synthesize_date`]
//! 4. **Classification**: [`classify::classify`]
//! 5. **Link extraction**: first link target, or empty
//!
//! Every block folds into a [`BlockOutcome`]; a bad block is skipped and the
//! rest of the batch carries on.

pub mod classify;
pub mod dates;
pub mod html;

use tracing::{debug, info, instrument, warn};

use crate::models::{AUTO_SCRAPE_SOURCE, CandidateEvent};
use crate::utils::truncate_for_log;

/// Number of blocks examined per document unless configured otherwise.
pub const BLOCK_LIMIT: usize = 5;

/// Description attached to every scraped event.
pub const DEFAULT_DESCRIPTION: &str = "See the link for event details";

/// A parsed listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<ArticleBlock>,
}

/// One article on the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleBlock {
    /// `h2`/`h3` headings in document order.
    pub headings: Vec<Heading>,
    /// Anchors in document order.
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// `None` when the anchor has no `href` attribute.
    pub href: Option<String>,
}

impl ArticleBlock {
    /// The first level-2 heading, else the first level-3 heading.
    pub fn title(&self) -> Option<&str> {
        let first_of = move |level: u8| {
            self.headings
                .iter()
                .find(|h| h.level == level)
                .map(|h| h.text.as_str())
        };
        first_of(2).or_else(|| first_of(3))
    }
}

/// Why a block produced no candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither an `h2` nor an `h3` heading.
    NoHeading,
    /// The heading does not announce a free LEGO activity.
    NotRelevant,
    /// The block is structurally broken.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Accepted(CandidateEvent),
    Skipped(SkipReason),
}

/// Whether a heading announces a free LEGO activity (case-insensitive).
pub fn is_relevant(heading: &str) -> bool {
    let lower = heading.to_lowercase();
    lower.contains("free") && lower.contains("lego")
}

/// Run one block through extraction, filtering, dating and classification.
pub fn parse_block(block: &ArticleBlock, current_year: i32) -> BlockOutcome {
    let Some(title) = block.title() else {
        return BlockOutcome::Skipped(SkipReason::NoHeading);
    };

    if !is_relevant(title) {
        return BlockOutcome::Skipped(SkipReason::NotRelevant);
    }

    let url = match block.links.first() {
        None => String::new(),
        Some(Link { href: Some(href) }) => href.clone(),
        Some(Link { href: None }) => {
            return BlockOutcome::Skipped(SkipReason::Malformed(
                "first link has no href".to_string(),
            ));
        }
    };

    let date = dates::synthesize_date(title, current_year);
    let classification = classify::classify(title);

    BlockOutcome::Accepted(CandidateEvent {
        title: title.to_string(),
        location: classification.location,
        date: date.date,
        date_display: date.display,
        store: classification.store,
        description: DEFAULT_DESCRIPTION.to_string(),
        source: AUTO_SCRAPE_SOURCE.to_string(),
        url,
    })
}

/// Fold the first `limit` blocks of `document` into candidate events, in block order.
#[instrument(level = "info", skip_all, fields(blocks = document.blocks.len(), limit = limit))]
pub fn extract_candidates(document: &Document, limit: usize, current_year: i32) -> Vec<CandidateEvent> {
    let mut candidates = Vec::new();

    for (index, block) in document.blocks.iter().take(limit).enumerate() {
        match parse_block(block, current_year) {
            BlockOutcome::Accepted(candidate) => {
                debug!(index, title = %truncate_for_log(&candidate.title, 80), "Accepted block");
                candidates.push(candidate);
            }
            BlockOutcome::Skipped(SkipReason::Malformed(reason)) => {
                warn!(index, %reason, "Skipping malformed block");
            }
            BlockOutcome::Skipped(reason) => {
                debug!(index, ?reason, "Skipping block");
            }
        }
    }

    info!(count = candidates.len(), "Extracted candidate events");
    candidates
}
