//! HTML to [`Document`] conversion.
//!
//! Every `<article>` element becomes an [`ArticleBlock`] holding its `h2`/`h3`
//! headings and its anchors in document order. Heading text nodes are
//! concatenated as-is, then whitespace is collapsed, so inline markup inside
//! a word does not split it.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use super::{ArticleBlock, Document, Heading, Link};
use crate::utils::clean_text;

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("article selector"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3").expect("heading selector"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("link selector"));

/// Parse `html` and keep at most `limit` article blocks.
#[instrument(level = "debug", skip_all, fields(bytes = html.len(), limit = limit))]
pub fn parse_document(html: &str, limit: usize) -> Document {
    let html = Html::parse_document(html);
    let blocks: Vec<ArticleBlock> = html
        .select(&ARTICLE_SELECTOR)
        .take(limit)
        .map(article_block)
        .collect();
    debug!(count = blocks.len(), "Parsed article blocks");
    Document { blocks }
}

fn article_block(article: ElementRef<'_>) -> ArticleBlock {
    let headings = article
        .select(&HEADING_SELECTOR)
        .filter_map(|el| {
            let level = match el.value().name() {
                "h2" => 2,
                "h3" => 3,
                _ => return None,
            };
            Some(Heading {
                level,
                text: clean_text(&el.text().collect::<String>()),
            })
        })
        .collect();

    let links = article
        .select(&LINK_SELECTOR)
        .map(|el| Link {
            href: el.value().attr("href").map(str::to_string),
        })
        .collect();

    ArticleBlock { headings, links }
}
