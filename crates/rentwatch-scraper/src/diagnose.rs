//! Interactive selector diagnosis, used by the selector-test endpoint and
//! CLI when a platform's selector breaks and a human needs a replacement.

use scraper::Html;
use serde::Serialize;

use crate::evaluate::count_matches;

/// Selector patterns that commonly wrap listing grids on the monitored
/// sites. Tried alongside the user's selector so the response doubles as a
/// suggestion list.
const KNOWN_LISTING_PATTERNS: &[&str] = &[
    "[data-test-id='search-result-item']",
    ".search-result",
    "li.search-list__item",
    "section.listing-search-item",
    "article[class*='listing']",
    ".listing-card",
    ".property-card",
    "[class*='search-result']",
    "article.tile",
    ".result-item",
];

#[derive(Debug, Clone, Serialize)]
pub struct SelectorMatch {
    pub selector: String,
    pub matches: u32,
}

#[derive(Debug, Serialize)]
pub struct SelectorDiagnosis {
    /// The selector the caller asked about, with its match count.
    pub tested: SelectorMatch,
    /// Well-known patterns ranked by match count, highest first.
    pub alternatives: Vec<SelectorMatch>,
}

/// Count `selector` against `html` and rank the well-known patterns beside
/// it. Malformed selectors count as zero, same as in scrape evaluation.
#[must_use]
pub fn diagnose_selector(html: &str, selector: &str) -> SelectorDiagnosis {
    let document = Html::parse_document(html);

    let tested = SelectorMatch {
        selector: selector.to_owned(),
        matches: clamp(count_matches(&document, selector)),
    };

    let mut alternatives: Vec<SelectorMatch> = KNOWN_LISTING_PATTERNS
        .iter()
        .filter(|pattern| **pattern != selector)
        .map(|pattern| SelectorMatch {
            selector: (*pattern).to_owned(),
            matches: clamp(count_matches(&document, pattern)),
        })
        .collect();
    // Stable sort: equal counts keep the well-known list order.
    alternatives.sort_by(|a, b| b.matches.cmp(&a.matches));

    SelectorDiagnosis {
        tested,
        alternatives,
    }
}

fn clamp(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
