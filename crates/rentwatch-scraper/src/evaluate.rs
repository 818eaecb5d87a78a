//! Multi-selector evaluation against a fetched page.
//!
//! Candidates are tried strictly in order. Only a strictly greater match
//! count replaces the running best, so ties keep the earlier candidate, and
//! a candidate that crosses the confidence threshold is selected immediately
//! without looking at the rest.

use scraper::{Html, Selector};

/// Match count treated as strong evidence a selector found the real listing
/// grid rather than a stray DOM node. Tunable heuristic, not a contract —
/// revisit against live target pages before changing it.
pub const CONFIDENCE_THRESHOLD: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEvaluation {
    /// The winning candidate, or the last one tried when nothing matched.
    pub selector_used: String,
    pub listings_found: u32,
    /// Whether evaluation stopped early at the confidence threshold.
    pub early_exit: bool,
}

/// Evaluate `candidates` against `html` with the default confidence
/// threshold.
#[must_use]
pub fn evaluate(html: &str, candidates: &[String]) -> SelectorEvaluation {
    evaluate_with_threshold(html, candidates, CONFIDENCE_THRESHOLD)
}

/// Evaluate with an explicit threshold. A threshold of `0` would select the
/// first candidate unconditionally, so it is bumped to 1.
#[must_use]
pub fn evaluate_with_threshold(
    html: &str,
    candidates: &[String],
    threshold: usize,
) -> SelectorEvaluation {
    let document = Html::parse_document(html);
    let threshold = threshold.max(1);

    let mut best: Option<(&str, usize)> = None;
    let mut last_tried = "";

    for candidate in candidates {
        last_tried = candidate;
        let count = count_matches(&document, candidate);
        tracing::debug!(selector = %candidate, matches = count, "selector_evaluated");

        if count >= threshold {
            return SelectorEvaluation {
                selector_used: candidate.clone(),
                listings_found: clamp_count(count),
                early_exit: true,
            };
        }

        if count > best.map_or(0, |(_, c)| c) {
            best = Some((candidate, count));
        }
    }

    match best {
        Some((selector, count)) => SelectorEvaluation {
            selector_used: selector.to_owned(),
            listings_found: clamp_count(count),
            early_exit: false,
        },
        // Nothing matched anywhere; still report what was tried last so a
        // human can see it.
        None => SelectorEvaluation {
            selector_used: last_tried.to_owned(),
            listings_found: 0,
            early_exit: false,
        },
    }
}

/// Count elements matching `candidate`. A selector that does not parse is
/// treated as zero matches — a malformed candidate must not abort the whole
/// evaluation.
pub(crate) fn count_matches(document: &Html, candidate: &str) -> usize {
    match Selector::parse(candidate) {
        Ok(selector) => document.select(&selector).count(),
        Err(_) => {
            tracing::warn!(selector = %candidate, "unparseable selector treated as zero matches");
            0
        }
    }
}

fn clamp_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(selectors: &[&str]) -> Vec<String> {
        selectors.iter().map(|s| (*s).to_owned()).collect()
    }

    fn listing_grid(class: &str, count: usize) -> String {
        let items: String = (0..count)
            .map(|i| format!("<div class=\"{class}\">listing {i}</div>"))
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    #[test]
    fn picks_highest_count_when_below_threshold() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            listing_grid("foo", 3),
            listing_grid("bar", 7)
        );
        let result = evaluate(&html, &candidates(&[".foo", ".bar"]));
        assert_eq!(result.selector_used, ".bar");
        assert_eq!(result.listings_found, 7);
        assert!(!result.early_exit);
    }

    #[test]
    fn ties_keep_the_earlier_candidate() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            listing_grid("foo", 4),
            listing_grid("bar", 4)
        );
        let result = evaluate(&html, &candidates(&[".foo", ".bar"]));
        assert_eq!(result.selector_used, ".foo");
        assert_eq!(result.listings_found, 4);
    }

    #[test]
    fn threshold_crossing_stops_evaluation() {
        // .bar crosses the threshold; .baz would match more but must never
        // be considered.
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            listing_grid("foo", 3),
            listing_grid("bar", 12),
            listing_grid("baz", 50)
        );
        let result = evaluate(&html, &candidates(&[".foo", ".bar", ".baz"]));
        assert_eq!(result.selector_used, ".bar");
        assert_eq!(result.listings_found, 12);
        assert!(result.early_exit);
    }

    #[test]
    fn count_exactly_at_threshold_exits_early() {
        let html = listing_grid("exact", CONFIDENCE_THRESHOLD);
        let result = evaluate(&html, &candidates(&[".exact", ".never"]));
        assert_eq!(result.selector_used, ".exact");
        assert_eq!(result.listings_found, u32::try_from(CONFIDENCE_THRESHOLD).unwrap());
        assert!(result.early_exit);
    }

    #[test]
    fn all_zero_matches_reports_last_candidate() {
        let html = "<html><body><p>no listings here</p></body></html>";
        let result = evaluate(html, &candidates(&[".foo", ".bar", ".qux"]));
        assert_eq!(result.selector_used, ".qux");
        assert_eq!(result.listings_found, 0);
        assert!(!result.early_exit);
    }

    #[test]
    fn malformed_selector_counts_as_zero() {
        let html = listing_grid("real", 5);
        let result = evaluate(&html, &candidates(&["[[[not-a-selector", ".real"]));
        assert_eq!(result.selector_used, ".real");
        assert_eq!(result.listings_found, 5);
    }

    #[test]
    fn only_malformed_selectors_reports_last_with_zero() {
        let html = listing_grid("real", 5);
        let result = evaluate(&html, &candidates(&["[[[", ":::"]));
        assert_eq!(result.selector_used, ":::");
        assert_eq!(result.listings_found, 0);
    }

    #[test]
    fn custom_threshold_zero_is_bumped_to_one() {
        let html = listing_grid("a", 1);
        let result = evaluate_with_threshold(&html, &candidates(&[".a", ".b"]), 0);
        assert_eq!(result.selector_used, ".a");
        assert!(result.early_exit);
    }

    #[test]
    fn complex_selectors_match_nested_structure() {
        let html = r#"<html><body>
            <ul class="search-list">
                <li class="search-list__item"><article>1</article></li>
                <li class="search-list__item"><article>2</article></li>
                <li class="search-list__item search-list__item--ad"><article>ad</article></li>
            </ul>
        </body></html>"#;
        let result = evaluate(
            html,
            &candidates(&["ul.search-list li.search-list__item:not(.search-list__item--ad)"]),
        );
        assert_eq!(result.listings_found, 2);
    }
}
