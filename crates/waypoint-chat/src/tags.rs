//! Location tag extraction.
//!
//! The model is instructed to wrap every geographic entity as
//! `[LOCATION]name, address details[/LOCATION]`. This module pulls those
//! mentions back out and produces the display text with the markers removed.
//! Model output is not schema-validated, so nothing here ever fails: malformed
//! or unclosed tags are simply not matched.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Opening marker of a location tag pair.
pub const OPEN_TAG: &str = "[LOCATION]";
/// Closing marker of a location tag pair.
pub const CLOSE_TAG: &str = "[/LOCATION]";

// Non-greedy interior; `.` does not cross newlines.
static LOCATION_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[LOCATION\](.*?)\[/LOCATION\]").unwrap());

/// Extract the distinct location mentions from a model response.
///
/// Interior text is captured verbatim, commas and surrounding whitespace
/// included. Exact-string duplicates collapse to one entry; the returned
/// order is that of first appearance.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    LOCATION_TAG_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|mention| seen.insert(*mention))
        .map(str::to_string)
        .collect()
}

/// Replace every tag pair with its interior text.
///
/// Text without tag pairs is returned unchanged.
pub fn strip_tags(text: &str) -> String {
    LOCATION_TAG_RE.replace_all(text, "${1}").into_owned()
}

/// Whether the text contains at least one complete tag pair.
pub fn contains_tags(text: &str) -> bool {
    LOCATION_TAG_RE.is_match(text)
}

/// Wrap a location name in a tag pair.
pub fn tag(name: &str) -> String {
    format!("{}{}{}", OPEN_TAG, name, CLOSE_TAG)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: &str =
        "Visit [LOCATION]Eiffel Tower, Paris[/LOCATION] and [LOCATION]Louvre, Paris[/LOCATION].";

    // ---- Extraction ----

    #[test]
    fn test_extract_two_mentions() {
        assert_eq!(
            extract_mentions(PARIS),
            vec!["Eiffel Tower, Paris".to_string(), "Louvre, Paris".to_string()]
        );
    }

    #[test]
    fn test_extract_no_tags() {
        assert!(extract_mentions("Paris is lovely in spring.").is_empty());
        assert!(extract_mentions("").is_empty());
    }

    #[test]
    fn test_extract_collapses_duplicates() {
        let text = "Start at [LOCATION]Shaniwar Wada, Pune[/LOCATION], then come back to \
                    [LOCATION]Shaniwar Wada, Pune[/LOCATION] for the light show.";
        assert_eq!(extract_mentions(text), vec!["Shaniwar Wada, Pune".to_string()]);
    }

    #[test]
    fn test_extract_distinct_formatting_is_not_merged() {
        let text = "[LOCATION]Pune[/LOCATION] vs [LOCATION]Pune, Maharashtra[/LOCATION]";
        assert_eq!(extract_mentions(text).len(), 2);
    }

    #[test]
    fn test_extract_adjacent_tags() {
        let text = "[LOCATION]A[/LOCATION][LOCATION]B[/LOCATION]";
        assert_eq!(extract_mentions(text), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_extract_keeps_interior_verbatim() {
        let text = "Try [LOCATION] Starbucks, FC Road, Shivajinagar, Pune [/LOCATION]!";
        assert_eq!(
            extract_mentions(text),
            vec![" Starbucks, FC Road, Shivajinagar, Pune ".to_string()]
        );
    }

    #[test]
    fn test_extract_empty_interior() {
        assert_eq!(extract_mentions("[LOCATION][/LOCATION]"), vec![String::new()]);
    }

    #[test]
    fn test_extract_unclosed_tag_is_ignored() {
        let text = "See [LOCATION]Koregaon Park, Pune and then [LOCATION]Aundh[/LOCATION]";
        // Non-greedy match runs from the first open marker to the first close.
        assert_eq!(
            extract_mentions(text),
            vec!["Koregaon Park, Pune and then [LOCATION]Aundh".to_string()]
        );
        assert!(extract_mentions("Only [LOCATION]an opener here").is_empty());
        assert!(extract_mentions("Only a closer[/LOCATION] here").is_empty());
    }

    #[test]
    fn test_extract_does_not_cross_newlines() {
        assert!(extract_mentions("[LOCATION]Ruby Hall\nClinic[/LOCATION]").is_empty());
    }

    #[test]
    fn test_extract_count_never_exceeds_tag_pairs() {
        let text = "[LOCATION]x[/LOCATION] [LOCATION]y[/LOCATION] [LOCATION]x[/LOCATION]";
        let mentions = extract_mentions(text);
        assert!(mentions.len() <= 3);
        assert_eq!(mentions, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_extract_unicode() {
        let text = "Café at [LOCATION]Café de Flore, Saint-Germain-des-Prés, Paris[/LOCATION]";
        assert_eq!(
            extract_mentions(text),
            vec!["Café de Flore, Saint-Germain-des-Prés, Paris".to_string()]
        );
    }

    // ---- Display text ----

    #[test]
    fn test_strip_tags_example() {
        assert_eq!(strip_tags(PARIS), "Visit Eiffel Tower, Paris and Louvre, Paris.");
    }

    #[test]
    fn test_strip_tags_noop_without_tags() {
        let text = "**Day 1**: breakfast, then a walk.\nNo places here.";
        assert_eq!(strip_tags(text), text);
        assert_eq!(strip_tags(&strip_tags(text)), text);
    }

    #[test]
    fn test_strip_tags_leaves_no_markers() {
        let stripped = strip_tags(PARIS);
        assert!(!stripped.contains(OPEN_TAG));
        assert!(!stripped.contains(CLOSE_TAG));
        assert!(!contains_tags(&stripped));
    }

    #[test]
    fn test_strip_tags_leaves_unclosed_fragment() {
        let text = "Head to [LOCATION]Aga Khan Palace";
        assert_eq!(strip_tags(text), text);
    }

    #[test]
    fn test_strip_tags_dollar_in_interior_is_literal() {
        let text = "[LOCATION]$1 Pizza, NYC[/LOCATION]";
        assert_eq!(strip_tags(text), "$1 Pizza, NYC");
    }

    #[test]
    fn test_tag_round_trips_through_extraction() {
        let text = format!("Meet at {}.", tag("Jehangir Hospital, Sassoon Road, Pune"));
        assert!(contains_tags(&text));
        assert_eq!(
            extract_mentions(&text),
            vec!["Jehangir Hospital, Sassoon Road, Pune".to_string()]
        );
        assert_eq!(strip_tags(&text), "Meet at Jehangir Hospital, Sassoon Road, Pune.");
    }
}
