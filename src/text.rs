//! Modifier text normalization and numeric value extraction.
//!
//! Scraped modifier lines carry display-only markup (`[Resistances|Chaos
//! Resistance]`) that must be stripped before any lookup, and a leading
//! magnitude that drives the threshold filters. Both transforms are pure and
//! total: unmatched markup passes through unchanged and a missing magnitude
//! is simply `None`.

use regex::Regex;
use std::sync::LazyLock;

/// `[Category|Display Text]` annotations; only the display half is real text.
static TAGGED_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]|]+)\|([^\]]+)\]").unwrap());

/// Bare `[Text]` annotations.
static BARE_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]|]+)\]").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// First signed, optionally decimal numeric token in a modifier line.
static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+-]?\d+\.?\d*").unwrap());

/// Strips display-only markup from a modifier line.
///
/// `"+17% to [Resistances|Chaos Resistance]"` becomes
/// `"+17% to Chaos Resistance"`, `"[Critical|Critical Hit Chance]"` becomes
/// `"Critical Hit Chance"`. Runs of whitespace collapse to a single space and
/// the ends are trimmed. Idempotent: normalizing twice is a no-op.
pub fn normalize_mod_text(text: &str) -> String {
    let stripped = TAGGED_ANNOTATION.replace_all(text, "$2");
    let stripped = BARE_ANNOTATION.replace_all(&stripped, "$1");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Extracts the first numeric magnitude from a normalized modifier line.
///
/// `"+3 to Level of all Spell Skills"` yields `3.0`,
/// `"40% increased maximum Energy Shield"` yields `40.0`. Ranged modifiers
/// deliberately yield only their first value (`"Adds 10 to 20 Fire Damage"`
/// is `10.0`, not the average); the trade site's own search behaves the same
/// way, so the lower bound is what users expect to filter on.
pub fn extract_mod_value(text: &str) -> Option<f64> {
    let token = NUMERIC_TOKEN.find(text)?;
    token.as_str().parse::<f64>().ok()
}

/// Removes ASCII control characters the trade API rejects in name/type
/// anchors, then trims.
pub(crate) fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_annotation_keeps_display_half() {
        assert_eq!(
            normalize_mod_text("+17% to [Resistances|Chaos Resistance]"),
            "+17% to Chaos Resistance"
        );
    }

    #[test]
    fn bare_annotation_keeps_inner_text() {
        assert_eq!(
            normalize_mod_text("[Critical|Critical Hit Chance]"),
            "Critical Hit Chance"
        );
        assert_eq!(normalize_mod_text("[Evasion] Rating"), "Evasion Rating");
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        assert_eq!(
            normalize_mod_text("  40%   increased \t maximum  Energy Shield "),
            "40% increased maximum Energy Shield"
        );
    }

    #[test]
    fn unmatched_brackets_pass_through() {
        assert_eq!(normalize_mod_text("broken [ bracket"), "broken [ bracket");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "+17% to [Resistances|Chaos Resistance]",
            "  spaced   out  ",
            "plain text",
            "[A|B] then [C]",
        ] {
            let once = normalize_mod_text(raw);
            assert_eq!(normalize_mod_text(&once), once);
        }
    }

    #[test]
    fn extracts_first_value_only() {
        assert_eq!(extract_mod_value("Adds 10 to 20 Fire Damage"), Some(10.0));
        assert_eq!(extract_mod_value("+3 to Level of all Spell Skills"), Some(3.0));
        assert_eq!(
            extract_mod_value("40% increased maximum Energy Shield"),
            Some(40.0)
        );
    }

    #[test]
    fn extracts_signed_and_decimal_values() {
        assert_eq!(extract_mod_value("-5% to all Resistances"), Some(-5.0));
        assert_eq!(extract_mod_value("1.5% of Damage Leeched"), Some(1.5));
    }

    #[test]
    fn no_numeric_token_yields_none() {
        assert_eq!(extract_mod_value("Cannot be Frozen"), None);
        assert_eq!(extract_mod_value(""), None);
    }

    #[test]
    fn round_trips_through_normalize() {
        let raw = "+17% to [Resistances|Chaos Resistance]";
        assert_eq!(extract_mod_value(&normalize_mod_text(raw)), Some(17.0));
    }

    #[test]
    fn control_chars_are_stripped() {
        assert_eq!(strip_control_chars("Iron\u{0000} Ring\u{001F}"), "Iron Ring");
        assert_eq!(strip_control_chars("  Siege Axe "), "Siege Axe");
    }
}
