//! Suffix-keyed matcher index.
//!
//! Candidate matchers are bucketed under a key derived from the last one or
//! two tokens of a normalized modifier line. The derivation here must stay
//! byte-for-byte compatible with the offline dataset build: both strip the
//! first sign/digit/percent run from each token before concatenating and
//! lower-casing, so `"+25% increased Energy Shield"` and `"40% increased
//! maximum Energy Shield"` land in the same `energyshield` bucket.

use ahash::AHashMap;
use regex::Regex;
use std::sync::LazyLock;

use super::dataset::{MatcherEntry, RawStatsDataset};

/// Key suffix that marks item-intrinsic variants in the dataset.
const LOCAL_KEY_SUFFIX: &str = "local";

/// Leading sign/digit/percent run stripped from suffix tokens. Only the first
/// occurrence within a token is removed, matching the dataset build.
static TOKEN_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(([+-]?[\d.]+%?)|(#%)|(#))").unwrap());

/// A matcher candidate with its pattern compiled once at build time.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub(crate) regex: Regex,
    pub(crate) entry: MatcherEntry,
}

impl Candidate {
    pub(crate) fn matches(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }

    pub(crate) fn entry(&self) -> &MatcherEntry {
        &self.entry
    }
}

/// Read-only lookup structure over the matcher dataset.
///
/// Built once at load time and shared by reference across all resolution
/// calls; rebuilt only on dataset reload, never mutated in place.
#[derive(Debug, Default)]
pub struct StatsIndex {
    global: AHashMap<String, Vec<Candidate>>,
    local: AHashMap<String, Vec<Candidate>>,
}

impl StatsIndex {
    /// Compile the raw dataset into the two suffix-key maps.
    ///
    /// Entries whose pattern fails to compile are skipped with a warning;
    /// a bad row in the curated dataset should not take down every other
    /// lookup in its bucket.
    pub fn build(raw: RawStatsDataset) -> Self {
        let start = std::time::Instant::now();
        let mut global: AHashMap<String, Vec<Candidate>> = AHashMap::new();
        let mut local: AHashMap<String, Vec<Candidate>> = AHashMap::new();

        for (key, entries) in raw {
            let bucket = if key.ends_with(LOCAL_KEY_SUFFIX) {
                local.entry(key).or_default()
            } else {
                global.entry(key).or_default()
            };

            for entry in entries {
                match Regex::new(&entry.matcher) {
                    Ok(regex) => bucket.push(Candidate { regex, entry }),
                    Err(e) => {
                        tracing::warn!("Skipping unparseable matcher '{}': {}", entry.matcher, e);
                    }
                }
            }
        }

        let index = Self { global, local };
        tracing::debug!(
            "Built stats index in {:?} ({} buckets, {} local buckets, {} matchers)",
            start.elapsed(),
            index.global.len(),
            index.local.len(),
            index.candidate_count(),
        );
        index
    }

    /// Exact-key bucket lookup; no fuzzy fallback. For the local index the
    /// literal `local` suffix is appended to the derived key.
    pub(crate) fn lookup(&self, suffix_key: &str, want_local: bool) -> &[Candidate] {
        if want_local {
            let key = format!("{suffix_key}{LOCAL_KEY_SUFFIX}");
            self.local.get(&key).map_or(&[], Vec::as_slice)
        } else {
            self.global.get(suffix_key).map_or(&[], Vec::as_slice)
        }
    }

    /// Number of matcher candidates across both maps.
    pub fn candidate_count(&self) -> usize {
        self.global.values().chain(self.local.values()).map(Vec::len).sum()
    }
}

/// Derives the lookup key for a normalized modifier line.
///
/// The last two whitespace tokens (or the only token) are each stripped of
/// their first sign/digit/percent run, concatenated, and lower-cased. An
/// empty line derives an empty key, which no bucket uses.
pub fn suffix_key(normalized: &str) -> String {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let key = match tokens.as_slice() {
        [] => String::new(),
        [only] => strip_token(only),
        [.., second_last, last] => format!("{}{}", strip_token(second_last), strip_token(last)),
    };
    key.to_lowercase()
}

fn strip_token(token: &str) -> String {
    TOKEN_STRIP.replace(token, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ModKind;
    use std::collections::HashMap;

    fn entry(matcher: &str, kind: ModKind, ids: &[&str]) -> MatcherEntry {
        MatcherEntry {
            matcher: matcher.to_string(),
            result: HashMap::from([(kind, ids.iter().map(ToString::to_string).collect())]),
            template: HashMap::new(),
        }
    }

    #[test]
    fn suffix_key_uses_last_two_tokens() {
        assert_eq!(
            suffix_key("40% increased maximum Energy Shield"),
            "energyshield"
        );
        assert_eq!(suffix_key("+17% to Chaos Resistance"), "chaosresistance");
    }

    #[test]
    fn suffix_key_strips_signs_digits_and_percent() {
        assert_eq!(suffix_key("Adds 10 to 20"), "to");
        assert_eq!(suffix_key("+32"), "");
        assert_eq!(suffix_key("Regenerate 2% per second"), "persecond");
    }

    #[test]
    fn suffix_key_single_token() {
        assert_eq!(suffix_key("Unwavering"), "unwavering");
        assert_eq!(suffix_key(""), "");
    }

    #[test]
    fn same_suffix_same_key_regardless_of_values() {
        let a = suffix_key("40% increased maximum Energy Shield");
        let b = suffix_key("112% increased maximum Energy Shield");
        let c = suffix_key("+9 to maximum Energy Shield");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn build_splits_local_buckets_out() {
        let raw = RawStatsDataset::from([
            (
                "energyshield".to_string(),
                vec![entry(
                    "increased maximum Energy Shield",
                    ModKind::Explicit,
                    &["explicit.stat_2482852589"],
                )],
            ),
            (
                "energyshieldlocal".to_string(),
                vec![entry(
                    "increased Energy Shield",
                    ModKind::Explicit,
                    &["explicit.stat_4015621042"],
                )],
            ),
        ]);
        let index = StatsIndex::build(raw);

        assert_eq!(index.lookup("energyshield", false).len(), 1);
        assert_eq!(index.lookup("energyshield", true).len(), 1);
        assert!(index.lookup("energyshieldlocal", false).is_empty());
        assert_eq!(index.candidate_count(), 2);
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let raw = RawStatsDataset::from([(
            "chaosresistance".to_string(),
            vec![entry(
                "to Chaos Resistance",
                ModKind::Explicit,
                &["explicit.stat_2923486259"],
            )],
        )]);
        let index = StatsIndex::build(raw);

        assert!(!index.lookup("chaosresistance", false).is_empty());
        assert!(index.lookup("chaosresist", false).is_empty());
        assert!(index.lookup("chaosresistances", false).is_empty());
    }

    #[test]
    fn unparseable_matcher_is_skipped_not_fatal() {
        let raw = RawStatsDataset::from([(
            "chaosresistance".to_string(),
            vec![
                entry("to Chaos Resistance(", ModKind::Explicit, &["x"]),
                entry(
                    "to Chaos Resistance",
                    ModKind::Explicit,
                    &["explicit.stat_2923486259"],
                ),
            ],
        )]);
        let index = StatsIndex::build(raw);
        assert_eq!(index.lookup("chaosresistance", false).len(), 1);
    }
}
