//! Modifier resolution: free-text modifier line to canonical stat ids.
//!
//! Resolution is a pure pipeline over the read-only [`StatsIndex`]:
//! normalize, try the item-intrinsic index when the line can roll a local
//! variant on equipment, fall back to the global index, then pick the ids
//! registered for the modifier's kind. A line that resolves for `explicit`
//! may still fail for `enchant`; the mapping is deliberately type-scoped.

use regex::Regex;
use std::sync::LazyLock;

use crate::item::ModKind;
use crate::stats::{StatsIndex, suffix_key};
use crate::stats::index::Candidate;
use crate::text::{extract_mod_value, normalize_mod_text};

/// Modifier families known to roll item-intrinsic variants on equipment.
/// Anything else goes straight to the global index.
static LOCAL_VARIANT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)increased Armour",
        r"(?i)increased Evasion",
        r"(?i)increased Energy Shield",
        r"(?i)to Armour",
        r"(?i)to Evasion",
        r"(?i)to Energy Shield",
        r"(?i)increased Physical Damage",
        r"(?i)increased Attack Speed",
        r"(?i)increased Critical",
        r"(?i)Adds.*Damage",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Canonical ids must look like `<kind>.stat_<digits>`; anything else is a
/// dataset defect the trade API would reject.
fn is_valid_stat_id(id: &str) -> bool {
    id.contains(".stat_")
}

/// Outcome of resolving one modifier line. Transient; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModifier {
    /// The modifier line as it was given to [`ModResolver::resolve`].
    pub source_text: String,
    /// Canonical stat ids in dataset preference order, template suffixes
    /// already split off. More than one id means the mapping is ambiguous
    /// and the synthesizer emits an OR-count group.
    pub canonical_ids: Vec<String>,
    /// First numeric magnitude of the line, if any.
    pub numeric_value: Option<f64>,
    /// Whether the item-intrinsic index supplied the match.
    pub used_local_variant: bool,
}

/// Resolves modifier lines against a shared [`StatsIndex`].
///
/// Stateless apart from the index reference; safe to use from any number of
/// concurrent synthesis calls.
pub struct ModResolver<'a> {
    index: &'a StatsIndex,
}

impl<'a> ModResolver<'a> {
    pub fn new(index: &'a StatsIndex) -> Self {
        Self { index }
    }

    /// Resolve one modifier line for a given modifier kind.
    ///
    /// Returns `None` when no matcher regex matched, or when the matched
    /// entry carries no usable ids for `kind`. Failure is per-modifier and
    /// non-fatal; callers log and move on.
    pub fn resolve(
        &self,
        raw_text: &str,
        kind: ModKind,
        item_is_equipment: bool,
    ) -> Option<ResolvedModifier> {
        let normalized = normalize_mod_text(raw_text);
        if normalized.is_empty() {
            return None;
        }

        let key = suffix_key(&normalized);

        let mut used_local_variant = false;
        let mut matched: Option<&Candidate> = None;

        if item_is_equipment && has_local_variant(&normalized) {
            matched = first_match(self.index.lookup(&key, true), &normalized);
            used_local_variant = matched.is_some();
        }
        if matched.is_none() {
            matched = first_match(self.index.lookup(&key, false), &normalized);
        }

        let candidate = matched?;
        let ids = candidate.entry().result.get(&kind)?;

        // Split off `id|template` suffixes; drop ids the API would reject.
        let canonical_ids: Vec<String> = ids
            .iter()
            .map(|id| id.split('|').next().unwrap_or(id).trim().to_string())
            .filter(|id| {
                let valid = is_valid_stat_id(id);
                if !valid {
                    tracing::debug!("Dropping malformed stat id '{}' for '{}'", id, normalized);
                }
                valid
            })
            .collect();

        if canonical_ids.is_empty() {
            tracing::debug!("No usable {} ids for modifier '{}'", kind, normalized);
            return None;
        }

        Some(ResolvedModifier {
            source_text: raw_text.to_string(),
            canonical_ids,
            numeric_value: extract_mod_value(&normalized),
            used_local_variant,
        })
    }
}

/// Whether a normalized line belongs to a family with local variants.
fn has_local_variant(normalized: &str) -> bool {
    LOCAL_VARIANT_PATTERNS.iter().any(|p| p.is_match(normalized))
}

/// First candidate whose regex matches, in stored bucket order.
fn first_match<'c>(candidates: &'c [Candidate], normalized: &str) -> Option<&'c Candidate> {
    candidates.iter().find(|c| c.matches(normalized))
}
