//! Raw matcher dataset loading.
//!
//! The dataset is produced offline by the same pipeline that derives the
//! suffix keys, and ships as one JSON object: suffix key to ordered matcher
//! list. Keys ending in `local` describe item-intrinsic variants.

use crate::error::Result;
use crate::item::ModKind;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One matcher entry from the static dataset. Immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherEntry {
    /// Regex pattern matched against the normalized modifier line.
    pub matcher: String,
    /// Canonical stat ids per modifier kind, in preference order. Each id may
    /// carry a `|<template>` suffix that is split off before use.
    #[serde(alias = "res")]
    pub result: HashMap<ModKind, Vec<String>>,
    /// Per-locale display templates. Carried through for tooling; resolution
    /// never reads it.
    #[serde(default)]
    pub template: HashMap<String, String>,
}

/// The dataset as stored on disk: suffix key to matcher bucket.
pub type RawStatsDataset = HashMap<String, Vec<MatcherEntry>>;

/// Load the raw matcher dataset from a JSON file.
pub async fn load_dataset(path: &Path) -> Result<RawStatsDataset> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading stats dataset at {}", path.display()))?;
    serde_json::from_str(&body)
        .with_context(|| format!("parsing stats dataset at {}", path.display()))
}
