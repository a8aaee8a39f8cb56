//! User-configurable search settings.
//!
//! Mirrors the key-value store the settings UI writes: a flat JSON object
//! with kebab-case keys. Every field has a default so a missing or partial
//! file still yields a working configuration.

use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Listing-availability filter sent with every query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Listed and the seller can currently trade.
    #[default]
    Available,
    /// Seller is online right now.
    Online,
    /// Any listing regardless of seller presence.
    Any,
}

/// Search settings as configured by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchSettings {
    /// Percentage applied to numeric thresholds in Similar mode.
    pub similar_percent: u32,
    /// Lower price bound in Divine Orbs, if configured.
    pub price_min: Option<f64>,
    /// Upper price bound in Divine Orbs, if configured.
    pub price_max: Option<f64>,
    pub trade_status: TradeStatus,
    /// League the searches run in.
    pub league: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            similar_percent: 80,
            price_min: None,
            price_max: None,
            trade_status: TradeStatus::default(),
            league: "Standard".to_string(),
        }
    }
}

impl SearchSettings {
    /// Load settings from a JSON file; absent keys fall back to defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading settings at {}", path.display()))?;
        serde_json::from_str(&body)
            .with_context(|| format!("parsing settings at {}", path.display()))
    }

    /// Whether either price bound is set to a usable value.
    pub(crate) fn has_price_filter(&self) -> bool {
        self.price_min.is_some_and(|p| p > 0.0) || self.price_max.is_some_and(|p| p > 0.0)
    }
}
