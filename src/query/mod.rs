//! Trade-API query model.
//!
//! The wire shape the search endpoint accepts: a stat-filter list (one
//! AND-typed primary group plus OR-typed count groups for ambiguous ids),
//! optional structural filter groups, an optional price filter, and a sort
//! order. Queries are built fresh per item and mode, and immutable once
//! serialized. Empty groups are pruned before serialization so the endpoint
//! never sees `"filters": []`.

pub mod synth;

pub use synth::{QuerySynthesizer, SearchMode};

use serde::Serialize;

use crate::settings::TradeStatus;

/// A complete search request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeQuery {
    pub query: QueryBody,
    pub sort: SortOrder,
}

impl TradeQuery {
    /// Drop empty stat groups and filter groups. Called once at the end of
    /// synthesis; a query that only ever held an anchor stays valid.
    pub(crate) fn prune(&mut self) {
        self.query.stats.retain(|group| !group.filters.is_empty());
        if let Some(filters) = &mut self.query.filters {
            filters.prune();
            if filters.is_empty() {
                self.query.filters = None;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryBody {
    pub status: StatusFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<StatGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterGroups>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusFilter {
    pub option: TradeStatus,
}

/// A group of stat filters combined with AND or OR-count semantics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatGroup {
    #[serde(rename = "type")]
    pub group_type: StatGroupType,
    pub filters: Vec<StatFilter>,
    /// For count groups: how many of the filters must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Bound>,
}

impl StatGroup {
    /// The primary group: every filter in it must match.
    pub(crate) fn and() -> Self {
        Self {
            group_type: StatGroupType::And,
            filters: Vec::new(),
            value: None,
        }
    }

    /// An OR group over ambiguous ids: at least one must match.
    pub(crate) fn count(filters: Vec<StatFilter>) -> Self {
        Self {
            group_type: StatGroupType::Count,
            filters,
            value: Some(Bound::min(1.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatGroupType {
    And,
    Count,
}

/// One stat filter: a canonical id with an optional numeric bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatFilter {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Bound>,
}

/// A min and/or max threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bound {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bound {
    pub(crate) fn min(value: f64) -> Self {
        Self {
            min: Some(value),
            max: None,
        }
    }

    pub(crate) fn max(value: f64) -> Self {
        Self {
            min: None,
            max: Some(value),
        }
    }
}

/// A filter with a fixed option string, e.g. `rarity: {"option": "normal"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionFilter {
    pub option: String,
}

impl OptionFilter {
    pub(crate) fn new(option: impl Into<String>) -> Self {
        Self {
            option: option.into(),
        }
    }

    pub(crate) fn flag(value: bool) -> Self {
        Self::new(if value { "true" } else { "false" })
    }
}

/// The structural filter groups. Each group is wrapped in an enabled/disabled
/// envelope the way the endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterGroups {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_filters: Option<Group<TypeFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_filters: Option<Group<EquipmentFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc_filters: Option<Group<MiscFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_filters: Option<Group<TradeFilters>>,
}

impl FilterGroups {
    fn prune(&mut self) {
        if self.type_filters.as_ref().is_some_and(|g| g.filters.is_empty()) {
            self.type_filters = None;
        }
        if self
            .equipment_filters
            .as_ref()
            .is_some_and(|g| g.filters.is_empty())
        {
            self.equipment_filters = None;
        }
        if self.misc_filters.as_ref().is_some_and(|g| g.filters.is_empty()) {
            self.misc_filters = None;
        }
    }

    fn is_empty(&self) -> bool {
        self.type_filters.is_none()
            && self.equipment_filters.is_none()
            && self.misc_filters.is_none()
            && self.trade_filters.is_none()
    }
}

/// Enabled/disabled envelope around a filter group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<F> {
    pub disabled: bool,
    pub filters: F,
}

impl<F> Group<F> {
    pub(crate) fn enabled(filters: F) -> Self {
        Self {
            disabled: false,
            filters,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ilvl: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<OptionFilter>,
}

impl TypeFilters {
    fn is_empty(&self) -> bool {
        self.ilvl.is_none() && self.quality.is_none() && self.rarity.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquipmentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ar: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub es: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spirit: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aps: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit: Option<Bound>,
}

impl EquipmentFilters {
    fn is_empty(&self) -> bool {
        self.ar.is_none()
            && self.ev.is_none()
            && self.es.is_none()
            && self.spirit.is_none()
            && self.block.is_none()
            && self.aps.is_none()
            && self.crit.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiscFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ilvl: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twice_corrupted: Option<OptionFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified: Option<OptionFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fractured_item: Option<OptionFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanctified: Option<OptionFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirrored: Option<OptionFilter>,
}

impl MiscFilters {
    fn is_empty(&self) -> bool {
        self.ilvl.is_none()
            && self.twice_corrupted.is_none()
            && self.identified.is_none()
            && self.fractured_item.is_none()
            && self.sanctified.is_none()
            && self.mirrored.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeFilters {
    pub price: PriceFilter,
}

/// Price band denominated in Divine Orbs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceFilter {
    pub option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl PriceFilter {
    pub(crate) fn divine(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            option: "divine".to_string(),
            min: min.filter(|p| *p > 0.0),
            max: max.filter(|p| *p > 0.0),
        }
    }
}

/// Listings are always requested cheapest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub price: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            price: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
}
