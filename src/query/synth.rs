//! Query synthesis: one equipped item plus a search mode in, one trade query out.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::item::{EquippedItem, Rarity};
use crate::query::{
    Bound, EquipmentFilters, FilterGroups, Group, MiscFilters, OptionFilter, PriceFilter,
    QueryBody, SortOrder, StatFilter, StatGroup, StatusFilter, TradeFilters, TradeQuery,
    TypeFilters,
};
use crate::resolve::ModResolver;
use crate::settings::SearchSettings;
use crate::stats::StatsIndex;
use crate::text::{normalize_mod_text, strip_control_chars};

/// Critical-chance property values look like `"6.5%"`.
static CRIT_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d.]+)%").unwrap());

/// How strictly the synthesized query matches the source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Numeric thresholds scaled by the user's configured percentage.
    Similar,
    /// Full values plus structural filters from the item's own attributes.
    Exact,
    /// Base type and minimum item level only; modifiers are ignored.
    BaseOnly,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "similar" => Ok(Self::Similar),
            "exact" => Ok(Self::Exact),
            "base" => Ok(Self::BaseOnly),
            other => Err(format!("unknown search mode '{other}' (similar|exact|base)")),
        }
    }
}

/// What a scaled modifier value contributes to its filter.
enum Scaled {
    /// A usable threshold.
    Bound(Bound),
    /// No extractable value; the filter matches on presence alone.
    Bare,
    /// The threshold collapsed below 1; the filter is dropped entirely.
    Skip,
}

/// The name/type search anchor. At least one half is always present.
struct Anchor {
    name: Option<String>,
    type_line: Option<String>,
}

/// Builds trade queries from equipped items against a shared [`StatsIndex`].
///
/// Pure and reentrant: the only state is the read-only index and settings,
/// so one synthesizer serves any number of items concurrently.
pub struct QuerySynthesizer<'a> {
    resolver: ModResolver<'a>,
    settings: &'a SearchSettings,
}

impl<'a> QuerySynthesizer<'a> {
    pub fn new(index: &'a StatsIndex, settings: &'a SearchSettings) -> Self {
        Self {
            resolver: ModResolver::new(index),
            settings,
        }
    }

    /// Synthesize the query for one item in the given mode.
    ///
    /// Returns `None` only when the item has no searchable anchor (neither a
    /// name nor a resolvable base type). An item whose modifiers all fail to
    /// resolve still yields a valid anchor-only query.
    pub fn synthesize(&self, item: &EquippedItem, mode: SearchMode) -> Option<TradeQuery> {
        let anchor = derive_anchor(item)?;

        if mode == SearchMode::BaseOnly {
            // A unique with a name but no resolvable base cannot be base-searched.
            return anchor
                .type_line
                .map(|base| self.base_only_query(item, base));
        }

        let mut query = TradeQuery {
            query: QueryBody {
                status: StatusFilter {
                    option: self.settings.trade_status,
                },
                name: anchor.name,
                type_line: anchor.type_line,
                stats: vec![StatGroup::and()],
                filters: None,
            },
            sort: SortOrder::default(),
        };

        // Uniques in Similar mode are adequately identified by name alone;
        // everything else gets stat filters.
        let add_stat_filters = !(item.rarity == Rarity::Unique && mode == SearchMode::Similar);
        if add_stat_filters {
            self.add_stat_filters(item, mode, &mut query);
        }

        let mut groups = FilterGroups::default();
        if mode == SearchMode::Exact {
            self.add_exact_filters(item, &mut groups);
        }
        groups.trade_filters = self.price_filter();
        query.query.filters = Some(groups);

        query.prune();
        Some(query)
    }

    /// Resolve every modifier line and emit its stat filter.
    fn add_stat_filters(&self, item: &EquippedItem, mode: SearchMode, query: &mut TradeQuery) {
        let multiplier = match mode {
            SearchMode::Exact => 1.0,
            SearchMode::Similar => f64::from(self.settings.similar_percent) / 100.0,
            SearchMode::BaseOnly => unreachable!("base-only queries carry no stat filters"),
        };
        let is_equipment = item.is_equipment();

        for (kind, line) in item.mods.iter() {
            let Some(resolved) = self.resolver.resolve(line, kind, is_equipment) else {
                tracing::debug!("Unresolved {} modifier '{}'", kind, line);
                continue;
            };

            let scaled = scale_value(resolved.numeric_value, multiplier);
            match (&resolved.canonical_ids[..], scaled) {
                (_, Scaled::Skip) => {
                    tracing::debug!("Threshold below 1 after scaling, dropping '{}'", line);
                }
                ([id], bound) => {
                    query.query.stats[0].filters.push(StatFilter {
                        id: id.clone(),
                        value: match bound {
                            Scaled::Bound(b) => Some(b),
                            _ => None,
                        },
                    });
                }
                (ids, bound) => {
                    // Ambiguous mapping: any one of the ids satisfies the mod.
                    let value = match bound {
                        Scaled::Bound(b) => Some(b),
                        _ => None,
                    };
                    let filters = ids
                        .iter()
                        .map(|id| StatFilter {
                            id: id.clone(),
                            value,
                        })
                        .collect();
                    query.query.stats.push(StatGroup::count(filters));
                }
            }
        }
    }

    /// Structural filters for Exact mode, taken from the item's own
    /// attributes. Absent attributes are omitted, never defaulted.
    fn add_exact_filters(&self, item: &EquippedItem, groups: &mut FilterGroups) {
        let type_filters = TypeFilters {
            ilvl: positive_bound(item.ilvl),
            quality: positive_bound(item.quality),
            rarity: Some(OptionFilter::new(item.rarity.as_option_str())),
        };

        let mut equipment = EquipmentFilters {
            ar: positive_bound(item.armour),
            ev: positive_bound(item.evasion),
            es: positive_bound(item.energy_shield),
            spirit: positive_bound(item.spirit),
            block: positive_bound(item.block),
            aps: None,
            crit: None,
        };
        for prop in &item.properties {
            let Some(value) = prop.first_value() else {
                continue;
            };
            let prop_name = prop.name.to_lowercase();
            if prop_name.contains("attacks per second") {
                if let Ok(aps) = value.parse::<f64>() {
                    if aps > 0.0 {
                        equipment.aps = Some(Bound::min((aps * 100.0).floor() / 100.0));
                    }
                }
            } else if prop_name.contains("critical") {
                if let Some(caps) = CRIT_VALUE.captures(value) {
                    if let Ok(crit) = caps[1].parse::<f64>() {
                        equipment.crit = Some(Bound::min(crit));
                    }
                }
            }
        }

        let misc = MiscFilters {
            ilvl: None,
            twice_corrupted: flag_if_set(item.double_corrupted),
            identified: item.identified.map(OptionFilter::flag),
            fractured_item: flag_if_set(item.fractured),
            sanctified: flag_if_set(item.sanctified),
            mirrored: flag_if_set(item.mirrored),
        };

        if !item.socketed.is_empty() {
            tracing::debug!(
                "Item '{}' has {} socketed runes: {}",
                item.display_name(),
                item.socketed.len(),
                item.socketed.join(", ")
            );
        }

        groups.type_filters = Some(Group::enabled(type_filters));
        groups.equipment_filters = Some(Group::enabled(equipment));
        groups.misc_filters = Some(Group::enabled(misc));
    }

    /// Base-type search for crafting bases: anchor type, lowest rarity tier,
    /// minimum item level. No modifier processing at all.
    fn base_only_query(&self, item: &EquippedItem, base: String) -> TradeQuery {
        let mut groups = FilterGroups {
            type_filters: Some(Group::enabled(TypeFilters {
                ilvl: None,
                quality: None,
                rarity: Some(OptionFilter::new(Rarity::Normal.as_option_str())),
            })),
            ..FilterGroups::default()
        };
        if let Some(ilvl) = positive_bound(item.ilvl) {
            groups.misc_filters = Some(Group::enabled(MiscFilters {
                ilvl: Some(ilvl),
                ..MiscFilters::default()
            }));
        }
        groups.trade_filters = self.price_filter();

        let mut query = TradeQuery {
            query: QueryBody {
                status: StatusFilter {
                    option: self.settings.trade_status,
                },
                name: None,
                type_line: Some(base),
                stats: Vec::new(),
                filters: Some(groups),
            },
            sort: SortOrder::default(),
        };
        query.prune();
        query
    }

    /// Price band filter, attached independent of mode.
    fn price_filter(&self) -> Option<Group<TradeFilters>> {
        self.settings.has_price_filter().then(|| {
            Group::enabled(TradeFilters {
                price: PriceFilter::divine(self.settings.price_min, self.settings.price_max),
            })
        })
    }
}

/// Scale an extracted value by the mode multiplier.
///
/// Positive values become a floored minimum and are dropped when that
/// minimum lands below 1; negative (reduced) values are bounded from above
/// with a ceiled maximum instead.
fn scale_value(value: Option<f64>, multiplier: f64) -> Scaled {
    match value {
        None => Scaled::Bare,
        Some(v) if v > 0.0 => {
            let min = (v * multiplier).floor();
            if min < 1.0 {
                Scaled::Skip
            } else {
                Scaled::Bound(Bound::min(min))
            }
        }
        Some(v) if v < 0.0 => Scaled::Bound(Bound::max((v * multiplier).ceil())),
        Some(_) => Scaled::Skip,
    }
}

/// Derive the search anchor. Unique items anchor on their exact name plus
/// base type; everything else anchors on the base type alone.
fn derive_anchor(item: &EquippedItem) -> Option<Anchor> {
    let name = strip_control_chars(&normalize_mod_text(&item.name));
    let type_line = strip_control_chars(&normalize_mod_text(&item.type_line));
    let base_type = strip_control_chars(&normalize_mod_text(&item.base_type));

    let anchor_type = if base_type.is_empty() {
        type_line
    } else {
        base_type
    };

    if item.rarity == Rarity::Unique && !name.is_empty() {
        Some(Anchor {
            name: Some(name),
            type_line: (!anchor_type.is_empty()).then_some(anchor_type),
        })
    } else if !anchor_type.is_empty() {
        Some(Anchor {
            name: None,
            type_line: Some(anchor_type),
        })
    } else {
        None
    }
}

fn positive_bound(value: Option<u32>) -> Option<Bound> {
    value.filter(|v| *v > 0).map(|v| Bound::min(f64::from(v)))
}

fn flag_if_set(value: Option<bool>) -> Option<OptionFilter> {
    (value == Some(true)).then(|| OptionFilter::flag(true))
}
