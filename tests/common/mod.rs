//! Shared fixtures: a small but realistic matcher dataset and equipment
//! snapshots that exercise every category.

#![allow(dead_code)]

use rstest::fixture;
use std::collections::HashMap;

use exile_trade::item::{EquipSlot, EquipmentSnapshot, EquippedItem, ModKind, ModLines, Rarity};
use exile_trade::settings::SearchSettings;
use exile_trade::stats::{MatcherEntry, RawStatsDataset, StatsIndex};

pub fn matcher(pattern: &str, results: &[(ModKind, &[&str])]) -> MatcherEntry {
    MatcherEntry {
        matcher: pattern.to_string(),
        result: results
            .iter()
            .map(|(kind, ids)| (*kind, ids.iter().map(ToString::to_string).collect()))
            .collect(),
        template: HashMap::new(),
    }
}

/// A dataset slice covering global, local, ambiguous and valueless mods.
pub fn sample_dataset() -> RawStatsDataset {
    RawStatsDataset::from([
        (
            "energyshield".to_string(),
            vec![matcher(
                "increased maximum Energy Shield",
                &[(ModKind::Explicit, &["explicit.stat_2482852589"])],
            )],
        ),
        (
            "energyshieldlocal".to_string(),
            vec![matcher(
                "increased Energy Shield",
                &[(ModKind::Explicit, &["explicit.stat_4015621042"])],
            )],
        ),
        (
            "chaosresistance".to_string(),
            vec![matcher(
                "to Chaos Resistance",
                &[
                    (ModKind::Explicit, &["explicit.stat_2923486259"]),
                    (ModKind::Implicit, &["implicit.stat_2923486259"]),
                ],
            )],
        ),
        (
            "allattributes".to_string(),
            vec![matcher(
                "to all Attributes",
                &[(
                    ModKind::Explicit,
                    &["explicit.stat_1379411836", "explicit.stat_4080418644"],
                )],
            )],
        ),
        (
            "spellskills".to_string(),
            vec![matcher(
                "to Level of all Spell Skills",
                &[(ModKind::Explicit, &["explicit.stat_124131830"])],
            )],
        ),
        (
            "befrozen".to_string(),
            vec![matcher(
                "Cannot be Frozen",
                &[(ModKind::Explicit, &["explicit.stat_1514829491"])],
            )],
        ),
        (
            "movementspeed".to_string(),
            vec![matcher(
                "increased Movement Speed",
                &[(ModKind::Enchant, &["enchant.stat_2250533757"])],
            )],
        ),
    ])
}

#[fixture]
pub fn index() -> StatsIndex {
    StatsIndex::build(sample_dataset())
}

#[fixture]
pub fn settings() -> SearchSettings {
    SearchSettings::default()
}

pub fn explicit_mods(lines: &[&str]) -> ModLines {
    ModLines {
        explicit: lines.iter().map(ToString::to_string).collect(),
        ..ModLines::default()
    }
}

pub fn rare_helmet() -> EquippedItem {
    EquippedItem {
        base_type: "Spired Greathelm".to_string(),
        type_line: "Spired Greathelm".to_string(),
        rarity: Rarity::Rare,
        slot: Some(EquipSlot::Helm),
        ilvl: Some(79),
        armour: Some(220),
        identified: Some(true),
        mods: explicit_mods(&[
            "40% increased maximum Energy Shield",
            "+17% to [Resistances|Chaos Resistance]",
        ]),
        ..EquippedItem::default()
    }
}

pub fn unique_ring() -> EquippedItem {
    EquippedItem {
        name: "Doedre's Tenure".to_string(),
        base_type: "Sapphire Ring".to_string(),
        rarity: Rarity::Unique,
        slot: Some(EquipSlot::Ring),
        ilvl: Some(62),
        mods: explicit_mods(&["+20 to all Attributes"]),
        ..EquippedItem::default()
    }
}

pub fn sapphire_jewel() -> EquippedItem {
    EquippedItem {
        base_type: "Sapphire".to_string(),
        rarity: Rarity::Rare,
        mods: explicit_mods(&["+3 to Level of all Spell Skills"]),
        ..EquippedItem::default()
    }
}

/// An item the synthesizer must skip: no name, no type, no base.
pub fn anchorless_item() -> EquippedItem {
    EquippedItem {
        rarity: Rarity::Rare,
        mods: explicit_mods(&["+17% to Chaos Resistance"]),
        ..EquippedItem::default()
    }
}

#[fixture]
pub fn snapshot() -> EquipmentSnapshot {
    EquipmentSnapshot {
        items: vec![rare_helmet(), unique_ring()],
        jewels: vec![sapphire_jewel()],
        flasks: vec![anchorless_item()],
        charms: Vec::new(),
    }
}
