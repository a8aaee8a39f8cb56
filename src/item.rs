//! Equipped-item data model.
//!
//! Items arrive from the equipment data provider already grouped into the
//! four trade-relevant categories. The shapes vary per category upstream;
//! here every record is a tagged [`ItemCategory`] plus a common attribute
//! surface, so downstream code matches on enums instead of probing optional
//! fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider grouping for an equipped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Equipment,
    Jewel,
    Flask,
    Charm,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equipment => "equipment",
            Self::Jewel => "jewel",
            Self::Flask => "flask",
            Self::Charm => "charm",
        };
        f.write_str(s)
    }
}

/// Rarity tier of an item. `Normal` is the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
}

impl Rarity {
    /// The trade API's `rarity` filter option string.
    pub fn as_option_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Magic => "magic",
            Self::Rare => "rare",
            Self::Unique => "unique",
        }
    }
}

/// Inventory slot an item is equipped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Weapon2,
    Offhand,
    Offhand2,
    Helm,
    BodyArmour,
    Gloves,
    Boots,
    Amulet,
    Ring,
    Ring2,
    Belt,
}

impl EquipSlot {
    /// Slots whose modifiers can roll item-intrinsic ("local") variants.
    /// Jewellery affects the character globally, so it is excluded.
    pub fn carries_local_mods(self) -> bool {
        !matches!(self, Self::Amulet | Self::Ring | Self::Ring2 | Self::Belt)
    }
}

/// The five modifier groups in the order queries are assembled from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModKind {
    Enchant,
    Implicit,
    Fractured,
    Explicit,
    Crafted,
}

impl ModKind {
    /// Fixed iteration order for query assembly.
    pub const ORDERED: [Self; 5] = [
        Self::Enchant,
        Self::Implicit,
        Self::Fractured,
        Self::Explicit,
        Self::Crafted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enchant => "enchant",
            Self::Implicit => "implicit",
            Self::Fractured => "fractured",
            Self::Explicit => "explicit",
            Self::Crafted => "crafted",
        }
    }
}

impl fmt::Display for ModKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enchant" => Ok(Self::Enchant),
            "implicit" => Ok(Self::Implicit),
            "fractured" => Ok(Self::Fractured),
            "explicit" => Ok(Self::Explicit),
            "crafted" => Ok(Self::Crafted),
            other => Err(format!("unknown modifier kind '{other}'")),
        }
    }
}

/// Modifier lines grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModLines {
    pub enchant: Vec<String>,
    pub implicit: Vec<String>,
    pub fractured: Vec<String>,
    pub explicit: Vec<String>,
    pub crafted: Vec<String>,
}

impl ModLines {
    pub fn group(&self, kind: ModKind) -> &[String] {
        match kind {
            ModKind::Enchant => &self.enchant,
            ModKind::Implicit => &self.implicit,
            ModKind::Fractured => &self.fractured,
            ModKind::Explicit => &self.explicit,
            ModKind::Crafted => &self.crafted,
        }
    }

    /// All lines with their kind, in the fixed group order.
    pub fn iter(&self) -> impl Iterator<Item = (ModKind, &str)> {
        ModKind::ORDERED
            .into_iter()
            .flat_map(|kind| self.group(kind).iter().map(move |m| (kind, m.as_str())))
    }
}

/// A display property line, e.g. `{"name": "Attacks per Second", "displayValues": ["1.45"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperty {
    pub name: String,
    #[serde(default)]
    pub display_values: Vec<String>,
}

impl ItemProperty {
    pub(crate) fn first_value(&self) -> Option<&str> {
        self.display_values.first().map(String::as_str)
    }
}

/// One equipped item as supplied by the data provider.
///
/// Absent attributes stay absent; the query synthesizer omits filters for
/// them rather than defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquippedItem {
    pub name: String,
    pub type_line: String,
    pub base_type: String,
    pub rarity: Rarity,
    pub slot: Option<EquipSlot>,
    pub identified: Option<bool>,
    pub ilvl: Option<u32>,
    pub quality: Option<u32>,
    pub armour: Option<u32>,
    pub evasion: Option<u32>,
    pub energy_shield: Option<u32>,
    pub spirit: Option<u32>,
    pub block: Option<u32>,
    pub double_corrupted: Option<bool>,
    pub fractured: Option<bool>,
    pub sanctified: Option<bool>,
    pub mirrored: Option<bool>,
    pub properties: Vec<ItemProperty>,
    pub mods: ModLines,
    /// Base names of socketed runes; informational only.
    pub socketed: Vec<String>,
}

impl Default for EquippedItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            type_line: String::new(),
            base_type: String::new(),
            rarity: Rarity::Normal,
            slot: None,
            identified: None,
            ilvl: None,
            quality: None,
            armour: None,
            evasion: None,
            energy_shield: None,
            spirit: None,
            block: None,
            double_corrupted: None,
            fractured: None,
            sanctified: None,
            mirrored: None,
            properties: Vec::new(),
            mods: ModLines::default(),
            socketed: Vec::new(),
        }
    }
}

impl EquippedItem {
    /// Whether modifiers on this item should be tried against the
    /// item-intrinsic ("local") index first. True for weapon and armour
    /// slots, and for anything carrying its own defence values.
    pub fn is_equipment(&self) -> bool {
        self.slot.is_some_and(EquipSlot::carries_local_mods)
            || self.armour.is_some()
            || self.evasion.is_some()
            || self.energy_shield.is_some()
    }

    /// Human-facing name for progress reporting.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.type_line.is_empty() {
            &self.type_line
        } else if !self.base_type.is_empty() {
            &self.base_type
        } else {
            "item"
        }
    }
}

/// A full equipped set, grouped the way the data provider delivers it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentSnapshot {
    pub items: Vec<EquippedItem>,
    pub jewels: Vec<EquippedItem>,
    pub flasks: Vec<EquippedItem>,
    pub charms: Vec<EquippedItem>,
}

impl EquipmentSnapshot {
    /// Every item with its category, in the fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemCategory, &EquippedItem)> {
        let groups = [
            (ItemCategory::Equipment, &self.items),
            (ItemCategory::Jewel, &self.jewels),
            (ItemCategory::Flask, &self.flasks),
            (ItemCategory::Charm, &self.charms),
        ];
        groups
            .into_iter()
            .flat_map(|(cat, items)| items.iter().map(move |i| (cat, i)))
    }

    pub fn len(&self) -> usize {
        self.items.len() + self.jewels.len() + self.flasks.len() + self.charms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jewellery_slots_are_not_local() {
        assert!(!EquipSlot::Ring.carries_local_mods());
        assert!(!EquipSlot::Amulet.carries_local_mods());
        assert!(EquipSlot::BodyArmour.carries_local_mods());
        assert!(EquipSlot::Weapon.carries_local_mods());
    }

    #[test]
    fn defences_imply_equipment_without_slot() {
        let item = EquippedItem {
            energy_shield: Some(120),
            ..EquippedItem::default()
        };
        assert!(item.is_equipment());
    }

    #[test]
    fn ring_with_no_defences_is_not_equipment() {
        let item = EquippedItem {
            slot: Some(EquipSlot::Ring),
            ..EquippedItem::default()
        };
        assert!(!item.is_equipment());
    }

    #[test]
    fn mod_lines_iterate_in_group_order() {
        let mods = ModLines {
            explicit: vec!["a".into()],
            implicit: vec!["b".into()],
            ..ModLines::default()
        };
        let order: Vec<_> = mods.iter().collect();
        assert_eq!(
            order,
            vec![(ModKind::Implicit, "b"), (ModKind::Explicit, "a")]
        );
    }

    #[test]
    fn snapshot_iterates_categories_in_order() {
        let snapshot = EquipmentSnapshot {
            items: vec![EquippedItem::default()],
            charms: vec![EquippedItem::default()],
            ..EquipmentSnapshot::default()
        };
        let cats: Vec<_> = snapshot.iter().map(|(c, _)| c).collect();
        assert_eq!(cats, vec![ItemCategory::Equipment, ItemCategory::Charm]);
        assert_eq!(snapshot.len(), 2);
    }
}
