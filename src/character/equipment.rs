//! Items: equipment, item sets and consumables

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::stats::StatBlock;
use crate::effects::{Effect, StatusEffect};
use crate::error::ConfigurationError;

/// Equipment slot on a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    Weapon,
    Armor,
    Accessory,
}

impl Slot {
    /// Slots in dispatch order
    pub fn all() -> &'static [Slot] {
        &[Slot::Weapon, Slot::Armor, Slot::Accessory]
    }

    /// Whether an item of this type fits the slot
    pub fn accepts(&self, item_type: ItemType) -> bool {
        matches!(
            (self, item_type),
            (Slot::Weapon, ItemType::Weapon)
                | (Slot::Armor, ItemType::Armor)
                | (Slot::Accessory, ItemType::Accessory)
        )
    }
}

impl FromStr for Slot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weapon" => Ok(Slot::Weapon),
            "armor" | "armour" => Ok(Slot::Armor),
            "accessory" | "trinket" => Ok(Slot::Accessory),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Slot::Weapon => "weapon",
            Slot::Armor => "armor",
            Slot::Accessory => "accessory",
        };
        write!(f, "{}", s)
    }
}

/// Kind of item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Accessory,
    Consumable,
}

impl ItemType {
    /// The slot this item type occupies, if any
    pub fn slot(&self) -> Option<Slot> {
        match self {
            ItemType::Weapon => Some(Slot::Weapon),
            ItemType::Armor => Some(Slot::Armor),
            ItemType::Accessory => Some(Slot::Accessory),
            ItemType::Consumable => None,
        }
    }
}

/// Item rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Relative weight of this rarity in a loot roll
    pub fn drop_weight(&self) -> u32 {
        match self {
            Rarity::Common => 15,
            Rarity::Uncommon => 10,
            Rarity::Rare => 5,
            Rarity::Epic => 3,
            Rarity::Legendary => 1,
        }
    }
}

/// One threshold of an item set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTier {
    pub required_pieces: usize,
    pub stat_bonuses: StatBlock,
    pub effects: Vec<Effect>,
    pub description: String,
}

impl SetTier {
    pub fn new(required_pieces: usize, stat_bonuses: StatBlock, effects: Vec<Effect>) -> Self {
        Self {
            required_pieces,
            stat_bonuses,
            effects,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Stat bonuses plus the tier's passive stat effects
    pub fn layer(&self) -> StatBlock {
        let mut layer = self.stat_bonuses;
        for modifiers in self.effects.iter().filter_map(Effect::passive_modifiers) {
            layer.merge(modifiers);
        }
        layer
    }
}

/// Named group of items that grants bonuses when worn together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSet {
    name: String,
    tiers: Vec<SetTier>,
}

impl ItemSet {
    /// Create a set; tiers are kept sorted by piece count
    pub fn new(name: &str, mut tiers: Vec<SetTier>) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        let invalid = |detail: String| ConfigurationError::InvalidSet {
            name: name.to_string(),
            detail,
        };
        if tiers.is_empty() {
            return Err(invalid("a set needs at least one bonus tier".to_string()));
        }
        if let Some(tier) = tiers.iter().find(|t| t.required_pieces == 0) {
            return Err(invalid(format!(
                "tier '{}' requires zero pieces",
                tier.description
            )));
        }
        tiers.sort_by_key(|t| t.required_pieces);
        Ok(Self {
            name: name.to_string(),
            tiers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tiers(&self) -> &[SetTier] {
        &self.tiers
    }

    /// Indices of tiers satisfied by a piece count
    pub fn satisfied_tiers(&self, equipped: usize) -> Vec<usize> {
        self.tiers
            .iter()
            .enumerate()
            .filter(|(_, tier)| tier.required_pieces <= equipped)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Wearable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub modifiers: StatBlock,
    pub set: Option<ItemSet>,
    pub effects: Vec<Effect>,
    pub value: u32,
}

impl Equipment {
    /// Create a piece of equipment
    pub fn new(
        name: &str,
        item_type: ItemType,
        rarity: Rarity,
        modifiers: StatBlock,
    ) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if item_type.slot().is_none() {
            return Err(ConfigurationError::InvalidItem {
                name: name.to_string(),
                detail: "consumables cannot be worn".to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            item_type,
            rarity,
            modifiers,
            set: None,
            effects: Vec::new(),
            value: 0,
        })
    }

    /// Mark this item as a piece of a set
    pub fn in_set(mut self, set: &ItemSet) -> Self {
        self.set = Some(set.clone());
        self
    }

    /// Attach an effect
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set.as_ref().map(ItemSet::name)
    }

    /// Item modifiers plus passive stat effects
    pub fn layer(&self) -> StatBlock {
        let mut layer = self.modifiers;
        for modifiers in self.effects.iter().filter_map(Effect::passive_modifiers) {
            layer.merge(modifiers);
        }
        layer
    }
}

/// The three equipment slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlots {
    pub weapon: Option<Equipment>,
    pub armor: Option<Equipment>,
    pub accessory: Option<Equipment>,
}

impl EquipmentSlots {
    pub fn get(&self, slot: Slot) -> Option<&Equipment> {
        match slot {
            Slot::Weapon => self.weapon.as_ref(),
            Slot::Armor => self.armor.as_ref(),
            Slot::Accessory => self.accessory.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> &mut Option<Equipment> {
        match slot {
            Slot::Weapon => &mut self.weapon,
            Slot::Armor => &mut self.armor,
            Slot::Accessory => &mut self.accessory,
        }
    }

    /// Equipped items in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Equipment)> {
        Slot::all()
            .iter()
            .filter_map(move |slot| self.get(*slot).map(|item| (*slot, item)))
    }
}

/// What a consumable does when used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    RestoreHealth(i32),
    RestoreMana(i32),
    /// Remove an active status by name
    Cure(String),
    /// Apply a status to the chosen target
    Inflict(StatusEffect),
}

/// Single-use item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub name: String,
    pub rarity: Rarity,
    pub value: u32,
    pub effects: Vec<ConsumableEffect>,
}

impl Consumable {
    /// Create a consumable; it must do something
    pub fn new(
        name: &str,
        rarity: Rarity,
        effects: Vec<ConsumableEffect>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        let invalid = |detail: &str| ConfigurationError::InvalidItem {
            name: name.to_string(),
            detail: detail.to_string(),
        };
        if effects.is_empty() {
            return Err(invalid("consumable has no effect"));
        }
        for effect in &effects {
            match effect {
                ConsumableEffect::RestoreHealth(amount) | ConsumableEffect::RestoreMana(amount)
                    if *amount <= 0 =>
                {
                    return Err(invalid("restore amount must be positive"));
                }
                ConsumableEffect::Cure(status) if status.trim().is_empty() => {
                    return Err(invalid("cure names no status"));
                }
                _ => {}
            }
        }
        Ok(Self {
            name: name.to_string(),
            rarity,
            value: 0,
            effects,
        })
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Whether using this item needs an opponent to aim at
    pub fn is_offensive(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, ConsumableEffect::Inflict(_)))
    }
}
