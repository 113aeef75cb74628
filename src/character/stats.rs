//! Stat aggregation
//!
//! A character's effective stats are its base values plus one layer per
//! contributing source (an equipped item, an active effect, an active set
//! tier). Layers are replaced or dropped whole, never patched in place, so
//! totals do not depend on the order sources came and went.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::equipment::Slot;
use crate::error::ConfigurationError;

/// Closed set of stats a modifier may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Defense,
    MaxHealth,
    MaxMana,
    MagicPower,
    Speed,
}

impl Stat {
    /// Number of stats
    pub const COUNT: usize = 6;

    /// Get all stats
    pub fn all() -> &'static [Stat] {
        &[
            Stat::Attack,
            Stat::Defense,
            Stat::MaxHealth,
            Stat::MaxMana,
            Stat::MagicPower,
            Stat::Speed,
        ]
    }

    fn index(self) -> usize {
        match self {
            Stat::Attack => 0,
            Stat::Defense => 1,
            Stat::MaxHealth => 2,
            Stat::MaxMana => 3,
            Stat::MagicPower => 4,
            Stat::Speed => 5,
        }
    }
}

impl FromStr for Stat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attack" | "atk" => Ok(Stat::Attack),
            "defense" | "def" => Ok(Stat::Defense),
            "max_health" | "health" | "hp" => Ok(Stat::MaxHealth),
            "max_mana" | "mana" | "mp" => Ok(Stat::MaxMana),
            "magic_power" | "magic" => Ok(Stat::MagicPower),
            "speed" | "spd" => Ok(Stat::Speed),
            _ => Err(ConfigurationError::UnknownStat(s.to_string())),
        }
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::MaxHealth => "max_health",
            Stat::MaxMana => "max_mana",
            Stat::MagicPower => "magic_power",
            Stat::Speed => "speed",
        };
        write!(f, "{}", s)
    }
}

/// One value per stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    values: [i32; Stat::COUNT],
}

impl StatBlock {
    /// Create an all-zero block
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, stat: Stat, value: i32) -> Self {
        self.values[stat.index()] = value;
        self
    }

    pub fn get(&self, stat: Stat) -> i32 {
        self.values[stat.index()]
    }

    pub fn set(&mut self, stat: Stat, value: i32) {
        self.values[stat.index()] = value;
    }

    pub fn add(&mut self, stat: Stat, delta: i32) {
        self.values[stat.index()] += delta;
    }

    /// Element-wise sum
    pub fn merge(&mut self, other: &StatBlock) {
        for (mine, theirs) in self.values.iter_mut().zip(other.values.iter()) {
            *mine += *theirs;
        }
    }

    /// Every value multiplied by `factor`
    pub fn scaled(&self, factor: i32) -> StatBlock {
        let mut block = *self;
        for value in block.values.iter_mut() {
            *value *= factor;
        }
        block
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }

    /// Non-zero entries in stat order
    pub fn iter(&self) -> impl Iterator<Item = (Stat, i32)> + '_ {
        Stat::all()
            .iter()
            .map(|stat| (*stat, self.get(*stat)))
            .filter(|(_, value)| *value != 0)
    }
}

/// Where a stat layer came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModifierSource {
    /// Item in an equipment slot, including its passive effects
    Equipment(Slot),
    /// Active timed effect, keyed by effect name
    Effect(String),
    /// One tier of an active item set
    SetBonus { set: String, tier: usize },
}

/// Base values plus per-source modifier layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTable {
    base: StatBlock,
    layers: BTreeMap<ModifierSource, StatBlock>,
}

impl StatTable {
    /// Create a table from base values
    pub fn new(base: StatBlock) -> Self {
        Self {
            base,
            layers: BTreeMap::new(),
        }
    }

    pub fn base(&self) -> &StatBlock {
        &self.base
    }

    /// Permanently change a base value (level-up growth)
    pub fn raise_base(&mut self, stat: Stat, delta: i32) {
        self.base.add(stat, delta);
    }

    /// Install a layer for a source, replacing any previous layer it had
    pub fn add(&mut self, source: ModifierSource, modifiers: StatBlock) {
        if modifiers.is_empty() {
            self.layers.remove(&source);
        } else {
            self.layers.insert(source, modifiers);
        }
    }

    /// Drop a source's layer, returning what it contributed
    pub fn remove(&mut self, source: &ModifierSource) -> Option<StatBlock> {
        self.layers.remove(source)
    }

    pub fn has_layer(&self, source: &ModifierSource) -> bool {
        self.layers.contains_key(source)
    }

    /// Base plus every layer for one stat
    pub fn total(&self, stat: Stat) -> i32 {
        self.base.get(stat) + self.layers.values().map(|layer| layer.get(stat)).sum::<i32>()
    }

    pub fn total_attack(&self) -> i32 {
        self.total(Stat::Attack)
    }

    pub fn total_defense(&self) -> i32 {
        self.total(Stat::Defense)
    }

    /// Every stat summed at once
    pub fn totals(&self) -> StatBlock {
        let mut totals = self.base;
        for layer in self.layers.values() {
            totals.merge(layer);
        }
        totals
    }
}
