//! Active status effects on a character
//!
//! Entries keep insertion order so ticking is deterministic. An entry never
//! holds zero remaining turns; it is removed instead.

use serde::{Deserialize, Serialize};

use super::kinds::StatusEffect;
use crate::character::StatBlock;

/// A status effect instance on a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Definition the instance was created from
    pub status: StatusEffect,
    /// Turns left before it expires
    pub remaining: u32,
    /// Potency, capped by the definition's stack limit
    pub stacks: u32,
    /// What applied it (item, effect or boss name)
    pub source: Option<String>,
}

impl ActiveEffect {
    pub fn name(&self) -> &str {
        self.status.name()
    }

    /// Stat deltas at current potency
    pub fn modifiers(&self) -> StatBlock {
        self.status.modifiers().scaled(self.stacks as i32)
    }

    /// Tick damage at current potency
    pub fn tick_damage(&self) -> i32 {
        self.status.tick_damage() * self.stacks as i32
    }
}

/// Insertion-ordered list of active effects, unique by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    entries: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn get(&self, name: &str) -> Option<&ActiveEffect> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ActiveEffect> {
        self.entries.iter_mut().find(|e| e.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name().to_string()).collect()
    }

    pub(crate) fn insert(&mut self, effect: ActiveEffect) {
        self.entries.push(effect);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<ActiveEffect> {
        let index = self.entries.iter().position(|e| e.name() == name)?;
        Some(self.entries.remove(index))
    }
}
