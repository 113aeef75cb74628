//! Error taxonomy
//!
//! Three families of failure, each with a different blast radius:
//! - `ConfigurationError`: malformed definitions, raised while building content
//! - `InvalidAction`: a rejected selection, the turn is not consumed
//! - `InvariantViolation`: an out-of-range value that was clamped and logged

use thiserror::Error;

use crate::character::{Equipment, Slot};

/// Malformed item, effect, skill or balance definitions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("definition name must not be empty")]
    EmptyName,

    #[error("unknown stat '{0}'")]
    UnknownStat(String),

    #[error("effect '{name}': duration must be at least one turn")]
    ZeroDuration { name: String },

    #[error("effect '{name}': chance {chance} is outside [0, 1]")]
    InvalidChance { name: String, chance: f64 },

    #[error("effect '{name}': stack limit must be at least 1")]
    ZeroStackLimit { name: String },

    #[error("effect '{name}': tick damage must not be negative ({damage})")]
    NegativeTickDamage { name: String, damage: i32 },

    #[error("effect '{name}': {kind} cannot fire on {trigger}")]
    TriggerMismatch {
        name: String,
        kind: &'static str,
        trigger: String,
    },

    #[error("effect '{name}': {detail}")]
    InvalidEffect { name: String, detail: String },

    #[error("skill '{name}': {detail}")]
    InvalidSkill { name: String, detail: String },

    #[error("item '{name}': {detail}")]
    InvalidItem { name: String, detail: String },

    #[error("set '{name}': {detail}")]
    InvalidSet { name: String, detail: String },

    #[error("character '{name}': {detail}")]
    InvalidCharacter { name: String, detail: String },

    #[error("invalid balance setting {key}: {detail}")]
    InvalidSetting { key: &'static str, detail: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// A player selection the resolver refused; nothing was consumed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAction {
    #[error("no skill at index {0}")]
    UnknownSkill(usize),

    #[error("{name} is on cooldown for {remaining} more turn(s)")]
    SkillOnCooldown { name: String, remaining: u32 },

    #[error("not enough mana for {name} ({available}/{required})")]
    InsufficientMana {
        name: String,
        required: i32,
        available: i32,
    },

    #[error("no usable item at index {0}")]
    UnknownItem(usize),

    #[error("no living target at index {0}")]
    InvalidTarget(usize),

    #[error("combat is already over")]
    CombatFinished,

    #[error("waiting for the turn to resolve, not for an action")]
    NotAwaitingAction,

    #[error("an action must be submitted before the turn can advance")]
    ActionRequired,
}

/// Equipment mutation refused; the item is handed back untouched
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquipError {
    #[error("{} cannot be equipped in the {slot} slot", .item.name)]
    InvalidSlot { item: Box<Equipment>, slot: Slot },
}

impl EquipError {
    /// Recover the refused item
    pub fn into_item(self) -> Equipment {
        match self {
            EquipError::InvalidSlot { item, .. } => *item,
        }
    }
}

/// A resource left its valid range and was clamped back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{character}: health {value} outside [0, {max}]")]
    Health {
        character: String,
        value: i32,
        max: i32,
    },

    #[error("{character}: mana {value} outside [0, {max}]")]
    Mana {
        character: String,
        value: i32,
        max: i32,
    },
}
