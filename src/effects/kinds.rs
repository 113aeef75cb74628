//! Effect definitions
//!
//! Two families:
//! - `StatusEffect`: timed, applied onto a character (poison, buffs, curses)
//! - `Effect`: attached to an item or set tier, fires on a `Trigger`
//!
//! Both are validated when constructed; a definition that made it past its
//! constructor never fails at runtime.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::character::StatBlock;
use crate::error::ConfigurationError;

/// Event that makes an attached effect fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Holder landed a hit
    OnHit,
    /// Holder was hit
    OnHitTaken,
    /// Holder dropped an opponent
    OnKill,
    /// Start of every round
    TurnStart,
    /// End of every round, before effects tick
    TurnEnd,
    /// Always on; contributes stats while attached
    Passive,
}

impl FromStr for Trigger {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on_hit" | "hit" => Ok(Trigger::OnHit),
            "on_hit_taken" | "hit_taken" => Ok(Trigger::OnHitTaken),
            "on_kill" | "kill" => Ok(Trigger::OnKill),
            "on_turn_start" | "turn_start" => Ok(Trigger::TurnStart),
            "on_turn_end" | "turn_end" => Ok(Trigger::TurnEnd),
            "passive" => Ok(Trigger::Passive),
            _ => Err(ConfigurationError::InvalidEffect {
                name: s.to_string(),
                detail: "unknown trigger".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trigger::OnHit => "on_hit",
            Trigger::OnHitTaken => "on_hit_taken",
            Trigger::OnKill => "on_kill",
            Trigger::TurnStart => "turn_start",
            Trigger::TurnEnd => "turn_end",
            Trigger::Passive => "passive",
        };
        write!(f, "{}", s)
    }
}

fn check_chance(name: &str, chance: f64) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&chance) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidChance {
            name: name.to_string(),
            chance,
        })
    }
}

/// A timed effect that lives in a character's active-effect list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    name: String,
    duration: u32,
    modifiers: StatBlock,
    tick_damage: i32,
    chance: f64,
    stack_limit: u32,
}

impl StatusEffect {
    /// Create a status effect that always applies and does not stack
    pub fn new(name: &str, duration: u32) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if duration == 0 {
            return Err(ConfigurationError::ZeroDuration {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            duration,
            modifiers: StatBlock::new(),
            tick_damage: 0,
            chance: 1.0,
            stack_limit: 1,
        })
    }

    /// Stat deltas held while active
    pub fn with_modifiers(mut self, modifiers: StatBlock) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Damage per tick, bypassing defense
    pub fn with_tick_damage(mut self, damage: i32) -> Result<Self, ConfigurationError> {
        if damage < 0 {
            return Err(ConfigurationError::NegativeTickDamage {
                name: self.name,
                damage,
            });
        }
        self.tick_damage = damage;
        Ok(self)
    }

    /// Probability the effect takes hold when applied
    pub fn with_chance(mut self, chance: f64) -> Result<Self, ConfigurationError> {
        check_chance(&self.name, chance)?;
        self.chance = chance;
        Ok(self)
    }

    /// How many applications may stack into potency
    pub fn with_stack_limit(mut self, limit: u32) -> Result<Self, ConfigurationError> {
        if limit == 0 {
            return Err(ConfigurationError::ZeroStackLimit { name: self.name });
        }
        self.stack_limit = limit;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn modifiers(&self) -> &StatBlock {
        &self.modifiers
    }

    pub fn tick_damage(&self) -> i32 {
        self.tick_damage
    }

    pub fn chance(&self) -> f64 {
        self.chance
    }

    pub fn stack_limit(&self) -> u32 {
        self.stack_limit
    }
}

/// Behaviour of an attached effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Flat stat deltas while attached
    StatModifier { modifiers: StatBlock },
    /// Chance to inflict a status on the other party
    OnHit { proc_chance: f64, status: StatusEffect },
    /// Heal the holder for a share of damage dealt
    Lifesteal { heal_percent: f64 },
    /// Extra damage as a share of the hit
    BonusDamage { proc_chance: f64, percent: f64 },
    /// Extra damage scaled from the holder's magic power
    VoidBolt { proc_chance: f64, magic_ratio: f64 },
    /// Chance to negate an incoming hit entirely
    VoidShield { block_chance: f64 },
    /// Chance to turn an incoming hit into a short defense buff
    Absorb {
        proc_chance: f64,
        divisor: i32,
        cap: i32,
        duration: u32,
    },
    /// Restore health and mana to the holder
    Regeneration { health: i32, mana: i32 },
}

impl EffectKind {
    /// Short name for messages
    pub fn label(&self) -> &'static str {
        match self {
            EffectKind::StatModifier { .. } => "stat modifier",
            EffectKind::OnHit { .. } => "on-hit",
            EffectKind::Lifesteal { .. } => "lifesteal",
            EffectKind::BonusDamage { .. } => "bonus damage",
            EffectKind::VoidBolt { .. } => "void bolt",
            EffectKind::VoidShield { .. } => "void shield",
            EffectKind::Absorb { .. } => "absorb",
            EffectKind::Regeneration { .. } => "regeneration",
        }
    }

    /// Whether this behaviour makes sense for a trigger
    pub fn allows(&self, trigger: Trigger) -> bool {
        match self {
            EffectKind::StatModifier { .. } => trigger == Trigger::Passive,
            EffectKind::OnHit { .. } => matches!(trigger, Trigger::OnHit | Trigger::OnHitTaken),
            EffectKind::Lifesteal { .. }
            | EffectKind::BonusDamage { .. }
            | EffectKind::VoidBolt { .. } => trigger == Trigger::OnHit,
            EffectKind::VoidShield { .. } | EffectKind::Absorb { .. } => {
                trigger == Trigger::OnHitTaken
            }
            EffectKind::Regeneration { .. } => matches!(
                trigger,
                Trigger::TurnStart | Trigger::TurnEnd | Trigger::OnKill
            ),
        }
    }

    /// Natural trigger for each behaviour
    pub fn default_trigger(&self) -> Trigger {
        match self {
            EffectKind::StatModifier { .. } => Trigger::Passive,
            EffectKind::OnHit { .. }
            | EffectKind::Lifesteal { .. }
            | EffectKind::BonusDamage { .. }
            | EffectKind::VoidBolt { .. } => Trigger::OnHit,
            EffectKind::VoidShield { .. } | EffectKind::Absorb { .. } => Trigger::OnHitTaken,
            EffectKind::Regeneration { .. } => Trigger::TurnStart,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigurationError> {
        let invalid = |detail: &str| ConfigurationError::InvalidEffect {
            name: name.to_string(),
            detail: detail.to_string(),
        };
        match self {
            EffectKind::StatModifier { modifiers } => {
                if modifiers.is_empty() {
                    return Err(invalid("stat modifier changes nothing"));
                }
            }
            EffectKind::OnHit { proc_chance, .. } => check_chance(name, *proc_chance)?,
            EffectKind::Lifesteal { heal_percent } => check_chance(name, *heal_percent)?,
            EffectKind::BonusDamage {
                proc_chance,
                percent,
            } => {
                check_chance(name, *proc_chance)?;
                if *percent < 0.0 {
                    return Err(invalid("bonus percent must not be negative"));
                }
            }
            EffectKind::VoidBolt {
                proc_chance,
                magic_ratio,
            } => {
                check_chance(name, *proc_chance)?;
                if *magic_ratio < 0.0 {
                    return Err(invalid("magic ratio must not be negative"));
                }
            }
            EffectKind::VoidShield { block_chance } => check_chance(name, *block_chance)?,
            EffectKind::Absorb {
                proc_chance,
                divisor,
                cap,
                duration,
            } => {
                check_chance(name, *proc_chance)?;
                if *divisor <= 0 || *cap < 0 {
                    return Err(invalid("absorb needs a positive divisor and non-negative cap"));
                }
                if *duration == 0 {
                    return Err(ConfigurationError::ZeroDuration {
                        name: name.to_string(),
                    });
                }
            }
            EffectKind::Regeneration { health, mana } => {
                if *health < 0 || *mana < 0 {
                    return Err(invalid("regeneration must not drain"));
                }
            }
        }
        Ok(())
    }
}

/// An effect granted by an item or a set tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    name: String,
    trigger: Trigger,
    kind: EffectKind,
}

impl Effect {
    /// Create an effect on an explicit trigger
    pub fn new(name: &str, trigger: Trigger, kind: EffectKind) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if !kind.allows(trigger) {
            return Err(ConfigurationError::TriggerMismatch {
                name: name.to_string(),
                kind: kind.label(),
                trigger: trigger.to_string(),
            });
        }
        kind.validate(name)?;
        Ok(Self {
            name: name.to_string(),
            trigger,
            kind,
        })
    }

    /// Create an effect on its behaviour's natural trigger
    pub fn simple(name: &str, kind: EffectKind) -> Result<Self, ConfigurationError> {
        let trigger = kind.default_trigger();
        Self::new(name, trigger, kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Stat deltas this effect contributes while attached
    pub fn passive_modifiers(&self) -> Option<&StatBlock> {
        match &self.kind {
            EffectKind::StatModifier { modifiers } => Some(modifiers),
            _ => None,
        }
    }
}
