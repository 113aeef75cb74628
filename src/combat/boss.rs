//! Boss phase control
//!
//! A boss fights in phase 1 until its health fraction drops to the rage
//! threshold, then switches to phase 2 for good. The switch is marked
//! by one empowered cast of the boss's last skill.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::damage::scale_floor;
use crate::character::{Skill, SkillRegistry};
use crate::error::ConfigurationError;

/// Damage multiplier for the empowered rage skill
pub const RAGE_DAMAGE_MULTIPLIER: f64 = 1.5;
/// Mana cost multiplier for the empowered rage skill
pub const RAGE_MANA_MULTIPLIER: f64 = 0.7;
/// Cooldown stamped on the empowered rage skill
pub const RAGE_COOLDOWN: u32 = 3;

/// Boss fight phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Normal,
    Rage,
}

impl Phase {
    /// 1 or 2
    pub fn number(&self) -> u8 {
        match self {
            Phase::Normal => 1,
            Phase::Rage => 2,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase {}", self.number())
    }
}

/// What a boss does this turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BossAction {
    /// Empowered rage skill, cast on entering phase 2
    Rage(Skill),
    /// Ordinary skill, now on cooldown
    Skill(Skill),
    /// Nothing ready
    BasicAttack,
}

/// Tracks a boss's phase and picks its actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPhaseController {
    phase: Phase,
    rage_threshold: f64,
}

impl BossPhaseController {
    /// Start in phase 1 with a threshold in `[0, 1]`
    pub fn new(rage_threshold: f64) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&rage_threshold) {
            return Err(ConfigurationError::InvalidSetting {
                key: "rage_threshold",
                detail: format!("{} is outside [0, 1]", rage_threshold),
            });
        }
        Ok(Self {
            phase: Phase::Normal,
            rage_threshold,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rage_threshold(&self) -> f64 {
        self.rage_threshold
    }

    /// Choose the boss's action for this turn.
    ///
    /// Crossing the threshold in phase 1 moves to phase 2 and returns the
    /// empowered last skill regardless of its cooldown. Otherwise the first
    /// skill off cooldown is used; with none ready, a basic attack.
    pub fn priority_action(&mut self, skills: &mut SkillRegistry, hp_fraction: f64) -> BossAction {
        if self.phase == Phase::Normal && hp_fraction <= self.rage_threshold {
            self.phase = Phase::Rage;
            info!(
                "Boss enters {} at {:.0}% health",
                self.phase,
                hp_fraction * 100.0
            );
            return match skills.last() {
                Some(skill) => BossAction::Rage(empower(skill)),
                None => BossAction::BasicAttack,
            };
        }

        match skills.first_available().and_then(|index| skills.use_skill(index)) {
            Some(skill) => {
                debug!("Boss uses {}", skill.name());
                BossAction::Skill(skill)
            }
            None => BossAction::BasicAttack,
        }
    }
}

/// Rage variant of a skill; the stored definition is left alone
pub fn empower(skill: &Skill) -> Skill {
    skill.variant(
        &format!("Empowered {}", skill.name()),
        scale_floor(skill.damage(), RAGE_DAMAGE_MULTIPLIER),
        scale_floor(skill.mana_cost(), RAGE_MANA_MULTIPLIER),
        RAGE_COOLDOWN,
    )
}
