//! Balance configuration
//!
//! Every tunable number in one place. Values come from built-in defaults,
//! then an optional TOML file, then `HOPEBANE_`-prefixed environment
//! variables (nested keys split on `__`, e.g.
//! `HOPEBANE_ENCOUNTERS__BOSS_INTERVAL=6`).

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::{Stat, StatBlock};
use crate::error::ConfigurationError;

/// Exploration steps between boss fights
pub const DEFAULT_BOSS_INTERVAL: i32 = 8;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "HOPEBANE_";

/// Combat tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    /// Jitter on player weapon attacks
    pub attack_jitter: (i32, i32),
    /// Jitter on player skills
    pub skill_jitter: (i32, i32),
    /// Jitter on enemy basic attacks
    pub enemy_jitter: (i32, i32),
    /// Jitter on boss basic attacks
    pub boss_jitter: (i32, i32),
    /// Added to a counter-attack after a failed retreat
    pub counter_jitter: (i32, i32),
    pub escape_base_chance: f64,
    /// Escape chance lost per opponent level
    pub escape_level_penalty: f64,
    /// Rounds before a fight is called off as a retreat
    pub max_turns: u32,
    /// Rejected selections in a row before `run` falls back to an attack
    pub max_invalid_actions: u32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            attack_jitter: (-2, 2),
            skill_jitter: (-3, 3),
            enemy_jitter: (-1, 1),
            boss_jitter: (-2, 2),
            counter_jitter: (1, 3),
            escape_base_chance: 0.7,
            escape_level_penalty: 0.05,
            max_turns: 500,
            max_invalid_actions: 8,
        }
    }
}

impl CombatSettings {
    /// Settings with every jitter range collapsed to zero
    pub fn without_jitter() -> Self {
        Self {
            attack_jitter: (0, 0),
            skill_jitter: (0, 0),
            enemy_jitter: (0, 0),
            boss_jitter: (0, 0),
            counter_jitter: (0, 0),
            ..Self::default()
        }
    }

    /// Chance to flee from an opponent of `level`, kept in `[0, 1]`
    pub fn escape_chance(&self, level: u32) -> f64 {
        (self.escape_base_chance - level as f64 * self.escape_level_penalty).clamp(0.0, 1.0)
    }
}

/// Encounter pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterSettings {
    pub boss_interval: i32,
    /// When set, each reset rolls the next interval from this range
    pub boss_interval_range: Option<(i32, i32)>,
    /// Decisions remembered for weighting
    pub history_len: usize,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            boss_interval: DEFAULT_BOSS_INTERVAL,
            boss_interval_range: None,
            history_len: 3,
        }
    }
}

/// Rewards and level-up growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionSettings {
    pub gold_per_level: u32,
    /// Gold rolls land within this share of the base amount
    pub gold_variance: f64,
    pub exp_multiplier: f64,
    pub health_increase: i32,
    pub mana_increase: i32,
    pub attack_increase: i32,
    pub defense_increase: i32,
    /// Chance an ordinary opponent drops an item, before level scaling
    pub drop_chance: f64,
    /// Added to the drop chance per opponent level
    pub drop_chance_per_level: f64,
    /// Items a boss always drops
    pub boss_drops: u32,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            gold_per_level: 10,
            gold_variance: 0.2,
            exp_multiplier: 1.5,
            health_increase: 20,
            mana_increase: 15,
            attack_increase: 5,
            defense_increase: 3,
            drop_chance: 0.3,
            drop_chance_per_level: 0.01,
            boss_drops: 2,
        }
    }
}

impl ProgressionSettings {
    /// Base stat growth for one level
    pub fn growth(&self) -> StatBlock {
        StatBlock::new()
            .with(Stat::MaxHealth, self.health_increase)
            .with(Stat::MaxMana, self.mana_increase)
            .with(Stat::Attack, self.attack_increase)
            .with(Stat::Defense, self.defense_increase)
    }

    /// Drop chance for an ordinary opponent of `level`, capped at 1
    pub fn drop_chance_at(&self, level: u32) -> f64 {
        (self.drop_chance + level as f64 * self.drop_chance_per_level).min(1.0)
    }
}

/// All balance settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub combat: CombatSettings,
    pub encounters: EncounterSettings,
    pub progression: ProgressionSettings,
}

impl BalanceConfig {
    /// Load defaults, an optional TOML file and the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut figment = Figment::from(Serialized::defaults(BalanceConfig::default()));
        if let Some(path) = path {
            debug!("Loading balance config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: BalanceConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document over the defaults, ignoring the environment
    pub fn from_toml(source: &str) -> Result<Self, ConfigurationError> {
        let config: BalanceConfig = Figment::from(Serialized::defaults(BalanceConfig::default()))
            .merge(Toml::string(source))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inverted ranges, impossible probabilities and empty intervals
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let combat = &self.combat;
        for (key, range) in [
            ("combat.attack_jitter", combat.attack_jitter),
            ("combat.skill_jitter", combat.skill_jitter),
            ("combat.enemy_jitter", combat.enemy_jitter),
            ("combat.boss_jitter", combat.boss_jitter),
            ("combat.counter_jitter", combat.counter_jitter),
        ] {
            check_range(key, range)?;
        }
        check_probability("combat.escape_base_chance", combat.escape_base_chance)?;
        check_probability("combat.escape_level_penalty", combat.escape_level_penalty)?;
        if combat.max_turns == 0 {
            return Err(invalid("combat.max_turns", "must be at least 1"));
        }
        if combat.max_invalid_actions == 0 {
            return Err(invalid("combat.max_invalid_actions", "must be at least 1"));
        }

        let encounters = &self.encounters;
        if encounters.boss_interval <= 0 {
            return Err(invalid("encounters.boss_interval", "must be positive"));
        }
        if let Some(range) = encounters.boss_interval_range {
            check_range("encounters.boss_interval_range", range)?;
            if range.0 <= 0 {
                return Err(invalid(
                    "encounters.boss_interval_range",
                    "lower bound must be positive",
                ));
            }
        }

        let progression = &self.progression;
        check_probability("progression.gold_variance", progression.gold_variance)?;
        check_probability("progression.drop_chance", progression.drop_chance)?;
        check_probability(
            "progression.drop_chance_per_level",
            progression.drop_chance_per_level,
        )?;
        if progression.exp_multiplier < 1.0 {
            return Err(invalid("progression.exp_multiplier", "must be at least 1.0"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, detail: &str) -> ConfigurationError {
    ConfigurationError::InvalidSetting {
        key,
        detail: detail.to_string(),
    }
}

fn check_range(key: &'static str, (min, max): (i32, i32)) -> Result<(), ConfigurationError> {
    if min > max {
        return Err(ConfigurationError::InvalidSetting {
            key,
            detail: format!("range ({}, {}) is inverted", min, max),
        });
    }
    Ok(())
}

fn check_probability(key: &'static str, p: f64) -> Result<(), ConfigurationError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigurationError::InvalidSetting {
            key,
            detail: format!("{} is outside [0, 1]", p),
        });
    }
    Ok(())
}
