//! Common test fixtures - small characters and fixed-roll settings

use hopebane::character::{Character, Stat, StatBlock};
use hopebane::combat::{CombatResolver, PlayerAction};
use hopebane::config::CombatSettings;

/// Base stats with 30 mana
pub fn block(hp: i32, atk: i32, def: i32) -> StatBlock {
    StatBlock::new()
        .with(Stat::MaxHealth, hp)
        .with(Stat::MaxMana, 30)
        .with(Stat::Attack, atk)
        .with(Stat::Defense, def)
}

/// Level 1 adventurer with no gear
pub fn fighter(hp: i32, atk: i32, def: i32) -> Character {
    Character::player("Hero", block(hp, atk, def)).expect("valid player")
}

/// Ordinary enemy
pub fn grunt(name: &str, level: u32, hp: i32, atk: i32, def: i32) -> Character {
    Character::enemy(name, level, block(hp, atk, def)).expect("valid enemy")
}

/// No jitter anywhere, so damage is exact
pub fn exact() -> CombatSettings {
    CombatSettings::without_jitter()
}

/// Exact damage with a fixed escape chance at every level
pub fn escape_at(chance: f64) -> CombatSettings {
    CombatSettings {
        escape_base_chance: chance,
        escape_level_penalty: 0.0,
        ..CombatSettings::without_jitter()
    }
}

/// Policy: weapon attack on the first opponent still standing
pub fn attack_first(combat: &CombatResolver<'_>) -> PlayerAction {
    PlayerAction::Attack {
        target: combat.first_living_opponent().unwrap_or(0),
    }
}
