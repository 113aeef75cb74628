//! Damage formulas
//!
//! - Weapon attacks: attack plus jitter, minus defense, never negative
//! - Player skills: skill damage plus jitter, defense ignored
//! - Boss skills: scaled by level, attack and the target's defense, at least 1

/// Weapon or basic attack damage
pub fn attack_damage(attack: i32, jitter: i32, defense: i32) -> i32 {
    (attack + jitter - defense).max(0)
}

/// Player skill damage
pub fn skill_damage(base: i32, jitter: i32) -> i32 {
    (base + jitter).max(0)
}

/// Boss skill damage.
///
/// `base × (1 + level×0.1) × (1 + attack×0.02) × max(0.2, 1 − defense×0.01)`,
/// floored, minimum 1.
pub fn boss_skill_damage(base: i32, level: u32, attack: i32, defense: i32) -> i32 {
    let level_factor = 1.0 + level as f64 * 0.1;
    let attack_factor = 1.0 + attack as f64 * 0.02;
    let defense_factor = (1.0 - defense as f64 * 0.01).max(0.2);
    let damage = base as f64 * level_factor * attack_factor * defense_factor;
    (damage.floor() as i32).max(1)
}

/// Multiply and round toward negative infinity
pub fn scale_floor(value: i32, factor: f64) -> i32 {
    (value as f64 * factor).floor() as i32
}
