//! Automatic action choice for unattended fights

use super::resolver::{CombatResolver, PlayerAction};
use crate::character::ConsumableEffect;

/// Health share below which the policy drinks a healing item
pub const HEAL_THRESHOLD: f64 = 0.3;

/// Heal when low, else the hardest-hitting affordable skill, else attack.
///
/// Always aims at the first opponent still standing.
pub fn auto_action(combat: &CombatResolver<'_>) -> PlayerAction {
    let player = combat.player();
    let target = combat.first_living_opponent().unwrap_or(0);

    if player.hp_fraction() < HEAL_THRESHOLD {
        let healing = player.consumables().iter().position(|item| {
            item.effects
                .iter()
                .any(|e| matches!(e, ConsumableEffect::RestoreHealth(_)))
        });
        if let Some(item) = healing {
            return PlayerAction::UseItem { item, target: None };
        }
    }

    let strongest = player
        .skills()
        .iter()
        .enumerate()
        .filter(|(_, skill)| skill.is_available() && skill.mana_cost() <= player.mana())
        .max_by_key(|(_, skill)| skill.damage())
        .map(|(index, _)| index);

    match strongest {
        Some(skill) => PlayerAction::UseSkill { skill, target },
        None => PlayerAction::Attack { target },
    }
}
