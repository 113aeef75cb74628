//! Victory rewards and level-ups
//!
//! - Experience from each defeated opponent's bounty
//! - Gold rolled around the bounty
//! - Item drops: bosses always drop, others roll a level-scaled chance, and
//!   the item is drawn from a loot table weighted by rarity

use tracing::{debug, info, warn};

use crate::character::{Character, Equipment};
use crate::combat::Dice;
use crate::config::ProgressionSettings;

/// What a victory paid out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rewards {
    pub exp: u32,
    pub gold: u32,
    pub levels_gained: u32,
    pub drops: Vec<Equipment>,
}

/// Gold for one defeated opponent: its bounty (or level × gold per level
/// when it has none), varied by up to `gold_variance` either way
pub fn roll_gold(opponent: &Character, dice: &mut Dice, settings: &ProgressionSettings) -> u32 {
    let base = match opponent.bounty().gold {
        0 => opponent.level() * settings.gold_per_level,
        gold => gold,
    } as i32;
    let spread = (base as f64 * settings.gold_variance).floor() as i32;
    dice.roll_range(base - spread, base + spread).max(0) as u32
}

/// Items one defeated opponent leaves behind
pub fn roll_drops(
    opponent: &Character,
    loot: &[Equipment],
    dice: &mut Dice,
    settings: &ProgressionSettings,
) -> Vec<Equipment> {
    if loot.is_empty() {
        return Vec::new();
    }
    let count = if opponent.is_boss() {
        settings.boss_drops
    } else if dice.chance(settings.drop_chance_at(opponent.level())) {
        1
    } else {
        0
    };

    let weights: Vec<u32> = loot.iter().map(|item| item.rarity.drop_weight()).collect();
    (0..count)
        .filter_map(|_| loot.get(dice.weighted(&weights)).cloned())
        .inspect(|item| debug!("{} dropped {}", opponent.name(), item.name))
        .collect()
}

/// Grant experience, gold and drops for the defeated opponents, then level up
pub fn award_victory(
    player: &mut Character,
    defeated: &[Character],
    loot: &[Equipment],
    dice: &mut Dice,
    settings: &ProgressionSettings,
) -> Rewards {
    if player.progress().is_none() {
        warn!("{} cannot collect rewards", player.name());
        return Rewards::default();
    }

    let mut rewards = Rewards::default();
    for opponent in defeated.iter().filter(|o| !o.is_alive()) {
        rewards.exp += opponent.bounty().exp;
        rewards.gold += roll_gold(opponent, dice, settings);
        rewards.drops.extend(roll_drops(opponent, loot, dice, settings));
    }

    if let Some(progress) = player.progress_mut() {
        progress.exp += rewards.exp;
        progress.gold += rewards.gold;
    }
    info!(
        "{} gains {} exp, {} gold and {} item(s)",
        player.name(),
        rewards.exp,
        rewards.gold,
        rewards.drops.len()
    );

    rewards.levels_gained = apply_level_ups(player, settings);
    rewards
}

/// Level up while experience covers the requirement. Returns levels gained.
pub fn apply_level_ups(player: &mut Character, settings: &ProgressionSettings) -> u32 {
    let growth = settings.growth();
    let mut gained = 0;

    loop {
        let Some(progress) = player.progress_mut() else {
            break;
        };
        if progress.exp_to_level == 0 || progress.exp < progress.exp_to_level {
            break;
        }
        progress.exp -= progress.exp_to_level;
        progress.exp_to_level =
            (progress.exp_to_level as f64 * settings.exp_multiplier).floor() as u32;

        player.grow(&growth);
        gained += 1;
        info!("{} reached level {}", player.name(), player.level());
    }
    gained
}
