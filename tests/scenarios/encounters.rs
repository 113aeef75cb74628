//! Exploration scenario tests
//!
//! Tests the boss countdown, saving the scheduler, balance files and rewards

use crate::common::{attack_first, exact, fighter, grunt};
use hopebane::catalog;
use hopebane::combat::{resolve_combat, CombatOutcome, Dice};
use hopebane::config::{BalanceConfig, EncounterSettings, ProgressionSettings};
use hopebane::encounter::{Decision, EncounterScheduler};
use hopebane::progression::award_victory;

/// Test: a saved scheduler resumes its countdown where it left off
#[test]
fn test_scheduler_survives_save_and_load() {
    let mut dice = Dice::seeded(12);
    let mut scheduler = EncounterScheduler::default();
    for _ in 0..5 {
        scheduler.explore(&mut dice);
    }

    let saved = serde_json::to_string(&scheduler).unwrap();
    let mut restored: EncounterScheduler = serde_json::from_str(&saved).unwrap();
    assert_eq!(restored, scheduler);
    assert_eq!(restored.remaining(), 3);

    assert_ne!(restored.explore(&mut dice), Decision::Boss);
    assert_ne!(restored.explore(&mut dice), Decision::Boss);
    assert_eq!(restored.explore(&mut dice), Decision::Boss);
}

/// Test: balance file drives the boss interval
#[test]
fn test_interval_from_balance_file() {
    let config = BalanceConfig::from_toml(
        r#"
        [encounters]
        boss_interval = 3
        "#,
    )
    .unwrap();
    let mut dice = Dice::seeded(12);
    let mut scheduler = EncounterScheduler::new(config.encounters);

    let decisions: Vec<Decision> = (0..3).map(|_| scheduler.explore(&mut dice)).collect();
    assert_eq!(decisions.last(), Some(&Decision::Boss));
    assert!(decisions[..2].iter().all(|d| *d != Decision::Boss));

    let progress = scheduler.progress();
    assert_eq!(progress.remaining, 0);
    assert_eq!(progress.percentage, 1.0);
}

/// Test: broken balance files are refused
#[test]
fn test_bad_balance_file() {
    assert!(BalanceConfig::from_toml("[encounters]\nboss_interval = 0\n").is_err());
    assert!(BalanceConfig::from_toml("[combat]\nescape_base_chance = 1.5\n").is_err());
    assert!(BalanceConfig::from_toml("[combat]\nmax_turns = \"many\"\n").is_err());
}

/// Test: the countdown restarts after the boss falls
#[test]
fn test_countdown_restarts_after_boss() {
    let mut dice = Dice::seeded(12);
    let mut scheduler = EncounterScheduler::new(EncounterSettings {
        boss_interval: 2,
        ..EncounterSettings::default()
    });
    scheduler.explore(&mut dice);
    assert_eq!(scheduler.explore(&mut dice), Decision::Boss);

    scheduler.reset_after_boss(&mut dice);
    assert_eq!(scheduler.remaining(), 2);
    assert_ne!(scheduler.explore(&mut dice), Decision::Boss);
}

/// Test: winning pays out and levels the adventurer
#[test]
fn test_victory_rewards() {
    let mut dice = Dice::seeded(12);
    let settings = exact();
    let wolf = grunt("Wolf", 2, 10, 0, 0).with_bounty(150, 40);
    let report =
        resolve_combat(fighter(50, 10, 0), vec![wolf], &mut dice, &settings, attack_first)
            .unwrap();
    assert_eq!(report.outcome, CombatOutcome::Victory);

    let progression = ProgressionSettings {
        gold_variance: 0.0,
        drop_chance: 0.0,
        drop_chance_per_level: 0.0,
        ..ProgressionSettings::default()
    };
    let mut hero = report.player;
    let rewards = award_victory(&mut hero, &report.opponents, &[], &mut dice, &progression);

    assert_eq!(rewards.exp, 150);
    assert_eq!(rewards.gold, 40);
    assert_eq!(rewards.levels_gained, 1);
    assert_eq!(hero.level(), 2);
    assert_eq!(hero.max_health(), 70);
    assert_eq!(hero.health(), 70);
    assert_eq!(hero.progress().unwrap().exp, 50);
    assert!(rewards.drops.is_empty());
}

/// Test: the Void Sentinel always leaves loot behind
#[test]
fn test_boss_drops_loot() {
    let mut dice = Dice::seeded(12);
    let loot = catalog::loot_table().unwrap();
    let mut sentinel = catalog::void_sentinel().unwrap();
    sentinel.take_damage(sentinel.max_health());

    let mut hero = fighter(50, 10, 0);
    let rewards = award_victory(
        &mut hero,
        &[sentinel],
        &loot,
        &mut dice,
        &ProgressionSettings::default(),
    );
    assert_eq!(rewards.exp, 2000);
    assert_eq!(rewards.drops.len(), 2);
    assert!(rewards.drops.iter().all(|item| loot.contains(item)));
}
