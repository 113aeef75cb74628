//! Combat scenario tests
//!
//! Tests the turn loop, retreat, rejected selections and stalemates

use crate::common::{attack_first, escape_at, exact, fighter, grunt};
use hopebane::catalog;
use hopebane::character::Skill;
use hopebane::combat::{
    auto_action, resolve_combat, CombatEvent, CombatOutcome, CombatResolver, CombatState, Dice,
    PlayerAction,
};
use hopebane::config::CombatSettings;
use hopebane::error::InvalidAction;

/// Test: fixed-roll fight ends in victory with exact damage taken
#[test]
fn test_deterministic_victory() {
    let mut dice = Dice::seeded(1);
    let settings = exact();
    let player = fighter(50, 10, 5);
    let goblin = grunt("Goblin", 1, 20, 8, 2);

    let report = resolve_combat(player, vec![goblin], &mut dice, &settings, attack_first)
        .expect("fight starts");

    // 8 per hit kills the goblin in round 3; it lands 3 per hit twice
    assert_eq!(report.outcome, CombatOutcome::Victory);
    assert_eq!(report.rounds, 3);
    assert_eq!(report.player.health(), 44);
    assert!(!report.opponents[0].is_alive());

    let hits = report
        .events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Hit { .. }))
        .count();
    assert_eq!(hits, 5);
    assert_eq!(
        report.events.last(),
        Some(&CombatEvent::Finished(CombatOutcome::Victory))
    );
    assert_eq!(report.log.len(), report.events.len());
}

/// Test: state machine walks every phase of a round
#[test]
fn test_round_transitions() {
    let mut dice = Dice::seeded(1);
    let settings = exact();
    let mut combat = CombatResolver::new(
        fighter(50, 10, 5),
        vec![grunt("Goblin", 1, 20, 8, 2)],
        &mut dice,
        &settings,
    )
    .unwrap();

    assert_eq!(combat.state(), CombatState::AwaitingAction);
    assert!(matches!(
        combat.advance(),
        Err(InvalidAction::ActionRequired)
    ));

    combat.submit(PlayerAction::Attack { target: 0 }).unwrap();
    assert_eq!(combat.state(), CombatState::ActionResolved);
    assert_eq!(combat.opponents()[0].health(), 12);

    assert_eq!(combat.advance().unwrap(), CombatState::OpponentActed);
    assert_eq!(combat.player().health(), 47);
    assert_eq!(combat.advance().unwrap(), CombatState::TurnComplete);
    assert_eq!(combat.advance().unwrap(), CombatState::AwaitingAction);
    assert_eq!(combat.round(), 2);
}

/// Test: guaranteed escape ends the fight without damage
#[test]
fn test_guaranteed_retreat() {
    let mut dice = Dice::seeded(5);
    let settings = escape_at(1.0);
    let mut combat = CombatResolver::new(
        fighter(50, 10, 5),
        vec![grunt("Goblin", 1, 20, 8, 2)],
        &mut dice,
        &settings,
    )
    .unwrap();

    combat.submit(PlayerAction::Retreat).unwrap();
    assert_eq!(
        combat.state(),
        CombatState::Finished(CombatOutcome::Retreat)
    );
    assert_eq!(combat.player().health(), 50);
    assert!(combat.events().contains(&CombatEvent::RetreatSucceeded));
    assert!(matches!(
        combat.submit(PlayerAction::Attack { target: 0 }),
        Err(InvalidAction::CombatFinished)
    ));
}

/// Test: failed escape costs one counter-attack and the fight goes on
#[test]
fn test_failed_retreat_counter_attack() {
    let mut dice = Dice::seeded(5);
    let settings = escape_at(0.0);
    let mut combat = CombatResolver::new(
        fighter(50, 10, 5),
        vec![grunt("Goblin", 1, 20, 8, 2)],
        &mut dice,
        &settings,
    )
    .unwrap();

    combat.submit(PlayerAction::Retreat).unwrap();
    assert_eq!(combat.state(), CombatState::OpponentActed);
    assert_eq!(combat.player().health(), 47);
    assert!(combat.events().contains(&CombatEvent::RetreatFailed {
        opponent: "Goblin".to_string(),
        damage: 3,
    }));

    assert_eq!(combat.advance().unwrap(), CombatState::TurnComplete);
    assert_eq!(combat.advance().unwrap(), CombatState::AwaitingAction);
    assert_eq!(combat.round(), 2);
    // only the counter-attack landed
    assert_eq!(combat.player().health(), 47);
    assert_eq!(combat.opponents()[0].health(), 20);
}

/// Test: rejected selections change nothing
#[test]
fn test_rejected_selections_cost_nothing() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    let player =
        fighter(50, 10, 5).with_skills(vec![Skill::new("Meteor", 50, 100, 3).unwrap()]);
    let mut combat = CombatResolver::new(
        player,
        vec![grunt("Goblin", 1, 20, 8, 2)],
        &mut dice,
        &settings,
    )
    .unwrap();

    assert!(matches!(
        combat.submit(PlayerAction::UseSkill { skill: 0, target: 0 }),
        Err(InvalidAction::InsufficientMana {
            required: 100,
            available: 30,
            ..
        })
    ));
    assert!(matches!(
        combat.submit(PlayerAction::UseSkill { skill: 4, target: 0 }),
        Err(InvalidAction::UnknownSkill(4))
    ));
    assert!(matches!(
        combat.submit(PlayerAction::Attack { target: 3 }),
        Err(InvalidAction::InvalidTarget(3))
    ));
    assert!(matches!(
        combat.submit(PlayerAction::UseItem {
            item: 0,
            target: None
        }),
        Err(InvalidAction::UnknownItem(0))
    ));

    assert_eq!(combat.state(), CombatState::AwaitingAction);
    assert_eq!(combat.round(), 1);
    assert_eq!(combat.player().mana(), 30);
    assert_eq!(combat.player().health(), 50);
    assert!(combat.player().skills().is_available(0));
    assert!(combat.events().is_empty());
}

/// Test: a skill comes back after its cooldown has run down
#[test]
fn test_skill_cooldown_across_rounds() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    let player = fighter(50, 10, 5).with_skills(vec![Skill::new("Slash", 5, 5, 2).unwrap()]);
    let dummy = grunt("Training Dummy", 1, 500, 0, 0);
    let mut combat = CombatResolver::new(player, vec![dummy], &mut dice, &settings).unwrap();

    let slash = PlayerAction::UseSkill { skill: 0, target: 0 };
    assert_eq!(combat.play_turn(slash).unwrap(), CombatState::AwaitingAction);
    assert_eq!(combat.opponents()[0].health(), 495);

    assert!(matches!(
        combat.play_turn(slash),
        Err(InvalidAction::SkillOnCooldown { remaining: 1, .. })
    ));
    combat
        .play_turn(PlayerAction::Attack { target: 0 })
        .unwrap();
    assert_eq!(combat.round(), 3);

    combat.play_turn(slash).unwrap();
    assert_eq!(combat.player().mana(), 20);
    assert_eq!(combat.opponents()[0].health(), 480);
}

/// Test: a fight nobody can win is called off
#[test]
fn test_stalemate_retreats() {
    let mut dice = Dice::seeded(2);
    let settings = CombatSettings {
        max_turns: 3,
        ..exact()
    };
    let report = resolve_combat(
        fighter(50, 0, 5),
        vec![grunt("Shade", 1, 20, 0, 2)],
        &mut dice,
        &settings,
        attack_first,
    )
    .unwrap();

    assert_eq!(report.outcome, CombatOutcome::Retreat);
    assert_eq!(report.rounds, 3);
    assert!(report.events.contains(&CombatEvent::Stalemate { rounds: 3 }));
}

/// Test: player falls
#[test]
fn test_defeat() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    let report = resolve_combat(
        fighter(5, 1, 0),
        vec![grunt("Ogre", 4, 100, 20, 0)],
        &mut dice,
        &settings,
        attack_first,
    )
    .unwrap();

    assert_eq!(report.outcome, CombatOutcome::Defeat);
    assert_eq!(report.player.health(), 0);
    assert_eq!(report.rounds, 1);
}

/// Test: several opponents, dead ones do not act
#[test]
fn test_multiple_opponents() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    let report = resolve_combat(
        fighter(100, 10, 0),
        vec![grunt("Rat", 1, 10, 2, 0), grunt("Rat", 1, 10, 2, 0)],
        &mut dice,
        &settings,
        attack_first,
    )
    .unwrap();

    assert_eq!(report.outcome, CombatOutcome::Victory);
    assert_eq!(report.rounds, 2);
    assert_eq!(report.player.health(), 98);
    let defeated = report
        .events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Defeated { .. }))
        .count();
    assert_eq!(defeated, 2);
}

/// Test: items do not end the player's turn
#[test]
fn test_item_keeps_turn() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    let mut player =
        fighter(50, 10, 5).with_consumables(vec![catalog::health_potion().unwrap()]);
    player.take_damage(40);
    let mut combat = CombatResolver::new(
        player,
        vec![grunt("Goblin", 1, 20, 8, 2)],
        &mut dice,
        &settings,
    )
    .unwrap();

    combat
        .submit(PlayerAction::UseItem {
            item: 0,
            target: None,
        })
        .unwrap();
    assert_eq!(combat.state(), CombatState::AwaitingAction);
    assert_eq!(combat.round(), 1);
    assert_eq!(combat.player().health(), 40);
    assert!(combat.player().consumables().is_empty());

    combat.submit(PlayerAction::Attack { target: 0 }).unwrap();
    assert_eq!(combat.state(), CombatState::ActionResolved);
}

/// Test: offensive item with no target lands on the first living opponent
#[test]
fn test_offensive_item_targets_opponent() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    let player = fighter(50, 10, 5).with_consumables(vec![catalog::poison_vial().unwrap()]);
    let mut combat = CombatResolver::new(
        player,
        vec![grunt("Goblin", 1, 20, 8, 2)],
        &mut dice,
        &settings,
    )
    .unwrap();

    combat
        .submit(PlayerAction::UseItem {
            item: 0,
            target: None,
        })
        .unwrap();
    assert!(combat.opponents()[0].effects().contains("Poisoned"));
    assert!(combat.player().effects().is_empty());
}

/// Test: a fight needs someone to fight
#[test]
fn test_no_opponents_rejected() {
    let mut dice = Dice::seeded(2);
    let settings = exact();
    assert!(CombatResolver::new(fighter(50, 10, 5), vec![], &mut dice, &settings).is_err());
}

/// Test: same seed, same fight
#[test]
fn test_seeded_fights_repeat() {
    let fight = |seed| {
        let mut dice = Dice::seeded(seed);
        let settings = CombatSettings::default();
        let hero = catalog::adventurer("Hero").unwrap();
        let orc = catalog::enemy("Orc").unwrap();
        resolve_combat(hero, vec![orc], &mut dice, &settings, auto_action).unwrap()
    };

    let first = fight(77);
    let second = fight(77);
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.log, second.log);
    assert_eq!(first.player.health(), second.player.health());
}
