//! Effect scenario tests
//!
//! Tests status stacking and ticking, and item effects firing in combat

use crate::common::{exact, fighter, grunt};
use hopebane::character::{Equipment, ItemType, Rarity, Slot, Stat, StatBlock};
use hopebane::combat::{
    CombatEvent, CombatOutcome, CombatResolver, CombatState, Dice, PlayerAction,
};
use hopebane::effects::{
    ApplyOutcome, Effect, EffectEngine, EffectKind, StatusEffect, Trigger, TriggerOutcome,
    TriggerResult,
};

fn sapped() -> StatusEffect {
    StatusEffect::new("Sapped", 3)
        .unwrap()
        .with_modifiers(StatBlock::new().with(Stat::Attack, -2))
        .with_stack_limit(3)
        .unwrap()
}

fn venom() -> StatusEffect {
    StatusEffect::new("Venom", 2)
        .unwrap()
        .with_tick_damage(4)
        .unwrap()
}

fn trinket(name: &str, item_type: ItemType, effect: Effect) -> Equipment {
    Equipment::new(name, item_type, Rarity::Rare, StatBlock::new())
        .unwrap()
        .with_effect(effect)
}

fn triggered(events: &[CombatEvent], effect: &str) -> Option<TriggerOutcome> {
    events.iter().find_map(|event| match event {
        CombatEvent::Triggered {
            result: TriggerResult { effect: name, outcome },
            ..
        } if name == effect => Some(outcome.clone()),
        _ => None,
    })
}

/// Test: repeated applications stack up to the limit, then refresh
#[test]
fn test_stacking_up_to_limit() {
    let mut dice = Dice::seeded(4);
    let mut engine = EffectEngine::new(&mut dice);
    let mut hero = fighter(50, 10, 5);

    let outcomes: Vec<ApplyOutcome> = (0..4)
        .map(|_| engine.apply_effect(&mut hero, &sapped(), None).outcome)
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ApplyOutcome::Applied,
            ApplyOutcome::Stacked { stacks: 2 },
            ApplyOutcome::Stacked { stacks: 3 },
            ApplyOutcome::Refreshed { remaining: 3 },
        ]
    );
    assert_eq!(hero.effects().len(), 1);
    assert_eq!(hero.total_attack(), 4);

    engine.remove_effect(&mut hero, "Sapped").unwrap();
    assert_eq!(hero.total_attack(), 10);
    assert!(engine.remove_effect(&mut hero, "Sapped").is_none());
}

/// Test: ticks ignore defense and the status expires on schedule
#[test]
fn test_tick_damage_and_expiry() {
    let mut dice = Dice::seeded(4);
    let mut engine = EffectEngine::new(&mut dice);
    let mut hero = fighter(50, 10, 100);
    engine.apply_effect(&mut hero, &venom(), Some("Spider"));
    assert_eq!(
        hero.effects().get("Venom").unwrap().source.as_deref(),
        Some("Spider")
    );

    let first = engine.tick(&mut hero);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].damage, 4);
    assert!(!first[0].expired);

    let second = engine.tick(&mut hero);
    assert!(second[0].expired);
    assert_eq!(hero.health(), 42);
    assert!(hero.effects().is_empty());
    assert!(engine.tick(&mut hero).is_empty());
}

/// Test: reapplying keeps the longer remaining duration
#[test]
fn test_refresh_keeps_longer_duration() {
    let mut dice = Dice::seeded(4);
    let mut engine = EffectEngine::new(&mut dice);
    let mut hero = fighter(50, 10, 5);
    let long = StatusEffect::new("Chill", 4).unwrap();
    let short = StatusEffect::new("Chill", 1).unwrap();

    engine.apply_effect(&mut hero, &long, None);
    engine.tick(&mut hero);
    let application = engine.apply_effect(&mut hero, &short, None);
    assert_eq!(application.outcome, ApplyOutcome::Refreshed { remaining: 3 });
}

/// Test: zero chance never lands
#[test]
fn test_resisted() {
    let mut dice = Dice::seeded(4);
    let mut engine = EffectEngine::new(&mut dice);
    let mut hero = fighter(50, 10, 5);
    let hex = StatusEffect::new("Hex", 3).unwrap().with_chance(0.0).unwrap();

    let application = engine.apply_effect(&mut hero, &hex, None);
    assert_eq!(application.outcome, ApplyOutcome::Resisted);
    assert!(!application.succeeded());
    assert!(hero.effects().is_empty());
}

/// Test: losing max health to a status clamps current health
#[test]
fn test_max_health_debuff_clamps() {
    let mut dice = Dice::seeded(4);
    let mut engine = EffectEngine::new(&mut dice);
    let mut hero = fighter(50, 10, 5);
    let wither = StatusEffect::new("Wither", 2)
        .unwrap()
        .with_modifiers(StatBlock::new().with(Stat::MaxHealth, -30));

    engine.apply_effect(&mut hero, &wither, None);
    assert_eq!(hero.max_health(), 20);
    assert_eq!(hero.health(), 20);

    engine.remove_effect(&mut hero, "Wither");
    assert_eq!(hero.max_health(), 50);
    assert_eq!(hero.health(), 20);
}

/// Test: lifesteal heals a share of the damage dealt
#[test]
fn test_lifesteal_in_combat() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let leech = Effect::simple("Leech", EffectKind::Lifesteal { heal_percent: 0.5 }).unwrap();
    let mut hero = fighter(100, 10, 0);
    hero.equip(trinket("Leech Blade", ItemType::Weapon, leech), Slot::Weapon)
        .unwrap();
    hero.take_damage(40);

    let dummy = grunt("Dummy", 1, 100, 0, 0);
    let mut combat = CombatResolver::new(hero, vec![dummy], &mut dice, &settings).unwrap();
    combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert_eq!(
        triggered(combat.events(), "Leech"),
        Some(TriggerOutcome::Healed(5))
    );
    assert_eq!(combat.player().health(), 65);
    assert_eq!(combat.opponents()[0].health(), 90);
}

/// Test: a certain block cancels the hit
#[test]
fn test_void_shield_blocks() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let shield = Effect::simple("Void Shield", EffectKind::VoidShield { block_chance: 1.0 })
        .unwrap();
    let mut hero = fighter(50, 10, 0);
    hero.equip(trinket("Aegis", ItemType::Accessory, shield), Slot::Accessory)
        .unwrap();

    let brute = grunt("Brute", 2, 100, 20, 0);
    let mut combat = CombatResolver::new(hero, vec![brute], &mut dice, &settings).unwrap();
    combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert_eq!(combat.player().health(), 50);
    assert!(combat.events().contains(&CombatEvent::Blocked {
        attacker: "Brute".to_string(),
        defender: "Hero".to_string(),
    }));
}

/// Test: absorb turns a blow into a short defense buff
#[test]
fn test_absorb_grants_defense() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let bulwark = Effect::simple(
        "Bulwark",
        EffectKind::Absorb {
            proc_chance: 1.0,
            divisor: 2,
            cap: 5,
            duration: 2,
        },
    )
    .unwrap();
    let mut hero = fighter(50, 10, 0);
    hero.equip(trinket("Bulwark Plate", ItemType::Armor, bulwark), Slot::Armor)
        .unwrap();

    let brute = grunt("Brute", 2, 100, 12, 0);
    let mut combat = CombatResolver::new(hero, vec![brute], &mut dice, &settings).unwrap();
    combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    // min(12 / 2, 5)
    assert_eq!(
        triggered(combat.events(), "Bulwark"),
        Some(TriggerOutcome::Absorbed { defense: 5 })
    );
    assert_eq!(combat.player().health(), 38);
    assert_eq!(combat.player().total_defense(), 5);
    assert_eq!(
        combat.player().effects().get("Bulwark").unwrap().remaining,
        1
    );
}

/// Test: on-hit status lands on the defender and ticks at end of turn
#[test]
fn test_on_hit_status() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let fangs = Effect::simple(
        "Fangs",
        EffectKind::OnHit {
            proc_chance: 1.0,
            status: venom(),
        },
    )
    .unwrap();
    let mut hero = fighter(50, 10, 0);
    hero.equip(trinket("Fang Dagger", ItemType::Weapon, fangs), Slot::Weapon)
        .unwrap();

    let dummy = grunt("Dummy", 1, 100, 0, 0);
    let mut combat = CombatResolver::new(hero, vec![dummy], &mut dice, &settings).unwrap();
    combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert!(combat.opponents()[0].effects().contains("Venom"));
    assert_eq!(combat.opponents()[0].health(), 86);
    assert!(combat.events().contains(&CombatEvent::EffectTicked {
        target: "Dummy".to_string(),
        effect: "Venom".to_string(),
        damage: 4,
    }));
}

/// Test: bonus damage and void bolts add to the hit
#[test]
fn test_bonus_damage_sources() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let ambush = Effect::simple(
        "Ambush",
        EffectKind::BonusDamage {
            proc_chance: 1.0,
            percent: 0.5,
        },
    )
    .unwrap();
    let bolt = Effect::simple(
        "Void Bolt",
        EffectKind::VoidBolt {
            proc_chance: 1.0,
            magic_ratio: 1.0,
        },
    )
    .unwrap();
    let mut hero = fighter(50, 10, 0);
    hero.equip(trinket("Ambush Knife", ItemType::Weapon, ambush), Slot::Weapon)
        .unwrap();
    let orb = Equipment::new(
        "Void Orb",
        ItemType::Accessory,
        Rarity::Epic,
        StatBlock::new().with(Stat::MagicPower, 8),
    )
    .unwrap()
    .with_effect(bolt);
    hero.equip(orb, Slot::Accessory).unwrap();

    let dummy = grunt("Dummy", 1, 100, 0, 0);
    let mut combat = CombatResolver::new(hero, vec![dummy], &mut dice, &settings).unwrap();
    combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    // 10 + 5 + 8
    assert_eq!(combat.opponents()[0].health(), 77);
}

/// Test: regeneration fires at the start of the round
#[test]
fn test_regeneration_at_turn_start() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let mending = Effect::new(
        "Mending",
        Trigger::TurnStart,
        EffectKind::Regeneration { health: 5, mana: 0 },
    )
    .unwrap();
    let mut hero = fighter(50, 10, 0);
    hero.equip(trinket("Troll Hide", ItemType::Armor, mending), Slot::Armor)
        .unwrap();
    hero.take_damage(20);

    let dummy = grunt("Dummy", 1, 100, 0, 0);
    let mut combat = CombatResolver::new(hero, vec![dummy], &mut dice, &settings).unwrap();
    combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert_eq!(combat.player().health(), 35);
    assert_eq!(
        triggered(combat.events(), "Mending"),
        Some(TriggerOutcome::Restored { health: 5, mana: 0 })
    );
}

/// Test: effects that do not fit their trigger are rejected
#[test]
fn test_trigger_mismatch_rejected() {
    let shield = EffectKind::VoidShield { block_chance: 0.5 };
    assert!(Effect::new("Backwards Shield", Trigger::OnHit, shield).is_err());
}

fn burn() -> StatusEffect {
    StatusEffect::new("Burn", 3)
        .unwrap()
        .with_tick_damage(10)
        .unwrap()
}

/// Test: burn finishing the last opponent at end of turn wins the fight
#[test]
fn test_tick_damage_wins_fight() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let mut imp = grunt("Imp", 1, 20, 0, 0);
    EffectEngine::new(&mut dice).apply_effect(&mut imp, &burn(), None);

    let mut combat =
        CombatResolver::new(fighter(50, 10, 0), vec![imp], &mut dice, &settings).unwrap();
    let state = combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert_eq!(state, CombatState::Finished(CombatOutcome::Victory));
    assert_eq!(combat.round(), 1);
    assert!(!combat.opponents()[0].is_alive());
    assert!(combat.events().contains(&CombatEvent::EffectTicked {
        target: "Imp".to_string(),
        effect: "Burn".to_string(),
        damage: 10,
    }));
    assert!(combat.events().contains(&CombatEvent::Defeated {
        name: "Imp".to_string(),
    }));
}

/// Test: burn finishing the player at end of turn loses the fight
#[test]
fn test_tick_damage_loses_fight() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let mut hero = fighter(50, 10, 0);
    hero.take_damage(45);
    EffectEngine::new(&mut dice).apply_effect(&mut hero, &burn(), None);

    let dummy = grunt("Dummy", 1, 100, 0, 0);
    let mut combat = CombatResolver::new(hero, vec![dummy], &mut dice, &settings).unwrap();
    let state = combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert_eq!(state, CombatState::Finished(CombatOutcome::Defeat));
    assert_eq!(combat.player().health(), 0);
    assert_eq!(combat.opponents()[0].health(), 90);
}

/// Test: both sides burning out in the same end of turn is a defeat
#[test]
fn test_both_fall_to_ticks_is_defeat() {
    let mut dice = Dice::seeded(4);
    let settings = exact();
    let mut hero = fighter(50, 10, 0);
    hero.take_damage(45);
    let mut imp = grunt("Imp", 1, 20, 0, 0);
    {
        let mut engine = EffectEngine::new(&mut dice);
        engine.apply_effect(&mut hero, &burn(), None);
        engine.apply_effect(&mut imp, &burn(), None);
    }

    let mut combat = CombatResolver::new(hero, vec![imp], &mut dice, &settings).unwrap();
    let state = combat.play_turn(PlayerAction::Attack { target: 0 }).unwrap();

    assert_eq!(state, CombatState::Finished(CombatOutcome::Defeat));
    assert!(!combat.player().is_alive());
    assert!(!combat.opponents()[0].is_alive());
    assert_eq!(
        combat.events().last(),
        Some(&CombatEvent::Finished(CombatOutcome::Defeat))
    );
}
