//! Built-in content
//!
//! Status effects, starter gear, item sets, potions, the ordinary enemy
//! roster and the Void Sentinel boss. Everything is built through the
//! validating constructors, so a bad entry surfaces as a `ConfigurationError`
//! rather than at runtime.

use crate::character::{
    BossProfile, Character, Consumable, ConsumableEffect, Equipment, ItemSet, ItemType, Rarity,
    SetTier, Skill, Slot, Stat, StatBlock,
};
use crate::combat::Dice;
use crate::effects::{Effect, EffectKind, StatusEffect};
use crate::error::ConfigurationError;

type Result<T> = std::result::Result<T, ConfigurationError>;

// Status effects

pub fn bleeding() -> Result<StatusEffect> {
    StatusEffect::new("Bleeding", 3)?
        .with_tick_damage(5)?
        .with_chance(0.7)
}

pub fn poisoned() -> Result<StatusEffect> {
    StatusEffect::new("Poisoned", 4)?
        .with_modifiers(StatBlock::new().with(Stat::Attack, -2))
        .with_tick_damage(3)?
        .with_chance(0.6)
}

pub fn weakened() -> Result<StatusEffect> {
    StatusEffect::new("Weakened", 2)?
        .with_modifiers(StatBlock::new().with(Stat::Attack, -3).with(Stat::Defense, -2))
        .with_chance(0.8)
}

pub fn burning() -> Result<StatusEffect> {
    StatusEffect::new("Burning", 2)?
        .with_tick_damage(7)?
        .with_chance(0.65)
}

pub fn cursed() -> Result<StatusEffect> {
    StatusEffect::new("Cursed", 3)?
        .with_modifiers(
            StatBlock::new()
                .with(Stat::Attack, -2)
                .with(Stat::Defense, -1)
                .with(Stat::MaxMana, -10),
        )
        .with_tick_damage(2)?
        .with_chance(0.5)
}

pub fn void_empowered() -> Result<StatusEffect> {
    Ok(StatusEffect::new("Void Empowered", 3)?
        .with_modifiers(StatBlock::new().with(Stat::Attack, 5).with(Stat::MagicPower, 8)))
}

pub fn corrupted_hope() -> Result<StatusEffect> {
    StatusEffect::new("Corrupted Hope", 4)?
        .with_modifiers(StatBlock::new().with(Stat::Defense, -3))
        .with_tick_damage(8)
}

/// Every status above, by name
pub fn status_effects() -> Result<Vec<StatusEffect>> {
    Ok(vec![
        bleeding()?,
        poisoned()?,
        weakened()?,
        burning()?,
        cursed()?,
        void_empowered()?,
        corrupted_hope()?,
    ])
}

// Equipment

pub fn rusty_sword() -> Result<Equipment> {
    Ok(Equipment::new(
        "Rusty Sword",
        ItemType::Weapon,
        Rarity::Common,
        StatBlock::new().with(Stat::Attack, 3),
    )?
    .with_value(10))
}

pub fn leather_armor() -> Result<Equipment> {
    Ok(Equipment::new(
        "Leather Armor",
        ItemType::Armor,
        Rarity::Common,
        StatBlock::new().with(Stat::Defense, 2).with(Stat::MaxHealth, 10),
    )?
    .with_value(15))
}

pub fn vampiric_blade() -> Result<Equipment> {
    Ok(Equipment::new(
        "Vampiric Blade",
        ItemType::Weapon,
        Rarity::Rare,
        StatBlock::new().with(Stat::Attack, 8).with(Stat::MaxHealth, 15),
    )?
    .with_value(120))
}

pub fn cursed_amulet() -> Result<Equipment> {
    Ok(Equipment::new(
        "Cursed Amulet",
        ItemType::Accessory,
        Rarity::Uncommon,
        StatBlock::new()
            .with(Stat::Attack, 5)
            .with(Stat::MaxMana, 25)
            .with(Stat::Defense, -2),
    )?
    .with_value(60))
}

// Item sets

pub fn void_sentinel_set() -> Result<ItemSet> {
    let absorption = Effect::simple(
        "Void Absorption",
        EffectKind::Absorb {
            proc_chance: 0.25,
            divisor: 1,
            cap: 5,
            duration: 2,
        },
    )?;
    ItemSet::new(
        "Void Sentinel",
        vec![
            SetTier::new(
                2,
                StatBlock::new().with(Stat::Defense, 15).with(Stat::MaxHealth, 25),
                vec![],
            )
            .with_description("+15 defense, +25 max health"),
            SetTier::new(
                3,
                StatBlock::new().with(Stat::Defense, 30).with(Stat::MaxHealth, 50),
                vec![absorption],
            )
            .with_description("+30 defense, +50 max health, chance to absorb blows"),
        ],
    )
}

pub fn void_sentinel_pieces() -> Result<Vec<Equipment>> {
    let set = void_sentinel_set()?;
    Ok(vec![
        Equipment::new(
            "Sentinel's Edge",
            ItemType::Weapon,
            Rarity::Epic,
            StatBlock::new().with(Stat::Attack, 6).with(Stat::Defense, 2),
        )?
        .in_set(&set),
        Equipment::new(
            "Sentinel Plate",
            ItemType::Armor,
            Rarity::Epic,
            StatBlock::new().with(Stat::Defense, 8),
        )?
        .in_set(&set),
        Equipment::new(
            "Eye of the Void",
            ItemType::Accessory,
            Rarity::Epic,
            StatBlock::new().with(Stat::MagicPower, 6),
        )?
        .in_set(&set)
        .with_effect(Effect::simple(
            "Void Shield",
            EffectKind::VoidShield { block_chance: 0.1 },
        )?),
    ])
}

pub fn shadow_assassin_set() -> Result<ItemSet> {
    let lifesteal = Effect::simple("Shadow Drain", EffectKind::Lifesteal { heal_percent: 0.15 })?;
    ItemSet::new(
        "Shadow Assassin",
        vec![
            SetTier::new(
                2,
                StatBlock::new().with(Stat::Attack, 15).with(Stat::Speed, 10),
                vec![],
            )
            .with_description("+15 attack, +10 speed"),
            SetTier::new(
                3,
                StatBlock::new().with(Stat::Attack, 25).with(Stat::Speed, 20),
                vec![lifesteal],
            )
            .with_description("+25 attack, +20 speed, 15% lifesteal"),
        ],
    )
}

pub fn shadow_assassin_pieces() -> Result<Vec<Equipment>> {
    let set = shadow_assassin_set()?;
    Ok(vec![
        Equipment::new(
            "Shadow Fang",
            ItemType::Weapon,
            Rarity::Epic,
            StatBlock::new().with(Stat::Attack, 9),
        )?
        .in_set(&set)
        .with_effect(Effect::simple(
            "Serrated Edge",
            EffectKind::OnHit {
                proc_chance: 0.3,
                status: bleeding()?,
            },
        )?),
        Equipment::new(
            "Shadow Garb",
            ItemType::Armor,
            Rarity::Epic,
            StatBlock::new().with(Stat::Defense, 4).with(Stat::Speed, 5),
        )?
        .in_set(&set),
        Equipment::new(
            "Shadow Band",
            ItemType::Accessory,
            Rarity::Epic,
            StatBlock::new().with(Stat::Attack, 3),
        )?
        .in_set(&set)
        .with_effect(Effect::simple(
            "Ambush",
            EffectKind::BonusDamage {
                proc_chance: 0.2,
                percent: 0.5,
            },
        )?),
    ])
}

/// Everything an opponent can drop: starter gear, rare finds and set pieces
pub fn loot_table() -> Result<Vec<Equipment>> {
    let mut loot = vec![rusty_sword()?, leather_armor()?, cursed_amulet()?, vampiric_blade()?];
    loot.extend(shadow_assassin_pieces()?);
    loot.extend(void_sentinel_pieces()?);
    Ok(loot)
}

// Consumables

pub fn health_potion() -> Result<Consumable> {
    Ok(Consumable::new(
        "Health Potion",
        Rarity::Common,
        vec![ConsumableEffect::RestoreHealth(30)],
    )?
    .with_value(20))
}

pub fn mana_potion() -> Result<Consumable> {
    Ok(Consumable::new(
        "Mana Potion",
        Rarity::Common,
        vec![ConsumableEffect::RestoreMana(35)],
    )?
    .with_value(20))
}

pub fn antidote() -> Result<Consumable> {
    Ok(Consumable::new(
        "Antidote",
        Rarity::Common,
        vec![ConsumableEffect::Cure("Poisoned".to_string())],
    )?
    .with_value(15))
}

pub fn poison_vial() -> Result<Consumable> {
    let status = poisoned()?.with_chance(1.0)?;
    Ok(Consumable::new(
        "Poison Vial",
        Rarity::Uncommon,
        vec![ConsumableEffect::Inflict(status)],
    )?
    .with_value(30))
}

// Characters

/// Fresh level 1 adventurer with starter gear and potions
pub fn adventurer(name: &str) -> Result<Character> {
    let base = StatBlock::new()
        .with(Stat::MaxHealth, 100)
        .with(Stat::MaxMana, 50)
        .with(Stat::Attack, 10)
        .with(Stat::Defense, 5)
        .with(Stat::MagicPower, 5)
        .with(Stat::Speed, 10);
    let mut hero = Character::player(name, base)?
        .with_skills(vec![
            Skill::new("Power Strike", 25, 15, 2)?.with_description("A heavy two-handed blow"),
            Skill::new("Fireball", 35, 25, 3)?.with_description("Hurl a ball of flame"),
        ])
        .with_consumables(vec![health_potion()?, health_potion()?, mana_potion()?]);

    for (item, slot) in [(rusty_sword()?, Slot::Weapon), (leather_armor()?, Slot::Armor)] {
        let name = item.name.clone();
        hero.equip(item, slot)
            .map_err(|e| ConfigurationError::InvalidItem {
                name,
                detail: e.to_string(),
            })?;
    }
    hero.restore_full();
    Ok(hero)
}

struct EnemyTemplate {
    name: &'static str,
    level: u32,
    health: i32,
    attack: i32,
    defense: i32,
    exp: u32,
    gold: u32,
}

const ENEMIES: &[EnemyTemplate] = &[
    EnemyTemplate { name: "Goblin", level: 1, health: 30, attack: 8, defense: 2, exp: 20, gold: 10 },
    EnemyTemplate { name: "Skeleton", level: 2, health: 45, attack: 12, defense: 4, exp: 35, gold: 20 },
    EnemyTemplate { name: "Orc", level: 3, health: 60, attack: 15, defense: 6, exp: 50, gold: 30 },
    EnemyTemplate { name: "Dark Mage", level: 3, health: 40, attack: 20, defense: 3, exp: 45, gold: 25 },
    EnemyTemplate { name: "Dragon", level: 5, health: 100, attack: 25, defense: 10, exp: 100, gold: 75 },
];

fn build_enemy(template: &EnemyTemplate) -> Result<Character> {
    let base = StatBlock::new()
        .with(Stat::MaxHealth, template.health)
        .with(Stat::Attack, template.attack)
        .with(Stat::Defense, template.defense);
    Ok(Character::enemy(template.name, template.level, base)?
        .with_bounty(template.exp, template.gold))
}

/// Ordinary enemy by name
pub fn enemy(name: &str) -> Result<Character> {
    let template = ENEMIES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigurationError::InvalidCharacter {
            name: name.to_string(),
            detail: "no such enemy".to_string(),
        })?;
    build_enemy(template)
}

/// The whole ordinary roster
pub fn fallback_enemies() -> Result<Vec<Character>> {
    ENEMIES.iter().map(build_enemy).collect()
}

/// Random enemy no stronger than `max_level`, at least the weakest one
pub fn random_enemy(max_level: u32, dice: &mut Dice) -> Result<Character> {
    let eligible: Vec<&EnemyTemplate> = ENEMIES.iter().filter(|t| t.level <= max_level).collect();
    match dice.pick(&eligible) {
        Some(template) => build_enemy(template),
        None => build_enemy(&ENEMIES[0]),
    }
}

/// The Void Sentinel, Guardian of the Abyss
pub fn void_sentinel() -> Result<Character> {
    let base = StatBlock::new()
        .with(Stat::MaxHealth, 200)
        .with(Stat::MaxMana, 150)
        .with(Stat::Attack, 25)
        .with(Stat::Defense, 15);
    let profile =
        BossProfile::new("Guardian of the Abyss", 0.3)?.with_special_effect(corrupted_hope()?);
    Ok(Character::boss("Void Sentinel", 10, base, profile)?
        .with_skills(vec![
            Skill::new("Void Collapse", 65, 40, 2)?,
            Skill::new("Abyssal Ward", 30, 25, 3)?,
            Skill::new("Eternal Darkness", 85, 60, 4)?,
        ])
        .with_bounty(2000, 500))
}
