//! Characters: players, enemies and bosses
//!
//! A `Character` owns everything that changes during a fight:
//! - Health and mana, always kept inside `[0, max]`
//! - A `StatTable` fed by equipment, active effects and set tiers
//! - Active effects, skills and a consumable pack
//!
//! Equipment mutations keep the stat table and set bonuses in step; nothing
//! outside this module writes to the table's equipment or set layers.

pub mod equipment;
pub mod skills;
pub mod stats;

pub use equipment::{
    Consumable, ConsumableEffect, Equipment, EquipmentSlots, ItemSet, ItemType, Rarity, SetTier,
    Slot,
};
pub use skills::{Skill, SkillRegistry};
pub use stats::{ModifierSource, Stat, StatBlock, StatTable};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::combat::{BossAction, BossPhaseController, Dice};
use crate::effects::{ActiveEffects, Effect, EffectEngine, StatusEffect, Trigger};
use crate::error::{ConfigurationError, EquipError, InvalidAction, InvariantViolation};

/// Experience and gold carried by a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub exp: u32,
    pub exp_to_level: u32,
    pub gold: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            exp: 0,
            exp_to_level: 100,
            gold: 0,
        }
    }
}

/// What defeating a character is worth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    pub exp: u32,
    pub gold: u32,
}

/// Boss-only state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    pub title: String,
    pub controller: BossPhaseController,
    /// Statuses pushed onto the player after each boss skill
    pub special_effects: Vec<StatusEffect>,
}

impl BossProfile {
    pub fn new(title: &str, rage_threshold: f64) -> Result<Self, ConfigurationError> {
        Ok(Self {
            title: title.to_string(),
            controller: BossPhaseController::new(rage_threshold)?,
            special_effects: Vec::new(),
        })
    }

    pub fn with_special_effect(mut self, status: StatusEffect) -> Self {
        self.special_effects.push(status);
        self
    }
}

/// What kind of combatant a character is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Player(Progress),
    Enemy,
    Boss(Box<BossProfile>),
}

/// Set tiers currently granted to a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSet {
    pub set: ItemSet,
    pub tiers: BTreeSet<usize>,
}

impl ActiveSet {
    /// Effects granted by the active tiers, in tier order
    pub fn granted_effects(&self) -> impl Iterator<Item = &Effect> {
        self.tiers
            .iter()
            .filter_map(|tier| self.set.tiers().get(*tier))
            .flat_map(|tier| tier.effects.iter())
    }
}

/// Result of using a consumable
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUse {
    pub item: String,
    pub messages: Vec<String>,
}

/// A combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    id: Uuid,
    name: String,
    level: u32,
    role: Role,
    health: i32,
    mana: i32,
    stats: StatTable,
    equipment: EquipmentSlots,
    effects: ActiveEffects,
    set_bonuses: BTreeMap<String, ActiveSet>,
    skills: SkillRegistry,
    consumables: Vec<Consumable>,
    bounty: Bounty,
}

impl Character {
    /// Create a character at full health and mana
    pub fn new(
        name: &str,
        level: u32,
        role: Role,
        base: StatBlock,
    ) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        let invalid = |detail: String| ConfigurationError::InvalidCharacter {
            name: name.to_string(),
            detail,
        };
        if level == 0 {
            return Err(invalid("level must be at least 1".to_string()));
        }
        for stat in [Stat::MaxHealth, Stat::MaxMana] {
            if base.get(stat) < 0 {
                return Err(invalid(format!("{} must not be negative", stat)));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            level,
            role,
            health: base.get(Stat::MaxHealth),
            mana: base.get(Stat::MaxMana),
            stats: StatTable::new(base),
            equipment: EquipmentSlots::default(),
            effects: ActiveEffects::default(),
            set_bonuses: BTreeMap::new(),
            skills: SkillRegistry::default(),
            consumables: Vec::new(),
            bounty: Bounty::default(),
        })
    }

    /// Level 1 adventurer
    pub fn player(name: &str, base: StatBlock) -> Result<Self, ConfigurationError> {
        Self::new(name, 1, Role::Player(Progress::default()), base)
    }

    pub fn enemy(name: &str, level: u32, base: StatBlock) -> Result<Self, ConfigurationError> {
        Self::new(name, level, Role::Enemy, base)
    }

    pub fn boss(
        name: &str,
        level: u32,
        base: StatBlock,
        profile: BossProfile,
    ) -> Result<Self, ConfigurationError> {
        Self::new(name, level, Role::Boss(Box::new(profile)), base)
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = SkillRegistry::new(skills);
        self
    }

    pub fn with_consumables(mut self, consumables: Vec<Consumable>) -> Self {
        self.consumables = consumables;
        self
    }

    pub fn with_bounty(mut self, exp: u32, gold: u32) -> Self {
        self.bounty = Bounty { exp, gold };
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.role, Role::Boss(_))
    }

    pub fn boss_profile(&self) -> Option<&BossProfile> {
        match &self.role {
            Role::Boss(profile) => Some(profile.as_ref()),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<&Progress> {
        match &self.role {
            Role::Player(progress) => Some(progress),
            _ => None,
        }
    }

    pub(crate) fn progress_mut(&mut self) -> Option<&mut Progress> {
        match &mut self.role {
            Role::Player(progress) => Some(progress),
            _ => None,
        }
    }

    pub fn bounty(&self) -> Bounty {
        self.bounty
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn mana(&self) -> i32 {
        self.mana
    }

    pub fn max_health(&self) -> i32 {
        self.stats.total(Stat::MaxHealth).max(0)
    }

    pub fn max_mana(&self) -> i32 {
        self.stats.total(Stat::MaxMana).max(0)
    }

    pub fn total_attack(&self) -> i32 {
        self.stats.total_attack()
    }

    pub fn total_defense(&self) -> i32 {
        self.stats.total_defense()
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        self.stats.total(stat)
    }

    pub fn stats(&self) -> &StatTable {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut StatTable {
        &mut self.stats
    }

    pub fn equipment(&self) -> &EquipmentSlots {
        &self.equipment
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut ActiveEffects {
        &mut self.effects
    }

    pub fn set_bonuses(&self) -> &BTreeMap<String, ActiveSet> {
        &self.set_bonuses
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    pub fn skills_mut(&mut self) -> &mut SkillRegistry {
        &mut self.skills
    }

    pub fn consumables(&self) -> &[Consumable] {
        &self.consumables
    }

    pub fn add_consumable(&mut self, item: Consumable) {
        self.consumables.push(item);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Current health as a share of max; zero max counts as empty
    pub fn hp_fraction(&self) -> f64 {
        let max = self.max_health();
        if max <= 0 {
            return 0.0;
        }
        self.health as f64 / max as f64
    }

    // Resources

    /// Lose health, never below zero. Returns health actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health - amount.max(0)).max(0);
        before - self.health
    }

    /// Gain health up to max. Returns health actually gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health()).max(before);
        self.health - before
    }

    /// Gain mana up to max. Returns mana actually gained.
    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        let before = self.mana;
        self.mana = (self.mana + amount.max(0)).min(self.max_mana()).max(before);
        self.mana - before
    }

    /// Spend up to `amount` mana, stopping at zero
    pub fn drain_mana(&mut self, amount: i32) -> i32 {
        let spent = amount.clamp(0, self.mana);
        self.mana -= spent;
        spent
    }

    pub fn restore_full(&mut self) {
        self.health = self.max_health();
        self.mana = self.max_mana();
    }

    /// Overwrite health, then repair it if it left its range
    pub fn set_health(&mut self, value: i32) -> Vec<InvariantViolation> {
        self.health = value;
        self.clamp_resources()
    }

    /// Overwrite mana, then repair it if it left its range
    pub fn set_mana(&mut self, value: i32) -> Vec<InvariantViolation> {
        self.mana = value;
        self.clamp_resources()
    }

    /// Clamp health and mana into `[0, max]`, reporting each repair
    pub fn clamp_resources(&mut self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let max = self.max_health();
        if !(0..=max).contains(&self.health) {
            violations.push(InvariantViolation::Health {
                character: self.name.clone(),
                value: self.health,
                max,
            });
            self.health = self.health.clamp(0, max);
        }

        let max = self.max_mana();
        if !(0..=max).contains(&self.mana) {
            violations.push(InvariantViolation::Mana {
                character: self.name.clone(),
                value: self.mana,
                max,
            });
            self.mana = self.mana.clamp(0, max);
        }

        for violation in &violations {
            warn!("Clamped resource: {}", violation);
        }
        violations
    }

    /// Pull health and mana back under maxima that just shrank
    pub(crate) fn settle_resources(&mut self) {
        let (max_health, max_mana) = (self.max_health(), self.max_mana());
        if self.health > max_health || self.mana > max_mana {
            debug!(
                "{}: maxima now {}/{}, trimming resources",
                self.name, max_health, max_mana
            );
        }
        self.health = self.health.clamp(0, max_health);
        self.mana = self.mana.clamp(0, max_mana);
    }

    // Equipment

    /// Put an item in a slot, returning whatever was there before
    pub fn equip(&mut self, item: Equipment, slot: Slot) -> Result<Option<Equipment>, EquipError> {
        if !slot.accepts(item.item_type) {
            warn!("{}: refused {} in {} slot", self.name, item.name, slot);
            return Err(EquipError::InvalidSlot {
                item: Box::new(item),
                slot,
            });
        }

        let previous = self.equipment.slot_mut(slot).take();
        if previous.is_some() {
            self.stats.remove(&ModifierSource::Equipment(slot));
        }

        debug!("{}: equipped {} ({})", self.name, item.name, slot);
        self.stats.add(ModifierSource::Equipment(slot), item.layer());
        *self.equipment.slot_mut(slot) = Some(item);

        self.recalc_set_bonuses();
        self.settle_resources();
        Ok(previous)
    }

    /// Empty a slot, returning its item
    pub fn unequip(&mut self, slot: Slot) -> Option<Equipment> {
        let item = self.equipment.slot_mut(slot).take()?;
        self.stats.remove(&ModifierSource::Equipment(slot));
        debug!("{}: unequipped {} ({})", self.name, item.name, slot);

        self.recalc_set_bonuses();
        self.settle_resources();
        Some(item)
    }

    /// Bring active set tiers in line with equipped pieces.
    ///
    /// Returns whether anything changed; a second call with no equipment
    /// change in between always returns false.
    pub fn recalc_set_bonuses(&mut self) -> bool {
        let mut counts: BTreeMap<String, (usize, ItemSet)> = BTreeMap::new();
        for (_, item) in self.equipment.iter() {
            if let Some(set) = &item.set {
                counts
                    .entry(set.name().to_string())
                    .or_insert_with(|| (0, set.clone()))
                    .0 += 1;
            }
        }

        let mut changed = false;

        let active_names: Vec<String> = self.set_bonuses.keys().cloned().collect();
        for name in active_names {
            let desired = counts
                .get(&name)
                .map(|(count, set)| set.satisfied_tiers(*count))
                .unwrap_or_default();
            let Some(active) = self.set_bonuses.get_mut(&name) else {
                continue;
            };
            let stale: Vec<usize> = active
                .tiers
                .iter()
                .filter(|tier| !desired.contains(tier))
                .copied()
                .collect();
            for tier in stale {
                active.tiers.remove(&tier);
                self.stats.remove(&ModifierSource::SetBonus {
                    set: name.clone(),
                    tier,
                });
                info!("{}: {} set tier {} deactivated", self.name, name, tier + 1);
                changed = true;
            }
            if active.tiers.is_empty() {
                self.set_bonuses.remove(&name);
            }
        }

        for (name, (count, set)) in counts {
            for tier in set.satisfied_tiers(count) {
                let active = self
                    .set_bonuses
                    .entry(name.clone())
                    .or_insert_with(|| ActiveSet {
                        set: set.clone(),
                        tiers: BTreeSet::new(),
                    });
                if active.tiers.insert(tier) {
                    self.stats.add(
                        ModifierSource::SetBonus {
                            set: name.clone(),
                            tier,
                        },
                        set.tiers()[tier].layer(),
                    );
                    info!(
                        "{}: {} set tier {} activated ({} pieces)",
                        self.name,
                        name,
                        tier + 1,
                        count
                    );
                    changed = true;
                }
            }
        }

        if changed {
            self.settle_resources();
        }
        changed
    }

    /// Item and set effects listening for a trigger, in dispatch order
    pub fn attached_effects(&self, trigger: Trigger) -> Vec<Effect> {
        let from_items = self
            .equipment
            .iter()
            .flat_map(|(_, item)| item.effects.iter());
        let from_sets = self
            .set_bonuses
            .values()
            .flat_map(ActiveSet::granted_effects);
        from_items
            .chain(from_sets)
            .filter(|effect| effect.trigger() == trigger)
            .cloned()
            .collect()
    }

    // Skills

    /// Use a skill if it is off cooldown and affordable.
    ///
    /// On rejection nothing changes.
    pub fn try_use_skill(&mut self, index: usize) -> Result<Skill, InvalidAction> {
        let skill = self
            .skills
            .get(index)
            .ok_or(InvalidAction::UnknownSkill(index))?;
        if !skill.is_available() {
            return Err(InvalidAction::SkillOnCooldown {
                name: skill.name().to_string(),
                remaining: skill.cooldown_current(),
            });
        }
        if self.mana < skill.mana_cost() {
            return Err(InvalidAction::InsufficientMana {
                name: skill.name().to_string(),
                required: skill.mana_cost(),
                available: self.mana,
            });
        }

        let cost = skill.mana_cost();
        self.mana -= cost;
        let used = self
            .skills
            .use_skill(index)
            .ok_or(InvalidAction::UnknownSkill(index))?;
        debug!("{} uses {} ({} mana)", self.name, used.name(), cost);
        Ok(used)
    }

    /// Ask a boss's phase controller for this turn's action
    pub(crate) fn boss_action(&mut self) -> Option<BossAction> {
        let hp_fraction = self.hp_fraction();
        match &mut self.role {
            Role::Boss(profile) => Some(
                profile
                    .controller
                    .priority_action(&mut self.skills, hp_fraction),
            ),
            _ => None,
        }
    }

    // Consumables

    /// Use and remove a consumable from the pack.
    ///
    /// `target` receives inflicted statuses; without one they land on the user.
    pub fn use_consumable(
        &mut self,
        index: usize,
        mut target: Option<&mut Character>,
        dice: &mut Dice,
    ) -> Result<ItemUse, InvalidAction> {
        if index >= self.consumables.len() {
            return Err(InvalidAction::UnknownItem(index));
        }
        let item = self.consumables.remove(index);
        let mut engine = EffectEngine::new(dice);
        let mut messages = Vec::new();

        for effect in &item.effects {
            match effect {
                ConsumableEffect::RestoreHealth(amount) => {
                    let healed = self.heal(*amount);
                    messages.push(format!("{} restored {} health", self.name, healed));
                }
                ConsumableEffect::RestoreMana(amount) => {
                    let restored = self.restore_mana(*amount);
                    messages.push(format!("{} restored {} mana", self.name, restored));
                }
                ConsumableEffect::Cure(status) => {
                    if engine.remove_effect(self, status).is_some() {
                        messages.push(format!("{} is no longer {}", self.name, status));
                    } else {
                        messages.push(format!("{} was not {}", self.name, status));
                    }
                }
                ConsumableEffect::Inflict(status) => {
                    let application = match target.as_deref_mut() {
                        Some(other) => engine.apply_effect(other, status, Some(&item.name)),
                        None => engine.apply_effect(self, status, Some(&item.name)),
                    };
                    messages.push(application.message);
                }
            }
        }

        info!("{} used {}", self.name, item.name);
        Ok(ItemUse {
            item: item.name,
            messages,
        })
    }

    // Progression

    /// Apply one level of growth and refill resources
    pub(crate) fn grow(&mut self, growth: &StatBlock) {
        self.level += 1;
        for (stat, delta) in growth.iter() {
            self.stats.raise_base(stat, delta);
        }
        self.restore_full();
    }
}
