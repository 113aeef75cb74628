//! Skills and cooldown bookkeeping

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A named attack with a mana cost and a cooldown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    name: String,
    damage: i32,
    mana_cost: i32,
    cooldown_max: u32,
    cooldown_current: u32,
    description: String,
}

impl Skill {
    /// Create a ready-to-use skill
    pub fn new(
        name: &str,
        damage: i32,
        mana_cost: i32,
        cooldown_max: u32,
    ) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if damage < 0 || mana_cost < 0 {
            return Err(ConfigurationError::InvalidSkill {
                name: name.to_string(),
                detail: format!("damage {} and mana cost {} must not be negative", damage, mana_cost),
            });
        }
        Ok(Self {
            name: name.to_string(),
            damage,
            mana_cost,
            cooldown_max,
            cooldown_current: 0,
            description: String::new(),
        })
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn mana_cost(&self) -> i32 {
        self.mana_cost
    }

    pub fn cooldown_max(&self) -> u32 {
        self.cooldown_max
    }

    pub fn cooldown_current(&self) -> u32 {
        self.cooldown_current
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Ready when the cooldown has run out
    pub fn is_available(&self) -> bool {
        self.cooldown_current == 0
    }

    /// Copy with damage, cost and cooldown replaced, ready to use
    pub fn variant(&self, name: &str, damage: i32, mana_cost: i32, cooldown_max: u32) -> Skill {
        Skill {
            name: name.to_string(),
            damage,
            mana_cost,
            cooldown_max,
            cooldown_current: 0,
            description: self.description.clone(),
        }
    }

    fn start_cooldown(&mut self) {
        self.cooldown_current = self.cooldown_max;
    }

    fn tick(&mut self) {
        self.cooldown_current = self.cooldown_current.saturating_sub(1);
    }
}

/// A character's skills, in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRegistry {
    skills: Vec<Skill>,
}

impl SkillRegistry {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    pub fn push(&mut self, skill: Skill) {
        self.skills.push(skill);
    }

    pub fn get(&self, index: usize) -> Option<&Skill> {
        self.skills.get(index)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    /// Last skill in the list, reserved for a boss's rage phase
    pub fn last(&self) -> Option<&Skill> {
        self.skills.last()
    }

    pub fn is_available(&self, index: usize) -> bool {
        self.skills.get(index).is_some_and(Skill::is_available)
    }

    /// Start a skill's cooldown and return a copy of it as used.
    ///
    /// Availability and mana are the caller's to check.
    pub fn use_skill(&mut self, index: usize) -> Option<Skill> {
        let skill = self.skills.get_mut(index)?;
        let used = skill.clone();
        skill.start_cooldown();
        Some(used)
    }

    /// First available skill in definition order
    pub fn first_available(&self) -> Option<usize> {
        self.skills.iter().position(Skill::is_available)
    }

    /// One fully resolved turn passed
    pub fn advance_turn(&mut self) {
        for skill in self.skills.iter_mut() {
            skill.tick();
        }
    }
}
