//! Encounter pacing
//!
//! The scheduler counts exploration steps toward a guaranteed boss fight and
//! picks the category of every ordinary encounter:
//! - One decrement per exploration step, never more
//! - A boss once the countdown reaches zero, until `reset_after_boss`
//! - Category weights that lean away from long combat streaks
//!
//! It is plain data owned by the session and saved alongside it.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::combat::Dice;
use crate::config::{EncounterSettings, DEFAULT_BOSS_INTERVAL};

/// Ordinary encounter categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterKind {
    Combat,
    Puzzle,
    Treasure,
    Trap,
    Npc,
}

impl EncounterKind {
    /// Categories in weight-table order
    pub fn all() -> &'static [EncounterKind] {
        &[
            EncounterKind::Combat,
            EncounterKind::Puzzle,
            EncounterKind::Treasure,
            EncounterKind::Trap,
            EncounterKind::Npc,
        ]
    }
}

impl FromStr for EncounterKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "combat" | "fight" => Ok(EncounterKind::Combat),
            "puzzle" => Ok(EncounterKind::Puzzle),
            "treasure" | "loot" => Ok(EncounterKind::Treasure),
            "trap" => Ok(EncounterKind::Trap),
            "npc" => Ok(EncounterKind::Npc),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EncounterKind::Combat => "combat",
            EncounterKind::Puzzle => "puzzle",
            EncounterKind::Treasure => "treasure",
            EncounterKind::Trap => "trap",
            EncounterKind::Npc => "npc",
        };
        write!(f, "{}", s)
    }
}

/// What the next encounter is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Boss,
    Encounter(EncounterKind),
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Boss => write!(f, "boss"),
            Decision::Encounter(kind) => write!(f, "{}", kind),
        }
    }
}

/// Base category weights
pub const BASE_WEIGHTS: [u32; 5] = [60, 5, 10, 5, 20];
/// Weights after one combat
pub const AFTER_COMBAT_WEIGHTS: [u32; 5] = [50, 15, 20, 5, 10];
/// Weights after three combats in a row
pub const COMBAT_STREAK_WEIGHTS: [u32; 5] = [40, 15, 30, 5, 10];

/// Countdown to the next boss, for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossProgress {
    pub remaining: i32,
    pub total: i32,
    /// Share of the interval already walked, in `[0, 1]`
    pub percentage: f64,
}

/// Boss countdown and category picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterScheduler {
    remaining: i32,
    total: i32,
    history: VecDeque<Decision>,
    settings: EncounterSettings,
}

impl Default for EncounterScheduler {
    fn default() -> Self {
        Self::new(EncounterSettings::default())
    }
}

impl EncounterScheduler {
    /// Start a full countdown of `boss_interval` steps
    pub fn new(settings: EncounterSettings) -> Self {
        let total = settings.boss_interval;
        Self {
            remaining: total,
            total,
            history: VecDeque::with_capacity(settings.history_len),
            settings,
        }
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    /// Most recent decision last
    pub fn history(&self) -> impl Iterator<Item = &Decision> {
        self.history.iter()
    }

    /// Count one exploration step
    pub fn advance(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
        }
        debug!("Boss countdown: {}/{}", self.remaining, self.total);
    }

    /// Decide the next encounter without touching the countdown
    pub fn decide_next(&mut self, dice: &mut Dice) -> Decision {
        let decision = if self.remaining <= 0 {
            info!("Boss encounter due");
            Decision::Boss
        } else {
            let weights = self.weights();
            let kind = EncounterKind::all()[dice.weighted(&weights)];
            Decision::Encounter(kind)
        };
        self.remember(decision);
        decision
    }

    /// One exploration step: count it, then decide
    pub fn explore(&mut self, dice: &mut Dice) -> Decision {
        self.advance();
        self.decide_next(dice)
    }

    /// Weights for the next ordinary encounter, from recent history
    pub fn weights(&self) -> [u32; 5] {
        let combat = Decision::Encounter(EncounterKind::Combat);
        let streak =
            self.history.len() >= 3 && self.history.iter().rev().take(3).all(|d| *d == combat);
        if streak {
            COMBAT_STREAK_WEIGHTS
        } else if self.history.back() == Some(&combat) {
            AFTER_COMBAT_WEIGHTS
        } else {
            BASE_WEIGHTS
        }
    }

    /// Countdown for display; a broken interval is reset to the default first
    pub fn progress(&mut self) -> BossProgress {
        if self.total <= 0 {
            warn!("Boss interval {} is invalid, resetting", self.total);
            self.total = if self.settings.boss_interval > 0 {
                self.settings.boss_interval
            } else {
                DEFAULT_BOSS_INTERVAL
            };
            self.remaining = self.remaining.clamp(0, self.total);
        }
        let walked = (self.total - self.remaining).clamp(0, self.total);
        BossProgress {
            remaining: self.remaining,
            total: self.total,
            percentage: walked as f64 / self.total as f64,
        }
    }

    /// Start a fresh countdown after a boss fight
    pub fn reset_after_boss(&mut self, dice: &mut Dice) {
        self.total = match self.settings.boss_interval_range {
            Some((min, max)) => dice.roll_range(min, max),
            None => self.settings.boss_interval,
        }
        .max(1);
        self.remaining = self.total;
        info!("Next boss in {} encounters", self.total);
    }

    fn remember(&mut self, decision: Decision) {
        let capacity = self.settings.history_len.max(3);
        while self.history.len() >= capacity {
            self.history.pop_front();
        }
        self.history.push_back(decision);
    }
}
