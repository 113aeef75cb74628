//! Combat system module
//!
//! Turn-based fights between one adventurer and a group of opponents:
//! - Seedable dice for jitter and chance rolls
//! - Damage formulas for attacks, skills and boss skills
//! - Boss phase control
//! - The resolver state machine that runs a fight
//! - A simple policy for unattended fights

mod boss;
pub mod damage;
mod dice;
mod policy;
mod resolver;

pub use boss::{empower, BossAction, BossPhaseController, Phase};
pub use dice::Dice;
pub use policy::{auto_action, HEAL_THRESHOLD};
pub use resolver::{
    resolve_combat, CombatEvent, CombatOutcome, CombatReport, CombatResolver, CombatState,
    PlayerAction,
};
