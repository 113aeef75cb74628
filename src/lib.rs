//! hopebane - turn-based RPG combat engine
//!
//! Characters with layered stats, equipment and item sets, status effects,
//! a combat resolver with boss phases, and the pacing that leads to the next
//! boss fight. Everything random flows through a seedable [`Dice`].

pub mod catalog;
pub mod character;
pub mod combat;
pub mod config;
pub mod effects;
pub mod encounter;
pub mod error;
pub mod progression;

pub use character::{Character, Role};
pub use combat::{
    auto_action, resolve_combat, CombatOutcome, CombatReport, CombatResolver, CombatState, Dice,
    PlayerAction,
};
pub use config::BalanceConfig;
pub use effects::EffectEngine;
pub use encounter::{Decision, EncounterKind, EncounterScheduler};
pub use error::{ConfigurationError, EquipError, InvalidAction, InvariantViolation};
pub use progression::{award_victory, Rewards};
