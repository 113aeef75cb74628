//! Effects system
//!
//! - Definitions: timed statuses and trigger-bound item/set effects
//! - Active effect bookkeeping on characters
//! - The engine that applies, ticks and dispatches them

mod active;
mod engine;
mod kinds;

pub use active::{ActiveEffect, ActiveEffects};
pub use engine::{
    Application, ApplyOutcome, EffectEngine, TickReport, TriggerOutcome, TriggerResult,
};
pub use kinds::{Effect, EffectKind, StatusEffect, Trigger};
