//! Effect engine
//!
//! Applies, removes and ticks status effects, and dispatches item and set
//! effects when a trigger fires. Every chance roll goes through the borrowed
//! `Dice`.

use tracing::{debug, warn};

use super::active::ActiveEffect;
use super::kinds::{EffectKind, StatusEffect, Trigger};
use crate::character::{Character, ModifierSource, Stat, StatBlock};
use crate::combat::damage::scale_floor;
use crate::combat::Dice;

/// How an application attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// New entry created
    Applied,
    /// Existing entry gained a stack
    Stacked { stacks: u32 },
    /// Existing entry at its stack limit; duration refreshed only
    Refreshed { remaining: u32 },
    /// Chance roll failed; nothing changed
    Resisted,
}

/// Outcome plus a message for the display layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub outcome: ApplyOutcome,
    pub message: String,
}

impl Application {
    pub fn succeeded(&self) -> bool {
        self.outcome != ApplyOutcome::Resisted
    }
}

/// One effect's tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub effect: String,
    pub damage: i32,
    pub expired: bool,
}

/// What a dispatched effect did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Proc roll failed
    NoProc,
    /// Incoming hit negated
    Blocked,
    /// Holder healed
    Healed(i32),
    /// Extra damage to add to the hit
    BonusDamage(i32),
    /// Status pushed onto the other party
    StatusInflicted { status: String, applied: bool },
    /// Incoming hit turned into a defense buff
    Absorbed { defense: i32 },
    /// Holder regenerated
    Restored { health: i32, mana: i32 },
}

/// One dispatched effect and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerResult {
    pub effect: String,
    pub outcome: TriggerOutcome,
}

impl std::fmt::Display for TriggerResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            TriggerOutcome::NoProc => write!(f, "{} did not trigger", self.effect),
            TriggerOutcome::Blocked => write!(f, "{} blocked the attack", self.effect),
            TriggerOutcome::Healed(amount) => write!(f, "{} healed {}", self.effect, amount),
            TriggerOutcome::BonusDamage(amount) => {
                write!(f, "{} dealt {} extra damage", self.effect, amount)
            }
            TriggerOutcome::StatusInflicted { status, applied } => {
                if *applied {
                    write!(f, "{} inflicted {}", self.effect, status)
                } else {
                    write!(f, "{} failed to inflict {}", self.effect, status)
                }
            }
            TriggerOutcome::Absorbed { defense } => {
                write!(f, "{} absorbed the blow (+{} defense)", self.effect, defense)
            }
            TriggerOutcome::Restored { health, mana } => {
                write!(f, "{} restored {} health and {} mana", self.effect, health, mana)
            }
        }
    }
}

/// Applies and dispatches effects with one random source
pub struct EffectEngine<'d> {
    dice: &'d mut Dice,
}

impl<'d> EffectEngine<'d> {
    pub fn new(dice: &'d mut Dice) -> Self {
        Self { dice }
    }

    /// Roll a status's chance and put it on `target`.
    ///
    /// A status already present refreshes to the longer duration and gains a
    /// stack up to its limit.
    pub fn apply_effect(
        &mut self,
        target: &mut Character,
        status: &StatusEffect,
        source: Option<&str>,
    ) -> Application {
        if !self.dice.chance(status.chance()) {
            debug!("{} resisted {}", target.name(), status.name());
            return Application {
                outcome: ApplyOutcome::Resisted,
                message: format!("{} resisted {}", target.name(), status.name()),
            };
        }

        let name = status.name().to_string();
        let outcome = match target.effects_mut().get_mut(&name) {
            Some(active) => {
                active.remaining = active.remaining.max(status.duration());
                if active.stacks < active.status.stack_limit() {
                    active.stacks += 1;
                    ApplyOutcome::Stacked {
                        stacks: active.stacks,
                    }
                } else {
                    ApplyOutcome::Refreshed {
                        remaining: active.remaining,
                    }
                }
            }
            None => {
                target.effects_mut().insert(ActiveEffect {
                    status: status.clone(),
                    remaining: status.duration(),
                    stacks: 1,
                    source: source.map(str::to_string),
                });
                ApplyOutcome::Applied
            }
        };

        let layer = target
            .effects()
            .get(&name)
            .map(ActiveEffect::modifiers)
            .unwrap_or_default();
        target
            .stats_mut()
            .add(ModifierSource::Effect(name.clone()), layer);
        target.settle_resources();

        let message = match outcome {
            ApplyOutcome::Applied => format!("{} is now {}", target.name(), name),
            ApplyOutcome::Stacked { stacks } => {
                format!("{} grows stronger on {} (x{})", name, target.name(), stacks)
            }
            ApplyOutcome::Refreshed { remaining } => {
                format!("{} on {} refreshed ({} turns)", name, target.name(), remaining)
            }
            ApplyOutcome::Resisted => format!("{} resisted {}", target.name(), name),
        };
        debug!("{}", message);
        Application { outcome, message }
    }

    /// Remove a status and revert its stat deltas
    pub fn remove_effect(&mut self, target: &mut Character, name: &str) -> Option<ActiveEffect> {
        let removed = target.effects_mut().remove(name)?;
        target
            .stats_mut()
            .remove(&ModifierSource::Effect(name.to_string()));
        target.settle_resources();
        debug!("{} is no longer {}", target.name(), name);
        Some(removed)
    }

    /// Advance every status on `target` by one turn, in insertion order.
    ///
    /// Tick damage ignores defense. Statuses that run out are removed.
    pub fn tick(&mut self, target: &mut Character) -> Vec<TickReport> {
        let mut reports = Vec::new();
        let mut expired = Vec::new();

        for name in target.effects().names() {
            let Some(active) = target.effects_mut().get_mut(&name) else {
                continue;
            };
            let damage = active.tick_damage();
            active.remaining = active.remaining.saturating_sub(1);
            let done = active.remaining == 0;

            let dealt = target.take_damage(damage);
            if done {
                expired.push(name.clone());
            }
            reports.push(TickReport {
                effect: name,
                damage: dealt,
                expired: done,
            });
        }

        for name in expired {
            self.remove_effect(target, &name);
        }
        reports
    }

    /// Fire every item and set effect on `holder` listening for `trigger`.
    ///
    /// `other` is the opposing party of the exchange, if any; `damage` is the
    /// hit being dealt or taken.
    pub fn trigger(
        &mut self,
        holder: &mut Character,
        trigger: Trigger,
        mut other: Option<&mut Character>,
        damage: i32,
    ) -> Vec<TriggerResult> {
        if trigger == Trigger::Passive {
            return Vec::new();
        }

        let mut results = Vec::new();
        for effect in holder.attached_effects(trigger) {
            let outcome = match effect.kind() {
                EffectKind::StatModifier { .. } => continue,
                EffectKind::OnHit {
                    proc_chance,
                    status,
                } => {
                    if !self.dice.chance(*proc_chance) {
                        TriggerOutcome::NoProc
                    } else if let Some(target) = other.as_deref_mut() {
                        let application = self.apply_effect(target, status, Some(effect.name()));
                        TriggerOutcome::StatusInflicted {
                            status: status.name().to_string(),
                            applied: application.succeeded(),
                        }
                    } else {
                        TriggerOutcome::NoProc
                    }
                }
                EffectKind::Lifesteal { heal_percent } => {
                    if damage <= 0 {
                        TriggerOutcome::NoProc
                    } else {
                        TriggerOutcome::Healed(holder.heal(scale_floor(damage, *heal_percent)))
                    }
                }
                EffectKind::BonusDamage {
                    proc_chance,
                    percent,
                } => {
                    if self.dice.chance(*proc_chance) {
                        TriggerOutcome::BonusDamage(scale_floor(damage.max(0), *percent))
                    } else {
                        TriggerOutcome::NoProc
                    }
                }
                EffectKind::VoidBolt {
                    proc_chance,
                    magic_ratio,
                } => {
                    if self.dice.chance(*proc_chance) {
                        let magic = holder.stat(Stat::MagicPower).max(0);
                        TriggerOutcome::BonusDamage(scale_floor(magic, *magic_ratio))
                    } else {
                        TriggerOutcome::NoProc
                    }
                }
                EffectKind::VoidShield { block_chance } => {
                    if self.dice.chance(*block_chance) {
                        TriggerOutcome::Blocked
                    } else {
                        TriggerOutcome::NoProc
                    }
                }
                EffectKind::Absorb {
                    proc_chance,
                    divisor,
                    cap,
                    duration,
                } => {
                    if !self.dice.chance(*proc_chance) {
                        TriggerOutcome::NoProc
                    } else {
                        // a buff still running holds the larger of both values
                        let held = holder
                            .effects()
                            .get(effect.name())
                            .map(|active| active.modifiers().get(Stat::Defense))
                            .unwrap_or(0);
                        let defense = (damage.max(0) / divisor).min(*cap).max(held);
                        let buff = StatusEffect::new(effect.name(), *duration).map(|s| {
                            s.with_modifiers(StatBlock::new().with(Stat::Defense, defense))
                        });
                        match buff {
                            Ok(buff) => {
                                self.remove_effect(holder, effect.name());
                                self.apply_effect(holder, &buff, Some(effect.name()));
                                TriggerOutcome::Absorbed { defense }
                            }
                            Err(e) => {
                                warn!("{}: absorb buff rejected: {}", effect.name(), e);
                                TriggerOutcome::NoProc
                            }
                        }
                    }
                }
                EffectKind::Regeneration { health, mana } => TriggerOutcome::Restored {
                    health: holder.heal(*health),
                    mana: holder.restore_mana(*mana),
                },
            };

            debug!("{} on {}: {:?}", effect.name(), trigger, outcome);
            results.push(TriggerResult {
                effect: effect.name().to_string(),
                outcome,
            });
        }
        results
    }
}
