//! Combat resolver
//!
//! Runs one encounter between an adventurer and a list of opponents as an
//! explicit state machine:
//!
//! `AwaitingAction → ActionResolved → OpponentActed → TurnComplete → AwaitingAction`
//!
//! ending in `Finished(Victory | Defeat | Retreat)`. Callers drive it with
//! `submit` (the player's choice) and `advance` (one transition at a time),
//! or hand `run` a policy and let it play the whole fight.
//!
//! Rejected selections leave the state untouched and cost nothing.

use tracing::{debug, info, warn};

use super::boss::BossAction;
use super::damage::{attack_damage, boss_skill_damage, skill_damage};
use super::dice::Dice;
use crate::character::Character;
use crate::config::CombatSettings;
use crate::effects::{EffectEngine, Trigger, TriggerOutcome, TriggerResult};
use crate::error::{ConfigurationError, InvalidAction};

/// How a fight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Retreat,
}

impl std::fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CombatOutcome::Victory => "victory",
            CombatOutcome::Defeat => "defeat",
            CombatOutcome::Retreat => "retreat",
        };
        write!(f, "{}", s)
    }
}

/// Where the resolver is within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatState {
    /// Waiting for the player's choice
    AwaitingAction,
    /// Player's turn-ending action landed
    ActionResolved,
    /// Opponents have acted
    OpponentActed,
    /// Cooldowns advanced and effects ticked
    TurnComplete,
    Finished(CombatOutcome),
}

impl CombatState {
    pub fn is_finished(&self) -> bool {
        matches!(self, CombatState::Finished(_))
    }
}

/// A player's choice for the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Weapon attack on an opponent
    Attack { target: usize },
    /// Skill by index on an opponent
    UseSkill { skill: usize, target: usize },
    /// Consumable by index; does not end the turn
    UseItem { item: usize, target: Option<usize> },
    /// Try to flee
    Retreat,
}

/// Something that happened during a fight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    Hit {
        attacker: String,
        defender: String,
        with: String,
        damage: i32,
    },
    Blocked {
        attacker: String,
        defender: String,
    },
    Triggered {
        holder: String,
        result: TriggerResult,
    },
    ItemUsed {
        user: String,
        item: String,
        messages: Vec<String>,
    },
    StatusApplied {
        message: String,
    },
    Enraged {
        boss: String,
        skill: String,
    },
    RetreatSucceeded,
    RetreatFailed {
        opponent: String,
        damage: i32,
    },
    EffectTicked {
        target: String,
        effect: String,
        damage: i32,
    },
    EffectExpired {
        target: String,
        effect: String,
    },
    Defeated {
        name: String,
    },
    Stalemate {
        rounds: u32,
    },
    Finished(CombatOutcome),
}

impl std::fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombatEvent::RoundStarted { round } => write!(f, "-- round {} --", round),
            CombatEvent::Hit {
                attacker,
                defender,
                with,
                damage,
            } => write!(
                f,
                "{} hits {} with {} for {} damage",
                attacker, defender, with, damage
            ),
            CombatEvent::Blocked { attacker, defender } => {
                write!(f, "{} blocks the attack from {}", defender, attacker)
            }
            CombatEvent::Triggered { holder, result } => write!(f, "{}: {}", holder, result),
            CombatEvent::ItemUsed {
                user,
                item,
                messages,
            } => {
                write!(f, "{} uses {}", user, item)?;
                for message in messages {
                    write!(f, "; {}", message)?;
                }
                Ok(())
            }
            CombatEvent::StatusApplied { message } => write!(f, "{}", message),
            CombatEvent::Enraged { boss, skill } => {
                write!(f, "{} enters a rage and unleashes {}", boss, skill)
            }
            CombatEvent::RetreatSucceeded => write!(f, "you escaped"),
            CombatEvent::RetreatFailed { opponent, damage } => write!(
                f,
                "escape failed; {} counter-attacks for {} damage",
                opponent, damage
            ),
            CombatEvent::EffectTicked {
                target,
                effect,
                damage,
            } => write!(f, "{} takes {} damage from {}", target, damage, effect),
            CombatEvent::EffectExpired { target, effect } => {
                write!(f, "{} on {} wore off", effect, target)
            }
            CombatEvent::Defeated { name } => write!(f, "{} is defeated", name),
            CombatEvent::Stalemate { rounds } => {
                write!(f, "the fight drags on for {} rounds and both sides withdraw", rounds)
            }
            CombatEvent::Finished(outcome) => write!(f, "combat ends in {}", outcome),
        }
    }
}

/// Final record of a fight
#[derive(Debug, Clone)]
pub struct CombatReport {
    pub outcome: CombatOutcome,
    /// Human-readable lines, one per event
    pub log: Vec<String>,
    pub events: Vec<CombatEvent>,
    pub rounds: u32,
    /// Adventurer as the fight left them
    pub player: Character,
    /// Opponents as the fight left them
    pub opponents: Vec<Character>,
}

/// One encounter's turn loop
pub struct CombatResolver<'a> {
    player: Character,
    opponents: Vec<Character>,
    dice: &'a mut Dice,
    settings: &'a CombatSettings,
    state: CombatState,
    round: u32,
    round_open: bool,
    events: Vec<CombatEvent>,
}

impl<'a> CombatResolver<'a> {
    /// Start a fight; there must be at least one opponent
    pub fn new(
        player: Character,
        opponents: Vec<Character>,
        dice: &'a mut Dice,
        settings: &'a CombatSettings,
    ) -> Result<Self, ConfigurationError> {
        if opponents.is_empty() {
            return Err(ConfigurationError::InvalidCharacter {
                name: player.name().to_string(),
                detail: "a fight needs at least one opponent".to_string(),
            });
        }

        let names: Vec<&str> = opponents.iter().map(Character::name).collect();
        info!("Combat: {} vs {}", player.name(), names.join(", "));

        let mut resolver = Self {
            player,
            opponents,
            dice,
            settings,
            state: CombatState::AwaitingAction,
            round: 1,
            round_open: false,
            events: Vec::new(),
        };
        resolver.check_terminal();
        Ok(resolver)
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn player(&self) -> &Character {
        &self.player
    }

    pub fn opponents(&self) -> &[Character] {
        &self.opponents
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        match self.state {
            CombatState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Index of the first opponent still standing
    pub fn first_living_opponent(&self) -> Option<usize> {
        self.opponents.iter().position(Character::is_alive)
    }

    /// Resolve the player's choice.
    ///
    /// Attack, skill and retreat end the player's part of the round; an item
    /// leaves the resolver waiting for another action.
    pub fn submit(&mut self, action: PlayerAction) -> Result<(), InvalidAction> {
        match self.state {
            CombatState::AwaitingAction => {}
            CombatState::Finished(_) => return Err(InvalidAction::CombatFinished),
            _ => return Err(InvalidAction::NotAwaitingAction),
        }

        match action {
            PlayerAction::Attack { target } => {
                self.living_target(target)?;
                self.open_round();
                let jitter = self.dice.jitter(self.settings.attack_jitter);
                let damage = attack_damage(
                    self.player.total_attack(),
                    jitter,
                    self.opponents[target].total_defense(),
                );
                self.player_strike(target, "attack", damage);
                self.after_player_action();
            }
            PlayerAction::UseSkill { skill, target } => {
                self.living_target(target)?;
                let used = self.player.try_use_skill(skill)?;
                self.open_round();
                let jitter = self.dice.jitter(self.settings.skill_jitter);
                let damage = skill_damage(used.damage(), jitter);
                self.player_strike(target, used.name(), damage);
                self.after_player_action();
            }
            PlayerAction::UseItem { item, target } => self.use_item(item, target)?,
            PlayerAction::Retreat => {
                self.open_round();
                self.retreat();
            }
        }
        Ok(())
    }

    /// Perform exactly one transition past the player's action
    pub fn advance(&mut self) -> Result<CombatState, InvalidAction> {
        match self.state {
            CombatState::AwaitingAction => return Err(InvalidAction::ActionRequired),
            CombatState::Finished(_) => return Err(InvalidAction::CombatFinished),
            CombatState::ActionResolved => {
                self.opponents_act();
                if self.check_terminal().is_none() {
                    self.state = CombatState::OpponentActed;
                }
            }
            CombatState::OpponentActed => {
                self.end_of_turn();
                if self.check_terminal().is_none() {
                    self.state = CombatState::TurnComplete;
                }
            }
            CombatState::TurnComplete => {
                if self.round >= self.settings.max_turns {
                    warn!("Combat stalled after {} rounds, calling it off", self.round);
                    self.events.push(CombatEvent::Stalemate { rounds: self.round });
                    self.finish(CombatOutcome::Retreat);
                } else {
                    self.round += 1;
                    self.round_open = false;
                    self.state = CombatState::AwaitingAction;
                }
            }
        }
        Ok(self.state)
    }

    /// Submit an action and advance until input is needed or the fight ends
    pub fn play_turn(&mut self, action: PlayerAction) -> Result<CombatState, InvalidAction> {
        self.submit(action)?;
        while !matches!(
            self.state,
            CombatState::AwaitingAction | CombatState::Finished(_)
        ) {
            self.advance()?;
        }
        Ok(self.state)
    }

    /// Play the fight to the end with a policy choosing each action.
    ///
    /// After too many rejected choices in a row the resolver attacks the
    /// first living opponent instead.
    pub fn run<P>(mut self, mut policy: P) -> CombatReport
    where
        P: FnMut(&CombatResolver<'_>) -> PlayerAction,
    {
        let mut rejected = 0;
        while !self.state.is_finished() {
            let action = if rejected >= self.settings.max_invalid_actions {
                let target = self.first_living_opponent().unwrap_or(0);
                warn!(
                    "{} rejected choices in a row, attacking opponent {}",
                    rejected, target
                );
                PlayerAction::Attack { target }
            } else {
                policy(&self)
            };

            match self.play_turn(action) {
                Ok(_) => rejected = 0,
                Err(e) => {
                    debug!("Rejected {:?}: {}", action, e);
                    rejected += 1;
                }
            }
        }
        self.into_report()
    }

    /// Consume the resolver into its report
    pub fn into_report(self) -> CombatReport {
        let outcome = self.outcome().unwrap_or(CombatOutcome::Retreat);
        CombatReport {
            outcome,
            log: self.events.iter().map(ToString::to_string).collect(),
            events: self.events,
            rounds: self.round,
            player: self.player,
            opponents: self.opponents,
        }
    }

    // Player actions

    fn living_target(&self, target: usize) -> Result<(), InvalidAction> {
        match self.opponents.get(target) {
            Some(opponent) if opponent.is_alive() => Ok(()),
            _ => Err(InvalidAction::InvalidTarget(target)),
        }
    }

    fn use_item(&mut self, item: usize, target: Option<usize>) -> Result<(), InvalidAction> {
        let offensive = self
            .player
            .consumables()
            .get(item)
            .ok_or(InvalidAction::UnknownItem(item))?
            .is_offensive();

        let target = if offensive {
            match target {
                Some(index) => {
                    self.living_target(index)?;
                    Some(index)
                }
                None => self.first_living_opponent(),
            }
        } else {
            None
        };

        let used = match target {
            Some(index) => {
                self.player
                    .use_consumable(item, Some(&mut self.opponents[index]), self.dice)?
            }
            None => self.player.use_consumable(item, None, self.dice)?,
        };
        self.events.push(CombatEvent::ItemUsed {
            user: self.player.name().to_string(),
            item: used.item,
            messages: used.messages,
        });
        Ok(())
    }

    fn retreat(&mut self) {
        let Some(index) = self.strongest_opponent() else {
            self.finish(CombatOutcome::Victory);
            return;
        };

        let chance = self
            .settings
            .escape_chance(self.opponents[index].level());
        if self.dice.chance(chance) {
            info!("{} escapes", self.player.name());
            self.events.push(CombatEvent::RetreatSucceeded);
            self.finish(CombatOutcome::Retreat);
            return;
        }

        let opponent = &self.opponents[index];
        let jitter = self.dice.jitter(self.settings.counter_jitter);
        let damage = attack_damage(opponent.total_attack(), jitter, self.player.total_defense());
        let name = opponent.name().to_string();
        let dealt = self.player.take_damage(damage);
        debug!("Retreat failed, {} counters for {}", name, dealt);
        self.events.push(CombatEvent::RetreatFailed {
            opponent: name,
            damage: dealt,
        });

        if self.check_terminal().is_none() {
            self.state = CombatState::OpponentActed;
        }
    }

    /// Highest-level living opponent, first on ties
    fn strongest_opponent(&self) -> Option<usize> {
        self.opponents
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_alive())
            .fold(None, |best: Option<(usize, u32)>, (index, o)| match best {
                Some((_, level)) if level >= o.level() => best,
                _ => Some((index, o.level())),
            })
            .map(|(index, _)| index)
    }

    fn player_strike(&mut self, target: usize, with: &str, damage: i32) {
        let defender = &mut self.opponents[target];
        exchange(
            self.dice,
            &mut self.player,
            defender,
            with,
            damage,
            &mut self.events,
        );

        if !self.opponents[target].is_alive() {
            let name = self.opponents[target].name().to_string();
            info!("{} defeats {}", self.player.name(), name);
            self.events.push(CombatEvent::Defeated { name });
            let results = EffectEngine::new(self.dice).trigger(
                &mut self.player,
                Trigger::OnKill,
                None,
                0,
            );
            record(&mut self.events, self.player.name(), results);
        }
    }

    fn after_player_action(&mut self) {
        if self.check_terminal().is_none() {
            self.state = CombatState::ActionResolved;
        }
    }

    // Round structure

    fn open_round(&mut self) {
        if self.round_open {
            return;
        }
        self.round_open = true;
        self.events.push(CombatEvent::RoundStarted { round: self.round });

        let mut engine = EffectEngine::new(self.dice);
        let results = engine.trigger(&mut self.player, Trigger::TurnStart, None, 0);
        record(&mut self.events, self.player.name(), results);
        for opponent in self.opponents.iter_mut().filter(|o| o.is_alive()) {
            let results = engine.trigger(opponent, Trigger::TurnStart, None, 0);
            record(&mut self.events, opponent.name(), results);
        }
    }

    fn opponents_act(&mut self) {
        for index in 0..self.opponents.len() {
            if !self.player.is_alive() {
                break;
            }
            if !self.opponents[index].is_alive() {
                continue;
            }
            if self.opponents[index].is_boss() {
                self.boss_turn(index);
            } else {
                let jitter = self.dice.jitter(self.settings.enemy_jitter);
                let damage = attack_damage(
                    self.opponents[index].total_attack(),
                    jitter,
                    self.player.total_defense(),
                );
                exchange(
                    self.dice,
                    &mut self.opponents[index],
                    &mut self.player,
                    "attack",
                    damage,
                    &mut self.events,
                );
            }
        }
    }

    fn boss_turn(&mut self, index: usize) {
        let boss = &mut self.opponents[index];
        let action = boss.boss_action().unwrap_or(BossAction::BasicAttack);

        let skill = match action {
            BossAction::Rage(skill) => {
                self.events.push(CombatEvent::Enraged {
                    boss: boss.name().to_string(),
                    skill: skill.name().to_string(),
                });
                Some(skill)
            }
            BossAction::Skill(skill) => Some(skill),
            BossAction::BasicAttack => None,
        };

        match skill {
            Some(skill) => {
                boss.drain_mana(skill.mana_cost());
                let damage = boss_skill_damage(
                    skill.damage(),
                    boss.level(),
                    boss.total_attack(),
                    self.player.total_defense(),
                );
                exchange(
                    self.dice,
                    boss,
                    &mut self.player,
                    skill.name(),
                    damage,
                    &mut self.events,
                );

                let specials = boss
                    .boss_profile()
                    .map(|p| p.special_effects.clone())
                    .unwrap_or_default();
                let source = boss.name().to_string();
                let mut engine = EffectEngine::new(self.dice);
                for status in &specials {
                    let application = engine.apply_effect(&mut self.player, status, Some(&source));
                    if application.succeeded() {
                        self.events.push(CombatEvent::StatusApplied {
                            message: application.message,
                        });
                    }
                }
            }
            None => {
                let jitter = self.dice.jitter(self.settings.boss_jitter);
                let damage =
                    attack_damage(boss.total_attack(), jitter, self.player.total_defense());
                exchange(
                    self.dice,
                    boss,
                    &mut self.player,
                    "attack",
                    damage,
                    &mut self.events,
                );
            }
        }
    }

    fn end_of_turn(&mut self) {
        self.player.skills_mut().advance_turn();
        for opponent in self.opponents.iter_mut() {
            opponent.skills_mut().advance_turn();
        }

        let mut engine = EffectEngine::new(self.dice);
        let results = engine.trigger(&mut self.player, Trigger::TurnEnd, None, 0);
        record(&mut self.events, self.player.name(), results);
        for opponent in self.opponents.iter_mut().filter(|o| o.is_alive()) {
            let results = engine.trigger(opponent, Trigger::TurnEnd, None, 0);
            record(&mut self.events, opponent.name(), results);
        }

        tick_all(&mut engine, &mut self.player, &mut self.events);
        for opponent in self.opponents.iter_mut().filter(|o| o.is_alive()) {
            tick_all(&mut engine, opponent, &mut self.events);
            if !opponent.is_alive() {
                self.events.push(CombatEvent::Defeated {
                    name: opponent.name().to_string(),
                });
            }
        }
    }

    /// Finish the fight if either side is down
    fn check_terminal(&mut self) -> Option<CombatOutcome> {
        let outcome = if !self.player.is_alive() {
            CombatOutcome::Defeat
        } else if self.opponents.iter().all(|o| !o.is_alive()) {
            CombatOutcome::Victory
        } else {
            return None;
        };
        self.finish(outcome);
        Some(outcome)
    }

    fn finish(&mut self, outcome: CombatOutcome) {
        info!(
            "Combat over after {} round(s): {} ({} hp left)",
            self.round,
            outcome,
            self.player.health()
        );
        self.events.push(CombatEvent::Finished(outcome));
        self.state = CombatState::Finished(outcome);
    }
}

/// One hit: on-hit effects on the attacker, on-hit-taken effects on the
/// defender, then damage. Returns damage dealt.
fn exchange(
    dice: &mut Dice,
    attacker: &mut Character,
    defender: &mut Character,
    with: &str,
    damage: i32,
    events: &mut Vec<CombatEvent>,
) -> i32 {
    let mut engine = EffectEngine::new(dice);
    let mut damage = damage;

    let results = engine.trigger(attacker, Trigger::OnHit, Some(&mut *defender), damage);
    for result in &results {
        if let TriggerOutcome::BonusDamage(extra) = result.outcome {
            damage += extra;
        }
    }
    record(events, attacker.name(), results);

    let results = engine.trigger(defender, Trigger::OnHitTaken, Some(&mut *attacker), damage);
    let blocked = results
        .iter()
        .any(|r| r.outcome == TriggerOutcome::Blocked);
    record(events, defender.name(), results);

    if blocked {
        events.push(CombatEvent::Blocked {
            attacker: attacker.name().to_string(),
            defender: defender.name().to_string(),
        });
        return 0;
    }

    let dealt = defender.take_damage(damage);
    debug!(
        "{} hits {} with {} for {} ({} hp left)",
        attacker.name(),
        defender.name(),
        with,
        dealt,
        defender.health()
    );
    events.push(CombatEvent::Hit {
        attacker: attacker.name().to_string(),
        defender: defender.name().to_string(),
        with: with.to_string(),
        damage: dealt,
    });
    dealt
}

fn record(events: &mut Vec<CombatEvent>, holder: &str, results: Vec<TriggerResult>) {
    for result in results {
        if result.outcome == TriggerOutcome::NoProc {
            continue;
        }
        events.push(CombatEvent::Triggered {
            holder: holder.to_string(),
            result,
        });
    }
}

fn tick_all(engine: &mut EffectEngine<'_>, target: &mut Character, events: &mut Vec<CombatEvent>) {
    for report in engine.tick(target) {
        if report.damage > 0 {
            events.push(CombatEvent::EffectTicked {
                target: target.name().to_string(),
                effect: report.effect.clone(),
                damage: report.damage,
            });
        }
        if report.expired {
            events.push(CombatEvent::EffectExpired {
                target: target.name().to_string(),
                effect: report.effect,
            });
        }
    }
}

/// Run a whole fight with a policy and return its report
pub fn resolve_combat<P>(
    player: Character,
    opponents: Vec<Character>,
    dice: &mut Dice,
    settings: &CombatSettings,
    policy: P,
) -> Result<CombatReport, ConfigurationError>
where
    P: FnMut(&CombatResolver<'_>) -> PlayerAction,
{
    let resolver = CombatResolver::new(player, opponents, dice, settings)?;
    Ok(resolver.run(policy))
}
