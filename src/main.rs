//! hopebane-sim - unattended adventure runner
//!
//! Walks an adventurer through a string of encounters with the built-in
//! content, fighting every combat and boss with the automatic policy.
//! Useful for eyeballing balance settings.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use hopebane::encounter::Decision;
use hopebane::{
    auto_action, award_victory, catalog, resolve_combat, BalanceConfig, CombatOutcome, Dice,
    EncounterKind, EncounterScheduler,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Hopebane adventure simulator
#[derive(Parser, Debug)]
#[command(
    name = "hopebane-sim",
    version,
    about = "Run an adventurer through simulated encounters"
)]
struct Args {
    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Balance settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exploration steps to walk
    #[arg(long, default_value_t = 20)]
    steps: u32,

    /// Adventurer name
    #[arg(short, long, default_value = "Adventurer")]
    name: String,

    /// Print the final adventurer and scheduler as JSON
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hopebane=info,hopebane_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if args.steps == 0 {
        bail!("--steps must be at least 1");
    }

    let config = BalanceConfig::load(args.config.as_deref())?;
    let mut dice = match args.seed {
        Some(seed) => Dice::seeded(seed),
        None => Dice::from_entropy(),
    };
    info!("Dice seed: {:?}", dice.seed());

    let mut scheduler = EncounterScheduler::new(config.encounters.clone());
    let mut hero = catalog::adventurer(&args.name)?;
    let loot = catalog::loot_table()?;
    let mut victories = 0;

    for step in 1..=args.steps {
        let decision = scheduler.explore(&mut dice);
        let opponents = match decision {
            Decision::Boss => vec![catalog::void_sentinel()?],
            Decision::Encounter(EncounterKind::Combat) => {
                vec![catalog::random_enemy(hero.level() + 1, &mut dice)?]
            }
            Decision::Encounter(kind) => {
                info!("Step {}: {} encounter, nothing to fight", step, kind);
                continue;
            }
        };

        let report = resolve_combat(hero, opponents, &mut dice, &config.combat, auto_action)?;
        for line in &report.log {
            debug!("{}", line);
        }
        hero = report.player;
        info!(
            "Step {}: {} after {} rounds, {} at {}/{} HP",
            step,
            report.outcome,
            report.rounds,
            hero.name(),
            hero.health(),
            hero.max_health()
        );

        match report.outcome {
            CombatOutcome::Victory => {
                victories += 1;
                let rewards = award_victory(
                    &mut hero,
                    &report.opponents,
                    &loot,
                    &mut dice,
                    &config.progression,
                );
                debug!(
                    "Rewards: {} exp, {} gold, {} level(s)",
                    rewards.exp, rewards.gold, rewards.levels_gained
                );
                for item in rewards.drops {
                    let Some(slot) = item.item_type.slot() else {
                        continue;
                    };
                    if hero.equipment().get(slot).is_none() {
                        info!("{} equips {}", hero.name(), item.name);
                        hero.equip(item, slot)?;
                    } else {
                        debug!("{} leaves {} behind", hero.name(), item.name);
                    }
                }
                if decision == Decision::Boss {
                    scheduler.reset_after_boss(&mut dice);
                }
            }
            CombatOutcome::Retreat => {}
            CombatOutcome::Defeat => {
                info!("{} has fallen on step {}", hero.name(), step);
                break;
            }
        }

        let progress = scheduler.progress();
        debug!(
            "Boss in {} ({:.0}% of the way)",
            progress.remaining,
            progress.percentage * 100.0
        );
    }

    let gold = hero.progress().map(|p| p.gold).unwrap_or(0);
    info!(
        "{} ends at level {} with {} gold and {} victories",
        hero.name(),
        hero.level(),
        gold,
        victories
    );

    if args.dump {
        let state = serde_json::json!({
            "adventurer": hero,
            "scheduler": scheduler,
        });
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    Ok(())
}
