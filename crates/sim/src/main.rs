//! Local combat driver.
//!
//! Wires the engine to in-memory collaborators, lets a scripted ranger fight
//! a pair of forest wolves, then prints a JSON report of the outcome.
//!
//! ```bash
//! COMBAT_SEED=42 RUST_LOG=combat_runtime=debug cargo run -p combat-sim
//! ```
mod config;
mod report;
mod world;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use combat_core::{CharacterId, CombatId};
use combat_runtime::{ActionOutcome, CombatEngine, CombatEvent, Event, OracleManager, Topic};

use config::SimConfig;
use report::{FightReport, write_report};

const WOLVES: [&str; 2] = ["wolf_a", "wolf_b"];
const HEAL_BELOW_PERCENT: u32 = 40;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = setup_logging(&config)?;

    let repos = world::collaborators(&WOLVES);
    let engine = CombatEngine::builder()
        .config(config.engine.clone())
        .oracles(OracleManager::from_content(world::content()))
        .players(repos.players.clone())
        .enemies(repos.enemies.clone())
        .windows(repos.windows.clone())
        .build()?;

    let mut ended = engine.subscribe(Topic::Combat);
    let combat = engine.create_combat_seeded(world::FOREST, config.seed);
    engine
        .add_party(combat, "adventurers".into(), vec![world::ranger()])
        .await?;
    engine
        .add_party(
            combat,
            "pack".into(),
            WOLVES.iter().copied().map(world::forest_wolf).collect(),
        )
        .await?;

    let opening = engine.start(combat).await?;
    print_lines(&opening);
    if !opening.success {
        bail!("combat did not start: {}", opening.message);
    }

    let player = CharacterId::from(world::PLAYER_ID);
    let (commands_sent, last_outcome) = play(&engine, combat, &player, config.max_commands).await;

    if last_outcome.as_ref().is_none_or(|o| !o.combat_ended) {
        warn!(%combat, commands_sent, "command budget exhausted before the fight ended");
        engine.forfeit(combat, &player).await;
    }

    while let Ok(event) = ended.try_recv() {
        if let Event::Combat(CombatEvent::Ended { status, winner, .. }) = event {
            info!(%combat, %status, winner = ?winner, "fight over");
        }
    }

    let settlement = engine.settle(combat).await;
    let report = FightReport {
        seed: config.seed,
        commands_sent,
        last_outcome,
        settlement: settlement.to_string(),
        snapshot: engine.snapshot(combat).await,
        player: repos.players.get(&player),
        log: engine.logs_since(combat, 0).await.unwrap_or_default(),
    };
    if !report.settled() {
        warn!(%combat, %settlement, "fight was not settled");
    }

    write_report(&report, config.report_path.as_deref(), &mut std::io::stdout())
}

/// Plays the ranger: heal when low, lead with Power Shot, fall back to a
/// basic attack, and wait whenever it is someone else's turn.
async fn play(
    engine: &CombatEngine,
    combat: CombatId,
    player: &CharacterId,
    max_commands: usize,
) -> (usize, Option<ActionOutcome>) {
    let mut last = None;

    for sent in 1..=max_commands {
        let outcome = if engine.is_player_turn(combat, player).await {
            take_turn(engine, combat, player).await
        } else {
            engine.wait_turn(combat, player).await
        };
        print_lines(&outcome);
        debug!(%combat, success = outcome.success, message = %outcome.message, "command done");

        let ended = outcome.combat_ended;
        last = Some(outcome);
        if ended {
            return (sent, last);
        }
    }
    (max_commands, last)
}

async fn take_turn(engine: &CombatEngine, combat: CombatId, player: &CharacterId) -> ActionOutcome {
    let low = engine
        .snapshot(combat)
        .await
        .and_then(|s| s.characters.into_iter().find(|c| &c.id == player))
        .is_some_and(|c| c.health * 100 < c.max_health * HEAL_BELOW_PERCENT);

    if low {
        let healed = engine.use_item(combat, player, "Healing Herb").await;
        if healed.success {
            return healed;
        }
        debug!(reason = %healed.message, "could not heal");
    }

    let shot = engine.cast_skill(combat, player, "Power Shot", None).await;
    if shot.success || shot.combat_ended {
        return shot;
    }
    debug!(reason = %shot.message, "falling back to a basic attack");
    engine.cast_skill(combat, player, "Attack", None).await
}

fn print_lines(outcome: &ActionOutcome) {
    for line in &outcome.battle_log {
        info!(target: "battle", "{line}");
    }
}

/// Logs to stderr, and additionally to `combat-sim.log` when a log directory
/// is configured. The returned guard flushes the file writer on drop.
fn setup_logging(config: &SimConfig) -> Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let Some(dir) = &config.log_dir else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, "combat-sim.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter());

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    info!("Log file: {}", dir.join("combat-sim.log").display());
    Ok(Some(guard))
}
