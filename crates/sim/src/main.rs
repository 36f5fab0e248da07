//! Stacked death simulator.
//!
//! Spawns one stack on an in-memory host, hits it until it is gone, and prints
//! a JSON report of every transaction and event to stdout. Logs go to stderr.
//!
//! # Environment
//!
//! - `STACKER_CONFIG`: stacking rules (TOML), defaults to the bundled file
//! - `STACKER_LOOT`: loot tables (RON), defaults to the bundled file
//! - `STACKER_KIND`: creature kind (default `zombie`)
//! - `STACKER_AMOUNT`: stack size (default 20)
//! - `STACKER_DAMAGE`: final damage per hit (default 53)
//! - `STACKER_MAX_HITS`: hit limit (default 50)
//!
//! ```bash
//! RUST_LOG=stacker=debug STACKER_AMOUNT=5 cargo run -p stack-sim
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use stack_content::{ConfigLoader, ContentFactory, LootTableLoader};
use stack_core::{
    Attacker, CreatureId, DamageCause, DamageContext, EntityKind, Location, PlayerId, SpawnCause,
    StackId, TransactionOutcome,
};
use stack_runtime::{
    DeathEvent, Event, MemoryHost, Runtime, RuntimeConfig, TableLootProvider, Topic,
};

const COMMIT_TIMEOUT: Duration = Duration::from_secs(2);

struct SimConfig {
    config_path: Option<PathBuf>,
    loot_path: Option<PathBuf>,
    kind: EntityKind,
    amount: u32,
    damage: f64,
    max_hits: usize,
}

impl SimConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            config_path: env::var_os("STACKER_CONFIG").map(PathBuf::from),
            loot_path: env::var_os("STACKER_LOOT").map(PathBuf::from),
            kind: read_env("STACKER_KIND")?.unwrap_or(EntityKind::Zombie),
            amount: read_env("STACKER_AMOUNT")?.unwrap_or(20),
            damage: read_env("STACKER_DAMAGE")?.unwrap_or(53.0),
            max_hits: read_env("STACKER_MAX_HITS")?.unwrap_or(50),
        })
    }
}

fn read_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{key} has invalid value `{raw}`")),
        Err(_) => Ok(None),
    }
}

#[derive(Serialize)]
struct HitReport {
    hit: usize,
    cancelled: bool,
    event_damage: f64,
    outcome: String,
    remaining: Option<u32>,
}

#[derive(Serialize)]
struct SimReport {
    kind: EntityKind,
    amount: u32,
    hits: Vec<HitReport>,
    events: Vec<Event>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let sim = SimConfig::from_env()?;
    let bundled = ContentFactory::bundled();
    let stack_config = match &sim.config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => bundled.load_config()?,
    };
    let tables = match &sim.loot_path {
        Some(path) => LootTableLoader::load(path)?,
        None => bundled.load_loot_tables()?,
    };

    let mut host = MemoryHost::new();
    let representative = host.spawn(sim.kind, 20.0);

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            stack_config,
            ..RuntimeConfig::default()
        })
        .host(host)
        .loot(TableLootProvider::new(tables).lenient())
        .build()
        .await?;
    let handle = runtime.handle();
    let mut death_rx = handle.subscribe(Topic::Death);
    let mut lifecycle_rx = handle.subscribe(Topic::Lifecycle);

    let stack = handle
        .spawn_stack(representative, sim.amount, SpawnCause::Spawner)
        .await?;
    tracing::info!(%stack, kind = %sim.kind, amount = sim.amount, "spawned stack");

    let mut report = SimReport {
        kind: sim.kind,
        amount: sim.amount,
        hits: Vec::new(),
        events: Vec::new(),
    };

    for hit in 1..=sim.max_hits {
        let Some(current) = handle.query_stack(stack).await? else {
            break;
        };
        if current.amount() == 0 {
            break;
        }

        let result = handle
            .damage(current.representative(), player_hit(sim.damage))
            .await?;
        if let TransactionOutcome::Unstacked { .. } = result.outcome {
            let event = wait_for_commit(&mut death_rx, stack).await?;
            report.events.push(event);
        }

        report.hits.push(HitReport {
            hit,
            cancelled: result.cancel_event,
            event_damage: result.event_damage,
            outcome: format!("{:?}", result.outcome),
            remaining: handle.query_stack(stack).await?.map(|s| s.amount()),
        });
    }

    // Let the delayed removal run before collecting lifecycle events.
    tokio::time::sleep(RuntimeConfig::DEFAULT_STEP_INTERVAL * 3).await;
    while let Ok(event) = lifecycle_rx.try_recv() {
        report.events.push(event);
    }

    drop(death_rx);
    drop(handle);
    runtime.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn player_hit(damage: f64) -> DamageContext {
    DamageContext::new(DamageCause::EntityAttack, damage).with_attacker(Attacker::player(
        CreatureId(0),
        PlayerId(1),
        Location::new(3.0, 64.0, 0.0),
    ))
}

async fn wait_for_commit(rx: &mut broadcast::Receiver<Event>, stack: StackId) -> Result<Event> {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(Event::Death(event)) => {
                    let done = match &event {
                        DeathEvent::Committed { stack: s, .. }
                        | DeathEvent::Abandoned { stack: s, .. } => *s == stack,
                        DeathEvent::Unstacked { .. } => false,
                    };
                    if done {
                        return anyhow::Ok(Event::Death(event));
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "death events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    anyhow::bail!("runtime stopped before commit");
                }
            }
        }
    };
    tokio::time::timeout(COMMIT_TIMEOUT, wait)
        .await
        .context("timed out waiting for death commit")?
}
