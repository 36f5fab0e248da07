//! Runtime for stacked creature deaths.
//!
//! This crate drives the rules from `stack-core` against a game host. The
//! death transaction mutates stacks on the main step, computes loot off it,
//! and commits the result on a later step.
//!
//! Modules are organized by responsibility:
//! - [`death`] runs the two-phase death transaction
//! - [`engine`] owns the world and exposes the synchronous step API
//! - [`runtime`] hosts the async orchestrator and builder
//! - [`api`] exposes the handle and error types clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`host`] defines the host boundary and an in-memory host
//! - [`loot`], [`scheduler`] and [`stats`] are the collaborators the
//!   transaction calls into
pub mod api;
pub mod death;
pub mod engine;
pub mod events;
pub mod host;
pub mod loot;
pub mod runtime;
pub mod scheduler;
pub mod stats;

mod workers;

pub use api::{Result, RuntimeError, StackHandle};
pub use death::{
    CommitEffects, CommitReport, DeathPhase, DeathSimulator, PendingDeath, StackWorld,
};
pub use engine::{StackEngine, StepReport};
pub use events::{DeathEvent, Event, EventBus, LifecycleEvent, Topic};
pub use host::{
    Achievement, CreatureSnapshot, DeathNotification, DeathOutcome, HostAdapter, HostError,
    MemoryHost, Statistic,
};
pub use loot::{FixedLoot, LootError, LootProvider, NoLoot, TableLootProvider};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scheduler::{OffStepMode, StepScheduler, StepTask, Tick};
