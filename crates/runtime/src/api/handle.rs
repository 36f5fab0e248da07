//! Cloneable façade for issuing commands to the runtime.
//!
//! [`StackHandle`] hides channel plumbing and offers async helpers for spawning
//! stacks, forwarding damage, stepping, and streaming events.
use tokio::sync::{broadcast, mpsc, oneshot};

use stack_core::{
    CreatureId, DamageContext, EntityStack, SpawnCause, StackId, TransactionResult,
};

use super::errors::{Result, RuntimeError};
use crate::engine::StepReport;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct StackHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl StackHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Registers an existing host creature as a stack of `amount`.
    pub async fn spawn_stack(
        &self,
        creature: CreatureId,
        amount: u32,
        cause: SpawnCause,
    ) -> Result<StackId> {
        self.request(|reply| Command::SpawnStack {
            creature,
            amount,
            cause,
            reply,
        })
        .await?
    }

    /// Forwards a damage notification and returns the transaction result.
    pub async fn damage(
        &self,
        creature: CreatureId,
        context: DamageContext,
    ) -> Result<TransactionResult> {
        self.request(|reply| Command::Damage {
            creature,
            context: Box::new(context),
            reply,
        })
        .await
    }

    /// Runs one main step immediately, independent of the step interval.
    pub async fn step(&self) -> Result<StepReport> {
        self.request(|reply| Command::Step { reply }).await
    }

    /// Snapshot of a stack, or `None` if it no longer exists.
    pub async fn query_stack(&self, stack: StackId) -> Result<Option<EntityStack>> {
        self.request(|reply| Command::QueryStack { stack, reply })
            .await
    }

    /// Stack currently represented by `creature`.
    pub async fn stack_of(&self, creature: CreatureId) -> Result<Option<EntityStack>> {
        self.request(|reply| Command::StackOf { creature, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Lifecycle` - Spawns, transformations, removals
    /// - `Topic::Death` - Unstacks and commits
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
