//! Step worker that owns the authoritative [`StackEngine`].
//!
//! Receives commands from [`StackHandle`](crate::StackHandle), advances the
//! main step on a fixed interval, and publishes recorded events to the
//! EventBus.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use stack_core::{
    CreatureId, DamageContext, EntityStack, SpawnCause, StackId, TransactionResult,
};

use crate::api::Result;
use crate::engine::{StackEngine, StepReport};
use crate::events::EventBus;
use crate::host::HostAdapter;

/// Interval used when automatic stepping is off; the branch is disabled, the
/// timer only has to exist.
const IDLE_INTERVAL: Duration = Duration::from_secs(3600);

/// Commands that can be sent to the step worker
pub enum Command {
    SpawnStack {
        creature: CreatureId,
        amount: u32,
        cause: SpawnCause,
        reply: oneshot::Sender<Result<StackId>>,
    },
    Damage {
        creature: CreatureId,
        context: Box<DamageContext>,
        reply: oneshot::Sender<TransactionResult>,
    },
    Step {
        reply: oneshot::Sender<StepReport>,
    },
    QueryStack {
        stack: StackId,
        reply: oneshot::Sender<Option<EntityStack>>,
    },
    StackOf {
        creature: CreatureId,
        reply: oneshot::Sender<Option<EntityStack>>,
    },
}

/// Background task that processes stack commands and drives the main step.
pub struct StepWorker<H> {
    engine: StackEngine<H>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    step_interval: Option<Duration>,
}

impl<H: HostAdapter> StepWorker<H> {
    pub fn new(
        engine: StackEngine<H>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        step_interval: Option<Duration>,
    ) -> Self {
        info!(
            target: "stacker::worker",
            interval_ms = step_interval.map(|d| d.as_millis() as u64),
            "step worker initialized"
        );
        Self {
            engine,
            command_rx,
            event_bus,
            step_interval,
        }
    }

    /// Main worker loop. Exits once every handle is dropped.
    pub async fn run(mut self) {
        let auto_step = self.step_interval.is_some();
        let mut ticker = tokio::time::interval(self.step_interval.unwrap_or(IDLE_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = ticker.tick(), if auto_step => {
                    self.engine.step();
                }
            }
            self.publish_events();
        }

        info!(
            target: "stacker::worker",
            tick = self.engine.tick(),
            stacks = self.engine.stacks().len(),
            "step worker stopped"
        );
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SpawnStack {
                creature,
                amount,
                cause,
                reply,
            } => {
                let result = self.engine.spawn_stack(creature, amount, cause);
                if reply.send(result).is_err() {
                    debug!(target: "stacker::worker", "SpawnStack reply channel closed (caller dropped)");
                }
            }
            Command::Damage {
                creature,
                context,
                reply,
            } => {
                let result = self.engine.damage(creature, &context);
                if reply.send(result).is_err() {
                    debug!(target: "stacker::worker", "Damage reply channel closed (caller dropped)");
                }
            }
            Command::Step { reply } => {
                let report = self.engine.step();
                if reply.send(report).is_err() {
                    debug!(target: "stacker::worker", "Step reply channel closed (caller dropped)");
                }
            }
            Command::QueryStack { stack, reply } => {
                if reply.send(self.engine.stack(stack).cloned()).is_err() {
                    debug!(target: "stacker::worker", "QueryStack reply channel closed (caller dropped)");
                }
            }
            Command::StackOf { creature, reply } => {
                if reply.send(self.engine.stack_of(creature).cloned()).is_err() {
                    debug!(target: "stacker::worker", "StackOf reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn publish_events(&mut self) {
        for event in self.engine.drain_events() {
            self.event_bus.publish(event);
        }
    }
}
