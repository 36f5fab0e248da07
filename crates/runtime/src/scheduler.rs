//! Main-step task queue and the off-step worker pool.
//!
//! The step owner is the only code allowed to touch stacks or the host. Work
//! that may run elsewhere is handed to [`StepScheduler::run_off_step`]; its
//! result comes back as a [`StepTask`] that the next [`StepScheduler::advance`]
//! caller drains and executes on the step.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{trace, warn};

use stack_core::{CreatureId, LootOutcome, StackId};

use crate::death::PendingDeath;

/// Main-step counter.
pub type Tick = u64;

/// Continuation executed on the main step.
#[derive(Debug)]
pub enum StepTask {
    /// Second half of a death transaction, carrying the off-step loot.
    CommitDeath {
        pending: Box<PendingDeath>,
        loot: LootOutcome,
    },
    /// Despawns a creature that no longer represents any stack.
    RemoveCreature(CreatureId),
    /// Despawns an emptied stack's representative and forgets the stack.
    RemoveStack(StackId),
    ResetVelocity(CreatureId),
}

impl StepTask {
    pub fn name(&self) -> &'static str {
        match self {
            StepTask::CommitDeath { .. } => "commit_death",
            StepTask::RemoveCreature(_) => "remove_creature",
            StepTask::RemoveStack(_) => "remove_stack",
            StepTask::ResetVelocity(_) => "reset_velocity",
        }
    }
}

/// Where off-step jobs run.
#[derive(Clone, Debug, Default)]
pub enum OffStepMode {
    /// Evaluate immediately on the caller. The result still waits for the next
    /// step, so ordering matches the pooled mode.
    #[default]
    Inline,
    /// Evaluate on the tokio blocking pool.
    Blocking(tokio::runtime::Handle),
}

pub struct StepScheduler {
    tick: Tick,
    delayed: BTreeMap<Tick, Vec<StepTask>>,
    mode: OffStepMode,
    completed_tx: mpsc::UnboundedSender<StepTask>,
    completed_rx: mpsc::UnboundedReceiver<StepTask>,
    in_flight: usize,
}

impl StepScheduler {
    pub fn new(mode: OffStepMode) -> Self {
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        Self {
            tick: 0,
            delayed: BTreeMap::new(),
            mode,
            completed_tx,
            completed_rx,
            in_flight: 0,
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Queues `task` to run `delay` steps from now. A zero delay runs it on the
    /// next step.
    pub fn run_on_step(&mut self, task: StepTask, delay: u64) {
        let due = self.tick + delay.max(1);
        trace!(
            target: "stacker::scheduler",
            task = task.name(),
            due,
            "scheduled on-step task"
        );
        self.delayed.entry(due).or_default().push(task);
    }

    /// Runs `job` away from the main step. Its output is delivered back as a
    /// completed task.
    pub fn run_off_step<F>(&mut self, job: F)
    where
        F: FnOnce() -> StepTask + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completed_tx.clone();
        match &self.mode {
            OffStepMode::Inline => {
                // The receiver lives in `self`, so this cannot fail.
                let _ = tx.send(job());
            }
            OffStepMode::Blocking(handle) => {
                handle.spawn_blocking(move || {
                    let task = job();
                    if tx.send(task).is_err() {
                        warn!(
                            target: "stacker::scheduler",
                            "step owner dropped before off-step job completed"
                        );
                    }
                });
            }
        }
    }

    /// Advances one step and returns the tasks due, in order: delayed tasks
    /// first, then every off-step result completed so far.
    pub fn advance(&mut self) -> Vec<StepTask> {
        self.tick += 1;

        let mut due = Vec::new();
        let later = self.delayed.split_off(&(self.tick + 1));
        for (_, tasks) in std::mem::replace(&mut self.delayed, later) {
            due.extend(tasks);
        }

        while let Ok(task) = self.completed_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            due.push(task);
        }
        due
    }

    /// Off-step jobs submitted but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// True when nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.delayed.is_empty()
    }
}
