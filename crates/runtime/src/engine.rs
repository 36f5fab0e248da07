//! Synchronous main-step engine.
//!
//! [`StackEngine`] owns the world and the death simulator. Everything it does
//! runs on the caller's thread; embedders call [`StackEngine::step`] once per
//! host tick. The async [`crate::Runtime`] drives one from a worker task.

use std::sync::Arc;

use tracing::{debug, trace};

use stack_core::{
    CreatureId, DamageContext, EntityFlag, EntityStack, GateRejection, SpawnCause, StackConfig,
    StackId, StackRegistry, TransactionResult,
};

use crate::api::{Result, RuntimeError};
use crate::death::{CommitReport, DeathSimulator, StackWorld};
use crate::events::{Event, LifecycleEvent};
use crate::host::HostAdapter;
use crate::loot::LootProvider;
use crate::scheduler::{OffStepMode, StepTask, Tick};

/// What one [`StackEngine::step`] did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepReport {
    pub tick: Tick,
    pub tasks_run: usize,
    pub commits: Vec<CommitReport>,
}

pub struct StackEngine<H> {
    world: StackWorld<H>,
    simulator: DeathSimulator,
}

impl<H: HostAdapter> StackEngine<H> {
    pub fn new(
        host: H,
        config: StackConfig,
        loot: Arc<dyn LootProvider>,
        mode: OffStepMode,
    ) -> Self {
        Self {
            world: StackWorld::new(host, mode),
            simulator: DeathSimulator::new(config, loot),
        }
    }

    /// Registers `creature` as the representative of a new stack of `amount`.
    pub fn spawn_stack(
        &mut self,
        creature: CreatureId,
        amount: u32,
        cause: SpawnCause,
    ) -> Result<StackId> {
        let snapshot = self
            .world
            .host
            .creature(creature)
            .ok_or(RuntimeError::UnknownCreature(creature))?;
        let id = self
            .world
            .stacks
            .insert(snapshot.kind, creature, amount, snapshot.health, cause)?;
        self.world.record(LifecycleEvent::Spawned {
            stack: id,
            kind: snapshot.kind,
            amount,
        });
        Ok(id)
    }

    /// Damage notification for a creature. Creatures that do not represent a
    /// stack are left to the host.
    pub fn damage(&mut self, creature: CreatureId, ctx: &DamageContext) -> TransactionResult {
        match self.world.stacks.by_creature(creature) {
            Some(stack) => self.damage_stack(stack, ctx),
            None => TransactionResult::rejected(GateRejection::CreatureGone, ctx.final_damage),
        }
    }

    pub fn damage_stack(&mut self, stack: StackId, ctx: &DamageContext) -> TransactionResult {
        self.simulator.simulate_death(&mut self.world, stack, ctx)
    }

    /// Records experience owed by a suppressed death, released by the next
    /// suppressed commit on this stack.
    pub fn defer_experience(&mut self, stack: StackId, experience: u32) -> Result<()> {
        let stack = self
            .world
            .stacks
            .get_mut(stack)
            .ok_or(RuntimeError::UnknownStack(stack))?;
        stack.defer_experience(experience);
        Ok(())
    }

    /// Advances one main step: runs due delayed tasks, then commits every
    /// off-step result that has arrived.
    pub fn step(&mut self) -> StepReport {
        let tasks = self.world.scheduler.advance();
        let mut report = StepReport {
            tick: self.world.scheduler.tick(),
            tasks_run: tasks.len(),
            commits: Vec::new(),
        };
        for task in tasks {
            if let Some(commit) = self.run_task(task) {
                report.commits.push(commit);
            }
        }
        if report.tasks_run > 0 {
            trace!(
                target: "stacker::scheduler",
                tick = report.tick,
                tasks = report.tasks_run,
                "step ran tasks"
            );
        }
        report
    }

    /// Steps until nothing is queued or in flight, up to `max_steps`.
    pub fn run_until_idle(&mut self, max_steps: usize) -> Vec<StepReport> {
        let mut reports = Vec::new();
        while !self.is_idle() && reports.len() < max_steps {
            reports.push(self.step());
        }
        reports
    }

    fn run_task(&mut self, task: StepTask) -> Option<CommitReport> {
        match task {
            StepTask::CommitDeath { pending, loot } => {
                self.simulator.commit(&mut self.world, *pending, loot)
            }
            StepTask::ResetVelocity(creature) => {
                if self.world.host.creature(creature).is_some() {
                    self.world.host.reset_velocity(creature);
                }
                None
            }
            StepTask::RemoveCreature(creature) => {
                if self.world.stacks.by_creature(creature).is_some() {
                    debug!(
                        target: "stacker::scheduler",
                        %creature,
                        "creature represents a stack again; not removing"
                    );
                } else {
                    self.world.host.remove_creature(creature);
                }
                None
            }
            StepTask::RemoveStack(stack) => {
                self.remove_stack(stack);
                None
            }
        }
    }

    fn remove_stack(&mut self, id: StackId) {
        let Some(stack) = self.world.stacks.get(id) else {
            return;
        };
        if !stack.has_flag(EntityFlag::Removed) || stack.in_death_transaction() {
            return;
        }
        let representative = stack.representative();
        self.world.stacks.remove(id);
        self.world.host.remove_creature(representative);
        self.world.record(LifecycleEvent::Removed { stack: id });
    }

    pub fn stack(&self, id: StackId) -> Option<&EntityStack> {
        self.world.stacks.get(id)
    }

    pub fn stack_of(&self, creature: CreatureId) -> Option<&EntityStack> {
        self.world
            .stacks
            .by_creature(creature)
            .and_then(|id| self.world.stacks.get(id))
    }

    pub fn stacks(&self) -> &StackRegistry {
        &self.world.stacks
    }

    pub fn host(&self) -> &H {
        &self.world.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.world.host
    }

    pub fn config(&self) -> &StackConfig {
        self.simulator.config()
    }

    pub fn tick(&self) -> Tick {
        self.world.scheduler.tick()
    }

    pub fn is_idle(&self) -> bool {
        self.world.scheduler.is_idle()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.world.drain_events()
    }
}
