//! The stacked death transaction.
//!
//! A lethal hit on a stack runs in two halves. [`DeathSimulator::simulate_death`]
//! runs on the main step: it gates the hit, applies the spread outcome,
//! removes units, and hands a loot request to the off-step pool. The pool's
//! result comes back as [`StepTask::CommitDeath`] and
//! [`DeathSimulator::commit`] finishes the transaction on a later step.
//!
//! Between the halves the stack carries [`EntityFlag::DeathTransaction`];
//! further hits on it are rejected until the commit clears the flag.

mod commit;
mod phase;
mod transform;

pub use commit::{CommitEffects, CommitReport};
pub use phase::{DeathPhase, PendingDeath};

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use stack_core::damage::spread;
use stack_core::{
    CreatureId, DamageCause, DamageContext, EntityFlag, GateRejection, LootOutcome, LootRequest,
    PlayerId, SpreadInput, StackConfig, StackId, StackRef, StackRegistry, TransactionOutcome,
    TransactionResult, UnstackResult,
};

use crate::events::{DeathEvent, Event};
use crate::host::HostAdapter;
use crate::loot::LootProvider;
use crate::scheduler::{OffStepMode, StepScheduler, StepTask};
use crate::stats;

/// State owned by the main step: every stack, the host, and the task queue.
pub struct StackWorld<H> {
    pub stacks: StackRegistry,
    pub host: H,
    pub scheduler: StepScheduler,
    events: Vec<Event>,
}

impl<H> StackWorld<H> {
    pub fn new(host: H, mode: OffStepMode) -> Self {
        Self {
            stacks: StackRegistry::new(),
            host,
            scheduler: StepScheduler::new(mode),
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, event: impl Into<Event>) {
        self.events.push(event.into());
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// Runs death transactions against a [`StackWorld`].
pub struct DeathSimulator {
    config: Arc<StackConfig>,
    loot: Arc<dyn LootProvider>,
    rng: StdRng,
}

impl DeathSimulator {
    pub fn new(config: StackConfig, loot: Arc<dyn LootProvider>) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config: Arc::new(config),
            loot,
            rng,
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Handles a damage notification for `stack_id`.
    ///
    /// A rejected result means nothing was mutated and the host applies the
    /// damage natively. Any other result has `cancel_event` set: the health
    /// change is already applied.
    pub fn simulate_death<H: HostAdapter>(
        &mut self,
        world: &mut StackWorld<H>,
        stack_id: StackId,
        ctx: &DamageContext,
    ) -> TransactionResult {
        let final_damage = ctx.final_damage;
        let stack_ref = StackRef::new(stack_id);
        trace_phase(stack_id, DeathPhase::Entered);

        let Some(stack) = stack_ref.resolve(&world.stacks) else {
            return reject(stack_id, GateRejection::CreatureGone, final_damage);
        };
        let (kind, amount, representative) = (stack.kind(), stack.amount(), stack.representative());
        let in_transaction = stack.in_death_transaction();

        let Some(creature) = world
            .host
            .creature(representative)
            .filter(|creature| !creature.dead && amount > 0)
        else {
            return reject(stack_id, GateRejection::CreatureGone, final_damage);
        };

        if self.config.stacking_disabled(kind, amount) {
            return reject(stack_id, GateRejection::StackingDisabled, final_damage);
        }

        let instant_kill = self.config.is_instant_kill(ctx.cause, ctx.creative_damager);
        if !instant_kill && final_damage < creature.health {
            return reject(stack_id, GateRejection::NotLethal, final_damage);
        }

        // Nothing survives the void, totem or not.
        if ctx.cause != DamageCause::Void && world.host.handle_defensive_item(representative) {
            debug!(
                target: "stacker::death",
                stack = %stack_id,
                "defensive item absorbed lethal hit"
            );
            return TransactionResult::defensive_item();
        }

        if in_transaction {
            return reject(stack_id, GateRejection::InTransaction, final_damage);
        }

        let outcome = spread::calculate(SpreadInput {
            final_damage,
            stack_amount: amount,
            max_health: creature.max_health,
            current_health: creature.health,
            instant_kill,
            spread_damage: self.config.spread_damage,
            default_unstack: self.config.default_unstack,
            sweeping_level: ctx.sweeping_level(),
        });
        debug_assert!(
            outcome.units_to_kill <= amount,
            "spread outcome kills more units than the stack holds"
        );

        let health = outcome.remaining_health(creature.max_health);
        world.host.set_health_directly(representative, health);
        if let Some(stack) = stack_ref.resolve_mut(&mut world.stacks) {
            stack.set_health(health);
        }
        if self.config.fast_kill {
            world.host.set_no_damage_ticks(representative, 0);
            world
                .scheduler
                .run_on_step(StepTask::ResetVelocity(representative), 1);
        }
        trace_phase(stack_id, DeathPhase::HealthApplied);

        if let Some(result) = self.try_transform(world, stack_ref, &creature, ctx) {
            trace_phase(stack_id, DeathPhase::Done);
            return result;
        }

        let Some(stack) = stack_ref.resolve_mut(&mut world.stacks) else {
            return TransactionResult::handled(final_damage, TransactionOutcome::NoKill);
        };
        let (before, after) = match stack.unstack(outcome.units_to_kill, ctx.killer()) {
            UnstackResult::Success { before, after, .. } => (before, after),
            other => {
                debug!(
                    target: "stacker::death",
                    stack = %stack_id,
                    result = ?other,
                    "unstack removed nothing"
                );
                trace_phase(stack_id, DeathPhase::Done);
                return TransactionResult::handled(final_damage, TransactionOutcome::NoKill);
            }
        };
        stack.flags_mut().insert(EntityFlag::DeathTransaction);
        let removed = before - after;
        trace_phase(stack_id, DeathPhase::Unstacked);

        world.record(DeathEvent::Unstacked {
            stack: stack_id,
            removed,
            remaining: after,
            killer: ctx.killer(),
        });

        let mut fire_ticks = creature.fire_ticks;
        if self.config.keep_fire && fire_ticks > -1 {
            fire_ticks = StackConfig::KEEP_FIRE_TICKS;
            world.host.set_fire_ticks(representative, fire_ticks);
        }

        let distance_squared = ctx
            .attacker
            .as_ref()
            .map_or(0.0, |a| a.location.distance_squared(&creature.location));
        stats::dispatch_for(&mut world.host, ctx.killer(), kind, removed, distance_squared);

        // The stacked kill cancels the native hit, so the native sweep and
        // tool wear never run. Both are replayed here.
        if let (Some(killer), Some(weapon)) = (ctx.killer(), ctx.weapon) {
            if !ctx.sweep {
                let hit = ctx.sweep_hit(weapon.sweep_damage(ctx.raw_damage));
                self.sweep(world, killer, representative, hit);
            }
            if !ctx.creative_damager {
                let wear = weapon.wear(|bound| self.rng.gen_range(0..bound));
                if wear > 0 {
                    world.host.damage_tool(killer, wear);
                }
            }
        }

        let pending = Box::new(PendingDeath {
            stack: stack_ref,
            creature: representative,
            kind,
            removed,
            killer: ctx.killer(),
            location: creature.location,
            suppressed: ctx.is_suppressed(representative),
            fire_ticks,
            raid_participant: creature.raid_participant,
            patrol_leader: creature.patrol_leader,
            phase: DeathPhase::DeferredLootPending,
        });
        let request = LootRequest {
            kind,
            drop_amount: if self.config.multiply_drops { removed } else { 1 },
            exp_amount: if self.config.multiply_exp { removed } else { 1 },
            looting_level: ctx.looting_level(),
        };
        let provider = Arc::clone(&self.loot);
        world.scheduler.run_off_step(move || {
            let loot = provider.roll(&request).unwrap_or_else(|error| {
                warn!(
                    target: "stacker::death",
                    kind = %request.kind,
                    %error,
                    "loot evaluation failed; committing without loot"
                );
                LootOutcome::empty()
            });
            StepTask::CommitDeath { pending, loot }
        });
        trace_phase(stack_id, DeathPhase::DeferredLootPending);

        TransactionResult::handled(final_damage, TransactionOutcome::Unstacked { removed })
    }

    /// Delivers a sweeping strike to the creatures around `victim`. Stacked
    /// bystanders run their own transaction; anything it leaves to the host
    /// is applied natively.
    fn sweep<H: HostAdapter>(
        &mut self,
        world: &mut StackWorld<H>,
        killer: PlayerId,
        victim: CreatureId,
        hit: DamageContext,
    ) {
        for target in world.host.sweep_targets(killer, victim) {
            let damage = match world.stacks.by_creature(target) {
                Some(stack) => {
                    let result = self.simulate_death(world, stack, &hit);
                    if result.cancel_event {
                        continue;
                    }
                    result.event_damage
                }
                None => hit.final_damage,
            };
            if damage > 0.0 {
                world.host.apply_damage(target, damage);
            }
        }
    }
}

fn reject(stack: StackId, reason: GateRejection, final_damage: f64) -> TransactionResult {
    debug!(
        target: "stacker::death",
        %stack,
        reason = reason.as_ref(),
        "stacked death skipped"
    );
    TransactionResult::rejected(reason, final_damage)
}

fn trace_phase(stack: StackId, phase: DeathPhase) {
    trace!(target: "stacker::death", %stack, phase = phase.as_ref(), "death phase");
}
