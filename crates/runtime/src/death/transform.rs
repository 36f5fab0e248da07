//! Kind transformation in place of a death.

use rand::Rng;
use tracing::{debug, warn};

use stack_core::transform::{should_transform, transformation_for};
use stack_core::{
    DamageContext, EntityFlag, SpawnCause, StackRef, TransactionOutcome, TransactionResult,
};

use super::{DeathSimulator, StackWorld};
use crate::events::LifecycleEvent;
use crate::host::{CreatureSnapshot, HostAdapter};
use crate::scheduler::StepTask;

impl DeathSimulator {
    /// Turns the dying units into another kind when a rule fires.
    ///
    /// Returns `None` to continue with a normal death: no rule matched, the
    /// roll failed, or the host could not spawn or stack the new creature.
    /// The original stack is only touched once the new one is registered.
    pub(super) fn try_transform<H: HostAdapter>(
        &mut self,
        world: &mut StackWorld<H>,
        stack_ref: StackRef,
        creature: &CreatureSnapshot,
        ctx: &DamageContext,
    ) -> Option<TransactionResult> {
        let rule = transformation_for(
            creature.kind,
            ctx.cause,
            ctx.attacker.as_ref().map(|attacker| attacker.kind),
        )?;
        let roll = self.rng.gen_range(0.0..1.0);
        if !should_transform(rule, world.host.difficulty(), self.config.transform.force, roll) {
            return None;
        }
        let amount = stack_ref.resolve(&world.stacks)?.amount();
        let moved = if self.config.transform.split_one {
            amount.min(1)
        } else {
            amount
        };

        let Some(spawned) = world.host.spawn_transformed_creature(creature.id, rule.into) else {
            debug!(
                target: "stacker::death",
                stack = %stack_ref.id(),
                into = %rule.into,
                "host cannot transform; falling back to death"
            );
            return None;
        };
        let spawned_health = world
            .host
            .creature(spawned)
            .map_or(creature.max_health, |snapshot| snapshot.health);

        let into = match world.stacks.insert(
            rule.into,
            spawned,
            moved,
            spawned_health,
            SpawnCause::Transformation,
        ) {
            Ok(into) => into,
            Err(error) => {
                warn!(
                    target: "stacker::death",
                    stack = %stack_ref.id(),
                    %error,
                    "transformed creature cannot be stacked; falling back to death"
                );
                world.host.remove_creature(spawned);
                return None;
            }
        };

        let stack = stack_ref.resolve_mut(&mut world.stacks)?;
        if self.config.transform.split_one {
            stack.unstack(moved, ctx.killer());
        } else {
            stack.set_amount(0);
        }
        if stack.amount() == 0 {
            stack.flags_mut().insert(EntityFlag::Removed);
            world
                .scheduler
                .run_on_step(StepTask::RemoveStack(stack_ref.id()), 1);
        }

        world.record(LifecycleEvent::Transformed {
            from: stack_ref.id(),
            into,
            kind: rule.into,
            amount: moved,
        });
        Some(TransactionResult::handled(
            ctx.final_damage,
            TransactionOutcome::Transformed,
        ))
    }
}
