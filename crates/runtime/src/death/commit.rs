//! Second half of the death transaction, run on the main step.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use stack_core::loot::reconcile_drops;
use stack_core::{EntityFlag, LootOutcome, StackId};

use super::{DeathPhase, DeathSimulator, PendingDeath, StackWorld};
use crate::events::DeathEvent;
use crate::host::{DeathNotification, HostAdapter};
use crate::scheduler::StepTask;

bitflags! {
    /// Side effects a commit performed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CommitEffects: u8 {
        const NOTIFIED = 1 << 0;
        const DROPS_RELEASED = 1 << 1;
        const EXP_TO_KILLER = 1 << 2;
        const EXP_ORB = 1 << 3;
        const RAID_JOINED = 1 << 4;
        const DUPLICATE_SPAWNED = 1 << 5;
        const REMOVAL_SCHEDULED = 1 << 6;
        const BAD_OMEN = 1 << 7;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub stack: StackId,
    pub removed: u32,
    pub effects: CommitEffects,
}

impl DeathSimulator {
    /// Replays the native death for the removed units and releases their loot.
    ///
    /// Returns `None` when the stack disappeared before the commit ran; nothing
    /// is touched in that case.
    pub fn commit<H: HostAdapter>(
        &mut self,
        world: &mut StackWorld<H>,
        mut pending: PendingDeath,
        loot: LootOutcome,
    ) -> Option<CommitReport> {
        let stack_id = pending.stack.id();
        if pending.stack.resolve(&world.stacks).is_none() {
            warn!(
                target: "stacker::death",
                stack = %stack_id,
                removed = pending.removed,
                "stack vanished before commit"
            );
            world.record(DeathEvent::Abandoned {
                stack: stack_id,
                removed: pending.removed,
            });
            return None;
        }
        pending.phase = DeathPhase::Committing;

        let creature = pending.creature;
        let mut effects = CommitEffects::empty();

        world.host.apply_native_death_state(creature, true);
        let saved_health = world
            .host
            .creature(creature)
            .map(|snapshot| snapshot.health)
            .or_else(|| pending.stack.resolve(&world.stacks).map(|s| s.health()))
            .unwrap_or_default();
        world.host.set_health_directly(creature, 0.0);

        let (drops, experience) = if pending.suppressed {
            // The outer transaction owns the notification. Only experience
            // tagged on the stack drops.
            let deferred = pending
                .stack
                .resolve_mut(&mut world.stacks)
                .and_then(|stack| stack.take_pending_experience());
            (loot.drops.clone(), deferred.unwrap_or(0))
        } else {
            let outcome = world.host.raise_death_notification(DeathNotification {
                creature,
                kind: pending.kind,
                stack_amount: pending.removed,
                killer: pending.killer,
                location: pending.location,
                drops: loot.drops.clone(),
                experience: loot.experience,
            });
            effects |= CommitEffects::NOTIFIED;
            (outcome.drops, outcome.experience)
        };

        world.host.apply_native_death_state(creature, false);
        world.host.set_health_directly(creature, saved_health);
        world.host.set_fire_ticks(creature, pending.fire_ticks);
        if !pending.kind.keeps_damage_cause_on_death() {
            world.host.clear_last_damage_cause(creature);
        }

        let drops = reconcile_drops(
            &loot.drops,
            drops,
            pending.removed,
            self.config.multiply_drops,
        );
        if !drops.is_empty() {
            world.host.drop_items(pending.location, &drops);
            effects |= CommitEffects::DROPS_RELEASED;
        }

        if experience > 0 {
            let collector = pending
                .killer
                .filter(|_| self.config.auto_exp_pickup.contains(pending.kind));
            match collector {
                Some(killer) => {
                    world.host.give_experience(killer, experience);
                    if let Some(sound) = &self.config.exp_pickup_sound {
                        world.host.play_sound(killer, pending.location, sound);
                    }
                    effects |= CommitEffects::EXP_TO_KILLER;
                }
                None => {
                    world.host.spawn_experience_orb(pending.location, experience);
                    effects |= CommitEffects::EXP_ORB;
                }
            }
        }

        if let Some(killer) = pending.killer.filter(|_| pending.raid_participant) {
            if pending.patrol_leader {
                world.host.grant_bad_omen(killer);
                effects |= CommitEffects::BAD_OMEN;
            }
            world.host.attempt_join_raid(killer, creature);
            effects |= CommitEffects::RAID_JOINED;
        }

        effects |= self.finish(world, &pending);
        pending.phase = DeathPhase::Done;

        world.record(DeathEvent::Committed {
            stack: stack_id,
            removed: pending.removed,
            effects,
        });
        Some(CommitReport {
            stack: stack_id,
            removed: pending.removed,
            effects,
        })
    }

    /// Clears the transaction flag and decides what represents the stack next.
    /// Removals always happen one step later.
    fn finish<H: HostAdapter>(
        &self,
        world: &mut StackWorld<H>,
        pending: &PendingDeath,
    ) -> CommitEffects {
        let Some(stack) = pending.stack.resolve_mut(&mut world.stacks) else {
            return CommitEffects::empty();
        };
        stack.flags_mut().remove(EntityFlag::DeathTransaction);
        let (stack_id, amount, health) = (stack.id(), stack.amount(), stack.health());

        if amount == 0 {
            stack.flags_mut().insert(EntityFlag::Removed);
            world
                .scheduler
                .run_on_step(StepTask::RemoveStack(stack_id), 1);
            return CommitEffects::REMOVAL_SCHEDULED;
        }

        let replace = self.config.death_animation || (pending.suppressed && amount > 1);
        if !replace {
            return CommitEffects::empty();
        }

        let Some(duplicate) = world.host.spawn_duplicate(pending.creature) else {
            debug!(
                target: "stacker::death",
                stack = %stack_id,
                "duplicate spawn unavailable; keeping representative"
            );
            return CommitEffects::empty();
        };
        if let Err(error) = world.stacks.relink(stack_id, duplicate) {
            warn!(target: "stacker::death", stack = %stack_id, %error, "relink failed");
            world.host.remove_creature(duplicate);
            return CommitEffects::empty();
        }
        world.host.set_health_directly(duplicate, health);
        world
            .scheduler
            .run_on_step(StepTask::RemoveCreature(pending.creature), 1);
        CommitEffects::DUPLICATE_SPAWNED | CommitEffects::REMOVAL_SCHEDULED
    }
}
