use crate::flags::{EntityFlag, FlagSet};

use super::{CreatureId, EntityKind, StackId};

/// How the stack's first unit entered the world.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SpawnCause {
    #[default]
    Natural,
    Spawner,
    SpawnEgg,
    Breeding,
    Transformation,
    Command,
}

/// One logical stack of identical creatures.
///
/// `amount` is the single source of truth for how many units the stack
/// represents. `health` is the remaining vitality of the next unit to die; the
/// representative creature's native health mirrors it.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityStack {
    id: StackId,
    kind: EntityKind,
    amount: u32,
    health: f64,
    flags: FlagSet<EntityFlag>,
    spawn_cause: SpawnCause,
    representative: CreatureId,
    pending_experience: u32,
}

impl EntityStack {
    pub fn new(
        id: StackId,
        kind: EntityKind,
        representative: CreatureId,
        amount: u32,
        health: f64,
        spawn_cause: SpawnCause,
    ) -> Self {
        Self {
            id,
            kind,
            amount,
            health,
            flags: FlagSet::new(),
            spawn_cause,
            representative,
            pending_experience: 0,
        }
    }

    pub fn id(&self) -> StackId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn spawn_cause(&self) -> SpawnCause {
        self.spawn_cause
    }

    pub fn representative(&self) -> CreatureId {
        self.representative
    }

    pub fn flags(&self) -> &FlagSet<EntityFlag> {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut FlagSet<EntityFlag> {
        &mut self.flags
    }

    pub fn has_flag(&self, flag: EntityFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Returns true while a death transaction is between unstack and commit.
    pub fn in_death_transaction(&self) -> bool {
        self.flags.contains(EntityFlag::DeathTransaction)
    }

    pub fn set_health(&mut self, health: f64) {
        self.health = health;
    }

    /// Overwrites the amount. Used by merges and transformations; damage goes
    /// through [`EntityStack::unstack`].
    pub fn set_amount(&mut self, amount: u32) {
        self.amount = amount;
    }

    /// Adds `amount` units, saturating.
    pub fn increase(&mut self, amount: u32) {
        self.amount = self.amount.saturating_add(amount);
    }

    /// Only the registry may swap the representative, so its creature index
    /// never goes stale.
    pub(crate) fn set_representative(&mut self, creature: CreatureId) {
        self.representative = creature;
    }

    /// Records experience owed by a death whose native notification was
    /// suppressed, to be released by the next suppressed commit.
    pub fn defer_experience(&mut self, experience: u32) {
        self.pending_experience = self.pending_experience.saturating_add(experience);
        self.flags.insert(EntityFlag::PendingExperience);
    }

    /// Consumes the pending-experience marker.
    ///
    /// Returns `None` when no marker is set, otherwise the deferred amount
    /// (possibly zero).
    pub fn take_pending_experience(&mut self) -> Option<u32> {
        if !self.flags.remove(EntityFlag::PendingExperience) {
            return None;
        }
        Some(std::mem::take(&mut self.pending_experience))
    }
}
