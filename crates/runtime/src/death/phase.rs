use stack_core::{CreatureId, EntityKind, Location, PlayerId, StackRef};

/// Progress of one death transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DeathPhase {
    /// Gates are being evaluated.
    Entered,
    /// The spread outcome was written to the representative.
    HealthApplied,
    /// Units were removed and the transaction flag is set.
    Unstacked,
    /// Loot is being computed off the main step.
    DeferredLootPending,
    Committing,
    Done,
}

/// Everything the commit needs, captured when the units were removed.
///
/// The stack is held by reference and re-resolved at commit time; it may be
/// gone by then.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDeath {
    pub stack: StackRef,
    pub creature: CreatureId,
    pub kind: EntityKind,
    pub removed: u32,
    pub killer: Option<PlayerId>,
    pub location: Location,
    /// The representative's native death notification must not be raised.
    pub suppressed: bool,
    pub fire_ticks: i32,
    pub raid_participant: bool,
    pub patrol_leader: bool,
    pub phase: DeathPhase,
}
