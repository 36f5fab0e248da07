//! Boundary between the stacking engine and the game host.
//!
//! Everything the death transaction does to the world goes through
//! [`HostAdapter`]. The engine calls it only from the main step, so
//! implementations never need internal locking.

mod memory;

pub use memory::{DeathObserver, HostCall, MemoryCreature, MemoryHost};

use stack_core::{CreatureId, Difficulty, EntityKind, ItemStack, Location, PlayerId};

/// Host failures for best-effort calls.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The running host version does not know this achievement.
    #[error("unsupported achievement `{0}`")]
    UnsupportedAchievement(String),

    /// The running host version does not track this statistic.
    #[error("unsupported statistic `{0}`")]
    UnsupportedStatistic(String),

    #[error("player {0} is offline")]
    PlayerOffline(PlayerId),

    #[error("host call failed: {0}")]
    Other(String),
}

/// Read-only view of a live creature, taken at the start of a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatureSnapshot {
    pub id: CreatureId,
    pub kind: EntityKind,
    pub health: f64,
    pub max_health: f64,
    pub fire_ticks: i32,
    pub location: Location,
    /// Natively dead (health reached zero or a death is being replayed).
    pub dead: bool,
    pub raid_participant: bool,
    /// Leads a raid patrol; its killer receives the bad omen.
    pub patrol_leader: bool,
}

/// Payload of the host's native death notification.
///
/// `stack_amount` is the amount observers see for the dying stack: the units
/// removed by this transaction, never the transient remainder.
#[derive(Clone, Debug, PartialEq)]
pub struct DeathNotification {
    pub creature: CreatureId,
    pub kind: EntityKind,
    pub stack_amount: u32,
    pub killer: Option<PlayerId>,
    pub location: Location,
    pub drops: Vec<ItemStack>,
    pub experience: u32,
}

/// Drops and experience after every observer had its say.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeathOutcome {
    pub drops: Vec<ItemStack>,
    pub experience: u32,
}

/// Named progress milestones granted to killers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Achievement {
    /// First kill. The host decides which victims qualify.
    KillAMob,
    /// One criterion of the "kill every monster kind" milestone.
    KillAllMobs { kind: EntityKind },
    /// Kill from at least 50 blocks away.
    SniperDuel,
}

impl Achievement {
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::KillAMob => "adventure/kill_a_mob",
            Achievement::KillAllMobs { .. } => "adventure/kill_all_mobs",
            Achievement::SniperDuel => "adventure/sniper_duel",
        }
    }

    /// Criterion name inside the achievement, when it has several.
    pub fn criterion(&self) -> Option<&str> {
        match self {
            Achievement::KillAllMobs { kind } => Some(kind.as_ref()),
            _ => None,
        }
    }
}

/// Kill counters incremented per removed unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Statistic {
    MobKills,
    KillEntity(EntityKind),
}

/// Game host operations used by the death transaction.
///
/// Spawning methods return `None` when the host cannot perform them; the engine
/// treats that as "feature unavailable" and falls back.
pub trait HostAdapter {
    fn creature(&self, id: CreatureId) -> Option<CreatureSnapshot>;

    fn difficulty(&self) -> Difficulty;

    /// Forces the native dead/alive state without running native death logic.
    fn apply_native_death_state(&mut self, id: CreatureId, dead: bool);

    fn set_health_directly(&mut self, id: CreatureId, value: f64);

    fn set_fire_ticks(&mut self, id: CreatureId, ticks: i32);

    fn set_no_damage_ticks(&mut self, id: CreatureId, ticks: u32);

    fn reset_velocity(&mut self, id: CreatureId);

    fn clear_last_damage_cause(&mut self, id: CreatureId);

    /// Lets an undying-style item absorb the hit. Returns true if it did.
    fn handle_defensive_item(&mut self, id: CreatureId) -> bool;

    fn spawn_transformed_creature(&mut self, id: CreatureId, into: EntityKind) -> Option<CreatureId>;

    /// Spawns a copy of `id` to stand in for the rest of its stack.
    fn spawn_duplicate(&mut self, id: CreatureId) -> Option<CreatureId>;

    fn remove_creature(&mut self, id: CreatureId);

    /// Raises the native death notification and returns the observers' final
    /// drops and experience.
    fn raise_death_notification(&mut self, notification: DeathNotification) -> DeathOutcome;

    fn drop_items(&mut self, at: Location, items: &[ItemStack]);

    fn give_experience(&mut self, player: PlayerId, amount: u32);

    fn spawn_experience_orb(&mut self, at: Location, amount: u32);

    fn attempt_join_raid(&mut self, killer: PlayerId, id: CreatureId);

    /// Applies the raid omen effect for killing a patrol leader.
    fn grant_bad_omen(&mut self, killer: PlayerId);

    fn play_sound(&mut self, player: PlayerId, at: Location, sound: &str);

    /// Wears the item `player` holds by `amount` durability points. The host
    /// breaks the item once it is worn out.
    fn damage_tool(&mut self, player: PlayerId, amount: u32);

    /// Creatures around `victim` caught by the killer's sweeping strike,
    /// excluding `victim` itself.
    fn sweep_targets(&mut self, killer: PlayerId, victim: CreatureId) -> Vec<CreatureId>;

    /// Applies damage natively, the way an uncancelled hit would.
    fn apply_damage(&mut self, id: CreatureId, amount: f64);

    fn grant_achievement(&mut self, killer: PlayerId, achievement: Achievement)
    -> Result<(), HostError>;

    fn increment_statistic(
        &mut self,
        killer: PlayerId,
        statistic: Statistic,
        amount: u32,
    ) -> Result<(), HostError>;
}
