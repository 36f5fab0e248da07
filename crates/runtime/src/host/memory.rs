//! In-memory host for tests and the demo binary.

use std::collections::{HashMap, HashSet};

use stack_core::{CreatureId, Difficulty, EntityKind, ItemStack, Location, PlayerId};

use super::{
    Achievement, CreatureSnapshot, DeathNotification, DeathOutcome, HostAdapter, HostError,
    Statistic,
};

/// Observer invoked for every raised death notification. It may rewrite the
/// outcome, like a plugin listening to the native event.
pub type DeathObserver = Box<dyn FnMut(&DeathNotification, &mut DeathOutcome) + Send>;

/// Mutable state of one simulated creature.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryCreature {
    pub kind: EntityKind,
    pub health: f64,
    pub max_health: f64,
    pub fire_ticks: i32,
    pub no_damage_ticks: u32,
    pub location: Location,
    pub dead: bool,
    pub raid_participant: bool,
    pub patrol_leader: bool,
    /// The next hit is absorbed by an undying-style item.
    pub defensive_item: bool,
    pub damage_cause_cleared: bool,
}

impl MemoryCreature {
    pub fn new(kind: EntityKind, max_health: f64) -> Self {
        Self {
            kind,
            health: max_health,
            max_health,
            fire_ticks: 0,
            no_damage_ticks: 0,
            location: Location::ORIGIN,
            dead: false,
            raid_participant: kind.is_raider(),
            patrol_leader: false,
            defensive_item: false,
            damage_cause_cleared: false,
        }
    }
}

/// Every adapter call, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    NativeDeathState { id: CreatureId, dead: bool },
    SetHealth { id: CreatureId, value: f64 },
    SetFireTicks { id: CreatureId, ticks: i32 },
    SetNoDamageTicks { id: CreatureId, ticks: u32 },
    ResetVelocity(CreatureId),
    ClearDamageCause(CreatureId),
    DefensiveItem { id: CreatureId, used: bool },
    SpawnTransformed { from: CreatureId, into: EntityKind, spawned: Option<CreatureId> },
    SpawnDuplicate { from: CreatureId, spawned: Option<CreatureId> },
    Remove(CreatureId),
    DeathNotification { creature: CreatureId, stack_amount: u32 },
    DropItems { at: Location, items: Vec<ItemStack> },
    GiveExperience { player: PlayerId, amount: u32 },
    ExperienceOrb { at: Location, amount: u32 },
    JoinRaid { killer: PlayerId, id: CreatureId },
    BadOmen(PlayerId),
    PlaySound { player: PlayerId, sound: String },
    DamageTool { player: PlayerId, amount: u32 },
    Sweep { killer: PlayerId, victim: CreatureId },
    ApplyDamage { id: CreatureId, amount: f64 },
    Achievement { killer: PlayerId, achievement: Achievement, granted: bool },
    Statistic { killer: PlayerId, statistic: Statistic, amount: u32 },
}

/// Host backed by plain maps. Records every call in [`MemoryHost::calls`].
pub struct MemoryHost {
    creatures: HashMap<CreatureId, MemoryCreature>,
    next_id: u64,
    difficulty: Difficulty,
    observers: Vec<DeathObserver>,
    unsupported_achievements: HashSet<&'static str>,
    spawning_disabled: bool,
    sweep_targets: Vec<CreatureId>,
    statistics: HashMap<(PlayerId, Statistic), u32>,
    achievements: HashSet<(PlayerId, Achievement)>,
    calls: Vec<HostCall>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            creatures: HashMap::new(),
            next_id: 0,
            difficulty: Difficulty::Normal,
            observers: Vec::new(),
            unsupported_achievements: HashSet::new(),
            spawning_disabled: false,
            sweep_targets: Vec::new(),
            statistics: HashMap::new(),
            achievements: HashSet::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Adds a creature at full health.
    pub fn spawn(&mut self, kind: EntityKind, max_health: f64) -> CreatureId {
        self.insert(MemoryCreature::new(kind, max_health))
    }

    pub fn insert(&mut self, creature: MemoryCreature) -> CreatureId {
        self.next_id += 1;
        let id = CreatureId(self.next_id);
        self.creatures.insert(id, creature);
        id
    }

    pub fn get(&self, id: CreatureId) -> Option<&MemoryCreature> {
        self.creatures.get(&id)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut MemoryCreature> {
        self.creatures.get_mut(&id)
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.creatures.contains_key(&id)
    }

    pub fn add_observer(
        &mut self,
        observer: impl FnMut(&DeathNotification, &mut DeathOutcome) + Send + 'static,
    ) {
        self.observers.push(Box::new(observer));
    }

    /// Makes [`HostAdapter::grant_achievement`] fail for `id`.
    pub fn reject_achievement(&mut self, id: &'static str) {
        self.unsupported_achievements.insert(id);
    }

    /// Makes every spawn request return `None`.
    pub fn disable_spawning(&mut self) {
        self.spawning_disabled = true;
    }

    /// Creatures every sweeping strike reaches.
    pub fn set_sweep_targets(&mut self, targets: Vec<CreatureId>) {
        self.sweep_targets = targets;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count_calls(&self, matches: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    pub fn notifications(&self) -> usize {
        self.count_calls(|call| matches!(call, HostCall::DeathNotification { .. }))
    }

    /// Every item released into the world, in order.
    pub fn dropped_items(&self) -> Vec<ItemStack> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::DropItems { items, .. } => Some(items.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn experience_given(&self, player: PlayerId) -> u32 {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::GiveExperience { player: p, amount } if *p == player => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn experience_orbs(&self) -> u32 {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::ExperienceOrb { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn statistic(&self, player: PlayerId, statistic: Statistic) -> u32 {
        self.statistics
            .get(&(player, statistic))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_achievement(&self, player: PlayerId, achievement: Achievement) -> bool {
        self.achievements.contains(&(player, achievement))
    }

    fn spawn_like(&mut self, from: CreatureId, kind: Option<EntityKind>) -> Option<CreatureId> {
        if self.spawning_disabled {
            return None;
        }
        let mut creature = self.creatures.get(&from)?.clone();
        if let Some(kind) = kind {
            creature.kind = kind;
            creature.health = creature.max_health;
        }
        creature.dead = false;
        creature.fire_ticks = 0;
        creature.damage_cause_cleared = false;
        Some(self.insert(creature))
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for MemoryHost {
    fn creature(&self, id: CreatureId) -> Option<CreatureSnapshot> {
        self.creatures.get(&id).map(|c| CreatureSnapshot {
            id,
            kind: c.kind,
            health: c.health,
            max_health: c.max_health,
            fire_ticks: c.fire_ticks,
            location: c.location,
            dead: c.dead,
            raid_participant: c.raid_participant,
            patrol_leader: c.patrol_leader,
        })
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn apply_native_death_state(&mut self, id: CreatureId, dead: bool) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.dead = dead;
        }
        self.calls.push(HostCall::NativeDeathState { id, dead });
    }

    fn set_health_directly(&mut self, id: CreatureId, value: f64) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.health = value;
        }
        self.calls.push(HostCall::SetHealth { id, value });
    }

    fn set_fire_ticks(&mut self, id: CreatureId, ticks: i32) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.fire_ticks = ticks;
        }
        self.calls.push(HostCall::SetFireTicks { id, ticks });
    }

    fn set_no_damage_ticks(&mut self, id: CreatureId, ticks: u32) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.no_damage_ticks = ticks;
        }
        self.calls.push(HostCall::SetNoDamageTicks { id, ticks });
    }

    fn reset_velocity(&mut self, id: CreatureId) {
        self.calls.push(HostCall::ResetVelocity(id));
    }

    fn clear_last_damage_cause(&mut self, id: CreatureId) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.damage_cause_cleared = true;
        }
        self.calls.push(HostCall::ClearDamageCause(id));
    }

    fn handle_defensive_item(&mut self, id: CreatureId) -> bool {
        let used = match self.creatures.get_mut(&id) {
            Some(creature) if creature.defensive_item => {
                creature.defensive_item = false;
                creature.health = 1.0;
                true
            }
            _ => false,
        };
        self.calls.push(HostCall::DefensiveItem { id, used });
        used
    }

    fn spawn_transformed_creature(&mut self, id: CreatureId, into: EntityKind) -> Option<CreatureId> {
        let spawned = self.spawn_like(id, Some(into));
        self.calls.push(HostCall::SpawnTransformed {
            from: id,
            into,
            spawned,
        });
        spawned
    }

    fn spawn_duplicate(&mut self, id: CreatureId) -> Option<CreatureId> {
        let spawned = self.spawn_like(id, None);
        self.calls.push(HostCall::SpawnDuplicate { from: id, spawned });
        spawned
    }

    fn remove_creature(&mut self, id: CreatureId) {
        self.creatures.remove(&id);
        self.calls.push(HostCall::Remove(id));
    }

    fn raise_death_notification(&mut self, notification: DeathNotification) -> DeathOutcome {
        self.calls.push(HostCall::DeathNotification {
            creature: notification.creature,
            stack_amount: notification.stack_amount,
        });
        let mut outcome = DeathOutcome {
            drops: notification.drops.clone(),
            experience: notification.experience,
        };
        for observer in self.observers.iter_mut() {
            observer(&notification, &mut outcome);
        }
        outcome
    }

    fn drop_items(&mut self, at: Location, items: &[ItemStack]) {
        self.calls.push(HostCall::DropItems {
            at,
            items: items.to_vec(),
        });
    }

    fn give_experience(&mut self, player: PlayerId, amount: u32) {
        self.calls.push(HostCall::GiveExperience { player, amount });
    }

    fn spawn_experience_orb(&mut self, at: Location, amount: u32) {
        self.calls.push(HostCall::ExperienceOrb { at, amount });
    }

    fn attempt_join_raid(&mut self, killer: PlayerId, id: CreatureId) {
        self.calls.push(HostCall::JoinRaid { killer, id });
    }

    fn grant_bad_omen(&mut self, killer: PlayerId) {
        self.calls.push(HostCall::BadOmen(killer));
    }

    fn play_sound(&mut self, player: PlayerId, _at: Location, sound: &str) {
        self.calls.push(HostCall::PlaySound {
            player,
            sound: sound.to_string(),
        });
    }

    fn damage_tool(&mut self, player: PlayerId, amount: u32) {
        self.calls.push(HostCall::DamageTool { player, amount });
    }

    fn sweep_targets(&mut self, killer: PlayerId, victim: CreatureId) -> Vec<CreatureId> {
        self.calls.push(HostCall::Sweep { killer, victim });
        self.sweep_targets
            .iter()
            .copied()
            .filter(|id| *id != victim && self.creatures.contains_key(id))
            .collect()
    }

    fn apply_damage(&mut self, id: CreatureId, amount: f64) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.health = (creature.health - amount).max(0.0);
            creature.dead = creature.health <= 0.0;
        }
        self.calls.push(HostCall::ApplyDamage { id, amount });
    }

    fn grant_achievement(
        &mut self,
        killer: PlayerId,
        achievement: Achievement,
    ) -> Result<(), HostError> {
        let granted = !self.unsupported_achievements.contains(achievement.id());
        self.calls.push(HostCall::Achievement {
            killer,
            achievement,
            granted,
        });
        if !granted {
            return Err(HostError::UnsupportedAchievement(achievement.id().to_string()));
        }
        self.achievements.insert((killer, achievement));
        Ok(())
    }

    fn increment_statistic(
        &mut self,
        killer: PlayerId,
        statistic: Statistic,
        amount: u32,
    ) -> Result<(), HostError> {
        self.calls.push(HostCall::Statistic {
            killer,
            statistic,
            amount,
        });
        *self.statistics.entry((killer, statistic)).or_insert(0) += amount;
        Ok(())
    }
}
