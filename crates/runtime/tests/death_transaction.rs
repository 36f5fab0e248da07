//! Death transaction scenarios driven through the synchronous engine.
//!
//! Every test uses `OffStepMode::Inline`, so loot is computed during the hit
//! and committed by the next `step()`.

use std::sync::Arc;

use stack_core::{
    Attacker, CreatureId, DamageCause, DamageContext, Difficulty, EntityFlag, EntityKind,
    GateRejection, ItemStack, Location, LootOutcome, LootRequest, LootTableSet, PlayerId,
    SpawnCause, StackConfig, StackId, ToolClass, TransactionOutcome, Weapon,
};
use stack_runtime::host::{HostCall, MemoryCreature, MemoryHost};
use stack_runtime::{
    Achievement, CommitEffects, DeathEvent, DeathSimulator, Event, FixedLoot,
    LifecycleEvent, LootError, LootProvider, NoLoot, OffStepMode, StackEngine, StackWorld,
    Statistic, StepTask, TableLootProvider,
};

const KILLER: PlayerId = PlayerId(1);
const MAX_HEALTH: f64 = 20.0;

/// Returns the same outcome regardless of the request amounts.
struct FlatLoot(LootOutcome);

impl LootProvider for FlatLoot {
    fn roll(&self, _request: &LootRequest) -> Result<LootOutcome, LootError> {
        Ok(self.0.clone())
    }
}

fn engine(config: StackConfig, loot: impl LootProvider + 'static) -> StackEngine<MemoryHost> {
    StackEngine::new(MemoryHost::new(), config, Arc::new(loot), OffStepMode::Inline)
}

fn spawn(
    engine: &mut StackEngine<MemoryHost>,
    kind: EntityKind,
    amount: u32,
    health: f64,
) -> (StackId, CreatureId) {
    let creature = engine.host_mut().insert(MemoryCreature {
        health,
        ..MemoryCreature::new(kind, MAX_HEALTH)
    });
    let stack = engine
        .spawn_stack(creature, amount, SpawnCause::Spawner)
        .expect("stack should spawn");
    (stack, creature)
}

fn player_hit(damage: f64) -> DamageContext {
    DamageContext::new(DamageCause::EntityAttack, damage).with_attacker(Attacker::player(
        CreatureId(1000),
        KILLER,
        Location::new(2.0, 0.0, 0.0),
    ))
}

fn commit_effects(engine: &mut StackEngine<MemoryHost>) -> CommitEffects {
    let report = engine.step();
    assert_eq!(report.commits.len(), 1, "exactly one commit expected");
    report.commits[0].effects
}

/// Ten zombies with 5 health left take a 53 damage hit: three die, the
/// survivor carries 12 health, and a duplicate takes over as representative.
#[test]
fn spread_hit_kills_three_and_carries_residual() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (stack, original) = spawn(&mut engine, EntityKind::Zombie, 10, 5.0);

    let result = engine.damage(original, &player_hit(53.0));

    assert!(result.cancel_event);
    assert_eq!(result.event_damage, 53.0);
    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 3 });
    let state = engine.stack(stack).expect("stack should exist");
    assert_eq!(state.amount(), 7);
    assert_eq!(state.health(), 12.0);
    assert!(state.has_flag(EntityFlag::DeathTransaction));
    assert_eq!(engine.host().get(original).map(|c| c.health), Some(12.0));

    let effects = commit_effects(&mut engine);
    assert!(effects.contains(CommitEffects::NOTIFIED | CommitEffects::DUPLICATE_SPAWNED));

    let state = engine.stack(stack).expect("stack should survive");
    assert!(!state.in_death_transaction());
    let duplicate = state.representative();
    assert_ne!(duplicate, original);
    assert_eq!(engine.host().get(duplicate).map(|c| c.health), Some(12.0));
    assert!(engine.host().calls().contains(&HostCall::DeathNotification {
        creature: original,
        stack_amount: 3,
    }));
    assert_eq!(engine.host().notifications(), 1);

    // Original lingers for one step, then goes.
    assert!(engine.host().contains(original));
    engine.step();
    assert!(!engine.host().contains(original));
    assert!(engine.host().contains(duplicate));
    assert!(engine.is_idle());
}

/// A single unit with spread damage off reaches zero: no duplicate, and the
/// representative is removed one step after the commit.
#[test]
fn last_unit_is_removed_next_step() {
    let config = StackConfig {
        spread_damage: false,
        ..StackConfig::default()
    };
    let mut engine = engine(config, NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Cow, 1, MAX_HEALTH);

    let result = engine.damage(creature, &player_hit(25.0));
    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 1 });

    let effects = commit_effects(&mut engine);
    assert!(effects.contains(CommitEffects::REMOVAL_SCHEDULED));
    assert!(!effects.contains(CommitEffects::DUPLICATE_SPAWNED));
    assert_eq!(
        engine
            .host()
            .count_calls(|call| matches!(call, HostCall::SpawnDuplicate { .. })),
        0
    );
    let state = engine.stack(stack).expect("stack lingers until removal");
    assert!(state.has_flag(EntityFlag::Removed));
    assert!(engine.host().contains(creature));

    engine.step();
    assert!(engine.stack(stack).is_none());
    assert!(!engine.host().contains(creature));
    assert!(
        engine
            .drain_events()
            .contains(&Event::Lifecycle(LifecycleEvent::Removed { stack }))
    );
}

#[test]
fn hit_during_transaction_is_a_no_op() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Zombie, 5, MAX_HEALTH);

    engine.damage(creature, &player_hit(25.0));
    let calls_before = engine.host().calls().len();

    let second = engine.damage(creature, &player_hit(25.0));
    assert_eq!(
        second.outcome,
        TransactionOutcome::Rejected(GateRejection::InTransaction)
    );
    assert!(!second.cancel_event);
    assert_eq!(second.event_damage, 25.0);
    assert_eq!(engine.stack(stack).map(|s| s.amount()), Some(4));
    // The defensive item check is the only host call a rejected hit makes.
    assert_eq!(engine.host().calls().len(), calls_before + 1);

    engine.step();
    let next = engine.stack(stack).map(|s| s.representative()).expect("stack");
    let third = engine.damage(next, &player_hit(25.0));
    assert_eq!(third.outcome, TransactionOutcome::Unstacked { removed: 1 });
}

#[test]
fn non_lethal_hit_is_left_to_the_host() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Zombie, 5, MAX_HEALTH);

    let result = engine.damage(creature, &player_hit(4.0));

    assert_eq!(
        result.outcome,
        TransactionOutcome::Rejected(GateRejection::NotLethal)
    );
    assert!(!result.cancel_event);
    assert_eq!(result.event_damage, 4.0);
    assert_eq!(engine.stack(stack).map(|s| s.amount()), Some(5));
    assert!(engine.host().calls().is_empty());
}

#[test]
fn disabled_stacking_only_skips_single_units() {
    let mut config = StackConfig::default();
    config.disabled_kinds.insert(EntityKind::Creeper);
    let mut engine = engine(config, NoLoot);
    let (_, single) = spawn(&mut engine, EntityKind::Creeper, 1, MAX_HEALTH);
    let (_, pair) = spawn(&mut engine, EntityKind::Creeper, 2, MAX_HEALTH);

    assert_eq!(
        engine.damage(single, &player_hit(30.0)).outcome,
        TransactionOutcome::Rejected(GateRejection::StackingDisabled)
    );
    assert_eq!(
        engine.damage(pair, &player_hit(30.0)).outcome,
        TransactionOutcome::Unstacked { removed: 1 }
    );
}

#[test]
fn unknown_or_dead_creature_is_gone() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, creature) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);

    assert_eq!(
        engine.damage(CreatureId(404), &player_hit(30.0)).outcome,
        TransactionOutcome::Rejected(GateRejection::CreatureGone)
    );

    engine.host_mut().get_mut(creature).expect("creature").dead = true;
    assert_eq!(
        engine.damage(creature, &player_hit(30.0)).outcome,
        TransactionOutcome::Rejected(GateRejection::CreatureGone)
    );
}

#[test]
fn defensive_item_absorbs_the_hit() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Zombie, 4, MAX_HEALTH);
    engine.host_mut().get_mut(creature).expect("creature").defensive_item = true;

    let result = engine.damage(creature, &player_hit(30.0));

    assert_eq!(result.outcome, TransactionOutcome::DefensiveItem);
    assert!(!result.cancel_event);
    assert_eq!(result.event_damage, 0.0);
    assert_eq!(engine.stack(stack).map(|s| s.amount()), Some(4));
    assert!(engine.is_idle());
}

#[test]
fn instant_kill_removes_the_whole_stack() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Skeleton, 10, MAX_HEALTH);

    let result = engine.damage(creature, &DamageContext::new(DamageCause::Void, 1.0));

    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 10 });
    assert_eq!(engine.host().get(creature).map(|c| c.health), Some(MAX_HEALTH));
    assert!(commit_effects(&mut engine).contains(CommitEffects::REMOVAL_SCHEDULED));
    engine.step();
    assert!(engine.stack(stack).is_none());
}

/// Observers that add drops get only their additions multiplied.
#[test]
fn observer_added_drops_are_multiplied() {
    let loot = FlatLoot(LootOutcome::new(vec![ItemStack::new("a", 1)], 0));
    let mut engine = engine(StackConfig::default(), loot);
    engine.host_mut().add_observer(|_, outcome| {
        outcome.drops.push(ItemStack::new("b", 1));
    });
    let (_, creature) = spawn(&mut engine, EntityKind::Zombie, 5, MAX_HEALTH);

    // 20 health, 60 damage: 1 + floor(40 / 20) = 3 units.
    let result = engine.damage(creature, &player_hit(60.0));
    assert_eq!(result.removed(), 3);
    engine.step();

    assert_eq!(
        engine.host().dropped_items(),
        vec![ItemStack::new("a", 1), ItemStack::new("b", 3)]
    );
}

#[test]
fn drops_and_experience_scale_with_removed_units() {
    let loot = FixedLoot::new(LootOutcome::new(vec![ItemStack::new("bone", 2)], 5));
    let mut engine = engine(StackConfig::default(), loot);
    let (_, creature) = spawn(&mut engine, EntityKind::Skeleton, 5, MAX_HEALTH);

    engine.damage(creature, &player_hit(60.0));
    let effects = commit_effects(&mut engine);

    assert!(effects.contains(CommitEffects::DROPS_RELEASED | CommitEffects::EXP_ORB));
    assert_eq!(engine.host().dropped_items(), vec![ItemStack::new("bone", 6)]);
    assert_eq!(engine.host().experience_orbs(), 15);
}

#[test]
fn auto_pickup_sends_experience_to_killer() {
    let mut config = StackConfig::default();
    config.auto_exp_pickup.insert_all();
    let loot = FixedLoot::new(LootOutcome::new(Vec::new(), 3));
    let mut engine = engine(config, loot);
    let (_, creature) = spawn(&mut engine, EntityKind::Pig, 2, MAX_HEALTH);

    engine.damage(creature, &player_hit(20.0));
    assert!(commit_effects(&mut engine).contains(CommitEffects::EXP_TO_KILLER));

    assert_eq!(engine.host().experience_given(KILLER), 3);
    assert_eq!(engine.host().experience_orbs(), 0);
}

#[test]
fn suppressed_commit_skips_notification_and_awards_only_tagged_experience() {
    let loot = FixedLoot::new(LootOutcome::new(vec![ItemStack::new("string", 1)], 4));
    let mut engine = engine(StackConfig::default(), loot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Spider, 6, MAX_HEALTH);

    engine.damage(creature, &player_hit(20.0).suppress_notification(creature));
    let effects = commit_effects(&mut engine);

    assert!(!effects.contains(CommitEffects::NOTIFIED));
    assert_eq!(engine.host().notifications(), 0);
    assert_eq!(engine.host().dropped_items(), vec![ItemStack::new("string", 1)]);
    assert_eq!(engine.host().experience_orbs(), 0);

    engine.defer_experience(stack, 7).expect("stack exists");
    let next = engine.stack(stack).map(|s| s.representative()).expect("stack");
    engine.damage(next, &player_hit(20.0).suppress_notification(next));
    engine.step();

    assert_eq!(engine.host().experience_orbs(), 7);
    assert!(!engine.stack(stack).expect("stack").has_flag(EntityFlag::PendingExperience));
}

#[test]
fn kill_statistics_survive_unsupported_achievement() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    engine.host_mut().reject_achievement("adventure/kill_a_mob");
    let (_, creature) = spawn(&mut engine, EntityKind::Zombie, 5, MAX_HEALTH);

    engine.damage(creature, &player_hit(60.0));

    let host = engine.host();
    assert!(!host.has_achievement(KILLER, Achievement::KillAMob));
    assert_eq!(host.statistic(KILLER, Statistic::MobKills), 3);
    assert_eq!(
        host.statistic(KILLER, Statistic::KillEntity(EntityKind::Zombie)),
        3
    );
}

#[test]
fn long_range_kill_grants_sniper_duel_for_any_victim() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, zombie) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    let (_, cow) = spawn(&mut engine, EntityKind::Cow, 3, MAX_HEALTH);
    let far = Attacker::player(CreatureId(1000), KILLER, Location::new(60.0, 0.0, 0.0));

    engine.damage(
        zombie,
        &DamageContext::new(DamageCause::EntityAttack, 25.0).with_attacker(far.clone()),
    );
    assert!(engine.host().has_achievement(KILLER, Achievement::SniperDuel));

    engine.damage(
        cow,
        &DamageContext::new(DamageCause::EntityAttack, 25.0).with_attacker(far),
    );
    assert!(engine.host().has_achievement(
        KILLER,
        Achievement::KillAllMobs {
            kind: EntityKind::Cow
        }
    ));
    assert_eq!(
        engine.host().count_calls(|call| matches!(
            call,
            HostCall::Achievement {
                achievement: Achievement::SniperDuel,
                ..
            }
        )),
        2
    );
}

#[test]
fn close_kill_does_not_grant_sniper_duel() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, skeleton) = spawn(&mut engine, EntityKind::Skeleton, 3, MAX_HEALTH);

    engine.damage(skeleton, &player_hit(25.0));

    assert!(engine.host().has_achievement(KILLER, Achievement::KillAMob));
    assert!(!engine.host().has_achievement(KILLER, Achievement::SniperDuel));
}

#[test]
fn wither_keeps_its_damage_cause() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, wither) = spawn(&mut engine, EntityKind::Wither, 2, MAX_HEALTH);
    let (_, zombie) = spawn(&mut engine, EntityKind::Zombie, 2, MAX_HEALTH);

    engine.damage(wither, &player_hit(25.0));
    engine.damage(zombie, &player_hit(25.0));
    engine.step();

    let calls = engine.host().calls();
    assert!(!calls.contains(&HostCall::ClearDamageCause(wither)));
    assert!(calls.contains(&HostCall::ClearDamageCause(zombie)));
}

#[test]
fn raid_participant_killed_by_player_joins_raid() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, pillager) = spawn(&mut engine, EntityKind::Pillager, 3, MAX_HEALTH);
    engine.host_mut().get_mut(pillager).expect("pillager").raid_participant = true;

    engine.damage(pillager, &player_hit(25.0));

    assert!(commit_effects(&mut engine).contains(CommitEffects::RAID_JOINED));
    assert!(engine.host().calls().contains(&HostCall::JoinRaid {
        killer: KILLER,
        id: pillager,
    }));
}

#[test]
fn fast_kill_resets_velocity_next_step() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, creature) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);

    engine.damage(creature, &player_hit(25.0));
    assert!(engine.host().calls().contains(&HostCall::SetNoDamageTicks {
        id: creature,
        ticks: 0,
    }));
    assert!(!engine.host().calls().contains(&HostCall::ResetVelocity(creature)));

    engine.step();
    assert!(engine.host().calls().contains(&HostCall::ResetVelocity(creature)));
}

#[test]
fn representative_stays_without_death_animation() {
    let config = StackConfig {
        death_animation: false,
        ..StackConfig::default()
    };
    let mut engine = engine(config, NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);

    engine.damage(creature, &player_hit(25.0));
    let effects = commit_effects(&mut engine);

    assert!(!effects.contains(CommitEffects::DUPLICATE_SPAWNED));
    assert_eq!(engine.stack(stack).map(|s| s.representative()), Some(creature));
    assert_eq!(engine.host().get(creature).map(|c| c.dead), Some(false));
}

#[test]
fn zombie_kill_transforms_villager_stack() {
    let mut config = StackConfig::default();
    config.transform.force = true;
    let mut engine = engine(config, NoLoot);
    let (stack, villager) = spawn(&mut engine, EntityKind::Villager, 4, MAX_HEALTH);
    let zombie = Attacker::creature(CreatureId(900), EntityKind::Zombie, Location::ORIGIN);

    let result = engine.damage(
        villager,
        &DamageContext::new(DamageCause::EntityAttack, 25.0).with_attacker(zombie),
    );

    assert_eq!(result.outcome, TransactionOutcome::Transformed);
    assert!(result.cancel_event);
    let transformed = engine
        .stacks()
        .iter()
        .find(|s| s.kind() == EntityKind::ZombieVillager)
        .expect("transformed stack");
    assert_eq!(transformed.amount(), 4);
    assert_eq!(transformed.spawn_cause(), SpawnCause::Transformation);
    assert_eq!(engine.stack(stack).map(|s| s.amount()), Some(0));

    engine.step();
    assert!(engine.stack(stack).is_none());
    assert!(!engine.host().contains(villager));
    assert_eq!(engine.host().notifications(), 0);
}

#[test]
fn split_one_transformation_keeps_the_rest() {
    let mut config = StackConfig::default();
    config.transform.split_one = true;
    let mut engine = engine(config, NoLoot);
    let (stack, pig) = spawn(&mut engine, EntityKind::Pig, 5, MAX_HEALTH);

    let result = engine.damage(pig, &DamageContext::new(DamageCause::Lightning, 25.0));

    assert_eq!(result.outcome, TransactionOutcome::Transformed);
    assert_eq!(engine.stack(stack).map(|s| s.amount()), Some(4));
    let piglins: Vec<_> = engine
        .stacks()
        .iter()
        .filter(|s| s.kind() == EntityKind::ZombifiedPiglin)
        .map(|s| s.amount())
        .collect();
    assert_eq!(piglins, vec![1]);
}

#[test]
fn failed_transformation_spawn_falls_back_to_death() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    engine.host_mut().disable_spawning();
    let (stack, pig) = spawn(&mut engine, EntityKind::Pig, 3, MAX_HEALTH);

    let result = engine.damage(pig, &DamageContext::new(DamageCause::Lightning, 25.0));

    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 1 });
    // No duplicate can spawn either, so the original keeps representing.
    let effects = commit_effects(&mut engine);
    assert!(!effects.contains(CommitEffects::DUPLICATE_SPAWNED));
    assert_eq!(engine.stack(stack).map(|s| s.representative()), Some(pig));
    assert_eq!(engine.stack(stack).map(|s| s.amount()), Some(2));
}

#[test]
fn easy_difficulty_villager_kill_does_not_transform() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    *engine.host_mut() = MemoryHost::new().with_difficulty(Difficulty::Easy);
    let (_, villager) = spawn(&mut engine, EntityKind::Villager, 2, MAX_HEALTH);
    let zombie = Attacker::creature(CreatureId(900), EntityKind::Zombie, Location::ORIGIN);

    let result = engine.damage(
        villager,
        &DamageContext::new(DamageCause::EntityAttack, 25.0).with_attacker(zombie),
    );

    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 1 });
}

#[test]
fn loot_failure_commits_without_loot() {
    let provider = TableLootProvider::new(LootTableSet::new());
    let mut engine = engine(StackConfig::default(), provider);
    let (_, creature) = spawn(&mut engine, EntityKind::Blaze, 3, MAX_HEALTH);

    engine.damage(creature, &player_hit(25.0));
    let effects = commit_effects(&mut engine);

    assert!(effects.contains(CommitEffects::NOTIFIED));
    assert!(!effects.contains(CommitEffects::DROPS_RELEASED));
    assert!(engine.host().dropped_items().is_empty());
}

#[test]
fn suppressed_commit_replaces_representative_without_death_animation() {
    let config = StackConfig {
        death_animation: false,
        ..StackConfig::default()
    };
    let mut engine = engine(config, NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Spider, 6, MAX_HEALTH);

    engine.damage(creature, &player_hit(20.0).suppress_notification(creature));
    let effects = commit_effects(&mut engine);

    assert!(effects.contains(CommitEffects::DUPLICATE_SPAWNED));
    assert_ne!(engine.stack(stack).map(|s| s.representative()), Some(creature));
}

#[test]
fn suppressed_commit_keeps_last_unit_representative() {
    let config = StackConfig {
        death_animation: false,
        ..StackConfig::default()
    };
    let mut engine = engine(config, NoLoot);
    let (stack, creature) = spawn(&mut engine, EntityKind::Spider, 2, MAX_HEALTH);

    engine.damage(creature, &player_hit(20.0).suppress_notification(creature));
    let effects = commit_effects(&mut engine);

    assert!(!effects.contains(CommitEffects::DUPLICATE_SPAWNED));
    assert_eq!(engine.stack(stack).map(|s| s.representative()), Some(creature));
}

#[test]
fn void_hit_ignores_defensive_item() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, creature) = spawn(&mut engine, EntityKind::Zombie, 4, MAX_HEALTH);
    engine.host_mut().get_mut(creature).expect("creature").defensive_item = true;

    let result = engine.damage(creature, &DamageContext::new(DamageCause::Void, 1.0));

    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 4 });
    assert_eq!(
        engine
            .host()
            .count_calls(|call| matches!(call, HostCall::DefensiveItem { .. })),
        0
    );
    assert_eq!(engine.host().get(creature).map(|c| c.defensive_item), Some(true));
}

#[test]
fn stacked_kill_wears_killer_tool() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, first) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    let (_, second) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);

    engine.damage(first, &player_hit(25.0).with_weapon(Weapon::new(ToolClass::Tool)));
    engine.damage(second, &player_hit(25.0).with_weapon(Weapon::new(ToolClass::Sword)));

    let wear: Vec<_> = engine
        .host()
        .calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::DamageTool { player, amount } => Some((*player, *amount)),
            _ => None,
        })
        .collect();
    assert_eq!(wear, vec![(KILLER, 2), (KILLER, 1)]);
}

#[test]
fn creative_or_unbreakable_tools_do_not_wear() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, first) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    let (_, second) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    let (_, third) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);

    let sword = Weapon::new(ToolClass::Sword);
    engine.damage(first, &player_hit(25.0).with_weapon(sword).with_creative_damager());
    engine.damage(second, &player_hit(25.0).with_weapon(sword.unbreakable()));
    engine.damage(third, &player_hit(25.0).with_weapon(Weapon::new(ToolClass::Other)));

    assert_eq!(
        engine
            .host()
            .count_calls(|call| matches!(call, HostCall::DamageTool { .. })),
        0
    );
}

#[test]
fn keep_fire_leaves_killed_representative_burning() {
    let config = StackConfig {
        keep_fire: true,
        ..StackConfig::default()
    };
    let mut engine = engine(config, NoLoot);
    let (_, burning) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    let (_, doused) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    engine.host_mut().get_mut(doused).expect("creature").fire_ticks = -20;

    engine.damage(burning, &player_hit(25.0));
    engine.damage(doused, &player_hit(25.0));
    assert_eq!(
        engine.host().get(burning).map(|c| c.fire_ticks),
        Some(StackConfig::KEEP_FIRE_TICKS)
    );

    engine.step();
    assert_eq!(
        engine.host().get(burning).map(|c| c.fire_ticks),
        Some(StackConfig::KEEP_FIRE_TICKS)
    );
    assert_eq!(engine.host().get(doused).map(|c| c.fire_ticks), Some(-20));
}

#[test]
fn fire_ticks_untouched_without_keep_fire() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, creature) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);

    engine.damage(creature, &player_hit(25.0));
    engine.step();

    assert_eq!(engine.host().get(creature).map(|c| c.fire_ticks), Some(0));
}

#[test]
fn patrol_leader_kill_grants_bad_omen() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, leader) = spawn(&mut engine, EntityKind::Pillager, 3, MAX_HEALTH);
    engine.host_mut().get_mut(leader).expect("leader").patrol_leader = true;

    engine.damage(leader, &player_hit(25.0));
    let effects = commit_effects(&mut engine);

    assert!(effects.contains(CommitEffects::BAD_OMEN | CommitEffects::RAID_JOINED));
    let calls = engine.host().calls();
    let omen = calls.iter().position(|call| *call == HostCall::BadOmen(KILLER));
    let join = calls
        .iter()
        .position(|call| matches!(call, HostCall::JoinRaid { .. }));
    assert!(omen.is_some() && omen < join);
}

#[test]
fn auto_pickup_plays_configured_sound() {
    let mut config = StackConfig {
        exp_pickup_sound: Some("entity.experience_orb.pickup".to_string()),
        ..StackConfig::default()
    };
    config.auto_exp_pickup.insert(EntityKind::Cow);
    let loot = FixedLoot::new(LootOutcome::new(Vec::new(), 3));
    let mut engine = engine(config, loot);
    let (_, cow) = spawn(&mut engine, EntityKind::Cow, 2, MAX_HEALTH);
    let (_, pig) = spawn(&mut engine, EntityKind::Pig, 2, MAX_HEALTH);

    engine.damage(cow, &player_hit(20.0));
    engine.damage(pig, &player_hit(20.0));
    engine.step();

    let sounds: Vec<_> = engine
        .host()
        .calls()
        .iter()
        .filter(|call| matches!(call, HostCall::PlaySound { .. }))
        .cloned()
        .collect();
    assert_eq!(
        sounds,
        vec![HostCall::PlaySound {
            player: KILLER,
            sound: "entity.experience_orb.pickup".to_string(),
        }]
    );
    assert_eq!(engine.host().experience_orbs(), 3);
}

/// A sword kill sweeps the bystanders: a stacked one runs its own
/// transaction, a loose one takes native damage, and nothing sweeps twice.
#[test]
fn sweeping_strike_reaches_bystanders_once() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, victim) = spawn(&mut engine, EntityKind::Zombie, 5, MAX_HEALTH);
    let (bystanders, bystander) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    let cow = engine.host_mut().spawn(EntityKind::Cow, 10.0);
    engine
        .host_mut()
        .set_sweep_targets(vec![victim, bystander, cow]);
    let sword = Weapon::new(ToolClass::Sword).with_sweeping(3);

    // Sweep damage: 1 + 28 * 3/4 = 22.
    let result = engine.damage(
        victim,
        &player_hit(28.0).with_raw_damage(28.0).with_weapon(sword),
    );
    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 1 });

    let host = engine.host();
    assert_eq!(
        host.count_calls(|call| matches!(call, HostCall::Sweep { .. })),
        1
    );
    assert!(host.calls().contains(&HostCall::ApplyDamage {
        id: cow,
        amount: 22.0,
    }));
    assert!(
        !host
            .calls()
            .iter()
            .any(|call| matches!(call, HostCall::ApplyDamage { id, .. } if *id == bystander))
    );
    assert_eq!(host.get(cow).map(|c| c.dead), Some(true));
    assert_eq!(engine.stack(bystanders).map(|s| s.amount()), Some(2));
    assert_eq!(engine.stack(bystanders).map(|s| s.health()), Some(18.0));

    assert_eq!(engine.step().commits.len(), 2);
}

#[test]
fn non_lethal_sweep_is_applied_natively() {
    let mut engine = engine(StackConfig::default(), NoLoot);
    let (_, victim) = spawn(&mut engine, EntityKind::Zombie, 5, MAX_HEALTH);
    let (bystanders, bystander) = spawn(&mut engine, EntityKind::Zombie, 3, MAX_HEALTH);
    engine.host_mut().set_sweep_targets(vec![bystander]);

    // Sweeping level 0 deals a flat 1 damage.
    engine.damage(
        victim,
        &player_hit(25.0).with_weapon(Weapon::new(ToolClass::Sword)),
    );

    assert!(engine.host().calls().contains(&HostCall::ApplyDamage {
        id: bystander,
        amount: 1.0,
    }));
    assert_eq!(engine.host().get(bystander).map(|c| c.health), Some(19.0));
    assert_eq!(engine.stack(bystanders).map(|s| s.amount()), Some(3));
}

/// The transformed creature is stacked before the original gives up any
/// units; if that fails the hit falls back to a normal death.
#[test]
fn unstackable_transformation_falls_back_without_losing_units() {
    let mut world = StackWorld::new(MemoryHost::new(), OffStepMode::Inline);
    let mut simulator = DeathSimulator::new(StackConfig::default(), Arc::new(NoLoot));
    let pig = world.host.spawn(EntityKind::Pig, MAX_HEALTH);
    let stack = world
        .stacks
        .insert(EntityKind::Pig, pig, 3, MAX_HEALTH, SpawnCause::Natural)
        .expect("stack");
    // The host hands out the next id to the transformed creature; claim it.
    let next = CreatureId(pig.0 + 1);
    world
        .stacks
        .insert(EntityKind::Zombie, next, 1, MAX_HEALTH, SpawnCause::Natural)
        .expect("claimed id");

    let result = simulator.simulate_death(
        &mut world,
        stack,
        &DamageContext::new(DamageCause::Lightning, 25.0),
    );

    assert_eq!(result.outcome, TransactionOutcome::Unstacked { removed: 1 });
    assert_eq!(world.stacks.get(stack).map(|s| s.amount()), Some(2));
    assert_eq!(world.stacks.len(), 2);
    assert!(world.host.calls().contains(&HostCall::Remove(next)));
    assert!(
        !world
            .drain_events()
            .iter()
            .any(|event| matches!(event, Event::Lifecycle(LifecycleEvent::Transformed { .. })))
    );
}

/// The commit re-resolves its stack; a stack removed in between is skipped.
#[test]
fn commit_for_vanished_stack_is_abandoned() {
    let mut world = StackWorld::new(MemoryHost::new(), OffStepMode::Inline);
    let mut simulator = DeathSimulator::new(StackConfig::default(), Arc::new(NoLoot));
    let creature = world.host.spawn(EntityKind::Zombie, MAX_HEALTH);
    let stack = world
        .stacks
        .insert(EntityKind::Zombie, creature, 3, MAX_HEALTH, SpawnCause::Natural)
        .expect("stack");

    let result = simulator.simulate_death(&mut world, stack, &player_hit(25.0));
    assert_eq!(result.removed(), 1);
    world.stacks.remove(stack);

    let mut reports = Vec::new();
    for task in world.scheduler.advance() {
        if let StepTask::CommitDeath { pending, loot } = task {
            reports.push(simulator.commit(&mut world, *pending, loot));
        }
    }

    assert_eq!(reports, vec![None]);
    assert_eq!(world.host.notifications(), 0);
    assert!(world.drain_events().contains(&Event::Death(DeathEvent::Abandoned {
        stack,
        removed: 1,
    })));
}
