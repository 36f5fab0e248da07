//! Kind transformations that replace a death.
//!
//! A villager killed by a zombie may rise as a zombie villager; some creatures
//! struck by lightning turn into another kind. These rules only decide; the
//! runtime performs the spawn.

use crate::state::{DamageCause, Difficulty, EntityKind};

/// How likely a matching rule is to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformChance {
    Always,
    /// Weighted by [`Difficulty::infection_chance`].
    ByDifficulty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformRule {
    pub into: EntityKind,
    pub chance: TransformChance,
}

/// Returns the transformation a kill would trigger, if any.
pub fn transformation_for(
    victim: EntityKind,
    cause: DamageCause,
    attacker: Option<EntityKind>,
) -> Option<TransformRule> {
    match (victim, cause) {
        (EntityKind::Pig, DamageCause::Lightning) => Some(TransformRule {
            into: EntityKind::ZombifiedPiglin,
            chance: TransformChance::Always,
        }),
        (EntityKind::Villager, DamageCause::Lightning) => Some(TransformRule {
            into: EntityKind::Witch,
            chance: TransformChance::Always,
        }),
        (EntityKind::Villager, _) if attacker.is_some_and(EntityKind::is_zombie) => {
            Some(TransformRule {
                into: EntityKind::ZombieVillager,
                chance: TransformChance::ByDifficulty,
            })
        }
        _ => None,
    }
}

/// Decides whether `rule` fires.
///
/// `force` makes every rule fire. `roll` is a uniform sample in `[0, 1)`.
pub fn should_transform(rule: TransformRule, difficulty: Difficulty, force: bool, roll: f64) -> bool {
    if force {
        return true;
    }
    match rule.chance {
        TransformChance::Always => true,
        TransformChance::ByDifficulty => roll < difficulty.infection_chance(),
    }
}
