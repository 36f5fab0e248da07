//! Creature kinds and damage causes.
//!
//! Both enums double as [`FlagSet`](crate::FlagSet) universes so configuration
//! can list them by name (or with the `ALL` wildcard).

use crate::impl_flag_kind;

/// Creature kind of a stack and of every unit it represents.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EntityKind {
    Player,
    Zombie,
    ZombieVillager,
    Husk,
    Drowned,
    Skeleton,
    Stray,
    Creeper,
    Spider,
    CaveSpider,
    Slime,
    Blaze,
    Enderman,
    Witch,
    Pillager,
    Vindicator,
    Evoker,
    Ravager,
    Wither,
    Villager,
    Pig,
    ZombifiedPiglin,
    Cow,
    Sheep,
    Chicken,
    IronGolem,
}

impl_flag_kind!(EntityKind);

impl EntityKind {
    /// Kinds that can belong to a raid.
    pub const fn is_raider(self) -> bool {
        use EntityKind::*;
        matches!(self, Pillager | Vindicator | Evoker | Ravager | Witch)
    }

    /// Kinds whose kill converts villagers.
    pub const fn is_zombie(self) -> bool {
        use EntityKind::*;
        matches!(self, Zombie | ZombieVillager | Husk | Drowned)
    }

    /// The wither's native death animation reads its last damage cause, so the
    /// commit must leave it in place.
    pub const fn keeps_damage_cause_on_death(self) -> bool {
        matches!(self, EntityKind::Wither)
    }
}

/// Why a creature took damage, as reported by the host.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DamageCause {
    EntityAttack,
    EntitySweepAttack,
    Projectile,
    Fall,
    Fire,
    FireTick,
    Lava,
    Drowning,
    BlockExplosion,
    EntityExplosion,
    Lightning,
    Magic,
    Poison,
    Void,
    Suicide,
    Custom,
}

impl_flag_kind!(DamageCause);

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(
            EntityKind::from_str("ZOMBIE_VILLAGER").unwrap(),
            EntityKind::ZombieVillager
        );
        assert_eq!(EntityKind::from_str("pig").unwrap(), EntityKind::Pig);
        assert_eq!(DamageCause::from_str("void").unwrap(), DamageCause::Void);
        assert_eq!(EntityKind::Husk.as_ref(), "husk");
    }

    #[test]
    fn only_wither_keeps_damage_cause() {
        use strum::IntoEnumIterator;

        let keeping: Vec<_> = EntityKind::iter()
            .filter(|kind| kind.keeps_damage_cause_on_death())
            .collect();
        assert_eq!(keeping, vec![EntityKind::Wither]);
    }
}
