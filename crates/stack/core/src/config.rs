//! Stacking configuration read by the death simulation.
//!
//! Kind and cause lists accept `"ALL"` in config files.

use crate::flags::FlagSet;
use crate::state::{DamageCause, EntityKind};

/// Game-rule switches for stacked deaths.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StackConfig {
    /// Global stacking switch. When off, single-unit stacks die natively.
    pub enabled: bool,
    /// Kinds that never take the stacked death path while holding one unit.
    pub disabled_kinds: FlagSet<EntityKind>,
    /// Spread one hit's damage over several units.
    pub spread_damage: bool,
    /// Units removed per lethal hit when spread damage is off.
    pub default_unstack: u32,
    /// Damage causes that kill the whole stack at once.
    pub instant_kill_causes: FlagSet<DamageCause>,
    /// Creative-mode damagers kill the whole stack.
    pub creative_instant_kill: bool,
    /// Skip the no-damage window and knockback after a stacked kill.
    pub fast_kill: bool,
    /// Multiply item drops by the removed units.
    pub multiply_drops: bool,
    /// Multiply experience by the removed units.
    pub multiply_exp: bool,
    /// Kinds whose experience goes straight to the killer.
    pub auto_exp_pickup: FlagSet<EntityKind>,
    /// Sound played to the killer on automatic experience pickup.
    pub exp_pickup_sound: Option<String>,
    /// Keep a killed representative burning for [`Self::KEEP_FIRE_TICKS`].
    pub keep_fire: bool,
    /// Replace the dying representative with a fresh duplicate so the native
    /// death animation plays for the removed units.
    pub death_animation: bool,
    pub transform: TransformConfig,
    /// Seed for the transformation coin flip. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl StackConfig {
    pub const DEFAULT_UNSTACK: u32 = 1;
    pub const KEEP_FIRE_TICKS: i32 = 160;

    pub fn new() -> Self {
        let mut instant_kill_causes = FlagSet::new();
        instant_kill_causes.insert(DamageCause::Void);

        Self {
            enabled: true,
            disabled_kinds: FlagSet::new(),
            spread_damage: true,
            default_unstack: Self::DEFAULT_UNSTACK,
            instant_kill_causes,
            creative_instant_kill: false,
            fast_kill: true,
            multiply_drops: true,
            multiply_exp: true,
            auto_exp_pickup: FlagSet::new(),
            exp_pickup_sound: None,
            keep_fire: false,
            death_animation: true,
            transform: TransformConfig::default(),
            rng_seed: None,
        }
    }

    /// Returns true when the hit should remove the whole stack.
    pub fn is_instant_kill(&self, cause: DamageCause, creative_damager: bool) -> bool {
        self.instant_kill_causes.contains(cause) || (creative_damager && self.creative_instant_kill)
    }

    /// Returns true when stacked deaths are skipped for a stack of `amount`.
    pub fn stacking_disabled(&self, kind: EntityKind, amount: u32) -> bool {
        amount <= 1 && (!self.enabled || self.disabled_kinds.contains(kind))
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Policy for kills that turn the victim into another kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformConfig {
    /// Transform on every eligible kill, ignoring difficulty.
    pub force: bool,
    /// Split one unit off to the transformed creature instead of moving the
    /// whole stack.
    pub split_one: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StackConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_unstack, 1);
        assert!(config.is_instant_kill(DamageCause::Void, false));
        assert!(!config.is_instant_kill(DamageCause::EntityAttack, true));
    }

    #[test]
    fn creative_instant_kill_requires_flag() {
        let config = StackConfig {
            creative_instant_kill: true,
            ..StackConfig::default()
        };
        assert!(config.is_instant_kill(DamageCause::EntityAttack, true));
        assert!(!config.is_instant_kill(DamageCause::EntityAttack, false));
    }

    #[test]
    fn disabled_only_applies_to_single_units() {
        let config = StackConfig {
            enabled: false,
            ..StackConfig::default()
        };
        assert!(config.stacking_disabled(EntityKind::Cow, 1));
        assert!(!config.stacking_disabled(EntityKind::Cow, 2));

        let mut config = StackConfig::default();
        config.disabled_kinds.insert(EntityKind::Sheep);
        assert!(config.stacking_disabled(EntityKind::Sheep, 1));
        assert!(!config.stacking_disabled(EntityKind::Cow, 1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn wildcard_round_trips_through_json() {
        let json = r#"{ "auto_exp_pickup": ["ALL"], "instant_kill_causes": ["VOID", "lava"] }"#;
        let config: StackConfig = serde_json::from_str(json).unwrap();

        assert!(config.auto_exp_pickup.is_wildcard());
        assert!(config.auto_exp_pickup.contains(EntityKind::Blaze));
        assert!(config.instant_kill_causes.contains(DamageCause::Lava));
        assert!(!config.keep_fire);
        assert_eq!(config.exp_pickup_sound, None);
        assert!(!config.instant_kill_causes.contains(DamageCause::Fall));
        assert!(config.spread_damage);
    }
}
