use std::collections::HashSet;

use crate::state::{CreatureId, DamageCause, EntityKind, Location, PlayerId};

/// Entity that dealt the damage.
#[derive(Clone, Debug, PartialEq)]
pub struct Attacker {
    pub entity: CreatureId,
    pub kind: EntityKind,
    /// Player credited with the kill (the shooter for projectiles).
    pub player: Option<PlayerId>,
    pub location: Location,
}

impl Attacker {
    pub fn player(entity: CreatureId, player: PlayerId, location: Location) -> Self {
        Self {
            entity,
            kind: EntityKind::Player,
            player: Some(player),
            location,
        }
    }

    pub fn creature(entity: CreatureId, kind: EntityKind, location: Location) -> Self {
        Self {
            entity,
            kind,
            player: None,
            location,
        }
    }
}

/// Durability class of a held item; decides how much one kill wears it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ToolClass {
    Sword,
    /// Axes, pickaxes, shovels and hoes.
    Tool,
    #[default]
    Other,
}

impl ToolClass {
    /// Durability points a kill costs before unbreaking rolls.
    pub const fn base_wear(self) -> u32 {
        match self {
            ToolClass::Sword => 1,
            ToolClass::Tool => 2,
            ToolClass::Other => 0,
        }
    }
}

/// The item the damage was dealt with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Weapon {
    pub class: ToolClass,
    pub sweeping_level: u8,
    pub looting_level: u8,
    pub unbreaking_level: u8,
    pub unbreakable: bool,
}

impl Weapon {
    pub fn new(class: ToolClass) -> Self {
        Self {
            class,
            ..Self::default()
        }
    }

    pub fn with_sweeping(mut self, level: u8) -> Self {
        self.sweeping_level = level;
        self
    }

    pub fn with_looting(mut self, level: u8) -> Self {
        self.looting_level = level;
        self
    }

    pub fn with_unbreaking(mut self, level: u8) -> Self {
        self.unbreaking_level = level;
        self
    }

    pub fn unbreakable(mut self) -> Self {
        self.unbreakable = true;
        self
    }

    /// Damage a sweeping strike deals to bystanders for a `raw_damage` hit.
    pub fn sweep_damage(&self, raw_damage: f64) -> f64 {
        let level = f64::from(self.sweeping_level);
        1.0 + raw_damage * (level / (level + 1.0))
    }

    /// Durability points one kill costs this item.
    ///
    /// Each point is skipped when `roll(unbreaking_level + 1)` is non-zero;
    /// `roll(n)` must return a uniform value in `0..n`.
    pub fn wear(&self, mut roll: impl FnMut(u32) -> u32) -> u32 {
        if self.unbreakable {
            return 0;
        }
        let base = self.class.base_wear();
        let level = u32::from(self.unbreaking_level);
        if level == 0 {
            return base;
        }
        let skipped = (0..base).filter(|_| roll(level + 1) > 0).count() as u32;
        base - skipped
    }
}

/// One damage notification from the host.
///
/// `suppressed_notifications` is the re-entrancy guard for chained calls: a
/// creature in the set never has its native death notification raised by this
/// transaction. Callers propagate the set from an outer transaction into any
/// damage they issue while handling it.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageContext {
    pub cause: DamageCause,
    pub attacker: Option<Attacker>,
    pub weapon: Option<Weapon>,
    pub raw_damage: f64,
    pub final_damage: f64,
    pub creative_damager: bool,
    /// Dealt by a sweeping strike handed off from another stacked kill. Such
    /// hits never start a sweep of their own.
    pub sweep: bool,
    pub suppressed_notifications: HashSet<CreatureId>,
}

impl DamageContext {
    pub fn new(cause: DamageCause, final_damage: f64) -> Self {
        Self {
            cause,
            attacker: None,
            weapon: None,
            raw_damage: final_damage,
            final_damage,
            creative_damager: false,
            sweep: false,
            suppressed_notifications: HashSet::new(),
        }
    }

    pub fn with_attacker(mut self, attacker: Attacker) -> Self {
        self.attacker = Some(attacker);
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_raw_damage(mut self, raw_damage: f64) -> Self {
        self.raw_damage = raw_damage;
        self
    }

    pub fn with_creative_damager(mut self) -> Self {
        self.creative_damager = true;
        self
    }

    pub fn suppress_notification(mut self, creature: CreatureId) -> Self {
        self.suppressed_notifications.insert(creature);
        self
    }

    /// The same attacker and weapon hitting a bystander for `damage`.
    pub fn sweep_hit(&self, damage: f64) -> Self {
        Self {
            cause: DamageCause::EntitySweepAttack,
            raw_damage: damage,
            final_damage: damage,
            sweep: true,
            ..self.clone()
        }
    }

    /// Player credited with the kill, if any.
    pub fn killer(&self) -> Option<PlayerId> {
        self.attacker.as_ref().and_then(|a| a.player)
    }

    /// Sweeping level applied to this hit. A sweep hit already carries the
    /// reduced damage, so it reports 0.
    pub fn sweeping_level(&self) -> u8 {
        if self.sweep {
            return 0;
        }
        self.weapon.map_or(0, |w| w.sweeping_level)
    }

    pub fn looting_level(&self) -> u8 {
        self.weapon.map_or(0, |w| w.looting_level)
    }

    pub fn is_suppressed(&self, creature: CreatureId) -> bool {
        self.suppressed_notifications.contains(&creature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wear_without_unbreaking_is_the_base() {
        fn never(_: u32) -> u32 {
            panic!("no roll without unbreaking");
        }

        assert_eq!(Weapon::new(ToolClass::Sword).wear(never), 1);
        assert_eq!(Weapon::new(ToolClass::Tool).wear(never), 2);
        assert_eq!(Weapon::new(ToolClass::Other).wear(never), 0);
        assert_eq!(Weapon::new(ToolClass::Tool).unbreakable().wear(never), 0);
    }

    #[test]
    fn unbreaking_rolls_skip_points() {
        let axe = Weapon::new(ToolClass::Tool).with_unbreaking(3);

        let mut bounds = Vec::new();
        let mut rolls = [0, 2].into_iter();
        let wear = axe.wear(|bound| {
            bounds.push(bound);
            rolls.next().unwrap_or(0)
        });

        assert_eq!(wear, 1);
        assert_eq!(bounds, vec![4, 4]);
        assert_eq!(axe.wear(|_| 1), 0);
        assert_eq!(axe.wear(|_| 0), 2);
    }

    #[test]
    fn sweep_damage_scales_with_level() {
        assert_eq!(Weapon::new(ToolClass::Sword).sweep_damage(8.0), 1.0);
        assert_eq!(Weapon::new(ToolClass::Sword).with_sweeping(3).sweep_damage(8.0), 7.0);
    }

    #[test]
    fn sweep_hit_keeps_attacker_and_marks_sweep() {
        let ctx = DamageContext::new(DamageCause::EntityAttack, 30.0)
            .with_attacker(Attacker::player(CreatureId(9), PlayerId(1), Location::ORIGIN))
            .with_weapon(Weapon::new(ToolClass::Sword).with_sweeping(2))
            .suppress_notification(CreatureId(4));

        let sweep = ctx.sweep_hit(5.0);
        assert_eq!((ctx.sweeping_level(), sweep.sweeping_level()), (2, 0));

        assert!(sweep.sweep && !ctx.sweep);
        assert_eq!(sweep.cause, DamageCause::EntitySweepAttack);
        assert_eq!((sweep.raw_damage, sweep.final_damage), (5.0, 5.0));
        assert_eq!(sweep.killer(), Some(PlayerId(1)));
        assert!(sweep.is_suppressed(CreatureId(4)));
    }
}
