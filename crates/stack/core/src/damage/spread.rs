//! Spread-damage calculator.
//!
//! Maps one hit onto a stack: how many units die and how much health the next
//! unit keeps.
//!
//! # Formula
//!
//! ```text
//! spread off or instant kill:
//!     units    = min(stack, instant ? stack : default_unstack)
//!     residual = 0
//! otherwise:
//!     effective = sweeping > 0 ? 1 + damage * sweeping / (sweeping + 1) : damage
//!     leftover  = max(0, effective - current_health)
//!     units     = min(stack, 1 + floor(leftover / max_health))
//!     residual  = leftover mod max_health
//! ```

/// Inputs of a single spread-damage evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpreadInput {
    pub final_damage: f64,
    pub stack_amount: u32,
    pub max_health: f64,
    /// Health left on the unit that takes the hit first.
    pub current_health: f64,
    pub instant_kill: bool,
    pub spread_damage: bool,
    pub default_unstack: u32,
    /// Sweeping-strike enchantment level of the weapon, 0 when absent.
    pub sweeping_level: u8,
}

/// Result of [`calculate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpreadOutcome {
    pub units_to_kill: u32,
    /// Damage already dealt to the next surviving unit, in `[0, max_health)`.
    pub residual: f64,
}

impl SpreadOutcome {
    /// Health the next surviving unit is left with.
    pub fn remaining_health(&self, max_health: f64) -> f64 {
        max_health - self.residual
    }
}

/// Damage after the sweeping-strike multiplier.
pub fn effective_damage(final_damage: f64, sweeping_level: u8) -> f64 {
    if sweeping_level == 0 {
        return final_damage;
    }
    let level = f64::from(sweeping_level);
    1.0 + final_damage * (level / (level + 1.0))
}

pub fn calculate(input: SpreadInput) -> SpreadOutcome {
    let stack = input.stack_amount;

    if !input.spread_damage || input.instant_kill {
        let units = if input.instant_kill {
            stack
        } else {
            input.default_unstack
        };
        return SpreadOutcome {
            units_to_kill: units.min(stack),
            residual: 0.0,
        };
    }

    if input.max_health.is_nan() || input.max_health <= 0.0 {
        return SpreadOutcome {
            units_to_kill: 1.min(stack),
            residual: 0.0,
        };
    }

    let damage = effective_damage(input.final_damage.max(0.0), input.sweeping_level);
    let leftover = (damage - input.current_health).max(0.0);
    if !leftover.is_finite() {
        return SpreadOutcome {
            units_to_kill: stack,
            residual: 0.0,
        };
    }

    // `as` saturates, so absurd damage still clamps to the stack size.
    let extra = (leftover / input.max_health).floor() as u32;
    let units_to_kill = extra.saturating_add(1).min(stack);
    let residual = leftover % input.max_health;

    SpreadOutcome {
        units_to_kill,
        residual,
    }
}
