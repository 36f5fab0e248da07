//! Kill statistics and achievements for the player credited with a death.
//!
//! Every host call here is independent: a failure is logged and the remaining
//! calls still run. None of it may abort the death transaction.

use tracing::debug;

use stack_core::{EntityKind, PlayerId};

use crate::host::{Achievement, HostAdapter, HostError, Statistic};

/// Minimum squared killer-to-victim distance for the long-range kill.
pub const SNIPER_DISTANCE_SQUARED: f64 = 2500.0;

/// One stacked kill as seen by the statistics fan-out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KillRecord {
    pub killer: PlayerId,
    pub victim: EntityKind,
    pub removed: u32,
    pub distance_squared: f64,
}

impl KillRecord {
    /// Achievements offered for this kill, in grant order. The host rejects
    /// the ones that do not apply to the victim.
    pub fn achievements(&self) -> Vec<Achievement> {
        let mut offered = vec![
            Achievement::KillAMob,
            Achievement::KillAllMobs { kind: self.victim },
        ];
        if self.distance_squared >= SNIPER_DISTANCE_SQUARED {
            offered.push(Achievement::SniperDuel);
        }
        offered
    }
}

/// Grants achievements and increments kill statistics for `record`.
pub fn dispatch<H: HostAdapter>(host: &mut H, record: &KillRecord) {
    for achievement in record.achievements() {
        isolate(
            host.grant_achievement(record.killer, achievement),
            achievement.id(),
            record.killer,
        );
    }

    for statistic in [Statistic::MobKills, Statistic::KillEntity(record.victim)] {
        isolate(
            host.increment_statistic(record.killer, statistic, record.removed),
            "statistic",
            record.killer,
        );
    }
}

/// Like [`dispatch`], but does nothing without a killer.
pub fn dispatch_for<H: HostAdapter>(
    host: &mut H,
    killer: Option<PlayerId>,
    victim: EntityKind,
    removed: u32,
    distance_squared: f64,
) {
    let Some(killer) = killer else {
        return;
    };
    dispatch(
        host,
        &KillRecord {
            killer,
            victim,
            removed,
            distance_squared,
        },
    );
}

fn isolate(result: Result<(), HostError>, what: &str, killer: PlayerId) {
    if let Err(error) = result {
        debug!(
            target: "stacker::stats",
            %killer,
            what,
            %error,
            "skipped kill statistic"
        );
    }
}
