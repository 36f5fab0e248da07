//! Off-step loot evaluation.
//!
//! A [`LootProvider`] turns a [`LootRequest`] snapshot into drops and
//! experience. Providers run on the blocking pool, so they must not touch the
//! stack registry or the host.

mod table;

pub use table::TableLootProvider;

use stack_core::{EntityKind, LootOutcome, LootRequest};

/// Loot evaluation failures. The death transaction logs these and commits with
/// empty loot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LootError {
    #[error("no loot table for {0}")]
    MissingTable(EntityKind),

    #[error("invalid loot table for {kind}: {reason}")]
    InvalidTable { kind: EntityKind, reason: String },
}

/// Computes loot for a removed group of units.
pub trait LootProvider: Send + Sync {
    fn roll(&self, request: &LootRequest) -> Result<LootOutcome, LootError>;
}

/// Provider that never drops anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLoot;

impl LootProvider for NoLoot {
    fn roll(&self, _request: &LootRequest) -> Result<LootOutcome, LootError> {
        Ok(LootOutcome::empty())
    }
}

/// Provider returning the same outcome for every request, multiplied by the
/// request amounts.
#[derive(Clone, Debug, Default)]
pub struct FixedLoot {
    outcome: LootOutcome,
}

impl FixedLoot {
    pub fn new(outcome: LootOutcome) -> Self {
        Self { outcome }
    }
}

impl LootProvider for FixedLoot {
    fn roll(&self, request: &LootRequest) -> Result<LootOutcome, LootError> {
        let drops = self
            .outcome
            .drops
            .iter()
            .map(|item| item.multiplied(request.drop_amount))
            .collect();
        let experience = self.outcome.experience.saturating_mul(request.exp_amount);
        Ok(LootOutcome::new(drops, experience))
    }
}
