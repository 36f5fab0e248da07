//! Loot data and drop reconciliation.
//!
//! Rolling a table needs randomness and lives in the runtime. This module holds
//! the data shapes and the pure merge of computed drops with the list returned
//! by death observers.

use std::collections::HashMap;

use crate::state::{EntityKind, ItemStack};

/// Snapshot handed to the off-step loot phase. Owns everything it reads.
#[derive(Clone, Debug, PartialEq)]
pub struct LootRequest {
    pub kind: EntityKind,
    /// Multiplier for item drops (removed units, or 1).
    pub drop_amount: u32,
    /// Multiplier for experience (removed units, or 1).
    pub exp_amount: u32,
    pub looting_level: u8,
}

/// Drops and experience for one death transaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LootOutcome {
    pub drops: Vec<ItemStack>,
    pub experience: u32,
}

impl LootOutcome {
    pub fn new(drops: Vec<ItemStack>, experience: u32) -> Self {
        Self { drops, experience }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// One possible item drop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootEntry {
    pub item: String,
    pub min: u32,
    pub max: u32,
    /// Probability in `[0, 1]` that the entry drops at all.
    #[cfg_attr(feature = "serde", serde(default = "LootEntry::always"))]
    pub chance: f64,
    /// Extra items per looting level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub looting_bonus: u32,
}

impl LootEntry {
    pub fn new(item: impl Into<String>, min: u32, max: u32) -> Self {
        Self {
            item: item.into(),
            min,
            max: max.max(min),
            chance: 1.0,
            looting_bonus: 0,
        }
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    pub fn with_looting_bonus(mut self, bonus: u32) -> Self {
        self.looting_bonus = bonus;
        self
    }

    #[cfg(feature = "serde")]
    fn always() -> f64 {
        1.0
    }
}

/// Loot table of a single creature kind.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootTable {
    #[cfg_attr(feature = "serde", serde(default))]
    pub entries: Vec<LootEntry>,
    /// Inclusive experience range per unit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub experience: (u32, u32),
}

/// Loot tables keyed by creature kind.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LootTableSet {
    tables: HashMap<EntityKind, LootTable>,
}

impl LootTableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, table: LootTable) {
        self.tables.insert(kind, table);
    }

    pub fn get(&self, kind: EntityKind) -> Option<&LootTable> {
        self.tables.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Drops empty entries (zero amount, air).
pub fn filter_empty(drops: Vec<ItemStack>) -> Vec<ItemStack> {
    drops.into_iter().filter(|item| !item.is_empty()).collect()
}

/// Merges the drops an observer returned with the ones the engine computed.
///
/// Computed drops are already multiplied by the removed units. When an
/// observer changed the list and `multiply` is on, only entries the observer
/// added are multiplied by `removed`; entries matching a computed drop pass
/// through unchanged. Matching is by value and consumes each computed entry
/// at most once.
pub fn reconcile_drops(
    computed: &[ItemStack],
    observed: Vec<ItemStack>,
    removed: u32,
    multiply: bool,
) -> Vec<ItemStack> {
    let observed = filter_empty(observed);
    if !multiply || removed <= 1 || observed.as_slice() == computed {
        return observed;
    }

    let mut unmatched: Vec<Option<&ItemStack>> = computed.iter().map(Some).collect();
    observed
        .into_iter()
        .map(|item| {
            let original = unmatched
                .iter_mut()
                .find(|slot| slot.is_some_and(|c| *c == item))
                .and_then(Option::take);
            match original {
                Some(_) => item,
                None => item.multiplied(removed),
            }
        })
        .collect()
}
