use rand::Rng;

use stack_core::{ItemStack, LootEntry, LootOutcome, LootRequest, LootTable, LootTableSet};

use super::{LootError, LootProvider};

/// Rolls per-kind loot tables with the thread-local RNG.
///
/// Counts are rolled once per request and then multiplied by the request's
/// amounts, matching how a stacked kill multiplies a single unit's loot.
#[derive(Clone, Debug, Default)]
pub struct TableLootProvider {
    tables: LootTableSet,
    /// Kinds without a table drop nothing instead of failing.
    lenient: bool,
}

impl TableLootProvider {
    pub fn new(tables: LootTableSet) -> Self {
        Self {
            tables,
            lenient: false,
        }
    }

    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn tables(&self) -> &LootTableSet {
        &self.tables
    }

    fn roll_table(
        table: &LootTable,
        request: &LootRequest,
        rng: &mut impl Rng,
    ) -> Result<LootOutcome, LootError> {
        let mut drops = Vec::with_capacity(table.entries.len());
        for entry in &table.entries {
            validate(entry).map_err(|reason| LootError::InvalidTable {
                kind: request.kind,
                reason,
            })?;
            if entry.chance < 1.0 && !rng.gen_bool(entry.chance.max(0.0)) {
                continue;
            }
            let base = rng.gen_range(entry.min..=entry.max);
            let bonus = entry
                .looting_bonus
                .saturating_mul(u32::from(request.looting_level));
            let count = base.saturating_add(bonus);
            if count == 0 {
                continue;
            }
            drops.push(ItemStack::new(entry.item.clone(), count).multiplied(request.drop_amount));
        }

        let (min_exp, max_exp) = table.experience;
        if max_exp < min_exp {
            return Err(LootError::InvalidTable {
                kind: request.kind,
                reason: format!("experience range {min_exp}..={max_exp} is empty"),
            });
        }
        let experience = rng
            .gen_range(min_exp..=max_exp)
            .saturating_mul(request.exp_amount);

        Ok(LootOutcome::new(drops, experience))
    }
}

fn validate(entry: &LootEntry) -> Result<(), String> {
    if entry.max < entry.min {
        return Err(format!("`{}` has max {} below min {}", entry.item, entry.max, entry.min));
    }
    if !(0.0..=1.0).contains(&entry.chance) {
        return Err(format!("`{}` has chance {} outside [0, 1]", entry.item, entry.chance));
    }
    Ok(())
}

impl LootProvider for TableLootProvider {
    fn roll(&self, request: &LootRequest) -> Result<LootOutcome, LootError> {
        match self.tables.get(request.kind) {
            Some(table) => Self::roll_table(table, request, &mut rand::thread_rng()),
            None if self.lenient => Ok(LootOutcome::empty()),
            None => Err(LootError::MissingTable(request.kind)),
        }
    }
}
