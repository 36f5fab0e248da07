//! Loot table loader.

use std::path::Path;

use stack_core::LootTableSet;

use crate::loaders::{LoadResult, read_file};

/// Loader for per-kind loot tables from RON files.
pub struct LootTableLoader;

impl LootTableLoader {
    /// Load loot tables from a RON map of kind to table.
    pub fn load(path: &Path) -> LoadResult<LootTableSet> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<LootTableSet> {
        let tables: LootTableSet = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse loot tables RON: {}", e))?;
        Ok(tables)
    }
}
