//! Loads every content file from one data directory.

use std::path::{Path, PathBuf};

use stack_core::{LootTableSet, StackConfig};

use crate::loaders::{ConfigLoader, LoadResult, LootTableLoader};

/// Resolves content files relative to a data directory.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const LOOT_FILE: &'static str = "loot_tables.ron";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    pub fn load_config(&self) -> LoadResult<StackConfig> {
        ConfigLoader::load(&self.data_dir.join(Self::CONFIG_FILE))
    }

    pub fn load_loot_tables(&self) -> LoadResult<LootTableSet> {
        LootTableLoader::load(&self.data_dir.join(Self::LOOT_FILE))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use stack_core::EntityKind;

    use super::*;

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_content_loads() {
        let factory = ContentFactory::bundled();
        let config = factory.load_config().unwrap();
        let tables = factory.load_loot_tables().unwrap();

        assert!(config.enabled);
        assert!(tables.get(EntityKind::Zombie).is_some());
    }

    #[test]
    fn reads_from_custom_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ContentFactory::CONFIG_FILE), "multiply_exp = false")
            .unwrap();
        std::fs::write(dir.path().join(ContentFactory::LOOT_FILE), "{}").unwrap();

        let factory = ContentFactory::new(dir.path());
        assert!(!factory.load_config().unwrap().multiply_exp);
        assert!(factory.load_loot_tables().unwrap().is_empty());
    }
}
