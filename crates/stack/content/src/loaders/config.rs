//! Stacking configuration loader.

use std::path::Path;

use stack_core::StackConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for stacking rules from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their defaults. `default_unstack` must be at least 1.
    pub fn load(path: &Path) -> LoadResult<StackConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<StackConfig> {
        let config: StackConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        anyhow::ensure!(
            config.default_unstack >= 1,
            "default_unstack must be at least 1, got {}",
            config.default_unstack
        );
        Ok(config)
    }
}
