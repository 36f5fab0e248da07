//! Data-driven stacking content and loaders.
//!
//! This crate reads the files a server operator edits:
//! - Stacking rules (TOML, see `data/config.toml`)
//! - Per-kind loot tables (RON, see `data/loot_tables.ron`)
//!
//! All loaders deserialize `stack-core` types directly with serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, LootTableLoader};
