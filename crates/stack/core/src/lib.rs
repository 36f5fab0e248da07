//! Pure stacking rules shared by the runtime and content loaders.
//!
//! `stack-core` defines how a lethal hit maps onto a stack of identical
//! creatures: the flag set carried by every stack, the spread-damage
//! calculator, the unstack transaction, drop reconciliation and kind
//! transformations. Nothing here talks to the host or schedules work; the
//! death transaction that drives these rules lives in `stack-runtime`.
pub mod config;
pub mod damage;
pub mod error;
pub mod flags;
pub mod loot;
pub mod state;
pub mod transform;
pub mod unstack;

pub use config::{StackConfig, TransformConfig};
pub use damage::{
    Attacker, DamageContext, GateRejection, SpreadInput, SpreadOutcome, TransactionOutcome,
    ToolClass, TransactionResult, Weapon,
};
pub use error::{ErrorSeverity, StackError};
pub use flags::{EntityFlag, FlagKind, FlagSet};
pub use loot::{LootEntry, LootOutcome, LootRequest, LootTable, LootTableSet};
pub use state::{
    CreatureId, DamageCause, Difficulty, EntityKind, EntityStack, ItemStack, Location, PlayerId,
    SpawnCause, StackId, StackRef, StackRegistry,
};
pub use transform::{TransformChance, TransformRule};
pub use unstack::UnstackResult;
