//! Damage inputs, the spread-damage calculator, and transaction results.

mod context;
mod result;
pub mod spread;

pub use context::{Attacker, DamageContext, ToolClass, Weapon};
pub use result::{GateRejection, TransactionOutcome, TransactionResult};
pub use spread::{SpreadInput, SpreadOutcome};
