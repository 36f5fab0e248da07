//! Topic-based event bus for stack lifecycle and death events.
//!
//! The engine records events while it runs; the step worker publishes them
//! after every command or step, so subscribers never observe a half-applied
//! transaction.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{DeathEvent, LifecycleEvent};
