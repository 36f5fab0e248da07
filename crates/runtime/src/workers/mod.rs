//! Worker tasks that back the runtime orchestration.
//!
//! The step worker owns the [`crate::StackEngine`] and is the only task that
//! touches stacks or the host.

mod step;

pub use step::{Command, StepWorker};
