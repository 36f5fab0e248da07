//! Unstack transaction: removing units from a stack.

use crate::error::StackError;
use crate::state::{EntityStack, PlayerId};

/// Outcome of [`EntityStack::unstack`].
#[derive(Clone, Debug, PartialEq)]
pub enum UnstackResult {
    /// The amount went from `before` to `after`.
    Success {
        before: u32,
        after: u32,
        instigator: Option<PlayerId>,
    },
    /// Nothing to remove (zero delta or empty stack).
    NoOp,
    /// The decrement would have left a negative amount. Unreachable after
    /// clamping; kept so callers never have to trust the arithmetic.
    Failure(StackError),
}

impl UnstackResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Units actually removed.
    pub fn removed(&self) -> u32 {
        match self {
            Self::Success { before, after, .. } => before - after,
            Self::NoOp | Self::Failure(_) => 0,
        }
    }
}

impl EntityStack {
    /// Removes up to `delta` units.
    ///
    /// The delta is clamped to the current amount. Flags are left untouched so
    /// a no-op or failed unstack never leaves a partial mutation behind.
    pub fn unstack(&mut self, delta: u32, instigator: Option<PlayerId>) -> UnstackResult {
        let before = self.amount();
        let delta = delta.min(before);
        if delta == 0 {
            return UnstackResult::NoOp;
        }

        let Some(after) = before.checked_sub(delta) else {
            return UnstackResult::Failure(StackError::UnstackOverflow {
                requested: delta,
                available: before,
            });
        };

        self.set_amount(after);
        UnstackResult::Success {
            before,
            after,
            instigator,
        }
    }
}
