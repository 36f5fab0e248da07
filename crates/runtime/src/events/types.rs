use serde::{Deserialize, Serialize};

use stack_core::{EntityKind, PlayerId, StackId};

use crate::death::CommitEffects;

/// Stacks appearing, changing kind, or going away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Spawned {
        stack: StackId,
        kind: EntityKind,
        amount: u32,
    },
    /// Units left `from` and now live in `into` as another kind.
    Transformed {
        from: StackId,
        into: StackId,
        kind: EntityKind,
        amount: u32,
    },
    Removed {
        stack: StackId,
    },
}

/// Progress of death transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeathEvent {
    /// Units were removed; the commit is pending.
    Unstacked {
        stack: StackId,
        removed: u32,
        remaining: u32,
        killer: Option<PlayerId>,
    },
    /// The commit ran on the main step.
    Committed {
        stack: StackId,
        removed: u32,
        effects: CommitEffects,
    },
    /// The stack vanished before its commit ran.
    Abandoned {
        stack: StackId,
        removed: u32,
    },
}
