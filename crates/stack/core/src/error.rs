//! Error types for stack bookkeeping.
//!
//! Gate rejections inside a death transaction are not errors; they are
//! reported through [`GateRejection`](crate::GateRejection). The errors here
//! cover registry misuse and invariant violations.

use crate::state::{CreatureId, StackId};

/// Severity level of an error, used for logging and recovery decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Invalid input, reject without retry.
    Validation,
    /// State disagreed with an expectation; the caller may retry later.
    Recoverable,
    /// Broken invariant. Indicates a bug.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Recoverable => "recoverable",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StackError {
    #[error("stack amount must be positive, got {amount}")]
    InvalidAmount { amount: u32 },

    #[error("stack health must be positive, got {health}")]
    InvalidHealth { health: f64 },

    #[error("{creature} already represents {stack}")]
    AlreadyStacked { creature: CreatureId, stack: StackId },

    #[error("unknown {0}")]
    UnknownStack(StackId),

    #[error("unstack of {requested} exceeds stack amount {available}")]
    UnstackOverflow { requested: u32, available: u32 },
}

impl StackError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidAmount { .. } | Self::InvalidHealth { .. } => ErrorSeverity::Validation,
            Self::AlreadyStacked { .. } | Self::UnknownStack(_) => ErrorSeverity::Recoverable,
            Self::UnstackOverflow { .. } => ErrorSeverity::Internal,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "STACK_INVALID_AMOUNT",
            Self::InvalidHealth { .. } => "STACK_INVALID_HEALTH",
            Self::AlreadyStacked { .. } => "STACK_ALREADY_STACKED",
            Self::UnknownStack(_) => "STACK_UNKNOWN",
            Self::UnstackOverflow { .. } => "STACK_UNSTACK_OVERFLOW",
        }
    }
}
