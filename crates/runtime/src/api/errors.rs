//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and stack bookkeeping so clients
//! can bubble them up with consistent context. Death transactions never
//! return errors: their rejections are [`stack_core::GateRejection`] values.

use thiserror::Error;
use tokio::sync::oneshot;

use stack_core::{CreatureId, ErrorSeverity, StackError, StackId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("step worker command channel closed")]
    CommandChannelClosed,

    #[error("step worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("step worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a host adapter before building")]
    MissingHost,

    #[error("creature {0} does not exist")]
    UnknownCreature(CreatureId),

    #[error("stack {0} does not exist")]
    UnknownStack(StackId),

    #[error(transparent)]
    Stack(#[from] StackError),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCreature(_) | Self::UnknownStack(_) | Self::MissingHost => {
                ErrorSeverity::Validation
            }
            Self::Stack(error) => error.severity(),
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }
}
