use thiserror::Error;

use crate::kernel::state::EngineState;
use crate::kernel::transition::Trigger;

pub type Result<T> = std::result::Result<T, ClassroomError>;

#[derive(Debug, Error)]
pub enum ClassroomError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("speech backend error: {0}")]
    Speech(String),

    /// The step sequence asked for an edge the transition graph does not have.
    #[error("no transition from {from:?} on {trigger:?}")]
    InvalidTransition { from: EngineState, trigger: Trigger },

    /// The session task was cancelled by its host.
    #[error("session disposed")]
    Disposed,

    /// A command reached a session whose task has already exited.
    #[error("session has ended")]
    SessionEnded,
}
