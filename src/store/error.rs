use crate::model::SessionId;
use thiserror::Error;

/// Failures surfaced by index- and id-based store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Index outside `[0, len)`; never silently clamped
    #[error("index {index} is out of range for {len} session(s)")]
    OutOfRange { index: i64, len: usize },

    #[error("no session with id {0}")]
    UnknownSession(SessionId),

    #[error("message position {position} is out of range for {len} message(s)")]
    MessageOutOfRange { position: usize, len: usize },
}
