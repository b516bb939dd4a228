//! Engine error taxonomy
//!
//! None of these are fatal: `AlreadyTransitioning` is expected and
//! frequent under continuous position updates (automated callers
//! swallow it), and the queue navigation errors surface as no-ops
//! with an optional UI hint.

use thiserror::Error;

/// Errors that can occur inside the playback engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("a deck transition is already in flight")]
    AlreadyTransitioning,
    #[error("index {index} out of range for queue of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("already at the end of the queue")]
    EndOfQueue,
    #[error("already at the start of the queue")]
    StartOfQueue,
}
