//! Engine Errors
//!
//! One error type for the orchestration surface, with a coarse kind so
//! transports can map failures onto status codes without matching every
//! variant.

use thiserror::Error;

use crate::engine::backend::ClaimError;
use crate::engine::store::BackendError;
use crate::game::session::MoveError;

/// Coarse classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request conflicts with concurrent or existing state.
    Conflict,
    /// Nothing to act on.
    NotFound,
    /// The request itself is malformed.
    Validation,
    /// The session is in the wrong state for this request.
    InvalidState,
    /// The session clock ran out.
    Expired,
    /// Server-side failure.
    Internal,
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Another request holds this player's session lock.
    #[error("Another request is already processing this player's session")]
    Busy,

    /// The player already has an unresolved session.
    #[error("An infiltration is already in progress")]
    GameAlreadyActive,

    /// No session to act on.
    #[error("No active infiltration")]
    NoActiveGame,

    /// No scan to claim a target from.
    #[error("No active scan")]
    NoActiveScan,

    /// The scan has no target at the requested index.
    #[error("Unknown target index {0}")]
    UnknownTarget(u32),

    /// The session was already resolved.
    #[error("Session already resolved")]
    AlreadyResolved,

    /// A move was rejected.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// Stored session state failed to parse.
    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Storage or collaborator failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EngineError {
    /// Classifies this error for transports and retry policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Busy | EngineError::GameAlreadyActive => ErrorKind::Conflict,
            EngineError::NoActiveGame
            | EngineError::NoActiveScan
            | EngineError::UnknownTarget(_) => ErrorKind::NotFound,
            EngineError::AlreadyResolved => ErrorKind::InvalidState,
            EngineError::Move(err) => match err {
                MoveError::Expired => ErrorKind::Expired,
                MoveError::WrongKind { .. }
                | MoveError::GuessLength { .. }
                | MoveError::DigitOutOfRange { .. }
                | MoveError::DuplicateDigit
                | MoveError::OutOfBounds { .. } => ErrorKind::Validation,
                MoveError::Resolved
                | MoveError::AlreadySolved
                | MoveError::NoGuessesRemaining
                | MoveError::AllPortsFound
                | MoveError::AlreadyProbed
                | MoveError::NoProbesRemaining
                | MoveError::AlreadySubmitted => ErrorKind::InvalidState,
            },
            EngineError::Corrupt(_) | EngineError::Backend(_) => ErrorKind::Internal,
        }
    }

    /// True when an immediate retry can succeed. Only lock contention
    /// qualifies; everything else needs new input or operator attention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Busy)
    }

    /// HTTP status a transport should answer with.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Conflict => 409,
            ErrorKind::NotFound
            | ErrorKind::Validation
            | ErrorKind::InvalidState
            | ErrorKind::Expired => 400,
            ErrorKind::Internal => 500,
        }
    }
}

impl From<ClaimError> for EngineError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::NoActiveScan => EngineError::NoActiveScan,
            ClaimError::UnknownTarget(index) => EngineError::UnknownTarget(index),
            ClaimError::Backend(err) => EngineError::Backend(err),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
