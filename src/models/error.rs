//! Error types shared by the scoring state machine, the engines and the store.

use crate::models::bout::{BoutId, BoutStatus, MatchType};
use crate::models::group::GroupId;
use crate::models::member::MemberId;
use crate::models::tournament::{TournamentId, TournamentStatus};
use thiserror::Error;

/// Coarse classification of an error, used by callers to pick a response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidInput,
    Conflict,
    Storage,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Bout not found: {0}")]
    BoutNotFound(BoutId),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Scoring or timer change on a bout that already has a result.
    #[error("Bout already completed")]
    BoutCompleted,

    #[error("Bout is {actual:?}, expected {expected:?}")]
    BoutStatus {
        expected: BoutStatus,
        actual: BoutStatus,
    },

    /// Hantei-only operation on a point-scored bout.
    #[error("Not a hantei bout")]
    NotHantei,

    #[error("Tournament is {actual:?}, expected {expected:?}")]
    TournamentStatus {
        expected: TournamentStatus,
        actual: TournamentStatus,
    },

    /// Initial schedule requested for a tournament that already has bouts.
    #[error("Bouts already generated for this tournament")]
    AlreadyScheduled,

    #[error("The Sensei group cannot be deleted")]
    ProtectedGroup,

    #[error("Invalid flag count: aka {aka}, shiro {shiro} (each 0-3, total at most 3)")]
    InvalidFlags { aka: u8, shiro: u8 },

    #[error("Timer can only be extended by 30 or 60 seconds, got {0}")]
    InvalidTimerExtension(u32),

    #[error("Invalid hantei round number: {0}")]
    InvalidRound(u32),

    /// Only point formats can be set division-wide.
    #[error("Cannot switch bouts to {0:?}")]
    InvalidMatchType(MatchType),

    #[error("Court state is kept per single court (A or B)")]
    InvalidCourt,

    #[error("Member {0} is already participating in this tournament")]
    AlreadyParticipating(MemberId),

    /// Conditional write lost against a concurrent update of the same bout.
    #[error("Bout {0} was modified concurrently")]
    Conflict(BoutId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::BoutNotFound(_)
            | TournamentError::TournamentNotFound(_)
            | TournamentError::GroupNotFound(_)
            | TournamentError::MemberNotFound(_) => ErrorKind::NotFound,
            TournamentError::BoutCompleted
            | TournamentError::BoutStatus { .. }
            | TournamentError::NotHantei
            | TournamentError::TournamentStatus { .. }
            | TournamentError::AlreadyScheduled
            | TournamentError::ProtectedGroup => ErrorKind::InvalidState,
            TournamentError::InvalidFlags { .. }
            | TournamentError::InvalidTimerExtension(_)
            | TournamentError::InvalidRound(_)
            | TournamentError::InvalidMatchType(_)
            | TournamentError::InvalidCourt
            | TournamentError::AlreadyParticipating(_) => ErrorKind::InvalidInput,
            TournamentError::Conflict(_) => ErrorKind::Conflict,
            TournamentError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
