//! Dojo members and their tournament participation.

use crate::models::group::GroupId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a member (used in bouts and lookups).
pub type MemberId = Uuid;

/// Unique identifier for a participant row.
pub type ParticipantId = Uuid;

/// A member of the dojo roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: String,
    /// Division the member normally competes in.
    pub group_id: GroupId,
    pub rank: Option<String>,
    pub is_guest: bool,
}

impl Member {
    /// Create a new member. The id is fixed for life; the division can change.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        group_id: impl Into<GroupId>,
        is_guest: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            group_id: group_id.into(),
            rank: None,
            is_guest,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A member entered into a tournament, competing in one division.
/// At most one row exists per (tournament, member).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub tournament_id: TournamentId,
    pub member_id: MemberId,
    pub group_id: GroupId,
}

impl Participant {
    pub fn new(tournament_id: TournamentId, member_id: MemberId, group_id: impl Into<GroupId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            member_id,
            group_id: group_id.into(),
        }
    }
}
