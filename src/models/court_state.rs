//! Per-court UI restore record, keyed by (tournament, court).

use crate::models::bout::{BoutId, Court};
use crate::models::error::{TournamentError, TournamentResult};
use crate::models::group::GroupId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtState {
    pub tournament_id: TournamentId,
    /// Always `Court::A` or `Court::B`.
    pub court: Court,
    /// Bout currently being fought.
    pub current_bout_id: Option<BoutId>,
    /// Bout highlighted in the court keeper's list (may differ from current).
    pub selected_bout_id: Option<BoutId>,
    /// Custom display order of divisions on this court.
    pub group_order: Vec<GroupId>,
    /// Divisions run across both courts.
    pub shared_groups: Vec<GroupId>,
}

/// Field changes for a court state; `None` leaves a field alone.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CourtStatePatch {
    pub current_bout_id: Option<BoutId>,
    pub selected_bout_id: Option<BoutId>,
    pub group_order: Option<Vec<GroupId>>,
    pub shared_groups: Option<Vec<GroupId>>,
}

impl CourtState {
    pub fn new(tournament_id: TournamentId, court: Court) -> TournamentResult<Self> {
        if court == Court::Both {
            return Err(TournamentError::InvalidCourt);
        }
        Ok(Self {
            tournament_id,
            court,
            current_bout_id: None,
            selected_bout_id: None,
            group_order: Vec::new(),
            shared_groups: Vec::new(),
        })
    }

    pub fn apply(&mut self, patch: CourtStatePatch) {
        if let Some(id) = patch.current_bout_id {
            self.current_bout_id = Some(id);
        }
        if let Some(id) = patch.selected_bout_id {
            self.selected_bout_id = Some(id);
        }
        if let Some(order) = patch.group_order {
            self.group_order = order;
        }
        if let Some(shared) = patch.shared_groups {
            self.shared_groups = shared;
        }
    }
}
