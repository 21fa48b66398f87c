//! Divisions ("groups") members compete in.

use crate::models::bout::MatchType;
use serde::{Deserialize, Serialize};

/// Short custom identifier for a division, e.g. "YUD" or "MUD".
pub type GroupId = String;

/// Reserved division for instructors; it can never be deleted.
pub const SENSEI_GROUP_ID: &str = "SEN";
pub const SENSEI_GROUP_NAME: &str = "Sensei";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: GroupId,
    pub name: String,
    /// Judge-decision division (no armour, flag rounds instead of points).
    pub is_hantei: bool,
    /// Display order, ascending.
    pub order: u32,
}

impl Group {
    pub fn new(group_id: impl Into<GroupId>, name: impl Into<String>, is_hantei: bool, order: u32) -> Self {
        Self {
            group_id: group_id.into(),
            name: name.into(),
            is_hantei,
            order,
        }
    }

    pub fn is_sensei(&self) -> bool {
        self.group_id == SENSEI_GROUP_ID
    }

    /// Scoring format new bouts in this division start with.
    pub fn default_match_type(&self) -> MatchType {
        if self.is_hantei {
            MatchType::Hantei
        } else {
            MatchType::Sanbon
        }
    }

    /// Timer length new bouts in this division start with; hantei bouts are untimed.
    pub fn default_timer_duration(&self, tournament_default: u32) -> u32 {
        if self.is_hantei {
            0
        } else {
            tournament_default
        }
    }
}
