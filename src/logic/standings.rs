//! Division ranking table computed from completed round-robin bouts.

use crate::models::{Bout, MemberId};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Points for a win and for a tie.
pub const WIN_POINTS: u32 = 2;
pub const TIE_POINTS: u32 = 1;

/// One row of the ranking table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StandingRow {
    pub member_id: MemberId,
    pub wins: u32,
    pub ties: u32,
    pub points: u32,
    /// Entries on the member's score sheets, whatever their type (forfeit and
    /// hansoku points included).
    pub ippons: u32,
}

/// Ranking key two rows must share to be tied.
pub type StandingKey = (u32, u32, u32);

impl StandingRow {
    fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            ..Self::default()
        }
    }

    pub fn key(&self) -> StandingKey {
        (self.points, self.wins, self.ippons)
    }
}

/// Rank every member of `roster` on the completed, non-playoff bouts in `bouts`.
///
/// Sorted by points, wins and ippons (all descending), then member id ascending
/// so the order is deterministic. Members with no bouts get an all-zero row;
/// bout players missing from the roster are ignored.
pub fn compute_standings(bouts: &[Bout], roster: &[MemberId]) -> Vec<StandingRow> {
    let mut rows: HashMap<MemberId, StandingRow> = roster
        .iter()
        .map(|id| (*id, StandingRow::new(*id)))
        .collect();

    for bout in bouts.iter().filter(|b| b.is_completed() && !b.is_sudden_death) {
        for (member, sheet) in [
            (bout.player1_id, &bout.player1),
            (bout.player2_id, &bout.player2),
        ] {
            let Some(row) = rows.get_mut(&member) else {
                continue;
            };
            row.ippons = row
                .ippons
                .saturating_add(u32::try_from(sheet.points()).unwrap_or(u32::MAX));
            match bout.winner {
                Some(winner) if winner == member => row.wins += 1,
                Some(_) => {}
                None => row.ties += 1,
            }
        }
    }

    let mut table: Vec<StandingRow> = rows
        .into_values()
        .map(|mut row| {
            row.points = row.wins * WIN_POINTS + row.ties * TIE_POINTS;
            row
        })
        .collect();
    table.sort_by_key(|row| (Reverse(row.key()), row.member_id));
    table
}
