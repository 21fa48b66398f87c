//! Bout (a single match between two members), its score sheet and timer fields.

use crate::models::group::GroupId;
use crate::models::member::MemberId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bout.
pub type BoutId = Uuid;

/// Which side of the bout: player 1 wears red (aka), player 2 white (shiro).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Player1,
    Player2,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

/// Court a bout is played on. `Both` is used for divisions shared by the two courts.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Court {
    #[default]
    A,
    B,
    #[serde(rename = "A+B")]
    Both,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoutStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Scoring format of a bout.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Best of three points.
    #[default]
    Sanbon,
    /// First point wins.
    Ippon,
    /// Judges' flag decision over rounds.
    Hantei,
}

impl MatchType {
    /// Number of points that ends the bout, or `None` for judge-decided bouts.
    pub fn target_points(self) -> Option<usize> {
        match self {
            MatchType::Sanbon => Some(2),
            MatchType::Ippon => Some(1),
            MatchType::Hantei => None,
        }
    }
}

/// One entry on a player's score sheet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreType {
    Men,
    Kote,
    Do,
    Tsuki,
    /// Awarded to the opponent for every second foul.
    HansokuPoint,
    /// Awarded to the remaining player when the other forfeits.
    Forfeit,
}

/// Score sheet for one side: points in order, the elapsed second each was
/// scored at, and the foul counter.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SideScore {
    pub score: Vec<ScoreType>,
    pub score_times: Vec<u32>,
    pub hansoku: u32,
}

impl SideScore {
    /// Number of points on the sheet (every entry counts, whatever its type).
    pub fn points(&self) -> usize {
        self.score.len()
    }

    pub fn push(&mut self, kind: ScoreType, at_seconds: u32) {
        self.score.push(kind);
        self.score_times.push(at_seconds);
    }

    pub fn pop(&mut self) -> Option<(ScoreType, u32)> {
        let kind = self.score.pop()?;
        let at = self.score_times.pop().unwrap_or_default();
        Some((kind, at))
    }

    /// Remove the most recent entry of the given kind. Returns false if none was present.
    pub fn remove_last(&mut self, kind: ScoreType) -> bool {
        match self.score.iter().rposition(|k| *k == kind) {
            Some(idx) => {
                self.score.remove(idx);
                if idx < self.score_times.len() {
                    self.score_times.remove(idx);
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.score.clear();
        self.score_times.clear();
        self.hansoku = 0;
    }
}

/// Flags raised by the three judges for one hantei round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HanteiRound {
    pub round: u32,
    /// Technique sequence shown in the round, e.g. "K-M".
    pub combo: String,
    /// Flags for player 1 (aka).
    pub aka_flags: u8,
    /// Flags for player 2 (shiro).
    pub shiro_flags: u8,
}

/// Court, scoring format and timer length a bout is created with.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoutFormat {
    pub court: Court,
    pub match_type: MatchType,
    /// Countdown length in seconds; 0 means untimed.
    pub timer_duration: u32,
}

/// A single bout. Regular round-robin bouts and sudden-death playoffs share
/// this record; `is_sudden_death` tells them apart.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bout {
    pub id: BoutId,
    pub tournament_id: TournamentId,
    pub group_id: GroupId,
    pub player1_id: MemberId,
    pub player2_id: MemberId,
    pub court: Court,
    pub status: BoutStatus,
    pub match_type: MatchType,
    pub player1: SideScore,
    pub player2: SideScore,
    pub hantei_rounds: Vec<HanteiRound>,
    /// None while undecided, and for a declared tie.
    pub winner: Option<MemberId>,
    pub timer_duration: u32,
    /// Wall-clock start of the running timer. Never set together with `timer_paused_at`.
    pub timer_started_at: Option<DateTime<Utc>>,
    /// Elapsed whole seconds captured when the timer was paused.
    pub timer_paused_at: Option<u32>,
    /// Elapsed seconds frozen when the bout completed.
    pub actual_duration: Option<u32>,
    /// 1 for round-robin bouts, 2 for sudden-death playoffs.
    pub round: u32,
    pub is_sudden_death: bool,
    /// Global display/sequence position within the tournament.
    pub order_index: u32,
    /// Bumped by the store on every successful write.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl Bout {
    pub fn new(
        tournament_id: TournamentId,
        group_id: impl Into<GroupId>,
        (player1_id, player2_id): (MemberId, MemberId),
        format: BoutFormat,
        order_index: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            group_id: group_id.into(),
            player1_id,
            player2_id,
            court: format.court,
            status: BoutStatus::Pending,
            match_type: format.match_type,
            player1: SideScore::default(),
            player2: SideScore::default(),
            hantei_rounds: Vec::new(),
            winner: None,
            timer_duration: format.timer_duration,
            timer_started_at: None,
            timer_paused_at: None,
            actual_duration: None,
            round: 1,
            is_sudden_death: false,
            order_index,
            revision: 0,
            updated_at: now,
        }
    }

    /// Mark this bout as a tie-break playoff.
    pub fn into_sudden_death(mut self) -> Self {
        self.round = 2;
        self.is_sudden_death = true;
        self
    }

    pub fn side(&self, side: Side) -> &SideScore {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideScore {
        match side {
            Side::Player1 => &mut self.player1,
            Side::Player2 => &mut self.player2,
        }
    }

    pub fn player_id(&self, side: Side) -> MemberId {
        match side {
            Side::Player1 => self.player1_id,
            Side::Player2 => self.player2_id,
        }
    }

    /// Which side a member plays on, if they are in this bout.
    pub fn side_of(&self, member: MemberId) -> Option<Side> {
        if member == self.player1_id {
            Some(Side::Player1)
        } else if member == self.player2_id {
            Some(Side::Player2)
        } else {
            None
        }
    }

    /// Unordered pairing identity: the two member ids, smaller first.
    pub fn pair_key(&self) -> (MemberId, MemberId) {
        pair_key(self.player1_id, self.player2_id)
    }

    pub fn is_completed(&self) -> bool {
        self.status == BoutStatus::Completed
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer_started_at.is_some() && self.timer_paused_at.is_none()
    }

    /// Elapsed whole seconds: the paused snapshot, the live running time, or 0.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u32 {
        if let Some(paused) = self.timer_paused_at {
            return paused;
        }
        match self.timer_started_at {
            Some(started) => {
                let millis = (now - started).num_milliseconds().max(0);
                u32::try_from(millis / 1000).unwrap_or(u32::MAX)
            }
            None => 0,
        }
    }

    /// Seconds left on the countdown (0 for untimed bouts or when time is up).
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u32 {
        self.timer_duration
            .saturating_sub(self.elapsed_seconds(now))
    }
}

/// Unordered pair identity for two members, smaller id first.
pub fn pair_key(a: MemberId, b: MemberId) -> (MemberId, MemberId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
