//! Judges' decision (hantei) scoring.
//!
//! Three judges each raise one flag per round for aka (player 1) or shiro
//! (player 2), or none. Once two rounds are in, the side with more round wins
//! takes the bout; equal round wins fall back to total flags; equal flags
//! leave the bout open for a manual decision.

use crate::logic::score_state::{complete, ensure_open, reopen};
use crate::models::{Bout, BoutStatus, HanteiRound, MatchType, Side, TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Judges per bout, and so the most flags a round can carry.
pub const JUDGES: u8 = 3;

/// Rounds needed before a decision is attempted.
pub const DECIDING_ROUNDS: usize = 2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct HanteiTally {
    pub aka_round_wins: u32,
    pub shiro_round_wins: u32,
    pub aka_flags: u32,
    pub shiro_flags: u32,
}

impl HanteiTally {
    pub fn of(rounds: &[HanteiRound]) -> Self {
        let mut tally = Self::default();
        for r in rounds {
            tally.aka_flags += u32::from(r.aka_flags);
            tally.shiro_flags += u32::from(r.shiro_flags);
            if r.aka_flags > r.shiro_flags {
                tally.aka_round_wins += 1;
            } else if r.shiro_flags > r.aka_flags {
                tally.shiro_round_wins += 1;
            }
        }
        tally
    }

    /// Round wins first, then total flags. None on a full tie.
    pub fn leader(&self) -> Option<Side> {
        use std::cmp::Ordering::*;
        match self.aka_round_wins.cmp(&self.shiro_round_wins) {
            Greater => Some(Side::Player1),
            Less => Some(Side::Player2),
            Equal => match self.aka_flags.cmp(&self.shiro_flags) {
                Greater => Some(Side::Player1),
                Less => Some(Side::Player2),
                Equal => None,
            },
        }
    }
}

/// Winner of a set of rounds, if at least two are recorded and they are not fully tied.
pub fn hantei_decision(rounds: &[HanteiRound]) -> Option<Side> {
    if rounds.len() < DECIDING_ROUNDS {
        return None;
    }
    HanteiTally::of(rounds).leader()
}

/// Record (or re-record) the flags for a round and re-evaluate the decision.
pub fn add_hantei_round(
    bout: &mut Bout,
    round: u32,
    combo: impl Into<String>,
    aka_flags: u8,
    shiro_flags: u8,
    now: DateTime<Utc>,
) -> TournamentResult<()> {
    ensure_open(bout)?;
    ensure_hantei(bout)?;
    if aka_flags > JUDGES || shiro_flags > JUDGES || aka_flags + shiro_flags > JUDGES {
        return Err(TournamentError::InvalidFlags {
            aka: aka_flags,
            shiro: shiro_flags,
        });
    }
    if round == 0 {
        return Err(TournamentError::InvalidRound(round));
    }

    let entry = HanteiRound {
        round,
        combo: combo.into(),
        aka_flags,
        shiro_flags,
    };
    match bout.hantei_rounds.iter_mut().find(|r| r.round == round) {
        Some(existing) => *existing = entry,
        None => bout.hantei_rounds.push(entry),
    }
    bout.hantei_rounds.sort_by_key(|r| r.round);

    match hantei_decision(&bout.hantei_rounds) {
        Some(side) => {
            let winner = bout.player_id(side);
            let duration = bout.elapsed_seconds(now);
            complete(bout, Some(winner), duration);
        }
        None => {
            bout.status = BoutStatus::InProgress;
            bout.winner = None;
            bout.actual_duration = None;
        }
    }
    Ok(())
}

/// Drop the last recorded round. Returns false when there are no rounds.
pub fn undo_hantei_round(bout: &mut Bout) -> bool {
    if bout.hantei_rounds.pop().is_none() {
        return false;
    }
    if bout.is_completed() {
        reopen(bout);
    } else if bout.hantei_rounds.is_empty() {
        bout.status = BoutStatus::Pending;
    } else {
        bout.status = BoutStatus::InProgress;
    }
    true
}

/// Manual decision by the head judge, overriding the flag count.
pub fn declare_hantei_winner(bout: &mut Bout, side: Side, now: DateTime<Utc>) -> TournamentResult<()> {
    ensure_hantei(bout)?;
    let winner = bout.player_id(side);
    let duration = bout.elapsed_seconds(now);
    complete(bout, Some(winner), duration);
    Ok(())
}

fn ensure_hantei(bout: &Bout) -> TournamentResult<()> {
    if bout.match_type != MatchType::Hantei {
        return Err(TournamentError::NotHantei);
    }
    Ok(())
}
