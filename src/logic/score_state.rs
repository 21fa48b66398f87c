//! Bout state machine: scoring, fouls, timer and forced results for one bout.
//!
//! Every function validates first and only then mutates, so a rejected call
//! leaves the bout untouched. None of these functions touch storage.
//!
//! Status moves `Pending -> InProgress -> Completed`. Starting the timer is the
//! only way out of `Pending` other than a result; undo operations may move a
//! `Completed` bout back to `InProgress`.

use crate::models::{
    Bout, BoutStatus, MemberId, ScoreType, Side, TournamentError, TournamentResult,
};
use chrono::{DateTime, Duration, Utc};

/// Timer extensions a court keeper may add, in seconds.
pub const TIMER_EXTENSIONS: [u32; 2] = [30, 60];

/// Start the bout: Pending -> InProgress, timer running from `now`.
pub fn start(bout: &mut Bout, now: DateTime<Utc>) -> TournamentResult<()> {
    if bout.status != BoutStatus::Pending {
        return Err(TournamentError::BoutStatus {
            expected: BoutStatus::Pending,
            actual: bout.status,
        });
    }
    bout.status = BoutStatus::InProgress;
    bout.timer_started_at = Some(now);
    bout.timer_paused_at = None;
    Ok(())
}

/// Record a point for `side`. `elapsed` defaults to the bout's current elapsed time.
///
/// Completes the bout when the side reaches the format's target (2 for sanbon,
/// 1 for ippon). Hantei bouts never complete on points.
pub fn add_score(
    bout: &mut Bout,
    side: Side,
    kind: ScoreType,
    elapsed: Option<u32>,
    now: DateTime<Utc>,
) -> TournamentResult<()> {
    ensure_open(bout)?;
    let at = elapsed.unwrap_or_else(|| bout.elapsed_seconds(now));
    bout.side_mut(side).push(kind, at);
    settle_on_points(bout);
    Ok(())
}

/// Record a foul for `side`. Every second foul gives the opponent a hansoku point.
pub fn add_hansoku(
    bout: &mut Bout,
    side: Side,
    elapsed: Option<u32>,
    now: DateTime<Utc>,
) -> TournamentResult<()> {
    ensure_open(bout)?;
    let at = elapsed.unwrap_or_else(|| bout.elapsed_seconds(now));
    let fouls = {
        let own = bout.side_mut(side);
        own.hansoku += 1;
        own.hansoku
    };
    if fouls % 2 == 0 {
        bout.side_mut(side.opponent())
            .push(ScoreType::HansokuPoint, at);
    }
    settle_on_points(bout);
    Ok(())
}

/// Remove the last point of `side`. Returns false (and changes nothing) when
/// the side has no points.
pub fn undo_score(bout: &mut Bout, side: Side) -> bool {
    if bout.side_mut(side).pop().is_none() {
        return false;
    }
    reopen(bout);
    true
}

/// Take back the last foul of `side`. If that foul was an even one, the
/// hansoku point it gave the opponent is removed too. Returns false when the
/// side has no fouls.
pub fn undo_hansoku(bout: &mut Bout, side: Side) -> bool {
    let fouls = bout.side(side).hansoku;
    if fouls == 0 {
        return false;
    }
    if fouls % 2 == 0 {
        bout.side_mut(side.opponent())
            .remove_last(ScoreType::HansokuPoint);
    }
    bout.side_mut(side).hansoku = fouls - 1;
    reopen(bout);
    true
}

/// Pause a running timer, or resume a paused one. Does nothing otherwise.
pub fn toggle_timer(bout: &mut Bout, now: DateTime<Utc>) {
    if let Some(paused) = bout.timer_paused_at {
        bout.timer_started_at = Some(now - Duration::seconds(i64::from(paused)));
        bout.timer_paused_at = None;
    } else if bout.timer_started_at.is_some() {
        bout.timer_paused_at = Some(bout.elapsed_seconds(now));
        bout.timer_started_at = None;
    }
}

/// Extend the countdown by 30 or 60 seconds.
pub fn add_timer_time(bout: &mut Bout, seconds: u32) -> TournamentResult<()> {
    if !TIMER_EXTENSIONS.contains(&seconds) {
        return Err(TournamentError::InvalidTimerExtension(seconds));
    }
    ensure_open(bout)?;
    bout.timer_duration += seconds;
    Ok(())
}

/// Force a result for `side` regardless of the score sheet.
pub fn declare_winner(bout: &mut Bout, side: Side, now: DateTime<Utc>) {
    let winner = bout.player_id(side);
    let duration = bout.elapsed_seconds(now);
    complete(bout, Some(winner), duration);
}

/// Force a draw: completed with no winner.
pub fn declare_tie(bout: &mut Bout, now: DateTime<Utc>) {
    let duration = bout.elapsed_seconds(now);
    complete(bout, None, duration);
}

/// `forfeiting` withdraws; the other side gets a forfeit point and the win.
pub fn declare_forfeit(bout: &mut Bout, forfeiting: Side, now: DateTime<Utc>) {
    let remaining = forfeiting.opponent();
    let at = bout.elapsed_seconds(now);
    bout.side_mut(remaining).push(ScoreType::Forfeit, at);
    let winner = bout.player_id(remaining);
    let duration = frozen_on_points(bout);
    complete(bout, Some(winner), duration);
}

/// Side that has reached the point target, player 1 checked first.
pub fn point_winner(bout: &Bout) -> Option<Side> {
    let target = bout.match_type.target_points()?;
    if bout.player1.points() >= target {
        Some(Side::Player1)
    } else if bout.player2.points() >= target {
        Some(Side::Player2)
    } else {
        None
    }
}

pub(crate) fn ensure_open(bout: &Bout) -> TournamentResult<()> {
    if bout.is_completed() {
        return Err(TournamentError::BoutCompleted);
    }
    Ok(())
}

pub(crate) fn complete(bout: &mut Bout, winner: Option<MemberId>, duration: u32) {
    bout.status = BoutStatus::Completed;
    bout.winner = winner;
    bout.actual_duration = Some(duration);
}

/// Completed -> InProgress, dropping the result.
pub(crate) fn reopen(bout: &mut Bout) {
    if bout.is_completed() {
        bout.status = BoutStatus::InProgress;
        bout.winner = None;
        bout.actual_duration = None;
    }
}

fn settle_on_points(bout: &mut Bout) {
    if let Some(side) = point_winner(bout) {
        let winner = bout.player_id(side);
        let duration = frozen_on_points(bout);
        complete(bout, Some(winner), duration);
    }
}

/// Duration recorded when a bout ends on the score sheet: the paused
/// snapshot, or 0 when the timer was not paused at that moment.
fn frozen_on_points(bout: &Bout) -> u32 {
    bout.timer_paused_at.unwrap_or(0)
}
