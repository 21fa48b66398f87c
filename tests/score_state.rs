//! Integration tests for the bout state machine: points, fouls, undo, timer, forced results.

use chrono::{DateTime, Duration, TimeZone, Utc};
use kendo_tournament::logic::{
    add_hansoku, add_score, add_timer_time, declare_forfeit, declare_tie, declare_winner, start,
    toggle_timer, undo_hansoku, undo_score,
};
use kendo_tournament::{
    Bout, BoutFormat, BoutStatus, Court, MatchType, ScoreType, Side, TournamentError,
};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 12, 9, 0, 0).unwrap()
}

fn at(seconds: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(seconds)
}

fn bout(match_type: MatchType) -> Bout {
    let format = BoutFormat {
        court: Court::A,
        match_type,
        timer_duration: 180,
    };
    Bout::new(
        Uuid::new_v4(),
        "MUD",
        (Uuid::new_v4(), Uuid::new_v4()),
        format,
        0,
        t0(),
    )
}

fn assert_sheets_aligned(b: &Bout) {
    assert_eq!(b.player1.score.len(), b.player1.score_times.len());
    assert_eq!(b.player2.score.len(), b.player2.score_times.len());
}

#[test]
fn start_runs_timer_and_only_once() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    assert_eq!(b.status, BoutStatus::InProgress);
    assert_eq!(b.timer_started_at, Some(t0()));
    assert!(b.is_timer_running());

    assert!(matches!(
        start(&mut b, at(5)),
        Err(TournamentError::BoutStatus {
            expected: BoutStatus::Pending,
            actual: BoutStatus::InProgress,
        })
    ));
    assert_eq!(b.timer_started_at, Some(t0()));
}

#[test]
fn sanbon_completes_on_second_point() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();

    add_score(&mut b, Side::Player1, ScoreType::Men, Some(12), at(12)).unwrap();
    assert_eq!(b.status, BoutStatus::InProgress);
    assert_eq!(b.winner, None);

    add_score(&mut b, Side::Player2, ScoreType::Do, Some(30), at(30)).unwrap();
    assert_eq!(b.status, BoutStatus::InProgress);

    add_score(&mut b, Side::Player1, ScoreType::Kote, Some(40), at(40)).unwrap();
    assert_eq!(b.status, BoutStatus::Completed);
    assert_eq!(b.winner, Some(b.player1_id));
    assert_eq!(b.player1.score, vec![ScoreType::Men, ScoreType::Kote]);
    assert_eq!(b.player1.score_times, vec![12, 40]);
    // Timer still running when the point landed: frozen at 0.
    assert_eq!(b.actual_duration, Some(0));
    assert_sheets_aligned(&b);
}

#[test]
fn ippon_completes_on_first_point() {
    let mut b = bout(MatchType::Ippon);
    start(&mut b, t0()).unwrap();
    add_score(&mut b, Side::Player2, ScoreType::Tsuki, None, at(7)).unwrap();
    assert_eq!(b.status, BoutStatus::Completed);
    assert_eq!(b.winner, Some(b.player2_id));
}

#[test]
fn hantei_bout_never_completes_on_points() {
    let mut b = bout(MatchType::Hantei);
    for _ in 0..3 {
        add_score(&mut b, Side::Player1, ScoreType::Men, Some(1), t0()).unwrap();
    }
    assert_eq!(b.player1.points(), 3);
    assert_ne!(b.status, BoutStatus::Completed);
    assert_eq!(b.winner, None);
}

#[test]
fn score_time_defaults_to_elapsed_whole_seconds() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    add_score(
        &mut b,
        Side::Player2,
        ScoreType::Do,
        None,
        t0() + Duration::milliseconds(25_900),
    )
    .unwrap();
    assert_eq!(b.player2.score_times, vec![25]);

    // Never started: elapsed is 0.
    let mut pending = bout(MatchType::Sanbon);
    add_score(&mut pending, Side::Player1, ScoreType::Men, None, at(99)).unwrap();
    assert_eq!(pending.player1.score_times, vec![0]);
    assert_eq!(pending.status, BoutStatus::Pending);
}

#[test]
fn points_win_while_paused_freezes_paused_time() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    add_score(&mut b, Side::Player1, ScoreType::Men, None, at(20)).unwrap();
    toggle_timer(&mut b, at(50));
    add_score(&mut b, Side::Player1, ScoreType::Men, None, at(80)).unwrap();
    assert_eq!(b.status, BoutStatus::Completed);
    assert_eq!(b.actual_duration, Some(50));
    assert_eq!(b.player1.score_times, vec![20, 50]);
}

#[test]
fn scoring_a_completed_bout_is_rejected_without_change() {
    let mut b = bout(MatchType::Ippon);
    add_score(&mut b, Side::Player1, ScoreType::Men, Some(3), t0()).unwrap();
    let before = b.clone();

    assert_eq!(
        add_score(&mut b, Side::Player2, ScoreType::Men, Some(4), t0()),
        Err(TournamentError::BoutCompleted)
    );
    assert_eq!(
        add_hansoku(&mut b, Side::Player2, Some(4), t0()),
        Err(TournamentError::BoutCompleted)
    );
    assert_eq!(b, before);
}

#[test]
fn every_second_foul_scores_for_the_opponent() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();

    add_hansoku(&mut b, Side::Player1, Some(10), at(10)).unwrap();
    assert_eq!(b.player1.hansoku, 1);
    assert!(b.player2.score.is_empty());

    add_hansoku(&mut b, Side::Player1, Some(20), at(20)).unwrap();
    assert_eq!(b.player1.hansoku, 2);
    assert_eq!(b.player2.score, vec![ScoreType::HansokuPoint]);
    assert_eq!(b.player2.score_times, vec![20]);
    assert_eq!(b.status, BoutStatus::InProgress);

    add_hansoku(&mut b, Side::Player1, Some(30), at(30)).unwrap();
    add_hansoku(&mut b, Side::Player1, Some(40), at(40)).unwrap();
    assert_eq!(b.player1.hansoku, 4);
    assert_eq!(b.player2.points(), 2);
    assert_eq!(b.status, BoutStatus::Completed);
    assert_eq!(b.winner, Some(b.player2_id));
    assert_sheets_aligned(&b);
}

#[test]
fn undoing_two_fouls_removes_the_awarded_point() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    add_score(&mut b, Side::Player2, ScoreType::Kote, Some(5), at(5)).unwrap();
    add_hansoku(&mut b, Side::Player1, Some(10), at(10)).unwrap();
    add_hansoku(&mut b, Side::Player1, Some(20), at(20)).unwrap();
    // Kote plus the hansoku point: player 2 won.
    assert_eq!(b.status, BoutStatus::Completed);

    assert!(undo_hansoku(&mut b, Side::Player1));
    assert_eq!(b.player1.hansoku, 1);
    assert_eq!(b.player2.score, vec![ScoreType::Kote]);
    assert_eq!(b.player2.score_times, vec![5]);
    assert_eq!(b.status, BoutStatus::InProgress);
    assert_eq!(b.winner, None);
    assert_eq!(b.actual_duration, None);

    assert!(undo_hansoku(&mut b, Side::Player1));
    assert_eq!(b.player1.hansoku, 0);
    assert_eq!(b.player2.score, vec![ScoreType::Kote]);
    assert_sheets_aligned(&b);
}

#[test]
fn undo_score_reopens_a_completed_bout() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    add_score(&mut b, Side::Player1, ScoreType::Men, Some(10), at(10)).unwrap();
    add_score(&mut b, Side::Player1, ScoreType::Do, Some(20), at(20)).unwrap();
    assert!(b.is_completed());

    assert!(undo_score(&mut b, Side::Player1));
    assert_eq!(b.status, BoutStatus::InProgress);
    assert_eq!(b.winner, None);
    assert_eq!(b.actual_duration, None);
    assert_eq!(b.player1.score, vec![ScoreType::Men]);
    assert_eq!(b.player1.score_times, vec![10]);
}

#[test]
fn undo_on_empty_sheet_is_a_no_op() {
    let mut b = bout(MatchType::Sanbon);
    let before = b.clone();
    assert!(!undo_score(&mut b, Side::Player1));
    assert!(!undo_hansoku(&mut b, Side::Player2));
    assert_eq!(b, before);

    // Also a no-op on a completed bout: the result stands.
    declare_tie(&mut b, t0());
    let decided = b.clone();
    assert!(!undo_score(&mut b, Side::Player2));
    assert_eq!(b, decided);
}

#[test]
fn forfeit_gives_the_other_side_the_point_and_the_win() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    declare_forfeit(&mut b, Side::Player1, at(45));
    assert_eq!(b.status, BoutStatus::Completed);
    assert_eq!(b.winner, Some(b.player2_id));
    assert_eq!(b.player2.score, vec![ScoreType::Forfeit]);
    assert_eq!(b.player2.score_times, vec![45]);
    assert!(b.player1.score.is_empty());
    assert_eq!(b.actual_duration, Some(0));
}

#[test]
fn declared_results_freeze_live_elapsed() {
    let mut b = bout(MatchType::Sanbon);
    start(&mut b, t0()).unwrap();
    declare_winner(&mut b, Side::Player2, at(95));
    assert_eq!(b.status, BoutStatus::Completed);
    assert_eq!(b.winner, Some(b.player2_id));
    assert_eq!(b.actual_duration, Some(95));

    let mut tied = bout(MatchType::Sanbon);
    start(&mut tied, t0()).unwrap();
    declare_tie(&mut tied, at(180));
    assert_eq!(tied.status, BoutStatus::Completed);
    assert_eq!(tied.winner, None);
    assert_eq!(tied.actual_duration, Some(180));
}

#[test]
fn toggle_timer_pauses_and_resumes() {
    let mut b = bout(MatchType::Sanbon);

    // Not started: nothing to toggle.
    toggle_timer(&mut b, t0());
    assert_eq!(b.timer_started_at, None);
    assert_eq!(b.timer_paused_at, None);

    start(&mut b, t0()).unwrap();
    toggle_timer(&mut b, at(30));
    assert_eq!(b.timer_paused_at, Some(30));
    assert_eq!(b.timer_started_at, None);
    assert_eq!(b.elapsed_seconds(at(100)), 30);
    assert_eq!(b.remaining_seconds(at(100)), 150);

    toggle_timer(&mut b, at(100));
    assert_eq!(b.timer_paused_at, None);
    assert_eq!(b.timer_started_at, Some(at(70)));
    assert_eq!(b.elapsed_seconds(at(110)), 40);
}

#[test]
fn timer_extensions_are_limited_to_thirty_or_sixty() {
    let mut b = bout(MatchType::Sanbon);
    add_timer_time(&mut b, 30).unwrap();
    assert_eq!(b.timer_duration, 210);
    add_timer_time(&mut b, 60).unwrap();
    assert_eq!(b.timer_duration, 270);

    assert_eq!(
        add_timer_time(&mut b, 45),
        Err(TournamentError::InvalidTimerExtension(45))
    );
    assert_eq!(b.timer_duration, 270);

    declare_tie(&mut b, t0());
    assert_eq!(add_timer_time(&mut b, 30), Err(TournamentError::BoutCompleted));
    assert_eq!(
        add_timer_time(&mut b, 15),
        Err(TournamentError::InvalidTimerExtension(15))
    );
}
