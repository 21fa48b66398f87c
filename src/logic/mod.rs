//! Tournament business logic: bout scoring, hantei decisions, scheduling,
//! standings and sudden-death planning. Nothing here touches storage.

mod hantei;
mod schedule;
mod score_state;
mod standings;
mod sudden_death;

pub use hantei::{
    add_hantei_round, declare_hantei_winner, hantei_decision, undo_hantei_round, HanteiTally,
    DECIDING_ROUNDS, JUDGES,
};
pub use schedule::{
    assign_courts, circle_rounds, missing_pairings, order_for_rest, round_robin_with_rest,
};
pub use score_state::{
    add_hansoku, add_score, add_timer_time, declare_forfeit, declare_tie, declare_winner,
    point_winner, start, toggle_timer, undo_hansoku, undo_score, TIMER_EXTENSIONS,
};
pub use standings::{compute_standings, StandingKey, StandingRow, TIE_POINTS, WIN_POINTS};
pub use sudden_death::{plan_sudden_death, regular_bouts_complete, tied_cohort, TOP_RANKS};
