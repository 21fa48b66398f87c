//! Bout operations against the store: read, transition, conditional write,
//! then the post-commit playoff check.

use super::playoffs::generate_sudden_death;
use crate::clock::Clock;
use crate::logic;
use crate::models::{Bout, BoutId, ScoreType, Side, TournamentError, TournamentResult};
use crate::store::TournamentStore;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

/// Result of a bout operation: the bout as committed, plus any sudden-death
/// bouts its completion produced.
#[derive(Clone, Debug, Serialize)]
pub struct BoutUpdate {
    pub bout: Bout,
    pub sudden_death: Vec<Bout>,
}

/// Whether an operation records a result and so may trigger playoffs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Effect {
    Scoring,
    Bookkeeping,
}

#[derive(Clone)]
pub struct BoutEngine {
    store: Arc<dyn TournamentStore>,
    clock: Arc<dyn Clock>,
}

impl BoutEngine {
    pub fn new(store: Arc<dyn TournamentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn bout(&self, id: BoutId) -> TournamentResult<Bout> {
        self.store.bout(id)?.ok_or(TournamentError::BoutNotFound(id))
    }

    /// Pending -> InProgress with the timer running.
    pub fn start(&self, id: BoutId) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Bookkeeping, |bout, now| {
            logic::start(bout, now).map(|_| true)
        })
    }

    pub fn add_score(
        &self,
        id: BoutId,
        side: Side,
        kind: ScoreType,
        elapsed: Option<u32>,
    ) -> TournamentResult<BoutUpdate> {
        debug!("Bout {}: {:?} scores {:?}", id, side, kind);
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::add_score(bout, side, kind, elapsed, now).map(|_| true)
        })
    }

    pub fn add_hansoku(
        &self,
        id: BoutId,
        side: Side,
        elapsed: Option<u32>,
    ) -> TournamentResult<BoutUpdate> {
        debug!("Bout {}: hansoku for {:?}", id, side);
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::add_hansoku(bout, side, elapsed, now).map(|_| true)
        })
    }

    pub fn undo_score(&self, id: BoutId, side: Side) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Bookkeeping, |bout, _| {
            Ok(logic::undo_score(bout, side))
        })
    }

    pub fn undo_hansoku(&self, id: BoutId, side: Side) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Bookkeeping, |bout, _| {
            Ok(logic::undo_hansoku(bout, side))
        })
    }

    pub fn toggle_timer(&self, id: BoutId) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Bookkeeping, |bout, now| {
            let before = (bout.timer_started_at, bout.timer_paused_at);
            logic::toggle_timer(bout, now);
            Ok(before != (bout.timer_started_at, bout.timer_paused_at))
        })
    }

    pub fn add_timer_time(&self, id: BoutId, seconds: u32) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Bookkeeping, |bout, _| {
            logic::add_timer_time(bout, seconds).map(|_| true)
        })
    }

    pub fn declare_winner(&self, id: BoutId, side: Side) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::declare_winner(bout, side, now);
            Ok(true)
        })
    }

    pub fn declare_tie(&self, id: BoutId) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::declare_tie(bout, now);
            Ok(true)
        })
    }

    pub fn declare_forfeit(&self, id: BoutId, forfeiting: Side) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::declare_forfeit(bout, forfeiting, now);
            Ok(true)
        })
    }

    pub fn add_hantei_round(
        &self,
        id: BoutId,
        round: u32,
        combo: &str,
        aka_flags: u8,
        shiro_flags: u8,
    ) -> TournamentResult<BoutUpdate> {
        debug!(
            "Bout {}: hantei round {} aka {} shiro {}",
            id, round, aka_flags, shiro_flags
        );
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::add_hantei_round(bout, round, combo, aka_flags, shiro_flags, now).map(|_| true)
        })
    }

    pub fn undo_hantei_round(&self, id: BoutId) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Bookkeeping, |bout, _| {
            Ok(logic::undo_hantei_round(bout))
        })
    }

    pub fn declare_hantei_winner(&self, id: BoutId, side: Side) -> TournamentResult<BoutUpdate> {
        self.apply(id, Effect::Scoring, |bout, now| {
            logic::declare_hantei_winner(bout, side, now).map(|_| true)
        })
    }

    /// Read the bout, run `op` on a copy and write it back conditionally.
    /// `op` returns false for a no-op, in which case nothing is written.
    /// Scoring operations that leave the bout completed then run the playoff check.
    fn apply<F>(&self, id: BoutId, effect: Effect, op: F) -> TournamentResult<BoutUpdate>
    where
        F: FnOnce(&mut Bout, DateTime<Utc>) -> TournamentResult<bool>,
    {
        let mut bout = self.bout(id)?;
        let now = self.clock.now();
        if !op(&mut bout, now)? {
            return Ok(BoutUpdate {
                bout,
                sudden_death: Vec::new(),
            });
        }
        bout.updated_at = now;
        bout.revision = self.store.replace_bout(&bout)?;

        let sudden_death = if effect == Effect::Scoring && bout.is_completed() {
            self.after_completion(&bout, now)
        } else {
            Vec::new()
        };
        Ok(BoutUpdate { bout, sudden_death })
    }

    /// Post-commit hook. The bout result is already stored, so a failure here is
    /// logged and left for the next completion (or an explicit recheck) to repair.
    fn after_completion(&self, bout: &Bout, now: DateTime<Utc>) -> Vec<Bout> {
        if bout.is_sudden_death {
            return Vec::new();
        }
        match generate_sudden_death(self.store.as_ref(), bout.tournament_id, &bout.group_id, now) {
            Ok(created) => created,
            Err(e) => {
                warn!(
                    "Sudden-death check failed for division {} after bout {}: {}",
                    bout.group_id, bout.id, e
                );
                Vec::new()
            }
        }
    }
}
