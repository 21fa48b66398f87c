//! Court keeper restore state, one record per (tournament, court).

use crate::models::{BoutId, Court, CourtState, CourtStatePatch, TournamentId, TournamentResult};
use crate::store::TournamentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct CourtService {
    store: Arc<dyn TournamentStore>,
}

impl CourtService {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    pub fn court_state(
        &self,
        tournament_id: TournamentId,
        court: Court,
    ) -> TournamentResult<Option<CourtState>> {
        self.store.court_state(tournament_id, court)
    }

    pub fn court_states(&self, tournament_id: TournamentId) -> TournamentResult<Vec<CourtState>> {
        self.store.court_states(tournament_id)
    }

    /// Apply the provided fields, creating the record (empty lists) when absent.
    pub fn upsert(
        &self,
        tournament_id: TournamentId,
        court: Court,
        patch: CourtStatePatch,
    ) -> TournamentResult<CourtState> {
        let mut state = match self.store.court_state(tournament_id, court)? {
            Some(existing) => existing,
            None => CourtState::new(tournament_id, court)?,
        };
        state.apply(patch);
        self.store.put_court_state(state.clone())?;
        Ok(state)
    }

    /// Set (or clear) the bout being fought. A new record also selects it.
    pub fn set_current_bout(
        &self,
        tournament_id: TournamentId,
        court: Court,
        bout_id: Option<BoutId>,
    ) -> TournamentResult<CourtState> {
        let state = match self.store.court_state(tournament_id, court)? {
            Some(mut existing) => {
                existing.current_bout_id = bout_id;
                existing
            }
            None => {
                let mut fresh = CourtState::new(tournament_id, court)?;
                fresh.current_bout_id = bout_id;
                fresh.selected_bout_id = bout_id;
                fresh
            }
        };
        self.store.put_court_state(state.clone())?;
        Ok(state)
    }

    pub fn clear(&self, tournament_id: TournamentId) -> TournamentResult<usize> {
        let mut removed = 0;
        for court in [Court::A, Court::B] {
            if self.store.delete_court_state(tournament_id, court)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
