//! Tournament-wide operations: lifecycle, schedule generation, refresh, reset,
//! deletion and division-wide bout settings.

use super::division_format;
use super::playoffs::generate_sudden_death;
use crate::clock::Clock;
use crate::config::TournamentDefaults;
use crate::logic::{assign_courts, compute_standings, missing_pairings, round_robin_with_rest, StandingRow};
use crate::models::{
    Bout, BoutStatus, Court, Group, GroupId, MatchType, MemberId, Tournament, TournamentError,
    TournamentId, TournamentResult, TournamentStatus, TournamentUpdate,
};
use crate::store::TournamentStore;
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Records removed per store round trip when deleting a tournament.
const DELETE_BATCH: usize = 200;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RemovalSummary {
    pub deleted_bouts: usize,
    pub deleted_participants: usize,
    pub deleted_court_states: usize,
}

#[derive(Clone)]
pub struct TournamentOrchestrator {
    store: Arc<dyn TournamentStore>,
    clock: Arc<dyn Clock>,
    defaults: TournamentDefaults,
}

impl TournamentOrchestrator {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        clock: Arc<dyn Clock>,
        defaults: TournamentDefaults,
    ) -> Self {
        Self {
            store,
            clock,
            defaults,
        }
    }

    pub fn create_tournament(&self, name: &str, date: NaiveDate) -> TournamentResult<Tournament> {
        let tournament = Tournament::new(name.trim(), date, &self.defaults);
        self.store.insert_tournament(tournament.clone())?;
        info!("Created tournament {} ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    pub fn tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .tournament(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        self.store.tournaments()
    }

    /// The tournament currently running, if any.
    pub fn active_tournament(&self) -> TournamentResult<Option<Tournament>> {
        Ok(self
            .store
            .tournaments()?
            .into_iter()
            .find(|t| t.status == TournamentStatus::InProgress))
    }

    pub fn update_tournament(
        &self,
        id: TournamentId,
        update: TournamentUpdate,
    ) -> TournamentResult<Tournament> {
        let mut tournament = self.tournament(id)?;
        tournament.apply_update(update);
        self.store.update_tournament(&tournament)?;
        Ok(tournament)
    }

    pub fn start_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        let mut tournament = self.tournament(id)?;
        tournament.start()?;
        self.store.update_tournament(&tournament)?;
        Ok(tournament)
    }

    pub fn complete_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        let mut tournament = self.tournament(id)?;
        tournament.complete()?;
        self.store.update_tournament(&tournament)?;
        Ok(tournament)
    }

    /// Build the initial schedule: a rest-optimised round robin for every
    /// division with at least two participants, divisions interleaved across
    /// the courts hantei-first. Order indexes run 0.. across the whole tournament.
    pub fn generate_matches(&self, id: TournamentId) -> TournamentResult<Vec<Bout>> {
        let tournament = self.tournament(id)?;
        tournament.require(TournamentStatus::Setup)?;
        if !self.store.bout_ids(id, 1)?.is_empty() {
            return Err(TournamentError::AlreadyScheduled);
        }

        let rosters = self.rosters(id)?;
        let groups = self.groups_with_participants(&rosters)?;
        let now = self.clock.now();
        let mut order_index = 0;
        let mut created = Vec::new();

        for (group, court) in assign_courts(&groups) {
            let players = &rosters[&group.group_id];
            if players.len() < 2 {
                continue;
            }
            let format = division_format(group, court, &tournament);
            for pair in round_robin_with_rest(players) {
                let bout = Bout::new(id, group.group_id.clone(), pair, format, order_index, now);
                order_index += 1;
                self.store.insert_bout(bout.clone())?;
                created.push(bout);
            }
        }

        info!(
            "Generated {} bout(s) across {} division(s) for tournament {}",
            created.len(),
            groups.len(),
            id
        );
        Ok(created)
    }

    /// Add bouts for participant pairs that have none yet, after the current
    /// last order index. Existing bouts are left exactly as they are.
    pub fn refresh_participants(&self, id: TournamentId) -> TournamentResult<Vec<Bout>> {
        let tournament = self.tournament(id)?;
        let rosters = self.rosters(id)?;
        let groups = self.groups_with_participants(&rosters)?;
        let existing = self.store.bouts(id)?;
        let now = self.clock.now();
        let mut order_index = existing
            .iter()
            .map(|b| b.order_index + 1)
            .max()
            .unwrap_or(0);
        let mut created = Vec::new();

        for (group, default_court) in assign_courts(&groups) {
            let players = &rosters[&group.group_id];
            if players.len() < 2 {
                continue;
            }
            let division: Vec<&Bout> = existing
                .iter()
                .filter(|b| b.group_id == group.group_id)
                .collect();
            let paired: HashSet<(MemberId, MemberId)> =
                division.iter().map(|b| b.pair_key()).collect();
            // Keep a division on the court it is already running on.
            let court = division
                .iter()
                .find(|b| !b.is_sudden_death)
                .map_or(default_court, |b| b.court);
            let format = division_format(group, court, &tournament);

            for pair in missing_pairings(players, &paired) {
                let bout = Bout::new(id, group.group_id.clone(), pair, format, order_index, now);
                order_index += 1;
                self.store.insert_bout(bout.clone())?;
                created.push(bout);
            }
        }

        if !created.is_empty() {
            info!("Added {} bout(s) to tournament {}", created.len(), id);
        }
        Ok(created)
    }

    /// Put every bout back to pending with an empty score sheet. Sudden-death
    /// bouts are reset too, not deleted. All bouts change in one store write.
    pub fn reset(&self, id: TournamentId) -> TournamentResult<usize> {
        self.tournament(id)?;
        let now = self.clock.now();
        let reset = self.store.patch_bouts(id, &|_: &Bout| true, &|bout: &mut Bout| {
            bout.status = BoutStatus::Pending;
            bout.player1.clear();
            bout.player2.clear();
            bout.hantei_rounds.clear();
            bout.winner = None;
            bout.timer_started_at = None;
            bout.timer_paused_at = None;
            bout.actual_duration = None;
            bout.updated_at = now;
        })?;
        info!("Reset {} bout(s) of tournament {}", reset, id);
        Ok(reset)
    }

    /// Delete a tournament with its bouts, participants and court states.
    /// Bouts and participants go in bounded batches.
    pub fn remove(&self, id: TournamentId) -> TournamentResult<RemovalSummary> {
        self.tournament(id)?;
        let mut summary = RemovalSummary::default();

        loop {
            let batch = self.store.bout_ids(id, DELETE_BATCH)?;
            if batch.is_empty() {
                break;
            }
            for bout_id in batch {
                if self.store.delete_bout(bout_id)? {
                    summary.deleted_bouts += 1;
                }
            }
        }

        loop {
            let batch = self.store.participant_ids(id, DELETE_BATCH)?;
            if batch.is_empty() {
                break;
            }
            for participant_id in batch {
                if self.store.delete_participant(participant_id)? {
                    summary.deleted_participants += 1;
                }
            }
        }

        for court in [Court::A, Court::B] {
            if self.store.delete_court_state(id, court)? {
                summary.deleted_court_states += 1;
            }
        }

        self.store.delete_tournament(id)?;
        info!(
            "Deleted tournament {} ({} bouts, {} participants)",
            id, summary.deleted_bouts, summary.deleted_participants
        );
        Ok(summary)
    }

    /// Move a division's pending bouts to another court. Returns how many changed.
    pub fn set_group_court(
        &self,
        id: TournamentId,
        group_id: &str,
        court: Court,
    ) -> TournamentResult<usize> {
        self.update_pending(id, group_id, |bout| bout.court = court)
    }

    /// Switch a division's pending bouts between sanbon and ippon.
    pub fn set_group_match_type(
        &self,
        id: TournamentId,
        group_id: &str,
        match_type: MatchType,
    ) -> TournamentResult<usize> {
        if match_type == MatchType::Hantei {
            return Err(TournamentError::InvalidMatchType(match_type));
        }
        self.update_pending(id, group_id, |bout| bout.match_type = match_type)
    }

    pub fn set_group_timer(
        &self,
        id: TournamentId,
        group_id: &str,
        timer_duration: u32,
    ) -> TournamentResult<usize> {
        self.update_pending(id, group_id, |bout| bout.timer_duration = timer_duration)
    }

    /// Ranking of a division on its completed round-robin bouts.
    pub fn standings(&self, id: TournamentId, group_id: &str) -> TournamentResult<Vec<StandingRow>> {
        let bouts = self.store.bouts_in_group(id, group_id)?;
        let roster: Vec<MemberId> = self
            .store
            .participants_in_group(id, group_id)?
            .into_iter()
            .map(|p| p.member_id)
            .collect();
        Ok(compute_standings(&bouts, &roster))
    }

    /// Run the sudden-death check for a division on demand. Safe to repeat.
    pub fn recheck_sudden_death(&self, id: TournamentId, group_id: &str) -> TournamentResult<Vec<Bout>> {
        generate_sudden_death(self.store.as_ref(), id, group_id, self.clock.now())
    }

    pub fn bouts(&self, id: TournamentId) -> TournamentResult<Vec<Bout>> {
        self.store.bouts(id)
    }

    /// Bouts shown on one court: its own plus those shared by both courts.
    pub fn bouts_for_court(&self, id: TournamentId, court: Court) -> TournamentResult<Vec<Bout>> {
        let mut bouts = self.store.bouts_on_court(id, court)?;
        if court != Court::Both {
            bouts.extend(self.store.bouts_on_court(id, Court::Both)?);
        }
        bouts.sort_by_key(|b| (b.order_index, b.id));
        Ok(bouts)
    }

    pub fn active_bouts(&self, id: TournamentId) -> TournamentResult<Vec<Bout>> {
        self.store.bouts_with_status(id, BoutStatus::InProgress)
    }

    /// Apply `change` to the division's pending bouts in one store write, so a
    /// bout that starts meanwhile is either changed before it starts or skipped.
    fn update_pending(
        &self,
        id: TournamentId,
        group_id: &str,
        change: impl Fn(&mut Bout),
    ) -> TournamentResult<usize> {
        let now = self.clock.now();
        self.store.patch_bouts(
            id,
            &|bout: &Bout| bout.group_id == group_id && bout.status == BoutStatus::Pending,
            &|bout: &mut Bout| {
                change(bout);
                bout.updated_at = now;
            },
        )
    }

    /// Participant member ids per division.
    fn rosters(&self, id: TournamentId) -> TournamentResult<HashMap<GroupId, Vec<MemberId>>> {
        let mut rosters: HashMap<GroupId, Vec<MemberId>> = HashMap::new();
        for p in self.store.participants(id)? {
            rosters.entry(p.group_id).or_default().push(p.member_id);
        }
        Ok(rosters)
    }

    /// Divisions in display order that have at least one participant.
    fn groups_with_participants(
        &self,
        rosters: &HashMap<GroupId, Vec<MemberId>>,
    ) -> TournamentResult<Vec<Group>> {
        Ok(self
            .store
            .groups()?
            .into_iter()
            .filter(|g| rosters.contains_key(&g.group_id))
            .collect())
    }
}
