//! Storage contract the engines depend on.
//!
//! Every method is individually atomic. Multi-record consistency is the
//! caller's job: bouts carry a revision and [`TournamentStore::replace_bout`]
//! is a conditional write, so a read-modify-write never overwrites a
//! concurrent change silently.

mod memory;

pub use memory::{MemoryStore, Snapshot, SNAPSHOT_VERSION};

use crate::models::{
    Bout, BoutId, BoutStatus, Court, CourtState, Group, Member, MemberId, Participant,
    ParticipantId, Tournament, TournamentId, TournamentResult,
};

pub trait TournamentStore: Send + Sync {
    fn tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;
    fn tournaments(&self) -> TournamentResult<Vec<Tournament>>;
    fn insert_tournament(&self, tournament: Tournament) -> TournamentResult<()>;
    /// Overwrite an existing tournament. Fails with not-found if it is absent.
    fn update_tournament(&self, tournament: &Tournament) -> TournamentResult<()>;
    fn delete_tournament(&self, id: TournamentId) -> TournamentResult<bool>;

    /// All divisions, ascending display order.
    fn groups(&self) -> TournamentResult<Vec<Group>>;
    fn group(&self, group_id: &str) -> TournamentResult<Option<Group>>;
    /// Insert or replace by group id.
    fn put_group(&self, group: Group) -> TournamentResult<()>;
    fn delete_group(&self, group_id: &str) -> TournamentResult<bool>;

    fn member(&self, id: MemberId) -> TournamentResult<Option<Member>>;
    /// All members, sorted by last then first name.
    fn members(&self) -> TournamentResult<Vec<Member>>;
    /// Insert or replace by member id.
    fn put_member(&self, member: Member) -> TournamentResult<()>;

    fn participants(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Participant>>;
    fn participants_in_group(
        &self,
        tournament_id: TournamentId,
        group_id: &str,
    ) -> TournamentResult<Vec<Participant>>;
    /// Rejects a second row for the same (tournament, member).
    fn insert_participant(&self, participant: Participant) -> TournamentResult<()>;
    fn update_participant(&self, participant: &Participant) -> TournamentResult<()>;
    fn delete_participant(&self, id: ParticipantId) -> TournamentResult<bool>;
    /// Up to `limit` participant ids of a tournament, for batched deletion.
    fn participant_ids(
        &self,
        tournament_id: TournamentId,
        limit: usize,
    ) -> TournamentResult<Vec<ParticipantId>>;

    fn bout(&self, id: BoutId) -> TournamentResult<Option<Bout>>;
    /// Bouts of a tournament, ascending order index.
    fn bouts(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Bout>>;
    fn bouts_in_group(&self, tournament_id: TournamentId, group_id: &str)
        -> TournamentResult<Vec<Bout>>;
    /// Bouts assigned to exactly `court` (`Court::Both` bouts only match `Court::Both`).
    fn bouts_on_court(&self, tournament_id: TournamentId, court: Court) -> TournamentResult<Vec<Bout>>;
    fn bouts_with_status(
        &self,
        tournament_id: TournamentId,
        status: BoutStatus,
    ) -> TournamentResult<Vec<Bout>>;
    /// Up to `limit` bout ids of a tournament, for batched deletion.
    fn bout_ids(&self, tournament_id: TournamentId, limit: usize) -> TournamentResult<Vec<BoutId>>;
    fn insert_bout(&self, bout: Bout) -> TournamentResult<()>;
    /// Conditional write: succeeds only if the stored revision equals
    /// `bout.revision`. Stores the bout with the revision bumped and returns it.
    fn replace_bout(&self, bout: &Bout) -> TournamentResult<u64>;
    /// Apply `patch` to every bout of the tournament that `select` keeps, under
    /// one write. Each patched bout gets its revision bumped, so stale copies
    /// held elsewhere fail their next conditional write. Returns how many changed.
    fn patch_bouts(
        &self,
        tournament_id: TournamentId,
        select: &dyn Fn(&Bout) -> bool,
        patch: &dyn Fn(&mut Bout),
    ) -> TournamentResult<usize>;
    /// Insert playoff bouts, skipping any whose unordered pair already has a
    /// sudden-death bout in the same (tournament, group). Inserted bouts get
    /// order indexes after the tournament's current last one. The check, the
    /// numbering and the inserts happen atomically. Returns the bouts inserted.
    fn insert_sudden_death_bouts(&self, bouts: Vec<Bout>) -> TournamentResult<Vec<Bout>>;
    fn delete_bout(&self, id: BoutId) -> TournamentResult<bool>;

    fn court_state(
        &self,
        tournament_id: TournamentId,
        court: Court,
    ) -> TournamentResult<Option<CourtState>>;
    fn court_states(&self, tournament_id: TournamentId) -> TournamentResult<Vec<CourtState>>;
    fn put_court_state(&self, state: CourtState) -> TournamentResult<()>;
    fn delete_court_state(&self, tournament_id: TournamentId, court: Court) -> TournamentResult<bool>;
}
