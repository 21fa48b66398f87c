//! In-memory store behind a single `RwLock`, with JSON snapshots.

use super::TournamentStore;
use crate::models::{
    Bout, BoutId, BoutStatus, Court, CourtState, Group, GroupId, Member, MemberId, Participant,
    ParticipantId, Tournament, TournamentError, TournamentId, TournamentResult,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Bump when the snapshot layout changes; older files are rejected.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Default)]
struct Tables {
    tournaments: HashMap<TournamentId, Tournament>,
    groups: HashMap<GroupId, Group>,
    members: HashMap<MemberId, Member>,
    participants: HashMap<ParticipantId, Participant>,
    bouts: HashMap<BoutId, Bout>,
    court_states: HashMap<(TournamentId, Court), CourtState>,
}

/// Serializable copy of the whole store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub tournaments: Vec<Tournament>,
    pub groups: Vec<Group>,
    pub members: Vec<Member>,
    pub participants: Vec<Participant>,
    pub bouts: Vec<Bout>,
    pub court_states: Vec<CourtState>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TournamentResult<Snapshot> {
        let t = self.read()?;
        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            tournaments: t.tournaments.values().cloned().collect(),
            groups: t.groups.values().cloned().collect(),
            members: t.members.values().cloned().collect(),
            participants: t.participants.values().cloned().collect(),
            bouts: sorted_bouts(t.bouts.values()),
            court_states: t.court_states.values().cloned().collect(),
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> TournamentResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(TournamentError::Storage(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        let tables = Tables {
            tournaments: snapshot.tournaments.into_iter().map(|t| (t.id, t)).collect(),
            groups: snapshot
                .groups
                .into_iter()
                .map(|g| (g.group_id.clone(), g))
                .collect(),
            members: snapshot.members.into_iter().map(|m| (m.id, m)).collect(),
            participants: snapshot.participants.into_iter().map(|p| (p.id, p)).collect(),
            bouts: snapshot.bouts.into_iter().map(|b| (b.id, b)).collect(),
            court_states: snapshot
                .court_states
                .into_iter()
                .map(|s| ((s.tournament_id, s.court), s))
                .collect(),
        };
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Write the snapshot as JSON: sibling temp file first, then renamed over `path`.
    pub fn save_snapshot(&self, path: &Path) -> TournamentResult<()> {
        let json = serde_json::to_string_pretty(&self.snapshot()?)
            .map_err(|e| TournamentError::Storage(format!("Failed to serialize: {}", e)))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)
            .map_err(|e| TournamentError::Storage(format!("Failed to write: {}", e)))?;
        fs::rename(&tmp, path)
            .map_err(|e| TournamentError::Storage(format!("Failed to replace: {}", e)))
    }

    pub fn load_snapshot(path: &Path) -> TournamentResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| TournamentError::Storage(format!("Failed to read: {}", e)))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .map_err(|e| TournamentError::Storage(format!("Failed to parse: {}", e)))?;
        Self::from_snapshot(snapshot)
    }

    fn read(&self) -> TournamentResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| TournamentError::Storage("lock error".to_string()))
    }

    fn write(&self) -> TournamentResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| TournamentError::Storage("lock error".to_string()))
    }

    fn select_bouts(&self, keep: impl Fn(&Bout) -> bool) -> TournamentResult<Vec<Bout>> {
        let t = self.read()?;
        Ok(sorted_bouts(t.bouts.values().filter(|b| keep(b))))
    }
}

fn sorted_bouts<'a>(bouts: impl Iterator<Item = &'a Bout>) -> Vec<Bout> {
    let mut out: Vec<Bout> = bouts.cloned().collect();
    out.sort_by_key(|b| (b.order_index, b.id));
    out
}

impl TournamentStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let mut out: Vec<Tournament> = self.read()?.tournaments.values().cloned().collect();
        out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(out)
    }

    fn insert_tournament(&self, tournament: Tournament) -> TournamentResult<()> {
        self.write()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    fn update_tournament(&self, tournament: &Tournament) -> TournamentResult<()> {
        let mut t = self.write()?;
        let stored = t
            .tournaments
            .get_mut(&tournament.id)
            .ok_or(TournamentError::TournamentNotFound(tournament.id))?;
        *stored = tournament.clone();
        Ok(())
    }

    fn delete_tournament(&self, id: TournamentId) -> TournamentResult<bool> {
        Ok(self.write()?.tournaments.remove(&id).is_some())
    }

    fn groups(&self) -> TournamentResult<Vec<Group>> {
        let mut out: Vec<Group> = self.read()?.groups.values().cloned().collect();
        out.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.group_id.cmp(&b.group_id)));
        Ok(out)
    }

    fn group(&self, group_id: &str) -> TournamentResult<Option<Group>> {
        Ok(self.read()?.groups.get(group_id).cloned())
    }

    fn put_group(&self, group: Group) -> TournamentResult<()> {
        self.write()?.groups.insert(group.group_id.clone(), group);
        Ok(())
    }

    fn delete_group(&self, group_id: &str) -> TournamentResult<bool> {
        Ok(self.write()?.groups.remove(group_id).is_some())
    }

    fn member(&self, id: MemberId) -> TournamentResult<Option<Member>> {
        Ok(self.read()?.members.get(&id).cloned())
    }

    fn members(&self) -> TournamentResult<Vec<Member>> {
        let mut out: Vec<Member> = self.read()?.members.values().cloned().collect();
        out.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(out)
    }

    fn put_member(&self, member: Member) -> TournamentResult<()> {
        self.write()?.members.insert(member.id, member);
        Ok(())
    }

    fn participants(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Participant>> {
        let t = self.read()?;
        let mut out: Vec<Participant> = t
            .participants
            .values()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect();
        out.sort_by_key(|p| (p.group_id.clone(), p.member_id));
        Ok(out)
    }

    fn participants_in_group(
        &self,
        tournament_id: TournamentId,
        group_id: &str,
    ) -> TournamentResult<Vec<Participant>> {
        Ok(self
            .participants(tournament_id)?
            .into_iter()
            .filter(|p| p.group_id == group_id)
            .collect())
    }

    fn insert_participant(&self, participant: Participant) -> TournamentResult<()> {
        let mut t = self.write()?;
        let duplicate = t.participants.values().any(|p| {
            p.tournament_id == participant.tournament_id && p.member_id == participant.member_id
        });
        if duplicate {
            return Err(TournamentError::AlreadyParticipating(participant.member_id));
        }
        t.participants.insert(participant.id, participant);
        Ok(())
    }

    fn update_participant(&self, participant: &Participant) -> TournamentResult<()> {
        let mut t = self.write()?;
        let stored = t
            .participants
            .get_mut(&participant.id)
            .ok_or(TournamentError::MemberNotFound(participant.member_id))?;
        *stored = participant.clone();
        Ok(())
    }

    fn delete_participant(&self, id: ParticipantId) -> TournamentResult<bool> {
        Ok(self.write()?.participants.remove(&id).is_some())
    }

    fn participant_ids(
        &self,
        tournament_id: TournamentId,
        limit: usize,
    ) -> TournamentResult<Vec<ParticipantId>> {
        let t = self.read()?;
        Ok(t.participants
            .values()
            .filter(|p| p.tournament_id == tournament_id)
            .map(|p| p.id)
            .take(limit)
            .collect())
    }

    fn bout(&self, id: BoutId) -> TournamentResult<Option<Bout>> {
        Ok(self.read()?.bouts.get(&id).cloned())
    }

    fn bouts(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Bout>> {
        self.select_bouts(|b| b.tournament_id == tournament_id)
    }

    fn bouts_in_group(
        &self,
        tournament_id: TournamentId,
        group_id: &str,
    ) -> TournamentResult<Vec<Bout>> {
        self.select_bouts(|b| b.tournament_id == tournament_id && b.group_id == group_id)
    }

    fn bouts_on_court(&self, tournament_id: TournamentId, court: Court) -> TournamentResult<Vec<Bout>> {
        self.select_bouts(|b| b.tournament_id == tournament_id && b.court == court)
    }

    fn bouts_with_status(
        &self,
        tournament_id: TournamentId,
        status: BoutStatus,
    ) -> TournamentResult<Vec<Bout>> {
        self.select_bouts(|b| b.tournament_id == tournament_id && b.status == status)
    }

    fn bout_ids(&self, tournament_id: TournamentId, limit: usize) -> TournamentResult<Vec<BoutId>> {
        let t = self.read()?;
        Ok(t.bouts
            .values()
            .filter(|b| b.tournament_id == tournament_id)
            .map(|b| b.id)
            .take(limit)
            .collect())
    }

    fn insert_bout(&self, bout: Bout) -> TournamentResult<()> {
        self.write()?.bouts.insert(bout.id, bout);
        Ok(())
    }

    fn replace_bout(&self, bout: &Bout) -> TournamentResult<u64> {
        let mut t = self.write()?;
        let stored = t
            .bouts
            .get_mut(&bout.id)
            .ok_or(TournamentError::BoutNotFound(bout.id))?;
        if stored.revision != bout.revision {
            return Err(TournamentError::Conflict(bout.id));
        }
        let mut next = bout.clone();
        next.revision += 1;
        let revision = next.revision;
        *stored = next;
        Ok(revision)
    }

    fn patch_bouts(
        &self,
        tournament_id: TournamentId,
        select: &dyn Fn(&Bout) -> bool,
        patch: &dyn Fn(&mut Bout),
    ) -> TournamentResult<usize> {
        let mut t = self.write()?;
        let mut patched = 0;
        for bout in t.bouts.values_mut() {
            if bout.tournament_id != tournament_id || !select(bout) {
                continue;
            }
            patch(bout);
            bout.revision += 1;
            patched += 1;
        }
        Ok(patched)
    }

    fn insert_sudden_death_bouts(&self, bouts: Vec<Bout>) -> TournamentResult<Vec<Bout>> {
        let mut t = self.write()?;
        let mut next_index: HashMap<TournamentId, u32> = HashMap::new();
        for b in t.bouts.values() {
            let next = next_index.entry(b.tournament_id).or_default();
            *next = (*next).max(b.order_index + 1);
        }
        let mut taken: HashSet<(TournamentId, GroupId, MemberId, MemberId)> = t
            .bouts
            .values()
            .filter(|b| b.is_sudden_death)
            .map(|b| {
                let (lo, hi) = b.pair_key();
                (b.tournament_id, b.group_id.clone(), lo, hi)
            })
            .collect();

        let mut inserted = Vec::new();
        for mut bout in bouts {
            let (lo, hi) = bout.pair_key();
            if taken.insert((bout.tournament_id, bout.group_id.clone(), lo, hi)) {
                let next = next_index.entry(bout.tournament_id).or_default();
                bout.order_index = *next;
                *next += 1;
                t.bouts.insert(bout.id, bout.clone());
                inserted.push(bout);
            }
        }
        Ok(inserted)
    }

    fn delete_bout(&self, id: BoutId) -> TournamentResult<bool> {
        Ok(self.write()?.bouts.remove(&id).is_some())
    }

    fn court_state(
        &self,
        tournament_id: TournamentId,
        court: Court,
    ) -> TournamentResult<Option<CourtState>> {
        Ok(self.read()?.court_states.get(&(tournament_id, court)).cloned())
    }

    fn court_states(&self, tournament_id: TournamentId) -> TournamentResult<Vec<CourtState>> {
        let t = self.read()?;
        let mut out: Vec<CourtState> = t
            .court_states
            .values()
            .filter(|s| s.tournament_id == tournament_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.court == Court::B);
        Ok(out)
    }

    fn put_court_state(&self, state: CourtState) -> TournamentResult<()> {
        self.write()?
            .court_states
            .insert((state.tournament_id, state.court), state);
        Ok(())
    }

    fn delete_court_state(&self, tournament_id: TournamentId, court: Court) -> TournamentResult<bool> {
        Ok(self
            .write()?
            .court_states
            .remove(&(tournament_id, court))
            .is_some())
    }
}
