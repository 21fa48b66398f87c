//! Divisions, members and tournament participants.

use crate::models::{
    Group, GroupId, Member, MemberId, Participant, TournamentError, TournamentId, TournamentResult,
    SENSEI_GROUP_ID, SENSEI_GROUP_NAME,
};
use crate::store::TournamentStore;
use log::info;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn TournamentStore>,
}

impl RosterService {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    pub fn groups(&self) -> TournamentResult<Vec<Group>> {
        self.store.groups()
    }

    /// Create a division at the end of the display order. An existing division
    /// with the same id is renamed in place and keeps its position.
    pub fn create_group(&self, group_id: &str, name: &str, is_hantei: bool) -> TournamentResult<Group> {
        let group_id = group_id.trim();
        let order = match self.store.group(group_id)? {
            Some(existing) => existing.order,
            None => self.next_group_order()?,
        };
        let group = Group::new(group_id, name.trim(), is_hantei, order);
        self.store.put_group(group.clone())?;
        Ok(group)
    }

    /// Delete a division. The Sensei division is protected.
    pub fn remove_group(&self, group_id: &str) -> TournamentResult<()> {
        if group_id == SENSEI_GROUP_ID {
            return Err(TournamentError::ProtectedGroup);
        }
        if !self.store.delete_group(group_id)? {
            return Err(TournamentError::GroupNotFound(group_id.to_string()));
        }
        Ok(())
    }

    /// Make sure the reserved Sensei division exists.
    pub fn ensure_sensei_group(&self) -> TournamentResult<Group> {
        if let Some(existing) = self.store.group(SENSEI_GROUP_ID)? {
            return Ok(existing);
        }
        let group = Group::new(SENSEI_GROUP_ID, SENSEI_GROUP_NAME, false, self.next_group_order()?);
        self.store.put_group(group.clone())?;
        info!("Created reserved {} division", SENSEI_GROUP_NAME);
        Ok(group)
    }

    pub fn members(&self) -> TournamentResult<Vec<Member>> {
        self.store.members()
    }

    pub fn create_member(
        &self,
        first_name: &str,
        last_name: &str,
        group_id: &str,
        is_guest: bool,
    ) -> TournamentResult<Member> {
        let member = Member::new(first_name.trim(), last_name.trim(), group_id, is_guest);
        self.store.put_member(member.clone())?;
        Ok(member)
    }

    /// Move a member to another division. Existing tournament entries keep theirs.
    pub fn update_member_group(&self, id: MemberId, group_id: &str) -> TournamentResult<Member> {
        let mut member = self.member(id)?;
        member.group_id = group_id.to_string();
        self.store.put_member(member.clone())?;
        Ok(member)
    }

    pub fn participants(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Participant>> {
        self.store.participants(tournament_id)
    }

    /// Enter a member into a tournament in the given division.
    pub fn add_participant(
        &self,
        tournament_id: TournamentId,
        member_id: MemberId,
        group_id: &str,
    ) -> TournamentResult<Participant> {
        self.require_tournament(tournament_id)?;
        self.member(member_id)?;
        let participant = Participant::new(tournament_id, member_id, group_id);
        self.store.insert_participant(participant.clone())?;
        Ok(participant)
    }

    /// Enter each listed member in their own division. Members already entered
    /// or unknown are skipped. Returns how many were added.
    pub fn add_members(&self, tournament_id: TournamentId, member_ids: &[MemberId]) -> TournamentResult<usize> {
        self.require_tournament(tournament_id)?;
        let mut entered = self.entered(tournament_id)?;
        let mut added = 0;
        for &member_id in member_ids {
            if entered.contains(&member_id) {
                continue;
            }
            let Some(member) = self.store.member(member_id)? else {
                continue;
            };
            self.store
                .insert_participant(Participant::new(tournament_id, member_id, member.group_id))?;
            entered.insert(member_id);
            added += 1;
        }
        Ok(added)
    }

    /// Enter every roster member not yet entered.
    pub fn add_all_members(&self, tournament_id: TournamentId) -> TournamentResult<usize> {
        let ids: Vec<MemberId> = self.store.members()?.into_iter().map(|m| m.id).collect();
        self.add_members(tournament_id, &ids)
    }

    pub fn remove_participant_by_member(
        &self,
        tournament_id: TournamentId,
        member_id: MemberId,
    ) -> TournamentResult<bool> {
        match self.participant_of(tournament_id, member_id)? {
            Some(p) => self.store.delete_participant(p.id),
            None => Ok(false),
        }
    }

    /// Move an entered member to another division for this tournament only.
    pub fn update_participant_group(
        &self,
        tournament_id: TournamentId,
        member_id: MemberId,
        group_id: &str,
    ) -> TournamentResult<Participant> {
        let mut participant = self
            .participant_of(tournament_id, member_id)?
            .ok_or(TournamentError::MemberNotFound(member_id))?;
        participant.group_id = GroupId::from(group_id);
        self.store.update_participant(&participant)?;
        Ok(participant)
    }

    pub fn clear_participants(&self, tournament_id: TournamentId) -> TournamentResult<usize> {
        let participants = self.store.participants(tournament_id)?;
        for p in &participants {
            self.store.delete_participant(p.id)?;
        }
        Ok(participants.len())
    }

    fn member(&self, id: MemberId) -> TournamentResult<Member> {
        self.store.member(id)?.ok_or(TournamentError::MemberNotFound(id))
    }

    fn require_tournament(&self, id: TournamentId) -> TournamentResult<()> {
        match self.store.tournament(id)? {
            Some(_) => Ok(()),
            None => Err(TournamentError::TournamentNotFound(id)),
        }
    }

    fn entered(&self, tournament_id: TournamentId) -> TournamentResult<HashSet<MemberId>> {
        Ok(self
            .store
            .participants(tournament_id)?
            .into_iter()
            .map(|p| p.member_id)
            .collect())
    }

    fn participant_of(
        &self,
        tournament_id: TournamentId,
        member_id: MemberId,
    ) -> TournamentResult<Option<Participant>> {
        Ok(self
            .store
            .participants(tournament_id)?
            .into_iter()
            .find(|p| p.member_id == member_id))
    }

    fn next_group_order(&self) -> TournamentResult<u32> {
        Ok(self
            .store
            .groups()?
            .iter()
            .map(|g| g.order + 1)
            .max()
            .unwrap_or(1))
    }
}
