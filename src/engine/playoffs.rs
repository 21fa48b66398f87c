//! Sudden-death generation against the store.
//!
//! Runs after a bout result is committed. It re-reads the whole division on
//! every call and relies on the store's pair check when inserting, so running
//! it twice, or from two courts at once, never creates a duplicate playoff.

use super::division_format;
use crate::logic::{compute_standings, plan_sudden_death, regular_bouts_complete};
use crate::models::{Bout, Group, MatchType, TournamentError, TournamentId, TournamentResult};
use crate::store::TournamentStore;
use chrono::{DateTime, Utc};
use log::info;
use std::collections::HashSet;

/// Create the playoff bouts a finished division still needs. Returns the bouts
/// inserted by this call (empty when nothing was needed).
pub fn generate_sudden_death(
    store: &dyn TournamentStore,
    tournament_id: TournamentId,
    group_id: &str,
    now: DateTime<Utc>,
) -> TournamentResult<Vec<Bout>> {
    let tournament = store
        .tournament(tournament_id)?
        .ok_or(TournamentError::TournamentNotFound(tournament_id))?;

    let bouts = store.bouts_in_group(tournament_id, group_id)?;
    if !regular_bouts_complete(&bouts) {
        return Ok(Vec::new());
    }
    let roster: Vec<_> = store
        .participants_in_group(tournament_id, group_id)?
        .into_iter()
        .map(|p| p.member_id)
        .collect();
    if roster.is_empty() {
        return Ok(Vec::new());
    }

    let standings = compute_standings(&bouts, &roster);
    let existing: HashSet<_> = bouts
        .iter()
        .filter(|b| b.is_sudden_death)
        .map(Bout::pair_key)
        .collect();
    let pairings = plan_sudden_death(&standings, &existing);
    if pairings.is_empty() {
        return Ok(Vec::new());
    }

    // Bouts come back in order index order, so the first regular one opened the division.
    let Some(first) = bouts.iter().find(|b| !b.is_sudden_death) else {
        return Ok(Vec::new());
    };
    // A division deleted mid-tournament keeps the format its bouts were created with.
    let group = match store.group(group_id)? {
        Some(group) => group,
        None => Group::new(group_id, group_id, first.match_type == MatchType::Hantei, 0),
    };
    let format = division_format(&group, first.court, &tournament);

    // The store numbers the bouts it actually inserts.
    let candidates: Vec<Bout> = pairings
        .into_iter()
        .map(|pair| Bout::new(tournament_id, group_id, pair, format, 0, now).into_sudden_death())
        .collect();

    let inserted = store.insert_sudden_death_bouts(candidates)?;
    if !inserted.is_empty() {
        info!(
            "Division {} of tournament {}: {} sudden-death bout(s) created",
            group_id,
            tournament_id,
            inserted.len()
        );
    }
    Ok(inserted)
}
