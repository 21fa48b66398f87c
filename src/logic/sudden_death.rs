//! Tie detection at the top of a finished division, and the playoff pairings
//! needed to break it.

use crate::logic::standings::{StandingKey, StandingRow};
use crate::models::{pair_key, Bout, MemberId};
use std::collections::{HashMap, HashSet};

/// Ranks that must be decided outright.
pub const TOP_RANKS: usize = 3;

/// True when the division has regular bouts and every one of them is completed.
pub fn regular_bouts_complete(bouts: &[Bout]) -> bool {
    let mut regular = bouts.iter().filter(|b| !b.is_sudden_death).peekable();
    regular.peek().is_some() && regular.all(Bout::is_completed)
}

/// Members whose ranking key is shared with another member, for every key
/// held by one of the top three rows. Returned in standings order.
pub fn tied_cohort(standings: &[StandingRow]) -> Vec<MemberId> {
    let mut counts: HashMap<StandingKey, usize> = HashMap::new();
    for row in standings {
        *counts.entry(row.key()).or_default() += 1;
    }

    let tied_keys: HashSet<StandingKey> = standings
        .iter()
        .take(TOP_RANKS)
        .map(StandingRow::key)
        .filter(|key| counts.get(key).copied().unwrap_or(0) > 1)
        .collect();

    standings
        .iter()
        .filter(|row| tied_keys.contains(&row.key()))
        .map(|row| row.member_id)
        .collect()
}

/// Playoff pairings still needed: every unordered pair of the tied cohort that
/// `existing` (sorted pair keys of playoff bouts already created) does not cover.
pub fn plan_sudden_death(
    standings: &[StandingRow],
    existing: &HashSet<(MemberId, MemberId)>,
) -> Vec<(MemberId, MemberId)> {
    let cohort = tied_cohort(standings);
    if cohort.len() < 2 {
        return Vec::new();
    }

    let mut planned = Vec::new();
    let mut seen = existing.clone();
    for (i, &a) in cohort.iter().enumerate() {
        for &b in &cohort[i + 1..] {
            if seen.insert(pair_key(a, b)) {
                planned.push((a, b));
            }
        }
    }
    planned
}
