//! Round-robin scheduling with rest optimisation, and court assignment for divisions.

use crate::models::{Court, Group};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// "Last played" position assumed for a player who has not fought yet:
/// two slots before the first bout.
const UNSEEN_LAST_PLAYED: i64 = -2;

/// Every pairing of a division, ordered so players get as much rest as possible.
///
/// 1. Pad an odd roster with a bye.
/// 2. Circle method: `n - 1` rounds of `n / 2` pairings, dropping bye pairings.
/// 3. Reorder greedily with [`order_for_rest`].
///
/// Returns an empty schedule for fewer than two players.
pub fn round_robin_with_rest<T>(players: &[T]) -> Vec<(T, T)>
where
    T: Clone + Eq + Hash,
{
    order_for_rest(circle_rounds(players).into_iter().flatten().collect())
}

/// Circle-method rounds. Slot 0 stays fixed while the rest rotate by one each round.
pub fn circle_rounds<T: Clone>(players: &[T]) -> Vec<Vec<(T, T)>> {
    if players.len() < 2 {
        return Vec::new();
    }
    let mut slots: Vec<Option<T>> = players.iter().cloned().map(Some).collect();
    if slots.len() % 2 != 0 {
        slots.push(None);
    }
    let n = slots.len();

    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let round: Vec<(T, T)> = (0..n / 2)
            .filter_map(|i| match (&slots[i], &slots[n - 1 - i]) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => None,
            })
            .collect();
        rounds.push(round);
        if let Some(last) = slots.pop() {
            slots.insert(1, last);
        }
    }
    rounds
}

/// Greedy rest ordering: at each position pick the remaining pairing whose
/// less-rested player has rested longest. Equal scores keep the first candidate
/// in input order.
pub fn order_for_rest<T>(pairings: Vec<(T, T)>) -> Vec<(T, T)>
where
    T: Clone + Eq + Hash,
{
    let total = pairings.len();
    let mut remaining: Vec<Option<(T, T)>> = pairings.into_iter().map(Some).collect();
    let mut last_played: HashMap<T, i64> = HashMap::new();
    let mut ordered = Vec::with_capacity(total);

    while ordered.len() < total {
        let position = ordered.len() as i64;
        let mut best: Option<(usize, i64)> = None;
        for (idx, candidate) in remaining.iter().enumerate() {
            let Some((a, b)) = candidate else {
                continue;
            };
            let rest_a = position - last_played.get(a).copied().unwrap_or(UNSEEN_LAST_PLAYED);
            let rest_b = position - last_played.get(b).copied().unwrap_or(UNSEEN_LAST_PLAYED);
            let score = rest_a.min(rest_b);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }
        let Some((idx, _)) = best else {
            break;
        };
        if let Some((a, b)) = remaining[idx].take() {
            last_played.insert(a.clone(), position);
            last_played.insert(b.clone(), position);
            ordered.push((a, b));
        }
    }
    ordered
}

/// Pairings of `players` not yet covered by `existing` (unordered pairs, smaller first),
/// in rest-optimised order.
pub fn missing_pairings<T>(players: &[T], existing: &HashSet<(T, T)>) -> Vec<(T, T)>
where
    T: Clone + Eq + Hash + Ord,
{
    round_robin_with_rest(players)
        .into_iter()
        .filter(|(a, b)| {
            let key = if a <= b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            !existing.contains(&key)
        })
        .collect()
}

/// Court for each division, in scheduling order.
///
/// `groups` are the divisions taking part, in display order. Hantei and
/// point divisions are interleaved hantei-first; even positions go to court B
/// and odd positions to court A.
pub fn assign_courts(groups: &[Group]) -> Vec<(&Group, Court)> {
    let (hantei, regular): (Vec<&Group>, Vec<&Group>) = groups.iter().partition(|g| g.is_hantei);
    let longest = hantei.len().max(regular.len());

    let mut interleaved = Vec::with_capacity(groups.len());
    for i in 0..longest {
        if let Some(g) = hantei.get(i) {
            interleaved.push(*g);
        }
        if let Some(g) = regular.get(i) {
            interleaved.push(*g);
        }
    }

    interleaved
        .into_iter()
        .enumerate()
        .map(|(idx, g)| (g, if idx % 2 == 0 { Court::B } else { Court::A }))
        .collect()
}
