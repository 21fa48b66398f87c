//! Integration tests for round-robin scheduling and court assignment.

use kendo_tournament::logic::{
    assign_courts, circle_rounds, missing_pairings, order_for_rest, round_robin_with_rest,
};
use kendo_tournament::{Court, Group};
use proptest::prelude::*;
use std::collections::HashSet;

fn unordered(pairs: &[(u32, u32)]) -> HashSet<(u32, u32)> {
    pairs
        .iter()
        .map(|&(a, b)| if a <= b { (a, b) } else { (b, a) })
        .collect()
}

/// Longest streak of consecutive bouts any single player appears in.
fn longest_streak(pairs: &[(u32, u32)]) -> usize {
    let mut longest = 0;
    for window_start in 0..pairs.len() {
        let (a, b) = pairs[window_start];
        for player in [a, b] {
            let streak = pairs[window_start..]
                .iter()
                .take_while(|(x, y)| *x == player || *y == player)
                .count();
            longest = longest.max(streak);
        }
    }
    longest
}

#[test]
fn four_players_meet_each_other_once() {
    let schedule = round_robin_with_rest(&[1u32, 2, 3, 4]);
    assert_eq!(schedule.len(), 6);
    assert_eq!(unordered(&schedule).len(), 6);
    assert!(schedule.iter().all(|(a, b)| a != b));
}

#[test]
fn odd_roster_drops_the_bye() {
    let rounds = circle_rounds(&[1u32, 2, 3, 4, 5]);
    assert_eq!(rounds.len(), 5);
    // Each round one player sits out.
    assert!(rounds.iter().all(|r| r.len() == 2));

    let schedule = round_robin_with_rest(&[1u32, 2, 3, 4, 5]);
    assert_eq!(schedule.len(), 10);
    assert_eq!(unordered(&schedule).len(), 10);
}

#[test]
fn fewer_than_two_players_get_no_bouts() {
    assert!(round_robin_with_rest::<u32>(&[]).is_empty());
    assert!(round_robin_with_rest(&[7u32]).is_empty());
}

#[test]
fn two_players_get_a_single_bout() {
    assert_eq!(round_robin_with_rest(&[1u32, 2]), vec![(1, 2)]);
}

#[test]
fn circle_method_keeps_first_slot_fixed() {
    let rounds = circle_rounds(&[1u32, 2, 3, 4]);
    assert_eq!(
        rounds,
        vec![
            vec![(1, 4), (2, 3)],
            vec![(1, 3), (4, 2)],
            vec![(1, 2), (3, 4)],
        ]
    );
}

#[test]
fn rest_ordering_avoids_back_to_back_bouts() {
    let schedule = round_robin_with_rest(&[1u32, 2, 3, 4, 5, 6]);
    assert_eq!(schedule.len(), 15);
    assert_eq!(longest_streak(&schedule), 1);
}

#[test]
fn rest_ordering_prefers_fresh_players() {
    let ordered = order_for_rest(vec![(1u32, 2), (1, 3), (3, 4)]);
    // After (1, 2), (3, 4) pairs two unseen players; (1, 3) waits.
    assert_eq!(ordered, vec![(1, 2), (3, 4), (1, 3)]);
}

#[test]
fn missing_pairings_skips_existing_pairs_in_either_order() {
    let existing: HashSet<(u32, u32)> = [(1, 2), (3, 4)].into_iter().collect();
    let missing = missing_pairings(&[2u32, 1, 3, 4], &existing);
    assert_eq!(missing.len(), 4);
    let keys = unordered(&missing);
    assert!(!keys.contains(&(1, 2)));
    assert!(!keys.contains(&(3, 4)));
}

#[test]
fn courts_interleave_hantei_divisions_first() {
    let groups = vec![
        Group::new("MUD", "Mudansha", false, 1),
        Group::new("YUD", "Yudansha", false, 2),
        Group::new("KID", "Kids", true, 3),
    ];
    let assigned: Vec<(&str, Court)> = assign_courts(&groups)
        .into_iter()
        .map(|(g, court)| (g.group_id.as_str(), court))
        .collect();
    assert_eq!(
        assigned,
        vec![("KID", Court::B), ("MUD", Court::A), ("YUD", Court::B)]
    );
}

#[test]
fn courts_alternate_without_hantei_divisions() {
    let groups = vec![
        Group::new("A1", "First", false, 1),
        Group::new("A2", "Second", false, 2),
    ];
    let courts: Vec<Court> = assign_courts(&groups).into_iter().map(|(_, c)| c).collect();
    assert_eq!(courts, vec![Court::B, Court::A]);
}

proptest! {
    #[test]
    fn every_pair_is_scheduled_exactly_once(n in 0usize..12) {
        let players: Vec<u32> = (0..n as u32).collect();
        let schedule = round_robin_with_rest(&players);

        prop_assert_eq!(schedule.len(), n * n.saturating_sub(1) / 2);
        let keys = unordered(&schedule);
        prop_assert_eq!(keys.len(), schedule.len());
        for (a, b) in &schedule {
            prop_assert!(a != b);
            prop_assert!(players.contains(a) && players.contains(b));
        }
    }

    #[test]
    fn missing_pairings_complete_any_partial_schedule(n in 2usize..9, keep in 0usize..40) {
        let players: Vec<u32> = (0..n as u32).collect();
        let full = round_robin_with_rest(&players);
        let existing = unordered(&full[..keep.min(full.len())]);

        let missing = missing_pairings(&players, &existing);
        let mut all = existing.clone();
        for key in unordered(&missing) {
            prop_assert!(all.insert(key));
        }
        prop_assert_eq!(all.len(), full.len());
    }
}
