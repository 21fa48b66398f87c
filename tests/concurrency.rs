//! Two courts finishing bouts of the same division at the same time must not
//! produce duplicate sudden-death bouts.

use chrono::{NaiveDate, Utc};
use kendo_tournament::logic;
use kendo_tournament::{
    pair_key, Bout, BoutEngine, BoutId, BoutUpdate, Clock, MemberId, MemoryStore, RosterService, Side,
    SystemClock, TournamentId, TournamentOrchestrator, TournamentResult, TournamentStore,
};
use std::sync::Arc;

struct Courts {
    store: Arc<dyn TournamentStore>,
    engine: BoutEngine,
    orchestrator: TournamentOrchestrator,
    roster: RosterService,
}

fn courts() -> Courts {
    let store: Arc<dyn TournamentStore> = Arc::new(MemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    Courts {
        engine: BoutEngine::new(store.clone(), clock.clone()),
        orchestrator: TournamentOrchestrator::new(store.clone(), clock, Default::default()),
        roster: RosterService::new(store.clone()),
        store,
    }
}

fn division_of_four(c: &Courts) -> (TournamentId, Vec<MemberId>) {
    let date = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
    let tid = c.orchestrator.create_tournament("Taikai", date).unwrap().id;
    c.roster.create_group("MUD", "Mudansha", false).unwrap();
    let players: Vec<MemberId> = (0..4)
        .map(|i| {
            c.roster
                .create_member(&format!("P{i}"), "Test", "MUD", false)
                .unwrap()
                .id
        })
        .collect();
    c.roster.add_members(tid, &players).unwrap();
    c.orchestrator.generate_matches(tid).unwrap();
    (tid, players)
}

/// Players 0 and 1 draw their bout and beat everyone else; 2 beats 3.
/// None for the draw.
fn outcome(players: &[MemberId], bout: &Bout) -> Option<Side> {
    if bout.pair_key() == pair_key(players[0], players[1]) {
        return None;
    }
    let rank = |m: MemberId| players.iter().position(|p| *p == m);
    if rank(bout.player1_id) < rank(bout.player2_id) {
        Some(Side::Player1)
    } else {
        Some(Side::Player2)
    }
}

fn decide(engine: &BoutEngine, players: &[MemberId], id: BoutId) -> TournamentResult<BoutUpdate> {
    match outcome(players, &engine.bout(id)?) {
        Some(side) => engine.declare_winner(id, side),
        None => engine.declare_tie(id),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_last_bouts_create_one_playoff() {
    for _ in 0..25 {
        let c = courts();
        let (tid, players) = division_of_four(&c);
        let bouts = c.orchestrator.bouts(tid).unwrap();

        for bout in &bouts[..4] {
            decide(&c.engine, &players, bout.id).unwrap();
        }

        let handles: Vec<_> = bouts[4..]
            .iter()
            .map(|bout| {
                let engine = c.engine.clone();
                let players = players.clone();
                let id = bout.id;
                tokio::task::spawn_blocking(move || decide(&engine, &players, id))
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            created += handle.await.unwrap().unwrap().sudden_death.len();
        }
        assert_eq!(created, 1);

        let playoffs: Vec<_> = c
            .orchestrator
            .bouts(tid)
            .unwrap()
            .into_iter()
            .filter(|b| b.is_sudden_death)
            .collect();
        assert_eq!(playoffs.len(), 1);
        assert_eq!(playoffs[0].pair_key(), pair_key(players[0], players[1]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rechecks_converge() {
    let c = courts();
    let (tid, players) = division_of_four(&c);
    // Results stored without the post-commit check, so the rechecks race
    // to create the playoff.
    for mut bout in c.store.bouts(tid).unwrap() {
        match outcome(&players, &bout) {
            Some(side) => logic::declare_winner(&mut bout, side, Utc::now()),
            None => logic::declare_tie(&mut bout, Utc::now()),
        }
        c.store.replace_bout(&bout).unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orchestrator = c.orchestrator.clone();
            tokio::task::spawn_blocking(move || orchestrator.recheck_sudden_death(tid, "MUD"))
        })
        .collect();
    let mut created = 0;
    for handle in handles {
        created += handle.await.unwrap().unwrap().len();
    }
    assert_eq!(created, 1);

    let playoffs = c
        .orchestrator
        .bouts(tid)
        .unwrap()
        .iter()
        .filter(|b| b.is_sudden_death)
        .count();
    assert_eq!(playoffs, 1);
}
