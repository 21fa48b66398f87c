//! Kendo dojo tournament engine: library with models, scoring logic, storage
//! contract and the services the web binary exposes.

pub mod clock;
pub mod config;
pub mod engine;
pub mod logic;
pub mod models;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ServerConfig, TournamentDefaults};
pub use engine::{
    generate_sudden_death, BoutEngine, BoutUpdate, CourtService, RemovalSummary, RosterService,
    TournamentOrchestrator,
};
pub use logic::{compute_standings, round_robin_with_rest, StandingRow};
pub use models::{
    pair_key, Bout, BoutFormat, BoutId, BoutStatus, Court, CourtState, CourtStatePatch, ErrorKind, Group,
    GroupId, HanteiConfig, HanteiRound, MatchType, Member, MemberId, Participant, ScoreType, Side,
    SideScore, Tournament, TournamentError, TournamentId, TournamentResult, TournamentStatus,
    TournamentUpdate, SENSEI_GROUP_ID,
};
pub use store::{MemoryStore, TournamentStore};
