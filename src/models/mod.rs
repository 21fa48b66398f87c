//! Data structures for the tournament: members, divisions, bouts, court state.

mod bout;
mod court_state;
mod error;
mod group;
mod member;
mod tournament;

pub use bout::{
    pair_key, Bout, BoutFormat, BoutId, BoutStatus, Court, HanteiRound, MatchType, ScoreType, Side,
    SideScore,
};
pub use court_state::{CourtState, CourtStatePatch};
pub use error::{ErrorKind, TournamentError, TournamentResult};
pub use group::{Group, GroupId, SENSEI_GROUP_ID, SENSEI_GROUP_NAME};
pub use member::{Member, MemberId, Participant, ParticipantId};
pub use tournament::{HanteiConfig, Tournament, TournamentId, TournamentStatus, TournamentUpdate};
