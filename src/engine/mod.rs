//! Services that apply the tournament logic to stored records.

mod bouts;
mod courts;
mod orchestrator;
mod playoffs;
mod roster;

pub use bouts::{BoutEngine, BoutUpdate};
pub use courts::CourtService;
pub use orchestrator::{RemovalSummary, TournamentOrchestrator};
pub use playoffs::generate_sudden_death;
pub use roster::RosterService;

use crate::models::{BoutFormat, Court, Group, Tournament};

/// Format for new bouts of a division on the given court.
pub(crate) fn division_format(group: &Group, court: Court, tournament: &Tournament) -> BoutFormat {
    BoutFormat {
        court,
        match_type: group.default_match_type(),
        timer_duration: group.default_timer_duration(tournament.default_timer_duration),
    }
}
