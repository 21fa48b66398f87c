//! Tournament and TournamentStatus.

use crate::config::TournamentDefaults;
use crate::models::error::{TournamentError, TournamentResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Entering participants; bouts may be generated.
    #[default]
    Setup,
    InProgress,
    Completed,
}

/// Technique combos shown in the two hantei rounds.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HanteiConfig {
    pub round1: String,
    pub round2: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: NaiveDate,
    pub status: TournamentStatus,
    pub hantei_config: HanteiConfig,
    /// Timer lengths (seconds) offered to court keepers.
    pub timer_options: Vec<u32>,
    /// Timer length given to new point-scored bouts.
    pub default_timer_duration: u32,
}

/// Optional field changes for [`Tournament::apply_update`]; `None` leaves a field alone.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub hantei_config: Option<HanteiConfig>,
    pub timer_options: Option<Vec<u32>>,
    pub default_timer_duration: Option<u32>,
}

impl Tournament {
    /// Create a new tournament in Setup.
    pub fn new(name: impl Into<String>, date: NaiveDate, defaults: &TournamentDefaults) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            status: TournamentStatus::Setup,
            hantei_config: defaults.hantei_config.clone(),
            timer_options: defaults.timer_options.clone(),
            default_timer_duration: defaults.default_timer_duration,
        }
    }

    pub fn apply_update(&mut self, update: TournamentUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(hantei_config) = update.hantei_config {
            self.hantei_config = hantei_config;
        }
        if let Some(timer_options) = update.timer_options {
            self.timer_options = timer_options;
        }
        if let Some(default_timer_duration) = update.default_timer_duration {
            self.default_timer_duration = default_timer_duration;
        }
    }

    /// Setup -> InProgress.
    pub fn start(&mut self) -> TournamentResult<()> {
        self.require(TournamentStatus::Setup)?;
        self.status = TournamentStatus::InProgress;
        Ok(())
    }

    /// InProgress -> Completed.
    pub fn complete(&mut self) -> TournamentResult<()> {
        self.require(TournamentStatus::InProgress)?;
        self.status = TournamentStatus::Completed;
        Ok(())
    }

    pub fn require(&self, expected: TournamentStatus) -> TournamentResult<()> {
        if self.status != expected {
            return Err(TournamentError::TournamentStatus {
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }
}
