//! Player-facing views: leaderboard rows, profiles, rating deltas, match history.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::{PlayedRace, PlayerId, Race};

/// Leaderboard position. Players below the games threshold are unranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Ranked(u32),
    Unranked,
}

impl Rank {
    pub fn position(&self) -> Option<u32> {
        match self {
            Rank::Ranked(n) => Some(*n),
            Rank::Unranked => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Ranked(n) => write!(f, "{}", n),
            Rank::Unranked => write!(f, "—"),
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.position().serialize(serializer)
    }
}

/// One row of the season leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub id: PlayerId,
    pub name: String,
    pub main_race: Option<Race>,
    pub mu: f64,
    pub sigma: f64,
    pub wins: u32,
    pub losses: u32,
    pub last_active_ms: i64,
    pub last_active: String,
}

/// A player's record with one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceRecord {
    pub race: Race,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
}

/// A player's record after Random resolved to `race`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomRecord {
    pub race: Race,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
}

/// Overview of a single player for the current season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub rank: Rank,
    pub mu: f64,
    pub sigma: f64,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub main_race: Option<Race>,
    pub races: Vec<RaceRecord>,
    pub random: Vec<RandomRecord>,
}

/// Which value an MMR-delta chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MmrMode {
    #[default]
    Total,
    PerGame,
}

impl MmrMode {
    pub fn toggled(self) -> Self {
        match self {
            MmrMode::Total => MmrMode::PerGame,
            MmrMode::PerGame => MmrMode::Total,
        }
    }
}

/// Rating gained or lost while playing one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceMmr {
    pub race: Race,
    pub total: f64,
    pub per_game: f64,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// Rating gained or lost with one team composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCompMmr {
    pub key: String,

    /// Display label such as `(P)T`
    pub label: String,
    pub total: f64,
    pub per_game: f64,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// A labelled value in an MMR-delta chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MmrBar {
    pub label: String,
    pub value: f64,
}

/// A match participant prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantView {
    pub id: PlayerId,
    pub name: String,
    pub race: PlayedRace,
    pub mu_before: f64,
    pub mu_after: f64,
    pub mu_change: f64,
}

/// One entry of a player's match history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub won: bool,
    pub team: Vec<ParticipantView>,
    pub opponents: Vec<ParticipantView>,
    pub map: String,

    /// Game length as `m:ss`
    pub duration: String,
    pub end_time: i64,
    pub ended: String,
}

/// Rating after the n-th game of the season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingPoint {
    pub game: u32,
    pub mmr: f64,
}
