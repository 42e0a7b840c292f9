//! Player ratings and match history as published per season.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::ids::LooseKey;
use super::{win_rate, PlayedRace, PlayerId, Race};

/// Minimum games for a player to appear in the ranking.
pub const MIN_RANKED_GAMES: u32 = 10;

/// Errors decoding fixed-position rating tuples.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("Player {player}: missing rating field {index} ({field})")]
    MissingField {
        player: PlayerId,
        index: usize,
        field: &'static str,
    },

    #[error("Player {player}: field {index} ({field}) has invalid value {value}")]
    InvalidValue {
        player: PlayerId,
        index: usize,
        field: &'static str,
        value: f64,
    },
}

/// Raw ratings snapshot (`ratings.json`): player id → numeric tuple.
pub type RatingsTable = BTreeMap<PlayerId, Vec<Option<f64>>>;

/// Names of the tuple positions, by index.
const TUPLE_FIELDS: [&str; 21] = [
    "games",
    "mu",
    "sigma",
    "wins",
    "protoss picks",
    "terran picks",
    "zerg picks",
    "random picks",
    "last activity",
    "unused",
    "protoss wins",
    "terran wins",
    "zerg wins",
    "random wins",
    "unused",
    "random as protoss wins",
    "random as terran wins",
    "random as zerg wins",
    "random as protoss losses",
    "random as terran losses",
    "random as zerg losses",
];

/// Positions every snapshot must carry; older snapshots stop after index 8.
const REQUIRED_FIELDS: usize = 9;

/// Player statistics decoded from one ratings tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub games: u32,
    pub mu: f64,
    pub sigma: f64,
    pub wins: u32,

    /// Games per race, storage order (p, t, z, r)
    pub picks: [u32; 4],

    /// Wins per race, storage order (p, t, z, r)
    pub race_wins: [u32; 4],

    /// Last activity, epoch milliseconds
    pub last_active_ms: i64,

    /// Wins after Random resolved to p, t, z
    pub random_wins: [u32; 3],

    /// Losses after Random resolved to p, t, z
    pub random_losses: [u32; 3],
}

impl PlayerRecord {
    /// Decode the fixed-position ratings tuple.
    ///
    /// Layout: 0 games, 1 mu, 2 sigma, 3 wins, 4-7 picks (p,t,z,r),
    /// 8 timestamp, 9 skipped, 10-13 race wins (p,t,z,r), 14 skipped,
    /// 15-17 random sub-race wins (p,t,z), 18-20 random sub-race losses (p,t,z).
    pub fn decode(id: PlayerId, tuple: &[Option<f64>]) -> Result<Self, DecodeError> {
        let value = |index: usize| -> Result<f64, DecodeError> {
            match tuple.get(index).copied().flatten() {
                Some(v) if v.is_finite() => Ok(v),
                Some(v) => Err(DecodeError::InvalidValue {
                    player: id.clone(),
                    index,
                    field: TUPLE_FIELDS[index],
                    value: v,
                }),
                None if index < REQUIRED_FIELDS => Err(DecodeError::MissingField {
                    player: id.clone(),
                    index,
                    field: TUPLE_FIELDS[index],
                }),
                None => Ok(0.0),
            }
        };
        let count = |index: usize| -> Result<u32, DecodeError> {
            let v = value(index)?;
            if v < 0.0 || v > u32::MAX as f64 {
                return Err(DecodeError::InvalidValue {
                    player: id.clone(),
                    index,
                    field: TUPLE_FIELDS[index],
                    value: v,
                });
            }
            Ok(v.round() as u32)
        };

        Ok(Self {
            games: count(0)?,
            mu: value(1)?,
            sigma: value(2)?,
            wins: count(3)?,
            picks: [count(4)?, count(5)?, count(6)?, count(7)?],
            last_active_ms: value(8)? as i64,
            race_wins: [count(10)?, count(11)?, count(12)?, count(13)?],
            random_wins: [count(15)?, count(16)?, count(17)?],
            random_losses: [count(18)?, count(19)?, count(20)?],
            id,
        })
    }

    pub fn losses(&self) -> u32 {
        self.games.saturating_sub(self.wins)
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.games)
    }

    pub fn picks_of(&self, race: Race) -> u32 {
        self.picks[race.storage_index()]
    }

    pub fn wins_with(&self, race: Race) -> u32 {
        self.race_wins[race.storage_index()]
    }

    pub fn is_ranked(&self, min_games: u32) -> bool {
        self.games >= min_games
    }
}

/// One side's participant in a match record: `[id, race, mu, sigma, muChange]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParticipantRepr")]
pub struct Participant {
    pub id: PlayerId,
    pub race: PlayedRace,

    /// Rating after the match
    pub mu: f64,
    pub sigma: f64,
    pub mu_change: f64,
}

#[derive(Deserialize)]
struct ParticipantRepr(PlayerId, Option<String>, f64, Option<f64>, Option<f64>);

impl From<ParticipantRepr> for Participant {
    fn from(ParticipantRepr(id, race, mu, sigma, mu_change): ParticipantRepr) -> Self {
        Self {
            id,
            race: race
                .as_deref()
                .map(PlayedRace::from_code)
                .unwrap_or(PlayedRace::Unknown),
            mu,
            sigma: sigma.unwrap_or(0.0),
            mu_change: mu_change.unwrap_or(0.0),
        }
    }
}

impl Participant {
    /// Rating before the match.
    pub fn mu_before(&self) -> f64 {
        self.mu - self.mu_change
    }
}

/// One match from `players/{id}.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchRecord {
    pub winners: Vec<Participant>,
    pub losers: Vec<Participant>,

    /// End time, epoch milliseconds
    #[serde(deserialize_with = "deserialize_millis")]
    pub end_time: i64,

    /// Game length in milliseconds
    #[serde(default, deserialize_with = "deserialize_optional_millis")]
    pub game_length: Option<i64>,

    #[serde(deserialize_with = "deserialize_loose_key")]
    pub map_id: String,

    /// The player's rating after this match
    #[serde(default)]
    pub mmr: Option<f64>,
}

impl MatchRecord {
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        self.winners.iter().any(|p| &p.id == player)
    }
}

fn deserialize_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    f64::deserialize(deserializer).map(|v| v as i64)
}

fn deserialize_optional_millis<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<f64>::deserialize(deserializer).map(|v| v.map(|v| v as i64))
}

fn deserialize_loose_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    LooseKey::deserialize(deserializer).map(LooseKey::into_string)
}
