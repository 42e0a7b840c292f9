//! Typed shapes of the published JSON documents.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{MmrDelta, PlayerId, Race, TeamCounter, WinGames};

/// Composition key → opponent key → `[wins, games]` (`muwr`, `muwrr`).
pub type MatchupTable = BTreeMap<String, BTreeMap<String, WinGames>>;

/// Individual race selection (`irs`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceSelectionData {
    #[serde(default)]
    pub p: Option<WinGames>,
    #[serde(default)]
    pub t: Option<WinGames>,
    #[serde(default)]
    pub z: Option<WinGames>,
    #[serde(default)]
    pub r: Option<WinGames>,

    /// What Random picks resolved to, keyed by realized race letter
    #[serde(default)]
    pub x: Option<BTreeMap<String, WinGames>>,
}

impl RaceSelectionData {
    pub fn get(&self, race: Race) -> WinGames {
        match race {
            Race::Protoss => self.p,
            Race::Terran => self.t,
            Race::Zerg => self.z,
            Race::Random => self.r,
        }
        .unwrap_or_default()
    }
}

/// Per-race rating delta totals for one player (`pwr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceMmrData {
    #[serde(default)]
    pub p: Option<MmrDelta>,
    #[serde(default)]
    pub t: Option<MmrDelta>,
    #[serde(default)]
    pub z: Option<MmrDelta>,
}

/// `data/seasons/{season}/statistics_data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsData {
    /// Match end timestamps (epoch milliseconds)
    #[serde(default)]
    pub activity: Vec<i64>,

    #[serde(default)]
    pub irs: RaceSelectionData,

    /// Head-to-head matchup win rates
    #[serde(default)]
    pub muwrr: MatchupTable,

    /// Team composition frequency and win rates
    #[serde(default)]
    pub muwr: MatchupTable,

    #[serde(default)]
    pub rs: BTreeMap<String, WinGames>,

    #[serde(default)]
    pub wlp: BTreeMap<String, TeamCounter>,

    #[serde(default)]
    pub pwr: HashMap<PlayerId, RaceMmrData>,

    #[serde(default)]
    pub pwm: HashMap<PlayerId, BTreeMap<String, MmrDelta>>,
}

/// `data/proc_data.json`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProcData {
    /// Last processing run, in epoch seconds or milliseconds
    pub last_process: f64,
}

impl ProcData {
    /// Last processing time in epoch milliseconds.
    ///
    /// Values below 1e12 are taken to be seconds.
    pub fn last_process_ms(&self) -> i64 {
        if self.last_process < 1e12 {
            (self.last_process * 1000.0) as i64
        } else {
            self.last_process as i64
        }
    }
}

/// Id → display name table (`names.json`, `maps.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTable(HashMap<String, String>);

impl NameTable {
    /// Display name for `id`, or the id itself when unknown.
    pub fn display(&self, id: &str) -> String {
        self.0
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
