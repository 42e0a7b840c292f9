//! Win/loss counters as they appear in the statistics documents.
//!
//! Each source field has a fixed encoding; decoding happens here so the
//! aggregators only ever see named fields.

use serde::{Deserialize, Serialize};

/// Win rate in percent, 0 when there are no games.
pub fn win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64 * 100.0
    }
}

/// `count` as a percentage of `total`, 0 when `total` is 0.
pub fn share_of(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// A `[wins, games]` pair (`irs`, `muwr`, `muwrr`, `rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct WinGames {
    pub wins: u32,
    pub games: u32,
}

impl WinGames {
    pub fn new(wins: u32, games: u32) -> Self {
        Self { wins, games }
    }

    pub fn losses(&self) -> u32 {
        self.games.saturating_sub(self.wins)
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.games)
    }
}

impl From<(u32, u32)> for WinGames {
    fn from((wins, games): (u32, u32)) -> Self {
        Self { wins, games }
    }
}

impl From<WinGames> for (u32, u32) {
    fn from(value: WinGames) -> Self {
        (value.wins, value.games)
    }
}

impl std::ops::Add for WinGames {
    type Output = WinGames;

    fn add(self, rhs: WinGames) -> WinGames {
        WinGames::new(self.wins + rhs.wins, self.games + rhs.games)
    }
}

impl std::iter::Sum for WinGames {
    fn sum<I: Iterator<Item = WinGames>>(iter: I) -> Self {
        iter.fold(WinGames::default(), |acc, x| acc + x)
    }
}

/// Normalized `(wins, losses)` counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

impl WinLoss {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    pub fn total(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.total())
    }
}

impl std::ops::Add for WinLoss {
    type Output = WinLoss;

    fn add(self, rhs: WinLoss) -> WinLoss {
        WinLoss::new(self.wins + rhs.wins, self.losses + rhs.losses)
    }
}

impl std::iter::Sum for WinLoss {
    fn sum<I: Iterator<Item = WinLoss>>(iter: I) -> Self {
        iter.fold(WinLoss::default(), |acc, x| acc + x)
    }
}

/// Team-composition counter (`wlp`): either `[wins, games]` or `{wins, losses}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TeamCounter {
    Pair(u32, u32),
    Split {
        #[serde(default)]
        wins: u32,
        #[serde(default)]
        losses: u32,
    },
}

impl TeamCounter {
    /// Normalize to wins/losses. The pair form stores games, not losses.
    pub fn normalize(&self) -> WinLoss {
        match *self {
            TeamCounter::Pair(wins, games) => WinLoss::new(wins, games.saturating_sub(wins)),
            TeamCounter::Split { wins, losses } => WinLoss::new(wins, losses),
        }
    }
}

/// A `[mmrDeltaTotal, wins, losses]` triple (`pwr`, `pwm`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Option<f64>>")]
pub struct MmrDelta {
    pub total: f64,
    pub wins: u32,
    pub losses: u32,
}

impl From<Vec<Option<f64>>> for MmrDelta {
    fn from(raw: Vec<Option<f64>>) -> Self {
        let at = |i: usize| raw.get(i).copied().flatten().unwrap_or(0.0);
        Self {
            total: at(0),
            wins: at(1).max(0.0) as u32,
            losses: at(2).max(0.0) as u32,
        }
    }
}

impl MmrDelta {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Average rating change per game, 0 without games.
    pub fn per_game(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => self.total / games as f64,
        }
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.games())
    }
}
