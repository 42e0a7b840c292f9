//! Races and race-letter keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four playable races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Protoss,
    Terran,
    Zerg,
    Random,
}

impl Race {
    /// Races in storage order (`p`, `t`, `z`, `r`).
    pub const ALL: [Race; 4] = [Race::Protoss, Race::Terran, Race::Zerg, Race::Random];

    /// Races a Random pick can resolve to, in storage order.
    pub const REALIZED: [Race; 3] = [Race::Protoss, Race::Terran, Race::Zerg];

    /// Parse a single race letter.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Race::Protoss),
            't' => Some(Race::Terran),
            'z' => Some(Race::Zerg),
            'r' => Some(Race::Random),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Race::Protoss => 'p',
            Race::Terran => 't',
            Race::Zerg => 'z',
            Race::Random => 'r',
        }
    }

    /// Position in storage order, used to index per-race tuples.
    pub fn storage_index(&self) -> usize {
        match self {
            Race::Protoss => 0,
            Race::Terran => 1,
            Race::Zerg => 2,
            Race::Random => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Race::Protoss => "Protoss",
            Race::Terran => "Terran",
            Race::Zerg => "Zerg",
            Race::Random => "Random",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Race as recorded for a single match participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "race")]
pub enum PlayedRace {
    /// Picked a race directly.
    Picked(Race),
    /// Picked Random without a recorded resolution.
    Random,
    /// Picked Random and was assigned the given race.
    RandomAs(Race),
    Unknown,
}

impl PlayedRace {
    /// Normalize a per-match race code (`p`, `pp`, `rt`, ...).
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "p" | "pp" => PlayedRace::Picked(Race::Protoss),
            "t" | "tt" => PlayedRace::Picked(Race::Terran),
            "z" | "zz" => PlayedRace::Picked(Race::Zerg),
            "r" | "rr" => PlayedRace::Random,
            "rp" => PlayedRace::RandomAs(Race::Protoss),
            "rt" => PlayedRace::RandomAs(Race::Terran),
            "rz" => PlayedRace::RandomAs(Race::Zerg),
            _ => PlayedRace::Unknown,
        }
    }
}

impl fmt::Display for PlayedRace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayedRace::Picked(race) => write!(f, "{}", race),
            PlayedRace::Random => write!(f, "Random"),
            PlayedRace::RandomAs(race) => write!(f, "Random → {}", race),
            PlayedRace::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Describe a two-letter race code from a team-composition key (`pp`, `rz`, ...).
pub fn describe_slot(code: &str) -> Option<String> {
    let mut chars = code.chars();
    let first = Race::from_letter(chars.next()?)?;
    let second = Race::from_letter(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    match (first, second) {
        (Race::Random, resolved) if resolved != Race::Random => {
            Some(format!("Random → {}", resolved))
        }
        (a, b) if a == b => Some(a.name().to_string()),
        _ => None,
    }
}
