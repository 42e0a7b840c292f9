//! Identifiers for seasons and players.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season identifier. Seasons are small integers, keyed as strings in JSON.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SeasonId(u32);

impl SeasonId {
    /// Season used when the current season cannot be determined.
    pub const FALLBACK: SeasonId = SeasonId(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeasonId({})", self.0)
    }
}

impl FromStr for SeasonId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u32> for SeasonId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Player identifier as used by the ladder (ratings keys, file names).
///
/// Match records sometimes carry numeric ids, so deserialization accepts
/// either a JSON string or a JSON integer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A lookup key that may be written as a JSON string or number.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseKey {
    Text(String),
    Int(i64),
    Float(f64),
}

impl LooseKey {
    pub(crate) fn into_string(self) -> String {
        match self {
            LooseKey::Text(s) => s,
            LooseKey::Int(n) => n.to_string(),
            LooseKey::Float(n) if n.fract() == 0.0 => format!("{}", n as i64),
            LooseKey::Float(n) => n.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        LooseKey::deserialize(deserializer).map(|k| Self(k.into_string()))
    }
}
