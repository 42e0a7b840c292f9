//! Ladder seasons - time periods starting at published boundaries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SeasonId;

/// Errors resolving the current season.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeasonError {
    #[error("No seasons defined")]
    NotFound,

    #[error("Invalid season id: {0}")]
    InvalidId(String),
}

/// A season and the instant it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStart {
    pub season: SeasonId,

    /// Start time in epoch milliseconds
    pub start_ms: i64,
}

impl SeasonStart {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_ms)
    }
}

/// Season boundaries, kept sorted ascending by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeasonBoundaries {
    seasons: Vec<SeasonStart>,
}

impl SeasonBoundaries {
    /// Build from `season_start.json` (season id string → epoch milliseconds).
    pub fn from_raw(raw: &HashMap<String, i64>) -> Result<Self, SeasonError> {
        let seasons = raw
            .iter()
            .map(|(id, &start_ms)| {
                let season = id
                    .parse::<SeasonId>()
                    .map_err(|_| SeasonError::InvalidId(id.clone()))?;
                Ok(SeasonStart { season, start_ms })
            })
            .collect::<Result<Vec<_>, SeasonError>>()?;
        Ok(Self::new(seasons))
    }

    pub fn new(mut seasons: Vec<SeasonStart>) -> Self {
        // Ties on start time fall back to id order so resolution is deterministic
        seasons.sort_by_key(|s| (s.start_ms, s.season));
        Self { seasons }
    }

    pub fn all(&self) -> &[SeasonStart] {
        &self.seasons
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// The season in effect at `now_ms`.
    ///
    /// This is the season with the latest start not after `now_ms`. If no
    /// season has started yet, the earliest season is returned.
    pub fn current_at(&self, now_ms: i64) -> Result<SeasonId, SeasonError> {
        let mut sorted = self.seasons.iter();
        let mut current = sorted.next().ok_or(SeasonError::NotFound)?;
        if now_ms < current.start_ms {
            return Ok(current.season);
        }
        for season in sorted {
            if now_ms >= season.start_ms {
                current = season;
            } else {
                break;
            }
        }
        Ok(current.season)
    }

    /// The season in effect right now.
    pub fn current(&self) -> Result<SeasonId, SeasonError> {
        self.current_at(Utc::now().timestamp_millis())
    }

    pub fn get(&self, season: SeasonId) -> Option<&SeasonStart> {
        self.seasons.iter().find(|s| s.season == season)
    }
}

/// Resolve the current season from raw boundaries and a wall-clock instant.
pub fn resolve_current_season(
    boundaries: &HashMap<String, i64>,
    now_ms: i64,
) -> Result<SeasonId, SeasonError> {
    SeasonBoundaries::from_raw(boundaries)?.current_at(now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundaries(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries
            .iter()
            .map(|(id, start)| (id.to_string(), *start))
            .collect()
    }

    #[test]
    fn test_resolve_latest_started_season() {
        let raw = boundaries(&[("1", 1_000), ("2", 2_000), ("3", 3_000)]);

        assert_eq!(resolve_current_season(&raw, 2_500).unwrap(), SeasonId::new(2));
        assert_eq!(resolve_current_season(&raw, 3_000).unwrap(), SeasonId::new(3));
        assert_eq!(resolve_current_season(&raw, 99_000).unwrap(), SeasonId::new(3));
    }

    #[test]
    fn test_resolve_before_any_season_uses_earliest() {
        let raw = boundaries(&[("4", 5_000), ("3", 4_000)]);
        assert_eq!(resolve_current_season(&raw, 10).unwrap(), SeasonId::new(3));
    }

    #[test]
    fn test_resolve_ignores_declaration_order() {
        // Ids are not ordered by start time
        let raw = boundaries(&[("7", 3_000), ("2", 1_000), ("5", 2_000)]);
        assert_eq!(resolve_current_season(&raw, 2_100).unwrap(), SeasonId::new(5));
    }

    #[test]
    fn test_resolve_empty_is_not_found() {
        let raw = HashMap::new();
        assert_eq!(resolve_current_season(&raw, 0), Err(SeasonError::NotFound));
    }

    #[test]
    fn test_invalid_season_id() {
        let raw = boundaries(&[("spring", 1_000)]);
        assert_eq!(
            resolve_current_season(&raw, 2_000),
            Err(SeasonError::InvalidId("spring".to_string()))
        );
    }

    #[test]
    fn test_resolved_season_is_latest_started() {
        let raw = boundaries(&[("0", 0), ("1", 1_700), ("2", 1_200), ("3", 4_000), ("4", 2_900)]);
        let parsed = SeasonBoundaries::from_raw(&raw).unwrap();

        for now in [0, 1_199, 1_200, 1_700, 2_899, 2_900, 3_999, 4_000, 8_000] {
            let season = parsed.current_at(now).unwrap();
            let start = parsed.get(season).unwrap().start_ms;
            assert!(start <= now);
            assert!(parsed
                .all()
                .iter()
                .filter(|s| s.start_ms <= now)
                .all(|s| s.start_ms <= start));
        }
    }

    #[test]
    fn test_boundaries_sorted_by_start() {
        let raw = boundaries(&[("2", 2_000), ("1", 1_000)]);
        let parsed = SeasonBoundaries::from_raw(&raw).unwrap();
        let ids: Vec<u32> = parsed.all().iter().map(|s| s.season.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_season_start_time() {
        let start = SeasonStart {
            season: SeasonId::new(1),
            start_ms: 1_700_000_000_000,
        };
        assert_eq!(start.start_time().unwrap().timestamp(), 1_700_000_000);
    }
}
