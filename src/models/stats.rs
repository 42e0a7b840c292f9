//! Derived statistics series handed to the chart renderer.
//!
//! All rates are percentages in `[0, 100]` and unrounded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Race;

/// Games played in one Monday-aligned UTC week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBucket {
    /// Monday starting the week, serialized as `YYYY-MM-DD`
    pub week_start: NaiveDate,
    pub count: u32,
}

/// One race in the individual race selection view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSelection {
    pub race: Race,
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,

    /// This race's games as a share of all race selections
    pub selection_share: f64,
}

/// Results after Random resolved to a specific race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomResolution {
    pub race: Race,
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// Random picks broken down by realized race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomBreakdown {
    pub resolutions: Vec<RandomResolution>,

    /// Totals summed over all resolutions
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// Individual race selection chart data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSelectionView {
    /// Protoss, Terran, Zerg, Random, in that order
    pub races: Vec<RaceSelection>,
    pub total_games: u32,
    pub random: Option<RandomBreakdown>,
}

impl RaceSelectionView {
    pub fn get(&self, race: Race) -> Option<&RaceSelection> {
        self.races.iter().find(|r| r.race == race)
    }
}

/// Record against one opponent composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentRecord {
    pub opponent: String,
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// One team composition in the frequency / win-rate views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionEntry {
    pub composition: String,

    /// Games played with this composition, mirrors included
    pub selections: u32,
    pub wins: u32,
    pub win_rate: f64,

    /// Share of all compositions' selections
    pub selection_share: f64,

    /// Opponents with at least one game, most games first
    pub opponents: Vec<OpponentRecord>,
}

/// Team compositions sorted two ways.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionViews {
    pub total_selections: u32,
    pub by_frequency: Vec<CompositionEntry>,
    pub by_win_rate: Vec<CompositionEntry>,
}

/// How head-to-head win rates treat games against the same composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorPolicy {
    /// Count mirror games in the aggregate
    #[default]
    Include,
    /// Skip opponents identical to the matchup key
    Exclude,
}

impl std::str::FromStr for MirrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "include" => Ok(MirrorPolicy::Include),
            "exclude" => Ok(MirrorPolicy::Exclude),
            other => Err(format!("unknown mirror policy: {}", other)),
        }
    }
}

/// Head-to-head win rate for one matchup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupEntry {
    pub matchup: String,
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,

    /// Opponents with at least one game, best win rate first
    pub opponents: Vec<OpponentRecord>,
}

/// Race selection win rate (`rs`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSelectionWinRate {
    pub key: String,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// One member composition of a team group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamVariant {
    pub key: String,
    pub label: String,
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
    pub win_rate: f64,
}

/// Race-pair category with its summed record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGroup {
    pub group: String,
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
    pub win_rate: f64,

    /// Members present in the data, best win rate first
    pub variants: Vec<TeamVariant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_bucket_serializes_iso_date() {
        let bucket = WeekBucket {
            week_start: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            count: 4,
        };
        let json = serde_json::to_value(bucket).unwrap();
        assert_eq!(json["week_start"], "2025-06-16");
        assert_eq!(json["count"], 4);
    }

    #[test]
    fn test_mirror_policy_parse() {
        assert_eq!("include".parse::<MirrorPolicy>(), Ok(MirrorPolicy::Include));
        assert_eq!("Exclude".parse::<MirrorPolicy>(), Ok(MirrorPolicy::Exclude));
        assert!("sometimes".parse::<MirrorPolicy>().is_err());
        assert_eq!(MirrorPolicy::default(), MirrorPolicy::Include);
    }

    #[test]
    fn test_race_serializes_lowercase() {
        let selection = RaceSelection {
            race: Race::Zerg,
            wins: 1,
            games: 2,
            win_rate: 50.0,
            selection_share: 10.0,
        };
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["race"], "zerg");
    }
}
