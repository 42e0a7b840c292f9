//! Per-race selection views.

use std::collections::BTreeMap;

use crate::models::{
    share_of, win_rate, Race, RaceSelection, RaceSelectionData, RaceSelectionView,
    RaceSelectionWinRate, RandomBreakdown, RandomResolution, WinGames,
};

/// Selections, wins and win rate for each race, with the Random breakdown.
pub fn race_selection_view(irs: &RaceSelectionData) -> RaceSelectionView {
    let total_games: u32 = Race::ALL.iter().map(|&race| irs.get(race).games).sum();

    let races = Race::ALL
        .iter()
        .map(|&race| {
            let record = irs.get(race);
            RaceSelection {
                race,
                wins: record.wins,
                games: record.games,
                win_rate: record.win_rate(),
                selection_share: share_of(record.games, total_games),
            }
        })
        .collect();

    RaceSelectionView {
        races,
        total_games,
        random: irs.x.as_ref().map(random_breakdown),
    }
}

/// Random results by realized race, plus the aggregate over all resolutions.
fn random_breakdown(resolved: &BTreeMap<String, WinGames>) -> RandomBreakdown {
    let resolutions: Vec<RandomResolution> = Race::REALIZED
        .iter()
        .filter_map(|&race| {
            let record = resolved.get(race.letter().to_string().as_str())?;
            Some(RandomResolution {
                race,
                wins: record.wins,
                games: record.games,
                win_rate: record.win_rate(),
            })
        })
        .collect();

    let wins = resolutions.iter().map(|r| r.wins).sum();
    let games = resolutions.iter().map(|r| r.games).sum();

    RandomBreakdown {
        resolutions,
        wins,
        games,
        win_rate: win_rate(wins, games),
    }
}

/// Race selection win rates (`rs`), best first.
pub fn race_selection_win_rates(rs: &BTreeMap<String, WinGames>) -> Vec<RaceSelectionWinRate> {
    let mut entries: Vec<RaceSelectionWinRate> = rs
        .iter()
        .map(|(key, record)| RaceSelectionWinRate {
            key: key.clone(),
            wins: record.wins,
            losses: record.losses(),
            games: record.games,
            win_rate: record.win_rate(),
        })
        .collect();
    entries.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    entries
}
