//! Team composition frequency and head-to-head win rates.

use std::collections::BTreeMap;

use crate::models::{
    share_of, win_rate, CompositionEntry, CompositionViews, MatchupEntry, MatchupTable,
    MirrorPolicy, OpponentRecord, WinGames,
};

fn opponent_records(opponents: &BTreeMap<String, WinGames>) -> Vec<OpponentRecord> {
    opponents
        .iter()
        .filter(|(_, record)| record.games > 0)
        .map(|(opponent, record)| OpponentRecord {
            opponent: opponent.clone(),
            wins: record.wins,
            games: record.games,
            win_rate: record.win_rate(),
        })
        .collect()
}

/// Composition selections and win rates from `muwr`.
///
/// Totals include mirror games. The two views share entries but are sorted
/// independently: by selections and by win rate, both descending.
pub fn composition_views(muwr: &MatchupTable) -> CompositionViews {
    let totals: Vec<(&String, WinGames)> = muwr
        .iter()
        .map(|(composition, opponents)| (composition, opponents.values().copied().sum()))
        .collect();
    let total_selections: u32 = totals.iter().map(|(_, record)| record.games).sum();

    let entries: Vec<CompositionEntry> = totals
        .into_iter()
        .map(|(composition, record)| {
            let mut opponents = opponent_records(&muwr[composition]);
            opponents.sort_by(|a, b| b.games.cmp(&a.games));
            CompositionEntry {
                composition: composition.clone(),
                selections: record.games,
                wins: record.wins,
                win_rate: record.win_rate(),
                selection_share: share_of(record.games, total_selections),
                opponents,
            }
        })
        .collect();

    let mut by_frequency = entries.clone();
    by_frequency.sort_by(|a, b| b.selections.cmp(&a.selections));

    let mut by_win_rate = entries;
    by_win_rate.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

    CompositionViews {
        total_selections,
        by_frequency,
        by_win_rate,
    }
}

/// Head-to-head win rate per matchup from `muwrr`, best first.
pub fn matchup_win_rates(muwrr: &MatchupTable, mirrors: MirrorPolicy) -> Vec<MatchupEntry> {
    let mut entries: Vec<MatchupEntry> = muwrr
        .iter()
        .map(|(matchup, opponents)| {
            let counted: WinGames = opponents
                .iter()
                .filter(|(opponent, _)| {
                    mirrors == MirrorPolicy::Include || opponent.as_str() != matchup.as_str()
                })
                .map(|(_, record)| *record)
                .sum();

            let mut breakdown = opponent_records(opponents);
            breakdown.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

            MatchupEntry {
                matchup: matchup.clone(),
                wins: counted.wins,
                games: counted.games,
                win_rate: win_rate(counted.wins, counted.games),
                opponents: breakdown,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    entries
}
