//! Player projections: ranking, profiles, rating deltas and match history.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::recency::{format_duration, time_ago};
use crate::models::{
    win_rate, DecodeError, LeaderboardRow, MatchRecord, MatchSummary, MmrBar, MmrDelta, MmrMode,
    NameTable, Participant, ParticipantView, PlayerId, PlayerProfile, PlayerRecord, Race,
    RaceMmr, RaceMmrData, RaceRecord, RandomRecord, Rank, RatingPoint, RatingsTable, TeamCompMmr,
};

/// Widest bar drawn in the team-composition chart.
pub const MAX_BAR_THICKNESS: u32 = 44;

/// Total bar thickness shared between all team-composition bars.
const BAR_QUOTA: u32 = 132;

/// Decode every ratings tuple, in player id order.
pub fn project_players(ratings: &RatingsTable) -> Result<Vec<PlayerRecord>, DecodeError> {
    ratings
        .iter()
        .map(|(id, tuple)| PlayerRecord::decode(id.clone(), tuple))
        .collect()
}

/// Players with at least `min_games`, highest mu first.
///
/// The sort is stable, so equal ratings keep their input order.
pub fn ranked_players(records: &[PlayerRecord], min_games: u32) -> Vec<&PlayerRecord> {
    let mut eligible: Vec<&PlayerRecord> =
        records.iter().filter(|r| r.is_ranked(min_games)).collect();
    eligible.sort_by(|a, b| b.mu.total_cmp(&a.mu));
    eligible
}

/// Rank for every player; those under `min_games` are unranked.
pub fn rank_of(records: &[PlayerRecord], min_games: u32) -> HashMap<PlayerId, Rank> {
    let mut ranks: HashMap<PlayerId, Rank> = records
        .iter()
        .map(|r| (r.id.clone(), Rank::Unranked))
        .collect();
    for (position, record) in ranked_players(records, min_games).into_iter().enumerate() {
        ranks.insert(record.id.clone(), Rank::Ranked(position as u32 + 1));
    }
    ranks
}

/// Race with the most picks. Candidates are checked in the order Protoss,
/// Zerg, Terran, Random and the first maximum wins. No picks gives `None`.
pub fn most_played_race(picks: [u32; 4]) -> Option<Race> {
    let mut best: Option<(Race, u32)> = None;
    for race in [Race::Protoss, Race::Zerg, Race::Terran, Race::Random] {
        let count = picks[race.storage_index()];
        if count == 0 {
            continue;
        }
        match best {
            Some((_, top)) if top >= count => {}
            _ => best = Some((race, count)),
        }
    }
    best.map(|(race, _)| race)
}

/// Season leaderboard of ranked players.
pub fn leaderboard(
    records: &[PlayerRecord],
    names: &NameTable,
    min_games: u32,
    now_ms: i64,
) -> Vec<LeaderboardRow> {
    ranked_players(records, min_games)
        .into_iter()
        .enumerate()
        .map(|(position, record)| LeaderboardRow {
            rank: position as u32 + 1,
            id: record.id.clone(),
            name: names.display(record.id.as_str()),
            main_race: most_played_race(record.picks),
            mu: record.mu,
            sigma: record.sigma,
            wins: record.wins,
            losses: record.losses(),
            last_active_ms: record.last_active_ms,
            last_active: time_ago(record.last_active_ms, now_ms),
        })
        .collect()
}

/// Profile of one player, or `None` if they have no ratings entry.
pub fn player_profile(
    records: &[PlayerRecord],
    player: &PlayerId,
    names: &NameTable,
    min_games: u32,
) -> Option<PlayerProfile> {
    let record = records.iter().find(|r| &r.id == player)?;
    let rank = ranked_players(records, min_games)
        .iter()
        .position(|r| &r.id == player)
        .map_or(Rank::Unranked, |i| Rank::Ranked(i as u32 + 1));

    let races = Race::ALL
        .iter()
        .map(|&race| {
            let games = record.picks_of(race);
            let wins = record.wins_with(race);
            RaceRecord {
                race,
                games,
                wins,
                losses: games.saturating_sub(wins),
                win_rate: win_rate(wins, games),
            }
        })
        .collect();

    let random = Race::REALIZED
        .iter()
        .enumerate()
        .map(|(i, &race)| {
            let wins = record.random_wins[i];
            let losses = record.random_losses[i];
            RandomRecord {
                race,
                wins,
                losses,
                win_rate: win_rate(wins, wins + losses),
            }
        })
        .collect();

    Some(PlayerProfile {
        id: record.id.clone(),
        name: names.display(record.id.as_str()),
        rank,
        mu: record.mu,
        sigma: record.sigma,
        games: record.games,
        wins: record.wins,
        losses: record.losses(),
        win_rate: record.win_rate(),
        main_race: most_played_race(record.picks),
        races,
        random,
    })
}

/// Rating change per realized race (`pwr`). Missing races read as zero.
pub fn race_mmr(data: &RaceMmrData) -> Vec<RaceMmr> {
    [
        (Race::Protoss, data.p),
        (Race::Terran, data.t),
        (Race::Zerg, data.z),
    ]
    .into_iter()
    .map(|(race, delta)| {
        let delta = delta.unwrap_or_default();
        RaceMmr {
            race,
            total: delta.total,
            per_game: delta.per_game(),
            wins: delta.wins,
            losses: delta.losses,
            games: delta.games(),
            win_rate: delta.win_rate(),
        }
    })
    .collect()
}

/// Label for a `pwm` key (player race followed by two teammate races).
///
/// The teammate matching the player's race is shown first in parentheses.
/// Keys shorter than three letters get an empty label.
pub fn comp_label(key: &str) -> String {
    let letters: Vec<char> = key.chars().map(|c| c.to_ascii_uppercase()).collect();
    let [own, r1, r2] = match letters.as_slice() {
        [own, r1, r2, ..] => [*own, *r1, *r2],
        _ => return String::new(),
    };

    if r1 != r2 && r2 == own {
        format!("({}){}", r2, r1)
    } else {
        format!("({}){}", r1, r2)
    }
}

/// Rating change per team composition (`pwm`), largest total first.
pub fn team_comp_mmr(comps: &BTreeMap<String, MmrDelta>) -> Vec<TeamCompMmr> {
    let mut entries: Vec<TeamCompMmr> = comps
        .iter()
        .map(|(key, delta)| TeamCompMmr {
            key: key.clone(),
            label: comp_label(key),
            total: delta.total,
            per_game: delta.per_game(),
            wins: delta.wins,
            losses: delta.losses,
            games: delta.games(),
            win_rate: delta.win_rate(),
        })
        .collect();
    entries.sort_by(|a, b| b.total.total_cmp(&a.total));
    entries
}

/// Bars for the team-composition chart in the given mode.
pub fn team_comp_bars(entries: &[TeamCompMmr], mode: MmrMode) -> Vec<MmrBar> {
    entries
        .iter()
        .map(|e| MmrBar {
            label: e.label.clone(),
            value: match mode {
                MmrMode::Total => e.total,
                MmrMode::PerGame => e.per_game,
            },
        })
        .collect()
}

/// Bars for the per-race chart in the given mode.
pub fn race_mmr_bars(entries: &[RaceMmr], mode: MmrMode) -> Vec<MmrBar> {
    entries
        .iter()
        .map(|e| MmrBar {
            label: e.race.name().to_string(),
            value: match mode {
                MmrMode::Total => e.total,
                MmrMode::PerGame => e.per_game,
            },
        })
        .collect()
}

/// Bar thickness for a chart with `bars` entries.
pub fn bar_thickness(bars: usize) -> u32 {
    if bars == 0 {
        return MAX_BAR_THICKNESS;
    }
    let share = BAR_QUOTA as usize / bars;
    MAX_BAR_THICKNESS.min(share as u32)
}

fn participant_view(participant: &Participant, names: &NameTable) -> ParticipantView {
    ParticipantView {
        id: participant.id.clone(),
        name: names.display(participant.id.as_str()),
        race: participant.race,
        mu_before: participant.mu_before(),
        mu_after: participant.mu,
        mu_change: participant.mu_change,
    }
}

/// A player's matches prepared for display, newest first.
pub fn match_history(
    player: &PlayerId,
    matches: &[MatchRecord],
    names: &NameTable,
    maps: &NameTable,
    now_ms: i64,
) -> Vec<MatchSummary> {
    matches
        .iter()
        .rev()
        .map(|m| {
            let won = m.is_winner(player);
            let (own, other) = if won {
                (&m.winners, &m.losers)
            } else {
                (&m.losers, &m.winners)
            };
            MatchSummary {
                won,
                team: own.iter().map(|p| participant_view(p, names)).collect(),
                opponents: other.iter().map(|p| participant_view(p, names)).collect(),
                map: maps.display(&m.map_id),
                duration: format_duration(m.game_length.unwrap_or(0)),
                end_time: m.end_time,
                ended: time_ago(m.end_time, now_ms),
            }
        })
        .collect()
}

/// Rating after each game, in match order with 1-based game numbers.
///
/// Matches without a recorded rating keep their game number but add no point.
pub fn rating_history(matches: &[MatchRecord]) -> Vec<RatingPoint> {
    let points: Vec<RatingPoint> = matches
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            m.mmr.map(|mmr| RatingPoint {
                game: i as u32 + 1,
                mmr,
            })
        })
        .collect();
    if points.len() < matches.len() {
        debug!(
            "{} of {} matches have no rating",
            matches.len() - points.len(),
            matches.len()
        );
    }
    points
}
