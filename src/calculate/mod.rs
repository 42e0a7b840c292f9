//! Statistics calculation engine.
//!
//! Turns the published season documents into display-ready series:
//! - Weekly activity histogram
//! - Race selection and race-pair win rates
//! - Composition frequency and head-to-head matchups
//! - Grouped team compositions
//! - Player ranking, profiles, rating deltas and match history
//!
//! Everything here is synchronous and pure; fetching lives in `source`.

pub mod activity;
pub mod matchups;
pub mod players;
pub mod races;
pub mod recency;
pub mod teams;

pub use activity::{bucket_weekly, week_start};
pub use matchups::{composition_views, matchup_win_rates};
pub use players::{
    bar_thickness, comp_label, leaderboard, match_history, most_played_race, player_profile,
    project_players, race_mmr, race_mmr_bars, rank_of, ranked_players, rating_history,
    team_comp_bars, team_comp_mmr,
};
pub use races::{race_selection_view, race_selection_win_rates};
pub use recency::{format_duration, last_updated, time_ago};
pub use teams::{team_groups, team_label, TEAM_GROUPS};
