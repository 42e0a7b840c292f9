//! Leaderboard and per-player routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, SeasonParams};
use crate::dashboard::{
    BarChart, ChartPanel, PlayerMmr, PlayerPage, RaceMmrChart, Rendered, TeamCompChart,
};
use crate::models::{LeaderboardRow, MmrMode, PlayerId};
use crate::source::validate_player_id;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub season: Option<String>,
    pub min_games: Option<u32>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    let season = SeasonParams {
        season: params.season,
    }
    .season()?;
    Ok(Json(
        state.dashboard.leaderboard(season, params.min_games).await?,
    ))
}

fn player_id(raw: &str) -> Result<PlayerId, ApiError> {
    Ok(validate_player_id(raw)?)
}

pub async fn player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<PlayerPage>, ApiError> {
    let id = player_id(&id)?;
    Ok(Json(state.dashboard.player(params.season()?, &id).await?))
}

#[derive(Debug, Deserialize)]
pub struct MmrParams {
    pub season: Option<String>,
    #[serde(default)]
    pub mode: MmrMode,
}

#[derive(Debug, Serialize)]
pub struct PlayerMmrResponse {
    #[serde(flatten)]
    pub data: PlayerMmr,
    pub race_chart: Option<Rendered<MmrMode, BarChart>>,
    pub team_comp_chart: Option<Rendered<MmrMode, BarChart>>,
}

pub async fn player_mmr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MmrParams>,
) -> Result<Json<PlayerMmrResponse>, ApiError> {
    let id = player_id(&id)?;
    let season = SeasonParams {
        season: params.season,
    }
    .season()?;
    let data = state.dashboard.player_mmr(season, &id).await?;

    let mut races = ChartPanel::new();
    races.load(RaceMmrChart(data.races.clone()));
    let mut team_comps = ChartPanel::new();
    team_comps.load(TeamCompChart(data.team_comps.clone()));

    Ok(Json(PlayerMmrResponse {
        race_chart: races.render(params.mode),
        team_comp_chart: team_comps.render(params.mode),
        data,
    }))
}
