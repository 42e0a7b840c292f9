//! Season-wide statistics routes.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, SeasonParams};
use crate::dashboard::ActivityChart;
use crate::models::{
    CompositionViews, MatchupEntry, MirrorPolicy, RaceSelectionView, RaceSelectionWinRate,
    SeasonId, TeamGroup,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub source: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.dashboard.source().describe(),
    })
}

#[derive(Debug, Serialize)]
pub struct SeasonResponse {
    pub season: SeasonId,
}

pub async fn season(
    State(state): State<AppState>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<SeasonResponse>, ApiError> {
    let season = state.dashboard.season(params.season()?).await;
    Ok(Json(SeasonResponse { season }))
}

pub async fn activity(
    State(state): State<AppState>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<ActivityChart>, ApiError> {
    Ok(Json(state.dashboard.activity(params.season()?).await?))
}

pub async fn races(
    State(state): State<AppState>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<RaceSelectionView>, ApiError> {
    Ok(Json(state.dashboard.race_selection(params.season()?).await?))
}

pub async fn race_selection(
    State(state): State<AppState>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<Vec<RaceSelectionWinRate>>, ApiError> {
    Ok(Json(
        state
            .dashboard
            .race_selection_win_rates(params.season()?)
            .await?,
    ))
}

pub async fn compositions(
    State(state): State<AppState>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<CompositionViews>, ApiError> {
    Ok(Json(state.dashboard.compositions(params.season()?).await?))
}

#[derive(Debug, Deserialize)]
pub struct MatchupParams {
    pub season: Option<String>,
    pub mirrors: Option<String>,
}

pub async fn matchups(
    State(state): State<AppState>,
    Query(params): Query<MatchupParams>,
) -> Result<Json<Vec<MatchupEntry>>, ApiError> {
    let season = SeasonParams {
        season: params.season,
    }
    .season()?;
    let mirrors = match params.mirrors.as_deref() {
        None => MirrorPolicy::default(),
        Some(value) => value.parse().map_err(ApiError::BadRequest)?,
    };
    Ok(Json(state.dashboard.matchups(season, mirrors).await?))
}

pub async fn teams(
    State(state): State<AppState>,
    Query(params): Query<SeasonParams>,
) -> Result<Json<Vec<TeamGroup>>, ApiError> {
    Ok(Json(state.dashboard.teams(params.season()?).await?))
}

#[derive(Debug, Serialize)]
pub struct LastUpdatedResponse {
    pub last_updated: String,
}

pub async fn last_updated(State(state): State<AppState>) -> Json<LastUpdatedResponse> {
    Json(LastUpdatedResponse {
        last_updated: state.dashboard.last_updated().await,
    })
}
