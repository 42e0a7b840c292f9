//! REST API endpoints.
//!
//! Axum-based read-only HTTP API serving the dashboard charts as JSON.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::models::SeasonId;
use crate::source::SourceError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream data unavailable: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(what) => ApiError::NotFound(what),
            SourceError::InvalidPlayerId(_) => ApiError::BadRequest(err.to_string()),
            SourceError::InvalidLocation(_) => ApiError::Internal(err.to_string()),
            SourceError::Fetch { .. }
            | SourceError::Io { .. }
            | SourceError::Malformed { .. }
            | SourceError::Decode(_)
            | SourceError::Season(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        match &self {
            ApiError::Upstream(_) => warn!("{}", self),
            ApiError::Internal(_) => error!("{}", self),
            _ => {}
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// `?season=N`, shared by every season-scoped route.
#[derive(Debug, Default, Deserialize)]
pub struct SeasonParams {
    pub season: Option<String>,
}

impl SeasonParams {
    pub fn season(&self) -> Result<Option<SeasonId>, ApiError> {
        self.season
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.parse::<SeasonId>()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid season: {}", s)))
            })
            .transpose()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            warn!("Ignoring invalid CORS origin {:?}", origin);
            layer
        }
    }
}

/// Build the API router, optionally serving static dashboard pages as well.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);
    let static_dir = state.config.server.static_dir.clone();

    let api = Router::new()
        .route("/api/health", get(routes::stats::health))
        .route("/api/season", get(routes::stats::season))
        .route("/api/activity", get(routes::stats::activity))
        .route("/api/races", get(routes::stats::races))
        .route("/api/race-selection", get(routes::stats::race_selection))
        .route("/api/compositions", get(routes::stats::compositions))
        .route("/api/matchups", get(routes::stats::matchups))
        .route("/api/teams", get(routes::stats::teams))
        .route("/api/last-updated", get(routes::stats::last_updated))
        .route("/api/leaderboard", get(routes::players::leaderboard))
        .route("/api/players/:id", get(routes::players::player))
        .route("/api/players/:id/mmr", get(routes::players::player_mmr))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(cors).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_params() {
        let params = SeasonParams {
            season: Some("3".to_string()),
        };
        assert_eq!(params.season().unwrap(), Some(SeasonId::new(3)));

        assert_eq!(SeasonParams::default().season().unwrap(), None);

        let empty = SeasonParams {
            season: Some(String::new()),
        };
        assert_eq!(empty.season().unwrap(), None);

        let bad = SeasonParams {
            season: Some("latest".to_string()),
        };
        assert!(matches!(bad.season(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_source_error_mapping() {
        assert!(matches!(
            ApiError::from(SourceError::NotFound("x".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(SourceError::InvalidPlayerId("../x".into())),
            ApiError::BadRequest(_)
        ));
        let malformed = serde_json::from_str::<u32>("x").unwrap_err();
        assert!(matches!(
            ApiError::from(SourceError::Malformed {
                document: "data/names.json".into(),
                source: malformed,
            }),
            ApiError::Upstream(_)
        ));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream("x".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
