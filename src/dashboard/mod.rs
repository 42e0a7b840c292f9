//! Chart loaders.
//!
//! Each loader fetches the documents one dashboard chart needs, decodes them
//! and runs the matching calculation. Loaders that need several documents
//! fetch them concurrently. Aggregation itself never awaits.

mod panel;

pub use panel::*;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::calculate;
use crate::models::{
    CompositionViews, LeaderboardRow, MatchSummary, MatchupEntry, MirrorPolicy, PlayerId,
    PlayerProfile, RaceMmr, RaceSelectionView, RaceSelectionWinRate, RatingPoint, SeasonId,
    TeamCompMmr, TeamGroup, WeekBucket,
};
use crate::source::{self, DataSource, SourceError};

/// Weekly activity for a season.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityChart {
    pub season: SeasonId,
    pub weeks: Vec<WeekBucket>,
}

/// Everything on a player's page.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerPage {
    pub season: SeasonId,
    pub profile: PlayerProfile,
    pub matches: Vec<MatchSummary>,
    pub rating_history: Vec<RatingPoint>,
}

/// A player's rating deltas by race and by team composition.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerMmr {
    pub season: SeasonId,
    pub races: Vec<RaceMmr>,
    pub team_comps: Vec<TeamCompMmr>,
}

/// Loads dashboard charts from a data source.
#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn DataSource>,
    min_games: u32,
    fixed_now: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn DataSource>, min_games: u32) -> Self {
        Self {
            source,
            min_games,
            fixed_now: None,
        }
    }

    /// Pin the clock, for reproducible season resolution and relative times.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// The requested season, or the current one.
    pub async fn season(&self, season: Option<SeasonId>) -> SeasonId {
        source::season_or_current(self.source(), season, self.now_ms()).await
    }

    pub async fn activity(&self, season: Option<SeasonId>) -> Result<ActivityChart, SourceError> {
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;
        Ok(ActivityChart {
            season,
            weeks: calculate::bucket_weekly(&stats.activity, self.now()),
        })
    }

    pub async fn race_selection(
        &self,
        season: Option<SeasonId>,
    ) -> Result<RaceSelectionView, SourceError> {
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;
        Ok(calculate::race_selection_view(&stats.irs))
    }

    pub async fn race_selection_win_rates(
        &self,
        season: Option<SeasonId>,
    ) -> Result<Vec<RaceSelectionWinRate>, SourceError> {
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;
        Ok(calculate::race_selection_win_rates(&stats.rs))
    }

    pub async fn compositions(
        &self,
        season: Option<SeasonId>,
    ) -> Result<CompositionViews, SourceError> {
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;
        Ok(calculate::composition_views(&stats.muwr))
    }

    pub async fn matchups(
        &self,
        season: Option<SeasonId>,
        mirrors: MirrorPolicy,
    ) -> Result<Vec<MatchupEntry>, SourceError> {
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;
        Ok(calculate::matchup_win_rates(&stats.muwrr, mirrors))
    }

    pub async fn teams(&self, season: Option<SeasonId>) -> Result<Vec<TeamGroup>, SourceError> {
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;
        Ok(calculate::team_groups(&stats.wlp))
    }

    /// Ranked players. `min_games` overrides the configured threshold.
    pub async fn leaderboard(
        &self,
        season: Option<SeasonId>,
        min_games: Option<u32>,
    ) -> Result<Vec<LeaderboardRow>, SourceError> {
        let season = self.season(season).await;
        let (ratings, names) = tokio::try_join!(
            source::ratings(self.source(), season),
            source::names(self.source()),
        )?;
        let records = calculate::project_players(&ratings)?;
        let rows = calculate::leaderboard(
            &records,
            &names,
            min_games.unwrap_or(self.min_games),
            self.now_ms(),
        );
        info!("Season {}: {} of {} players ranked", season, rows.len(), records.len());
        Ok(rows)
    }

    pub async fn player(
        &self,
        season: Option<SeasonId>,
        player: &PlayerId,
    ) -> Result<PlayerPage, SourceError> {
        source::validate_player_id(player.as_str())?;
        let season = self.season(season).await;
        let (matches, names, maps, ratings) = tokio::try_join!(
            source::player_matches(self.source(), season, player),
            source::names(self.source()),
            source::maps(self.source()),
            source::ratings(self.source(), season),
        )?;

        let records = calculate::project_players(&ratings)?;
        let profile = calculate::player_profile(&records, player, &names, self.min_games)
            .ok_or_else(|| {
                SourceError::NotFound(format!("player {} in season {}", player, season))
            })?;

        Ok(PlayerPage {
            season,
            profile,
            matches: calculate::match_history(player, &matches, &names, &maps, self.now_ms()),
            rating_history: calculate::rating_history(&matches),
        })
    }

    pub async fn player_mmr(
        &self,
        season: Option<SeasonId>,
        player: &PlayerId,
    ) -> Result<PlayerMmr, SourceError> {
        source::validate_player_id(player.as_str())?;
        let season = self.season(season).await;
        let stats = source::statistics(self.source(), season).await?;

        let by_race = stats.pwr.get(player);
        let by_comp = stats.pwm.get(player);
        if by_race.is_none() && by_comp.is_none() {
            return Err(SourceError::NotFound(format!(
                "rating deltas for player {} in season {}",
                player, season
            )));
        }

        Ok(PlayerMmr {
            season,
            races: by_race.map(calculate::race_mmr).unwrap_or_default(),
            team_comps: by_comp.map(calculate::team_comp_mmr).unwrap_or_default(),
        })
    }

    /// "Last updated" label, `unknown` if the processing metadata is unavailable.
    pub async fn last_updated(&self) -> String {
        let proc_data = match source::proc_data(self.source()).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Could not load processing metadata: {}", e);
                None
            }
        };
        calculate::last_updated(proc_data.as_ref(), self.now_ms())
    }
}
