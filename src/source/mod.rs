//! Access to the published statistics documents.
//!
//! Documents live under a data root that is either a website (fetched over
//! HTTP with the on-disk cache) or a local directory. Both sit behind the
//! [`DataSource`] trait; typed loaders decode each document at the boundary.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::{CachePolicy, FetchError, Fetcher, FetcherConfig};
use crate::models::{
    resolve_current_season, DecodeError, MatchRecord, NameTable, PlayerId, ProcData,
    RatingsTable, SeasonError, SeasonId, StatisticsData,
};

/// Errors loading documents from a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid player id: {0:?}")]
    InvalidPlayerId(String),

    #[error("Invalid source location: {0}")]
    InvalidLocation(String),

    #[error("Failed to fetch {document}: {source}")]
    Fetch {
        document: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {document}: {source}")]
    Malformed {
        document: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Season(#[from] SeasonError),
}

/// A published document, addressed relative to the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    SeasonStart,
    Statistics(SeasonId),
    Ratings(SeasonId),
    PlayerMatches(SeasonId, PlayerId),
    Names,
    Maps,
    ProcData,
}

impl Document {
    /// Path below the data root.
    pub fn path(&self) -> String {
        match self {
            Document::SeasonStart => "data/season_start.json".to_string(),
            Document::Statistics(season) => {
                format!("data/seasons/{}/statistics_data.json", season)
            }
            Document::Ratings(season) => format!("data/seasons/{}/ratings.json", season),
            Document::PlayerMatches(season, player) => {
                format!("data/seasons/{}/players/{}.json", season, player)
            }
            Document::Names => "data/names.json".to_string(),
            Document::Maps => "data/maps.json".to_string(),
            Document::ProcData => "data/proc_data.json".to_string(),
        }
    }

    /// Season-scoped documents change with every processing run and bypass
    /// the cache. Lookup tables may be served from it.
    pub fn cache_policy(&self) -> CachePolicy {
        match self {
            Document::SeasonStart | Document::Names | Document::Maps => CachePolicy::PreferCache,
            _ => CachePolicy::Fresh,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Player ids end up in a file path, so only plain identifiers are accepted.
pub fn validate_player_id(id: &str) -> Result<PlayerId, SourceError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(PlayerId::from(id))
    } else {
        Err(SourceError::InvalidPlayerId(id.to_string()))
    }
}

/// Raw document access.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Read the raw bytes of a document.
    async fn read(&self, document: &Document) -> Result<Vec<u8>, SourceError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Documents served over HTTP, cached on disk.
pub struct HttpSource {
    base: Url,
    fetcher: Fetcher,
}

impl HttpSource {
    pub fn new(base: Url, config: FetcherConfig) -> Result<Self, SourceError> {
        let fetcher = Fetcher::new(config).map_err(|source| SourceError::Fetch {
            document: base.to_string(),
            source,
        })?;
        Ok(Self {
            base: with_trailing_slash(base),
            fetcher,
        })
    }

    fn url_for(&self, document: &Document) -> Result<Url, SourceError> {
        self.base
            .join(&document.path())
            .map_err(|e| SourceError::Fetch {
                document: document.path(),
                source: FetchError::InvalidUrl(e.to_string()),
            })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl DataSource for HttpSource {
    async fn read(&self, document: &Document) -> Result<Vec<u8>, SourceError> {
        let url = self.url_for(document)?;
        self.fetcher
            .fetch_bytes(&url, document.cache_policy())
            .await
            .map_err(|source| match source {
                FetchError::NotFound(_) => SourceError::NotFound(document.path()),
                source => SourceError::Fetch {
                    document: document.path(),
                    source,
                },
            })
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Documents read from a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for DirSource {
    async fn read(&self, document: &Document) -> Result<Vec<u8>, SourceError> {
        let path = self.root.join(document.path());
        debug!("Reading {}", path.display());
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(document.path())
            } else {
                SourceError::Io { path, source }
            }
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Data root given on the command line or in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(Url),
    Dir(PathBuf),
}

impl FromStr for SourceLocation {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SourceError::InvalidLocation("empty location".to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| SourceError::InvalidLocation(e.to_string()))?;
            Ok(SourceLocation::Http(url))
        } else {
            Ok(SourceLocation::Dir(PathBuf::from(s)))
        }
    }
}

impl SourceLocation {
    /// Open the location as a shared data source.
    pub fn open(&self, fetcher: FetcherConfig) -> Result<Arc<dyn DataSource>, SourceError> {
        Ok(match self {
            SourceLocation::Http(url) => Arc::new(HttpSource::new(url.clone(), fetcher)?),
            SourceLocation::Dir(path) => Arc::new(DirSource::new(path.clone())),
        })
    }
}

async fn load<T: DeserializeOwned>(
    source: &dyn DataSource,
    document: Document,
) -> Result<T, SourceError> {
    let bytes = source.read(&document).await?;
    serde_json::from_slice(&bytes).map_err(|e| SourceError::Malformed {
        document: document.path(),
        source: e,
    })
}

/// Season id → start time (epoch milliseconds).
pub async fn season_starts(source: &dyn DataSource) -> Result<HashMap<String, i64>, SourceError> {
    load(source, Document::SeasonStart).await
}

/// Current season, falling back to season 0 when the boundaries cannot be
/// loaded or are empty.
pub async fn current_season_or_default(source: &dyn DataSource, now_ms: i64) -> SeasonId {
    let resolved = match season_starts(source).await {
        Ok(starts) => resolve_current_season(&starts, now_ms).map_err(SourceError::from),
        Err(e) => Err(e),
    };
    match resolved {
        Ok(season) => season,
        Err(e) => {
            warn!("Could not resolve current season, using {}: {}", SeasonId::FALLBACK, e);
            SeasonId::FALLBACK
        }
    }
}

/// `season` if given, otherwise the current season.
pub async fn season_or_current(
    source: &dyn DataSource,
    season: Option<SeasonId>,
    now_ms: i64,
) -> SeasonId {
    match season {
        Some(season) => season,
        None => current_season_or_default(source, now_ms).await,
    }
}

pub async fn statistics(
    source: &dyn DataSource,
    season: SeasonId,
) -> Result<StatisticsData, SourceError> {
    load(source, Document::Statistics(season)).await
}

pub async fn ratings(
    source: &dyn DataSource,
    season: SeasonId,
) -> Result<RatingsTable, SourceError> {
    load(source, Document::Ratings(season)).await
}

/// A player's matches for the season, oldest first.
pub async fn player_matches(
    source: &dyn DataSource,
    season: SeasonId,
    player: &PlayerId,
) -> Result<Vec<MatchRecord>, SourceError> {
    validate_player_id(player.as_str())?;
    load(source, Document::PlayerMatches(season, player.clone())).await
}

pub async fn names(source: &dyn DataSource) -> Result<NameTable, SourceError> {
    load(source, Document::Names).await
}

pub async fn maps(source: &dyn DataSource) -> Result<NameTable, SourceError> {
    load(source, Document::Maps).await
}

pub async fn proc_data(source: &dyn DataSource) -> Result<ProcData, SourceError> {
    load(source, Document::ProcData).await
}


#[cfg(test)]
mod tests {
    use super::testing::{fixture_root, NOW_MS};
    use super::*;

    #[test]
    fn test_document_paths() {
        let season = SeasonId::new(4);
        assert_eq!(Document::SeasonStart.path(), "data/season_start.json");
        assert_eq!(
            Document::Statistics(season).path(),
            "data/seasons/4/statistics_data.json"
        );
        assert_eq!(
            Document::PlayerMatches(season, PlayerId::from("42")).path(),
            "data/seasons/4/players/42.json"
        );
    }

    #[test]
    fn test_cache_policy() {
        assert_eq!(Document::Names.cache_policy(), CachePolicy::PreferCache);
        assert_eq!(Document::SeasonStart.cache_policy(), CachePolicy::PreferCache);
        assert_eq!(
            Document::Ratings(SeasonId::new(1)).cache_policy(),
            CachePolicy::Fresh
        );
        assert_eq!(Document::ProcData.cache_policy(), CachePolicy::Fresh);
    }

    #[test]
    fn test_validate_player_id() {
        assert!(validate_player_id("12345").is_ok());
        assert!(validate_player_id("abc_DEF-9").is_ok());
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("../names").is_err());
        assert!(validate_player_id("a/b").is_err());
    }

    #[test]
    fn test_source_location_parse() {
        assert_eq!(
            "https://ladder.example.org".parse::<SourceLocation>().unwrap(),
            SourceLocation::Http(Url::parse("https://ladder.example.org").unwrap())
        );
        assert_eq!(
            "./site".parse::<SourceLocation>().unwrap(),
            SourceLocation::Dir(PathBuf::from("./site"))
        );
        assert!("  ".parse::<SourceLocation>().is_err());
    }

    #[test]
    fn test_http_source_joins_below_base_path() {
        let source = HttpSource::new(
            Url::parse("https://example.org/ladder").unwrap(),
            FetcherConfig::default(),
        )
        .unwrap();

        let url = source.url_for(&Document::Names).unwrap();

        assert_eq!(url.as_str(), "https://example.org/ladder/data/names.json");
    }

    fn http_source(base: Url, cache: &tempfile::TempDir) -> HttpSource {
        let config = FetcherConfig {
            cache_dir: cache.path().to_path_buf(),
            ..FetcherConfig::default()
        };
        HttpSource::new(base, config).unwrap()
    }

    async fn ladder_site() -> Url {
        use axum::routing::get;

        let app = axum::Router::new()
            .route(
                "/ladder/data/names.json",
                get(|| async { r#"{"100": "Alice"}"# }),
            )
            .route(
                "/ladder/data/proc_data.json",
                get(|| async { r#"{"last_process": 1749996400}"# }),
            );
        let root = crate::fetch::testing::serve(app).await;
        root.join("ladder").unwrap()
    }

    #[tokio::test]
    async fn test_http_source_loads_documents() {
        let cache = tempfile::tempdir().unwrap();
        let source = http_source(ladder_site().await, &cache);

        let names = names(&source).await.unwrap();
        let proc = proc_data(&source).await.unwrap();

        assert_eq!(names.display("100"), "Alice");
        assert_eq!(proc.last_process_ms(), 1_749_996_400_000);
    }

    #[tokio::test]
    async fn test_http_source_missing_document_is_not_found() {
        let cache = tempfile::tempdir().unwrap();
        let source = http_source(ladder_site().await, &cache);

        let err = statistics(&source, SeasonId::new(9)).await.unwrap_err();

        assert!(matches!(
            err,
            SourceError::NotFound(path) if path == "data/seasons/9/statistics_data.json"
        ));
    }

    #[tokio::test]
    async fn test_dir_source_loads_documents() {
        let root = fixture_root();
        let source = DirSource::new(root.path());

        let stats = statistics(&source, SeasonId::new(2)).await.unwrap();
        assert_eq!(stats.activity.len(), 3);

        let table = ratings(&source, SeasonId::new(2)).await.unwrap();
        assert_eq!(table.len(), 3);

        let names = names(&source).await.unwrap();
        assert_eq!(names.display("100"), "Alice");
        assert_eq!(names.display("200"), "200");
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let root = fixture_root();
        let source = DirSource::new(root.path());

        let err = statistics(&source, SeasonId::new(9)).await.unwrap_err();

        assert!(matches!(err, SourceError::NotFound(path) if path.contains("seasons/9")));
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let root = fixture_root();
        std::fs::write(root.path().join("data/proc_data.json"), "{").unwrap();
        let source = DirSource::new(root.path());

        let err = proc_data(&source).await.unwrap_err();

        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_current_season_resolution() {
        let root = fixture_root();
        let source = DirSource::new(root.path());

        assert_eq!(
            current_season_or_default(&source, NOW_MS).await,
            SeasonId::new(2)
        );
        assert_eq!(
            season_or_current(&source, Some(SeasonId::new(1)), NOW_MS).await,
            SeasonId::new(1)
        );
    }

    #[tokio::test]
    async fn test_current_season_falls_back_to_zero() {
        let empty = tempfile::tempdir().unwrap();
        let source = DirSource::new(empty.path());

        assert_eq!(
            current_season_or_default(&source, NOW_MS).await,
            SeasonId::FALLBACK
        );

        std::fs::create_dir_all(empty.path().join("data")).unwrap();
        std::fs::write(empty.path().join("data/season_start.json"), "{}").unwrap();
        assert_eq!(
            current_season_or_default(&source, NOW_MS).await,
            SeasonId::FALLBACK
        );
    }

    #[tokio::test]
    async fn test_player_matches_rejects_path_ids() {
        let root = fixture_root();
        let source = DirSource::new(root.path());

        let err = player_matches(&source, SeasonId::new(2), &PlayerId::from("../../names"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidPlayerId(_)));

        let matches = player_matches(&source, SeasonId::new(2), &PlayerId::from("100"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
    }
}
