//! HTTP fetching with an on-disk cache.
//!
//! Slow-moving lookup tables are kept under the cache directory, keyed by a
//! hash of the URL, and revalidated with `If-None-Match` once their TTL runs
//! out. Documents that change between processing runs skip the cache
//! entirely and are returned straight from the response.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ETAG, IF_NONE_MATCH, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(Url),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("Failed to encode cache metadata for {url}: {source}")]
    Json {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

/// Whether a request may be answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve a fresh cached copy if one exists, revalidate a stale one
    PreferCache,
    /// Always go to the network; nothing is read from or written to disk
    Fresh,
}

/// Metadata stored alongside cached content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,

    /// Length of the cached body; a mismatch marks the entry unusable
    pub content_length: usize,
    pub etag: Option<String>,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory to cache documents
    pub cache_dir: PathBuf,

    /// How long cached content is used without revalidation
    pub cache_ttl: Duration,

    /// Maximum document size to accept (default 50MB)
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            cache_ttl: Duration::from_secs(3600), // 1 hour
            max_content_size: 50 * 1024 * 1024,   // 50MB
            timeout: Duration::from_secs(30),
            user_agent: concat!("ladder-stats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Result of one network request.
enum Download {
    Body { body: Vec<u8>, etag: Option<String> },
    NotModified,
}

/// Suffix counter for temporary cache files.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// HTTP fetcher with local caching.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("ladder-stats")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch a document body according to `policy`.
    pub async fn fetch_bytes(&self, url: &Url, policy: CachePolicy) -> Result<Vec<u8>, FetchError> {
        match policy {
            CachePolicy::PreferCache => self.fetch(url).await,
            CachePolicy::Fresh => self.fetch_fresh(url).await,
        }
    }

    /// Fetch a URL, answering from the cache while the entry is within its TTL.
    ///
    /// A stale entry carrying an etag is revalidated; on `304 Not Modified`
    /// the cached body is kept and its age reset.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let cached = match self.read_cache(url).await? {
            Some((meta, body)) if self.is_fresh(&meta) => {
                debug!("Serving {} from cache", url);
                return Ok(body);
            }
            other => other,
        };

        let etag = cached.as_ref().and_then(|(meta, _)| meta.etag.clone());
        match self.download(url, etag.as_deref()).await? {
            Download::Body { body, etag } => {
                self.store(url, &body, etag).await?;
                Ok(body)
            }
            Download::NotModified => match cached {
                Some((meta, body)) => {
                    debug!("{} not modified, keeping cached copy", url);
                    self.write_meta(url, body.len(), meta.etag).await?;
                    Ok(body)
                }
                None => Err(FetchError::HttpStatus {
                    status: StatusCode::NOT_MODIFIED.as_u16(),
                    message: "Not Modified without a cached copy".to_string(),
                }),
            },
        }
    }

    /// Fetch from the network without touching the cache.
    pub async fn fetch_fresh(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        match self.download(url, None).await? {
            Download::Body { body, .. } => Ok(body),
            Download::NotModified => Err(FetchError::HttpStatus {
                status: StatusCode::NOT_MODIFIED.as_u16(),
                message: "Not Modified".to_string(),
            }),
        }
    }

    async fn download(&self, url: &Url, etag: Option<&str>) -> Result<Download, FetchError> {
        info!("Fetching {}", url);

        let mut request = self.client.get(url.as_str());
        if let Some(etag) = etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED && etag.is_some() {
            return Ok(Download::NotModified);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.clone()));
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let max_size = self.config.max_content_size;
        if let Some(size) = response.content_length() {
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            if size > max_size {
                return Err(FetchError::ContentTooLarge { size, max_size });
            }
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await?;
        if body.len() > max_size {
            return Err(FetchError::ContentTooLarge {
                size: body.len(),
                max_size,
            });
        }

        Ok(Download::Body {
            body: body.to_vec(),
            etag,
        })
    }

    /// Cached metadata and body, if both exist and agree on the length.
    async fn read_cache(
        &self,
        url: &Url,
    ) -> Result<Option<(CacheMetadata, Vec<u8>)>, FetchError> {
        let Some(meta_content) = read_if_exists(&self.meta_path_for_url(url)).await? else {
            return Ok(None);
        };
        let meta: CacheMetadata = match serde_json::from_slice(&meta_content) {
            Ok(meta) => meta,
            Err(_) => {
                debug!("Ignoring unreadable cache metadata for {}", url);
                return Ok(None);
            }
        };

        let Some(body) = read_if_exists(&self.cache_path_for_url(url)).await? else {
            return Ok(None);
        };
        if body.len() != meta.content_length {
            debug!("Cached body for {} does not match its metadata", url);
            return Ok(None);
        }

        Ok(Some((meta, body)))
    }

    fn is_fresh(&self, meta: &CacheMetadata) -> bool {
        let age = Utc::now()
            .signed_duration_since(meta.fetched_at)
            .to_std()
            .unwrap_or_default();
        age < self.config.cache_ttl
    }

    /// Replace the cached body, then its metadata.
    async fn store(&self, url: &Url, body: &[u8], etag: Option<String>) -> Result<(), FetchError> {
        write_atomic(&self.cache_path_for_url(url), body).await?;
        self.write_meta(url, body.len(), etag).await
    }

    async fn write_meta(
        &self,
        url: &Url,
        content_length: usize,
        etag: Option<String>,
    ) -> Result<(), FetchError> {
        let meta = CacheMetadata {
            url: url.to_string(),
            fetched_at: Utc::now(),
            content_length,
            etag,
        };
        let json = serde_json::to_vec_pretty(&meta).map_err(|source| FetchError::Json {
            url: url.clone(),
            source,
        })?;
        write_atomic(&self.meta_path_for_url(url), &json).await
    }

    /// Generate a cache path for a URL.
    fn cache_path_for_url(&self, url: &Url) -> PathBuf {
        self.host_dir(url).join(format!("{}.json", Self::url_hash(url)))
    }

    /// Generate a metadata path for a URL.
    fn meta_path_for_url(&self, url: &Url) -> PathBuf {
        self.host_dir(url)
            .join(format!("{}.meta.json", Self::url_hash(url)))
    }

    fn host_dir(&self, url: &Url) -> PathBuf {
        self.config
            .cache_dir
            .join(url.host_str().unwrap_or("unknown"))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}

async fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, FetchError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write through a uniquely named temporary file renamed into place.
/// Readers see either the old or the new contents, never a partial write.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp = path.with_extension(format!("{}.{}.tmp", std::process::id(), suffix));

    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::serve;
    use super::*;
    use axum::extract::State;
    use axum::http::header;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tempfile::TempDir;

    const ETAG_V1: &str = "\"v1\"";

    #[derive(Default)]
    struct Hits {
        requests: AtomicUsize,
        not_modified: AtomicUsize,
    }

    type DocState = (Arc<Hits>, Arc<String>);

    async fn document(
        State((hits, body)): State<DocState>,
        headers: axum::http::HeaderMap,
    ) -> Response {
        hits.requests.fetch_add(1, Ordering::SeqCst);
        let revalidating = headers
            .get(header::IF_NONE_MATCH)
            .map(|v| v == ETAG_V1)
            .unwrap_or(false);
        if revalidating {
            hits.not_modified.fetch_add(1, Ordering::SeqCst);
            return axum::http::StatusCode::NOT_MODIFIED.into_response();
        }
        ([(header::ETAG, ETAG_V1)], body.as_str().to_owned()).into_response()
    }

    /// Serves `body` at `/data/doc.json`; every other path is a 404.
    async fn document_server(body: String) -> (Url, Arc<Hits>) {
        let hits = Arc::new(Hits::default());
        let app = Router::new()
            .route("/data/doc.json", get(document))
            .with_state((hits.clone(), Arc::new(body)));
        let base = serve(app).await;
        (base.join("data/doc.json").unwrap(), hits)
    }

    fn large_names_document(entries: usize) -> String {
        let pairs: Vec<String> = (0..entries)
            .map(|i| format!("\"{}\": \"player-{}\"", i, i))
            .collect();
        format!("{{{}}}", pairs.join(","))
    }

    fn test_config(temp_dir: &TempDir, cache_ttl: Duration) -> FetcherConfig {
        FetcherConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            cache_ttl,
            max_content_size: 4 * 1024 * 1024,
            timeout: Duration::from_secs(10),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn test_url_hash() {
        let url1 = Url::parse("https://example.com/data/names.json").unwrap();
        let url2 = Url::parse("https://example.com/data/maps.json").unwrap();

        let hash1 = Fetcher::url_hash(&url1);
        let hash2 = Fetcher::url_hash(&url2);

        assert_ne!(hash1, hash2);
        assert_eq!(hash1.len(), 16); // 8 bytes = 16 hex chars
    }

    #[test]
    fn test_cache_path_generation() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();

        let url = Url::parse("https://ladder.example.org/data/names.json").unwrap();
        let cache_path = fetcher.cache_path_for_url(&url);

        assert!(cache_path.starts_with(temp_dir.path()));
        assert!(cache_path.to_string_lossy().contains("ladder.example.org"));
        assert!(cache_path.to_string_lossy().ends_with(".json"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_fetches_return_whole_documents() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(
            Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap(),
        );
        let (url, _) = document_server(large_names_document(20_000)).await;

        for _ in 0..10 {
            let tasks: Vec<_> = (0..16)
                .map(|i| {
                    let fetcher = fetcher.clone();
                    let url = url.clone();
                    let policy = if i % 2 == 0 {
                        CachePolicy::Fresh
                    } else {
                        CachePolicy::PreferCache
                    };
                    tokio::spawn(async move { fetcher.fetch_bytes(&url, policy).await })
                })
                .collect();

            for task in tasks {
                let body = task.await.unwrap().unwrap();
                let names: HashMap<String, String> = serde_json::from_slice(&body).unwrap();
                assert_eq!(names.len(), 20_000);
            }
        }
    }

    #[tokio::test]
    async fn test_fresh_skips_cache_in_both_directions() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();
        let (url, hits) = document_server(r#"{"1": "Alice"}"#.to_string()).await;
        fetcher
            .store(&url, br#"{"1": "Cached"}"#, None)
            .await
            .unwrap();

        let fresh = fetcher.fetch_bytes(&url, CachePolicy::Fresh).await.unwrap();
        assert_eq!(fresh, br#"{"1": "Alice"}"#);
        assert_eq!(hits.requests.load(Ordering::SeqCst), 1);

        // the fresh response was not written back
        let cached = fetcher.fetch_bytes(&url, CachePolicy::PreferCache).await.unwrap();
        assert_eq!(cached, br#"{"1": "Cached"}"#);
        assert_eq!(hits.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prefer_cache_downloads_once() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();
        let (url, hits) = document_server(r#"{"7": "Fighting Spirit"}"#.to_string()).await;

        let first = fetcher.fetch(&url).await.unwrap();
        let second = fetcher.fetch(&url).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(hits.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_revalidates_with_etag() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::ZERO)).unwrap();
        let (url, hits) = document_server(r#"{"1": "Alice"}"#.to_string()).await;

        let first = fetcher.fetch(&url).await.unwrap();
        let (meta, _) = fetcher.read_cache(&url).await.unwrap().unwrap();
        assert_eq!(meta.etag.as_deref(), Some(ETAG_V1));

        let second = fetcher.fetch(&url).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(hits.requests.load(Ordering::SeqCst), 2);
        assert_eq!(hits.not_modified.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();
        let (url, _) = document_server("{}".to_string()).await;
        let missing = url.join("missing.json").unwrap();

        let fresh = fetcher.fetch_bytes(&missing, CachePolicy::Fresh).await;
        let cached = fetcher.fetch_bytes(&missing, CachePolicy::PreferCache).await;

        assert!(matches!(fresh, Err(FetchError::NotFound(u)) if u == missing));
        assert!(matches!(cached, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_oversized_document_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir, Duration::from_secs(3600));
        config.max_content_size = 1024;
        let fetcher = Fetcher::new(config).unwrap();
        let (url, _) = document_server(large_names_document(200)).await;

        let result = fetcher.fetch_bytes(&url, CachePolicy::Fresh).await;

        assert!(matches!(
            result,
            Err(FetchError::ContentTooLarge { max_size: 1024, .. })
        ));
    }

    #[tokio::test]
    async fn test_fresh_cache_answers_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();
        // Unroutable host: only the cache can answer
        let url = Url::parse("http://cache-only.invalid/data/names.json").unwrap();
        fetcher.store(&url, br#"{"1": "Alice"}"#, None).await.unwrap();

        let body = fetcher.fetch_bytes(&url, CachePolicy::PreferCache).await.unwrap();

        assert_eq!(body, br#"{"1": "Alice"}"#);
    }

    #[tokio::test]
    async fn test_inconsistent_cache_entries_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();
        let url = Url::parse("http://cache-only.invalid/data/maps.json").unwrap();

        fetcher.store(&url, br#"{"7": "Fighting Spirit"}"#, None).await.unwrap();
        fs::write(fetcher.cache_path_for_url(&url), "{\"7\"").await.unwrap();
        assert!(fetcher.read_cache(&url).await.unwrap().is_none());

        fetcher.store(&url, b"{}", None).await.unwrap();
        fs::write(fetcher.meta_path_for_url(&url), "not json").await.unwrap();
        assert!(fetcher.read_cache(&url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config(&temp_dir, Duration::from_secs(3600))).unwrap();
        let url = Url::parse("http://cache-only.invalid/data/names.json").unwrap();

        fetcher.store(&url, b"{}", Some(ETAG_V1.to_string())).await.unwrap();

        let mut entries = fs::read_dir(fetcher.host_dir(&url)).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();

        assert_eq!(config.cache_dir, PathBuf::from("./data/cache"));
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert!(config.user_agent.starts_with("ladder-stats/"));
    }
}
