//! HTTP client for the OMDB API.
//!
//! API documentation: <http://www.omdbapi.com/>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::retry::RetryPolicy;
use super::types::{LookupRequest, LookupResult, SearchRequest, SearchResult};
use crate::config::OmdbConfig;

#[derive(Debug, thiserror::Error)]
pub enum OmdbError {
    #[error("OMDB returned HTTP {status}")]
    UpstreamHttp { status: u16 },
    #[error("OMDB request timed out")]
    Timeout,
    #[error("OMDB transport error: {0}")]
    Transport(reqwest::Error),
    #[error("Failed to decode OMDB response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("No OMDB API key configured")]
    MissingApiKey,
}

impl OmdbError {
    /// Network failures, timeouts and 5xx responses may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            OmdbError::UpstreamHttp { status } => *status >= 500,
            OmdbError::Timeout | OmdbError::Transport(_) => true,
            OmdbError::Decode(_) | OmdbError::Client(_) | OmdbError::MissingApiKey => false,
        }
    }
}

impl From<reqwest::Error> for OmdbError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OmdbError::Timeout
        } else if let Some(status) = e.status() {
            OmdbError::UpstreamHttp {
                status: status.as_u16(),
            }
        } else {
            OmdbError::Transport(e)
        }
    }
}

/// Operations the HTTP layer needs from OMDB.
#[async_trait]
pub trait OmdbApi: Send + Sync {
    async fn lookup_by_id_or_title(&self, req: &LookupRequest) -> Result<LookupResult, OmdbError>;
    async fn search_by_title(&self, req: &SearchRequest) -> Result<SearchResult, OmdbError>;
}

/// Pooled OMDB client. Build one per process and share it.
#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> Result<Self, OmdbError> {
        Self::build(
            &config.base_url,
            &config.api_key,
            Duration::from_secs(config.timeout),
        )
    }

    /// Create a client with an explicit per-attempt timeout.
    ///
    /// # Errors
    /// Returns `MissingApiKey` for an empty key, or `Client` if reqwest
    /// cannot set up TLS.
    pub fn build(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, OmdbError> {
        if api_key.trim().is_empty() {
            return Err(OmdbError::MissingApiKey);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-cache"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(OmdbError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, op: &str, query: String) -> Result<T, OmdbError> {
        let url = format!("{}?{}", self.base_url, query);
        debug!(op = op, base_url = %self.base_url, "OMDB request");

        let this = self;
        let url = url.as_str();
        let result = self
            .retry
            .run(op, OmdbError::is_transient, move || this.fetch_body(url))
            .await
            .and_then(|body| serde_json::from_str::<T>(&body).map_err(OmdbError::from));

        if let Err(ref e) = result {
            error!(op = op, error = %e, "OMDB HTTP client error");
        }
        result
    }

    /// One attempt: GET, require 2xx, read the whole body.
    async fn fetch_body(&self, url: &str) -> Result<String, OmdbError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OmdbError::UpstreamHttp {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn lookup_by_id_or_title(&self, req: &LookupRequest) -> Result<LookupResult, OmdbError> {
        self.get_json("lookup_by_id_or_title", lookup_query(&self.api_key, req))
            .await
    }

    async fn search_by_title(&self, req: &SearchRequest) -> Result<SearchResult, OmdbError> {
        self.get_json("search_by_title", search_query(&self.api_key, req))
            .await
    }
}

/// `apikey&i&t&type&y&plot&r&callback&v`, every parameter present.
pub fn lookup_query(api_key: &str, req: &LookupRequest) -> String {
    encode_pairs(&[
        ("apikey", Some(api_key)),
        ("i", req.imdb_id.as_deref()),
        ("t", req.title.as_deref()),
        ("type", req.media_type.as_deref()),
        ("y", req.year.as_deref()),
        ("plot", req.plot.as_deref()),
        ("r", req.return_type.as_deref()),
        ("callback", req.callback.as_deref()),
        ("v", req.version.as_deref()),
    ])
}

/// `apikey&s&type&y&r&page&callback&v`, every parameter present.
pub fn search_query(api_key: &str, req: &SearchRequest) -> String {
    encode_pairs(&[
        ("apikey", Some(api_key)),
        ("s", req.search.as_deref()),
        ("type", req.media_type.as_deref()),
        ("y", req.year.as_deref()),
        ("r", req.return_type.as_deref()),
        ("page", req.page.as_deref()),
        ("callback", req.callback.as_deref()),
        ("v", req.version.as_deref()),
    ])
}

// Absent values are sent as empty parameters, never dropped.
fn encode_pairs(pairs: &[(&str, Option<&str>)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value.unwrap_or(""))))
        .collect::<Vec<_>>()
        .join("&")
}
