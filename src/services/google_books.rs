//! Reqwest-based catalog client for the Google Books v1 API.

use crate::models::{Book, BookCollection, CatalogSettings};
use crate::services::catalog::{CatalogClient, CatalogError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Longest slice of an error body kept in a status error message
const MAX_ERROR_BODY: usize = 200;

/// Production [`CatalogClient`] backed by `reqwest`.
///
/// - `GET {base}/volumes?q=<query>` for searches
/// - `GET {base}/volumes/{id}` for lookups
///
/// Every request is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    max_results: Option<u32>,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    /// Build a client from the `catalog` configuration section
    pub fn new(settings: &CatalogSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Self::with_client(client, settings)
    }

    /// Build around an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client, settings: &CatalogSettings) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(&settings.base_url)?,
            timeout: Duration::from_secs(settings.request_timeout_secs),
            max_results: settings.max_results,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for a free-text search
    pub fn search_url(&self, query: &str) -> Result<Url, CatalogError> {
        let mut url = self.volumes_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(max) = self.max_results {
                pairs.append_pair("maxResults", &max.to_string());
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        Ok(url)
    }

    /// URL for a lookup; the id is percent-encoded as a single path segment
    pub fn book_url(&self, id: &str) -> Result<Url, CatalogError> {
        let mut url = self.volumes_url()?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Network(format!("Invalid base URL: {}", self.base_url)))?
            .push(id);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn volumes_url(&self) -> Result<Url, CatalogError> {
        self.base_url
            .join("volumes")
            .map_err(|e| CatalogError::Network(format!("Invalid base URL: {}", e)))
    }

    /// Convert reqwest error to CatalogError
    fn convert_error(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout(self.timeout)
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Network(err.to_string())
        }
    }

    async fn fetch(&self, url: Url) -> Result<(StatusCode, ResponseBody), CatalogError> {
        tracing::debug!("GET {}", redact_key(&url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.convert_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.convert_error(e))?;

        Ok((status, ResponseBody(body.to_vec())))
    }
}

/// Raw response body
struct ResponseBody(Vec<u8>);

impl ResponseBody {
    /// Trimmed text of the body, cut to `max` characters
    fn excerpt(&self, max: usize) -> String {
        let text = String::from_utf8_lossy(&self.0);
        let trimmed = text.trim();
        match trimmed.char_indices().nth(max) {
            Some((idx, _)) => format!("{}...", &trimmed[..idx]),
            None => trimmed.to_string(),
        }
    }

    fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, CatalogError> {
        serde_json::from_slice(&self.0).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // Url::join drops the last segment unless the base ends in '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    Url::parse(&normalized).with_context(|| format!("Invalid catalog base URL: {}", raw))
}

/// Strip the API key before a URL is logged
fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}

#[async_trait]
impl CatalogClient for GoogleBooksClient {
    async fn search_books(&self, query: &str) -> Result<BookCollection, CatalogError> {
        let url = self.search_url(query)?;
        let (status, body) = self.fetch(url).await?;

        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: body.excerpt(MAX_ERROR_BODY),
            });
        }

        let collection: BookCollection = body.json()?;

        tracing::debug!("Search '{}' returned {} books", query, collection.len());
        Ok(collection)
    }

    async fn get_book(&self, id: &str) -> Result<Book, CatalogError> {
        let url = self.book_url(id)?;
        let (status, body) = self.fetch(url).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: body.excerpt(MAX_ERROR_BODY),
            });
        }

        body.json()
    }
}
