// crates/wordlink-store/src/http.rs
//
// HTTP-backed sources for a statically hosted data directory.
// Uses reqwest; the directory layout matches `FileSource`.
//
// Shard and record requests map 404 to "absent". Gzip content-encoding is
// decoded by reqwest; a `.gz` shard served as a plain file is inflated by
// the shard decoder.

use async_trait::async_trait;
use reqwest::StatusCode;

use wordlink_core::error::WordlinkError;
use wordlink_core::traits::{LexiconSource, ShardSource, VectorRecordSource};

use crate::file::{record_path, shard_paths, BASEFORM_FILE, WORD_LIST_FILE};

/// Client for a remote Wordlink data directory.
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// Base URL of the data directory (e.g., "https://example.org/data").
    pub base_url: String,
    /// HTTP client instance.
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, client)
    }

    /// Create a source sharing an existing client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative)
    }

    /// GET a resource; 404 yields `Ok(None)`.
    async fn get_optional(&self, relative: &str) -> Result<Option<Vec<u8>>, WordlinkError> {
        let url = self.url(relative);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WordlinkError::FetchFailed(format!("GET {} failed: {}", url, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(WordlinkError::FetchFailed(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WordlinkError::FetchFailed(format!("GET {} body read failed: {}", url, e)))?;

        Ok(Some(bytes.to_vec()))
    }

    /// GET a text resource that must exist.
    async fn get_text(&self, relative: &str) -> Result<String, WordlinkError> {
        let url = self.url(relative);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WordlinkError::FetchFailed(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(WordlinkError::FetchFailed(format!("GET {} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| WordlinkError::FetchFailed(format!("GET {} body read failed: {}", url, e)))
    }
}

#[async_trait]
impl ShardSource for HttpSource {
    async fn fetch_shard(&self, index: usize) -> Result<Option<Vec<u8>>, WordlinkError> {
        for relative in shard_paths(index) {
            if let Some(bytes) = self.get_optional(&relative).await? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl LexiconSource for HttpSource {
    async fn fetch_word_list(&self) -> Result<String, WordlinkError> {
        self.get_text(WORD_LIST_FILE).await
    }

    async fn fetch_baseforms(&self) -> Result<String, WordlinkError> {
        self.get_text(BASEFORM_FILE).await
    }
}

#[async_trait]
impl VectorRecordSource for HttpSource {
    async fn fetch_record(&self, baseform: &str) -> Result<Option<Vec<u8>>, WordlinkError> {
        match record_path(baseform) {
            Some(relative) => self.get_optional(&relative).await,
            None => Ok(None),
        }
    }
}
