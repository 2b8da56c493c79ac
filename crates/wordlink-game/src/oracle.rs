// crates/wordlink-game/src/oracle.rs
//
// ConceptNet relatedness oracle.
// Uses reqwest to query the ConceptNet HTTP API for an edge between two
// English concepts.

use async_trait::async_trait;
use serde::Deserialize;

use wordlink_core::error::WordlinkError;
use wordlink_core::traits::RelatednessOracle;

/// Public ConceptNet API.
pub const DEFAULT_CONCEPTNET_URL: &str = "https://api.conceptnet.io";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    edges: Vec<serde_json::Value>,
}

/// Client for the ConceptNet `/query` endpoint.
#[derive(Debug, Clone)]
pub struct ConceptNetOracle {
    /// Base URL of the API (e.g., "https://api.conceptnet.io").
    pub base_url: String,
    /// HTTP client instance.
    client: reqwest::Client,
}

impl ConceptNetOracle {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// ConceptNet node name for an English word.
    fn node(word: &str) -> String {
        format!("/c/en/{}", word.trim().to_lowercase().replace(' ', "_"))
    }
}

impl Default for ConceptNetOracle {
    fn default() -> Self {
        Self::new(DEFAULT_CONCEPTNET_URL)
    }
}

#[async_trait]
impl RelatednessOracle for ConceptNetOracle {
    /// GET /query?node=/c/en/{a}&other=/c/en/{b}
    async fn are_related(&self, a: &str, b: &str) -> Result<bool, WordlinkError> {
        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("node", Self::node(a)), ("other", Self::node(b))])
            .send()
            .await
            .map_err(|e| WordlinkError::FetchFailed(format!("ConceptNet request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WordlinkError::FetchFailed(format!(
                "ConceptNet query returned {}",
                response.status()
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| WordlinkError::MalformedData(format!("ConceptNet response: {}", e)))?;

        tracing::debug!("ConceptNet: {} edges between {} and {}", body.edges.len(), a, b);
        Ok(!body.edges.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn mock_conceptnet(status: u16, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            request
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_edges_mean_related() {
        let (base_url, handle) = mock_conceptnet(200, r#"{"edges":[{"@id":"/a/1"}]}"#).await;
        let oracle = ConceptNetOracle::new(&base_url);
        assert!(oracle.are_related("Cat", "ice cream").await.unwrap());
        let request = handle.await.unwrap();
        assert!(
            request.starts_with("GET /query?node=%2Fc%2Fen%2Fcat&other=%2Fc%2Fen%2Fice_cream "),
            "{}",
            request
        );
    }

    #[tokio::test]
    async fn test_query_words_are_percent_encoded() {
        let (base_url, handle) = mock_conceptnet(200, r#"{"edges":[]}"#).await;
        let oracle = ConceptNetOracle::new(&base_url);
        assert!(!oracle.are_related("R&B", "café#1").await.unwrap());
        let request = handle.await.unwrap();
        assert!(
            request.starts_with("GET /query?node=%2Fc%2Fen%2Fr%26b&other=%2Fc%2Fen%2Fcaf%C3%A9%231 "),
            "{}",
            request
        );
    }

    #[tokio::test]
    async fn test_no_edges_means_unrelated() {
        let (base_url, _handle) = mock_conceptnet(200, r#"{"edges":[]}"#).await;
        let oracle = ConceptNetOracle::new(&base_url);
        assert!(!oracle.are_related("cat", "carburetor").await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_failure() {
        let (base_url, _handle) = mock_conceptnet(503, "{}").await;
        let oracle = ConceptNetOracle::new(&base_url);
        let err = oracle.are_related("cat", "dog").await.unwrap_err();
        assert!(matches!(err, WordlinkError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let (base_url, _handle) = mock_conceptnet(200, "<html>").await;
        let oracle = ConceptNetOracle::new(&base_url);
        let err = oracle.are_related("cat", "dog").await.unwrap_err();
        assert!(matches!(err, WordlinkError::MalformedData(_)));
    }
}
