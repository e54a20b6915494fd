//! HTTP fetcher shared by every contest source
//!
//! This module provides the single HTTP client the adapters and stats
//! lookups go through, with features including:
//! - User-Agent rotation (scraped sites reject the default reqwest agent)
//! - Automatic retry with exponential backoff on transient statuses
//! - JSON decoding with the upstream body kept out of error messages

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::utils::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// HTTP fetcher with retry logic
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,

    /// Fixed User-Agent; rotates through the pool when unset
    user_agent: Option<String>,
}

impl HttpFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(2, Duration::from_secs(10))
    }

    /// Create a new fetcher with custom retry count and timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(max_retries: u32, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            client,
            max_retries,
            base_delay_ms: 500,
            user_agent: None,
        })
    }

    /// Create a fetcher from the `[fetcher]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(config.max_retries, config.request_timeout())?;
        fetcher.base_delay_ms = config.retry_base_delay_ms;
        fetcher.user_agent = config.user_agent.clone();
        Ok(fetcher)
    }

    /// Override the backoff base delay
    #[must_use]
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Fetch a page body as text
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send_with_retry(|| self.client.get(url)).await?;
        Ok(response.text().await?)
    }

    /// Fetch and decode a JSON document
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` when the body is not the expected shape
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.send_with_retry(|| self.client.get(url)).await?;
        Self::decode_json(response).await
    }

    /// Fetch and decode a JSON document with query parameters
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` when the body is not the expected shape
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .send_with_retry(|| self.client.get(url).query(query))
            .await?;
        Self::decode_json(response).await
    }

    /// POST a JSON body and decode the JSON answer
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` when the body is not the expected shape
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send_with_retry(|| self.client.post(url).json(body))
            .await?;
        Self::decode_json(response).await
    }

    /// Send a request with exponential backoff retry logic
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MaxRetriesExceeded` if all retries fail
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_status = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match build().headers(self.build_headers()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    } else if Self::should_retry(status.as_u16()) {
                        tracing::debug!(status = %status, attempt, "Retryable upstream status");
                        last_status = Some(status.as_u16());
                        continue;
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) if e.is_timeout() => {
                    tracing::debug!(attempt, "Upstream request timed out");
                    if attempt == self.max_retries {
                        return Err(FetchError::Timeout);
                    }
                }
                Err(e) if e.is_builder() => {
                    return Err(FetchError::InvalidUrl(e.to_string()));
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "Upstream request failed");
                    if attempt == self.max_retries {
                        return Err(FetchError::Http(e));
                    }
                }
            }
        }

        Err(FetchError::MaxRetriesExceeded { last_status })
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429, 500, 502, 503 and 504. Client errors such as 400 or 404
    /// mean the request itself is wrong and are returned immediately.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Build browser-like HTTP headers
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let agent = self
            .user_agent
            .as_deref()
            .and_then(|ua| HeaderValue::from_str(ua).ok())
            .unwrap_or_else(|| HeaderValue::from_static(self.random_user_agent()));
        headers.insert(USER_AGENT, agent);

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        use rand::seq::SliceRandom;

        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotation() {
        let fetcher = HttpFetcher::new().unwrap();

        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = fetcher.random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_fixed_user_agent() {
        let config = FetcherConfig {
            user_agent: Some("cptracker-test/1.0".to_string()),
            ..FetcherConfig::default()
        };
        let fetcher = HttpFetcher::from_config(&config).unwrap();
        let headers = fetcher.build_headers();

        assert_eq!(
            headers.get(USER_AGENT).unwrap().to_str().unwrap(),
            "cptracker-test/1.0"
        );
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }

    #[test]
    fn test_should_retry() {
        assert!(HttpFetcher::should_retry(429));
        assert!(HttpFetcher::should_retry(500));
        assert!(HttpFetcher::should_retry(502));
        assert!(HttpFetcher::should_retry(503));
        assert!(HttpFetcher::should_retry(504));

        assert!(!HttpFetcher::should_retry(400));
        assert!(!HttpFetcher::should_retry(403));
        assert!(!HttpFetcher::should_retry(404));
        assert!(!HttpFetcher::should_retry(200));
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(HttpFetcher::new().is_ok());
        assert!(HttpFetcher::with_config(0, Duration::from_secs(1)).is_ok());
    }
}
