//! Retrieval of the raw listing page.
//!
//! The fetcher performs exactly one GET per pipeline cycle with a fixed
//! header set and a whole-request timeout. It carries no business logic and
//! never reports failure as an error: a non-success status, a timeout or any
//! transport problem is logged and turned into `None`, so the cycle degrades
//! to a no-op with zero candidates.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;

/// Something that can produce the raw document for one pipeline cycle.
///
/// [`HttpFetcher`] is the production implementation; tests substitute a
/// fixed document.
pub trait DocumentSource {
    /// Fetch the document body, or `None` when it could not be retrieved.
    async fn fetch_document(&self) -> Option<String>;
}

/// HTTP implementation of [`DocumentSource`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url: String,
    headers: Vec<(String, String)>,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with a default `reqwest` client.
    ///
    /// # Arguments
    ///
    /// * `url` - Listing page to GET
    /// * `headers` - Extra request headers as name/value pairs
    /// * `timeout` - Budget for the whole request
    pub fn new(url: impl Into<String>, headers: Vec<(String, String)>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), url, headers, timeout)
    }

    /// Same as [`HttpFetcher::new`] over a caller-supplied client
    /// (proxy settings, connection pool).
    pub fn with_client(
        client: Client,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            headers,
            timeout,
        }
    }

    /// Build a fetcher for the configured source, sending the configured `User-Agent`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.source_url.clone(),
            vec![("User-Agent".to_string(), config.user_agent.clone())],
            config.timeout(),
        )
    }

    /// The page this fetcher requests.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DocumentSource for HttpFetcher {
    async fn fetch_document(&self) -> Option<String> {
        fetch(&self.client, &self.url, &self.headers, self.timeout).await
    }
}

/// GET `url` with `headers`, giving up after `timeout`.
///
/// Returns the response body on a 2xx status and `None` otherwise.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch(
    client: &Client,
    url: &str,
    headers: &[(String, String)],
    timeout: Duration,
) -> Option<String> {
    let t0 = Instant::now();
    let mut request = client.get(url).timeout(timeout);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            warn!(timeout_secs = timeout.as_secs(), "Fetch timed out");
            return None;
        }
        Err(e) => {
            error!(error = %e, "Fetch failed");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(%status, "Fetch returned non-success status");
        return None;
    }

    match response.text().await {
        Ok(body) => {
            info!(
                bytes = body.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetched document"
            );
            Some(body)
        }
        Err(e) => {
            error!(error = %e, "Failed to read response body");
            None
        }
    }
}
