//! Sequential candidate fetching against the storage origin

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::models::CandidateAttempt;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A winning origin response, ready to be streamed to the client
///
/// The body has not been read yet; `response` still holds the open
/// connection and is consumed chunk by chunk during relay.
#[derive(Debug)]
pub struct FetchedDocument {
    /// The candidate URL that succeeded
    pub url: String,
    /// 1-based position of the winning candidate in the attempt order
    pub attempt: usize,
    /// Upstream Content-Type, if any
    pub content_type: Option<String>,
    /// Upstream Content-Length, if any
    pub content_length: Option<u64>,
    /// The open upstream response
    pub response: reqwest::Response,
}

/// Every candidate failed; carries one record per attempt, in order
#[derive(Debug)]
pub struct FetchExhausted {
    pub attempts: Vec<CandidateAttempt>,
}

impl FetchExhausted {
    /// The last attempt made, used to shape pass-through failures
    pub fn last_attempt(&self) -> Option<&CandidateAttempt> {
        self.attempts.last()
    }
}

/// Executes candidate URLs in order and keeps the first success
///
/// One `DocumentFetcher` is shared across all requests; the underlying
/// reqwest client pools connections to the origin. Connect and read
/// timeouts bound each attempt without capping total stream duration,
/// so a large PDF can take longer than the timeout as long as bytes
/// keep arriving.
pub struct DocumentFetcher {
    client: Client,
    user_agent: String,
}

impl DocumentFetcher {
    /// Create a fetcher from service configuration
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        Self::new(&config.user_agent, Duration::from_secs(config.fetch_timeout_secs))
    }

    /// Create a fetcher with an explicit User-Agent and per-attempt timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ProxyError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(DocumentFetcher {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    /// Fetch the first candidate that answers with a 2xx status
    ///
    /// Candidates are tried strictly in order, never in parallel: a later
    /// candidate is only attempted after an earlier one is confirmed
    /// failed. Each failure is logged and recorded, then the loop moves
    /// on. Exhaustion returns every recorded attempt.
    ///
    /// # Returns
    /// * `Ok(FetchedDocument)` - the first successful response, body unread
    /// * `Err(FetchExhausted)` - all candidates failed
    pub async fn fetch_first(
        &self,
        candidates: &[String],
    ) -> std::result::Result<FetchedDocument, FetchExhausted> {
        let mut attempts = Vec::with_capacity(candidates.len());

        for (index, url) in candidates.iter().enumerate() {
            debug!("Trying candidate {}/{}: {}", index + 1, candidates.len(), url);

            match self.try_fetch(url).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        info!("Candidate succeeded: {} ({})", url, status);
                        return Ok(FetchedDocument::from_response(url.clone(), index + 1, response));
                    }

                    let err = ProxyError::CandidateFailed {
                        url: url.clone(),
                        reason: format!("HTTP {}", status.as_u16()),
                    };
                    warn!("{}", err);
                    attempts.push(CandidateAttempt::http_status(url, status.as_u16()));
                }
                Err(e) => {
                    let err = ProxyError::CandidateFailed {
                        url: url.clone(),
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    attempts.push(CandidateAttempt::network_error(url, e.to_string()));
                }
            }
        }

        Err(FetchExhausted { attempts })
    }

    /// Issue one GET against a single candidate URL
    async fn try_fetch(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProxyError::Timeout(format!("Request to {} timed out", url))
                } else {
                    ProxyError::HttpError(format!("Request failed: {}", e))
                }
            })
    }
}

impl FetchedDocument {
    fn from_response(url: String, attempt: usize, response: reqwest::Response) -> Self {
        let headers = response.headers();

        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let content_length = headers
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        FetchedDocument {
            url,
            attempt,
            content_type,
            content_length,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = DocumentFetcher::new("test-agent", Duration::from_secs(5));
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_fetcher_from_config() {
        let config = ProxyConfig::default();
        let fetcher = DocumentFetcher::from_config(&config);
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_exhaustion_on_unreachable_host() {
        let fetcher = DocumentFetcher::new("test-agent", Duration::from_secs(1)).unwrap();
        // Reserved TEST-NET-1 address, nothing listens there
        let candidates = vec!["http://192.0.2.1:9/doc".to_string()];

        let result = fetcher.fetch_first(&candidates).await;
        let exhausted = result.err().expect("fetch should fail");
        assert_eq!(exhausted.attempts.len(), 1);
        assert!(exhausted.attempts[0].status.is_none());
        assert!(exhausted.attempts[0].error.is_some());
    }
}
