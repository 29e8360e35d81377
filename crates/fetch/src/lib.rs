//! Bounded Fetcher: a single HTTP GET bounded by a hard wall-time and a hard
//! byte ceiling, with the time ceiling enforced mid-stream rather than only
//! on connect (spec §4.1, §9 "Bounded read").

use std::time::{Duration, Instant};

use mwmbl_core::{config::FetchConfig, CrawlError};
use tracing::{debug, warn};
use url::Url;

/// A successful (possibly truncated) fetch: the HTTP status and the body
/// bytes read before either EOF or the size/time ceiling was hit.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub status: u16,
    pub body: Vec<u8>,
}

pub struct BoundedFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_fetch_size: usize,
}

impl BoundedFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, CrawlError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| CrawlError::AbortError(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_fetch_size: config.max_fetch_size,
        })
    }

    /// Fetch `url`, reading the response body in chunks and checking the
    /// wall-time deadline before consuming each one. One attempt only;
    /// ordinary HTTP redirects are followed by the underlying client.
    ///
    /// When `max_fetch_size` is reached mid-stream the stream is abandoned
    /// and the partial body returned as if it had been read normally — this
    /// is not an error case (spec §4.1).
    pub async fn fetch(&self, url: &Url) -> Result<FetchedBody, CrawlError> {
        let deadline = Instant::now() + self.timeout;

        let mut resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CrawlError::AbortError(describe(&e)))?;

        let status = resp.status().as_u16();
        let mut body = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(url = %url, "fetch aborted: time ceiling reached mid-stream");
                return Err(CrawlError::AbortError(format!(
                    "read timeout after {}s",
                    self.timeout.as_secs()
                )));
            }

            let next = match tokio::time::timeout(remaining, resp.chunk()).await {
                Ok(Ok(Some(chunk))) => chunk,
                Ok(Ok(None)) => break,
                Ok(Err(e)) => return Err(CrawlError::AbortError(describe(&e))),
                Err(_elapsed) => {
                    warn!(url = %url, "fetch aborted: time ceiling reached mid-stream");
                    return Err(CrawlError::AbortError(format!(
                        "read timeout after {}s",
                        self.timeout.as_secs()
                    )));
                }
            };

            body.extend_from_slice(&next);
            if body.len() >= self.max_fetch_size {
                body.truncate(self.max_fetch_size);
                debug!(url = %url, size = body.len(), "fetch truncated at max_fetch_size");
                break;
            }
        }

        Ok(FetchedBody { status, body })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else if e.is_redirect() {
        format!("redirect error: {e}")
    } else {
        e.to_string()
    }
}
