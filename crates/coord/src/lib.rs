//! Coordinator Client (spec §4.7): handout/submit against the coordinator's
//! two JSON endpoints, plus worker identity persistence.

pub mod identity;

use mwmbl_core::config::CoordinatorConfig;
use mwmbl_core::{CrawlError, CrawlResult};
use serde::Serialize;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

pub struct CoordinatorClient {
    client: reqwest::Client,
    config: CoordinatorConfig,
    user_id: String,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    user_id: &'a str,
    items: &'a [CrawlResult],
}

impl CoordinatorClient {
    pub fn new(config: CoordinatorConfig, user_id: String) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CrawlError::Coordinator(e.to_string()))?;
        Ok(Self {
            client,
            config,
            user_id,
        })
    }

    /// `POST <base>/crawler/batches/new`. Non-200 or an empty array is a
    /// fatal error for this iteration (spec §4.7, §6).
    pub async fn request_batch(&self) -> Result<Vec<String>, CrawlError> {
        let url = format!("{}/crawler/batches/new", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&BatchRequest {
                user_id: &self.user_id,
            })
            .send()
            .await
            .map_err(|e| CrawlError::Coordinator(format!("batch request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CrawlError::Coordinator(format!(
                "batch handout returned status {}",
                resp.status()
            )));
        }

        let urls: Vec<String> = resp
            .json()
            .await
            .map_err(|e| CrawlError::Coordinator(format!("invalid batch response: {e}")))?;

        if urls.is_empty() {
            return Err(CrawlError::Coordinator("coordinator returned an empty batch".into()));
        }

        Ok(urls)
    }

    /// `POST <base>/crawler/batches/`, submitted once (primary worker path;
    /// spec §4.7 "the main worker path submits once and proceeds").
    pub async fn submit_batch(&self, items: &[CrawlResult]) -> Result<(), CrawlError> {
        let status = self.submit_once(items).await?;
        if status.as_u16() == 200 {
            Ok(())
        } else {
            Err(CrawlError::Coordinator(format!(
                "submit returned status {status}"
            )))
        }
    }

    /// `POST <base>/crawler/batches/` with the board-adapter retry policy
    /// (spec §4.7): retry on 502/504 up to `max_submit_retries` times with a
    /// fixed backoff, fail hard on any other non-200.
    pub async fn submit_batch_with_retry(&self, items: &[CrawlResult]) -> Result<(), CrawlError> {
        let mut attempt = 0;
        loop {
            let status = self.submit_once(items).await?;
            match status.as_u16() {
                200 => return Ok(()),
                502 | 504 => {
                    attempt += 1;
                    if attempt >= self.config.max_submit_retries {
                        return Err(CrawlError::Coordinator(format!(
                            "submit failed after {attempt} attempts (last status {status})"
                        )));
                    }
                    warn!(status = %status, attempt, "submit gateway error, retrying");
                    sleep(Duration::from_secs(self.config.retry_backoff_seconds)).await;
                }
                other => {
                    return Err(CrawlError::Coordinator(format!("submit returned status {other}")));
                }
            }
        }
    }

    async fn submit_once(&self, items: &[CrawlResult]) -> Result<reqwest::StatusCode, CrawlError> {
        let url = format!("{}/crawler/batches/", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&SubmitRequest {
                user_id: &self.user_id,
                items,
            })
            .send()
            .await
            .map_err(|e| CrawlError::Coordinator(format!("submit request failed: {e}")))?;
        info!(status = %resp.status(), count = items.len(), "submitted batch");
        Ok(resp.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwmbl_core::CrawlContent;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_status(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(s) => s,
                    Err(_) => return,
                };
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = b"[]";
                let header = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    fn config(base_url: String) -> CoordinatorConfig {
        CoordinatorConfig {
            base_url,
            retry_backoff_seconds: 0,
            max_submit_retries: 3,
            iteration_error_sleep_seconds: 0,
        }
    }

    #[tokio::test]
    async fn empty_batch_is_an_error() {
        let base = serve_status("200 OK").await;
        let client = CoordinatorClient::new(config(base), "user-1".into()).unwrap();
        let err = client.request_batch().await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn submit_once_fails_hard_on_server_error() {
        let base = serve_status("500 Internal Server Error").await;
        let client = CoordinatorClient::new(config(base), "user-1".into()).unwrap();
        let items = vec![CrawlResult::success(
            "https://example.com",
            200,
            1,
            CrawlContent {
                title: "t".into(),
                extract: "e".into(),
                links: vec![],
                extra_links: vec![],
                links_only: false,
            },
        )];
        let err = client.submit_batch(&items).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn submit_with_retry_gives_up_after_max_attempts_on_gateway_errors() {
        let base = serve_status("502 Bad Gateway").await;
        let client = CoordinatorClient::new(config(base), "user-1".into()).unwrap();
        let items: Vec<CrawlResult> = vec![];
        let err = client.submit_batch_with_retry(&items).await.unwrap_err();
        assert!(err.to_string().contains("3 attempts"));
    }
}
