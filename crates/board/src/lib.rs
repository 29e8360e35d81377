//! Board-Item Adapter (spec §4.8): harvests items from a Hacker-News-style
//! board API and submits them to the coordinator as `CrawlResult`s, tracking
//! which item ids have already been processed in `SeenIds`.

pub mod seen;

use std::time::{SystemTime, UNIX_EPOCH};

use futures::stream::{self, StreamExt};
use mwmbl_core::config::BoardConfig;
use mwmbl_core::{CrawlContent, CrawlError, CrawlResult};
use mwmbl_coord::CoordinatorClient;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{info, warn};

use seen::SeenIds;

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    title: Option<String>,
    text: Option<String>,
    url: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
}

/// Build a `CrawlResult` from a single board item, or `None` if the item
/// carries nothing worth indexing (spec §4.8 edge case: item is `null`,
/// deleted, or dead).
fn build_result(item: &HnItem, extract_config: &mwmbl_core::config::ExtractConfig) -> Option<CrawlResult> {
    let (body_text, mut links) = match &item.text {
        Some(html) => extract_fragment(html),
        None => (String::new(), Vec::new()),
    };

    let title = item
        .title
        .as_deref()
        .map(|t| html_escape::decode_html_entities(t).into_owned())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| first_line(&body_text));

    if let Some(url) = &item.url {
        links.push(url.clone());
    }

    let extract = mwmbl_extract::html::truncate_chars(&body_text, extract_config.num_extract_chars);
    let title = mwmbl_extract::html::truncate_chars(&title, extract_config.num_title_chars);

    if title.trim().is_empty() && extract.trim().is_empty() && links.is_empty() {
        return None;
    }

    let item_url = format!("https://news.ycombinator.com/item?id={}", item.id);
    let timestamp = now_ms();

    Some(CrawlResult::success(
        &item_url,
        200,
        timestamp,
        CrawlContent {
            title,
            extract,
            links,
            extra_links: Vec::new(),
            links_only: false,
        },
    ))
}

fn extract_fragment(html: &str) -> (String, Vec<String>) {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect::<Vec<_>>().join(" ");

    let links = match Selector::parse("a[href]") {
        Ok(selector) => fragment
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|s| s.to_string())
            .collect(),
        Err(_) => Vec::new(),
    };
    (text, links)
}

fn first_line(text: &str) -> String {
    text.split_whitespace().take(20).collect::<Vec<_>>().join(" ")
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub struct BoardAdapter {
    http: reqwest::Client,
    coordinator: CoordinatorClient,
    seen: SeenIds,
    config: BoardConfig,
    extract_config: mwmbl_core::config::ExtractConfig,
}

impl BoardAdapter {
    pub fn new(
        config: BoardConfig,
        extract_config: mwmbl_core::config::ExtractConfig,
        coordinator: CoordinatorClient,
        seen: SeenIds,
    ) -> Result<Self, CrawlError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CrawlError::Other(e.into()))?;
        Ok(Self {
            http,
            coordinator,
            seen,
            config,
            extract_config,
        })
    }

    async fn max_item(&self) -> Result<i64, CrawlError> {
        let url = format!("{}/maxitem.json", self.config.base_url);
        self.http
            .get(&url)
            .send()
            .await
            .map_err(|e| CrawlError::Other(e.into()))?
            .json::<i64>()
            .await
            .map_err(|e| CrawlError::Other(e.into()))
    }

    async fn fetch_item(&self, id: i64) -> Option<HnItem> {
        let url = format!("{}/item/{id}.json", self.config.base_url);
        let resp = self.http.get(&url).send().await.ok()?;
        resp.json::<Option<HnItem>>().await.ok().flatten()
    }

    /// Runs one descending window of the board, oldest-in-window-first
    /// submission unit. Returns the new `max_item` boundary to continue from.
    async fn run_window(&self, window_top: i64) -> Result<i64, CrawlError> {
        let window_bottom = (window_top - self.config.num_items_to_fetch as i64).max(0);
        let ids: Vec<i64> = (window_bottom..window_top).rev().collect();

        let unseen = self.seen.filter_unseen(&ids).await?;

        let concurrency = self.config.num_threads.max(1);
        let items: Vec<HnItem> = stream::iter(unseen.iter().copied())
            .map(|id| self.fetch_item(id))
            .buffer_unordered(concurrency)
            .filter_map(|item| async move { item })
            .collect()
            .await;

        let results: Vec<CrawlResult> = items
            .iter()
            .filter_map(|item| build_result(item, &self.extract_config))
            .collect();

        if !results.is_empty() {
            self.coordinator.submit_batch_with_retry(&results).await?;
            info!(count = results.len(), window_bottom, window_top, "submitted board batch");
        } else {
            info!(window_bottom, window_top, "board window had no indexable items");
        }

        self.seen.insert_all(&ids).await?;
        Ok(window_bottom)
    }

    /// Outer loop (spec §4.8/§7): walk the board backwards from `max_item`
    /// until exhausted, then idle — callers wrap this in the same
    /// catch-log-sleep-continue loop used for the crawl worker.
    pub async fn run_forever(&self) -> Result<(), CrawlError> {
        let mut cursor = self.max_item().await?;
        loop {
            if cursor <= 0 {
                return Ok(());
            }
            cursor = match self.run_window(cursor).await {
                Ok(next) => next,
                Err(e) => {
                    warn!(error = %e, "board window failed");
                    return Err(e);
                }
            };
        }
    }
}
