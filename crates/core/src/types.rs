use serde::{Deserialize, Serialize};

/// A paragraph record from the content extractor (spec §3).
///
/// Only `ClassType::Good` is treated as main content; the other classes
/// still feed link harvesting as the extra-links pool (spec §4.4).
#[derive(Debug, Clone)]
pub struct Paragraph {
    pub text: String,
    pub links: Vec<String>,
    pub class_type: ClassType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassType {
    Good,
    NearGood,
    Short,
    Bad,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Good => "good",
            ClassType::NearGood => "neargood",
            ClassType::Short => "short",
            ClassType::Bad => "bad",
        }
    }
}

/// The body of a successful crawl (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlContent {
    pub title: String,
    pub extract: String,
    pub links: Vec<String>,
    pub extra_links: Vec<String>,
    pub links_only: bool,
}

/// `{name, message}` error envelope (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlErrorInfo {
    pub name: String,
    pub message: String,
}

/// The canonical record submitted to the coordinator (spec §3).
///
/// `content` and `error` are mutually exclusive; this is enforced by
/// construction (see [`CrawlResult::success`] / [`CrawlResult::failure`])
/// rather than at the type level, because the wire shape (spec §6) requires
/// both fields to always be present, with exactly one of them `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub status: Option<u16>,
    pub timestamp: i64,
    pub content: Option<CrawlContent>,
    pub error: Option<CrawlErrorInfo>,
}

impl CrawlResult {
    pub fn success(
        url: impl Into<String>,
        status: u16,
        timestamp: i64,
        content: CrawlContent,
    ) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            timestamp,
            content: Some(content),
            error: None,
        }
    }

    pub fn failure(
        url: impl Into<String>,
        status: Option<u16>,
        timestamp: i64,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            timestamp,
            content: None,
            error: Some(CrawlErrorInfo {
                name: name.into(),
                message: message.into(),
            }),
        }
    }

    pub fn is_valid_envelope(&self) -> bool {
        self.content.is_some() != self.error.is_some()
    }
}
