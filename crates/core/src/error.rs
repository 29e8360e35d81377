use thiserror::Error;

/// Failure taxonomy for a single URL's crawl attempt.
///
/// The `error_name()` of each variant is the `error.name` string placed in
/// the `CrawlResult` envelope — it must match the taxonomy in the
/// specification exactly, so adding a variant here is a wire-format change.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("disallowed by robots.txt")]
    RobotsDenied,

    #[error("fetch aborted: {0}")]
    AbortError(String),

    #[error("response body was empty")]
    NoResponseText,

    #[error("failed to parse HTML: {0}")]
    DomParseError(String),

    #[error("content extraction failed: {0}")]
    ExtractorError(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("coordinator error: {0}")]
    Coordinator(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CrawlError {
    /// The `error.name` string for the `CrawlResult` envelope (spec §3, §7).
    pub fn error_name(&self) -> &'static str {
        match self {
            CrawlError::RobotsDenied => "RobotsDenied",
            CrawlError::AbortError(_) => "AbortError",
            CrawlError::NoResponseText => "NoResponseText",
            CrawlError::DomParseError(_) => "DomParseError",
            CrawlError::ExtractorError(_) => "ExtractorError",
            CrawlError::InvalidUrl(_) => "InvalidUrl",
            CrawlError::Config(_) => "Config",
            CrawlError::Coordinator(_) => "Coordinator",
            CrawlError::Storage(_) => "Storage",
            CrawlError::Other(_) => "Error",
        }
    }
}
