use serde::Deserialize;

/// Process-wide immutable configuration, constructed once at startup (spec
/// §9 design note: "expose them as an immutable configuration value
/// constructed at startup rather than as mutable globals").
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

/// Bounded Fetcher tunables (spec §4.1).
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_fetch_size")]
    pub max_fetch_size: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_fetch_size: default_max_fetch_size(),
            chunk_size: default_chunk_size(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    3
}
fn default_max_fetch_size() -> usize {
    1024 * 1024
}
fn default_chunk_size() -> usize {
    1024
}
fn default_user_agent() -> String {
    "Mwmbl".to_string()
}

/// Page Extractor tunables (spec §4.3).
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractConfig {
    #[serde(default = "default_title_chars")]
    pub num_title_chars: usize,
    #[serde(default = "default_extract_chars")]
    pub num_extract_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            num_title_chars: default_title_chars(),
            num_extract_chars: default_extract_chars(),
        }
    }
}

fn default_title_chars() -> usize {
    65
}
fn default_extract_chars() -> usize {
    155
}

/// Link Normalizer/Classifier tunables (spec §4.4).
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_max_url_length")]
    pub max_url_length: usize,
    #[serde(default = "default_max_new_links")]
    pub max_new_links: usize,
    #[serde(default = "default_max_extra_links")]
    pub max_extra_links: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_url_length: default_max_url_length(),
            max_new_links: default_max_new_links(),
            max_extra_links: default_max_extra_links(),
        }
    }
}

fn default_max_url_length() -> usize {
    150
}
fn default_max_new_links() -> usize {
    50
}
fn default_max_extra_links() -> usize {
    50
}

/// Coordinator Client tunables (spec §4.7).
#[derive(Debug, Deserialize, Clone)]
pub struct CoordinatorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_retry_backoff_seconds")]
    pub retry_backoff_seconds: u64,
    #[serde(default = "default_max_submit_retries")]
    pub max_submit_retries: u32,
    #[serde(default = "default_iteration_error_sleep_seconds")]
    pub iteration_error_sleep_seconds: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            retry_backoff_seconds: default_retry_backoff_seconds(),
            max_submit_retries: default_max_submit_retries(),
            iteration_error_sleep_seconds: default_iteration_error_sleep_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.mwmbl.org".to_string()
}
fn default_retry_backoff_seconds() -> u64 {
    5
}
fn default_max_submit_retries() -> u32 {
    10
}
fn default_iteration_error_sleep_seconds() -> u64 {
    10
}

/// Board-Item Adapter tunables (spec §4.8).
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    #[serde(default = "default_num_items_to_fetch")]
    pub num_items_to_fetch: u64,
    #[serde(default = "default_board_threads")]
    pub num_threads: usize,
    #[serde(default = "default_board_base_url")]
    pub base_url: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            num_items_to_fetch: default_num_items_to_fetch(),
            num_threads: default_board_threads(),
            base_url: default_board_base_url(),
            db_path: default_db_path(),
        }
    }
}

fn default_num_items_to_fetch() -> u64 {
    100
}
fn default_board_threads() -> usize {
    50
}
fn default_board_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}
fn default_db_path() -> String {
    "hn.db".to_string()
}
