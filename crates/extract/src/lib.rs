pub mod html;
pub mod justext;
pub mod links;
mod stopwords;

use mwmbl_core::config::{ExtractConfig, LinkConfig};
use mwmbl_core::{CrawlError, Paragraph};
use url::Url;

/// Result of the Page Extractor (spec §4.3): a derived title and the
/// classified paragraph set the Link Normalizer and extract-builder both
/// consume.
pub struct Extracted {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

/// Parse `body` and derive `{title, extract, paragraphs}` (spec §4.3).
pub fn extract_page(body: &[u8], config: &ExtractConfig) -> Result<Extracted, CrawlError> {
    let parsed = html::extract(body)?;
    let title = match parsed.title_raw {
        Some(t) if !t.is_empty() => html::truncate_chars(&t, config.num_title_chars),
        _ => String::new(),
    };

    Ok(Extracted {
        title,
        paragraphs: parsed.paragraphs,
    })
}

pub fn build_extract(paragraphs: &[Paragraph], config: &ExtractConfig) -> String {
    html::good_paragraphs_extract(paragraphs, config.num_extract_chars)
}

pub fn normalize_links(
    paragraphs: &[Paragraph],
    current_url: &Url,
    config: &LinkConfig,
) -> (Vec<String>, Vec<String>) {
    links::get_new_links(paragraphs, current_url, config)
}
