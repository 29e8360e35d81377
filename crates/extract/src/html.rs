//! Page Extractor (spec §4.3): parse HTML, derive the title, and split the
//! body into classified paragraph records.

use mwmbl_core::{ClassType, CrawlError, Paragraph};
use scraper::{Html, Selector};

use crate::justext;

pub struct PageExtract {
    pub title_raw: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

/// Block-level tags considered as paragraph boundaries, mirroring the
/// teacher's `extract_text_by_selector` granularity (h1/h2/h3) extended to
/// the other common prose containers jusText-style extractors split on.
const BLOCK_SELECTOR: &str = "p, li, blockquote, td, h1, h2, h3, h4, h5, h6, article, section";

pub fn extract(body: &[u8]) -> Result<PageExtract, CrawlError> {
    // scraper's html5ever backend is tolerant of malformed markup by design
    // (it never returns Err), matching real-world crawl targets.
    let body_str = String::from_utf8_lossy(body);
    let document = Html::parse_document(&body_str);

    let title_raw = title_selector()
        .and_then(|s| document.select(&s).next())
        .map(|el| el.text().collect::<String>().trim().to_string());

    let block_selector = Selector::parse(BLOCK_SELECTOR)
        .map_err(|e| CrawlError::DomParseError(format!("{e:?}")))?;
    let anchor_selector = Selector::parse("a[href]").ok();

    let mut paragraphs = Vec::new();
    for block in document.select(&block_selector) {
        let text = block
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }

        let mut links = Vec::new();
        let mut anchor_text_len = 0usize;
        if let Some(sel) = &anchor_selector {
            for a in block.select(sel) {
                if let Some(href) = a.value().attr("href") {
                    links.push(href.to_string());
                    anchor_text_len += a.text().collect::<String>().len();
                }
            }
        }

        let density = justext::link_density(&text, anchor_text_len);
        let class_type = justext::classify(&text, density);

        paragraphs.push(Paragraph {
            text,
            links,
            class_type,
        });
    }

    Ok(PageExtract {
        title_raw,
        paragraphs,
    })
}

fn title_selector() -> Option<Selector> {
    Selector::parse("title").ok()
}

/// Truncate `s` to at most `max_chars` Unicode scalar values, appending `…`
/// when truncation occurred (spec §4.3: title/extract truncation rule).
/// Idempotent: re-applying to an already-truncated string is a no-op.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

pub fn good_paragraphs_extract(paragraphs: &[Paragraph], max_chars: usize) -> String {
    let mut extract = String::new();
    for p in paragraphs {
        if p.class_type != ClassType::Good {
            continue;
        }
        let trimmed = p.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !extract.is_empty() {
            extract.push(' ');
        }
        extract.push_str(trimmed);
        if extract.chars().count() > max_chars {
            extract = truncate_chars(&extract, max_chars);
            break;
        }
    }
    extract
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_truncation_exact_boundary() {
        let s65 = "x".repeat(65);
        assert_eq!(truncate_chars(&s65, 65), s65);
        let s66 = "x".repeat(66);
        let truncated = truncate_chars(&s66, 65);
        assert_eq!(truncated.chars().count(), 65);
        assert!(truncated.ends_with('\u{2026}'));
    }

    #[test]
    fn truncation_is_idempotent() {
        let s = "x".repeat(200);
        let once = truncate_chars(&s, 65);
        let twice = truncate_chars(&once, 65);
        assert_eq!(once, twice);
    }

    #[test]
    fn extract_title_from_document() {
        let html = b"<html><head><title>  Hello World  </title></head><body></body></html>";
        let extracted = extract(html).unwrap();
        assert_eq!(extracted.title_raw.as_deref(), Some("Hello World"));
    }

    #[test]
    fn missing_title_is_none() {
        let html = b"<html><body><p>no title here</p></body></html>";
        let extracted = extract(html).unwrap();
        assert_eq!(extracted.title_raw, None);
    }
}
