//! A small boilerplate-vs-main-content classifier, standing in for the
//! external content-extraction library the specification treats as a given
//! collaborator (spec §3: the "Paragraph" record). Classifies a block of
//! text by length and stopword density, the same two signals jusText-style
//! extractors use, generalized from the teacher's plain text/link selectors
//! (`extract_text_by_selector`, `extract_links`).

use mwmbl_core::ClassType;

use crate::stopwords::ENGLISH_STOPWORDS;

const SHORT_WORD_THRESHOLD: usize = 10;
const GOOD_WORD_THRESHOLD: usize = 20;
const HIGH_LINK_DENSITY: f64 = 0.33;
const STOPWORD_DENSITY_THRESHOLD: f64 = 0.30;

/// Classify a block's text given the block's own word count and the
/// fraction of its character length made up of anchor text (`link_density`).
pub fn classify(text: &str, link_density: f64) -> ClassType {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < SHORT_WORD_THRESHOLD {
        return ClassType::Short;
    }

    if link_density > HIGH_LINK_DENSITY {
        return ClassType::Bad;
    }

    let stopword_count = words
        .iter()
        .filter(|w| ENGLISH_STOPWORDS.contains(&w.to_lowercase().trim_matches(|c: char| !c.is_alphanumeric())))
        .count();
    let stopword_density = stopword_count as f64 / words.len() as f64;

    if stopword_density >= STOPWORD_DENSITY_THRESHOLD {
        if words.len() >= GOOD_WORD_THRESHOLD {
            ClassType::Good
        } else {
            ClassType::NearGood
        }
    } else {
        ClassType::Bad
    }
}

pub fn link_density(text: &str, anchor_text_len: usize) -> f64 {
    if text.is_empty() {
        0.0
    } else {
        anchor_text_len as f64 / text.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_block_is_short() {
        assert_eq!(classify("just a few words here", 0.0), ClassType::Short);
    }

    #[test]
    fn prose_with_stopwords_is_good() {
        let text = "This is a long piece of text that has a lot of the common words \
                     that we would expect to find in an article about something interesting \
                     and it should be classified as the main content of the page";
        assert_eq!(classify(text, 0.0), ClassType::Good);
    }

    #[test]
    fn link_heavy_block_is_bad() {
        let text = "home about contact products services support blog careers news events";
        assert_eq!(classify(text, 0.9), ClassType::Bad);
    }
}
