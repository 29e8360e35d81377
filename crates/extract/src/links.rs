//! Link Normalizer/Classifier (spec §4.4): resolve, filter, dedupe, and
//! split harvested hrefs into the `new_links` / `extra_links` sets.

use std::collections::BTreeSet;

use mwmbl_core::{config::LinkConfig, ClassType, Paragraph};
use url::Url;

const BAD_EXTENSIONS: &[&str] = &[
    ".jpg", ".png", ".js", ".gz", ".zip", ".pdf", ".bz2", ".ipynb", ".py",
];

/// Resolve, filter, and classify every href across `paragraphs` in
/// paragraph order, returning `(new_links, extra_links)` as sorted,
/// deduplicated vectors.
pub fn get_new_links(paragraphs: &[Paragraph], current_url: &Url, config: &LinkConfig) -> (Vec<String>, Vec<String>) {
    let mut new_links: BTreeSet<String> = BTreeSet::new();
    let mut extra_links: BTreeSet<String> = BTreeSet::new();

    'outer: for paragraph in paragraphs {
        for href in &paragraph.links {
            let Some(resolved) = resolve(href, current_url) else {
                continue;
            };
            if !resolved.starts_with("http") || resolved.len() > config.max_url_length {
                continue;
            }
            let Ok(parsed) = Url::parse(&resolved) else {
                continue;
            };
            if is_bad_url(&parsed) {
                continue;
            }
            let canonical = canonicalize(&parsed);

            if paragraph.class_type == ClassType::Good && new_links.len() < config.max_new_links {
                new_links.insert(canonical);
            } else if extra_links.len() < config.max_extra_links && !new_links.contains(&canonical) {
                extra_links.insert(canonical);
            }

            if new_links.len() >= config.max_new_links && extra_links.len() >= config.max_extra_links {
                break 'outer;
            }
        }
    }

    (new_links.into_iter().collect(), extra_links.into_iter().collect())
}

/// Resolve a raw href per spec §4.4 step 1.
fn resolve(link: &str, current_url: &Url) -> Option<String> {
    if link.starts_with("http") {
        Some(link.to_string())
    } else if link.contains("://") {
        None
    } else if link.starts_with('/') {
        let host = current_url.host_str()?;
        Some(format!("{}://{}{}", current_url.scheme(), host, link))
    } else {
        current_url.join(link).ok().map(|u| u.to_string())
    }
}

/// The bad-URL pattern: `localhost` hosts, or paths ending in a denylisted
/// extension (spec §4.4 step 3; case-sensitive on the extension).
fn is_bad_url(url: &Url) -> bool {
    if url.host_str() == Some("localhost") {
        return true;
    }
    let path = url.path();
    BAD_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Drop the fragment, reconstructing `scheme://host/path?query` (spec §4.4
/// step 4).
fn canonicalize(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LinkConfig {
        LinkConfig {
            max_url_length: 150,
            max_new_links: 50,
            max_extra_links: 50,
        }
    }

    fn good(links: Vec<&str>) -> Paragraph {
        Paragraph {
            text: "placeholder".into(),
            links: links.into_iter().map(String::from).collect(),
            class_type: ClassType::Good,
        }
    }

    fn short(links: Vec<&str>) -> Paragraph {
        Paragraph {
            text: "placeholder".into(),
            links: links.into_iter().map(String::from).collect(),
            class_type: ClassType::Short,
        }
    }

    #[test]
    fn fragment_is_stripped() {
        let base = Url::parse("https://example.com/page").unwrap();
        let p = good(vec!["https://a.example/path?q=1#frag"]);
        let (new_links, _) = get_new_links(&[p], &base, &config());
        assert_eq!(new_links, vec!["https://a.example/path?q=1"]);
    }

    #[test]
    fn bad_extension_is_rejected() {
        let base = Url::parse("https://example.com/page").unwrap();
        let p = good(vec!["https://x.example/file.pdf"]);
        let (new_links, extra_links) = get_new_links(&[p], &base, &config());
        assert!(new_links.is_empty());
        assert!(extra_links.is_empty());
    }

    #[test]
    fn localhost_is_rejected() {
        let base = Url::parse("https://example.com/page").unwrap();
        let p = good(vec!["http://localhost/admin"]);
        let (new_links, extra_links) = get_new_links(&[p], &base, &config());
        assert!(new_links.is_empty());
        assert!(extra_links.is_empty());
    }

    #[test]
    fn relative_and_root_paths_resolve() {
        let base = Url::parse("https://example.com/dir/page").unwrap();
        let p = good(vec!["/root-link", "relative-link"]);
        let (new_links, _) = get_new_links(&[p], &base, &config());
        assert!(new_links.contains(&"https://example.com/root-link".to_string()));
        assert!(new_links.contains(&"https://example.com/dir/relative-link".to_string()));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let base = Url::parse("https://example.com/page").unwrap();
        let p = good(vec!["ftp://example.com/file"]);
        let (new_links, extra_links) = get_new_links(&[p], &base, &config());
        assert!(new_links.is_empty());
        assert!(extra_links.is_empty());
    }

    #[test]
    fn caps_at_fifty_each_and_no_overlap() {
        let base = Url::parse("https://example.com/page").unwrap();
        let good_links: Vec<String> = (0..60)
            .map(|i| format!("https://good.example/link{i}"))
            .collect();
        let short_links: Vec<String> = (0..60)
            .map(|i| format!("https://extra.example/link{i}"))
            .collect();
        let good_refs: Vec<&str> = good_links.iter().map(|s| s.as_str()).collect();
        let short_refs: Vec<&str> = short_links.iter().map(|s| s.as_str()).collect();
        let paragraphs = vec![good(good_refs), short(short_refs)];

        let (new_links, extra_links) = get_new_links(&paragraphs, &base, &config());
        assert_eq!(new_links.len(), 50);
        assert_eq!(extra_links.len(), 50);
        assert!(new_links.iter().all(|l| !extra_links.contains(l)));
        // sorted ascending
        let mut sorted = new_links.clone();
        sorted.sort();
        assert_eq!(new_links, sorted);
    }

    #[test]
    fn deterministic_across_runs() {
        let base = Url::parse("https://example.com/page").unwrap();
        let p = good(vec!["https://a.example/1", "https://b.example/2"]);
        let (links_a, extras_a) = get_new_links(&[p.clone()], &base, &config());
        let (links_b, extras_b) = get_new_links(&[p], &base, &config());
        assert_eq!(links_a, links_b);
        assert_eq!(extras_a, extras_b);
    }
}
