//! Robots Gate: per-URL robots.txt policy lookup with permissive fallback
//! (spec §4.2). Never raises — every failure mode degrades to "allowed".

use mwmbl_fetch::BoundedFetcher;
use texting_robots::Robot;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = "Mwmbl";

pub struct RobotsGate<'a> {
    fetcher: &'a BoundedFetcher,
}

impl<'a> RobotsGate<'a> {
    pub fn new(fetcher: &'a BoundedFetcher) -> Self {
        Self { fetcher }
    }

    /// Returns whether `url` may be fetched under user-agent `Mwmbl`.
    pub async fn allowed(&self, url: &Url) -> bool {
        if is_bare_root(url) {
            return true;
        }

        let robots_url = match root_robots_url(url) {
            Some(u) => u,
            None => return false,
        };

        let fetched = match self.fetcher.fetch(&robots_url).await {
            Ok(f) => f,
            Err(e) => {
                debug!(url = %url, error = %e, "robots.txt unreachable, allowing");
                return true;
            }
        };

        if fetched.status != 200 {
            debug!(url = %url, status = fetched.status, "robots.txt non-200, allowing");
            return true;
        }

        let text = decode_body(&fetched.body);

        let robot = match Robot::new(USER_AGENT, text.as_bytes()) {
            Ok(r) => r,
            Err(_) => return true,
        };

        robot.allowed(url.as_str())
    }
}

/// The root domain (empty path and query, after stripping trailing slashes
/// from the path) is always allowed without a robots.txt fetch (spec §4.2).
fn is_bare_root(url: &Url) -> bool {
    url.path().trim_end_matches('/').is_empty() && url.query().is_none()
}

fn root_robots_url(url: &Url) -> Option<Url> {
    let host = url.host_str()?;
    let mut robots = Url::parse(&format!("{}://{}", url.scheme(), host)).ok()?;
    if let Some(port) = url.port() {
        robots.set_port(Some(port)).ok()?;
    }
    robots.set_path("/robots.txt");
    Some(robots)
}

/// Decode using the first successful of UTF-8, then ISO-8859-1 (spec §4.2
/// step 5). ISO-8859-1 is a single-byte-per-codepoint encoding so this
/// second attempt never itself fails.
fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwmbl_core::config::FetchConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fetch_config() -> FetchConfig {
        FetchConfig {
            timeout_seconds: 3,
            max_fetch_size: 1024 * 1024,
            chunk_size: 1024,
            user_agent: "Mwmbl".into(),
        }
    }

    async fn serve_robots(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(s) => s,
                    Err(_) => return,
                };
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(body.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn root_domain_always_allowed_without_fetch() {
        let fetcher = BoundedFetcher::new(&fetch_config()).unwrap();
        let gate = RobotsGate::new(&fetcher);
        let url = Url::parse("http://unroutable.invalid.example/").unwrap();
        assert!(gate.allowed(&url).await);
    }

    #[tokio::test]
    async fn disallowed_path_is_denied() {
        let base = serve_robots("User-agent: Mwmbl\nDisallow: /private\n").await;
        let fetcher = BoundedFetcher::new(&fetch_config()).unwrap();
        let gate = RobotsGate::new(&fetcher);
        let url = Url::parse(&format!("{base}/private/x")).unwrap();
        assert!(!gate.allowed(&url).await);
    }

    #[tokio::test]
    async fn allowed_path_passes() {
        let base = serve_robots("User-agent: Mwmbl\nDisallow: /private\n").await;
        let fetcher = BoundedFetcher::new(&fetch_config()).unwrap();
        let gate = RobotsGate::new(&fetcher);
        let url = Url::parse(&format!("{base}/public")).unwrap();
        assert!(gate.allowed(&url).await);
    }

    #[tokio::test]
    async fn unreachable_robots_is_permissive() {
        let fetcher = BoundedFetcher::new(&fetch_config()).unwrap();
        let gate = RobotsGate::new(&fetcher);
        let url = Url::parse("http://127.0.0.1:1/private/x").unwrap();
        assert!(gate.allowed(&url).await);
    }
}
