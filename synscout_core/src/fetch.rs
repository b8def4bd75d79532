/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::fetch
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Define the page fetcher seam, select a backend for the run
    and screen fetched markup for bot-block interstitials.

  Security / Safety Notes:
    Read-only page loads; snapshot files are opened read-only.

  Dependencies:
    async-trait for the dynamic fetcher seam, tokio::fs.

  Operational Scope:
    One fetch per run; failures abort the run.

  Revision History:
    2025-11-12 COD  Introduced fetcher abstraction.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single attempt, no retries
    - Blocked pages surface as typed failures
============================================================*/

use std::path::PathBuf;

use async_trait::async_trait;

use crate::browser::ChromiumFetcher;
use crate::config::{FetchBackend, SynscoutConfig};
use crate::error::FetchError;
use crate::http::HttpFetcher;
use crate::logger::Logger;

/// Markers of vendor/CDN interstitials served instead of the real page.
const BLOCK_MARKERS: &[&str] = &[
    "access denied",
    "request unsuccessful. incapsula",
    "pardon our interruption",
    "attention required! | cloudflare",
    "/cdn-cgi/challenge-platform",
    "captcha-delivery.com",
    "please enable js and disable any ad blocker",
];

/// Pages shorter than this are treated as blocked or blank.
const MIN_PAGE_BYTES: usize = 256;

/// Loads a URL and returns the final markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short backend label for logs.
    fn describe(&self) -> &'static str;
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Replays a saved HTML snapshot instead of touching the network.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PageFetcher for FileFetcher {
    fn describe(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| FetchError::Source {
                path: self.path.display().to_string(),
                reason: err.to_string(),
            })
    }
}

/// Pick the fetcher for this run. A snapshot path wins over the configured backend.
pub fn build_fetcher(
    config: &SynscoutConfig,
    backend: FetchBackend,
    snapshot: Option<PathBuf>,
) -> Result<Box<dyn PageFetcher>, FetchError> {
    if let Some(path) = snapshot {
        return Ok(Box::new(FileFetcher::new(path)));
    }
    let timeout = config.page_load_timeout();
    let user_agent = config.source.user_agent.clone();
    Ok(match backend {
        FetchBackend::Browser => Box::new(ChromiumFetcher::new(
            config.fetcher.chrome_path.clone(),
            timeout,
            user_agent,
        )),
        FetchBackend::Http => Box::new(HttpFetcher::new(timeout, &user_agent)?),
    })
}

/// Fetch once and reject block pages.
pub async fn fetch_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    logger: &Logger,
) -> Result<String, FetchError> {
    logger.info("FETCH", format!("Loading {url} via {}", fetcher.describe()));
    let html = fetcher.fetch(url).await?;
    logger.debug("FETCH", format!("Received {} bytes", html.len()));
    detect_block(url, &html)?;
    Ok(html)
}

/// Heuristic check for bot-block or empty responses.
pub fn detect_block(url: &str, html: &str) -> Result<(), FetchError> {
    let blocked = |marker: &str| FetchError::Blocked {
        url: url.to_string(),
        marker: marker.to_string(),
    };

    if html.trim().len() < MIN_PAGE_BYTES {
        return Err(blocked("near-empty page"));
    }
    let lowered = html.to_lowercase();
    match BLOCK_MARKERS.iter().find(|marker| lowered.contains(*marker)) {
        Some(marker) => Err(blocked(*marker)),
        None => Ok(()),
    }
}
