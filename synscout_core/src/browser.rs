/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::browser
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Render the vendor page in headless Chromium and capture
    the final DOM markup.

  Security / Safety Notes:
    Chromium runs sandbox-less inside the operator's session
    with extensions and background networking disabled. The
    browser process is closed and reaped on every exit path.

  Dependencies:
    chromiumoxide for CDP control, futures for the event
    handler stream, which for binary discovery.

  Operational Scope:
    Default fetch backend; one browser launch per run.

  Revision History:
    2025-11-12 COD  Authored scoped Chromium fetcher.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Scoped acquisition and release of external processes
    - Bounded page load with explicit timeout failure
============================================================*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::fetch::PageFetcher;

const CHROME_CANDIDATES: &[&str] = &["google-chrome", "chromium", "chromium-browser"];

/// Locate a Chromium binary: configured path, `CHROME_PATH`, then `PATH`.
pub fn find_chromium(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured.filter(|path| path.exists()) {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os("CHROME_PATH").map(PathBuf::from) {
        if path.exists() {
            return Some(path);
        }
    }
    CHROME_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Headless Chromium page fetcher.
pub struct ChromiumFetcher {
    executable: Option<PathBuf>,
    timeout: Duration,
    user_agent: String,
}

impl ChromiumFetcher {
    pub fn new(executable: Option<PathBuf>, timeout: Duration, user_agent: String) -> Self {
        Self {
            executable,
            timeout,
            user_agent,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.timeout)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={}", self.user_agent));
        // Without a discovered binary chromiumoxide falls back to its own lookup.
        if let Some(path) = find_chromium(self.executable.as_deref()) {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(FetchError::Launch)
    }
}

#[async_trait]
impl PageFetcher for ChromiumFetcher {
    fn describe(&self) -> &'static str {
        "chromium"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let session = BrowserSession::launch(self.browser_config()?).await?;
        let rendered = tokio::time::timeout(self.timeout, session.render(url)).await;
        session.shutdown().await;

        rendered.unwrap_or_else(|_| {
            Err(FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            })
        })
    }
}

/// A launched browser plus its CDP event pump.
struct BrowserSession {
    browser: Browser,
    events: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(config: BrowserConfig) -> Result<Self, FetchError> {
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| FetchError::Launch(err.to_string()))?;
        let events = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });
        Ok(Self { browser, events })
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let navigation = |err: chromiumoxide::error::CdpError| FetchError::Navigation {
            url: url.to_string(),
            reason: err.to_string(),
        };
        let page = self.browser.new_page(url).await.map_err(navigation)?;
        page.wait_for_navigation().await.map_err(navigation)?;
        let html = page.content().await.map_err(navigation)?;
        let _ = page.close().await;
        Ok(html)
    }

    /// Close the browser, reap the child process and stop the event pump.
    async fn shutdown(mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.events.abort();
    }
}
