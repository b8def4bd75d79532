/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::http
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Fetch the vendor page with a single HTTPS GET when a
    rendered DOM is not required.

  Security / Safety Notes:
    Performs read-only HTTPS requests to a public page.
    No credentials are transmitted.

  Dependencies:
    reqwest for HTTP.

  Operational Scope:
    Alternative fetch backend selected via `--backend http`.

  Revision History:
    2024-11-04 COD  Implemented asynchronous HTTP client.
    2025-11-12 COD  Reduced to single-attempt page fetch.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Configurable timeout and user agent
    - Explicit failure on non-success status
============================================================*/

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::PageFetcher;

/// Plain HTTP page fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| FetchError::Launch(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn describe(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let classify = |err: reqwest::Error| {
            if err.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                FetchError::Navigation {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }
        response.text().await.map_err(classify)
    }
}
