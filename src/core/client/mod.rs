//! Public client surface + builder.
//! Internals are split into `throttle` (request pacing) and `constants` (UA + defaults).

mod constants;
mod throttle;

use crate::core::{Config, DigestError, net};
use constants::{
    DEFAULT_AGGREGATOR_PAGES, DEFAULT_BASE_ARCHIVES, DEFAULT_BASE_FEED, DEFAULT_BASE_SEARCH,
    DEFAULT_REQUEST_DELAY, DEFAULT_TIMEOUT, USER_AGENT,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use throttle::Throttle;
use url::Url;

/// HTTP client shared by every pipeline stage.
///
/// Holds the configured `reqwest` client, the upstream base URLs and the
/// request throttle. Cloning is cheap and clones share the throttle.
#[derive(Debug, Clone)]
pub struct FilingClient {
    http: Client,
    base_search: Url,
    base_archives: Url,
    base_feed: Url,
    aggregator_pages: Vec<Url>,
    throttle: Arc<Throttle>,
}

impl FilingClient {
    /// Create a new builder.
    pub fn builder() -> FilingClientBuilder {
        FilingClientBuilder::default()
    }

    /// Build a client from the run configuration (UA, timeout, pacing).
    ///
    /// # Errors
    ///
    /// Returns `DigestError` if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, DigestError> {
        Self::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .request_delay(config.request_delay)
            .build()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn base_search(&self) -> &Url {
        &self.base_search
    }
    pub(crate) fn base_archives(&self) -> &Url {
        &self.base_archives
    }
    pub(crate) fn base_feed(&self) -> &Url {
        &self.base_feed
    }
    pub(crate) fn aggregator_pages(&self) -> &[Url] {
        &self.aggregator_pages
    }

    /// Minimum delay enforced between consecutive requests.
    pub fn request_delay(&self) -> Duration {
        self.throttle.min_gap()
    }

    /// Paced GET that maps non-2xx statuses to `DigestError::Status` and reads the body.
    ///
    /// The body is read inside the paced section, so the next request waits
    /// for this one to finish downloading.
    pub(crate) async fn get_text(
        &self,
        url: Url,
        endpoint: &str,
        key: &str,
        ext: &str,
    ) -> Result<String, DigestError> {
        self.throttle
            .run(self.fetch_text(url, endpoint, key, ext))
            .await
    }

    async fn fetch_text(
        &self,
        url: Url,
        endpoint: &str,
        key: &str,
        ext: &str,
    ) -> Result<String, DigestError> {
        let resp = self.http.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(DigestError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(net::get_text(resp, endpoint, key, ext).await?)
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct FilingClientBuilder {
    user_agent: Option<String>,
    base_search: Option<Url>,
    base_archives: Option<Url>,
    base_feed: Option<Url>,
    aggregator_pages: Option<Vec<Url>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    request_delay: Option<Duration>,
}

impl FilingClientBuilder {
    /// Override the User-Agent (SEC requires a contact string).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the full-text search endpoint (e.g., `https://efts.sec.gov/LATEST/search-index`).
    #[must_use]
    pub fn base_search(mut self, url: Url) -> Self {
        self.base_search = Some(url);
        self
    }

    /// Override the archives root (e.g., `https://www.sec.gov/Archives/`). Must end with `/`.
    #[must_use]
    pub fn base_archives(mut self, url: Url) -> Self {
        self.base_archives = Some(url);
        self
    }

    /// Override the latest-filings browse endpoint.
    #[must_use]
    pub fn base_feed(mut self, url: Url) -> Self {
        self.base_feed = Some(url);
        self
    }

    /// Replace the aggregator listing pages (tried in the given order).
    #[must_use]
    pub fn aggregator_pages(mut self, pages: Vec<Url>) -> Self {
        self.aggregator_pages = Some(pages);
        self
    }

    /// Set a per-request timeout. Default: 30s.
    #[must_use]
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Minimum delay between consecutive requests. Default: 120ms.
    #[must_use]
    pub fn request_delay(mut self, dur: Duration) -> Self {
        self.request_delay = Some(dur);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `DigestError` if a default URL fails to parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<FilingClient, DigestError> {
        let base_search = match self.base_search {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_SEARCH)?,
        };
        let base_archives = match self.base_archives {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_ARCHIVES)?,
        };
        let base_feed = match self.base_feed {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_FEED)?,
        };
        let aggregator_pages = match self.aggregator_pages {
            Some(pages) => pages,
            None => DEFAULT_AGGREGATOR_PAGES
                .iter()
                .map(|p| Url::parse(p))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT));
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb.build()?;

        Ok(FilingClient {
            http,
            base_search,
            base_archives,
            base_feed,
            aggregator_pages,
            throttle: Arc::new(Throttle::new(
                self.request_delay.unwrap_or(DEFAULT_REQUEST_DELAY),
            )),
        })
    }
}
