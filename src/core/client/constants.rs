//! Centralized constants for default endpoints, UA and pacing.

use std::time::Duration;

/// Identifying UA; SEC fair-access policy rejects anonymous clients.
pub(crate) const USER_AGENT: &str = "InsiderBot/1.0 (you@gmail.com)";

/// EDGAR full-text search API.
pub(crate) const DEFAULT_BASE_SEARCH: &str = "https://efts.sec.gov/LATEST/search-index";

/// EDGAR archives root (filing index pages and daily indices hang off it).
pub(crate) const DEFAULT_BASE_ARCHIVES: &str = "https://www.sec.gov/Archives/";

/// EDGAR "latest filings" browse endpoint (Atom output).
pub(crate) const DEFAULT_BASE_FEED: &str = "https://www.sec.gov/cgi-bin/browse-edgar";

/// Aggregator listing pages, in priority order.
pub(crate) const DEFAULT_AGGREGATOR_PAGES: &[&str] = &[
    "http://openinsider.com/latest-insider-purchases-25k",
    "http://openinsider.com/insider-purchases",
];

/// SEC allows at most 10 requests per second.
pub(crate) const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(120);

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
