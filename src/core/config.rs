//! Run configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::core::DigestError;

/// Variable holding the SMTP app password; the only setting without a default.
pub const CREDENTIAL_VAR: &str = "GMAIL_APP_PASSWORD";

/// Longest accepted `LOOKBACK_DAYS`; larger values fall back to the default.
pub const MAX_LOOKBACK_DAYS: u32 = 366;

/// Upstream source strategies, in the order they may be tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// EDGAR full-text search API.
    SearchApi,
    /// EDGAR per-day master index files.
    DailyIndex,
    /// EDGAR latest-filings Atom feed.
    CurrentFeed,
    /// Third-party HTML listing pages.
    Aggregator,
}

impl SourceKind {
    /// Default fallback chain.
    pub const DEFAULT_ORDER: [SourceKind; 4] = [
        SourceKind::SearchApi,
        SourceKind::DailyIndex,
        SourceKind::CurrentFeed,
        SourceKind::Aggregator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::SearchApi => "search",
            SourceKind::DailyIndex => "daily-index",
            SourceKind::CurrentFeed => "current-feed",
            SourceKind::Aggregator => "aggregator",
        }
    }
}

impl FromStr for SourceKind {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" | "search-api" | "efts" => Ok(SourceKind::SearchApi),
            "daily-index" | "index" | "flat-file" => Ok(SourceKind::DailyIndex),
            "current-feed" | "feed" | "rss" | "atom" => Ok(SourceKind::CurrentFeed),
            "aggregator" | "openinsider" => Ok(SourceKind::Aggregator),
            other => Err(DigestError::Data(format!("unknown source kind: {other}"))),
        }
    }
}

/// Immutable configuration for one run.
///
/// Built once at startup and passed explicitly into every component; nothing
/// else in the crate reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum aggregate USD value for a purchase record to be reported.
    pub min_purchase_usd: f64,
    /// SMTP app password.
    pub smtp_password: String,
    /// Sender account address (also the SMTP login).
    pub sender: String,
    /// Digest recipient.
    pub recipient: String,
    /// SMTP relay host (implicit TLS).
    pub smtp_host: String,
    /// Identifying `User-Agent` sent upstream.
    pub user_agent: String,
    /// Trailing window of filing days to consider.
    pub lookback_days: u32,
    /// Minimum delay between consecutive requests.
    pub request_delay: Duration,
    /// Timeout applied to each individual request.
    pub request_timeout: Duration,
    /// Source strategies in priority order.
    pub sources: Vec<SourceKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_purchase_usd: 250_000.0,
            smtp_password: String::new(),
            sender: "you@gmail.com".to_string(),
            recipient: "you@gmail.com".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
            user_agent: "InsiderBot/1.0 (you@gmail.com)".to_string(),
            lookback_days: 3,
            request_delay: Duration::from_millis(120),
            request_timeout: Duration::from_secs(30),
            sources: SourceKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MIN_PURCHASE_USD` (default: 250000)
    /// - `GMAIL_APP_PASSWORD` (required)
    /// - `GMAIL_ADDRESS` (default: you@gmail.com)
    /// - `RECIPIENT_EMAIL` (default: `GMAIL_ADDRESS`)
    /// - `SMTP_HOST` (default: smtp.gmail.com)
    /// - `EDGAR_USER_AGENT` (default: InsiderBot/1.0 (you@gmail.com))
    /// - `LOOKBACK_DAYS` (default: 3)
    /// - `REQUEST_DELAY_MS` (default: 120)
    /// - `REQUEST_TIMEOUT_SECS` (default: 30)
    /// - `INSIDER_SOURCES` (default: search,daily-index,current-feed,aggregator)
    ///
    /// # Errors
    ///
    /// Returns `DigestError::MissingCredential` when `GMAIL_APP_PASSWORD` is unset or empty.
    pub fn from_env() -> Result<Self, DigestError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `DigestError::MissingCredential` when the credential is absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DigestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let smtp_password = get(CREDENTIAL_VAR).ok_or(DigestError::MissingCredential {
            var: CREDENTIAL_VAR,
        })?;

        let sender = get("GMAIL_ADDRESS").unwrap_or(defaults.sender);
        let recipient = get("RECIPIENT_EMAIL").unwrap_or_else(|| sender.clone());

        let sources = match get("INSIDER_SOURCES") {
            Some(raw) => parse_sources(&raw).unwrap_or_else(|| {
                tracing::warn!("INSIDER_SOURCES=`{raw}` is invalid; using the default order");
                defaults.sources.clone()
            }),
            None => defaults.sources.clone(),
        };

        Ok(Self {
            min_purchase_usd: parsed_or(&get, "MIN_PURCHASE_USD", defaults.min_purchase_usd),
            smtp_password,
            sender,
            recipient,
            smtp_host: get("SMTP_HOST").unwrap_or(defaults.smtp_host),
            user_agent: get("EDGAR_USER_AGENT").unwrap_or(defaults.user_agent),
            lookback_days: lookback_days(&get, defaults.lookback_days),
            request_delay: Duration::from_millis(parsed_or(&get, "REQUEST_DELAY_MS", 120u64)),
            request_timeout: Duration::from_secs(parsed_or(&get, "REQUEST_TIMEOUT_SECS", 30u64)),
            sources,
        })
    }
}

fn parsed_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{key}=`{raw}` is not valid; using the default");
            default
        }),
        None => default,
    }
}

fn lookback_days<G>(get: &G, default: u32) -> u32
where
    G: Fn(&str) -> Option<String>,
{
    let days = parsed_or(get, "LOOKBACK_DAYS", default);
    if days > MAX_LOOKBACK_DAYS {
        tracing::warn!("LOOKBACK_DAYS={days} exceeds {MAX_LOOKBACK_DAYS}; using the default");
        return default;
    }
    days
}

fn parse_sources(raw: &str) -> Option<Vec<SourceKind>> {
    let mut out = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let kind = part.parse::<SourceKind>().ok()?;
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    (!out.is_empty()).then_some(out)
}
