//! Source resolution: turn a lookback window into filing references or documents.
//!
//! Strategies are tried in priority order; the first one that finds anything
//! wins and the rest are never contacted. Internals are split into:
//! - `search`:       EDGAR full-text search API (paginated JSON)
//! - `daily_index`:  EDGAR per-day master index files
//! - `current_feed`: EDGAR latest-filings Atom feed
//! - `aggregator`:   third-party HTML listing pages (documents, no locator hop)

mod aggregator;
mod current_feed;
mod daily_index;
mod search;
mod wire;

pub use aggregator::AggregatorSource;
pub use current_feed::CurrentFeedSource;
pub use daily_index::DailyIndexSource;
pub use search::SearchApiSource;

use std::future::Future;
use std::pin::Pin;

use crate::core::{DigestError, FilingClient, LookbackWindow, Resolved, SourceKind};

/// Result of asking one strategy for filings.
#[derive(Debug)]
pub enum SourceOutcome {
    /// At least one reference or document.
    Found(Vec<Resolved>),
    /// The source answered but had nothing in the window.
    Empty,
    /// The source could not be queried (network, status, payload).
    Failed(DigestError),
}

impl From<Result<Vec<Resolved>, DigestError>> for SourceOutcome {
    fn from(res: Result<Vec<Resolved>, DigestError>) -> Self {
        match res {
            Ok(items) if items.is_empty() => SourceOutcome::Empty,
            Ok(items) => SourceOutcome::Found(items),
            Err(e) => SourceOutcome::Failed(e),
        }
    }
}

pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = SourceOutcome> + Send + 'a>>;

/// A single upstream strategy in the fallback chain.
pub trait FilingSource: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> SourceKind;

    /// Whether results are already restricted to the lookback window.
    ///
    /// When `false`, the aggregator re-filters records by filing date.
    fn enforces_window(&self) -> bool {
        true
    }

    /// Query the upstream for filings inside `window`.
    fn resolve<'a>(
        &'a self,
        client: &'a FilingClient,
        window: &'a LookbackWindow,
    ) -> SourceFuture<'a>;
}

/// Build the strategy object for `kind`.
pub fn source_for(kind: SourceKind) -> Box<dyn FilingSource> {
    match kind {
        SourceKind::SearchApi => Box::new(SearchApiSource::default()),
        SourceKind::DailyIndex => Box::new(DailyIndexSource),
        SourceKind::CurrentFeed => Box::new(CurrentFeedSource),
        SourceKind::Aggregator => Box::new(AggregatorSource),
    }
}

/// What the resolver settled on.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Strategy that produced `items`; `None` when every strategy came up empty.
    pub source: Option<SourceKind>,
    pub items: Vec<Resolved>,
    /// Copied from the winning strategy; `true` when nothing was found.
    pub enforces_window: bool,
}

/// Ordered fallback chain of sources.
pub struct Resolver {
    sources: Vec<Box<dyn FilingSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn FilingSource>>) -> Self {
        Self { sources }
    }

    /// Chain built from configured kinds, in the given order.
    pub fn from_kinds(kinds: &[SourceKind]) -> Self {
        Self::new(kinds.iter().copied().map(source_for).collect())
    }

    /// Try each source in turn until one yields results.
    ///
    /// Never fails: exhausting the chain is a valid, empty resolution.
    pub async fn resolve(&self, client: &FilingClient, window: &LookbackWindow) -> Resolution {
        for source in &self.sources {
            let kind = source.kind();
            tracing::info!(
                source = kind.as_str(),
                start = %window.start,
                end = %window.end,
                "resolving filings"
            );
            match source.resolve(client, window).await {
                SourceOutcome::Found(items) => {
                    tracing::info!(source = kind.as_str(), count = items.len(), "source resolved filings");
                    return Resolution {
                        source: Some(kind),
                        items,
                        enforces_window: source.enforces_window(),
                    };
                }
                SourceOutcome::Empty => {
                    tracing::warn!(source = kind.as_str(), "source returned nothing; trying next");
                }
                SourceOutcome::Failed(e) => {
                    tracing::warn!(source = kind.as_str(), error = %e, "source failed; trying next");
                }
            }
        }
        tracing::warn!("all sources exhausted without results");
        Resolution {
            source: None,
            items: Vec::new(),
            enforces_window: true,
        }
    }
}
