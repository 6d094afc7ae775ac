//! insider-digest: daily digest of sizeable insider open-market purchases.
//!
//! A run walks a fixed chain of stages:
//! - [`sources`]: resolve the lookback window to filings, falling back across
//!   upstreams (full-text search, daily index, latest-filings feed, aggregator).
//! - [`locate`]: turn a filing reference into its Form 4 XML document.
//! - [`extract`]: parse documents into [`PurchaseRecord`]s above the threshold.
//! - [`aggregate`]: re-filter, deduplicate and rank.
//! - [`report`]: render and deliver the digest.

pub mod aggregate;
pub mod core;
pub mod extract;
pub mod locate;
pub mod pipeline;
pub mod report;
pub mod sources;

pub use crate::core::{
    Accession, Config, DigestError, DocumentHandle, DocumentShape, FilingClient,
    FilingClientBuilder, FilingReference, Insider, Issuer, LookbackWindow, Provenance,
    PurchaseLine, PurchaseRecord, Resolved, SourceKind,
};
pub use aggregate::aggregate;
pub use extract::{DocumentExtractor, Form4Extractor, HtmlTableExtractor, extract, extractor_for};
pub use locate::locate;
pub use pipeline::{Collected, Pipeline, RunSummary, deliver_empty};
pub use report::{DigestRenderer, EmailReporter, Reporter};
pub use sources::{FilingSource, Resolution, Resolver, SourceOutcome};
