//! One run: resolve -> locate -> extract -> aggregate -> report.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::aggregate::aggregate;
use crate::core::window::edgar_today;
use crate::core::{
    Config, DigestError, DocumentHandle, FilingClient, LookbackWindow, PurchaseRecord, Resolved,
    SourceKind,
};
use crate::extract::extract;
use crate::locate::{index_url_for, locate};
use crate::report::Reporter;
use crate::sources::Resolver;

/// Outcome of the collection stages, before anything is rendered.
#[derive(Debug, Clone)]
pub struct Collected {
    pub window: LookbackWindow,
    /// Strategy that produced the filings, `None` when every one came up empty.
    pub source: Option<SourceKind>,
    /// Documents that reached extraction.
    pub documents: usize,
    /// Final records, deduplicated and ranked.
    pub records: Vec<PurchaseRecord>,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source: Option<SourceKind>,
    pub documents: usize,
    pub records: usize,
    pub label: String,
}

pub struct Pipeline {
    config: Config,
    client: FilingClient,
    resolver: Resolver,
    today: Option<NaiveDate>,
}

impl Pipeline {
    /// Pipeline over the configured source chain.
    pub fn new(config: Config, client: FilingClient) -> Self {
        let resolver = Resolver::from_kinds(&config.sources);
        Self {
            config,
            client,
            resolver,
            today: None,
        }
    }

    /// Replace the source chain.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Pin the run date instead of reading the clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(edgar_today)
    }

    /// Run every stage up to (not including) reporting.
    ///
    /// Never fails: per-filing problems are logged and skipped, and an
    /// exhausted source chain yields an empty result.
    pub async fn collect(&self) -> Collected {
        let window = LookbackWindow::trailing(self.config.lookback_days, self.today());
        let threshold = self.config.min_purchase_usd;
        tracing::info!(threshold, start = %window.start, end = %window.end, "starting run");

        let resolution = self.resolver.resolve(&self.client, &window).await;
        let handles = self.documents_for(resolution.items).await;
        tracing::info!(count = handles.len(), "extracting documents");

        let mut records = Vec::new();
        for (i, handle) in handles.iter().enumerate() {
            match extract(&self.client, handle, threshold).await {
                Ok(found) => {
                    for r in &found {
                        tracing::info!(
                            ticker = %r.issuer.ticker,
                            insider = %r.insider.name,
                            value = r.total_value,
                            "purchase"
                        );
                    }
                    records.extend(found);
                }
                Err(e) => tracing::warn!(url = %handle.url, error = %e, "extraction failed; skipped"),
            }
            if (i + 1) % 50 == 0 {
                tracing::info!(done = i + 1, total = handles.len(), found = records.len(), "progress");
            }
        }

        let cutoff = (!resolution.enforces_window).then_some(window.start);
        let records = aggregate(records, cutoff);
        tracing::info!(count = records.len(), threshold, "unique purchases at or above threshold");

        Collected {
            window,
            source: resolution.source,
            documents: handles.len(),
            records,
        }
    }

    /// Full run: collect, render and deliver through `reporter`.
    ///
    /// # Errors
    ///
    /// Only delivery failures surface.
    pub async fn run(&self, reporter: &dyn Reporter) -> Result<RunSummary, DigestError> {
        let collected = self.collect().await;
        let label = report(reporter, &collected.records, collected.window.end).await?;

        Ok(RunSummary {
            source: collected.source,
            documents: collected.documents,
            records: collected.records.len(),
            label,
        })
    }

    /// Turn resolved items into fetchable documents, one per filing.
    async fn documents_for(&self, items: Vec<Resolved>) -> Vec<DocumentHandle> {
        let mut seen_index = HashSet::new();
        let mut seen_doc = HashSet::new();
        let mut out = Vec::new();

        for item in items {
            match item {
                Resolved::Document(handle) => {
                    if seen_doc.insert(handle.url.clone()) {
                        out.push(handle);
                    }
                }
                Resolved::Reference(reference) => {
                    match index_url_for(&self.client, &reference) {
                        Ok(url) if !seen_index.insert(url.to_string()) => continue,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::debug!(error = %e, "unusable filing reference; skipped");
                            continue;
                        }
                    }
                    match locate(&self.client, &reference).await {
                        // Issuer and owner listings of one filing share a document.
                        Ok(Some(handle)) if seen_doc.insert(handle.url.clone()) => out.push(handle),
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "filing index fetch failed; skipped"),
                    }
                }
            }
        }
        out
    }
}

/// Deliver the empty digest for a run that never reached an upstream.
///
/// # Errors
///
/// Only delivery failures surface.
pub async fn deliver_empty(
    reporter: &dyn Reporter,
    today: NaiveDate,
) -> Result<RunSummary, DigestError> {
    let label = report(reporter, &[], today).await?;
    Ok(RunSummary {
        source: None,
        documents: 0,
        records: 0,
        label,
    })
}

/// Render and deliver `records` under the label for `date`.
async fn report(
    reporter: &dyn Reporter,
    records: &[PurchaseRecord],
    date: NaiveDate,
) -> Result<String, DigestError> {
    let label = date.format("%B %d, %Y").to_string();
    let content = reporter.render(records, &label);
    reporter.deliver(&content, &label).await?;
    Ok(label)
}
