//! Third-party aggregator strategy (last resort).
//!
//! Listing pages already carry per-trade rows, so this source returns the
//! page itself as a document and skips the locator. The window start travels
//! on the handle so extraction can drop stale rows one by one.

use super::{FilingSource, SourceFuture, SourceOutcome};
use crate::core::{
    DigestError, DocumentHandle, DocumentShape, FilingClient, LookbackWindow, Resolved, SourceKind,
};
use crate::extract::has_purchase_table;

#[derive(Debug, Clone, Copy, Default)]
pub struct AggregatorSource;

impl FilingSource for AggregatorSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Aggregator
    }

    fn enforces_window(&self) -> bool {
        false
    }

    fn resolve<'a>(
        &'a self,
        client: &'a FilingClient,
        window: &'a LookbackWindow,
    ) -> SourceFuture<'a> {
        Box::pin(fetch_first_table(client, window))
    }
}

/// First configured page whose table holds at least one valid purchase row wins.
async fn fetch_first_table(client: &FilingClient, window: &LookbackWindow) -> SourceOutcome {
    let mut last_err: Option<DigestError> = None;
    let mut answered = false;

    for page in client.aggregator_pages() {
        let key = page.path().trim_matches('/').replace('/', "_");
        match client.get_text(page.clone(), "aggregator", &key, "html").await {
            Ok(body) => {
                answered = true;
                if has_purchase_table(&body) {
                    tracing::info!(url = %page, "aggregator page has a purchases table");
                    let mut handle = DocumentHandle::new(page.as_str(), DocumentShape::HtmlTable);
                    handle.body = Some(body);
                    handle.not_before = Some(window.start);
                    return SourceOutcome::Found(vec![Resolved::Document(handle)]);
                }
                tracing::warn!(url = %page, "aggregator page has no purchase rows");
            }
            Err(e) => {
                tracing::warn!(url = %page, error = %e, "aggregator page fetch failed");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if !answered => SourceOutcome::Failed(e),
        _ => SourceOutcome::Empty,
    }
}
