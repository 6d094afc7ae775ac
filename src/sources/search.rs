//! EDGAR full-text search strategy.

use super::wire::{Hit, SearchEnvelope};
use super::{FilingSource, SourceFuture, SourceOutcome};
use crate::core::{
    Accession, DigestError, FilingClient, FilingReference, LookbackWindow, Resolved, SourceKind,
};

/// Paginated `forms=4` queries against the full-text search API.
#[derive(Debug, Clone)]
pub struct SearchApiSource {
    page_size: u64,
    /// Hard stop on the `from` offset, whatever total the upstream reports.
    max_offset: u64,
}

impl Default for SearchApiSource {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_offset: 500,
        }
    }
}

impl SearchApiSource {
    /// Override paging; mostly useful for tests.
    pub fn with_paging(page_size: u64, max_offset: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            max_offset,
        }
    }

    async fn fetch_all(&self, client: &FilingClient, window: &LookbackWindow) -> SourceOutcome {
        let start = window.start.format("%Y-%m-%d").to_string();
        let end = window.end.format("%Y-%m-%d").to_string();

        let mut out = Vec::new();
        let mut offset = 0u64;

        loop {
            let mut url = client.base_search().clone();
            url.query_pairs_mut()
                .append_pair("forms", "4")
                .append_pair("dateRange", "custom")
                .append_pair("startdt", &start)
                .append_pair("enddt", &end)
                .append_pair("from", &offset.to_string())
                .append_pair("size", &self.page_size.to_string());

            tracing::info!(offset, "fetching full-text search page");
            let page = match fetch_page(client, url).await {
                Ok(p) => p,
                Err(e) if offset == 0 => return SourceOutcome::Failed(e),
                Err(e) => {
                    tracing::warn!(offset, error = %e, "search page failed; keeping earlier pages");
                    break;
                }
            };

            let Some(hits_node) = page.hits else { break };
            if hits_node.hits.is_empty() {
                break;
            }
            let total = hits_node.total.as_ref().map_or(u64::MAX, |t| t.value());

            for hit in hits_node.hits {
                match reference_from_hit(hit) {
                    Some(r) => out.push(Resolved::Reference(r)),
                    None => tracing::debug!("search hit without accession/CIK; skipped"),
                }
            }

            offset += self.page_size;
            if offset >= total || offset >= self.max_offset {
                break;
            }
        }

        Ok::<_, DigestError>(out).into()
    }
}

impl FilingSource for SearchApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SearchApi
    }

    fn resolve<'a>(
        &'a self,
        client: &'a FilingClient,
        window: &'a LookbackWindow,
    ) -> SourceFuture<'a> {
        Box::pin(self.fetch_all(client, window))
    }
}

async fn fetch_page(client: &FilingClient, url: url::Url) -> Result<SearchEnvelope, DigestError> {
    let key = url.query().unwrap_or_default().to_string();
    let body = client.get_text(url, "search", &key, "json").await?;
    Ok(serde_json::from_str(&body)?)
}

fn reference_from_hit(hit: Hit) -> Option<FilingReference> {
    let src = hit.source?;

    // `_id` looks like `0001234567-24-000001:wk-form4_123.xml`
    let id_accession = hit
        .id
        .as_deref()
        .and_then(|id| id.split(':').next())
        .map(str::to_string);
    // First candidate that parses wins; a malformed `adsh` must not hide the others.
    let accession = [src.adsh, src.accession_no, id_accession]
        .into_iter()
        .flatten()
        .find_map(|raw| Accession::parse(&raw).ok())?;

    let cik = src
        .ciks
        .first()
        .cloned()
        .or_else(|| match src.cik {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .map(|c| normalize_cik(&c))
        .filter(|c| !c.is_empty())?;

    let entity_name = src
        .display_names
        .into_iter()
        .next()
        .or(src.entity_name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Some(FilingReference::Accession {
        accession,
        cik,
        entity_name,
        filing_date: src.file_date,
    })
}

/// Archive paths use the CIK without leading zeros.
pub(crate) fn normalize_cik(raw: &str) -> String {
    raw.trim().trim_start_matches('0').to_string()
}
