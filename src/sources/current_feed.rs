//! EDGAR latest-filings Atom feed strategy.

use url::Url;

use super::{FilingSource, SourceFuture, SourceOutcome};
use crate::core::window::parse_filing_date;
use crate::core::{DigestError, FilingClient, FilingReference, LookbackWindow, Resolved, SourceKind};
use crate::extract::utils::{child, node_text, with_lenient_xml};

#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentFeedSource;

impl FilingSource for CurrentFeedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CurrentFeed
    }

    fn resolve<'a>(
        &'a self,
        client: &'a FilingClient,
        window: &'a LookbackWindow,
    ) -> SourceFuture<'a> {
        Box::pin(async move { SourceOutcome::from(fetch_feed(client, window).await) })
    }
}

async fn fetch_feed(
    client: &FilingClient,
    window: &LookbackWindow,
) -> Result<Vec<Resolved>, DigestError> {
    let mut url = client.base_feed().clone();
    url.query_pairs_mut()
        .append_pair("action", "getcurrent")
        .append_pair("type", "4")
        .append_pair("company", "")
        .append_pair("dateb", "")
        .append_pair("owner", "include")
        .append_pair("start", "0")
        .append_pair("count", "100")
        .append_pair("output", "atom");

    tracing::info!("fetching latest-filings feed");
    let body = client.get_text(url.clone(), "current_feed", "form4", "xml").await?;
    let refs = parse_feed(&body, &url, window)?;
    Ok(refs.into_iter().map(Resolved::Reference).collect())
}

/// Form 4 entries from an Atom feed, newest first as published.
///
/// Entries dated before the window start are dropped; undated or unparsable
/// entries are kept.
pub(crate) fn parse_feed(
    body: &str,
    feed_url: &Url,
    window: &LookbackWindow,
) -> Result<Vec<FilingReference>, DigestError> {
    let refs = with_lenient_xml(body, |doc| {
        doc.root_element()
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "entry")
            .filter_map(|entry| {
                let title = child(entry, "title").and_then(node_text)?;
                let (form, rest) = split_title(&title);
                if form != "4" && form != "4/A" {
                    return None;
                }

                let href = child(entry, "link").and_then(|l| l.attribute("href"))?;
                let url = feed_url.join(href).ok()?;

                let updated = child(entry, "updated").and_then(node_text);
                let filed = updated.as_deref().and_then(parse_filing_date);
                if filed.is_some_and(|d| d < window.start) {
                    return None;
                }

                Some(FilingReference::IndexPage {
                    url: url.to_string(),
                    entity_name: rest,
                    filing_date: filed
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .or(updated),
                })
            })
            .collect::<Vec<_>>()
    })?;
    Ok(refs)
}

/// `4 - Doe Jane (0001234567) (Reporting)` -> (`4`, `Doe Jane`).
fn split_title(title: &str) -> (&str, Option<String>) {
    match title.split_once(" - ") {
        Some((form, rest)) => {
            let name = rest.split(" (").next().unwrap_or(rest).trim();
            (form.trim(), (!name.is_empty()).then(|| name.to_string()))
        }
        None => (title.trim(), None),
    }
}
