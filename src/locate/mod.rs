//! Document location: filing reference -> filing index page -> Form 4 XML URL.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::core::{
    Accession, DigestError, DocumentHandle, DocumentShape, FilingClient, FilingReference,
};

static XML_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*"([^"]+\.xml)""#).expect("href regex"));

/// Filing index page URL for a reference.
///
/// # Errors
///
/// Returns `DigestError::Data` when an archive path does not end in an
/// accession-number filename, or `DigestError::Url` for unparsable URLs.
pub fn index_url_for(
    client: &FilingClient,
    reference: &FilingReference,
) -> Result<Url, DigestError> {
    match reference {
        FilingReference::Accession { accession, cik, .. } => {
            archive_index_url(client.base_archives(), cik, accession)
        }
        FilingReference::ArchivePath { path, cik, .. } => {
            let (path_cik, accession) = split_archive_path(path)?;
            let cik = if cik.is_empty() { path_cik } else { cik.clone() };
            archive_index_url(client.base_archives(), &cik, &accession)
        }
        FilingReference::IndexPage { url, .. } => Ok(Url::parse(url)?),
    }
}

fn archive_index_url(base: &Url, cik: &str, accession: &Accession) -> Result<Url, DigestError> {
    let cik = cik.trim_start_matches('0');
    if cik.is_empty() {
        return Err(DigestError::Data(format!("no filer CIK for {accession}")));
    }
    Ok(base.join(&format!(
        "edgar/data/{cik}/{}/{}-index.htm",
        accession.undashed(),
        accession.dashed()
    ))?)
}

/// `edgar/data/1000045/0001000045-24-000002.txt` -> (`1000045`, accession).
fn split_archive_path(path: &str) -> Result<(String, Accession), DigestError> {
    let mut segments = path.trim_matches('/').rsplit('/');
    let file = segments.next().unwrap_or_default();
    let stem = file.split('.').next().unwrap_or(file);
    let accession = Accession::parse(stem)?;
    let cik = segments
        .next()
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .map(|s| s.trim_start_matches('0').to_string())
        .unwrap_or_default();
    Ok((cik, accession))
}

/// XBRL render files (`R1.xml`, `r_2.xml`), filing summaries and styled copies
/// under `xsl*` directories are never the ownership document.
fn is_candidate(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let mut segments = path.rsplit('/');
    let base = segments.next().unwrap_or_default();
    let lc = base.to_ascii_lowercase();

    let render_file = lc.starts_with("r_")
        || (lc.starts_with('r') && lc[1..].starts_with(|c: char| c.is_ascii_digit()));
    let summary = lc.starts_with("filingsummary");
    let styled = segments.any(|s| s.to_ascii_lowercase().starts_with("xsl"));

    !(render_file || summary || styled)
}

/// First eligible `.xml` link on an index page, in document order.
pub(crate) fn pick_document_link(index_html: &str) -> Option<&str> {
    XML_HREF
        .captures_iter(index_html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .find(|href| is_candidate(href))
}

/// Find the Form 4 XML document behind a reference.
///
/// `Ok(None)` means "skip this filing": the index page is gone (404) or lists
/// no eligible XML document.
///
/// # Errors
///
/// Transport failures and non-404 statuses.
pub async fn locate(
    client: &FilingClient,
    reference: &FilingReference,
) -> Result<Option<DocumentHandle>, DigestError> {
    let index_url = index_url_for(client, reference)?;

    let key = index_url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or("index")
        .to_string();
    let html = match client.get_text(index_url.clone(), "filing_index", &key, "htm").await {
        Ok(body) => body,
        Err(e) if e.is_not_found() => {
            tracing::debug!(url = %index_url, "filing index not found; skipped");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let Some(href) = pick_document_link(&html) else {
        tracing::debug!(url = %index_url, "no ownership XML on filing index; skipped");
        return Ok(None);
    };
    let doc_url = index_url.join(href)?;

    let mut handle = DocumentHandle::new(doc_url.as_str(), DocumentShape::Form4Xml);
    handle.index_url = Some(index_url.to_string());
    handle.entity_name = reference.entity_name().map(str::to_string);
    handle.filing_date = reference.filing_date().map(str::to_string);
    Ok(Some(handle))
}
