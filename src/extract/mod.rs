//! Document extraction: turn a fetched document into purchase records.
//!
//! Two shapes are supported and share one output type:
//! - `form4`: EDGAR ownership XML, one record per filing
//! - `table`: aggregator HTML listings, one record per (ticker, insider) group
//!
//! The purchase-value threshold is applied here, after extraction, so both
//! paths filter identically.

mod form4;
mod table;
pub(crate) mod utils;

pub use form4::Form4Extractor;
pub use table::HtmlTableExtractor;
pub use utils::escape_html;

pub(crate) use table::has_purchase_table;

use url::Url;

use crate::core::{DigestError, DocumentHandle, DocumentShape, FilingClient, PurchaseRecord};

/// Parser for one document shape.
///
/// Parsing never fails: a malformed document yields no records.
pub trait DocumentExtractor: Send + Sync {
    fn shape(&self) -> DocumentShape;

    /// Every purchase record in `body`, before threshold filtering.
    fn parse(&self, body: &str, handle: &DocumentHandle) -> Vec<PurchaseRecord>;
}

static FORM4: Form4Extractor = Form4Extractor;
static TABLE: HtmlTableExtractor = HtmlTableExtractor;

/// Extractor registered for `shape`.
pub fn extractor_for(shape: DocumentShape) -> &'static dyn DocumentExtractor {
    match shape {
        DocumentShape::Form4Xml => &FORM4,
        DocumentShape::HtmlTable => &TABLE,
    }
}

/// Parse an already-fetched body and keep records worth at least `threshold`.
pub fn extract_from_body(
    handle: &DocumentHandle,
    body: &str,
    threshold: f64,
) -> Vec<PurchaseRecord> {
    let mut records = extractor_for(handle.shape).parse(body, handle);
    let before = records.len();
    records.retain(|r| r.meets_threshold(threshold));
    if before != records.len() {
        tracing::debug!(
            url = %handle.url,
            dropped = before - records.len(),
            threshold,
            "records below threshold dropped"
        );
    }
    records
}

/// Fetch (unless the handle already carries its body) and extract.
///
/// # Errors
///
/// Only transport failures surface; parse problems yield an empty vec.
pub async fn extract(
    client: &FilingClient,
    handle: &DocumentHandle,
    threshold: f64,
) -> Result<Vec<PurchaseRecord>, DigestError> {
    if let Some(body) = handle.body.as_deref() {
        return Ok(extract_from_body(handle, body, threshold));
    }

    let url = Url::parse(&handle.url)?;
    let (endpoint, ext) = match handle.shape {
        DocumentShape::Form4Xml => ("form4", "xml"),
        DocumentShape::HtmlTable => ("aggregator", "html"),
    };
    let key = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or("document")
        .to_string();
    let body = client.get_text(url, endpoint, &key, ext).await?;
    Ok(extract_from_body(handle, &body, threshold))
}
