//! EDGAR daily master index strategy.
//!
//! `master.YYYYMMDD.idx` files are pipe-delimited:
//! `CIK|Company Name|Form Type|Date Filed|Filename`, preceded by a free-text
//! header that ends with a line of dashes.

use chrono::{Datelike, NaiveDate};
use url::Url;

use super::search::normalize_cik;
use super::{FilingSource, SourceFuture, SourceOutcome};
use crate::core::window::{parse_filing_date, quarter};
use crate::core::{
    DigestError, FilingClient, FilingReference, LookbackWindow, Resolved, SourceKind,
};

/// Form types that count as an insider ownership change (amendments included).
const FORM_TYPES: &[&str] = &["4", "4/A"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DailyIndexSource;

impl FilingSource for DailyIndexSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DailyIndex
    }

    fn resolve<'a>(
        &'a self,
        client: &'a FilingClient,
        window: &'a LookbackWindow,
    ) -> SourceFuture<'a> {
        Box::pin(fetch_window(client, window))
    }
}

async fn fetch_window(client: &FilingClient, window: &LookbackWindow) -> SourceOutcome {
    let mut out = Vec::new();
    let mut fetched_any = false;
    let mut last_err: Option<DigestError> = None;

    for day in window.days() {
        let url = match index_url(client.base_archives(), day) {
            Ok(u) => u,
            Err(e) => return SourceOutcome::Failed(e),
        };
        let key = day.format("%Y%m%d").to_string();
        match client.get_text(url, "daily_index", &key, "idx").await {
            Ok(body) => {
                fetched_any = true;
                let refs = parse_master_index(&body);
                tracing::debug!(day = %day, count = refs.len(), "parsed daily index");
                out.extend(refs.into_iter().map(Resolved::Reference));
            }
            // Weekends and holidays have no file.
            Err(DigestError::Status { status: 403 | 404, .. }) => {
                fetched_any = true;
                tracing::debug!(day = %day, "no daily index for this day; skipping");
            }
            Err(e) => {
                tracing::warn!(day = %day, error = %e, "daily index fetch failed");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if !fetched_any => SourceOutcome::Failed(e),
        _ => Ok::<_, DigestError>(out).into(),
    }
}

fn index_url(base: &Url, day: NaiveDate) -> Result<Url, DigestError> {
    Ok(base.join(&format!(
        "edgar/daily-index/{}/QTR{}/master.{}.idx",
        day.year(),
        quarter(day),
        day.format("%Y%m%d")
    ))?)
}

/// Extract Form 4 references from a master index body.
pub(crate) fn parse_master_index(body: &str) -> Vec<FilingReference> {
    // Without a separator line, treat every line as a candidate record.
    let records_start = body
        .lines()
        .position(|l| l.trim_start().starts_with("---"))
        .map_or(0, |i| i + 1);

    body.lines()
        .skip(records_start)
        .filter_map(parse_record)
        .collect()
}

fn parse_record(line: &str) -> Option<FilingReference> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let [cik, company, form, date, path] = fields.as_slice() else {
        return None;
    };
    if !FORM_TYPES.contains(form) || !cik.bytes().all(|b| b.is_ascii_digit()) || path.is_empty() {
        return None;
    }
    let filing_date = parse_filing_date(date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .or_else(|| Some((*date).to_string()).filter(|d| !d.is_empty()));

    Some(FilingReference::ArchivePath {
        path: (*path).to_string(),
        cik: normalize_cik(cik),
        entity_name: Some((*company).to_string()).filter(|c| !c.is_empty()),
        filing_date,
    })
}
