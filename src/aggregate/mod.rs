//! Cross-document merge: temporal re-filter, dedup, ranking.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::core::PurchaseRecord;
use crate::core::window::parse_filing_date;

/// Final ordered record set.
///
/// 1. With `cutoff`, records whose filing date parses to a day before it are
///    dropped; records without a usable date are kept.
/// 2. The first record per identity key wins; later duplicates are dropped whole.
/// 3. Stable sort by total value, largest first.
pub fn aggregate(records: Vec<PurchaseRecord>, cutoff: Option<NaiveDate>) -> Vec<PurchaseRecord> {
    let mut seen = HashSet::new();
    let mut out: Vec<PurchaseRecord> = records
        .into_iter()
        .filter(|r| match cutoff {
            Some(c) => !is_before(r, c),
            None => true,
        })
        .filter(|r| seen.insert(r.identity_key()))
        .collect();

    out.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    out
}

fn is_before(record: &PurchaseRecord, cutoff: NaiveDate) -> bool {
    let date = record.provenance.filing_date.as_deref().and_then(parse_filing_date);
    if date.is_none() && record.provenance.filing_date.is_some() {
        tracing::debug!(
            ticker = %record.issuer.ticker,
            raw = ?record.provenance.filing_date,
            "unparsable filing date; kept"
        );
    }
    date.is_some_and(|d| d < cutoff)
}
