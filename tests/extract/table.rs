use crate::common;
use chrono::NaiveDate;
use insider_digest::extract::extract_from_body;
use insider_digest::{DocumentHandle, DocumentShape, aggregate, extract};

fn handle() -> DocumentHandle {
    DocumentHandle::new(
        "http://openinsider.com/latest-insider-purchases-25k",
        DocumentShape::HtmlTable,
    )
}

#[test]
fn rows_group_per_ticker_and_insider() {
    let html = common::fixture("aggregator", "latest", "html");
    let records = extract_from_body(&handle(), &html, 250_000.0);

    let tickers: Vec<_> = records.iter().map(|r| r.issuer.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["ACME", "BIG"]);

    let acme = &records[0];
    assert_eq!(acme.issuer.name, "Acme Holdings Inc.");
    assert_eq!(acme.insider.name, "Doe Jane");
    assert_eq!(acme.insider.role, "CEO, Dir");
    assert_eq!(acme.lines.len(), 2);
    assert_eq!(acme.total_shares, 1500.0);
    // Second row has no value cell: derived from qty * price.
    assert_eq!(acme.total_value, 455_000.0);
    assert_eq!(
        acme.provenance.source_url,
        "http://www.sec.gov/Archives/edgar/data/320193/000123456724000001/0001234567-24-000001-index.htm"
    );
    assert_eq!(acme.provenance.filing_date.as_deref(), Some("2024-01-05 16:59:27"));

    // No quantity cell: derived from value / price.
    let big = &records[1];
    assert_eq!(big.total_shares, 50_000.0);
    assert_eq!(big.total_value, 1_000_000.0);
    assert_eq!(big.avg_price, 20.0);
}

#[test]
fn threshold_applies_to_table_records() {
    let html = common::fixture("aggregator", "latest", "html");
    let all = extract_from_body(&handle(), &html, 0.0);
    let tickers: Vec<_> = all.iter().map(|r| r.issuer.ticker.as_str()).collect();
    // Sales and zero-quantity rows never make it, whatever the threshold.
    assert_eq!(tickers, vec!["ACME", "BIG", "LOW"]);
}

#[test]
fn table_without_ticker_column_yields_nothing() {
    let html = common::fixture("aggregator", "no_ticker", "html");
    assert!(extract_from_body(&handle(), &html, 0.0).is_empty());
}

#[test]
fn page_without_tables_yields_nothing() {
    assert!(extract_from_body(&handle(), "<html><body><p>maintenance</p></body></html>", 0.0).is_empty());
}

#[test]
fn reordered_columns_are_discovered() {
    let html = r#"<table>
        <tr><th>Value ($)</th><th>Symbol</th><th>Reporting Owner</th><th>Relationship</th><th>Share Price</th><th>Shares</th><th>Transaction Code</th></tr>
        <tr><td>$600,000</td><td>xyz</td><td>Roe, Richard</td><td>Director</td><td>$12.00</td><td>50,000</td><td>P</td></tr>
        <tr><td>$900,000</td><td>XYZ</td><td>Roe, Richard</td><td>Director</td><td>$15.00</td><td>60,000</td><td>A</td></tr>
    </table>"#;
    let records = extract_from_body(&handle(), html, 250_000.0);
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.issuer.ticker, "XYZ");
    // No company column and no source metadata: the ticker stands in.
    assert_eq!(r.issuer.name, "XYZ");
    assert_eq!(r.insider.role, "Director");
    assert_eq!(r.total_value, 600_000.0);
    assert_eq!(r.provenance.source_url, handle().url);
}

#[tokio::test]
async fn prefetched_body_is_not_refetched() {
    let server = common::setup_server();
    let page = common::mock_status(&server, "/latest-insider-purchases-25k", 500);
    let client = common::client(&server);

    let mut h = DocumentHandle::new(
        common::url(&server, "/latest-insider-purchases-25k").as_str(),
        DocumentShape::HtmlTable,
    );
    h.body = Some(common::fixture("aggregator", "latest", "html"));

    let records = extract(&client, &h, 250_000.0).await.unwrap();
    page.assert_hits(0);
    assert_eq!(records.len(), 2);
}

#[test]
fn rows_filed_before_the_window_are_dropped_one_by_one() {
    let html = common::fixture("aggregator", "mixed", "html");
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut h = handle();
    h.not_before = Some(start);

    let records = aggregate(extract_from_body(&h, &html, 250_000.0), Some(start));

    // ACME's stale $1M row no longer lifts its fresh $10k buy over the threshold,
    // and BBB's fresh buy survives its stale first row.
    assert_eq!(records.len(), 1);
    let bbb = &records[0];
    assert_eq!(bbb.issuer.ticker, "BBB");
    assert_eq!(bbb.lines.len(), 1);
    assert_eq!(bbb.total_value, 500_000.0);
    assert_eq!(bbb.provenance.filing_date.as_deref(), Some("2024-01-05 09:15:00"));
    assert!(bbb.provenance.source_url.ends_with("0000008888-24-000001-index.htm"));
}

#[test]
fn without_a_window_every_row_is_grouped() {
    let html = common::fixture("aggregator", "mixed", "html");
    let records = extract_from_body(&handle(), &html, 0.0);
    let totals: Vec<_> = records
        .iter()
        .map(|r| (r.issuer.ticker.as_str(), r.total_value))
        .collect();
    assert_eq!(totals, vec![("ACME", 1_010_000.0), ("BBB", 1_500_000.0)]);
}
