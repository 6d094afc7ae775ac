use crate::common;
use insider_digest::extract::extract_from_body;
use insider_digest::{DocumentHandle, DocumentShape, extract};

const THRESHOLD: f64 = 250_000.0;

fn handle() -> DocumentHandle {
    let mut h = DocumentHandle::new(
        "https://www.sec.gov/Archives/edgar/data/320193/000123456724000001/wk-form4_1704492000.xml",
        DocumentShape::Form4Xml,
    );
    h.index_url = Some(
        "https://www.sec.gov/Archives/edgar/data/320193/000123456724000001/0001234567-24-000001-index.htm"
            .into(),
    );
    h.filing_date = Some("2024-01-05".into());
    h
}

#[test]
fn single_purchase_above_threshold() {
    let records = extract_from_body(&handle(), &common::fixture("form4", "acme", "xml"), THRESHOLD);
    assert_eq!(records.len(), 1);

    let r = &records[0];
    assert_eq!(r.issuer.ticker, "ACME");
    assert_eq!(r.issuer.name, "Acme Holdings Inc.");
    assert_eq!(r.issuer.cik.as_deref(), Some("0000320193"));
    assert_eq!(r.insider.name, "Doe Jane");
    assert_eq!(r.insider.role, "Chief Executive Officer, Director");
    assert_eq!(r.lines.len(), 1);
    assert_eq!(r.lines[0].trade_date.as_deref(), Some("2024-01-03"));
    assert_eq!(r.total_shares, 1000.0);
    assert_eq!(r.total_value, 300_000.0);
    assert_eq!(r.avg_price, 300.0);
    assert_eq!(r.provenance.filing_date.as_deref(), Some("2024-01-05"));
    assert!(r.provenance.index_url.as_deref().is_some_and(|u| u.ends_with("-index.htm")));
}

#[test]
fn purchase_below_threshold_is_dropped() {
    let records = extract_from_body(&handle(), &common::fixture("form4", "small", "xml"), THRESHOLD);
    assert!(records.is_empty());
}

#[test]
fn sales_never_qualify() {
    let records = extract_from_body(&handle(), &common::fixture("form4", "sale", "xml"), 0.0);
    assert!(records.is_empty());
}

#[test]
fn mixed_lines_and_broken_namespaces() {
    let records = extract_from_body(&handle(), &common::fixture("form4", "multi", "xml"), THRESHOLD);
    assert_eq!(records.len(), 1);

    let r = &records[0];
    assert_eq!(r.issuer.ticker, "N/A");
    assert_eq!(r.insider.name, "North Capital LP");
    assert_eq!(r.insider.role, "10%+ Owner");
    // Two purchases survive: the option exercise, the disposal and the unparsable line do not.
    assert_eq!(r.lines.len(), 2);
    assert_eq!(r.total_shares, 2000.0);
    assert_eq!(r.total_value, 325_000.0);
    assert!((r.avg_price - 162.5).abs() < 1e-9);
}

#[test]
fn garbage_yields_nothing() {
    assert!(extract_from_body(&handle(), "<html><body>404</body></html>", 0.0).is_empty());
    assert!(extract_from_body(&handle(), "not xml at all <<<", 0.0).is_empty());
    assert!(
        extract_from_body(&handle(), "<ownershipDocument><issuer/></ownershipDocument>", 0.0)
            .is_empty()
    );
}

#[tokio::test]
async fn fetches_when_body_is_not_prefetched() {
    let server = common::setup_server();
    let doc = common::mock_form4(&server, "acme");
    let client = common::client(&server);

    let h = DocumentHandle::new(
        common::url(
            &server,
            "/Archives/edgar/data/320193/000123456724000001/wk-form4_1704492000.xml",
        )
        .as_str(),
        DocumentShape::Form4Xml,
    );
    let records = extract(&client, &h, THRESHOLD).await.unwrap();

    doc.assert();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].provenance.source_url, h.url);
}

#[tokio::test]
async fn fetch_failure_is_an_error() {
    let server = common::setup_server();
    let client = common::client(&server);
    let h = DocumentHandle::new(
        common::url(&server, "/Archives/missing.xml").as_str(),
        DocumentShape::Form4Xml,
    );
    let err = extract(&client, &h, THRESHOLD).await.unwrap_err();
    assert!(err.is_not_found());
}
