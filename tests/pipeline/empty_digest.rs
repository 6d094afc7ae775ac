use crate::common;
use crate::recording::RecordingReporter;
use insider_digest::{Pipeline, SourceKind, deliver_empty};

#[tokio::test]
async fn exhausted_sources_still_deliver_an_empty_digest() {
    let server = common::setup_server();
    let client = common::client(&server);
    let reporter = RecordingReporter::new();

    let summary = Pipeline::new(common::config(), client)
        .with_today(common::today())
        .run(&reporter)
        .await
        .unwrap();

    assert_eq!(summary.source, None);
    assert_eq!(summary.documents, 0);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.label, "January 05, 2024");

    {
        let rendered = reporter.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].is_empty());
    }
    let (content, label) = reporter.last_delivery();
    assert_eq!(label, "January 05, 2024");
    assert!(content.contains("No sizeable open-market insider purchases"));
    assert!(content.contains("last 3 days"));
    assert!(content.contains("$250,000"));
}

#[tokio::test]
async fn resolved_filings_without_purchases_deliver_an_empty_digest() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/LATEST/search-index");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "page1", "json"));
    });
    let client = common::client(&server);
    let reporter = RecordingReporter::new();

    let mut config = common::config();
    config.sources = vec![SourceKind::SearchApi];
    let summary = Pipeline::new(config, client)
        .with_today(common::today())
        .run(&reporter)
        .await
        .unwrap();

    // The one hit's index page 404s, so nothing is extracted.
    assert_eq!(summary.source, Some(SourceKind::SearchApi));
    assert_eq!(summary.documents, 0);
    assert!(reporter.last_delivery().0.contains("No sizeable open-market insider purchases"));
}

#[tokio::test]
async fn delivery_failure_surfaces_after_rendering() {
    let server = common::setup_server();
    let client = common::client(&server);
    let reporter = RecordingReporter::failing();

    let err = Pipeline::new(common::config(), client)
        .with_today(common::today())
        .run(&reporter)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("relay refused"));
    assert_eq!(reporter.delivered.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_digest_without_a_client() {
    let reporter = RecordingReporter::new();

    let summary = deliver_empty(&reporter, common::today()).await.unwrap();

    assert_eq!(summary.source, None);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.label, "January 05, 2024");
    let (content, label) = reporter.last_delivery();
    assert_eq!(label, "January 05, 2024");
    assert!(content.contains("No sizeable open-market insider purchases"));
}
