use crate::common;
use httpmock::Method::GET;
use insider_digest::sources::SearchApiSource;
use insider_digest::{FilingReference, FilingSource, LookbackWindow, Resolved, SourceOutcome};

fn window() -> LookbackWindow {
    LookbackWindow::trailing(3, common::today())
}

#[tokio::test]
async fn pages_until_reported_total() {
    let server = common::setup_server();
    let page0 = server.mock(|when, then| {
        when.method(GET)
            .path("/LATEST/search-index")
            .query_param("forms", "4")
            .query_param("startdt", "2024-01-02")
            .query_param("enddt", "2024-01-05")
            .query_param("from", "0")
            .query_param("size", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "page0", "json"));
    });
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/LATEST/search-index")
            .query_param("from", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "page1", "json"));
    });

    let client = common::client(&server);
    let source = SearchApiSource::with_paging(2, 500);
    let outcome = source.resolve(&client, &window()).await;

    page0.assert();
    page1.assert();
    let SourceOutcome::Found(items) = outcome else {
        panic!("expected Found, got {outcome:?}");
    };
    assert_eq!(items.len(), 3);
    match &items[0] {
        Resolved::Reference(FilingReference::Accession {
            accession,
            cik,
            filing_date,
            ..
        }) => {
            assert_eq!(accession.dashed(), "0001234567-24-000001");
            assert_eq!(cik, "1234567");
            assert_eq!(filing_date.as_deref(), Some("2024-01-05"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn offset_cap_stops_paging() {
    let server = common::setup_server();
    let page0 = server.mock(|when, then| {
        when.method(GET)
            .path("/LATEST/search-index")
            .query_param("from", "0");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "page0", "json"));
    });
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/LATEST/search-index")
            .query_param("from", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "page1", "json"));
    });

    let client = common::client(&server);
    let source = SearchApiSource::with_paging(2, 2);
    let outcome = source.resolve(&client, &window()).await;

    page0.assert();
    page1.assert_hits(0);
    assert!(matches!(outcome, SourceOutcome::Found(ref v) if v.len() == 2));
}

#[tokio::test]
async fn empty_hits_are_empty() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/LATEST/search-index");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "empty", "json"));
    });

    let client = common::client(&server);
    let outcome = SearchApiSource::default().resolve(&client, &window()).await;

    mock.assert();
    assert!(matches!(outcome, SourceOutcome::Empty));
}

#[tokio::test]
async fn first_page_error_fails_the_source() {
    let server = common::setup_server();
    let mock = common::mock_status(&server, "/LATEST/search-index", 500);

    let client = common::client(&server);
    let outcome = SearchApiSource::default().resolve(&client, &window()).await;

    mock.assert();
    match outcome {
        SourceOutcome::Failed(e) => assert!(e.to_string().contains("500")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn later_page_error_keeps_earlier_pages() {
    let server = common::setup_server();
    server.mock(|when, then| {
        when.method(GET)
            .path("/LATEST/search-index")
            .query_param("from", "0");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("search", "page0", "json"));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/LATEST/search-index")
            .query_param("from", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body("{not json");
    });

    let client = common::client(&server);
    let outcome = SearchApiSource::with_paging(2, 500).resolve(&client, &window()).await;
    assert!(matches!(outcome, SourceOutcome::Found(ref v) if v.len() == 2));
}
