use crate::common;
use httpmock::Method::GET;
use insider_digest::{LookbackWindow, Resolved, Resolver, SourceKind};

fn window() -> LookbackWindow {
    LookbackWindow::trailing(3, common::today())
}

#[tokio::test]
async fn falls_back_past_failed_and_empty_sources() {
    let server = common::setup_server();
    let search = common::mock_status(&server, "/LATEST/search-index", 502);
    let feed = server.mock(|when, then| {
        when.method(GET)
            .path("/cgi-bin/browse-edgar")
            .query_param("action", "getcurrent")
            .query_param("type", "4")
            .query_param("output", "atom");
        then.status(200)
            .header("content-type", "application/atom+xml")
            .body(common::fixture("current_feed", "form4", "xml"));
    });
    let aggregator = common::mock_status(&server, "/latest-insider-purchases-25k", 200);

    let client = common::client(&server);
    let resolution = Resolver::from_kinds(&SourceKind::DEFAULT_ORDER)
        .resolve(&client, &window())
        .await;

    search.assert();
    feed.assert();
    aggregator.assert_hits(0);

    assert_eq!(resolution.source, Some(SourceKind::CurrentFeed));
    assert!(resolution.enforces_window);
    assert_eq!(resolution.items.len(), 2);
    assert!(
        resolution
            .items
            .iter()
            .all(|i| matches!(i, Resolved::Reference(_)))
    );
}

#[tokio::test]
async fn configured_order_is_respected() {
    let server = common::setup_server();
    let search = common::mock_status(&server, "/LATEST/search-index", 200);
    let aggregator = server.mock(|when, then| {
        when.method(GET).path("/latest-insider-purchases-25k");
        then.status(200)
            .header("content-type", "text/html")
            .body(common::fixture("aggregator", "latest", "html"));
    });

    let client = common::client(&server);
    let resolution = Resolver::from_kinds(&[SourceKind::Aggregator, SourceKind::SearchApi])
        .resolve(&client, &window())
        .await;

    aggregator.assert();
    search.assert_hits(0);
    assert_eq!(resolution.source, Some(SourceKind::Aggregator));
    assert!(!resolution.enforces_window);
}

#[tokio::test]
async fn exhausted_chain_is_an_empty_resolution() {
    let server = common::setup_server();
    let client = common::client(&server);

    let resolution = Resolver::from_kinds(&SourceKind::DEFAULT_ORDER)
        .resolve(&client, &window())
        .await;

    assert_eq!(resolution.source, None);
    assert!(resolution.items.is_empty());
    assert!(resolution.enforces_window);
}
