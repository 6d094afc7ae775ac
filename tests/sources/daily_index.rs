use crate::common;
use httpmock::Method::GET;
use insider_digest::sources::DailyIndexSource;
use insider_digest::{FilingReference, FilingSource, LookbackWindow, Resolved, SourceOutcome};

fn window() -> LookbackWindow {
    LookbackWindow::trailing(3, common::today())
}

#[tokio::test]
async fn missing_days_are_skipped() {
    let server = common::setup_server();
    let friday = server.mock(|when, then| {
        when.method(GET)
            .path("/Archives/edgar/daily-index/2024/QTR1/master.20240105.idx");
        then.status(200)
            .header("content-type", "text/plain")
            .body(common::fixture("daily_index", "20240105", "idx"));
    });
    // Tuesday explicitly 404s; Wednesday and Thursday fall through to the server default.
    let tuesday = common::mock_status(
        &server,
        "/Archives/edgar/daily-index/2024/QTR1/master.20240102.idx",
        404,
    );

    let client = common::client(&server);
    let outcome = DailyIndexSource.resolve(&client, &window()).await;

    friday.assert();
    tuesday.assert();
    let SourceOutcome::Found(items) = outcome else {
        panic!("expected Found, got {outcome:?}");
    };
    assert_eq!(items.len(), 2);
    match &items[0] {
        Resolved::Reference(FilingReference::ArchivePath {
            path,
            cik,
            entity_name,
            filing_date,
        }) => {
            assert_eq!(path, "edgar/data/320193/0001234567-24-000001.txt");
            assert_eq!(cik, "320193");
            assert_eq!(entity_name.as_deref(), Some("ACME HOLDINGS INC."));
            assert_eq!(filing_date.as_deref(), Some("2024-01-05"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn no_files_at_all_is_empty() {
    let server = common::setup_server();
    let client = common::client(&server);
    let outcome = DailyIndexSource.resolve(&client, &window()).await;
    assert!(matches!(outcome, SourceOutcome::Empty));
}

#[tokio::test]
async fn every_day_erroring_fails_the_source() {
    let server = common::setup_server();
    let mocks: Vec<_> = window()
        .days()
        .map(|day| {
            let path = format!(
                "/Archives/edgar/daily-index/2024/QTR1/master.{}.idx",
                day.format("%Y%m%d")
            );
            common::mock_status(&server, &path, 503)
        })
        .collect();

    let client = common::client(&server);
    let outcome = DailyIndexSource.resolve(&client, &window()).await;

    assert_eq!(mocks.len(), 4);
    mocks.iter().for_each(|m| m.assert());
    assert!(matches!(outcome, SourceOutcome::Failed(_)));
}
