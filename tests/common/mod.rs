#![allow(dead_code)]

use std::time::Duration;
use std::{fs, path::Path};

use chrono::NaiveDate;
use httpmock::{Method::GET, Mock, MockServer};
use insider_digest::{Config, FilingClient};
use url::Url;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture(endpoint: &str, key: &str, ext: &str) -> String {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let filename = format!("{}_{}.{}", endpoint, key, ext);
    let path = dir.join(&filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

pub fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{}", server.base_url(), path)).unwrap()
}

/// Client pointed entirely at the mock server, with no request pacing.
pub fn client(server: &MockServer) -> FilingClient {
    FilingClient::builder()
        .base_search(url(server, "/LATEST/search-index"))
        .base_archives(url(server, "/Archives/"))
        .base_feed(url(server, "/cgi-bin/browse-edgar"))
        .aggregator_pages(vec![
            url(server, "/latest-insider-purchases-25k"),
            url(server, "/insider-purchases"),
        ])
        .request_delay(Duration::ZERO)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub fn config() -> Config {
    Config {
        smtp_password: "app-password".into(),
        request_delay: Duration::ZERO,
        ..Config::default()
    }
}

/// Friday 2024-01-05; a three-day lookback starts on Tuesday 2024-01-02.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
}

pub fn mock_filing_index<'a>(server: &'a MockServer, cik: &str, accession: &str) -> Mock<'a> {
    let undashed = accession.replace('-', "");
    server.mock(|when, then| {
        when.method(GET).path(format!(
            "/Archives/edgar/data/{cik}/{undashed}/{accession}-index.htm"
        ));
        then.status(200)
            .header("content-type", "text/html")
            .body(fixture("filing_index", "acme", "htm"));
    })
}

pub fn mock_form4<'a>(server: &'a MockServer, key: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/Archives/edgar/data/320193/000123456724000001/wk-form4_1704492000.xml");
        then.status(200)
            .header("content-type", "application/xml")
            .body(fixture("form4", key, "xml"));
    })
}

pub fn mock_status<'a>(server: &'a MockServer, path: &str, status: u16) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path(path.to_string());
        then.status(status);
    })
}
