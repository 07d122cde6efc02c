//! Search against a local server standing in for the Atlas

use gxa_fetcher::app::{AtlasClient, AtlasEndpoints, ClientConfig};
use gxa_fetcher::errors::{ParseError, SearchError, TransportError};
use mockito::{Matcher, Server, ServerGuard};

const SEARCH_PATH: &str = "/arrayexpress/json/v3/experiments";

fn client_for(server: &ServerGuard) -> AtlasClient {
    let config = ClientConfig {
        rate_limit_rps: 50,
        ..Default::default()
    };
    let endpoints = AtlasEndpoints::with_root(&server.url()).unwrap();
    AtlasClient::with_config(&config, endpoints).unwrap()
}

#[tokio::test]
async fn test_search_returns_accessions_in_service_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("gxa".into(), "true".into()),
            Matcher::UrlEncoded("keywords".into(), "diabetes".into()),
            Matcher::UrlEncoded("species".into(), "homo sapiens".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(include_str!("fixtures/search_diabetes.json"))
        .create_async()
        .await;

    let client = client_for(&server);
    let accessions = client
        .search_atlas_experiments(&["diabetes"], Some("homo sapiens"))
        .await
        .unwrap();

    let ids: Vec<&str> = accessions.iter().map(|a| a.as_str()).collect();
    assert_eq!(ids, vec!["E-GEOD-25462", "E-GEOD-10315"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_combines_terms_with_or() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("keywords".into(), "diabetes OR obesity".into()),
            Matcher::UrlEncoded("species".into(), "mus musculus".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"experiments": {"total": 0}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let accessions = client
        .search_atlas_experiments(&["diabetes", "obesity"], Some("mus musculus"))
        .await
        .unwrap();

    assert!(accessions.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_reports_server_errors() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .search_atlas_experiments(&["diabetes"], None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SearchError::Transport(TransportError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_search_rejects_malformed_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .search_atlas_experiments(&["diabetes"], None)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Parse(ParseError::Json(_))));
}

#[tokio::test]
async fn test_blank_terms_make_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let terms: [&str; 2] = ["", "  "];
    let err = client
        .search_atlas_experiments(&terms, None)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::EmptyTerms));
    mock.assert_async().await;
}
