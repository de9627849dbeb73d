//! SerperSearch wire-format tests against a mock HTTP server.

use deepsprint::SerperSearch;
use deepsprint::search::SearchProvider;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> SerperSearch {
    SerperSearch::new("test-key".to_string(), format!("{}/search", server.uri()))
}

#[tokio::test]
async fn extracts_organic_links_and_skips_linkless_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [
                { "link": "https://a.example", "title": "A", "position": 1 },
                { "title": "no link at all" },
                { "link": "", "title": "blank link" },
                { "link": "https://b.example", "title": "B", "position": 2 },
            ]
        })))
        .mount(&server)
        .await;

    let urls = provider(&server).search("acme funding", 10).await.unwrap();
    assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
}

#[tokio::test]
async fn an_empty_organic_array_is_no_results_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": [] })))
        .mount(&server)
        .await;

    let urls = provider(&server).search("obscure query", 10).await.unwrap();
    assert!(urls.is_empty());
}

#[tokio::test]
async fn a_response_without_organic_results_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "credits": 1 })))
        .mount(&server)
        .await;

    let urls = provider(&server).search("anything", 10).await.unwrap();
    assert!(urls.is_empty());
}

#[tokio::test]
async fn a_non_json_response_is_a_search_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = provider(&server).search("anything", 10).await;
    assert!(result.is_err());
}
