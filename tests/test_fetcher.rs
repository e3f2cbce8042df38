//! Integration tests for sequential candidate fetching
//!
//! Uses a wiremock origin to verify ordering, short-circuiting and
//! exhaustion diagnostics.

use acadmix_pdf_proxy::DocumentFetcher;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> DocumentFetcher {
    DocumentFetcher::new("test-agent", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_first_candidate_success_stops_iteration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/upload/folder/doc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    // Later candidates must never be contacted
    Mock::given(method("GET"))
        .and(path("/raw/upload/folder/doc.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let candidates = vec![
        format!("{}/raw/upload/folder/doc", server.uri()),
        format!("{}/raw/upload/folder/doc.pdf", server.uri()),
    ];

    let document = fetcher().fetch_first(&candidates).await.unwrap();
    assert_eq!(document.attempt, 1);
    assert_eq!(document.url, candidates[0]);
    assert_eq!(document.content_type.as_deref(), Some("application/pdf"));
}

#[tokio::test]
async fn test_falls_back_to_later_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/upload/folder/doc"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/upload/folder/doc.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/upload/v1/folder/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = vec![
        format!("{}/raw/upload/folder/doc", server.uri()),
        format!("{}/raw/upload/folder/doc.pdf", server.uri()),
        format!("{}/raw/upload/v1/folder/doc.pdf", server.uri()),
    ];

    let document = fetcher().fetch_first(&candidates).await.unwrap();
    assert_eq!(document.attempt, 3);
    assert_eq!(document.url, candidates[2]);
}

#[tokio::test]
async fn test_exhaustion_records_every_attempt_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/upload/folder/doc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/upload/folder/doc.pdf"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let candidates = vec![
        format!("{}/raw/upload/folder/doc", server.uri()),
        format!("{}/raw/upload/folder/doc.pdf", server.uri()),
    ];

    let exhausted = fetcher().fetch_first(&candidates).await.err().unwrap();
    assert_eq!(exhausted.attempts.len(), 2);
    assert_eq!(exhausted.attempts[0].url, candidates[0]);
    assert_eq!(exhausted.attempts[0].status, Some(404));
    assert_eq!(exhausted.attempts[1].url, candidates[1]);
    assert_eq!(exhausted.attempts[1].status, Some(401));
}

#[tokio::test]
async fn test_network_error_recorded_and_iteration_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = vec![
        // Unreachable TEST-NET-1 address fails at the network level
        "http://192.0.2.1:9/doc".to_string(),
        format!("{}/doc.pdf", server.uri()),
    ];

    let fetcher = DocumentFetcher::new("test-agent", Duration::from_secs(1)).unwrap();
    let document = fetcher.fetch_first(&candidates).await.unwrap();
    assert_eq!(document.attempt, 2);
}

#[tokio::test]
async fn test_user_agent_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(header("User-Agent", "test-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = vec![format!("{}/doc", server.uri())];
    let document = fetcher().fetch_first(&candidates).await.unwrap();
    assert_eq!(document.attempt, 1);
}

#[tokio::test]
async fn test_content_length_extracted() {
    let server = MockServer::start().await;
    let body = vec![0u8; 4096];

    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/pdf"))
        .mount(&server)
        .await;

    let candidates = vec![format!("{}/doc", server.uri())];
    let document = fetcher().fetch_first(&candidates).await.unwrap();
    assert_eq!(document.content_length, Some(4096));
}
