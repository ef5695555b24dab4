//! Health checks, headers and fallbacks.

#![allow(clippy::unwrap_used)]

use grocery_integration_tests::TestServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    let response = browser.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = browser.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let server = TestServer::spawn().await;
    let response = server.browser().get("/").await;

    let headers = response.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("content-security-policy").is_some());
    assert!(headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let server = TestServer::spawn().await;
    let response = server.browser().get("/no/such/page").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("Not Found"));
}

#[tokio::test]
async fn test_home_lists_stores_for_anonymous_visitors() {
    let server = TestServer::spawn().await;
    let owner = server.logged_in("shopper").await;
    owner.create_store("Corner Market", "12 Main St").await;

    let home = server.browser().page("/").await;
    assert!(home.contains("Corner Market"));
    assert!(home.contains("12 Main St"));
    assert!(home.contains(r#"href="/login""#));
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let server = TestServer::spawn().await;
    let response = server.browser().get("/static/main.css").await;
    assert_eq!(response.status(), StatusCode::OK);
}
