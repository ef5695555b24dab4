//! Signup, login and logout over HTTP.

#![allow(clippy::unwrap_used)]

use grocery_core::Username;
use grocery_integration_tests::{PASSWORD, TestServer, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_signup_then_login() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    let response = browser.signup("shopper", PASSWORD).await;
    assert_eq!(location(&response), "/login");

    let login_page = browser.page("/login").await;
    assert!(login_page.contains("Account Created."));

    let response = browser.login("shopper", PASSWORD).await;
    assert_eq!(location(&response), "/");

    let home = browser.page("/").await;
    assert!(home.contains("Logged in as shopper"));
}

#[tokio::test]
async fn test_duplicate_username_rerenders_signup() {
    let server = TestServer::spawn().await;
    server.logged_in("shopper").await;
    let other = server.browser();

    let response = other.signup("shopper", "another password").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("That username is taken."));

    // The original account is untouched.
    let response = other.login("shopper", "another password").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = other.login("shopper", PASSWORD).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_signup_validation_writes_nothing() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    let response = browser
        .post(
            "/signup",
            &[
                ("username", "shopper"),
                ("password", "long enough"),
                ("password_confirm", "different"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Passwords must match."));

    let stored = server
        .persistence
        .users()
        .get_by_username(&Username::parse("shopper").unwrap())
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_wrong_password_stays_anonymous() {
    let server = TestServer::spawn().await;
    server.logged_in("shopper").await;
    let browser = server.browser();

    let response = browser.login("shopper", "not the password").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Invalid username or password.")
    );

    let response = browser.login("nobody", PASSWORD).await;
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Invalid username or password.")
    );

    let response = browser.get("/shopping_list").await;
    assert!(location(&response).starts_with("/login"));
}

#[tokio::test]
async fn test_login_resumes_requested_page() {
    let server = TestServer::spawn().await;
    server.logged_in("shopper").await;
    let browser = server.browser();

    let response = browser.get("/shopping_list").await;
    let login_url = location(&response).to_string();
    assert_eq!(login_url, "/login?next=%2Fshopping_list");

    // The login page carries the target into the form.
    let page = browser.page(&login_url).await;
    assert!(page.contains(r#"name="next" value="/shopping_list""#));

    let response = browser
        .post(
            "/login",
            &[
                ("username", "shopper"),
                ("password", PASSWORD),
                ("next", "/shopping_list"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/shopping_list");

    let list = browser.get("/shopping_list").await;
    assert_eq!(list.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let server = TestServer::spawn().await;
    server.logged_in("shopper").await;
    let browser = server.browser();

    let response = browser
        .post(
            "/login?next=https://evil.example/",
            &[("username", "shopper"), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_ignores_next_with_whitespace() {
    let server = TestServer::spawn().await;
    server.logged_in("shopper").await;

    for next in [
        "/\t/evil.example/",
        "/\n/evil.example/",
        "/\r\nSet-Cookie: x=1",
    ] {
        let browser = server.browser();
        let response = browser
            .post(
                "/login",
                &[("username", "shopper"), ("password", PASSWORD), ("next", next)],
            )
            .await;
        assert_eq!(location(&response), "/", "next {next:?}");
    }
}

#[tokio::test]
async fn test_failed_relogin_keeps_current_nav() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    let response = browser.login("shopper", "not the password").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid username or password."));
    assert!(body.contains("Logged in as shopper"));
}

#[tokio::test]
async fn test_logout_clears_identity() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    let response = browser.get("/logout").await;
    assert_eq!(location(&response), "/");

    let home = browser.page("/").await;
    assert!(home.contains("You have been logged out."));
    assert!(!home.contains("Logged in as"));

    let response = browser.get("/new_store").await;
    assert_eq!(location(&response), "/login?next=%2Fnew_store");
}

#[tokio::test]
async fn test_protected_post_redirects_without_next() {
    let server = TestServer::spawn().await;
    let browser = server.browser();

    let response = browser
        .post("/new_store", &[("title", "Corner"), ("address", "Main St")])
        .await;
    assert_eq!(location(&response), "/login");
    assert!(server.persistence.stores().list_all().await.unwrap().is_empty());
}
