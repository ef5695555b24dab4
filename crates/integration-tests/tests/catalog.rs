//! Store and item pages over HTTP.

#![allow(clippy::unwrap_used)]

use grocery_core::{ItemId, Price, StoreId};
use grocery_integration_tests::{TestServer, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_create_store_then_view() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    let store_id = browser.create_store("Corner Market", "12 Main St").await;

    let detail = browser.page(&format!("/store/{store_id}")).await;
    assert!(detail.contains("New grocery store was created successfully."));
    assert!(detail.contains("Corner Market"));
    assert!(detail.contains("Created by shopper"));

    let home = browser.page("/").await;
    assert!(home.contains(&format!(r#"href="/store/{store_id}""#)));
}

#[tokio::test]
async fn test_invalid_store_rerenders_form() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    let response = browser
        .post("/new_store", &[("title", "Corner Market"), ("address", "  ")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("This field is required."));
    assert!(body.contains(r#"value="Corner Market""#));
    assert!(server.persistence.stores().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_store_title_keeps_address() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;
    let store_id = browser.create_store("Corner Market", "12 Main St").await;

    let path = format!("/store/{store_id}");
    let response = browser
        .post(&path, &[("title", "Corner Grocer"), ("address", "12 Main St")])
        .await;
    assert_eq!(location(&response), path);

    let store = server
        .persistence
        .stores()
        .get_by_id(StoreId::new(store_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.title, "Corner Grocer");
    assert_eq!(store.address, "12 Main St");

    let detail = browser.page(&path).await;
    assert!(detail.contains("The grocery store was updated successfully."));
}

#[tokio::test]
async fn test_create_item_round_trip() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;
    let store_id = browser.create_store("Corner Market", "12 Main St").await;
    let store = store_id.to_string();

    let response = browser
        .post(
            "/new_item",
            &[
                ("name", "Milk"),
                ("price", "3.50"),
                ("category", ""),
                ("photo_url", "https://example.com/milk.jpg"),
                ("store", &store),
            ],
        )
        .await;
    let item_path = location(&response).to_string();

    let detail = browser.page(&item_path).await;
    assert!(detail.contains("New grocery item was created successfully."));
    assert!(detail.contains("$3.50"));
    assert!(detail.contains("Add to Shopping List"));

    let item_id: i32 = item_path.trim_start_matches("/item/").parse().unwrap();
    let item = server
        .persistence
        .items()
        .get_by_id(ItemId::new(item_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.name, "Milk");
    assert_eq!(item.price, Price::from_cents(350));
    assert_eq!(item.category.as_str(), "Other");
    assert_eq!(item.photo_url, "https://example.com/milk.jpg");
    assert_eq!(item.store_id, StoreId::new(store_id));
}

#[tokio::test]
async fn test_invalid_item_lists_every_error() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;
    browser.create_store("Corner Market", "12 Main St").await;

    let response = browser
        .post(
            "/new_item",
            &[
                ("name", ""),
                ("price", "cheap"),
                ("category", "Dairy"),
                ("photo_url", "not a url"),
                ("store", "999"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("This field is required."));
    assert!(body.contains("Not a valid price."));
    assert!(body.contains("Not a valid choice."));
    assert!(body.contains("Invalid URL."));
}

#[tokio::test]
async fn test_item_form_without_stores() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    browser.page("/new_item").await;
    let response = browser
        .post(
            "/new_item",
            &[
                ("name", "Milk"),
                ("price", "3.50"),
                ("photo_url", "https://example.com/milk.jpg"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Please create a store first.")
    );
}

#[tokio::test]
async fn test_update_item_moves_store() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;
    let first = browser.create_store("Corner Market", "12 Main St").await;
    let second = browser.create_store("Farm Stand", "Route 9").await;
    let item_id = browser.create_item("Beans", "1.25", first).await;

    let path = format!("/item/{item_id}");
    let second_id = second.to_string();
    let response = browser
        .post(
            &path,
            &[
                ("name", "Black Beans"),
                ("price", "1.75"),
                ("category", "Pantry"),
                ("photo_url", "https://example.com/beans.jpg"),
                ("store", &second_id),
            ],
        )
        .await;
    assert_eq!(location(&response), path);

    let farm = browser.page(&format!("/store/{second}")).await;
    assert!(farm.contains("Black Beans"));
    let corner = browser.page(&format!("/store/{first}")).await;
    assert!(!corner.contains("Beans"));
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    assert_eq!(browser.get("/store/41").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(browser.get("/item/41").await.status(), StatusCode::NOT_FOUND);

    let response = browser
        .post("/store/41", &[("title", "Ghost"), ("address", "Nowhere")])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = browser
        .post(
            "/item/41",
            &[
                ("name", "Ghost"),
                ("price", "1.00"),
                ("photo_url", "https://example.com/x.jpg"),
                ("store", "1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

}

#[tokio::test]
async fn test_malformed_ids_get_not_found_page() {
    let server = TestServer::spawn().await;
    let browser = server.logged_in("shopper").await;

    for path in ["/store/abc", "/item/abc", "/item/99999999999"] {
        let response = browser.get(path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {path}");
        assert!(response.text().await.unwrap().contains("Not Found"));
    }

    let response = browser.post("/add_to_shopping_list/abc", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
