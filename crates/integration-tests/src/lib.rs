//! End-to-end test harness for the grocery web app.
//!
//! [`TestServer::spawn`] boots the real router on an ephemeral port with
//! in-memory persistence and an in-memory session store, so the suite needs
//! no database. Each [`Browser`] is an HTTP client with its own cookie jar
//! that does not follow redirects, which lets tests assert on them.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p grocery-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;

use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect};
use tokio::net::TcpListener;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use grocery_web::config::GroceryConfig;
use grocery_web::db::Persistence;
use grocery_web::routes;
use grocery_web::state::AppState;

/// A running app instance.
pub struct TestServer {
    addr: SocketAddr,
    /// Direct handle to the server's storage, for asserting on state.
    pub persistence: Persistence,
}

impl TestServer {
    /// Start a server with empty storage.
    pub async fn spawn() -> Self {
        let persistence = Persistence::in_memory();
        let state = AppState::new(GroceryConfig::default(), persistence.clone());
        let app = routes::app(state)
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server failed");
        });

        Self { addr, persistence }
    }

    /// A fresh, anonymous browser.
    #[must_use]
    pub fn browser(&self) -> Browser {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Browser {
            client,
            base_url: format!("http://{}", self.addr),
        }
    }

    /// A browser that has signed up and logged in as `username`.
    pub async fn logged_in(&self, username: &str) -> Browser {
        let browser = self.browser();
        let response = browser.signup(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "signup failed");
        let response = browser.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login failed");
        browser
    }
}

/// Password used by [`TestServer::logged_in`].
pub const PASSWORD: &str = "correct horse battery";

/// An HTTP client with its own cookie jar.
pub struct Browser {
    client: Client,
    base_url: String,
}

impl Browser {
    /// GET a path.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST a urlencoded form to a path.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET a path and return the body of a 200 response.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("Failed to read body")
    }

    /// Submit the signup form with matching passwords.
    pub async fn signup(&self, username: &str, password: &str) -> Response {
        self.post(
            "/signup",
            &[
                ("username", username),
                ("password", password),
                ("password_confirm", password),
            ],
        )
        .await
    }

    /// Submit the login form.
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post("/login", &[("username", username), ("password", password)])
            .await
    }

    /// Create a store and return its id.
    pub async fn create_store(&self, title: &str, address: &str) -> i32 {
        let response = self
            .post("/new_store", &[("title", title), ("address", address)])
            .await;
        id_from_location(&response, "/store/")
    }

    /// Create an item in `store_id` and return its id.
    pub async fn create_item(&self, name: &str, price: &str, store_id: i32) -> i32 {
        let store = store_id.to_string();
        let response = self
            .post(
                "/new_item",
                &[
                    ("name", name),
                    ("price", price),
                    ("category", "Pantry"),
                    ("photo_url", "https://example.com/photo.jpg"),
                    ("store", &store),
                ],
            )
            .await;
        id_from_location(&response, "/item/")
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> &str {
    assert_eq!(
        response.status(),
        StatusCode::SEE_OTHER,
        "expected a redirect from {}",
        response.url()
    );
    response
        .headers()
        .get(LOCATION)
        .expect("Redirect without Location")
        .to_str()
        .expect("Location is not ASCII")
}

fn id_from_location(response: &Response, prefix: &str) -> i32 {
    location(response)
        .strip_prefix(prefix)
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("unexpected redirect {}", location(response)))
}
