//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Session layer (tower-sessions with `PostgreSQL` store)
//! 3. `TraceLayer` (request span with a `request_id` field)
//! 4. Request ID (add unique ID to each request)
//! 5. Security headers (CSP, frame and sniffing protection)
//!
//! Route handlers additionally use the [`RequireAuth`] / [`OptionalAuth`]
//! extractors and the flash helpers.

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth, login_redirect};
pub use flash::{push_flash, take_flashes};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
