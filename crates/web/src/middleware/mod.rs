//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Admin routes additionally extract [`RequireAdmin`].

pub mod auth;
pub mod request_id;

pub use auth::RequireAdmin;
pub use request_id::request_id_middleware;
