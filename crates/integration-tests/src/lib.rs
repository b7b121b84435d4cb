//! Integration tests for Qaima.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qaima-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `menu_lifecycle` - Seeding, duplicate cleanup and fill-missing over one store
//! - `admin_api` - Admin writes through HTTP and their effect on the public menu
//!
//! Everything here runs against the in-memory store.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use qaima_web::config::WebConfig;
use qaima_web::db::MemoryStore;
use qaima_web::routes;
use qaima_web::services::auth::DEFAULT_TOKEN_TTL;
use qaima_web::state::AppState;

/// Signing secret shared by the test configs.
pub const TEST_TOKEN_SECRET: &str = "k9X2mQ7vR4tY8wZ1nB5cL3hJ6fD0sA9e";

/// A config for the in-memory store signing with `token_secret`.
#[must_use]
pub fn config_with_secret(token_secret: &str) -> WebConfig {
    WebConfig {
        database_url: SecretString::from("memory:"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        token_secret: SecretString::from(token_secret),
        token_ttl: DEFAULT_TOKEN_TTL,
        cache_capacity: 100,
        seed_on_startup: false,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The full application over `store`.
#[must_use]
pub fn app(store: Arc<MemoryStore>, token_secret: &str) -> Router {
    routes::app(AppState::new(config_with_secret(token_secret), store))
}

/// Send one request and decode the JSON body (`Null` when there is none).
///
/// # Panics
///
/// Panics if the request cannot be built or the service fails.
#[allow(clippy::unwrap_used)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
