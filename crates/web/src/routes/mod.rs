//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Store ping + cache probe
//!
//! # Public
//! GET  /api/menu                       - Visible categories with items
//! GET  /api/settings                   - Restaurant settings
//!
//! # Admin (bearer token, except login)
//! POST /api/admin/login                - Issue a token (also /api/auth/login)
//! GET  /api/admin/categories           - All categories with items
//! POST /api/admin/categories           - Create category
//! GET  /api/admin/categories/{id}      - One category with items
//! PUT  /api/admin/categories/{id}      - Partial update
//! DELETE /api/admin/categories/{id}    - Delete with its items
//! GET  /api/admin/items                - All items with category
//! POST /api/admin/items                - Create item
//! GET  /api/admin/items/{id}           - One item
//! PUT  /api/admin/items/{id}           - Replace item
//! DELETE /api/admin/items/{id}         - Delete item
//! GET  /api/admin/settings             - Settings
//! PUT  /api/admin/settings             - Merge settings
//! GET|POST|PUT|DELETE /api/admin/menu  - Combined category/item endpoint
//! ```

pub mod admin;
pub mod health;
pub mod menu;
pub mod settings;

use std::str::FromStr;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Parse a path or query id, rejecting anything that is not an integer.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {raw}")))
}

/// Public and admin API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/menu", get(menu::menu))
        .route("/api/settings", get(settings::settings))
        .route("/api/auth/login", post(admin::auth::login))
        .nest("/api/admin", admin::admin_routes())
}

/// The full application: routes, tracing, request ids, CORS and Sentry.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::WebConfig;
    use crate::db::{MemoryStore, MenuStore};
    use crate::services::auth::DEFAULT_TOKEN_TTL;
    use crate::services::seed::{self, defaults};

    fn config() -> WebConfig {
        WebConfig {
            database_url: SecretString::from("memory:"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            token_secret: SecretString::from("k9X2mQ7vR4tY8wZ1nB5cL3hJ6fD0sA9e"),
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

    async fn seeded_app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        seed::ensure_default_data(store.as_ref()).await.unwrap();
        (app(AppState::new(config(), store.clone())), store)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
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
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/admin/login",
            None,
            Some(json!({
                "email": defaults::ADMIN_EMAIL,
                "password": defaults::ADMIN_PASSWORD,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_public_menu_is_ordered() {
        let (app, _) = seeded_app().await;
        let (status, body) = send(&app, "GET", "/api/menu", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let categories = body.as_array().unwrap();
        assert_eq!(categories.len(), 5);
        assert_eq!(categories[0]["name"], "المقبلات");
        assert_eq!(categories[0]["items"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_public_settings() {
        let (app, _) = seeded_app().await;
        let (status, body) = send(&app, "GET", "/api/settings", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["restaurantName"], defaults::settings().restaurant_name);
    }

    #[tokio::test]
    async fn test_login_response_and_errors() {
        let (app, _) = seeded_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": defaults::ADMIN_EMAIL,
                "password": defaults::ADMIN_PASSWORD,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["user"]["email"], defaults::ADMIN_EMAIL);
        assert!(body["token"].as_str().unwrap().starts_with("admin-token-"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": defaults::ADMIN_EMAIL, "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "email": defaults::ADMIN_EMAIL })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and password are required");
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let (app, _) = seeded_app().await;
        let (status, body) = send(&app, "GET", "/api/admin/categories", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTHENTICATION_ERROR");

        let (status, _) = send(
            &app,
            "GET",
            "/api/admin/categories",
            Some("admin-token-1700000000000"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_category_crud_and_cascade() {
        let (app, store) = seeded_app().await;
        let token = login(&app).await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/admin/categories",
            Some(&token),
            Some(json!({ "name": "السلطات" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["order"], 6);
        assert_eq!(created["visible"], true);
        let id = created["id"].as_i64().unwrap();

        let (status, item) = send(
            &app,
            "POST",
            "/api/admin/items",
            Some(&token),
            Some(json!({ "name": "تبولة", "price": "18 ريال", "categoryId": id.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["category"]["name"], "السلطات");

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/admin/categories/{id}"),
            Some(&token),
            Some(json!({ "visible": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "السلطات");
        assert_eq!(updated["visible"], false);

        let (_, menu) = send(&app, "GET", "/api/menu", None, None).await;
        assert_eq!(menu.as_array().unwrap().len(), 5);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/api/admin/categories/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Category deleted successfully");
        assert_eq!(store.count_items().await.unwrap(), 30);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/admin/categories/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_item_validation() {
        let (app, _) = seeded_app().await;
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/items",
            Some(&token),
            Some(json!({ "name": "شاي" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Name, price, and category are required", "code": "VALIDATION_ERROR" })
        );

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/items",
            Some(&token),
            Some(json!({ "name": "شاي", "price": "5 ريال", "categoryId": 9999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Category not found");
    }

    #[tokio::test]
    async fn test_catalog_error_bodies() {
        let (app, _) = seeded_app().await;
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/categories",
            Some(&token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Name is required", "code": "VALIDATION_ERROR" })
        );

        let (status, body) = send(&app, "GET", "/api/admin/items/999", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Item not found", "code": "NOT_FOUND" }));

        let (status, body) =
            send(&app, "GET", "/api/admin/categories/999", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Category not found");
    }

    #[tokio::test]
    async fn test_settings_on_empty_store_do_not_block_seeding() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config(), store.clone());
        state.menu().warm().await.unwrap();
        let app = app(state);

        let (status, body) = send(&app, "GET", "/api/settings", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 0);
        assert_eq!(store.count_settings().await.unwrap(), 0);

        let outcome = seed::ensure_default_data(store.as_ref()).await.unwrap();
        assert!(outcome.seeded());

        let (_, body) = send(&app, "GET", "/api/settings", None, None).await;
        assert_eq!(body["restaurantName"], defaults::settings().restaurant_name);
    }

    #[tokio::test]
    async fn test_settings_update_is_visible_publicly() {
        let (app, _) = seeded_app().await;
        let token = login(&app).await;
        assert_eq!(send(&app, "GET", "/api/settings", None, None).await.0, StatusCode::OK);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/admin/settings",
            Some(&token),
            Some(json!({ "contactPhone": "+966500000000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contactPhone"], "+966500000000");
        assert_eq!(body["restaurantName"], defaults::settings().restaurant_name);

        let (_, public) = send(&app, "GET", "/api/settings", None, None).await;
        assert_eq!(public["contactPhone"], "+966500000000");
    }

    #[tokio::test]
    async fn test_combined_menu_endpoint() {
        let (app, store) = seeded_app().await;
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/menu",
            Some(&token),
            Some(json!({ "type": "drink", "name": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid item type");

        let (status, category) = send(
            &app,
            "POST",
            "/api/admin/menu",
            Some(&token),
            Some(json!({ "type": "category", "name": "الفطور" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let category_id = category["id"].as_i64().unwrap();

        let (status, item) = send(
            &app,
            "POST",
            "/api/admin/menu",
            Some(&token),
            Some(json!({
                "type": "item",
                "name": "فول مدمس",
                "price": "12 ريال",
                "categoryId": category_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let item_id = item["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "PUT",
            "/api/admin/menu",
            Some(&token),
            Some(json!({ "type": "item", "id": item_id, "price": "14 ريال" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, fetched) = send(
            &app,
            "GET",
            &format!("/api/admin/items/{item_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(fetched["price"], "14 ريال");
        assert_eq!(fetched["name"], "فول مدمس");

        let (status, body) = send(&app, "DELETE", "/api/admin/menu?id=1", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing id or type parameter");

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/admin/menu?id={category_id}&type=category"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.count_items().await.unwrap(), 30);
        assert_eq!(store.count_categories().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let (app, _) = seeded_app().await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id::<i32>(" 42 ").unwrap(), 42);
        assert!(parse_id::<i32>("abc").is_err());
    }
}
