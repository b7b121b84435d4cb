//! Admin bearer-token extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;

use crate::db::MenuStore;
use crate::error::{AppError, set_sentry_user};
use crate::models::Admin;
use crate::state::AppState;

/// Extractor that requires a valid admin token.
///
/// Reads `Authorization: Bearer <token>`, verifies the signature and
/// expiry, and loads the admin the token was issued to.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> String {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub Admin);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || AppError::Unauthorized("Unauthorized".to_string());

        let token = bearer_token(parts).ok_or_else(unauthorized)?;
        let admin_id = state.tokens().verify(token, Utc::now())?;

        let admin = state
            .store()
            .get_admin(admin_id)
            .await?
            .ok_or_else(unauthorized)?;

        set_sentry_user(&admin.id);
        Ok(Self(admin))
    }
}
