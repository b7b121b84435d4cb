//! Admin login.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::AdminProfile;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: AdminProfile,
}

/// Exchange email and password for a bearer token.
///
/// POST /api/admin/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = body?;

    let (Some(email), Some(password)) = (
        request.email.filter(|e| !e.trim().is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let admin = AuthService::new(state.store())
        .login(&email, &password)
        .await?;
    let token = state.tokens().issue(admin.id, Utc::now())?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: AdminProfile::from(&admin),
    }))
}
