//! Authentication handlers
//!
//! Login is the only credentialed route; logout is a formality for clients
//! that want one (tokens are stateless, so there is nothing to revoke).

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_services::AuthService;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: i64,
    pub status: String,
}

/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let pool = state.pool()?;
    let service = AuthService::new(pool.clone(), state.jwt.clone());
    let result = service.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        token: result.token,
        role: result.role,
        status: "Login successful!".to_string(),
    }))
}

/// GET /user/logout
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "status": "Bye!" }))
}

/// GET /user/isAuthenticated
pub async fn is_authenticated(user: AuthenticatedUser) -> Json<serde_json::Value> {
    Json(json!({
        "authenticate": true,
        "userData": {
            "userId": user.user_id,
            "username": user.username,
            "role": user.role,
            "firstName": user.first_name,
        }
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// POST /user/changePassword
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let pool = state.pool()?;
    let service = AuthService::new(pool.clone(), state.jwt.clone());
    service.change_password(&user.username, &req.password).await?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}
