//! Axum extractors for API handlers
//!
//! `AuthenticatedUser` turns a bearer token into the current user;
//! `AdminUser` additionally requires role 0. Handlers declare the guard they
//! need as a parameter, so route definitions stay flat.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::PgPool;
use std::sync::Arc;
use ts_auth::{extract_bearer_token, JwtService};
use ts_core::types::role;
use ts_core::Id;

use crate::error::ApiError;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Connection pool; `None` lets the router come up without a database
    /// (requests needing it fail with a 500)
    pub pool: Option<PgPool>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(pool: Option<PgPool>, jwt: Arc<JwtService>) -> Self {
        Self { pool, jwt }
    }

    pub fn pool(&self) -> Result<&PgPool, ApiError> {
        self.pool
            .as_ref()
            .ok_or_else(|| ApiError::internal("Internal server error"))
    }
}

/// The user identified by the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Id,
    pub username: String,
    pub role: i64,
    pub first_name: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == role::ADMIN
    }
}

/// Authenticated user extractor: missing or invalid tokens reject with 401
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let claims = app_state
            .jwt
            .validate_token(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(AuthenticatedUser(CurrentUser {
            user_id,
            username: claims.username,
            role: claims.role,
            first_name: claims.first_name,
        }))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Admin guard: an authenticated user with role 0, else 403
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Forbidden: Admins only"));
        }
        Ok(AdminUser(user))
    }
}

impl std::ops::Deref for AdminUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
