//! Authentication service
//!
//! Login and password changes. Unknown users and wrong passwords produce the
//! same 401 so login failures do not enumerate accounts.

use std::sync::Arc;

use sqlx::PgPool;
use ts_auth::JwtService;
use ts_core::{AppError, AppResult};
use ts_db::UserRepository;

/// Successful login payload
#[derive(Debug)]
pub struct LoginResult {
    pub token: String,
    pub role: i64,
}

/// Authentication service implementation
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtService>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Verify credentials and issue a bearer token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if !ts_auth::verify_password(password, &user.password_hash) {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let token = self.jwt.create_token(
            user.user_id,
            &user.username,
            user.role,
            user.first_name.as_deref().unwrap_or(""),
        )?;

        tracing::info!(user_id = user.user_id, "login");
        Ok(LoginResult {
            token,
            role: user.role,
        })
    }

    /// Change the logged-in user's password
    pub async fn change_password(&self, username: &str, new_password: &str) -> AppResult<()> {
        if self.users.find_by_username(username).await?.is_none() {
            return Err(AppError::not_found("User", username));
        }

        let password_hash = ts_auth::hash_password(new_password)?;
        self.users.update_password(username, &password_hash).await?;
        Ok(())
    }
}
