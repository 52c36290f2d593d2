//! User repository
//!
//! Database operations for users. The project/client lists assigned to a
//! user are stored as JSONB snapshots, mirroring the denormalized shape the
//! rest of the system expects.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use ts_core::types::{role, ClientRef, ProjectRef};
use ts_core::Id;

use crate::repository::RepositoryResult;

const USER_COLUMNS: &str = r#"
    id, user_id, username, password_hash, role, contract_type, hourly_pay,
    first_name, last_name, email_address, phone_no, address, address2,
    city, state, postal_code, projects, clients, created_at, updated_at
"#;

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: i64,
    pub contract_type: Option<String>,
    pub hourly_pay: Option<f64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub projects: Json<Vec<ProjectRef>>,
    pub clients: Json<Vec<ClientRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn is_admin(&self) -> bool {
        self.role == role::ADMIN
    }

    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// DTO for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: i64,
    pub contract_type: Option<String>,
    pub hourly_pay: Option<f64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub projects: Vec<ProjectRef>,
    pub clients: Vec<ClientRef>,
}

/// DTO for the admin "update user details" operation, keyed by username
#[derive(Debug, Clone)]
pub struct UpdateUserDto {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_no: Option<String>,
    pub contract_type: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub projects: Vec<ProjectRef>,
    pub clients: Vec<ClientRef>,
}

/// DTO for the employee self-service profile update
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
}

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by login name
    pub async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find a user by their sequential user id
    pub async fn find_by_user_id(&self, user_id: Id) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All employees (role 1), ordered by user id
    pub async fn find_employees(&self) -> RepositoryResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY user_id ASC"
        ))
        .bind(role::EMPLOYEE)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The user with the highest user id, if any (seeds the next id at
    /// registration time)
    pub async fn find_last_by_user_id(&self) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Create a new user
    pub async fn create(&self, dto: CreateUserDto) -> RepositoryResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                user_id, username, password_hash, role, contract_type, hourly_pay,
                first_name, last_name, email_address, phone_no, address, address2,
                projects, clients, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW()
            )
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(dto.user_id)
        .bind(&dto.username)
        .bind(&dto.password_hash)
        .bind(dto.role)
        .bind(&dto.contract_type)
        .bind(dto.hourly_pay)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email_address)
        .bind(&dto.phone_no)
        .bind(&dto.address)
        .bind(&dto.address2)
        .bind(Json(&dto.projects))
        .bind(Json(&dto.clients))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Update user details by username (admin operation)
    pub async fn update_by_username(&self, dto: UpdateUserDto) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name = $1,
                last_name = $2,
                email_address = $3,
                phone_no = $4,
                contract_type = $5,
                address = $6,
                address2 = $7,
                projects = $8,
                clients = $9,
                updated_at = NOW()
            WHERE username = $10
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email_address)
        .bind(&dto.phone_no)
        .bind(&dto.contract_type)
        .bind(&dto.address)
        .bind(&dto.address2)
        .bind(Json(&dto.projects))
        .bind(Json(&dto.clients))
        .bind(&dto.username)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Update the self-service profile fields for a user
    pub async fn update_profile(
        &self,
        user_id: Id,
        dto: ProfileUpdateDto,
    ) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name = $1,
                last_name = $2,
                email_address = $3,
                phone_no = $4,
                address = $5,
                address2 = $6,
                updated_at = NOW()
            WHERE user_id = $7
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email_address)
        .bind(&dto.phone_no)
        .bind(&dto.address)
        .bind(&dto.address2)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Replace a user's password hash
    pub async fn update_password(&self, username: &str, password_hash: &str) -> RepositoryResult<u64> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE username = $2")
                .bind(password_hash)
                .bind(username)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Delete a user by their sequential user id
    pub async fn delete_by_user_id(&self, user_id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
