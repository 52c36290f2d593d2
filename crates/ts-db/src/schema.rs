//! Schema bootstrap
//!
//! Creates the three tables at startup when they are missing, so a fresh
//! database works without a separate migration step. The unique index on
//! `time_entries (user_id, date)` backs the one-row-per-day invariant that
//! materialization depends on.

use sqlx::PgPool;
use tracing::info;
use ts_core::types::role;

use crate::repository::RepositoryResult;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              BIGSERIAL PRIMARY KEY,
    user_id         BIGINT NOT NULL UNIQUE,
    username        TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,
    role            BIGINT NOT NULL DEFAULT 1,
    contract_type   TEXT,
    hourly_pay      DOUBLE PRECISION,
    first_name      TEXT,
    last_name       TEXT,
    email_address   TEXT,
    phone_no        TEXT,
    address         TEXT,
    address2        TEXT,
    city            TEXT,
    state           TEXT,
    postal_code     TEXT,
    projects        JSONB NOT NULL DEFAULT '[]'::jsonb,
    clients         JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_CLIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id              BIGSERIAL PRIMARY KEY,
    client_name     TEXT NOT NULL,
    projects        JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TIME_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS time_entries (
    id                  BIGSERIAL PRIMARY KEY,
    user_id             BIGINT NOT NULL,
    date                DATE NOT NULL,
    first_name          TEXT,
    client              TEXT,
    project             TEXT,
    project_type        TEXT,
    hours               DOUBLE PRECISION NOT NULL DEFAULT 0,
    comments            TEXT,
    admin_time          DOUBLE PRECISION,
    admin_comments      TEXT,
    admin_project       TEXT,
    admin_client        TEXT,
    admin_project_type  TEXT,
    submitted           INT NOT NULL DEFAULT 0,
    saved               INT NOT NULL DEFAULT 0,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT time_entries_user_day UNIQUE (user_id, date)
)
"#;

/// Create all tables if they do not exist yet
pub async fn bootstrap(pool: &PgPool) -> RepositoryResult<()> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_CLIENTS).execute(pool).await?;
    sqlx::query(CREATE_TIME_ENTRIES).execute(pool).await?;
    info!("Schema bootstrap complete");
    Ok(())
}

/// Ensure at least one admin account exists.
///
/// Inserts the given credentials only when the users table has no admin yet;
/// an existing installation is left untouched.
pub async fn ensure_admin(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> RepositoryResult<bool> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role::ADMIN)
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO users (user_id, username, password_hash, role, first_name)
        VALUES (0, $1, $2, $3, 'Admin')
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role::ADMIN)
    .execute(pool)
    .await?;

    info!(username, "Seeded initial admin account");
    Ok(true)
}
