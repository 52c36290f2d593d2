//! Client repository
//!
//! Database operations for the client/project catalogue. Each client row
//! embeds its project list as JSONB; users receive denormalized snapshots of
//! these rows when assigned.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use ts_core::types::ProjectRef;
use ts_core::Id;

use crate::repository::RepositoryResult;

const CLIENT_COLUMNS: &str = "id, client_name, projects, created_at, updated_at";

/// Client database entity
#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: i64,
    pub client_name: String,
    pub projects: Json<Vec<ProjectRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a client
#[derive(Debug, Clone)]
pub struct CreateClientDto {
    pub client_name: String,
    pub projects: Vec<ProjectRef>,
}

/// DTO for updating a client in place
#[derive(Debug, Clone)]
pub struct UpdateClientDto {
    pub id: Id,
    pub client_name: String,
    pub projects: Vec<ProjectRef>,
}

/// Client repository implementation
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All clients, ordered by name
    pub async fn find_all(&self) -> RepositoryResult<Vec<ClientRow>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY client_name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert a batch of new clients
    pub async fn insert_many(&self, clients: &[CreateClientDto]) -> RepositoryResult<()> {
        for client in clients {
            sqlx::query(
                r#"
                INSERT INTO clients (client_name, projects, created_at, updated_at)
                VALUES ($1, $2, NOW(), NOW())
                "#,
            )
            .bind(&client.client_name)
            .bind(Json(&client.projects))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Update a batch of existing clients in place, each addressed by id
    pub async fn update_many(&self, clients: &[UpdateClientDto]) -> RepositoryResult<()> {
        for client in clients {
            sqlx::query(
                "UPDATE clients SET client_name = $1, projects = $2, updated_at = NOW() WHERE id = $3",
            )
            .bind(&client.client_name)
            .bind(Json(&client.projects))
            .bind(client.id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Delete a client by id
    pub async fn delete(&self, id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
