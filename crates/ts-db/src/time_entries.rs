//! Time entry repository
//!
//! Database operations for daily timesheet rows. One row per (user, calendar
//! day), guaranteed by a unique index; materialization inserts rely on
//! `ON CONFLICT DO NOTHING` so a crashed insert/re-query cycle never creates
//! duplicate days.
//!
//! Multi-row writes are issued row by row without a wrapping transaction:
//! concurrent saves race last-write-wins at the row level, since every row
//! is addressed independently by `(id, user_id)`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};
use ts_core::Id;

use crate::repository::RepositoryResult;

const ENTRY_COLUMNS: &str = r#"
    id, user_id, date, first_name, client, project, project_type, hours,
    comments, admin_time, admin_comments, admin_project, admin_client,
    admin_project_type, submitted, saved, created_at, updated_at
"#;

/// Time entry database entity
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryRow {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub first_name: Option<String>,
    pub client: Option<String>,
    pub project: Option<String>,
    pub project_type: Option<String>,
    pub hours: f64,
    pub comments: Option<String>,
    pub admin_time: Option<f64>,
    pub admin_comments: Option<String>,
    pub admin_project: Option<String>,
    pub admin_client: Option<String>,
    pub admin_project_type: Option<String>,
    pub submitted: i32,
    pub saved: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for an employee updating an existing row
///
/// The row is addressed by `(id, user_id)` — the user id keeps one user from
/// overwriting another's row with a guessed or forged id.
#[derive(Debug, Clone)]
pub struct UpdateEntryDto {
    pub id: Id,
    pub user_id: Id,
    pub date: NaiveDate,
    pub client: Option<String>,
    pub project: Option<String>,
    pub project_type: Option<String>,
    pub hours: f64,
    pub comments: Option<String>,
    pub first_name: Option<String>,
    pub submitted: i32,
}

/// DTO for an employee-added row with no id yet
#[derive(Debug, Clone)]
pub struct InsertEntryDto {
    pub user_id: Id,
    pub date: NaiveDate,
    pub client: Option<String>,
    pub project: Option<String>,
    pub project_type: Option<String>,
    pub hours: f64,
    pub comments: Option<String>,
    pub first_name: Option<String>,
    pub submitted: i32,
}

/// DTO for an admin overriding the review copy of a row
#[derive(Debug, Clone)]
pub struct AdminEntryUpdateDto {
    pub id: Id,
    pub user_id: Id,
    pub admin_time: Option<f64>,
    pub admin_comments: Option<String>,
    pub admin_project: Option<String>,
    pub admin_client: Option<String>,
    pub admin_project_type: Option<String>,
}

/// Conjunctive search filter over finalized entries
///
/// Every present criterion is ANDed; `submitted = 1` is always implied, so
/// searches only ever see finalized rows. Project/client/type criteria match
/// the admin-override columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub project: Option<String>,
    pub client: Option<String>,
    pub project_type: Option<String>,
    pub user_id: Option<Id>,
}

/// Time entry repository implementation
pub struct TimeEntryRepository {
    pool: PgPool,
}

impl TimeEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rows for a user within `[start, end]`, date ascending
    pub async fn find_in_range(
        &self,
        user_id: Id,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<TimeEntryRow>> {
        let rows = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM time_entries
            WHERE user_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC, id ASC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Bulk-insert zero-hour, unsubmitted rows for the given dates.
    ///
    /// Days that already have a row are skipped via the (user_id, date)
    /// unique index, which makes materialization safe to re-run.
    pub async fn insert_blank_days(
        &self,
        user_id: Id,
        dates: &[NaiveDate],
    ) -> RepositoryResult<u64> {
        if dates.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO time_entries (user_id, date, hours, comments, submitted, saved) ",
        );
        builder.push_values(dates, |mut b, date| {
            b.push_bind(user_id)
                .push_bind(*date)
                .push_bind(0.0_f64)
                .push_bind("")
                .push_bind(0_i32)
                .push_bind(0_i32);
        });
        builder.push(" ON CONFLICT (user_id, date) DO NOTHING");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Update an existing row in place.
    ///
    /// The admin-mirror columns are written equal to the employee values —
    /// they are the copy an admin later reviews and may override.
    pub async fn update_entry(&self, dto: &UpdateEntryDto) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE time_entries SET
                date = $1,
                client = $2,
                project = $3,
                project_type = $4,
                hours = $5,
                comments = $6,
                first_name = $7,
                submitted = $8,
                saved = 1,
                admin_time = $5,
                admin_comments = $6,
                admin_project = $3,
                admin_client = $2,
                admin_project_type = $4,
                updated_at = NOW()
            WHERE id = $9 AND user_id = $10
            "#,
        )
        .bind(dto.date)
        .bind(&dto.client)
        .bind(&dto.project)
        .bind(&dto.project_type)
        .bind(dto.hours)
        .bind(&dto.comments)
        .bind(&dto.first_name)
        .bind(dto.submitted)
        .bind(dto.id)
        .bind(dto.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Insert an employee-added row, with the same admin-mirror duplication
    /// as `update_entry`
    pub async fn insert_entry(&self, dto: &InsertEntryDto) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO time_entries (
                user_id, date, client, project, project_type, hours, comments,
                first_name, submitted, saved,
                admin_time, admin_comments, admin_project, admin_client, admin_project_type
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, 1, $6, $7, $4, $3, $5
            )
            "#,
        )
        .bind(dto.user_id)
        .bind(dto.date)
        .bind(&dto.client)
        .bind(&dto.project)
        .bind(&dto.project_type)
        .bind(dto.hours)
        .bind(&dto.comments)
        .bind(&dto.first_name)
        .bind(dto.submitted)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Apply an admin override to the review copy of a row
    pub async fn update_admin_entry(&self, dto: &AdminEntryUpdateDto) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE time_entries SET
                admin_time = $1,
                admin_comments = $2,
                admin_project = $3,
                admin_client = $4,
                admin_project_type = $5,
                updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(dto.admin_time)
        .bind(&dto.admin_comments)
        .bind(&dto.admin_project)
        .bind(&dto.admin_client)
        .bind(&dto.admin_project_type)
        .bind(dto.id)
        .bind(dto.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Search finalized entries with a conjunctive filter, date ascending
    pub async fn search(&self, filter: &EntryFilter) -> RepositoryResult<Vec<TimeEntryRow>> {
        let mut builder = build_search_query(filter);
        let rows = builder
            .build_query_as::<TimeEntryRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

/// Assemble the search statement: `submitted = 1` is always the first
/// conjunct, every present criterion adds one more.
fn build_search_query(filter: &EntryFilter) -> QueryBuilder<'static, sqlx::Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries WHERE submitted = 1"
    ));

    if let Some(from) = filter.from_date {
        builder.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.to_date {
        builder.push(" AND date <= ").push_bind(to);
    }
    if let Some(ref project) = filter.project {
        builder.push(" AND admin_project = ").push_bind(project.clone());
    }
    if let Some(ref client) = filter.client {
        builder.push(" AND admin_client = ").push_bind(client.clone());
    }
    if let Some(ref project_type) = filter.project_type {
        builder
            .push(" AND admin_project_type = ")
            .push_bind(project_type.clone());
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    builder.push(" ORDER BY date ASC, id ASC");
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_filter_only_sees_submitted_rows() {
        let builder = build_search_query(&EntryFilter::default());
        let sql = builder.sql();
        assert!(sql.contains("WHERE submitted = 1"));
        assert!(!sql.contains(" AND "), "no criteria, no extra conjuncts");
        assert!(sql.ends_with("ORDER BY date ASC, id ASC"));
    }

    #[test]
    fn test_every_criterion_adds_one_conjunct() {
        let filter = EntryFilter {
            from_date: NaiveDate::from_ymd_opt(2016, 8, 1),
            to_date: NaiveDate::from_ymd_opt(2016, 8, 7),
            project: Some("Rollout".into()),
            client: Some("Acme".into()),
            project_type: Some("Billable".into()),
            user_id: Some(7),
        };
        let builder = build_search_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains(" AND date >= $1"));
        assert!(sql.contains(" AND date <= $2"));
        assert!(sql.contains(" AND admin_project = $3"));
        assert!(sql.contains(" AND admin_client = $4"));
        assert!(sql.contains(" AND admin_project_type = $5"));
        assert!(sql.contains(" AND user_id = $6"));
    }

    #[test]
    fn test_partial_criteria_keep_placeholders_dense() {
        let filter = EntryFilter {
            client: Some("Acme".into()),
            user_id: Some(7),
            ..Default::default()
        };
        let builder = build_search_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains(" AND admin_client = $1"));
        assert!(sql.contains(" AND user_id = $2"));
        assert!(!sql.contains("date >="));
    }
}
