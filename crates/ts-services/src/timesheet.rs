//! Timesheet service
//!
//! The stateful heart of the system: lazily materializes daily rows when a
//! week is read, and reconciles employee edits back into the table on save
//! and submit.

use chrono::NaiveDate;
use sqlx::PgPool;
use ts_core::types::{ClientRef, ProjectRef};
use ts_core::week::{self, WeekRange};
use ts_core::{AppError, AppResult, Id};
use ts_db::{
    InsertEntryDto, ProfileUpdateDto, TimeEntryRepository, TimeEntryRow, UpdateEntryDto,
    UserRepository, UserRow,
};

/// Everything the week view needs in one response
#[derive(Debug)]
pub struct WeekData {
    /// One row per calendar day of the requested range, date ascending
    pub entries: Vec<TimeEntryRow>,
    /// All week labels from the epoch through today (only populated on the
    /// login query; range queries return an empty list)
    pub date_ranges: Vec<String>,
    /// The user's assigned project snapshot list
    pub projects: Vec<ProjectRef>,
    /// The user's assigned client snapshot list
    pub clients: Vec<ClientRef>,
}

/// One edited row sent back by the client
#[derive(Debug, Clone)]
pub struct EntryEdit {
    /// Present for rows that already exist; absent for employee-added rows
    pub id: Option<Id>,
    pub date: NaiveDate,
    pub client: Option<String>,
    pub project: Option<String>,
    pub project_type: Option<String>,
    pub hours: f64,
    pub comments: Option<String>,
}

/// Input to a save or submit call
#[derive(Debug, Clone)]
pub struct SaveEntriesParams {
    /// Existing rows, addressed by id
    pub updates: Vec<EntryEdit>,
    /// Employee-added rows with no id yet
    pub inserts: Vec<EntryEdit>,
    /// Display name stamped onto every written row
    pub name: String,
    pub user_id: Id,
}

/// The `[min, max]` date span covering both edit batches.
///
/// The post-save re-query reads this whole span, so the response is the
/// complete refreshed range rather than just the rows touched.
pub fn covering_span(updates: &[EntryEdit], inserts: &[EntryEdit]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = updates.iter().chain(inserts).map(|e| e.date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));
    Some((min, max))
}

/// Timesheet service implementation
pub struct TimesheetService {
    entries: TimeEntryRepository,
    users: UserRepository,
}

impl TimesheetService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            entries: TimeEntryRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// The login query: materialize the first week of the calendar and hand
    /// back every week label so the client can populate its selector.
    pub async fn login_week(&self, user_id: Id, today: NaiveDate) -> AppResult<WeekData> {
        let ranges = week::week_ranges(today);
        let first = ranges
            .first()
            .copied()
            .ok_or_else(|| AppError::internal("calendar has no weeks before today"))?;
        let labels = ranges.iter().map(WeekRange::label).collect();
        self.get_or_init_week(user_id, first.start, first.end, today, labels)
            .await
    }

    /// Materialize an arbitrary `[start, end]` range for a user
    pub async fn week_between(
        &self,
        user_id: Id,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<WeekData> {
        self.get_or_init_week(user_id, start, end, today, Vec::new())
            .await
    }

    /// Get-or-init: query the range, backfill any missing days with
    /// zero-hour unsubmitted rows, and re-query.
    ///
    /// The insert and re-query are deliberately not transactional; the
    /// unique (user_id, date) index makes a repeated pass harmless.
    async fn get_or_init_week(
        &self,
        user_id: Id,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
        date_ranges: Vec<String>,
    ) -> AppResult<WeekData> {
        let existing = self.entries.find_in_range(user_id, start, end).await?;
        let existing_dates: Vec<NaiveDate> = existing.iter().map(|r| r.date).collect();

        let missing = week::plan_backfill(&existing_dates, start, end, today);
        let entries = if missing.is_empty() {
            existing
        } else {
            tracing::debug!(user_id, count = missing.len(), "materializing missing days");
            self.entries.insert_blank_days(user_id, &missing).await?;
            self.entries.find_in_range(user_id, start, end).await?
        };

        let user = self
            .users
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;

        Ok(WeekData {
            entries,
            date_ranges,
            projects: user.projects.0,
            clients: user.clients.0,
        })
    }

    /// Reconcile a batch of edits: update existing rows in place, insert
    /// employee-added rows, then return the refreshed covering span.
    ///
    /// `submitted` is 0 for a draft save and 1 for a final submit; both paths
    /// mirror the employee values into the admin-review columns. Already
    /// submitted rows are not re-checked here — the "locked after submit"
    /// rule lives in the client.
    pub async fn save_entries(
        &self,
        params: SaveEntriesParams,
        submitted: i32,
    ) -> AppResult<Vec<TimeEntryRow>> {
        for edit in &params.updates {
            let id = edit
                .id
                .ok_or_else(|| AppError::validation("row update is missing its id"))?;
            self.entries
                .update_entry(&UpdateEntryDto {
                    id,
                    user_id: params.user_id,
                    date: edit.date,
                    client: edit.client.clone(),
                    project: edit.project.clone(),
                    project_type: edit.project_type.clone(),
                    hours: edit.hours,
                    comments: edit.comments.clone(),
                    first_name: Some(params.name.clone()),
                    submitted,
                })
                .await?;
        }

        for edit in &params.inserts {
            self.entries
                .insert_entry(&InsertEntryDto {
                    user_id: params.user_id,
                    date: edit.date,
                    client: edit.client.clone(),
                    project: edit.project.clone(),
                    project_type: edit.project_type.clone(),
                    hours: edit.hours,
                    comments: edit.comments.clone(),
                    first_name: Some(params.name.clone()),
                    submitted,
                })
                .await?;
        }

        let (min, max) = covering_span(&params.updates, &params.inserts)
            .ok_or_else(|| AppError::validation("no rows to save"))?;
        Ok(self.entries.find_in_range(params.user_id, min, max).await?)
    }

    /// Profile read for the logged-in employee
    pub async fn profile(&self, user_id: Id) -> AppResult<UserRow> {
        self.users
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))
    }

    /// Self-service profile update
    pub async fn save_profile(&self, user_id: Id, dto: ProfileUpdateDto) -> AppResult<()> {
        let affected = self.users.update_profile(user_id, dto).await?;
        if affected == 0 {
            return Err(AppError::not_found("User", user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn edit(id: Option<Id>, day: NaiveDate) -> EntryEdit {
        EntryEdit {
            id,
            date: day,
            client: None,
            project: None,
            project_type: None,
            hours: 0.0,
            comments: None,
        }
    }

    #[test]
    fn test_covering_span_across_batches() {
        let updates = vec![edit(Some(1), date(2023, 5, 3)), edit(Some(2), date(2023, 5, 4))];
        let inserts = vec![edit(None, date(2023, 5, 1))];
        assert_eq!(
            covering_span(&updates, &inserts),
            Some((date(2023, 5, 1), date(2023, 5, 4)))
        );
    }

    #[test]
    fn test_covering_span_unsorted_input() {
        let updates = vec![edit(Some(1), date(2023, 5, 7)), edit(Some(2), date(2023, 5, 2))];
        assert_eq!(
            covering_span(&updates, &[]),
            Some((date(2023, 5, 2), date(2023, 5, 7)))
        );
    }

    #[test]
    fn test_covering_span_empty() {
        assert_eq!(covering_span(&[], &[]), None);
    }
}
