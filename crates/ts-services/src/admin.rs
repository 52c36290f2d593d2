//! Admin service
//!
//! Search, bulk save, and CSV export over finalized timesheet entries, plus
//! user management. Admins only ever see rows with `submitted = 1`; the
//! filter layer enforces that unconditionally.

use std::collections::HashSet;

use sqlx::PgPool;
use ts_core::types::{contract_type, format_mdy, role, ClientRef, ProjectRef};
use ts_core::{AppError, AppResult, Id};
use ts_db::{
    AdminEntryUpdateDto, ClientRepository, ClientRow, CreateUserDto, EntryFilter,
    TimeEntryRepository, TimeEntryRow, UpdateUserDto, UserRepository, UserRow,
};

/// Fixed CSV column order for exports
const CSV_HEADER: [&str; 7] = [
    "Date",
    "User Id",
    "Client",
    "Project",
    "Project Type",
    "Hours Worked",
    "Comments",
];

/// Registration form for a new employee
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub user_id: Id,
    pub hourly_pay: Option<f64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_no: Option<String>,
    pub contract_type: Option<String>,
    pub projects: Vec<ProjectRef>,
    pub clients: Vec<ClientRef>,
    pub address: Option<String>,
    pub address2: Option<String>,
}

/// Serialize search results in the fixed export column order.
///
/// Exports carry the employee-entered values, not the admin overrides; the
/// `csv` writer quotes fields containing commas, quotes, or newlines.
pub fn render_csv(rows: &[TimeEntryRow]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AppError::internal(e.to_string()))?;

    for row in rows {
        writer
            .write_record([
                format_mdy(row.date),
                row.user_id.to_string(),
                row.client.clone().unwrap_or_default(),
                row.project.clone().unwrap_or_default(),
                row.project_type.clone().unwrap_or_default(),
                row.hours.to_string(),
                row.comments.clone().unwrap_or_default(),
            ])
            .map_err(|e| AppError::internal(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::internal(e.to_string()))
}

/// Names in the assigned snapshot lists that do not exist in the catalogue.
///
/// The snapshot lists on a user are denormalized copies with no foreign key,
/// so writes cross-check them against the `clients` collection instead.
fn unknown_assignments(
    catalogue: &[ClientRow],
    clients: &[ClientRef],
    projects: &[ProjectRef],
) -> Vec<String> {
    let known_clients: HashSet<&str> = catalogue.iter().map(|c| c.client_name.as_str()).collect();
    let known_projects: HashSet<&str> = catalogue
        .iter()
        .flat_map(|c| c.projects.0.iter())
        .map(|p| p.project_name.as_str())
        .collect();

    let mut unknown = Vec::new();
    for client in clients {
        if !known_clients.contains(client.client_name.as_str()) {
            unknown.push(format!("client {}", client.client_name));
        }
    }
    for project in projects {
        if !known_projects.contains(project.project_name.as_str()) {
            unknown.push(format!("project {}", project.project_name));
        }
    }
    unknown
}

/// Admin service implementation
pub struct AdminService {
    entries: TimeEntryRepository,
    users: UserRepository,
    clients: ClientRepository,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            entries: TimeEntryRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            clients: ClientRepository::new(pool),
        }
    }

    /// Finalized entries matching the filter, date ascending
    pub async fn search(&self, filter: &EntryFilter) -> AppResult<Vec<TimeEntryRow>> {
        Ok(self.entries.search(filter).await?)
    }

    /// Apply admin overrides row by row, then re-run the original search so
    /// the caller gets server truth rather than an optimistic local merge.
    pub async fn save_admin_data(
        &self,
        rows: Vec<AdminEntryUpdateDto>,
        filter: &EntryFilter,
    ) -> AppResult<Vec<TimeEntryRow>> {
        for row in &rows {
            self.entries.update_admin_entry(row).await?;
        }
        self.search(filter).await
    }

    /// Export the same result set a search would return, as CSV
    pub async fn export_csv(&self, filter: &EntryFilter) -> AppResult<String> {
        let rows = self.entries.search(filter).await?;
        render_csv(&rows)
    }

    /// All employees (credentials never leave the repository layer uncut;
    /// the API projects rows before serializing)
    pub async fn users(&self) -> AppResult<Vec<UserRow>> {
        Ok(self.users.find_employees().await?)
    }

    /// Data backing the registration form: the highest-numbered user (to
    /// derive the next user id) and the client catalogue
    pub async fn register_form_data(&self) -> AppResult<(Option<UserRow>, Vec<ClientRow>)> {
        let last_user = self.users.find_last_by_user_id().await?;
        let catalogue = self.clients.find_all().await?;
        Ok((last_user, catalogue))
    }

    /// Register a new employee with a generated temporary password.
    ///
    /// Returns the created row and the plaintext temp password — the one and
    /// only time it is visible.
    pub async fn register(&self, form: RegisterForm) -> AppResult<(UserRow, String)> {
        if form.username.trim().is_empty() {
            return Err(AppError::validation("username is required"));
        }
        if let Some(ref ct) = form.contract_type {
            if !contract_type::is_valid(ct) {
                return Err(AppError::validation(format!("unknown contract type: {ct}")));
            }
        }
        self.validate_assignments(&form.clients, &form.projects).await?;

        if self.users.find_by_username(&form.username).await?.is_some() {
            return Err(AppError::conflict(format!(
                "username {} already exists",
                form.username
            )));
        }
        if self.users.find_by_user_id(form.user_id).await?.is_some() {
            return Err(AppError::conflict(format!(
                "user id {} already exists",
                form.user_id
            )));
        }

        let temp_password = ts_auth::generate_temp_password();
        let password_hash = ts_auth::hash_password(&temp_password)?;

        let row = self
            .users
            .create(CreateUserDto {
                user_id: form.user_id,
                username: form.username,
                password_hash,
                role: role::EMPLOYEE,
                contract_type: form.contract_type,
                hourly_pay: form.hourly_pay,
                first_name: form.first_name,
                last_name: form.last_name,
                email_address: form.email_address,
                phone_no: form.phone_no,
                address: form.address,
                address2: form.address2,
                projects: form.projects,
                clients: form.clients,
            })
            .await?;

        tracing::info!(user_id = row.user_id, "registered new employee");
        Ok((row, temp_password))
    }

    /// Delete an employee and return the remaining list
    pub async fn delete_user(&self, user_id: Id) -> AppResult<Vec<UserRow>> {
        let affected = self.users.delete_by_user_id(user_id).await?;
        if affected == 0 {
            return Err(AppError::not_found("User", user_id));
        }
        self.users().await
    }

    /// Update an employee's details (addressed by username) and return the
    /// refreshed employee list
    pub async fn update_user(&self, dto: UpdateUserDto) -> AppResult<Vec<UserRow>> {
        self.validate_assignments(&dto.clients, &dto.projects).await?;

        let affected = self.users.update_by_username(dto.clone()).await?;
        if affected == 0 {
            return Err(AppError::not_found("User", dto.username));
        }
        self.users().await
    }

    /// Reset a user's password to a fresh temporary one
    pub async fn reset_password(&self, username: &str) -> AppResult<String> {
        if self.users.find_by_username(username).await?.is_none() {
            return Err(AppError::not_found("User", username));
        }

        let temp_password = ts_auth::generate_temp_password();
        let password_hash = ts_auth::hash_password(&temp_password)?;
        self.users.update_password(username, &password_hash).await?;
        Ok(temp_password)
    }

    async fn validate_assignments(
        &self,
        clients: &[ClientRef],
        projects: &[ProjectRef],
    ) -> AppResult<()> {
        if clients.is_empty() && projects.is_empty() {
            return Ok(());
        }
        let catalogue = self.clients.find_all().await?;
        let unknown = unknown_assignments(&catalogue, clients, projects);
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "assignments not in the client catalogue: {}",
                unknown.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sqlx::types::Json;

    fn entry(comments: &str) -> TimeEntryRow {
        let at = Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap();
        TimeEntryRow {
            id: 1,
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            first_name: Some("Jane".into()),
            client: Some("Acme".into()),
            project: Some("Rollout".into()),
            project_type: Some("Billable".into()),
            hours: 8.0,
            comments: Some(comments.into()),
            admin_time: Some(8.0),
            admin_comments: Some(comments.into()),
            admin_project: Some("Rollout".into()),
            admin_client: Some("Acme".into()),
            admin_project_type: Some("Billable".into()),
            submitted: 1,
            saved: 1,
            created_at: at,
            updated_at: at,
        }
    }

    fn client_row(name: &str, projects: &[&str]) -> ClientRow {
        let at = Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap();
        ClientRow {
            id: 1,
            client_name: name.into(),
            projects: Json(
                projects
                    .iter()
                    .map(|p| ProjectRef {
                        project_name: (*p).to_string(),
                    })
                    .collect(),
            ),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_csv_header_and_row() {
        let csv = render_csv(&[entry("on site")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,User Id,Client,Project,Project Type,Hours Worked,Comments"
        );
        assert_eq!(
            lines.next().unwrap(),
            "05/01/2023,7,Acme,Rollout,Billable,8,on site"
        );
    }

    #[test]
    fn test_csv_quotes_commas_and_doubles_quotes() {
        let csv = render_csv(&[entry(r#"she said "hi, there""#)]).unwrap();
        let data_line = csv.lines().nth(1).unwrap();
        assert!(data_line.ends_with(r#","she said ""hi, there""""#));
    }

    #[test]
    fn test_csv_round_trips_through_a_parser() {
        let original = r#"she said "hi, there""#;
        let csv = render_csv(&[entry(original)]).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[6], original);
    }

    #[test]
    fn test_csv_empty_result_is_header_only() {
        let csv = render_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_unknown_assignments_flags_missing_names() {
        let catalogue = vec![client_row("Acme", &["Rollout"]), client_row("Globex", &[])];
        let clients = vec![ClientRef {
            client_name: "Initech".into(),
            projects: vec![],
        }];
        let projects = vec![ProjectRef {
            project_name: "Rollout".into(),
        }];

        let unknown = unknown_assignments(&catalogue, &clients, &projects);
        assert_eq!(unknown, vec!["client Initech".to_string()]);
    }

    #[test]
    fn test_known_assignments_pass() {
        let catalogue = vec![client_row("Acme", &["Rollout", "Support"])];
        let clients = vec![ClientRef {
            client_name: "Acme".into(),
            projects: vec![],
        }];
        let projects = vec![ProjectRef {
            project_name: "Support".into(),
        }];
        assert!(unknown_assignments(&catalogue, &clients, &projects).is_empty());
    }
}
