//! Admin handlers
//!
//! Every route here requires role 0 via the `AdminUser` guard. Search,
//! bulk save, and CSV export all share one criteria shape so the export
//! always matches what the admin sees on screen.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_core::types::{parse_flexible_date, ClientRef, ProjectRef};
use ts_db::{AdminEntryUpdateDto, CreateClientDto, EntryFilter, UpdateClientDto, UpdateUserDto};
use ts_services::{AdminService, ClientService, RegisterForm};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AppState};
use crate::handlers::{ClientResponse, EntryResponse, UserResponse};

/// Search criteria as the client sends them; empty strings count as absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteriaDto {
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub users: Option<UserPick>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPick {
    pub user_id: i64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl SearchCriteriaDto {
    /// Build the conjunctive entry filter; unparseable dates are a 400
    pub fn into_filter(self) -> ApiResult<EntryFilter> {
        let from_date = match non_empty(self.from_date) {
            Some(raw) => Some(
                parse_flexible_date(&raw)
                    .ok_or_else(|| ApiError::bad_request(format!("invalid fromDate: {raw}")))?,
            ),
            None => None,
        };
        let to_date = match non_empty(self.to_date) {
            Some(raw) => Some(
                parse_flexible_date(&raw)
                    .ok_or_else(|| ApiError::bad_request(format!("invalid toDate: {raw}")))?,
            ),
            None => None,
        };

        Ok(EntryFilter {
            from_date,
            to_date,
            project: non_empty(self.project),
            client: non_empty(self.client),
            project_type: non_empty(self.project_type),
            user_id: self.users.map(|u| u.user_id),
        })
    }
}

/// GET /admin/getuserInfo
pub async fn get_user_info(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let users = AdminService::new(pool.clone()).users().await?;

    Ok(Json(json!({
        "data": UserResponse::from_rows(users),
        "status": "Retrieved Successfully",
    })))
}

/// GET /admin/getuserId — backing data for the registration form
pub async fn get_user_id(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let (last_user, catalogue) = AdminService::new(pool.clone()).register_form_data().await?;

    let data: Vec<UserResponse> = last_user.into_iter().map(UserResponse::from_row).collect();
    Ok(Json(json!({
        "data": data,
        "projects": ClientResponse::from_rows(catalogue),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    pub user_id: i64,
    #[serde(default)]
    pub hourly_pay: Option<f64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub project_list: Vec<ProjectRef>,
    #[serde(default)]
    pub clients_list: Vec<ClientRef>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
}

/// POST /admin/register
pub async fn register(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let (row, temp_password) = AdminService::new(pool.clone())
        .register(RegisterForm {
            username: req.username,
            user_id: req.user_id,
            hourly_pay: req.hourly_pay,
            first_name: req.first_name,
            last_name: req.last_name,
            email_address: req.email_address,
            phone_no: req.phone_no,
            contract_type: req.contract_type,
            projects: req.project_list,
            clients: req.clients_list,
            address: req.address,
            address2: req.address2,
        })
        .await?;

    Ok(Json(json!({
        "data": UserResponse::from_row(row),
        "status": "saved",
        "tempPassword": temp_password,
    })))
}

/// GET /admin/deleteUser/:userId
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let remaining = AdminService::new(pool.clone()).delete_user(user_id).await?;

    Ok(Json(json!({
        "data": UserResponse::from_rows(remaining),
        "status": "Retrieved Successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
    #[serde(default)]
    pub clients: Vec<ClientRef>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
}

/// POST /admin/updateUserDetails
pub async fn update_user_details(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let users = AdminService::new(pool.clone())
        .update_user(UpdateUserDto {
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            email_address: req.email_address,
            phone_no: req.phone_no,
            contract_type: req.contract_type,
            address: req.address,
            address2: req.address2,
            projects: req.projects,
            clients: req.clients,
        })
        .await?;

    Ok(Json(json!({
        "data": UserResponse::from_rows(users),
        "status": "saved",
    })))
}

/// GET /admin/getProjectList
pub async fn get_project_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let clients = ClientService::new(pool.clone()).list().await?;

    Ok(Json(json!({
        "data": ClientResponse::from_rows(clients),
        "status": "Retrieved",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClientDto {
    pub client_name: String,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedClientDto {
    pub id: i64,
    pub client_name: String,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProjectListRequest {
    #[serde(default)]
    pub new_clients: Vec<NewClientDto>,
    #[serde(default)]
    pub updated_list: Vec<UpdatedClientDto>,
}

/// POST /admin/saveProjectList
pub async fn save_project_list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<SaveProjectListRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let new_clients = req
        .new_clients
        .into_iter()
        .map(|c| CreateClientDto {
            client_name: c.client_name,
            projects: c.projects,
        })
        .collect();
    let updated = req
        .updated_list
        .into_iter()
        .map(|c| UpdateClientDto {
            id: c.id,
            client_name: c.client_name,
            projects: c.projects,
        })
        .collect();

    let pool = state.pool()?;
    let clients = ClientService::new(pool.clone()).save(new_clients, updated).await?;

    Ok(Json(json!({
        "data": ClientResponse::from_rows(clients),
        "status": "saved",
    })))
}

/// GET /admin/deleteProjectList/:id
pub async fn delete_project_list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    ClientService::new(pool.clone()).delete(id).await?;

    Ok(Json(json!({ "status": "deleted" })))
}

/// GET /admin/getProjectListAndUserList
pub async fn get_project_list_and_user_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let (clients, users) = ClientService::new(pool.clone()).clients_and_users().await?;

    Ok(Json(json!({
        "clientsList": ClientResponse::from_rows(clients),
        "userList": UserResponse::from_rows(users),
    })))
}

/// POST /admin/getSearchDetails
pub async fn get_search_details(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(criteria): Json<SearchCriteriaDto>,
) -> ApiResult<Json<serde_json::Value>> {
    let filter = criteria.into_filter()?;

    let pool = state.pool()?;
    let rows = AdminService::new(pool.clone()).search(&filter).await?;

    Ok(Json(json!({ "data": EntryResponse::from_rows(rows) })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEntryDto {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub admin_time: Option<f64>,
    #[serde(default)]
    pub admin_comments: Option<String>,
    #[serde(default)]
    pub admin_project: Option<String>,
    #[serde(default)]
    pub admin_client: Option<String>,
    #[serde(default)]
    pub admin_project_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAdminDataRequest {
    #[serde(default)]
    pub data_to_update: Vec<AdminEntryDto>,
    #[serde(default)]
    pub search_criteria: SearchCriteriaDto,
}

/// POST /admin/saveAdminData
pub async fn save_admin_data(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<SaveAdminDataRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let filter = req.search_criteria.into_filter()?;
    let rows = req
        .data_to_update
        .into_iter()
        .map(|e| AdminEntryUpdateDto {
            id: e.id,
            user_id: e.user_id,
            admin_time: e.admin_time,
            admin_comments: e.admin_comments,
            admin_project: e.admin_project,
            admin_client: e.admin_client,
            admin_project_type: e.admin_project_type,
        })
        .collect();

    let pool = state.pool()?;
    let refreshed = AdminService::new(pool.clone())
        .save_admin_data(rows, &filter)
        .await?;

    Ok(Json(json!({ "data": EntryResponse::from_rows(refreshed) })))
}

/// POST /admin/exportToExcel — `text/csv` attachment
pub async fn export_to_excel(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(criteria): Json<SearchCriteriaDto>,
) -> ApiResult<Response> {
    let filter = criteria.into_filter()?;

    let pool = state.pool()?;
    let csv = AdminService::new(pool.clone()).export_csv(&filter).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=timesheet.csv",
            ),
        ],
        csv,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub message: String,
    #[serde(rename = "tempPassword")]
    pub temp_password: String,
}

/// GET /admin/resetPassword/:username
pub async fn reset_password(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(username): Path<String>,
) -> ApiResult<Json<ResetPasswordResponse>> {
    let pool = state.pool()?;
    let temp_password = AdminService::new(pool.clone())
        .reset_password(&username)
        .await?;

    Ok(Json(ResetPasswordResponse {
        message: "Password reset successful".to_string(),
        temp_password,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_criteria_build_the_bare_filter() {
        let filter = SearchCriteriaDto::default().into_filter().unwrap();
        assert_eq!(filter, EntryFilter::default());
    }

    #[test]
    fn test_blank_strings_count_as_absent() {
        let dto = SearchCriteriaDto {
            project: Some("".into()),
            client: Some("   ".into()),
            ..Default::default()
        };
        let filter = dto.into_filter().unwrap();
        assert_eq!(filter.project, None);
        assert_eq!(filter.client, None);
    }

    #[test]
    fn test_full_criteria() {
        let dto = SearchCriteriaDto {
            from_date: Some("08/01/2016".into()),
            to_date: Some("2016-08-07".into()),
            project: Some("Rollout".into()),
            client: Some("Acme".into()),
            project_type: Some("Billable".into()),
            users: Some(UserPick { user_id: 7 }),
        };
        let filter = dto.into_filter().unwrap();
        assert_eq!(filter.from_date, Some(date(2016, 8, 1)));
        assert_eq!(filter.to_date, Some(date(2016, 8, 7)));
        assert_eq!(filter.project.as_deref(), Some("Rollout"));
        assert_eq!(filter.client.as_deref(), Some("Acme"));
        assert_eq!(filter.project_type.as_deref(), Some("Billable"));
        assert_eq!(filter.user_id, Some(7));
    }

    #[test]
    fn test_bad_date_rejected() {
        let dto = SearchCriteriaDto {
            from_date: Some("not-a-date".into()),
            ..Default::default()
        };
        assert!(dto.into_filter().is_err());
    }
}
