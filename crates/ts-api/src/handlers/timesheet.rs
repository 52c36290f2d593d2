//! Timesheet handlers
//!
//! The week endpoints materialize missing daily rows as a side effect of
//! reading; save and submit share one reconciliation path that differs only
//! in the `submitted` flag it writes.

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_core::types::{parse_flexible_date, ClientRef, ProjectRef};
use ts_core::week;
use ts_db::ProfileUpdateDto;
use ts_services::{EntryEdit, SaveEntriesParams, TimesheetService, WeekData};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};
use crate::handlers::EntryResponse;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDataResponse {
    pub data: Vec<EntryResponse>,
    pub date_ranges: Vec<String>,
    pub projects: Vec<ProjectRef>,
    pub clients: Vec<ClientRef>,
}

impl WeekDataResponse {
    fn from_week(week: WeekData) -> Self {
        Self {
            data: EntryResponse::from_rows(week.entries),
            date_ranges: week.date_ranges,
            projects: week.projects,
            clients: week.clients,
        }
    }
}

/// GET /time/getUserTimeLogin
pub async fn get_user_time_login(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<WeekDataResponse>> {
    let pool = state.pool()?;
    let service = TimesheetService::new(pool.clone());
    let week = service.login_week(user.user_id, today()).await?;
    Ok(Json(WeekDataResponse::from_week(week)))
}

#[derive(Debug, Deserialize)]
pub struct DateRangeRequest {
    #[serde(default)]
    pub date: String,
}

/// POST /time/getDateInfoBetweenDates
pub async fn get_date_info_between_dates(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<DateRangeRequest>,
) -> ApiResult<Json<WeekDataResponse>> {
    let (start, end) = week::parse_range(&req.date)?;

    let pool = state.pool()?;
    let service = TimesheetService::new(pool.clone());
    let week = service.week_between(user.user_id, start, end, today()).await?;
    Ok(Json(WeekDataResponse::from_week(week)))
}

/// One edited row as the client sends it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryEditDto {
    pub id: Option<i64>,
    pub date: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub hours: f64,
    #[serde(default)]
    pub comments: Option<String>,
}

impl EntryEditDto {
    fn into_edit(self) -> ApiResult<EntryEdit> {
        let date = parse_flexible_date(&self.date)
            .ok_or_else(|| ApiError::bad_request(format!("invalid entry date: {}", self.date)))?;
        Ok(EntryEdit {
            id: self.id,
            date,
            client: self.client,
            project: self.project,
            project_type: self.project_type,
            hours: self.hours,
            comments: self.comments,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTimesheetRequest {
    #[serde(default)]
    pub data_need_to_update: Vec<EntryEditDto>,
    #[serde(default)]
    pub new_data: Vec<EntryEditDto>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SaveTimesheetResponse {
    pub data: Vec<EntryResponse>,
    pub status: String,
}

async fn save_with_flag(
    state: AppState,
    user: AuthenticatedUser,
    req: SaveTimesheetRequest,
    submitted: i32,
) -> ApiResult<Json<SaveTimesheetResponse>> {
    let updates = req
        .data_need_to_update
        .into_iter()
        .map(EntryEditDto::into_edit)
        .collect::<ApiResult<Vec<_>>>()?;
    let inserts = req
        .new_data
        .into_iter()
        .map(EntryEditDto::into_edit)
        .collect::<ApiResult<Vec<_>>>()?;

    let pool = state.pool()?;
    let service = TimesheetService::new(pool.clone());
    let rows = service
        .save_entries(
            SaveEntriesParams {
                updates,
                inserts,
                name: req.name,
                user_id: user.user_id,
            },
            submitted,
        )
        .await?;

    Ok(Json(SaveTimesheetResponse {
        data: EntryResponse::from_rows(rows),
        status: "Saved Successfully".to_string(),
    }))
}

/// POST /time/updateTimeSheet — draft save, leaves rows unsubmitted
pub async fn update_time_sheet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<SaveTimesheetRequest>,
) -> ApiResult<Json<SaveTimesheetResponse>> {
    save_with_flag(state, user, req, 0).await
}

/// POST /time/submitTimeSheet — final submit, rows become admin-visible
pub async fn submit_time_sheet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<SaveTimesheetRequest>,
) -> ApiResult<Json<SaveTimesheetResponse>> {
    save_with_flag(state, user, req, 1).await
}

/// Profile projection: no id, no role, no credentials
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
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
    pub projects: Vec<ProjectRef>,
    pub clients: Vec<ClientRef>,
}

impl ProfileResponse {
    fn from_row(row: ts_db::UserRow) -> Self {
        Self {
            username: row.username,
            contract_type: row.contract_type,
            hourly_pay: row.hourly_pay,
            first_name: row.first_name,
            last_name: row.last_name,
            email_address: row.email_address,
            phone_no: row.phone_no,
            address: row.address,
            address2: row.address2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            projects: row.projects.0,
            clients: row.clients.0,
        }
    }
}

/// GET /time/getProfileInfo
pub async fn get_profile_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let service = TimesheetService::new(pool.clone());
    let row = service.profile(user.user_id).await?;

    Ok(Json(json!({
        "data": ProfileResponse::from_row(row),
        "status": "Retrieved Successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
}

/// POST /time/saveProfileInfo
pub async fn save_profile_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<SaveProfileRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let pool = state.pool()?;
    let service = TimesheetService::new(pool.clone());
    service
        .save_profile(
            user.user_id,
            ProfileUpdateDto {
                first_name: req.first_name,
                last_name: req.last_name,
                email_address: req.email_address,
                phone_no: req.phone_no,
                address: req.address,
                address2: req.address2,
            },
        )
        .await?;

    Ok(Json(json!({ "status": "Saved Successfully" })))
}
