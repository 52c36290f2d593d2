//! API handlers
//!
//! One module per route group, plus the wire DTOs shared between them.
//! Rows never cross the wire raw: responses are projected so password
//! hashes and other internals stay server-side.

pub mod admin;
pub mod auth;
pub mod timesheet;

use chrono::NaiveDate;
use serde::Serialize;
use ts_core::types::{ClientRef, ProjectRef};
use ts_db::{ClientRow, TimeEntryRow, UserRow};

/// A timesheet row on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
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
}

impl EntryResponse {
    pub fn from_row(row: TimeEntryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            first_name: row.first_name,
            client: row.client,
            project: row.project,
            project_type: row.project_type,
            hours: row.hours,
            comments: row.comments,
            admin_time: row.admin_time,
            admin_comments: row.admin_comments,
            admin_project: row.admin_project,
            admin_client: row.admin_client,
            admin_project_type: row.admin_project_type,
            submitted: row.submitted,
            saved: row.saved,
        }
    }

    pub fn from_rows(rows: Vec<TimeEntryRow>) -> Vec<Self> {
        rows.into_iter().map(Self::from_row).collect()
    }
}

/// A user on the wire — everything except credentials
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
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
    pub projects: Vec<ProjectRef>,
    pub clients: Vec<ClientRef>,
}

impl UserResponse {
    pub fn from_row(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            role: row.role,
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

    pub fn from_rows(rows: Vec<UserRow>) -> Vec<Self> {
        rows.into_iter().map(Self::from_row).collect()
    }
}

/// A catalogue client on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: i64,
    pub client_name: String,
    pub projects: Vec<ProjectRef>,
}

impl ClientResponse {
    pub fn from_row(row: ClientRow) -> Self {
        Self {
            id: row.id,
            client_name: row.client_name,
            projects: row.projects.0,
        }
    }

    pub fn from_rows(rows: Vec<ClientRow>) -> Vec<Self> {
        rows.into_iter().map(Self::from_row).collect()
    }
}
