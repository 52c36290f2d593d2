//! # ts-services
//!
//! Application services for Timesheet RS. Each service owns the repositories
//! it needs and exposes the operations the API layer calls:
//!
//! - [`timesheet`] — weekly materialization, save/submit reconciliation,
//!   employee profile
//! - [`admin`] — search/filter/export over finalized entries, admin bulk
//!   save, user management
//! - [`clients`] — the client/project catalogue
//! - [`auth`] — login and password changes

pub mod admin;
pub mod auth;
pub mod clients;
pub mod timesheet;

pub use admin::{AdminService, RegisterForm};
pub use auth::{AuthService, LoginResult};
pub use clients::ClientService;
pub use timesheet::{EntryEdit, SaveEntriesParams, TimesheetService, WeekData};
