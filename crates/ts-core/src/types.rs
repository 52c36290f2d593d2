//! Common types used throughout Timesheet RS

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Primary key type
pub type Id = i64;

/// A project name as embedded in snapshot lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub project_name: String,
}

/// A client snapshot as embedded on user documents
///
/// The project/client lists assigned to a user are denormalized copies of the
/// `clients` collection, taken at assignment time; there is no foreign key
/// back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub client_name: String,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
}

/// User role constants
///
/// Roles are plain integers on the wire and in the database: admins manage
/// users, projects, and finalized timesheets; employees log hours.
pub mod role {
    pub const ADMIN: i64 = 0;
    pub const EMPLOYEE: i64 = 1;
}

/// Contract type constants
pub mod contract_type {
    pub const PART_TIME: &str = "PartTime";
    pub const PERMANENT: &str = "Permanent";

    pub fn is_valid(value: &str) -> bool {
        value == PART_TIME || value == PERMANENT
    }
}

/// Wire date format used in week labels and CSV output
pub const DATE_FORMAT_MDY: &str = "%m/%d/%Y";

/// Format a date as `MM/DD/YYYY`
pub fn format_mdy(date: NaiveDate) -> String {
    date.format(DATE_FORMAT_MDY).to_string()
}

/// Parse a date in either `MM/DD/YYYY` or ISO `YYYY-MM-DD` form.
///
/// Clients send both: week labels use the former, edited rows round-trip the
/// latter. Timestamps with a time component are truncated to the date.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT_MDY) {
        return Some(date);
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_type_validity() {
        assert!(contract_type::is_valid("PartTime"));
        assert!(contract_type::is_valid("Permanent"));
        assert!(!contract_type::is_valid("Contractor"));
    }

    #[test]
    fn test_parse_mdy() {
        let date = parse_flexible_date("08/01/2016").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 8, 1).unwrap());
    }

    #[test]
    fn test_parse_iso() {
        let date = parse_flexible_date("2016-08-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 8, 1).unwrap());
    }

    #[test]
    fn test_parse_iso_with_time() {
        let date = parse_flexible_date("2016-08-01T14:30:00.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 8, 1).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_flexible_date("next tuesday").is_none());
        assert!(parse_flexible_date("").is_none());
    }

    #[test]
    fn test_format_round_trip() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 9).unwrap();
        assert_eq!(format_mdy(date), "01/09/2023");
        assert_eq!(parse_flexible_date(&format_mdy(date)), Some(date));
    }
}
