//! crates/attendance_core/src/domain.rs
//!
//! Defines the pure, core data structures for the attendance kiosk.
//! Records are read-only snapshots of what the remote attendance service holds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One member's activity on one calendar day, as stored by the remote service.
///
/// Times are wall-clock strings (`HH:MM:SS`); `None` means "not yet recorded".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub name: String,
    /// Calendar day in `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub check_in_time: Option<String>,
    #[serde(default)]
    pub check_out_time: Option<String>,
}

impl AttendanceRecord {
    /// Classifies this record: a check-out beats a check-in, and neither means absent.
    pub fn status(&self) -> AttendanceStatus {
        if self.check_out_time.is_some() {
            AttendanceStatus::Left
        } else if self.check_in_time.is_some() {
            AttendanceStatus::Attended
        } else {
            AttendanceStatus::Absent
        }
    }

    pub fn is_complete(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_none()
    }
}

/// The derived, never-persisted classification of a member for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Attended,
    Left,
    #[default]
    Absent,
}

/// Per-member status lookup. Members without a record are not present.
pub type StatusMap = HashMap<String, AttendanceStatus>;

/// What a kiosk tap asks the remote service to record.
///
/// The wire labels are the ones the remote service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceAction {
    #[serde(rename = "出席")]
    CheckIn,
    #[serde(rename = "退室")]
    CheckOut,
}

impl AttendanceAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CheckIn => "出席",
            Self::CheckOut => "退室",
        }
    }

    /// The status a member ends up in once this action has been recorded.
    pub fn resulting_status(&self) -> AttendanceStatus {
        match self {
            Self::CheckIn => AttendanceStatus::Attended,
            Self::CheckOut => AttendanceStatus::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient, user-facing message. At most one is live per view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// A materialised CSV file, ready to be handed to the user as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(check_in: Option<&str>, check_out: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            name: "佐藤 勘太".to_string(),
            date: "2025-01-10".to_string(),
            check_in_time: check_in.map(str::to_string),
            check_out_time: check_out.map(str::to_string),
        }
    }

    #[test]
    fn status_follows_the_latest_recorded_time() {
        assert_eq!(record(Some("09:00:00"), None).status(), AttendanceStatus::Attended);
        assert_eq!(
            record(Some("09:00:00"), Some("10:00:00")).status(),
            AttendanceStatus::Left
        );
        assert_eq!(record(None, None).status(), AttendanceStatus::Absent);
    }

    #[test]
    fn record_uses_camel_case_and_null_times() {
        let json = r#"{"name":"下田 聖","date":"2025-01-10","checkInTime":"09:00:00","checkOutTime":null}"#;
        let parsed: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert!(parsed.is_open());
        assert!(!parsed.is_complete());
        assert_eq!(parsed.check_in_time.as_deref(), Some("09:00:00"));
    }

    #[test]
    fn actions_travel_with_their_japanese_labels() {
        assert_eq!(
            serde_json::to_string(&AttendanceAction::CheckIn).unwrap(),
            "\"出席\""
        );
        let parsed: AttendanceAction = serde_json::from_str("\"退室\"").unwrap();
        assert_eq!(parsed, AttendanceAction::CheckOut);
        assert_eq!(parsed.resulting_status(), AttendanceStatus::Left);
    }
}
