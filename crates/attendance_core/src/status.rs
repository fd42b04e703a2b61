//! crates/attendance_core/src/status.rs
//!
//! Turns raw attendance records into per-member display status.

use crate::domain::{AttendanceRecord, AttendanceStatus, StatusMap};
use crate::roster::Roster;

/// Maps each record's member to its derived status.
///
/// If a member appears more than once, the last record in list order wins.
/// Members without any record are left out; use [`status_or_absent`] to read.
pub fn derive_statuses(records: &[AttendanceRecord]) -> StatusMap {
    records
        .iter()
        .map(|record| (record.name.clone(), record.status()))
        .collect()
}

pub fn status_or_absent(statuses: &StatusMap, name: &str) -> AttendanceStatus {
    statuses.get(name).copied().unwrap_or_default()
}

/// The status of every roster member, in roster order.
pub fn roster_statuses(roster: &Roster, statuses: &StatusMap) -> Vec<(String, AttendanceStatus)> {
    roster
        .iter()
        .map(|name| (name.to_string(), status_or_absent(statuses, name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, check_in: Option<&str>, check_out: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            name: name.to_string(),
            date: "2025-01-10".to_string(),
            check_in_time: check_in.map(str::to_string),
            check_out_time: check_out.map(str::to_string),
        }
    }

    #[test]
    fn derives_attended_left_and_absent() {
        let statuses = derive_statuses(&[
            record("熱田 望", Some("09:00:00"), None),
            record("池田 大翔", Some("09:00:00"), Some("10:00:00")),
        ]);

        assert_eq!(status_or_absent(&statuses, "熱田 望"), AttendanceStatus::Attended);
        assert_eq!(status_or_absent(&statuses, "池田 大翔"), AttendanceStatus::Left);
        assert_eq!(status_or_absent(&statuses, "岩間 悠希"), AttendanceStatus::Absent);
        assert!(!statuses.contains_key("岩間 悠希"));
    }

    #[test]
    fn later_duplicate_record_wins() {
        let statuses = derive_statuses(&[
            record("熱田 望", Some("09:00:00"), Some("10:00:00")),
            record("熱田 望", Some("11:00:00"), None),
        ]);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses["熱田 望"], AttendanceStatus::Attended);
    }

    #[test]
    fn every_roster_member_gets_exactly_one_status() {
        let roster = Roster::default();
        let statuses = derive_statuses(&[
            record("佐藤 勘太", Some("09:00:00"), None),
            record("not on the roster", Some("09:00:00"), None),
        ]);

        let merged = roster_statuses(&roster, &statuses);
        assert_eq!(merged.len(), roster.len());
        assert!(merged
            .iter()
            .zip(roster.iter())
            .all(|((name, _), expected)| name == expected));
        let attended: Vec<_> = merged
            .iter()
            .filter(|(_, status)| *status == AttendanceStatus::Attended)
            .collect();
        assert_eq!(attended.len(), 1);
    }
}
