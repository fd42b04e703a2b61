//! crates/attendance_core/src/export.rs
//!
//! CSV materialisation of a day's records for spreadsheet use.

use chrono::NaiveDate;
use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use tracing::warn;

use crate::domain::{AttendanceRecord, CsvExport};
use crate::ports::format_date;

pub const CSV_HEADER: &str = "日付,名前,出席時間,退席時間";

/// Spreadsheet applications need the byte-order mark to detect UTF-8.
const UTF8_BOM: char = '\u{feff}';

pub fn export_filename(date: NaiveDate) -> String {
    format!("attendance_{}.csv", format_date(date))
}

/// Renders `records` as CSV, one row per record, ordered by member name in
/// Japanese collation order. The input order of equal names is kept.
pub fn attendance_csv(records: &[AttendanceRecord]) -> String {
    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    match Collator::try_new(&locale!("ja").into(), CollatorOptions::new()) {
        Ok(collator) => sorted.sort_by(|a, b| collator.compare(&a.name, &b.name)),
        Err(e) => {
            warn!("Japanese collator unavailable, ordering by code point: {}", e);
            sorted.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    let mut csv = String::new();
    csv.push(UTF8_BOM);
    csv.push_str(CSV_HEADER);
    for record in sorted {
        csv.push('\n');
        csv.push_str(&csv_row(record));
    }
    csv
}

pub fn csv_export(date: NaiveDate, records: &[AttendanceRecord]) -> CsvExport {
    CsvExport {
        filename: export_filename(date),
        content: attendance_csv(records),
    }
}

fn csv_row(record: &AttendanceRecord) -> String {
    format!(
        "{},\"{}\",{},{}",
        record.date,
        record.name.replace('"', "\"\""),
        record.check_in_time.as_deref().unwrap_or_default(),
        record.check_out_time.as_deref().unwrap_or_default(),
    )
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
    fn single_open_record_renders_with_bom_header_and_empty_checkout() {
        let csv = attendance_csv(&[record("佐藤 勘太", Some("09:00:00"), None)]);

        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines, vec![CSV_HEADER, "2025-01-10,\"佐藤 勘太\",09:00:00,"]);
        assert!(!csv.contains("null"));
    }

    #[test]
    fn rows_are_sorted_by_name_and_quotes_are_escaped() {
        let csv = attendance_csv(&[
            record("b \"nick\"", None, Some("10:00:00")),
            record("a", Some("08:00:00"), Some("09:00:00")),
        ]);

        let lines: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "2025-01-10,\"a\",08:00:00,09:00:00",
                "2025-01-10,\"b \"\"nick\"\"\",,10:00:00",
            ]
        );
    }

    #[test]
    fn ordering_is_deterministic_for_the_same_input() {
        let records = vec![
            record("山田 悠聖", Some("09:00:00"), None),
            record("熱田 望", Some("09:05:00"), None),
            record("若林 空", None, None),
        ];
        let reversed: Vec<_> = records.iter().rev().cloned().collect();
        assert_eq!(attendance_csv(&records), attendance_csv(&reversed));
    }

    #[test]
    fn filename_embeds_the_selected_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(export_filename(date), "attendance_2025-01-10.csv");
    }
}
