//! services/kiosk/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete attendance service
//! behind the kiosk. It implements the `AttendanceService` port from the core
//! crate on top of PostgreSQL using `sqlx`.

use async_trait::async_trait;
use attendance_core::domain::{AttendanceAction, AttendanceRecord};
use attendance_core::ports::{format_date, format_time, AttendanceService, Clock, PortError, PortResult};
use attendance_core::roster::Roster;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::{info, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `AttendanceService` port.
///
/// Concurrent writes for the same member and day are resolved by the database:
/// the last one wins.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
    roster: Arc<Roster>,
    clock: Arc<dyn Clock>,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool, roster: Arc<Roster>, clock: Arc<dyn Clock>) -> Self {
        Self { pool, roster, clock }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn records_for(&self, date: NaiveDate) -> PortResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT name, date, check_in_time, check_out_time FROM attendance WHERE date = $1 ORDER BY id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(rows.into_iter().map(AttendanceRow::to_domain).collect())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AttendanceRow {
    name: String,
    date: NaiveDate,
    check_in_time: Option<NaiveTime>,
    check_out_time: Option<NaiveTime>,
}

impl AttendanceRow {
    fn to_domain(self) -> AttendanceRecord {
        AttendanceRecord {
            name: self.name,
            date: format_date(self.date),
            check_in_time: self.check_in_time.map(format_time),
            check_out_time: self.check_out_time.map(format_time),
        }
    }
}

/// The confirmation shown on the kiosk after a successful write.
pub fn confirmation_text(name: &str, action: AttendanceAction, time: NaiveTime) -> String {
    format!(
        "{}さんの{}を記録しました ({})",
        name,
        action.label(),
        format_time(time)
    )
}

//=========================================================================================
// `AttendanceService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AttendanceService for DbAdapter {
    async fn get_today_status(&self) -> PortResult<Vec<AttendanceRecord>> {
        self.records_for(self.clock.today()).await
    }

    async fn record_attendance(&self, name: &str, action: AttendanceAction) -> PortResult<String> {
        if !self.roster.contains(name) {
            warn!("Refusing to record attendance for unknown member '{}'.", name);
            return Err(PortError::Remote(format!(
                "名簿に存在しないメンバーです: {}",
                name
            )));
        }

        let date = self.clock.today();
        let time = self.clock.now_time();
        let statement = match action {
            AttendanceAction::CheckIn => {
                "INSERT INTO attendance (name, date, check_in_time) VALUES ($1, $2, $3) \
                 ON CONFLICT (name, date) DO UPDATE \
                 SET check_in_time = EXCLUDED.check_in_time, check_out_time = NULL, updated_at = now()"
            }
            AttendanceAction::CheckOut => {
                "INSERT INTO attendance (name, date, check_out_time) VALUES ($1, $2, $3) \
                 ON CONFLICT (name, date) DO UPDATE \
                 SET check_out_time = EXCLUDED.check_out_time, updated_at = now()"
            }
        };

        sqlx::query(statement)
            .bind(name)
            .bind(date)
            .bind(time)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!("Recorded {} for {} on {} at {}.", action.label(), name, date, time);
        Ok(confirmation_text(name, action, time))
    }

    async fn get_attendance_for_date(&self, date: NaiveDate) -> PortResult<Vec<AttendanceRecord>> {
        self.records_for(date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_wire_records() {
        let row = AttendanceRow {
            name: "佐藤 勘太".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            check_in_time: NaiveTime::from_hms_opt(9, 0, 0),
            check_out_time: None,
        };

        let record = row.to_domain();
        assert_eq!(record.date, "2025-01-10");
        assert_eq!(record.check_in_time.as_deref(), Some("09:00:00"));
        assert_eq!(record.check_out_time, None);
    }

    #[test]
    fn confirmation_names_member_action_and_time() {
        let text = confirmation_text(
            "下田 聖",
            AttendanceAction::CheckOut,
            NaiveTime::from_hms_opt(17, 30, 5).unwrap(),
        );
        assert_eq!(text, "下田 聖さんの退室を記録しました (17:30:05)");
    }
}
