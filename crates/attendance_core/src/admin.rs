//! crates/attendance_core/src/admin.rs
//!
//! The administrator side: a password gate in front of a dashboard that lists
//! one day's records and exports them as CSV.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{AttendanceRecord, CsvExport, Notice};
use crate::export::csv_export;
use crate::notice::NoticeBoard;
use crate::ports::AttendanceService;
use crate::signal::StateSignal;

/// Inline error shown under the password field.
pub const LOGIN_ERROR: &str = "パスワードが違います";

pub const EMPTY_EXPORT_ERROR: &str = "エクスポートするデータがありません";

/// The shared admin secret, fixed at build time through `KIOSK_ADMIN_PASSWORD`.
pub const DEFAULT_ADMIN_SECRET: &str = match option_env!("KIOSK_ADMIN_PASSWORD") {
    Some(secret) => secret,
    None => "admin",
};

//=========================================================================================
// Login
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSnapshot {
    /// Length only; the typed value is never sent back out.
    pub password_length: usize,
    pub error: Option<String>,
}

/// Compares a typed password against a single shared secret. No remote call.
#[derive(Debug, Clone)]
pub struct AdminGate {
    secret: String,
    candidate: String,
    error: Option<String>,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            candidate: String::new(),
            error: None,
        }
    }

    pub fn set_candidate(&mut self, value: impl Into<String>) {
        self.candidate = value.into();
    }

    /// Checks the typed password. The field is emptied either way.
    pub fn submit(&mut self) -> bool {
        let accepted = self.candidate == self.secret;
        self.candidate.clear();
        if accepted {
            info!("Administrator logged in.");
            self.error = None;
        } else {
            warn!("Rejected an administrator password attempt.");
            self.error = Some(LOGIN_ERROR.to_string());
        }
        accepted
    }

    pub fn reset(&mut self) {
        self.candidate.clear();
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> LoginSnapshot {
        LoginSnapshot {
            password_length: self.candidate.chars().count(),
            error: self.error.clone(),
        }
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_SECRET)
    }
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub selected_date: NaiveDate,
    pub records: Vec<AttendanceRecord>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug)]
struct DashboardState {
    selected_date: NaiveDate,
    records: Vec<AttendanceRecord>,
    loading: bool,
    /// Set when the date changed while a fetch was running.
    refetch_requested: bool,
    torn_down: bool,
}

/// View model of the admin dashboard. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct DashboardViewModel {
    service: Arc<dyn AttendanceService>,
    notices: NoticeBoard,
    signal: StateSignal,
    state: Arc<Mutex<DashboardState>>,
}

impl DashboardViewModel {
    /// A fresh dashboard showing `today`. Nothing is fetched until [`Self::refresh`].
    pub fn new(service: Arc<dyn AttendanceService>, today: NaiveDate, signal: StateSignal) -> Self {
        Self {
            service,
            notices: NoticeBoard::new(signal.clone()),
            signal,
            state: Arc::new(Mutex::new(DashboardState {
                selected_date: today,
                records: Vec::new(),
                loading: false,
                refetch_requested: false,
                torn_down: false,
            })),
        }
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub async fn selected_date(&self) -> NaiveDate {
        self.state.lock().await.selected_date
    }

    /// Selects `date` and refetches if it differs from the current selection.
    pub async fn change_date(&self, date: NaiveDate) {
        {
            let state = self.state.lock().await;
            if state.selected_date == date {
                return;
            }
        }
        self.fetch_for_date(date).await;
    }

    /// Selects `date` and loads its records.
    ///
    /// Only one fetch runs at a time. A date picked while a fetch is running is
    /// loaded right after it, and results for a date that is no longer selected
    /// are thrown away. A failed fetch leaves the list empty.
    pub async fn fetch_for_date(&self, date: NaiveDate) {
        {
            let mut state = self.state.lock().await;
            if state.torn_down {
                return;
            }
            state.selected_date = date;
            if state.loading {
                debug!("Fetch already in flight, {} will be loaded after it.", date);
                state.refetch_requested = true;
                drop(state);
                self.signal.notify();
                return;
            }
            state.loading = true;
        }
        self.signal.notify();

        let mut date = date;
        loop {
            let result = self.service.get_attendance_for_date(date).await;
            let mut state = self.state.lock().await;
            if state.torn_down {
                debug!("Dashboard closed before records for {} arrived.", date);
                state.loading = false;
                return;
            }
            if state.selected_date != date {
                debug!("Discarding records for {}, {} is selected now.", date, state.selected_date);
            } else {
                match result {
                    Ok(records) => {
                        info!("Loaded {} attendance records for {}.", records.len(), date);
                        state.records = records;
                    }
                    Err(e) => {
                        error!("Failed to load records for {}: {}", date, e);
                        state.records.clear();
                        self.notices
                            .set(Notice::error(format!("記録の取得に失敗: {}", e)));
                    }
                }
            }
            let again = std::mem::take(&mut state.refetch_requested);
            if again || state.selected_date != date {
                date = state.selected_date;
                continue;
            }
            state.loading = false;
            break;
        }
        self.signal.notify();
    }

    /// Loads the currently selected date.
    pub async fn refresh(&self) {
        let date = self.selected_date().await;
        self.fetch_for_date(date).await;
    }

    /// Renders the loaded records as CSV. With nothing loaded, shows an error
    /// notice and returns `None`.
    pub async fn export(&self) -> Option<CsvExport> {
        let state = self.state.lock().await;
        if state.records.is_empty() {
            warn!("Export requested with no records for {}.", state.selected_date);
            self.notices.set(Notice::error(EMPTY_EXPORT_ERROR));
            return None;
        }
        let export = csv_export(state.selected_date, &state.records);
        info!("Exported {} records as {}.", state.records.len(), export.filename);
        Some(export)
    }

    pub async fn records(&self) -> Vec<AttendanceRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        DashboardSnapshot {
            selected_date: state.selected_date,
            records: state.records.clone(),
            loading: state.loading,
            notice: self.notices.current(),
        }
    }

    /// Detaches the dashboard: late results are dropped and the notice timer released.
    pub async fn teardown(&self) {
        self.state.lock().await.torn_down = true;
        self.notices.clear();
    }
}
