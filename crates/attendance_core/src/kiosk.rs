//! crates/attendance_core/src/kiosk.rs
//!
//! The public kiosk screen: a grid of members, each tap opening an action panel
//! that records a check-in or check-out through the remote service.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{AttendanceAction, AttendanceRecord, AttendanceStatus, Notice};
use crate::notice::NoticeBoard;
use crate::ports::{format_date, format_time, AttendanceService, Clock};
use crate::roster::Roster;
use crate::signal::StateSignal;
use crate::status::{derive_statuses, roster_statuses, status_or_absent};

//=========================================================================================
// Public Types
//=========================================================================================

/// Progress of the "today's status" fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// What happened to a record request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The service accepted the write; a reload has been issued.
    Recorded,
    /// The service rejected the write; an error notice is showing.
    Failed,
    /// Nobody is selected, so there is nothing to record.
    NoSelection,
    /// Another record request is still in flight; this one was dropped.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTile {
    pub name: String,
    pub status: AttendanceStatus,
}

/// Everything the kiosk screen needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KioskSnapshot {
    pub members: Vec<MemberTile>,
    pub phase: LoadPhase,
    pub loading: bool,
    pub submitting: bool,
    pub selected_member: Option<String>,
    pub notice: Option<Notice>,
}

//=========================================================================================
// KioskViewModel
//=========================================================================================

#[derive(Debug, Default)]
struct KioskState {
    records: Vec<AttendanceRecord>,
    phase: LoadPhase,
    /// Set when a write completed while a load was already running.
    reload_requested: bool,
    selected: Option<String>,
    /// The member and action of the record call currently in flight.
    submitting: Option<(String, AttendanceAction)>,
}

/// View model of the kiosk. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct KioskViewModel {
    service: Arc<dyn AttendanceService>,
    roster: Arc<Roster>,
    clock: Arc<dyn Clock>,
    notices: NoticeBoard,
    signal: StateSignal,
    state: Arc<Mutex<KioskState>>,
}

impl KioskViewModel {
    pub fn new(
        service: Arc<dyn AttendanceService>,
        roster: Arc<Roster>,
        clock: Arc<dyn Clock>,
        signal: StateSignal,
    ) -> Self {
        Self {
            service,
            roster,
            clock,
            notices: NoticeBoard::new(signal.clone()),
            signal,
            state: Arc::new(Mutex::new(KioskState::default())),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Fetches today's records. Ignored while a load is already running.
    ///
    /// On failure the previous records stay in place and an error notice is shown.
    pub async fn load_status(&self) {
        {
            let mut state = self.state.lock().await;
            if state.phase == LoadPhase::Loading {
                debug!("Status load already in flight, ignoring request.");
                return;
            }
            state.phase = LoadPhase::Loading;
        }
        self.signal.notify();

        loop {
            let result = self.service.get_today_status().await;
            let mut state = self.state.lock().await;
            match result {
                Ok(records) => {
                    info!("Loaded {} attendance records for today.", records.len());
                    state.records = records;
                }
                Err(e) => {
                    error!("Failed to load today's status: {}", e);
                    self.notices
                        .set(Notice::error(format!("状態の取得に失敗: {}", e)));
                }
            }
            if std::mem::take(&mut state.reload_requested) {
                debug!("A write landed during the load, reading again.");
                continue;
            }
            state.phase = LoadPhase::Ready;
            break;
        }
        self.signal.notify();
    }

    /// Re-reads after a successful write. If a load is already running, one more
    /// read is queued behind it so the write is always observed.
    async fn reload_after_write(&self) {
        {
            let mut state = self.state.lock().await;
            if state.phase == LoadPhase::Loading {
                state.reload_requested = true;
                return;
            }
        }
        self.load_status().await;
    }

    /// Opens the action panel for `name`. Returns `false` if the name is not on
    /// the roster or a record call is in flight.
    pub async fn select_member(&self, name: &str) -> bool {
        if !self.roster.contains(name) {
            warn!("Ignoring selection of '{}', who is not on the roster.", name);
            return false;
        }
        {
            let mut state = self.state.lock().await;
            if state.submitting.is_some() {
                debug!("Selection ignored while a record call is in flight.");
                return false;
            }
            state.selected = Some(name.to_string());
        }
        self.signal.notify();
        true
    }

    /// Closes the action panel without recording anything and re-reads today's
    /// status, so writes from other kiosks show up on the grid.
    pub async fn cancel_selection(&self) {
        {
            let mut state = self.state.lock().await;
            if state.submitting.is_some() || state.selected.is_none() {
                return;
            }
            state.selected = None;
        }
        self.signal.notify();
        self.load_status().await;
    }

    /// Records `action` for the selected member.
    ///
    /// While the call is in flight the member is shown with the status the action
    /// leads to. Either way the panel closes afterwards; on success the action is
    /// merged locally and a full reload follows, since only the service is authoritative.
    pub async fn record_attendance(&self, action: AttendanceAction) -> RecordOutcome {
        let member = {
            let mut state = self.state.lock().await;
            if state.submitting.is_some() {
                warn!("Record request ignored: another one is still in flight.");
                return RecordOutcome::Busy;
            }
            let Some(member) = state.selected.clone() else {
                warn!("Record request ignored: no member selected.");
                return RecordOutcome::NoSelection;
            };
            state.submitting = Some((member.clone(), action));
            member
        };
        self.notices.clear();
        self.signal.notify();

        info!("Recording {} for {}.", action.label(), member);
        let result = self.service.record_attendance(&member, action).await;

        let outcome = {
            let mut state = self.state.lock().await;
            state.submitting = None;
            state.selected = None;
            match result {
                Ok(confirmation) => {
                    let date = format_date(self.clock.today());
                    let time = format_time(self.clock.now_time());
                    merge_local(&mut state.records, &member, action, date, time);
                    self.notices.set(Notice::success(confirmation));
                    RecordOutcome::Recorded
                }
                Err(e) => {
                    error!("Failed to record {} for {}: {}", action.label(), member, e);
                    self.notices.set(Notice::error(format!("エラー: {}", e)));
                    RecordOutcome::Failed
                }
            }
        };
        self.signal.notify();

        if outcome == RecordOutcome::Recorded {
            self.reload_after_write().await;
        }
        outcome
    }

    /// The status shown for `name`, including the optimistic overlay of an
    /// in-flight record call.
    pub async fn status_of(&self, name: &str) -> AttendanceStatus {
        let state = self.state.lock().await;
        if let Some((member, action)) = &state.submitting {
            if member == name {
                return action.resulting_status();
            }
        }
        let statuses = derive_statuses(&state.records);
        status_or_absent(&statuses, name)
    }

    pub async fn records(&self) -> Vec<AttendanceRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn snapshot(&self) -> KioskSnapshot {
        let state = self.state.lock().await;
        let mut statuses = derive_statuses(&state.records);
        if let Some((member, action)) = &state.submitting {
            statuses.insert(member.clone(), action.resulting_status());
        }
        let members = roster_statuses(&self.roster, &statuses)
            .into_iter()
            .map(|(name, status)| MemberTile { name, status })
            .collect();

        KioskSnapshot {
            members,
            phase: state.phase,
            loading: state.phase == LoadPhase::Loading,
            submitting: state.submitting.is_some(),
            selected_member: state.selected.clone(),
            notice: self.notices.current(),
        }
    }

    /// Called when the kiosk screen is left: closes the panel and drops any notice.
    pub async fn unmount(&self) {
        {
            let mut state = self.state.lock().await;
            if state.submitting.is_none() {
                state.selected = None;
            }
        }
        self.notices.clear();
        self.signal.notify();
    }
}

/// Applies a confirmed action to the local copy of today's records.
fn merge_local(
    records: &mut Vec<AttendanceRecord>,
    member: &str,
    action: AttendanceAction,
    date: String,
    time: String,
) {
    match records.iter_mut().rev().find(|record| record.name == member) {
        Some(record) => apply_action(record, action, time),
        None => {
            let mut record = AttendanceRecord {
                name: member.to_string(),
                date,
                check_in_time: None,
                check_out_time: None,
            };
            apply_action(&mut record, action, time);
            records.push(record);
        }
    }
}

fn apply_action(record: &mut AttendanceRecord, action: AttendanceAction, time: String) {
    match action {
        AttendanceAction::CheckIn => {
            record.check_in_time = Some(time);
            record.check_out_time = None;
        }
        AttendanceAction::CheckOut => record.check_out_time = Some(time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_in_after_leaving_reopens_the_record() {
        let mut records = vec![AttendanceRecord {
            name: "熱田 望".to_string(),
            date: "2025-01-10".to_string(),
            check_in_time: Some("09:00:00".to_string()),
            check_out_time: Some("10:00:00".to_string()),
        }];

        merge_local(
            &mut records,
            "熱田 望",
            AttendanceAction::CheckIn,
            "2025-01-10".to_string(),
            "11:00:00".to_string(),
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status(), AttendanceStatus::Attended);
        assert_eq!(records[0].check_in_time.as_deref(), Some("11:00:00"));
    }

    #[test]
    fn first_action_of_the_day_adds_a_record() {
        let mut records = Vec::new();
        merge_local(
            &mut records,
            "若林 空",
            AttendanceAction::CheckOut,
            "2025-01-10".to_string(),
            "17:00:00".to_string(),
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2025-01-10");
        assert_eq!(records[0].status(), AttendanceStatus::Left);
    }
}
