//! Shared fakes for the view model integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use attendance_core::{AttendanceAction, AttendanceRecord, AttendanceService, Clock, PortError, PortResult};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        today()
    }

    fn now_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }
}

pub fn record(name: &str, date: &str, check_in: Option<&str>, check_out: Option<&str>) -> AttendanceRecord {
    AttendanceRecord {
        name: name.to_string(),
        date: date.to_string(),
        check_in_time: check_in.map(str::to_string),
        check_out_time: check_out.map(str::to_string),
    }
}

/// An in-memory attendance service that can be told to fail or to hold calls.
#[derive(Default)]
pub struct FakeService {
    days: Mutex<HashMap<NaiveDate, Vec<AttendanceRecord>>>,
    failure: Mutex<Option<String>>,
    read_gate: Option<Arc<Semaphore>>,
    write_gate: Option<Arc<Semaphore>>,
    pub today_calls: AtomicUsize,
    pub record_calls: AtomicUsize,
    pub dated_calls: Mutex<Vec<NaiveDate>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every call waits for a permit from `release_reads` / `release_writes`.
    pub fn held() -> Arc<Self> {
        Arc::new(Self {
            read_gate: Some(Arc::new(Semaphore::new(0))),
            write_gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        })
    }

    pub fn release_reads(&self, calls: usize) {
        if let Some(gate) = &self.read_gate {
            gate.add_permits(calls);
        }
    }

    pub fn release_writes(&self, calls: usize) {
        if let Some(gate) = &self.write_gate {
            gate.add_permits(calls);
        }
    }

    pub fn seed(&self, date: NaiveDate, records: Vec<AttendanceRecord>) {
        self.days.lock().unwrap().insert(date, records);
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    async fn pass(&self, gate: &Option<Arc<Semaphore>>) -> PortResult<()> {
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(PortError::Remote(message)),
            None => Ok(()),
        }
    }

    fn day(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
        self.days.lock().unwrap().get(&date).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AttendanceService for FakeService {
    async fn get_today_status(&self) -> PortResult<Vec<AttendanceRecord>> {
        self.today_calls.fetch_add(1, Ordering::SeqCst);
        self.pass(&self.read_gate).await?;
        Ok(self.day(today()))
    }

    async fn record_attendance(&self, name: &str, action: AttendanceAction) -> PortResult<String> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        self.pass(&self.write_gate).await?;
        let mut days = self.days.lock().unwrap();
        let records = days.entry(today()).or_default();
        let index = match records.iter().position(|r| r.name == name) {
            Some(index) => index,
            None => {
                records.push(record(name, "2025-01-10", None, None));
                records.len() - 1
            }
        };
        let entry = &mut records[index];
        match action {
            AttendanceAction::CheckIn => {
                entry.check_in_time = Some("09:00:00".to_string());
                entry.check_out_time = None;
            }
            AttendanceAction::CheckOut => entry.check_out_time = Some("17:00:00".to_string()),
        }
        Ok(format!("{}さんの{}を記録しました", name, action.label()))
    }

    async fn get_attendance_for_date(&self, date: NaiveDate) -> PortResult<Vec<AttendanceRecord>> {
        self.dated_calls.lock().unwrap().push(date);
        self.pass(&self.read_gate).await?;
        Ok(self.day(date))
    }
}

/// Lets spawned tasks run until they block; relies on a paused test clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
