//! crates/attendance_core/src/bridge.rs
//!
//! Adapts a callback-style script host ("run this named function, then call one of
//! these two handlers") into single-settlement async calls, and builds the
//! `AttendanceService` port on top of it.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::domain::{AttendanceAction, AttendanceRecord};
use crate::ports::{format_date, AttendanceService, PortError, PortResult};

/// Names of the server functions the kiosk calls.
pub mod functions {
    pub const GET_TODAY_STATUS: &str = "getTodayStatus";
    pub const RECORD_ATTENDANCE: &str = "recordAttendance";
    pub const GET_ATTENDANCE_FOR_DATE: &str = "getAttendanceForDate";
}

/// The failure value a host hands to the failure handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFailure {
    pub message: String,
}

impl HostFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type SuccessHandler = Box<dyn FnOnce(Value) + Send + 'static>;
pub type FailureHandler = Box<dyn FnOnce(HostFailure) + Send + 'static>;

/// A fire-and-forget function runner that reports back through callbacks.
///
/// A well-behaved host calls exactly one of the two handlers, exactly once.
pub trait ScriptHost: Send + Sync {
    fn run(
        &self,
        function: &str,
        args: Vec<Value>,
        on_success: SuccessHandler,
        on_failure: FailureHandler,
    );
}

type Settlement = Result<Value, HostFailure>;
type SettlementSlot = Arc<Mutex<Option<oneshot::Sender<Settlement>>>>;

/// Hands the outcome to the waiting caller if nobody has settled the call yet.
fn settle(slot: &SettlementSlot, function: &str, outcome: Settlement) {
    let sender = match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    match sender {
        // The receiver may already be gone (timed out or dropped); nothing to do then.
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => trace!(function, "ignoring callback for an already settled call"),
    }
}

/// Converts host callbacks into awaitable results. Cheap to clone.
#[derive(Clone)]
pub struct RemoteBridge {
    host: Arc<dyn ScriptHost>,
    timeout: Option<Duration>,
}

impl RemoteBridge {
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self {
            host,
            timeout: None,
        }
    }

    /// Settles calls the host never answers as `PortError::TimedOut`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Runs `function` on the host once and waits for whichever handler fires first.
    ///
    /// The payload is deserialised into `T`; no other validation happens here.
    pub async fn invoke<T: DeserializeOwned>(&self, function: &str, args: Vec<Value>) -> PortResult<T> {
        let (tx, rx) = oneshot::channel();
        let slot: SettlementSlot = Arc::new(Mutex::new(Some(tx)));

        let on_success: SuccessHandler = {
            let slot = slot.clone();
            let function = function.to_string();
            Box::new(move |value| settle(&slot, &function, Ok(value)))
        };
        let on_failure: FailureHandler = {
            let function = function.to_string();
            Box::new(move |failure| settle(&slot, &function, Err(failure)))
        };

        debug!(function, args = args.len(), "invoking remote function");
        self.host.run(function, args, on_success, on_failure);

        let received = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received,
                Err(_) => {
                    warn!(function, ?limit, "remote function did not answer in time");
                    return Err(PortError::TimedOut(function.to_string()));
                }
            },
            None => rx.await,
        };

        match received {
            Ok(Ok(value)) => serde_json::from_value(value).map_err(|e| PortError::Malformed {
                function: function.to_string(),
                reason: e.to_string(),
            }),
            Ok(Err(failure)) => Err(PortError::Remote(failure.message)),
            // Both handlers were dropped without being called.
            Err(_) => Err(PortError::Abandoned(function.to_string())),
        }
    }
}

//=========================================================================================
// `AttendanceService` over the bridge
//=========================================================================================

/// Reaches the remote attendance service through a [`RemoteBridge`].
#[derive(Clone)]
pub struct ScriptedAttendanceService {
    bridge: RemoteBridge,
}

impl ScriptedAttendanceService {
    pub fn new(bridge: RemoteBridge) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl AttendanceService for ScriptedAttendanceService {
    async fn get_today_status(&self) -> PortResult<Vec<AttendanceRecord>> {
        self.bridge
            .invoke(functions::GET_TODAY_STATUS, Vec::new())
            .await
    }

    async fn record_attendance(&self, name: &str, action: AttendanceAction) -> PortResult<String> {
        self.bridge
            .invoke(
                functions::RECORD_ATTENDANCE,
                vec![json!(name), json!(action)],
            )
            .await
    }

    async fn get_attendance_for_date(&self, date: NaiveDate) -> PortResult<Vec<AttendanceRecord>> {
        self.bridge
            .invoke(
                functions::GET_ATTENDANCE_FOR_DATE,
                vec![json!(format_date(date))],
            )
            .await
    }
}
