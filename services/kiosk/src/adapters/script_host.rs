//! services/kiosk/src/adapters/script_host.rs
//!
//! An in-process script host. Named function calls from the bridge are dispatched
//! to an `AttendanceService` on a spawned task, and the outcome is reported
//! through exactly one of the two handlers.

use attendance_core::bridge::{functions, FailureHandler, HostFailure, ScriptHost, SuccessHandler};
use attendance_core::domain::AttendanceAction;
use attendance_core::ports::{AttendanceService, PortError};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct LocalScriptHost {
    service: Arc<dyn AttendanceService>,
}

impl LocalScriptHost {
    pub fn new(service: Arc<dyn AttendanceService>) -> Self {
        Self { service }
    }
}

impl ScriptHost for LocalScriptHost {
    fn run(
        &self,
        function: &str,
        args: Vec<Value>,
        on_success: SuccessHandler,
        on_failure: FailureHandler,
    ) {
        let service = self.service.clone();
        let function = function.to_string();
        tokio::spawn(async move {
            debug!("Dispatching script function '{}'.", function);
            match dispatch(service.as_ref(), &function, &args).await {
                Ok(value) => on_success(value),
                Err(failure) => {
                    error!("Script function '{}' failed: {}", function, failure.message);
                    on_failure(failure)
                }
            }
        });
    }
}

async fn dispatch(
    service: &dyn AttendanceService,
    function: &str,
    args: &[Value],
) -> Result<Value, HostFailure> {
    match function {
        functions::GET_TODAY_STATUS => to_value(service.get_today_status().await),
        functions::RECORD_ATTENDANCE => {
            let name: String = arg(args, 0, function)?;
            let action: AttendanceAction = arg(args, 1, function)?;
            to_value(service.record_attendance(&name, action).await)
        }
        functions::GET_ATTENDANCE_FOR_DATE => {
            let raw: String = arg(args, 0, function)?;
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| HostFailure::new(format!("Invalid date '{}': {}", raw, e)))?;
            to_value(service.get_attendance_for_date(date).await)
        }
        unknown => Err(HostFailure::new(format!(
            "Script function not found: {}",
            unknown
        ))),
    }
}

/// Reads positional argument `index` as a `T`.
fn arg<T: DeserializeOwned>(args: &[Value], index: usize, function: &str) -> Result<T, HostFailure> {
    let value = args.get(index).cloned().ok_or_else(|| {
        HostFailure::new(format!("{} expects an argument at position {}", function, index))
    })?;
    serde_json::from_value(value).map_err(|e| {
        HostFailure::new(format!("Invalid argument {} for {}: {}", index, function, e))
    })
}

fn to_value<T: Serialize>(result: Result<T, PortError>) -> Result<Value, HostFailure> {
    let payload = result.map_err(|e| HostFailure::new(e.to_string()))?;
    serde_json::to_value(payload).map_err(|e| HostFailure::new(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use attendance_core::bridge::{RemoteBridge, ScriptedAttendanceService};
    use attendance_core::domain::AttendanceRecord;
    use attendance_core::ports::PortResult;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        writes: Mutex<Vec<(String, AttendanceAction)>>,
        dates: Mutex<Vec<NaiveDate>>,
    }

    #[async_trait]
    impl AttendanceService for RecordingService {
        async fn get_today_status(&self) -> PortResult<Vec<AttendanceRecord>> {
            Ok(vec![AttendanceRecord {
                name: "熱田 望".to_string(),
                date: "2025-01-10".to_string(),
                check_in_time: Some("09:00:00".to_string()),
                check_out_time: None,
            }])
        }

        async fn record_attendance(&self, name: &str, action: AttendanceAction) -> PortResult<String> {
            if name == "unknown" {
                return Err(PortError::Remote(format!("名簿に存在しないメンバーです: {}", name)));
            }
            self.writes.lock().unwrap().push((name.to_string(), action));
            Ok(format!("{}さんの{}を記録しました (09:00:00)", name, action.label()))
        }

        async fn get_attendance_for_date(&self, date: NaiveDate) -> PortResult<Vec<AttendanceRecord>> {
            self.dates.lock().unwrap().push(date);
            Ok(Vec::new())
        }
    }

    fn scripted(service: Arc<RecordingService>) -> ScriptedAttendanceService {
        let host = Arc::new(LocalScriptHost::new(service));
        ScriptedAttendanceService::new(RemoteBridge::new(host))
    }

    #[tokio::test]
    async fn calls_travel_through_the_bridge_and_back() {
        let service = Arc::new(RecordingService::default());
        let remote = scripted(service.clone());

        let today = remote.get_today_status().await.unwrap();
        assert_eq!(today.len(), 1);

        let text = remote
            .record_attendance("熱田 望", AttendanceAction::CheckOut)
            .await
            .unwrap();
        assert_eq!(text, "熱田 望さんの退室を記録しました (09:00:00)");
        assert_eq!(
            service.writes.lock().unwrap().as_slice(),
            &[("熱田 望".to_string(), AttendanceAction::CheckOut)]
        );

        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        remote.get_attendance_for_date(date).await.unwrap();
        assert_eq!(service.dates.lock().unwrap().as_slice(), &[date]);
    }

    #[tokio::test]
    async fn service_failures_arrive_as_remote_errors() {
        let remote = scripted(Arc::new(RecordingService::default()));

        let err = remote
            .record_attendance("unknown", AttendanceAction::CheckIn)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PortError::Remote("名簿に存在しないメンバーです: unknown".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_functions_fail_through_the_failure_handler() {
        let host = Arc::new(LocalScriptHost::new(Arc::new(RecordingService::default())));
        let bridge = RemoteBridge::new(host);

        let err = bridge.invoke::<Value>("deleteEverything", vec![]).await.unwrap_err();

        assert_eq!(
            err,
            PortError::Remote("Script function not found: deleteEverything".to_string())
        );
    }

    #[tokio::test]
    async fn bad_arguments_are_reported_not_panicked() {
        let host = Arc::new(LocalScriptHost::new(Arc::new(RecordingService::default())));
        let bridge = RemoteBridge::new(host);

        let err = bridge
            .invoke::<String>(functions::RECORD_ATTENDANCE, vec![json!("熱田 望"), json!("休憩")])
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Remote(message) if message.starts_with("Invalid argument 1")));

        let err = bridge
            .invoke::<Vec<AttendanceRecord>>(functions::GET_ATTENDANCE_FOR_DATE, vec![json!("10/01/2025")])
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Remote(message) if message.starts_with("Invalid date")));
    }
}
