//! services/kiosk/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use attendance_core::domain::{AttendanceAction, AttendanceRecord};
use attendance_core::ports::PortError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        today_attendance_handler,
        attendance_for_date_handler,
        record_attendance_handler,
        list_roster_handler,
    ),
    components(
        schemas(AttendanceRecordResponse, RecordRequest, RecordResponse, ActionLabel)
    ),
    tags(
        (name = "Attendance Kiosk API", description = "Read and record club attendance.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One member's record for one day.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordResponse {
    name: String,
    /// `YYYY-MM-DD`
    date: String,
    /// `HH:MM:SS`, absent until the member checks in.
    check_in_time: Option<String>,
    check_out_time: Option<String>,
}

impl From<AttendanceRecord> for AttendanceRecordResponse {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            name: record.name,
            date: record.date,
            check_in_time: record.check_in_time,
            check_out_time: record.check_out_time,
        }
    }
}

/// The action labels the attendance service understands.
#[derive(Deserialize, ToSchema, Clone, Copy)]
pub enum ActionLabel {
    #[serde(rename = "出席")]
    CheckIn,
    #[serde(rename = "退室")]
    CheckOut,
}

impl From<ActionLabel> for AttendanceAction {
    fn from(label: ActionLabel) -> Self {
        match label {
            ActionLabel::CheckIn => AttendanceAction::CheckIn,
            ActionLabel::CheckOut => AttendanceAction::CheckOut,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RecordRequest {
    name: String,
    action: ActionLabel,
}

/// The confirmation text produced by the attendance service.
#[derive(Serialize, ToSchema)]
pub struct RecordResponse {
    message: String,
}

/// Maps a port failure onto an HTTP status and a message fit for the client.
fn port_error_response(e: PortError) -> (StatusCode, String) {
    let status = match &e {
        PortError::Remote(_) => StatusCode::BAD_REQUEST,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
        PortError::Malformed { .. } | PortError::Abandoned(_) | PortError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

fn records_response(records: Vec<AttendanceRecord>) -> Json<Vec<AttendanceRecordResponse>> {
    Json(records.into_iter().map(AttendanceRecordResponse::from).collect())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List today's attendance records.
#[utoipa::path(
    get,
    path = "/attendance/today",
    responses(
        (status = 200, description = "Today's records", body = [AttendanceRecordResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn today_attendance_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = app_state.service.get_today_status().await.map_err(|e| {
        error!("Failed to load today's attendance: {:?}", e);
        port_error_response(e)
    })?;
    Ok(records_response(records))
}

/// List the attendance records of one day.
#[utoipa::path(
    get,
    path = "/attendance/{date}",
    params(
        ("date" = String, Path, description = "The day to list, as YYYY-MM-DD.")
    ),
    responses(
        (status = 200, description = "Records of the day", body = [AttendanceRecordResponse]),
        (status = 400, description = "The date is not YYYY-MM-DD"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn attendance_for_date_handler(
    State(app_state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        warn!("Rejected malformed date '{}'.", date);
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid date '{}', expected YYYY-MM-DD", date),
        )
    })?;
    let records = app_state
        .service
        .get_attendance_for_date(date)
        .await
        .map_err(|e| {
            error!("Failed to load attendance for {}: {:?}", date, e);
            port_error_response(e)
        })?;
    Ok(records_response(records))
}

/// Record a check-in or check-out for a roster member.
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = RecordRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = RecordResponse),
        (status = 400, description = "Unknown member or invalid action"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn record_attendance_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<RecordRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let message = app_state
        .service
        .record_attendance(&request.name, request.action.into())
        .await
        .map_err(|e| {
            error!("Failed to record attendance for {}: {:?}", request.name, e);
            port_error_response(e)
        })?;
    Ok((StatusCode::CREATED, Json(RecordResponse { message })))
}

/// List the roster in display order.
#[utoipa::path(
    get,
    path = "/roster",
    responses(
        (status = 200, description = "Member names in display order", body = [String])
    )
)]
pub async fn list_roster_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.roster.iter().map(str::to_string).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_http_statuses() {
        let (status, message) =
            port_error_response(PortError::Remote("名簿に存在しないメンバーです: x".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "名簿に存在しないメンバーです: x");

        let (status, _) = port_error_response(PortError::TimedOut("getTodayStatus".to_string()));
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

        let (status, _) = port_error_response(PortError::Unexpected("pool closed".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn record_requests_accept_the_wire_labels() {
        let request: RecordRequest =
            serde_json::from_str(r#"{"name":"熱田 望","action":"出席"}"#).unwrap();
        assert_eq!(AttendanceAction::from(request.action), AttendanceAction::CheckIn);
        assert!(serde_json::from_str::<RecordRequest>(r#"{"name":"熱田 望","action":"in"}"#).is_err());
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for path in ["/attendance/today", "/attendance/{date}", "/attendance", "/roster"] {
            assert!(paths.iter().any(|p| p.as_str() == path), "missing {}", path);
        }
    }
}
