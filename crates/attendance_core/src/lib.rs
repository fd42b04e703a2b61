pub mod admin;
pub mod bridge;
pub mod domain;
pub mod export;
pub mod kiosk;
pub mod notice;
pub mod ports;
pub mod roster;
pub mod router;
pub mod signal;
pub mod status;

pub use admin::{AdminGate, DashboardSnapshot, DashboardViewModel, LoginSnapshot};
pub use bridge::{HostFailure, RemoteBridge, ScriptHost, ScriptedAttendanceService};
pub use domain::{AttendanceAction, AttendanceRecord, AttendanceStatus, CsvExport, Notice, NoticeKind, StatusMap};
pub use kiosk::{KioskSnapshot, KioskViewModel, LoadPhase, RecordOutcome};
pub use notice::NoticeBoard;
pub use ports::{AttendanceService, Clock, LocalClock, PortError, PortResult};
pub use roster::Roster;
pub use router::{Screen, ViewRouter, ViewState};
pub use signal::StateSignal;
pub use status::derive_statuses;
