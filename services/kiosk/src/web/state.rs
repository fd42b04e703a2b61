//! services/kiosk/src/web/state.rs
//!
//! Defines the application's shared state and how a single kiosk screen is built
//! from it.

use crate::config::Config;
use attendance_core::bridge::{RemoteBridge, ScriptHost, ScriptedAttendanceService};
use attendance_core::ports::{AttendanceService, Clock};
use attendance_core::roster::Roster;
use attendance_core::router::ViewRouter;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Direct access to the attendance store, used by the REST endpoints.
    pub service: Arc<dyn AttendanceService>,
    /// The named-function host the kiosk screens talk through.
    pub host: Arc<dyn ScriptHost>,
    pub config: Arc<Config>,
    pub roster: Arc<Roster>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Builds the view state of one freshly connected kiosk screen.
    ///
    /// Every screen reaches the attendance service through its own bridge, the
    /// same way a browser client would.
    pub fn new_screen(&self) -> ViewRouter {
        let bridge = RemoteBridge::new(self.host.clone()).with_timeout(self.config.remote_timeout);
        let remote: Arc<dyn AttendanceService> = Arc::new(ScriptedAttendanceService::new(bridge));
        ViewRouter::new(
            remote,
            self.roster.clone(),
            self.clock.clone(),
            self.config.admin_password.clone(),
        )
    }
}
