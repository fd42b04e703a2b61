//! crates/attendance_core/src/router.rs
//!
//! Top-level view state of one kiosk screen: the public kiosk, the admin login,
//! or the admin dashboard. The authentication flag, not the view alone, decides
//! whether the dashboard is shown.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::admin::{AdminGate, DashboardSnapshot, DashboardViewModel, LoginSnapshot};
use crate::kiosk::{KioskSnapshot, KioskViewModel};
use crate::ports::{AttendanceService, Clock};
use crate::roster::Roster;
use crate::signal::StateSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    User,
    AdminLogin,
    AdminDashboard,
}

/// What is on screen right now, with the data to draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Screen {
    Kiosk(KioskSnapshot),
    AdminLogin(LoginSnapshot),
    AdminDashboard(DashboardSnapshot),
}

struct RouterState {
    view: ViewState,
    authenticated: bool,
    gate: AdminGate,
    /// Present only while an authenticated dashboard is mounted.
    dashboard: Option<DashboardViewModel>,
}

impl RouterState {
    fn effective_view(&self) -> ViewState {
        match (self.view, self.authenticated) {
            (ViewState::AdminDashboard, false) => ViewState::AdminLogin,
            (view, _) => view,
        }
    }
}

/// Owns the view models of one screen and the transitions between them.
pub struct ViewRouter {
    service: Arc<dyn AttendanceService>,
    clock: Arc<dyn Clock>,
    signal: StateSignal,
    kiosk: KioskViewModel,
    state: Mutex<RouterState>,
}

impl ViewRouter {
    pub fn new(
        service: Arc<dyn AttendanceService>,
        roster: Arc<Roster>,
        clock: Arc<dyn Clock>,
        admin_secret: impl Into<String>,
    ) -> Self {
        let signal = StateSignal::new();
        let kiosk = KioskViewModel::new(service.clone(), roster, clock.clone(), signal.clone());
        Self {
            service,
            clock,
            signal,
            kiosk,
            state: Mutex::new(RouterState {
                view: ViewState::User,
                authenticated: false,
                gate: AdminGate::new(admin_secret),
                dashboard: None,
            }),
        }
    }

    /// Bumped whenever anything on screen may have changed.
    pub fn signal(&self) -> &StateSignal {
        &self.signal
    }

    pub fn kiosk(&self) -> &KioskViewModel {
        &self.kiosk
    }

    pub async fn view(&self) -> ViewState {
        self.state.lock().await.effective_view()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.authenticated
    }

    /// The dashboard, if it is the screen currently shown.
    pub async fn dashboard(&self) -> Option<DashboardViewModel> {
        let state = self.state.lock().await;
        if state.effective_view() == ViewState::AdminDashboard {
            state.dashboard.clone()
        } else {
            None
        }
    }

    /// Loads the data of whichever screen is shown. Call after a transition.
    pub async fn mount_active(&self) {
        match self.view().await {
            ViewState::User => self.kiosk.load_status().await,
            ViewState::AdminDashboard => {
                if let Some(dashboard) = self.dashboard().await {
                    dashboard.refresh().await;
                }
            }
            ViewState::AdminLogin => {}
        }
    }

    /// `user --adminClick--> adminLogin`
    pub async fn admin_click(&self) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.effective_view() != ViewState::User {
                return false;
            }
            state.view = ViewState::AdminLogin;
            state.gate.reset();
        }
        self.kiosk.unmount().await;
        info!("Switched to the admin login.");
        self.signal.notify();
        true
    }

    /// `adminLogin --back--> user`
    pub async fn login_back(&self) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.effective_view() != ViewState::AdminLogin {
                return false;
            }
            state.view = ViewState::User;
            state.gate.reset();
        }
        self.signal.notify();
        true
    }

    pub async fn set_password_input(&self, value: &str) {
        {
            let mut state = self.state.lock().await;
            if state.effective_view() != ViewState::AdminLogin {
                return;
            }
            state.gate.set_candidate(value);
        }
        self.signal.notify();
    }

    /// `adminLogin --loginSuccess--> adminDashboard`. Returns whether the password matched.
    pub async fn submit_password(&self) -> bool {
        let accepted = {
            let mut state = self.state.lock().await;
            if state.effective_view() != ViewState::AdminLogin {
                return false;
            }
            let accepted = state.gate.submit();
            if accepted {
                state.authenticated = true;
                state.view = ViewState::AdminDashboard;
                state.dashboard = Some(DashboardViewModel::new(
                    self.service.clone(),
                    self.clock.today(),
                    self.signal.clone(),
                ));
            }
            accepted
        };
        self.signal.notify();
        accepted
    }

    /// Asks for the dashboard directly. Without authentication this shows the login.
    pub async fn open_dashboard(&self) {
        {
            let mut state = self.state.lock().await;
            state.view = ViewState::AdminDashboard;
            if state.authenticated && state.dashboard.is_none() {
                state.dashboard = Some(DashboardViewModel::new(
                    self.service.clone(),
                    self.clock.today(),
                    self.signal.clone(),
                ));
            } else if !state.authenticated {
                warn!("Dashboard requested without authentication, showing login.");
            }
        }
        self.kiosk.unmount().await;
        self.signal.notify();
    }

    /// `adminDashboard --logout--> user`. Dashboard state is discarded.
    pub async fn logout(&self) -> bool {
        let dashboard = {
            let mut state = self.state.lock().await;
            if state.effective_view() != ViewState::AdminDashboard {
                return false;
            }
            state.authenticated = false;
            state.view = ViewState::User;
            state.gate.reset();
            state.dashboard.take()
        };
        if let Some(dashboard) = dashboard {
            dashboard.teardown().await;
        }
        info!("Administrator logged out.");
        self.signal.notify();
        true
    }

    pub async fn screen(&self) -> Screen {
        let (view, login, dashboard) = {
            let state = self.state.lock().await;
            (
                state.effective_view(),
                state.gate.snapshot(),
                state.dashboard.clone(),
            )
        };
        match (view, dashboard) {
            (ViewState::User, _) => Screen::Kiosk(self.kiosk.snapshot().await),
            (ViewState::AdminDashboard, Some(dashboard)) => {
                Screen::AdminDashboard(dashboard.snapshot().await)
            }
            _ => Screen::AdminLogin(login),
        }
    }

    /// Releases timers and detaches the dashboard when the screen goes away.
    pub async fn shutdown(&self) {
        let dashboard = self.state.lock().await.dashboard.take();
        if let Some(dashboard) = dashboard {
            dashboard.teardown().await;
        }
        self.kiosk.notices().clear();
    }
}
