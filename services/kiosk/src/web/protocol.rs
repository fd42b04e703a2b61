//! services/kiosk/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between a kiosk screen (the browser
//! client) and the server.

use attendance_core::domain::AttendanceAction;
use attendance_core::router::Screen;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A member tile was tapped; opens the action panel.
    SelectMember { name: String },

    /// One of the two action buttons in the panel was pressed.
    Record { action: AttendanceAction },

    /// The panel was closed without recording anything.
    Back,

    /// Drops the notice currently shown.
    Dismiss,

    /// Reloads whatever the active view shows.
    Refresh,

    AdminClick,
    LoginBack,
    PasswordInput { value: String },
    SubmitPassword,

    /// Asks for the dashboard directly. Without a login this lands on the login view.
    OpenDashboard,

    ChangeDate { date: NaiveDate },
    Export,
    Logout,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full state of the active view. Sent after every change.
    Screen { screen: Screen },

    /// A CSV file the client should offer as a download.
    Download { filename: String, content: String },

    /// The client sent something the server could not understand.
    Error { message: String },
}
