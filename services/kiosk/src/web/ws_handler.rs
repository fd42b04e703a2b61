//! services/kiosk/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for one kiosk screen. Each
//! WebSocket connection owns a `ViewRouter`; client messages drive its
//! transitions and every state change is pushed back as a fresh screen.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use attendance_core::router::{ViewRouter, ViewState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!("Kiosk screen {} connected.", connection_id);

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));
    let router = Arc::new(app_state.new_screen());
    // Cancels every task spawned for this connection once it closes.
    let token = CancellationToken::new();

    // --- 1. Render Pump ---
    let render_task = {
        let router = router.clone();
        let ws_sender = ws_sender.clone();
        let token = token.clone();
        let mut changes = router.signal().subscribe();
        tokio::spawn(async move {
            loop {
                let screen = router.screen().await;
                if send_message(&ws_sender, &ServerMessage::Screen { screen }).await.is_err() {
                    debug!("Screen {} stopped accepting updates.", connection_id);
                    break;
                }
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    };

    // The kiosk fetches today's status as soon as it is shown.
    {
        let router = router.clone();
        spawn_action(&token, async move { router.mount_active().await });
    }

    // --- 2. Main Message Loop ---
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_text_message(text.as_str(), &router, &ws_sender, &token).await;
            }
            Ok(Message::Close(_)) => {
                info!("Kiosk screen {} sent close message.", connection_id);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket error on screen {}: {}", connection_id, e);
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    token.cancel();
    render_task.abort();
    router.shutdown().await;
    info!("Kiosk screen {} disconnected.", connection_id);
}

/// Runs a remote-triggering action off the message loop so the next message can
/// reach the view models while it is in flight.
fn spawn_action<F>(token: &CancellationToken, action: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = action => {}
        }
    });
}

async fn send_message(ws_sender: &WsSender, message: &ServerMessage) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialise server message: {}", e);
            return Ok(());
        }
    };
    ws_sender.lock().await.send(Message::Text(json.into())).await
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: &str,
    router: &Arc<ViewRouter>,
    ws_sender: &WsSender,
    token: &CancellationToken,
) {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            let reply = ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            };
            if send_message(ws_sender, &reply).await.is_err() {
                error!("Failed to send error message.");
            }
            return;
        }
    };

    match client_msg {
        ClientMessage::SelectMember { name } => {
            if on_kiosk(router).await {
                router.kiosk().select_member(&name).await;
            }
        }
        ClientMessage::Record { action } => {
            if on_kiosk(router).await {
                let kiosk = router.kiosk().clone();
                spawn_action(token, async move {
                    kiosk.record_attendance(action).await;
                });
            }
        }
        ClientMessage::Back => {
            if on_kiosk(router).await {
                let kiosk = router.kiosk().clone();
                spawn_action(token, async move { kiosk.cancel_selection().await });
            }
        }
        ClientMessage::Dismiss => match router.dashboard().await {
            Some(dashboard) => dashboard.notices().clear(),
            None => router.kiosk().notices().clear(),
        },
        ClientMessage::Refresh => {
            let router = router.clone();
            spawn_action(token, async move { router.mount_active().await });
        }
        ClientMessage::AdminClick => {
            router.admin_click().await;
        }
        ClientMessage::LoginBack => {
            if router.login_back().await {
                let router = router.clone();
                spawn_action(token, async move { router.mount_active().await });
            }
        }
        ClientMessage::PasswordInput { value } => {
            router.set_password_input(&value).await;
        }
        ClientMessage::SubmitPassword => {
            if router.submit_password().await {
                let router = router.clone();
                spawn_action(token, async move { router.mount_active().await });
            }
        }
        ClientMessage::OpenDashboard => {
            router.open_dashboard().await;
            let router = router.clone();
            spawn_action(token, async move { router.mount_active().await });
        }
        ClientMessage::ChangeDate { date } => match router.dashboard().await {
            Some(dashboard) => {
                spawn_action(token, async move { dashboard.change_date(date).await });
            }
            None => warn!("Date change ignored outside the dashboard."),
        },
        ClientMessage::Export => match router.dashboard().await {
            Some(dashboard) => {
                if let Some(export) = dashboard.export().await {
                    let download = ServerMessage::Download {
                        filename: export.filename,
                        content: export.content,
                    };
                    if send_message(ws_sender, &download).await.is_err() {
                        error!("Failed to send the CSV download.");
                    }
                }
            }
            None => warn!("Export ignored outside the dashboard."),
        },
        ClientMessage::Logout => {
            if router.logout().await {
                let router = router.clone();
                spawn_action(token, async move { router.mount_active().await });
            }
        }
    }
}

/// Kiosk actions only make sense while the kiosk is the active view.
async fn on_kiosk(router: &ViewRouter) -> bool {
    let view = router.view().await;
    if view != ViewState::User {
        warn!("Kiosk action ignored while the {:?} view is active.", view);
        return false;
    }
    true
}
