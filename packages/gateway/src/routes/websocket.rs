use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::actions;
use crate::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Per-connection loop: outbound events drain from the registry channel,
/// inbound frames dispatch to action handlers.
async fn handle_socket(state: AppState, mut socket: WebSocket) {
    let connection_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.connections.register(&connection_id, tx);
    info!("WebSocket connection established: {}", connection_id);

    loop {
        tokio::select! {
            Some(json) = rx.recv() => {
                if socket.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        actions::dispatch(&state, &connection_id, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => continue,
                }
            }
        }
    }

    actions::disconnect::handle(&state, &connection_id).await;
}
