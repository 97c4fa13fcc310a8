use crate::protocol::{ErrorCode, ServerEvent};
use crate::state::AppState;

pub fn handle(state: &AppState, connection_id: &str, user_id: &str) {
    match state.matchmaking.queue_position(user_id) {
        Some(position) => {
            state
                .connections
                .send(connection_id, &ServerEvent::QueuePositionUpdate { position });
        }
        None => {
            state.connections.send(
                connection_id,
                &ServerEvent::QueueError {
                    code: ErrorCode::NotFound,
                    message: "Not in queue".to_string(),
                },
            );
        }
    }
}
