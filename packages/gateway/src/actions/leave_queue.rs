use crate::protocol::{ErrorCode, ServerEvent};
use crate::state::AppState;

pub fn handle(state: &AppState, connection_id: &str, user_id: &str) {
    if state.matchmaking.dequeue(user_id) {
        state.connections.send(
            connection_id,
            &ServerEvent::QueueLeft {
                user_id: user_id.to_string(),
            },
        );
        state.connections.broadcast(&ServerEvent::QueueStatusUpdate {
            status: state.matchmaking.status(),
        });
    } else {
        state.connections.send(
            connection_id,
            &ServerEvent::QueueError {
                code: ErrorCode::NotFound,
                message: "Not in queue".to_string(),
            },
        );
    }
}
