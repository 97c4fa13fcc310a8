use tracing::{debug, error};

use shared::models::challenge::Difficulty;

use crate::protocol::{ErrorCode, ServerEvent};
use crate::state::AppState;

pub async fn handle(state: &AppState, connection_id: &str, user_id: &str, difficulty: Difficulty) {
    state.connections.set_user(connection_id, user_id);

    let rating = match state.profiles.get_rating(user_id).await {
        Ok(rating) => rating,
        Err(err) => {
            error!("Failed to load rating for {}: {}", user_id, err);
            state.connections.send(
                connection_id,
                &ServerEvent::QueueError {
                    code: ErrorCode::TryAgain,
                    message: "Profile lookup failed".to_string(),
                },
            );
            return;
        }
    };

    match state
        .matchmaking
        .enqueue(user_id, connection_id, rating, difficulty)
    {
        Ok(position) => {
            state.connections.send(
                connection_id,
                &ServerEvent::QueueJoined {
                    difficulty,
                    position,
                    rating,
                },
            );
            state.connections.broadcast(&ServerEvent::QueueStatusUpdate {
                status: state.matchmaking.status(),
            });
        }
        Err(err) => {
            debug!("Queue join rejected for {}: {}", user_id, err);
            state
                .connections
                .send(connection_id, &ServerEvent::queue_error(&err));
        }
    }
}
