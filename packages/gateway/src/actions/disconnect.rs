use tracing::{error, info};

use shared::models::battle::BattleStatus;

use crate::actions::send_to_participants;
use crate::protocol::ServerEvent;
use crate::state::AppState;

/// Cleanup after a socket drops: any queue entry goes, and an active battle
/// is cancelled or forfeited on the leaver's behalf. Opponent notification
/// is best effort.
pub async fn handle(state: &AppState, connection_id: &str) {
    let bound_user = state.connections.remove(connection_id);

    if state
        .matchmaking
        .dequeue_by_connection(connection_id)
        .is_some()
    {
        state.connections.broadcast(&ServerEvent::QueueStatusUpdate {
            status: state.matchmaking.status(),
        });
    }

    if let Some(user_id) = bound_user {
        if let Some(battle_id) = state.directory.active_battle(&user_id) {
            match state.battles.leave(&battle_id, &user_id).await {
                Ok(snapshot) => {
                    let event = if snapshot.status == BattleStatus::Completed {
                        ServerEvent::BattleCompleted {
                            battle: snapshot.clone(),
                        }
                    } else {
                        ServerEvent::BattleCancelled {
                            battle: snapshot.clone(),
                        }
                    };
                    send_to_participants(state, &snapshot, &event);
                }
                Err(err) => {
                    error!(
                        "Failed to close battle {} after disconnect of {}: {}",
                        battle_id, user_id, err
                    );
                }
            }
        }
    }

    info!("WebSocket connection closed: {}", connection_id);
}
