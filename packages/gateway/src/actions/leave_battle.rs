use shared::models::battle::BattleStatus;

use crate::actions::send_to_participants;
use crate::protocol::ServerEvent;
use crate::state::AppState;

/// Explicit exit: cancels a battle that has not started, forfeits one that
/// has.
pub async fn handle(state: &AppState, connection_id: &str, battle_id: &str, user_id: &str) {
    match state.battles.leave(battle_id, user_id).await {
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
            state
                .connections
                .send(connection_id, &ServerEvent::battle_error(&err));
        }
    }
}
