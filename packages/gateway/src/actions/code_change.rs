use shared::models::battle::{BattleSnapshot, Language};

use crate::protocol::ServerEvent;
use crate::state::AppState;

/// Live code sync. The opponent only ever learns the length, never the
/// content.
pub fn handle_code(
    state: &AppState,
    connection_id: &str,
    battle_id: &str,
    user_id: &str,
    code: &str,
) {
    let updated = state
        .battles
        .update_code(battle_id, user_id, code)
        .and_then(|_| state.battles.get_snapshot(battle_id));

    match updated {
        Ok(snapshot) => {
            notify_opponent(
                state,
                &snapshot,
                user_id,
                &ServerEvent::OpponentCode {
                    battle_id: battle_id.to_string(),
                    user_id: user_id.to_string(),
                    code_length: code.chars().count(),
                },
            );
        }
        Err(err) => {
            state
                .connections
                .send(connection_id, &ServerEvent::battle_error(&err));
        }
    }
}

pub fn handle_language(
    state: &AppState,
    connection_id: &str,
    battle_id: &str,
    user_id: &str,
    language: Language,
) {
    let updated = state
        .battles
        .update_language(battle_id, user_id, language)
        .and_then(|_| state.battles.get_snapshot(battle_id));

    match updated {
        Ok(snapshot) => {
            notify_opponent(
                state,
                &snapshot,
                user_id,
                &ServerEvent::OpponentLanguage {
                    battle_id: battle_id.to_string(),
                    user_id: user_id.to_string(),
                    language,
                },
            );
        }
        Err(err) => {
            state
                .connections
                .send(connection_id, &ServerEvent::battle_error(&err));
        }
    }
}

fn notify_opponent(state: &AppState, snapshot: &BattleSnapshot, user_id: &str, event: &ServerEvent) {
    for player in &snapshot.players {
        if player.user_id != user_id {
            state.connections.send_to_user(&player.user_id, event);
        }
    }
}
