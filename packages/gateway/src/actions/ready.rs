use crate::actions::send_to_participants;
use crate::protocol::ServerEvent;
use crate::state::AppState;

pub fn handle(state: &AppState, connection_id: &str, battle_id: &str, user_id: &str) {
    match state.battles.mark_ready(battle_id, user_id) {
        Ok(update) => {
            send_to_participants(
                state,
                &update.snapshot,
                &ServerEvent::PlayerReady {
                    battle_id: battle_id.to_string(),
                    user_id: user_id.to_string(),
                },
            );
            if update.started {
                if let Some(started_at) = update.snapshot.started_at {
                    send_to_participants(
                        state,
                        &update.snapshot,
                        &ServerEvent::BattleStart {
                            battle_id: battle_id.to_string(),
                            started_at,
                            time_limit_secs: update.snapshot.challenge.time_limit_secs,
                        },
                    );
                }
            }
        }
        Err(err) => {
            state
                .connections
                .send(connection_id, &ServerEvent::battle_error(&err));
        }
    }
}
