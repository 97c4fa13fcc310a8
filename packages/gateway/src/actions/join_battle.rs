use tracing::info;

use crate::protocol::ServerEvent;
use crate::state::AppState;

/// Re-attaches a participant (fresh connection after a reload or drop) and
/// replays the current battle state to them.
pub fn handle(state: &AppState, connection_id: &str, battle_id: &str, user_id: &str) {
    state.connections.set_user(connection_id, user_id);

    let joined = state
        .battles
        .rebind_connection(battle_id, user_id, connection_id)
        .and_then(|battle| {
            let player = state.battles.get_player_view(battle_id, user_id)?;
            Ok((battle, player))
        });

    match joined {
        Ok((battle, player)) => {
            info!("Player {} joined battle {}", user_id, battle_id);
            state
                .connections
                .send(connection_id, &ServerEvent::BattleJoined { battle, player });
        }
        Err(err) => {
            state
                .connections
                .send(connection_id, &ServerEvent::battle_error(&err));
        }
    }
}
