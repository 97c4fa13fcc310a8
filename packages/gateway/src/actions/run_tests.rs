use crate::protocol::ServerEvent;
use crate::state::AppState;

/// Runs the visible cases only, for the in-editor "run" button. Results go
/// to the requester alone.
pub async fn handle(
    state: &AppState,
    connection_id: &str,
    battle_id: &str,
    user_id: &str,
    code: &str,
) {
    match state.battles.run_visible_tests(battle_id, user_id, code).await {
        Ok(report) => {
            state.connections.send(
                connection_id,
                &ServerEvent::RunResult {
                    battle_id: battle_id.to_string(),
                    report,
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
