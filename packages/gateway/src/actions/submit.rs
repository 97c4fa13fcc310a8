use shared::models::battle::BattleStatus;

use crate::actions::send_to_participants;
use crate::protocol::ServerEvent;
use crate::state::AppState;

pub async fn handle(
    state: &AppState,
    connection_id: &str,
    battle_id: &str,
    user_id: &str,
    code: &str,
) {
    match state.battles.submit(battle_id, user_id, code).await {
        Ok(outcome) => {
            send_to_participants(
                state,
                &outcome.snapshot,
                &ServerEvent::PlayerSubmitted {
                    battle_id: battle_id.to_string(),
                    user_id: user_id.to_string(),
                    tests_passed: outcome.result.tests_passed,
                    total_tests: outcome.result.total_tests,
                },
            );
            if outcome.snapshot.status == BattleStatus::Completed {
                send_to_participants(
                    state,
                    &outcome.snapshot,
                    &ServerEvent::BattleCompleted {
                        battle: outcome.snapshot.clone(),
                    },
                );
            }
        }
        Err(err) => {
            state
                .connections
                .send(connection_id, &ServerEvent::battle_error(&err));
        }
    }
}
