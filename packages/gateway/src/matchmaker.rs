use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use shared::services::matchmaking_service::MatchPairing;

use crate::protocol::{OpponentInfo, ServerEvent};
use crate::state::AppState;

/// Periodic match check, the same pairing path regardless of when players
/// joined.
pub fn spawn(state: AppState, interval_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            ticker.tick().await;
            run_once(&state).await;
        }
    })
}

pub async fn run_once(state: &AppState) {
    let pairings = state.matchmaking.check_all_buckets().await;
    if pairings.is_empty() {
        return;
    }
    for pairing in &pairings {
        announce(state, pairing);
    }
    state.connections.broadcast(&ServerEvent::QueueStatusUpdate {
        status: state.matchmaking.status(),
    });
}

fn announce(state: &AppState, pairing: &MatchPairing) {
    info!(
        "Announcing battle {} to {} and {}",
        pairing.battle.battle_id, pairing.player1.user_id, pairing.player2.user_id
    );
    for (player, opponent) in [
        (&pairing.player1, &pairing.player2),
        (&pairing.player2, &pairing.player1),
    ] {
        state.connections.send(
            &player.connection_id,
            &ServerEvent::Matched {
                battle: pairing.battle.clone(),
                opponent: OpponentInfo {
                    user_id: opponent.user_id.clone(),
                    rating: opponent.rating,
                },
            },
        );
    }
}
