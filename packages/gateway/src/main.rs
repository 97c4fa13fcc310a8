use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

pub mod actions;
pub mod config;
pub mod connections;
pub mod judge;
pub mod matchmaker;
pub mod protocol;
pub mod routes;
pub mod seed;
pub mod state;

use shared::repositories::challenge_repository::InMemoryChallengeRepository;
use shared::repositories::profile_repository::InMemoryProfileRepository;
use shared::services::battle_service::BattleService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::session_directory::SessionDirectory;

use connections::ConnectionRegistry;
use judge::HttpJudgeClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let config = config::GatewayConfig::from_env();

    let directory = Arc::new(SessionDirectory::new());
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let challenges = Arc::new(InMemoryChallengeRepository::new());
    seed::seed_challenges(&challenges);
    let judge = Arc::new(HttpJudgeClient::new(
        &config.judge_url,
        config.judge_timeout_secs,
    ));

    let battles = Arc::new(BattleService::new(
        directory.clone(),
        judge,
        profiles.clone(),
        config.rating.clone(),
    ));
    let matchmaking = Arc::new(MatchmakingService::new(
        directory.clone(),
        challenges,
        battles.clone(),
        config.matchmaking.clone(),
    ));

    let app_state = state::AppState {
        matchmaking,
        battles,
        directory,
        profiles,
        connections: Arc::new(ConnectionRegistry::new()),
    };

    matchmaker::spawn(app_state.clone(), config.match_interval_ms);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::websocket::websocket_handler))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Gateway listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
