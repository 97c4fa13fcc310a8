use std::env;
use std::str::FromStr;

use shared::services::battle_service::RatingConfig;
use shared::services::matchmaking_service::MatchmakingConfig;

/// Runtime settings, read once at startup. Everything except the judge URL
/// has a default.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub judge_url: String,
    pub judge_timeout_secs: u64,
    pub match_interval_ms: u64,
    pub matchmaking: MatchmakingConfig,
    pub rating: RatingConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let defaults = MatchmakingConfig::default();
        let rating = RatingConfig::default();
        GatewayConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string()),
            judge_url: env::var("JUDGE_URL").expect("JUDGE_URL must be set"),
            judge_timeout_secs: env_or("JUDGE_TIMEOUT_SECS", 30),
            match_interval_ms: env_or("MATCH_INTERVAL_MS", 3000),
            matchmaking: MatchmakingConfig {
                base_rating_threshold: env_or(
                    "BASE_RATING_THRESHOLD",
                    defaults.base_rating_threshold,
                ),
                max_wait_ms: env_or("MAX_WAIT_MS", defaults.max_wait_ms),
            },
            rating: RatingConfig {
                win_bonus: env_or("RATING_WIN_BONUS", rating.win_bonus),
                loss_penalty: env_or("RATING_LOSS_PENALTY", rating.loss_penalty),
                forfeit_win_bonus: env_or("RATING_FORFEIT_WIN_BONUS", rating.forfeit_win_bonus),
                forfeit_penalty: env_or("RATING_FORFEIT_PENALTY", rating.forfeit_penalty),
            },
        }
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
