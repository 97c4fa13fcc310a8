use std::sync::Arc;

use shared::repositories::profile_repository::ProfileRepository;
use shared::services::battle_service::BattleService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::session_directory::SessionDirectory;

use crate::connections::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub matchmaking: Arc<MatchmakingService>,
    pub battles: Arc<BattleService>,
    pub directory: Arc<SessionDirectory>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub connections: Arc<ConnectionRegistry>,
}
