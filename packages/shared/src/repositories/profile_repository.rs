use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repositories::errors::profile_repository_errors::ProfileRepositoryError;

pub const DEFAULT_RATING: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Won,
    Lost,
    Drew,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub total_matches: u32,
}

impl PlayerProfile {
    fn new(user_id: &str) -> Self {
        PlayerProfile {
            user_id: user_id.to_string(),
            rating: DEFAULT_RATING,
            wins: 0,
            losses: 0,
            draws: 0,
            total_matches: 0,
        }
    }
}

/// User profile store. Rating writes happen exactly once per participant per
/// completed or forfeited battle.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_rating(&self, user_id: &str) -> Result<i32, ProfileRepositoryError>;

    /// Applies a signed rating delta; the stored rating never drops below
    /// zero. Returns the new rating.
    async fn apply_rating_delta(
        &self,
        user_id: &str,
        delta: i32,
    ) -> Result<i32, ProfileRepositoryError>;

    async fn record_match_result(
        &self,
        user_id: &str,
        outcome: MatchOutcome,
    ) -> Result<(), ProfileRepositoryError>;
}

/// Process-local profile store. Unknown users are created on first touch at
/// the default rating.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, PlayerProfile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, user_id: &str) -> Option<PlayerProfile> {
        self.profiles.read().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get_rating(&self, user_id: &str) -> Result<i32, ProfileRepositoryError> {
        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerProfile::new(user_id));
        Ok(profile.rating)
    }

    async fn apply_rating_delta(
        &self,
        user_id: &str,
        delta: i32,
    ) -> Result<i32, ProfileRepositoryError> {
        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerProfile::new(user_id));
        profile.rating = (profile.rating + delta).max(0);
        Ok(profile.rating)
    }

    async fn record_match_result(
        &self,
        user_id: &str,
        outcome: MatchOutcome,
    ) -> Result<(), ProfileRepositoryError> {
        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerProfile::new(user_id));
        profile.total_matches += 1;
        match outcome {
            MatchOutcome::Won => profile.wins += 1,
            MatchOutcome::Lost => profile.losses += 1,
            MatchOutcome::Drew => profile.draws += 1,
        }
        Ok(())
    }
}
