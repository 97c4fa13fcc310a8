use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::models::challenge::{Challenge, Difficulty};
use crate::repositories::errors::challenge_repository_errors::ChallengeRepositoryError;

#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    async fn get_random_challenge(
        &self,
        difficulty: Difficulty,
    ) -> Result<Challenge, ChallengeRepositoryError>;
}

/// Challenge pool held in process memory, seeded at startup.
#[derive(Default)]
pub struct InMemoryChallengeRepository {
    challenges: RwLock<HashMap<Difficulty, Vec<Challenge>>>,
}

impl InMemoryChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, challenge: Challenge) {
        let mut challenges = self.challenges.write().unwrap();
        challenges
            .entry(challenge.difficulty)
            .or_default()
            .push(challenge);
    }

    pub fn seed(&self, batch: Vec<Challenge>) {
        for challenge in batch {
            self.insert(challenge);
        }
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryChallengeRepository {
    async fn get_random_challenge(
        &self,
        difficulty: Difficulty,
    ) -> Result<Challenge, ChallengeRepositoryError> {
        let challenges = self.challenges.read().unwrap();
        challenges
            .get(&difficulty)
            .and_then(|bucket| bucket.choose(&mut rand::thread_rng()))
            .cloned()
            .ok_or(ChallengeRepositoryError::NotFound(difficulty))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::models::challenge::TestCase;

    pub fn sample_challenge(id: &str, difficulty: Difficulty) -> Challenge {
        Challenge {
            challenge_id: id.to_string(),
            title: format!("Challenge {}", id),
            prompt: "prompt".to_string(),
            difficulty,
            test_cases: vec![TestCase {
                input: "1".to_string(),
                expected_output: "1".to_string(),
                is_hidden: false,
            }],
            time_limit_secs: 1800,
        }
    }

    /// Always fails lookups; used to exercise restore-on-failure paths.
    pub struct FailingChallengeRepository;

    #[async_trait]
    impl ChallengeRepository for FailingChallengeRepository {
        async fn get_random_challenge(
            &self,
            difficulty: Difficulty,
        ) -> Result<Challenge, ChallengeRepositoryError> {
            Err(ChallengeRepositoryError::NotFound(difficulty))
        }
    }

    #[tokio::test]
    async fn returns_a_seeded_challenge() {
        let repo = InMemoryChallengeRepository::new();
        repo.seed(vec![
            sample_challenge("a", Difficulty::Easy),
            sample_challenge("b", Difficulty::Easy),
        ]);

        let challenge = repo.get_random_challenge(Difficulty::Easy).await.unwrap();
        assert!(matches!(challenge.challenge_id.as_str(), "a" | "b"));
    }

    #[tokio::test]
    async fn empty_bucket_is_not_found() {
        let repo = InMemoryChallengeRepository::new();
        repo.insert(sample_challenge("a", Difficulty::Easy));

        let err = repo
            .get_random_challenge(Difficulty::Hard)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChallengeRepositoryError::NotFound(Difficulty::Hard)
        ));
    }
}
