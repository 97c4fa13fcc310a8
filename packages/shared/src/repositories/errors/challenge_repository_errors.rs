use crate::models::challenge::Difficulty;

#[derive(Debug)]
pub enum ChallengeRepositoryError {
    NotFound(Difficulty),
    Storage(String),
}

impl std::fmt::Display for ChallengeRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeRepositoryError::NotFound(difficulty) => {
                write!(f, "No challenge available for difficulty: {}", difficulty)
            }
            ChallengeRepositoryError::Storage(msg) => write!(f, "Challenge storage error: {}", msg),
        }
    }
}

impl std::error::Error for ChallengeRepositoryError {}
