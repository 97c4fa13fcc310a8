use crate::repositories::errors::challenge_repository_errors::ChallengeRepositoryError;

#[derive(Debug)]
pub enum MatchmakingServiceError {
    AlreadyQueued,
    AlreadyInBattle,
    ChallengeLookup(ChallengeRepositoryError),
}

impl std::fmt::Display for MatchmakingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakingServiceError::AlreadyQueued => write!(f, "Already in queue"),
            MatchmakingServiceError::AlreadyInBattle => {
                write!(f, "Already in an active battle")
            }
            MatchmakingServiceError::ChallengeLookup(err) => {
                write!(f, "Challenge lookup failed: {}", err)
            }
        }
    }
}

impl std::error::Error for MatchmakingServiceError {}

impl From<ChallengeRepositoryError> for MatchmakingServiceError {
    fn from(err: ChallengeRepositoryError) -> Self {
        MatchmakingServiceError::ChallengeLookup(err)
    }
}
