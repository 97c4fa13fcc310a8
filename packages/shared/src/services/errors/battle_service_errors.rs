use crate::models::battle::BattleError;
use crate::repositories::errors::judge_client_errors::JudgeClientError;

#[derive(Debug)]
pub enum BattleServiceError {
    UnknownBattle(String),
    Battle(BattleError),
    Judge(JudgeClientError),
}

impl std::fmt::Display for BattleServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleServiceError::UnknownBattle(battle_id) => {
                write!(f, "Unknown battle: {}", battle_id)
            }
            BattleServiceError::Battle(err) => write!(f, "{}", err),
            BattleServiceError::Judge(err) => write!(f, "Judge error: {}", err),
        }
    }
}

impl std::error::Error for BattleServiceError {}

impl From<BattleError> for BattleServiceError {
    fn from(err: BattleError) -> Self {
        BattleServiceError::Battle(err)
    }
}
