use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared::models::battle::{BattleSnapshot, Language, PlayerView};
use shared::models::challenge::Difficulty;
use shared::models::queue::{QueuePosition, QueueStatus};
use shared::repositories::judge_client::ExecutionReport;
use shared::services::errors::battle_service_errors::BattleServiceError;
use shared::services::errors::matchmaking_service_errors::MatchmakingServiceError;

/// Messages a client may send, dispatched on the `action` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "queue:join")]
    JoinQueue {
        user_id: String,
        difficulty: Difficulty,
    },
    #[serde(rename = "queue:leave")]
    LeaveQueue { user_id: String },
    #[serde(rename = "queue:position")]
    QueuePosition { user_id: String },
    #[serde(rename = "battle:join")]
    JoinBattle { battle_id: String, user_id: String },
    #[serde(rename = "battle:ready")]
    Ready { battle_id: String, user_id: String },
    #[serde(rename = "battle:code-change")]
    CodeChange {
        battle_id: String,
        user_id: String,
        code: String,
    },
    #[serde(rename = "battle:language-change")]
    LanguageChange {
        battle_id: String,
        user_id: String,
        language: Language,
    },
    #[serde(rename = "battle:run")]
    RunTests {
        battle_id: String,
        user_id: String,
        code: String,
    },
    #[serde(rename = "battle:submit")]
    Submit {
        battle_id: String,
        user_id: String,
        code: String,
    },
    #[serde(rename = "battle:leave")]
    LeaveBattle { battle_id: String, user_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidInput,
    NotAllowed,
    NotFound,
    TryAgain,
}

impl From<&BattleServiceError> for ErrorCode {
    fn from(err: &BattleServiceError) -> Self {
        match err {
            BattleServiceError::UnknownBattle(_) => ErrorCode::NotFound,
            BattleServiceError::Battle(_) => ErrorCode::NotAllowed,
            BattleServiceError::Judge(_) => ErrorCode::TryAgain,
        }
    }
}

impl From<&MatchmakingServiceError> for ErrorCode {
    fn from(err: &MatchmakingServiceError) -> Self {
        match err {
            MatchmakingServiceError::AlreadyQueued => ErrorCode::NotAllowed,
            MatchmakingServiceError::AlreadyInBattle => ErrorCode::NotAllowed,
            MatchmakingServiceError::ChallengeLookup(_) => ErrorCode::TryAgain,
        }
    }
}

/// The matched opponent as announced alongside the battle snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct OpponentInfo {
    pub user_id: String,
    pub rating: i32,
}

/// Events the gateway sends, tagged with `event`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum ServerEvent {
    #[serde(rename = "queue:joined")]
    QueueJoined {
        difficulty: Difficulty,
        position: usize,
        rating: i32,
    },
    #[serde(rename = "queue:left")]
    QueueLeft { user_id: String },
    #[serde(rename = "queue:status")]
    QueueStatusUpdate {
        #[serde(flatten)]
        status: QueueStatus,
    },
    #[serde(rename = "queue:position")]
    QueuePositionUpdate {
        #[serde(flatten)]
        position: QueuePosition,
    },
    #[serde(rename = "queue:error")]
    QueueError { code: ErrorCode, message: String },
    #[serde(rename = "battle:matched")]
    Matched {
        battle: BattleSnapshot,
        opponent: OpponentInfo,
    },
    #[serde(rename = "battle:joined")]
    BattleJoined {
        battle: BattleSnapshot,
        player: PlayerView,
    },
    #[serde(rename = "battle:player-ready")]
    PlayerReady { battle_id: String, user_id: String },
    #[serde(rename = "battle:start")]
    BattleStart {
        battle_id: String,
        started_at: DateTime<Utc>,
        time_limit_secs: u64,
    },
    #[serde(rename = "battle:opponent-code")]
    OpponentCode {
        battle_id: String,
        user_id: String,
        code_length: usize,
    },
    #[serde(rename = "battle:opponent-language")]
    OpponentLanguage {
        battle_id: String,
        user_id: String,
        language: Language,
    },
    #[serde(rename = "battle:run-result")]
    RunResult {
        battle_id: String,
        report: ExecutionReport,
    },
    #[serde(rename = "battle:player-submitted")]
    PlayerSubmitted {
        battle_id: String,
        user_id: String,
        tests_passed: u32,
        total_tests: u32,
    },
    #[serde(rename = "battle:completed")]
    BattleCompleted { battle: BattleSnapshot },
    #[serde(rename = "battle:cancelled")]
    BattleCancelled { battle: BattleSnapshot },
    #[serde(rename = "battle:error")]
    BattleError { code: ErrorCode, message: String },
}

impl ServerEvent {
    pub fn queue_error(err: &MatchmakingServiceError) -> Self {
        ServerEvent::QueueError {
            code: ErrorCode::from(err),
            message: err.to_string(),
        }
    }

    pub fn battle_error(err: &BattleServiceError) -> Self {
        ServerEvent::BattleError {
            code: ErrorCode::from(err),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::battle::BattleError;
    use shared::repositories::errors::judge_client_errors::JudgeClientError;

    #[test]
    fn client_messages_parse_from_action_tag() {
        let message: ClientMessage = serde_json::from_str(
            r#"{"action":"queue:join","user_id":"alice","difficulty":"medium"}"#,
        )
        .unwrap();
        assert!(matches!(
            message,
            ClientMessage::JoinQueue { ref user_id, difficulty: Difficulty::Medium }
                if user_id == "alice"
        ));

        let message: ClientMessage = serde_json::from_str(
            r#"{"action":"battle:code-change","battle_id":"b1","user_id":"alice","code":"x"}"#,
        )
        .unwrap();
        assert!(matches!(message, ClientMessage::CodeChange { .. }));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result =
            serde_json::from_str::<ClientMessage>(r#"{"action":"queue:flush","user_id":"a"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn server_events_carry_the_event_tag() {
        let json = serde_json::to_string(&ServerEvent::PlayerReady {
            battle_id: "b1".to_string(),
            user_id: "alice".to_string(),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "battle:player-ready");
        assert_eq!(value["user_id"], "alice");
    }

    #[test]
    fn queue_status_fields_are_flattened() {
        let json = serde_json::to_string(&ServerEvent::QueueStatusUpdate {
            status: QueueStatus {
                easy: 1,
                medium: 0,
                hard: 2,
                total_in_queue: 3,
                active_battles: 4,
            },
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "queue:status");
        assert_eq!(value["total_in_queue"], 3);
        assert_eq!(value["active_battles"], 4);
    }

    #[test]
    fn error_codes_map_by_failure_kind() {
        let unknown = BattleServiceError::UnknownBattle("b1".to_string());
        assert_eq!(ErrorCode::from(&unknown), ErrorCode::NotFound);

        let conflict = BattleServiceError::Battle(BattleError::AlreadySubmitted);
        assert_eq!(ErrorCode::from(&conflict), ErrorCode::NotAllowed);

        let judge = BattleServiceError::Judge(JudgeClientError::Timeout);
        assert_eq!(ErrorCode::from(&judge), ErrorCode::TryAgain);

        assert_eq!(
            ErrorCode::from(&MatchmakingServiceError::AlreadyQueued),
            ErrorCode::NotAllowed
        );
    }
}
