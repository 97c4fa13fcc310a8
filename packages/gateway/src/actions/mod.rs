use tracing::warn;

use shared::models::battle::BattleSnapshot;

use crate::protocol::{ClientMessage, ErrorCode, ServerEvent};
use crate::state::AppState;

pub mod code_change;
pub mod disconnect;
pub mod join_battle;
pub mod join_queue;
pub mod leave_battle;
pub mod leave_queue;
pub mod queue_position;
pub mod ready;
pub mod run_tests;
pub mod submit;

/// Routes one inbound frame to its handler.
pub async fn dispatch(state: &AppState, connection_id: &str, text: &str) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!("Unparseable message from {}: {}", connection_id, err);
            state.connections.send(
                connection_id,
                &ServerEvent::BattleError {
                    code: ErrorCode::InvalidInput,
                    message: format!("Invalid message: {}", err),
                },
            );
            return;
        }
    };

    match message {
        ClientMessage::JoinQueue {
            user_id,
            difficulty,
        } => join_queue::handle(state, connection_id, &user_id, difficulty).await,
        ClientMessage::LeaveQueue { user_id } => {
            leave_queue::handle(state, connection_id, &user_id)
        }
        ClientMessage::QueuePosition { user_id } => {
            queue_position::handle(state, connection_id, &user_id)
        }
        ClientMessage::JoinBattle { battle_id, user_id } => {
            join_battle::handle(state, connection_id, &battle_id, &user_id)
        }
        ClientMessage::Ready { battle_id, user_id } => {
            ready::handle(state, connection_id, &battle_id, &user_id)
        }
        ClientMessage::CodeChange {
            battle_id,
            user_id,
            code,
        } => code_change::handle_code(state, connection_id, &battle_id, &user_id, &code),
        ClientMessage::LanguageChange {
            battle_id,
            user_id,
            language,
        } => code_change::handle_language(state, connection_id, &battle_id, &user_id, language),
        ClientMessage::RunTests {
            battle_id,
            user_id,
            code,
        } => run_tests::handle(state, connection_id, &battle_id, &user_id, &code).await,
        ClientMessage::Submit {
            battle_id,
            user_id,
            code,
        } => submit::handle(state, connection_id, &battle_id, &user_id, &code).await,
        ClientMessage::LeaveBattle { battle_id, user_id } => {
            leave_battle::handle(state, connection_id, &battle_id, &user_id).await
        }
    }
}

pub(crate) fn send_to_participants(
    state: &AppState,
    snapshot: &BattleSnapshot,
    event: &ServerEvent,
) {
    for player in &snapshot.players {
        state.connections.send_to_user(&player.user_id, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use shared::models::battle::Language;
    use shared::models::challenge::TestCase;
    use shared::repositories::challenge_repository::InMemoryChallengeRepository;
    use shared::repositories::errors::judge_client_errors::JudgeClientError;
    use shared::repositories::judge_client::{CaseResult, ExecutionReport, JudgeClient, Verdict};
    use shared::repositories::profile_repository::InMemoryProfileRepository;
    use shared::services::battle_service::{BattleService, RatingConfig};
    use shared::services::matchmaking_service::{MatchmakingConfig, MatchmakingService};
    use shared::services::session_directory::SessionDirectory;

    use crate::matchmaker;
    use crate::seed::seed_challenges;

    /// Passes a fixed number of tests on every run.
    struct StubJudge {
        tests_passed: u32,
    }

    #[async_trait]
    impl JudgeClient for StubJudge {
        async fn run_tests(
            &self,
            _code: &str,
            _language: Language,
            test_cases: &[TestCase],
        ) -> Result<ExecutionReport, JudgeClientError> {
            let total = test_cases.len() as u32;
            let tests_passed = self.tests_passed.min(total);
            Ok(ExecutionReport {
                tests_passed,
                total_tests: total,
                execution_time_ms: 10,
                verdict: if tests_passed == total {
                    Verdict::Passed
                } else {
                    Verdict::Failed
                },
                case_results: (0..total)
                    .map(|i| CaseResult {
                        passed: i < tests_passed,
                        time_ms: 2,
                    })
                    .collect(),
            })
        }
    }

    fn test_state(tests_passed: u32) -> AppState {
        let directory = Arc::new(SessionDirectory::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let challenges = Arc::new(InMemoryChallengeRepository::new());
        seed_challenges(&challenges);
        let battles = Arc::new(BattleService::new(
            directory.clone(),
            Arc::new(StubJudge { tests_passed }),
            profiles.clone(),
            RatingConfig::default(),
        ));
        let matchmaking = Arc::new(MatchmakingService::new(
            directory.clone(),
            challenges,
            battles.clone(),
            MatchmakingConfig::default(),
        ));
        AppState {
            matchmaking,
            battles,
            directory,
            profiles,
            connections: Arc::new(crate::connections::ConnectionRegistry::new()),
        }
    }

    fn connect(state: &AppState, connection_id: &str) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        state.connections.register(connection_id, tx);
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(json) = rx.try_recv() {
            events.push(serde_json::from_str(&json).unwrap());
        }
        events
    }

    fn event_named<'a>(
        events: &'a [serde_json::Value],
        name: &str,
    ) -> Option<&'a serde_json::Value> {
        events.iter().find(|event| event["event"] == name)
    }

    #[tokio::test]
    async fn full_battle_flow_from_queue_to_completion() {
        let state = test_state(u32::MAX);
        let mut rx_a = connect(&state, "conn-a");
        let mut rx_b = connect(&state, "conn-b");

        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"easy"}"#,
        )
        .await;
        dispatch(
            &state,
            "conn-b",
            r#"{"action":"queue:join","user_id":"bob","difficulty":"easy"}"#,
        )
        .await;

        let events = drain(&mut rx_a);
        let joined = event_named(&events, "queue:joined").unwrap();
        assert_eq!(joined["position"], 1);
        assert_eq!(joined["rating"], 1000);

        matchmaker::run_once(&state).await;

        let events_a = drain(&mut rx_a);
        let matched = event_named(&events_a, "battle:matched").unwrap();
        let battle_id = matched["battle"]["battle_id"].as_str().unwrap().to_string();
        assert_eq!(matched["opponent"]["user_id"], "bob");
        let events_b = drain(&mut rx_b);
        assert!(event_named(&events_b, "battle:matched").is_some());

        // Both ready up; the second transition starts the battle.
        dispatch(
            &state,
            "conn-a",
            &format!(r#"{{"action":"battle:ready","battle_id":"{}","user_id":"alice"}}"#, battle_id),
        )
        .await;
        let events_b = drain(&mut rx_b);
        assert!(event_named(&events_b, "battle:player-ready").is_some());
        assert!(event_named(&events_b, "battle:start").is_none());

        dispatch(
            &state,
            "conn-b",
            &format!(r#"{{"action":"battle:ready","battle_id":"{}","user_id":"bob"}}"#, battle_id),
        )
        .await;
        let events_a = drain(&mut rx_a);
        let start = event_named(&events_a, "battle:start").unwrap();
        assert!(start["time_limit_secs"].as_u64().unwrap() > 0);

        // Code sync reaches the opponent as a length only.
        dispatch(
            &state,
            "conn-a",
            &format!(
                r#"{{"action":"battle:code-change","battle_id":"{}","user_id":"alice","code":"let x = 1;"}}"#,
                battle_id
            ),
        )
        .await;
        let events_b = drain(&mut rx_b);
        let opponent_code = event_named(&events_b, "battle:opponent-code").unwrap();
        assert_eq!(opponent_code["code_length"], 10);
        assert!(opponent_code.get("code").is_none());
        assert!(drain(&mut rx_a).is_empty());

        // Both submit; completion fans out to both players.
        dispatch(
            &state,
            "conn-a",
            &format!(
                r#"{{"action":"battle:submit","battle_id":"{}","user_id":"alice","code":"a"}}"#,
                battle_id
            ),
        )
        .await;
        dispatch(
            &state,
            "conn-b",
            &format!(
                r#"{{"action":"battle:submit","battle_id":"{}","user_id":"bob","code":"b"}}"#,
                battle_id
            ),
        )
        .await;

        let events_a = drain(&mut rx_a);
        assert!(event_named(&events_a, "battle:player-submitted").is_some());
        let completed = event_named(&events_a, "battle:completed").unwrap();
        // Equal scores, alice submitted first.
        assert_eq!(completed["battle"]["winner"], "alice");
        assert!(event_named(&drain(&mut rx_b), "battle:completed").is_some());
    }

    #[tokio::test]
    async fn malformed_frames_get_an_invalid_input_error() {
        let state = test_state(0);
        let mut rx = connect(&state, "conn-a");

        dispatch(&state, "conn-a", "not json").await;
        dispatch(&state, "conn-a", r#"{"action":"no-such-action"}"#).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        for event in events {
            assert_eq!(event["event"], "battle:error");
            assert_eq!(event["code"], "invalid_input");
        }
    }

    #[tokio::test]
    async fn queue_errors_report_state_conflicts() {
        let state = test_state(0);
        let mut rx = connect(&state, "conn-a");

        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"easy"}"#,
        )
        .await;
        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"hard"}"#,
        )
        .await;

        let events = drain(&mut rx);
        let error = event_named(&events, "queue:error").unwrap();
        assert_eq!(error["code"], "not_allowed");
    }

    #[tokio::test]
    async fn leaving_the_queue_broadcasts_fresh_counts() {
        let state = test_state(0);
        let mut rx = connect(&state, "conn-a");

        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"medium"}"#,
        )
        .await;
        drain(&mut rx);

        dispatch(&state, "conn-a", r#"{"action":"queue:leave","user_id":"alice"}"#).await;
        let events = drain(&mut rx);
        assert!(event_named(&events, "queue:left").is_some());
        let status = event_named(&events, "queue:status").unwrap();
        assert_eq!(status["medium"], 0);

        // Second leave finds nothing.
        dispatch(&state, "conn-a", r#"{"action":"queue:leave","user_id":"alice"}"#).await;
        let events = drain(&mut rx);
        let error = event_named(&events, "queue:error").unwrap();
        assert_eq!(error["code"], "not_found");
    }

    #[tokio::test]
    async fn disconnect_forfeits_an_in_progress_battle() {
        let state = test_state(u32::MAX);
        let mut rx_a = connect(&state, "conn-a");
        let mut rx_b = connect(&state, "conn-b");

        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"easy"}"#,
        )
        .await;
        dispatch(
            &state,
            "conn-b",
            r#"{"action":"queue:join","user_id":"bob","difficulty":"easy"}"#,
        )
        .await;
        matchmaker::run_once(&state).await;
        let events = drain(&mut rx_a);
        let battle_id = event_named(&events, "battle:matched").unwrap()["battle"]["battle_id"]
            .as_str()
            .unwrap()
            .to_string();
        for (conn, user) in [("conn-a", "alice"), ("conn-b", "bob")] {
            dispatch(
                &state,
                conn,
                &format!(r#"{{"action":"battle:ready","battle_id":"{}","user_id":"{}"}}"#, battle_id, user),
            )
            .await;
        }
        drain(&mut rx_a);
        drain(&mut rx_b);

        disconnect::handle(&state, "conn-a").await;

        let events = drain(&mut rx_b);
        let completed = event_named(&events, "battle:completed").unwrap();
        assert_eq!(completed["battle"]["winner"], "bob");
        assert!(!state.directory.is_active("bob"));
        assert_eq!(state.connections.connection_count(), 1);
    }

    #[tokio::test]
    async fn disconnect_while_queued_drops_the_entry() {
        let state = test_state(0);
        let mut rx_b = connect(&state, "conn-b");
        let _rx_a = connect(&state, "conn-a");

        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"easy"}"#,
        )
        .await;
        drain(&mut rx_b);

        disconnect::handle(&state, "conn-a").await;

        assert_eq!(state.matchmaking.status().total_in_queue, 0);
        let events = drain(&mut rx_b);
        let status = event_named(&events, "queue:status").unwrap();
        assert_eq!(status["easy"], 0);
    }

    #[tokio::test]
    async fn submit_from_a_non_participant_is_rejected() {
        let state = test_state(u32::MAX);
        let mut rx_a = connect(&state, "conn-a");
        let mut rx_c = connect(&state, "conn-c");
        let _rx_b = connect(&state, "conn-b");

        dispatch(
            &state,
            "conn-a",
            r#"{"action":"queue:join","user_id":"alice","difficulty":"easy"}"#,
        )
        .await;
        dispatch(
            &state,
            "conn-b",
            r#"{"action":"queue:join","user_id":"bob","difficulty":"easy"}"#,
        )
        .await;
        matchmaker::run_once(&state).await;
        let events = drain(&mut rx_a);
        let battle_id = event_named(&events, "battle:matched").unwrap()["battle"]["battle_id"]
            .as_str()
            .unwrap()
            .to_string();

        dispatch(
            &state,
            "conn-c",
            &format!(
                r#"{{"action":"battle:submit","battle_id":"{}","user_id":"mallory","code":"x"}}"#,
                battle_id
            ),
        )
        .await;

        let events = drain(&mut rx_c);
        let error = event_named(&events, "battle:error").unwrap();
        assert_eq!(error["code"], "not_allowed");
    }
}
