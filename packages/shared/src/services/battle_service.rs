use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, error, info};

use crate::models::battle::{
    BattleError, BattleSession, BattleSnapshot, BattleStatus, Language, PlayerOutcome, PlayerView,
    RatingChange, SubmissionResult,
};
use crate::models::challenge::{Challenge, Difficulty};
use crate::models::queue::QueueEntry;
use crate::repositories::judge_client::{ExecutionReport, JudgeClient};
use crate::repositories::profile_repository::{MatchOutcome, ProfileRepository};
use crate::services::errors::battle_service_errors::BattleServiceError;
use crate::services::session_directory::SessionDirectory;

/// Rating adjustment constants. Asymmetric by design; not derived from an
/// Elo-style formula.
#[derive(Debug, Clone)]
pub struct RatingConfig {
    pub win_bonus: i32,
    pub loss_penalty: i32,
    pub forfeit_win_bonus: i32,
    pub forfeit_penalty: i32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            win_bonus: 25,
            loss_penalty: 15,
            forfeit_win_bonus: 20,
            forfeit_penalty: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadyUpdate {
    pub snapshot: BattleSnapshot,
    /// True on the single ready -> in-progress transition.
    pub started: bool,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub result: SubmissionResult,
    pub report: ExecutionReport,
    pub snapshot: BattleSnapshot,
}

/// Profile-store side effects staged while the session lock is held and
/// applied after it is released.
struct CompletionPlan {
    battle_id: String,
    participants: Vec<(String, i32, MatchOutcome)>,
}

/// Owns every live battle session and orchestrates its lifecycle.
///
/// Each session sits behind its own mutex, so independent battles proceed in
/// parallel while a single battle's mutations stay serialized. Judge and
/// profile-store calls never run under a session lock: state is staged, the
/// lock dropped, the call awaited, then the transition re-validated on
/// commit.
pub struct BattleService {
    sessions: RwLock<HashMap<String, Arc<Mutex<BattleSession>>>>,
    directory: Arc<SessionDirectory>,
    judge: Arc<dyn JudgeClient>,
    profiles: Arc<dyn ProfileRepository>,
    rating: RatingConfig,
}

impl BattleService {
    pub fn new(
        directory: Arc<SessionDirectory>,
        judge: Arc<dyn JudgeClient>,
        profiles: Arc<dyn ProfileRepository>,
        rating: RatingConfig,
    ) -> Self {
        BattleService {
            sessions: RwLock::new(HashMap::new()),
            directory,
            judge,
            profiles,
            rating,
        }
    }

    /// Creates a session pre-seeded with both players. Called by the
    /// matchmaker while it still holds the queue lock, so it stays
    /// synchronous.
    pub fn create_session(
        &self,
        player1: &QueueEntry,
        player2: &QueueEntry,
        challenge: Challenge,
        difficulty: Difficulty,
    ) -> BattleSnapshot {
        let session = BattleSession::new(player1, player2, challenge, difficulty);
        let snapshot = session.snapshot();
        info!(
            "Battle {} created: {} ({}) vs {} ({})",
            session.battle_id, player1.user_id, player1.rating, player2.user_id, player2.rating
        );
        self.sessions
            .write()
            .unwrap()
            .insert(session.battle_id.clone(), Arc::new(Mutex::new(session)));
        snapshot
    }

    fn session(&self, battle_id: &str) -> Result<Arc<Mutex<BattleSession>>, BattleServiceError> {
        self.sessions
            .read()
            .unwrap()
            .get(battle_id)
            .cloned()
            .ok_or_else(|| BattleServiceError::UnknownBattle(battle_id.to_string()))
    }

    pub fn mark_ready(
        &self,
        battle_id: &str,
        user_id: &str,
    ) -> Result<ReadyUpdate, BattleServiceError> {
        let session = self.session(battle_id)?;
        let mut battle = session.lock().unwrap();
        let started = battle.mark_ready(user_id)?;
        if started {
            info!("Battle {} started", battle_id);
        }
        Ok(ReadyUpdate {
            snapshot: battle.snapshot(),
            started,
        })
    }

    pub fn update_code(
        &self,
        battle_id: &str,
        user_id: &str,
        code: &str,
    ) -> Result<(), BattleServiceError> {
        let session = self.session(battle_id)?;
        let mut battle = session.lock().unwrap();
        battle.update_code(user_id, code)?;
        Ok(())
    }

    pub fn update_language(
        &self,
        battle_id: &str,
        user_id: &str,
        language: Language,
    ) -> Result<(), BattleServiceError> {
        let session = self.session(battle_id)?;
        let mut battle = session.lock().unwrap();
        battle.update_language(user_id, language)?;
        debug!("Player {} switched language in battle {}", user_id, battle_id);
        Ok(())
    }

    /// Re-attaches a reconnecting participant under a new connection id.
    pub fn rebind_connection(
        &self,
        battle_id: &str,
        user_id: &str,
        connection_id: &str,
    ) -> Result<BattleSnapshot, BattleServiceError> {
        let session = self.session(battle_id)?;
        let mut battle = session.lock().unwrap();
        battle.rebind_connection(user_id, connection_id)?;
        Ok(battle.snapshot())
    }

    /// Runs the visible test cases only. Read-only with respect to session
    /// state; used for the in-editor "run" button.
    pub async fn run_visible_tests(
        &self,
        battle_id: &str,
        user_id: &str,
        code: &str,
    ) -> Result<ExecutionReport, BattleServiceError> {
        let session = self.session(battle_id)?;
        let (language, visible_cases) = {
            let battle = session.lock().unwrap();
            if battle.status.is_terminal() {
                return Err(BattleError::SessionTerminal.into());
            }
            if battle.status != BattleStatus::InProgress {
                return Err(BattleError::NotInProgress.into());
            }
            let slot = battle.slot(user_id)?;
            (slot.language, battle.challenge.visible_test_cases())
        };

        self.judge
            .run_tests(code, language, &visible_cases)
            .await
            .map_err(BattleServiceError::Judge)
    }

    /// Accepts a player's single submission: stages the code, judges it
    /// against the full suite, then commits the result. When the second
    /// submission lands, winner determination runs and the session
    /// completes.
    ///
    /// A judge failure leaves the slot unsubmitted so the player can retry.
    pub async fn submit(
        &self,
        battle_id: &str,
        user_id: &str,
        code: &str,
    ) -> Result<SubmitOutcome, BattleServiceError> {
        let session = self.session(battle_id)?;

        let (language, test_cases) = {
            let mut battle = session.lock().unwrap();
            // Reject a resubmission before staging anything: the first
            // accepted submission's code must survive untouched.
            if battle.slot(user_id)?.submitted_at.is_some() {
                return Err(BattleError::AlreadySubmitted.into());
            }
            battle.update_code(user_id, code)?;
            let slot = battle.slot(user_id)?;
            (slot.language, battle.challenge.test_cases.clone())
        };

        let report = self
            .judge
            .run_tests(code, language, &test_cases)
            .await
            .map_err(BattleServiceError::Judge)?;

        let result = SubmissionResult {
            tests_passed: report.tests_passed,
            total_tests: report.total_tests,
            execution_time_ms: report.execution_time_ms,
            outcome: PlayerOutcome::from(report.verdict),
        };

        // Commit. The session may have terminated while the judge ran
        // (opponent forfeit); record_submission re-validates.
        let (snapshot, plan) = {
            let mut battle = session.lock().unwrap();
            battle.record_submission(user_id, &result)?;
            info!(
                "Player {} submitted in battle {}: {}/{} tests",
                user_id, battle_id, result.tests_passed, result.total_tests
            );
            let plan = if battle.both_submitted() {
                let winner = battle.determine_winner();
                info!(
                    "Battle {} completed. Winner: {}",
                    battle_id,
                    winner.as_deref().unwrap_or("draw")
                );
                Some(self.plan_completion(&mut battle))
            } else {
                None
            };
            (battle.snapshot(), plan)
        };

        if let Some(plan) = plan {
            self.apply_completion(plan).await;
        }

        Ok(SubmitOutcome {
            result,
            report,
            snapshot,
        })
    }

    /// A participant leaving: cancels a not-yet-started battle, forfeits an
    /// in-progress one. Terminal battles reject the call.
    pub async fn leave(
        &self,
        battle_id: &str,
        user_id: &str,
    ) -> Result<BattleSnapshot, BattleServiceError> {
        let session = self.session(battle_id)?;

        let (snapshot, plan) = {
            let mut battle = session.lock().unwrap();
            battle.slot(user_id)?;
            match battle.status {
                BattleStatus::InProgress => {
                    let remaining = battle.forfeit(user_id)?;
                    info!(
                        "Player {} forfeited battle {}; {} wins",
                        user_id, battle_id, remaining
                    );
                    let plan = self.plan_completion(&mut battle);
                    (battle.snapshot(), plan)
                }
                _ => {
                    battle.cancel()?;
                    info!("Battle {} cancelled: {} left before start", battle_id, user_id);
                    let plan = CompletionPlan {
                        battle_id: battle.battle_id.clone(),
                        participants: Vec::new(),
                    };
                    (battle.snapshot(), plan)
                }
            }
        };

        self.apply_completion(plan).await;
        Ok(snapshot)
    }

    pub fn get_snapshot(&self, battle_id: &str) -> Result<BattleSnapshot, BattleServiceError> {
        let session = self.session(battle_id)?;
        let battle = session.lock().unwrap();
        Ok(battle.snapshot())
    }

    pub fn get_player_view(
        &self,
        battle_id: &str,
        user_id: &str,
    ) -> Result<PlayerView, BattleServiceError> {
        let session = self.session(battle_id)?;
        let battle = session.lock().unwrap();
        Ok(battle.player_view(user_id)?)
    }

    /// Stages rating changes on the session and returns the deferred
    /// profile-store writes. Called exactly once, at the terminal
    /// transition, with the session lock held.
    fn plan_completion(&self, battle: &mut BattleSession) -> CompletionPlan {
        let winner = battle.winner.clone();
        let mut changes = Vec::new();
        let mut participants = Vec::new();

        for slot in &battle.players {
            let (delta, result) = match slot.outcome {
                PlayerOutcome::Forfeit => (-self.rating.forfeit_penalty, MatchOutcome::Lost),
                PlayerOutcome::WonByForfeit => {
                    (self.rating.forfeit_win_bonus, MatchOutcome::Won)
                }
                _ => match winner.as_deref() {
                    Some(winner_id) if winner_id == slot.user_id => {
                        (self.rating.win_bonus, MatchOutcome::Won)
                    }
                    Some(_) => (-self.rating.loss_penalty, MatchOutcome::Lost),
                    None => (0, MatchOutcome::Drew),
                },
            };
            let new_rating = (slot.rating + delta).max(0);
            changes.push(RatingChange {
                user_id: slot.user_id.clone(),
                old_rating: slot.rating,
                new_rating,
                change: new_rating - slot.rating,
            });
            participants.push((slot.user_id.clone(), delta, result));
        }

        battle.rating_changes = changes;
        CompletionPlan {
            battle_id: battle.battle_id.clone(),
            participants,
        }
    }

    /// Post-termination side effects: release both directory bindings and
    /// write each participant's profile exactly once. Profile failures are
    /// logged; core state stays authoritative regardless.
    async fn apply_completion(&self, plan: CompletionPlan) {
        self.directory.unbind_all(&plan.battle_id);
        for (user_id, delta, outcome) in plan.participants {
            if delta != 0 {
                if let Err(e) = self.profiles.apply_rating_delta(&user_id, delta).await {
                    error!("Failed to apply rating delta for {}: {}", user_id, e);
                }
            }
            if let Err(e) = self.profiles.record_match_result(&user_id, outcome).await {
                error!("Failed to record match result for {}: {}", user_id, e);
            }
        }
    }

    pub fn active_session_count(&self) -> usize {
        let sessions = self.sessions.read().unwrap();
        sessions
            .values()
            .filter(|session| !session.lock().unwrap().status.is_terminal())
            .count()
    }
}
