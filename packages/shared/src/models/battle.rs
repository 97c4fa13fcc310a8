use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::challenge::{Challenge, ChallengeView, Difficulty};
use crate::models::queue::QueueEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BattleStatus {
    Waiting,
    Ready,
    InProgress,
    Completed,
    Cancelled,
}

impl BattleStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BattleStatus::Completed | BattleStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerOutcome {
    Pending,
    Passed,
    Failed,
    Error,
    Timeout,
    Forfeit,
    WonByForfeit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
    Java,
    Cpp,
    C,
    Csharp,
    Go,
    Rust,
    Php,
}

impl Default for Language {
    fn default() -> Self {
        Language::Javascript
    }
}

/// Judged summary for one accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub tests_passed: u32,
    pub total_tests: u32,
    pub execution_time_ms: u64,
    pub outcome: PlayerOutcome,
}

/// One of the two fixed player positions within a battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub user_id: String,
    pub connection_id: String,
    pub rating: i32,
    pub language: Language,
    pub is_ready: bool,
    pub code: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub tests_passed: u32,
    pub total_tests: u32,
    pub execution_time_ms: u64,
    pub outcome: PlayerOutcome,
}

impl PlayerSlot {
    fn new(entry: &QueueEntry) -> Self {
        PlayerSlot {
            user_id: entry.user_id.clone(),
            connection_id: entry.connection_id.clone(),
            rating: entry.rating,
            language: Language::default(),
            is_ready: false,
            code: String::new(),
            submitted_at: None,
            tests_passed: 0,
            total_tests: 0,
            execution_time_ms: 0,
            outcome: PlayerOutcome::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingChange {
    pub user_id: String,
    pub old_rating: i32,
    pub new_rating: i32,
    pub change: i32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum BattleError {
    NotParticipant,
    SessionTerminal,
    NotInProgress,
    AlreadySubmitted,
}

impl std::fmt::Display for BattleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleError::NotParticipant => write!(f, "User is not a participant of this battle"),
            BattleError::SessionTerminal => {
                write!(f, "Battle has already completed or been cancelled")
            }
            BattleError::NotInProgress => write!(f, "Battle is not in progress"),
            BattleError::AlreadySubmitted => write!(f, "Solution already submitted"),
        }
    }
}

impl std::error::Error for BattleError {}

/// Authoritative state of a single 1v1 match.
///
/// All mutation goes through the methods below; the status transitions
/// ready -> in-progress -> completed (or cancelled) happen at most once each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSession {
    pub battle_id: String,
    pub challenge: Challenge,
    pub difficulty: Difficulty,
    pub players: [PlayerSlot; 2],
    pub status: BattleStatus,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub rating_changes: Vec<RatingChange>,
}

impl BattleSession {
    /// Sessions are always created fully populated, directly in `Ready`.
    pub fn new(
        player1: &QueueEntry,
        player2: &QueueEntry,
        challenge: Challenge,
        difficulty: Difficulty,
    ) -> Self {
        BattleSession {
            battle_id: Uuid::new_v4().to_string(),
            challenge,
            difficulty,
            players: [PlayerSlot::new(player1), PlayerSlot::new(player2)],
            status: BattleStatus::Ready,
            winner: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_secs: None,
            rating_changes: Vec::new(),
        }
    }

    fn slot_index(&self, user_id: &str) -> Result<usize, BattleError> {
        self.players
            .iter()
            .position(|slot| slot.user_id == user_id)
            .ok_or(BattleError::NotParticipant)
    }

    fn ensure_live(&self) -> Result<(), BattleError> {
        if self.status.is_terminal() {
            Err(BattleError::SessionTerminal)
        } else {
            Ok(())
        }
    }

    pub fn slot(&self, user_id: &str) -> Result<&PlayerSlot, BattleError> {
        Ok(&self.players[self.slot_index(user_id)?])
    }

    pub fn opponent_of(&self, user_id: &str) -> Result<&PlayerSlot, BattleError> {
        let index = self.slot_index(user_id)?;
        Ok(&self.players[1 - index])
    }

    /// Replaces the stored connection id after a reconnect.
    pub fn rebind_connection(
        &mut self,
        user_id: &str,
        connection_id: &str,
    ) -> Result<(), BattleError> {
        let index = self.slot_index(user_id)?;
        self.players[index].connection_id = connection_id.to_string();
        Ok(())
    }

    /// Marks one player ready. Returns `true` on the single transition to
    /// `InProgress`, i.e. the instant the second ready flag lands.
    pub fn mark_ready(&mut self, user_id: &str) -> Result<bool, BattleError> {
        self.ensure_live()?;
        let index = self.slot_index(user_id)?;
        self.players[index].is_ready = true;

        let all_ready = self.players.iter().all(|slot| slot.is_ready);
        if all_ready && self.status == BattleStatus::Ready {
            self.status = BattleStatus::InProgress;
            self.started_at = Some(Utc::now());
            return Ok(true);
        }
        Ok(false)
    }

    pub fn update_code(&mut self, user_id: &str, code: &str) -> Result<(), BattleError> {
        self.ensure_live()?;
        let index = self.slot_index(user_id)?;
        if self.status != BattleStatus::InProgress {
            return Err(BattleError::NotInProgress);
        }
        self.players[index].code = code.to_string();
        Ok(())
    }

    pub fn update_language(&mut self, user_id: &str, language: Language) -> Result<(), BattleError> {
        self.ensure_live()?;
        let index = self.slot_index(user_id)?;
        self.players[index].language = language;
        Ok(())
    }

    /// Records the judged result for one player. `submitted_at` is immutable
    /// once set; a second submit fails without touching the stored result.
    pub fn record_submission(
        &mut self,
        user_id: &str,
        result: &SubmissionResult,
    ) -> Result<(), BattleError> {
        self.ensure_live()?;
        let index = self.slot_index(user_id)?;
        if self.status != BattleStatus::InProgress {
            return Err(BattleError::NotInProgress);
        }
        if self.players[index].submitted_at.is_some() {
            return Err(BattleError::AlreadySubmitted);
        }

        let slot = &mut self.players[index];
        slot.submitted_at = Some(Utc::now());
        slot.tests_passed = result.tests_passed;
        slot.total_tests = result.total_tests;
        slot.execution_time_ms = result.execution_time_ms;
        slot.outcome = result.outcome;
        Ok(())
    }

    pub fn both_submitted(&self) -> bool {
        self.players.iter().all(|slot| slot.submitted_at.is_some())
    }

    /// Winner criteria, in contract order:
    /// 1. more tests passed wins outright;
    /// 2. equal and above zero: earlier submission wins;
    /// 3. both zero: draw, winner stays unset.
    ///
    /// Completes the session. Must only be called once both players have
    /// submitted.
    pub fn determine_winner(&mut self) -> Option<String> {
        let [first, second] = &self.players;

        if first.tests_passed > second.tests_passed {
            self.winner = Some(first.user_id.clone());
        } else if second.tests_passed > first.tests_passed {
            self.winner = Some(second.user_id.clone());
        } else if first.tests_passed > 0 {
            let winner = if first.submitted_at < second.submitted_at {
                first
            } else {
                second
            };
            self.winner = Some(winner.user_id.clone());
        }

        self.complete();
        self.winner.clone()
    }

    /// A player leaving mid-battle forfeits; the other player wins outright,
    /// bypassing normal winner determination.
    pub fn forfeit(&mut self, leaver_id: &str) -> Result<String, BattleError> {
        self.ensure_live()?;
        if self.status != BattleStatus::InProgress {
            return Err(BattleError::NotInProgress);
        }
        let leaver = self.slot_index(leaver_id)?;
        let remaining = 1 - leaver;

        self.players[leaver].outcome = PlayerOutcome::Forfeit;
        self.players[remaining].outcome = PlayerOutcome::WonByForfeit;
        self.winner = Some(self.players[remaining].user_id.clone());
        self.complete();
        Ok(self.players[remaining].user_id.clone())
    }

    /// A player leaving before the battle starts cancels it. No winner.
    pub fn cancel(&mut self) -> Result<(), BattleError> {
        self.ensure_live()?;
        self.status = BattleStatus::Cancelled;
        Ok(())
    }

    fn complete(&mut self) {
        let now = Utc::now();
        self.status = BattleStatus::Completed;
        self.completed_at = Some(now);
        self.duration_secs = self
            .started_at
            .map(|started| (now - started).num_seconds());
    }

    /// Read-only projection safe to broadcast to both players: opponent code
    /// and hidden test cases are omitted.
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            battle_id: self.battle_id.clone(),
            challenge: self.challenge.public_view(),
            difficulty: self.difficulty,
            players: self.players.iter().map(PlayerPublic::from).collect(),
            status: self.status,
            winner: self.winner.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration_secs: self.duration_secs,
            rating_changes: self.rating_changes.clone(),
        }
    }

    /// Per-player projection: the requesting player's own slot in full.
    pub fn player_view(&self, user_id: &str) -> Result<PlayerView, BattleError> {
        let index = self.slot_index(user_id)?;
        let own = &self.players[index];
        let opponent = &self.players[1 - index];
        Ok(PlayerView {
            battle_id: self.battle_id.clone(),
            user_id: own.user_id.clone(),
            language: own.language,
            is_ready: own.is_ready,
            code: own.code.clone(),
            submitted_at: own.submitted_at,
            tests_passed: own.tests_passed,
            total_tests: own.total_tests,
            outcome: own.outcome,
            opponent: PlayerPublic::from(opponent),
        })
    }
}

/// Opponent-safe view of a slot: no code, no connection id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPublic {
    pub user_id: String,
    pub rating: i32,
    pub language: Language,
    pub is_ready: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub tests_passed: u32,
    pub total_tests: u32,
    pub outcome: PlayerOutcome,
}

impl From<&PlayerSlot> for PlayerPublic {
    fn from(slot: &PlayerSlot) -> Self {
        PlayerPublic {
            user_id: slot.user_id.clone(),
            rating: slot.rating,
            language: slot.language,
            is_ready: slot.is_ready,
            submitted_at: slot.submitted_at,
            tests_passed: slot.tests_passed,
            total_tests: slot.total_tests,
            outcome: slot.outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub battle_id: String,
    pub challenge: ChallengeView,
    pub difficulty: Difficulty,
    pub players: Vec<PlayerPublic>,
    pub status: BattleStatus,
    pub winner: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub rating_changes: Vec<RatingChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub battle_id: String,
    pub user_id: String,
    pub language: Language,
    pub is_ready: bool,
    pub code: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub tests_passed: u32,
    pub total_tests: u32,
    pub outcome: PlayerOutcome,
    pub opponent: PlayerPublic,
}
