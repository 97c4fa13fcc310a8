use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::battle::BattleSnapshot;
use crate::models::challenge::Difficulty;
use crate::models::queue::{QueueEntry, QueuePosition, QueueStatus};
use crate::repositories::challenge_repository::ChallengeRepository;
use crate::services::battle_service::BattleService;
use crate::services::errors::matchmaking_service_errors::MatchmakingServiceError;
use crate::services::session_directory::SessionDirectory;

#[derive(Debug, Clone)]
pub struct MatchmakingConfig {
    /// Maximum rating difference accepted for a fresh entry.
    pub base_rating_threshold: i32,
    /// Wait time at which the tolerance has doubled.
    pub max_wait_ms: i64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        MatchmakingConfig {
            base_rating_threshold: 200,
            max_wait_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchedPlayer {
    pub user_id: String,
    pub connection_id: String,
    pub rating: i32,
}

impl From<&QueueEntry> for MatchedPlayer {
    fn from(entry: &QueueEntry) -> Self {
        MatchedPlayer {
            user_id: entry.user_id.clone(),
            connection_id: entry.connection_id.clone(),
            rating: entry.rating,
        }
    }
}

/// A successful pairing, ready to be announced to both players.
#[derive(Debug, Clone)]
pub struct MatchPairing {
    pub battle: BattleSnapshot,
    pub player1: MatchedPlayer,
    pub player2: MatchedPlayer,
}

/// Per-difficulty waiting lists and the pairing algorithm.
///
/// All bucket mutation happens under one mutex; the directory is only ever
/// written while that mutex is held, which is what makes "queued" and "in a
/// battle" mutually exclusive. The challenge fetch is the single awaited
/// call and runs with the lock released.
pub struct MatchmakingService {
    buckets: Mutex<HashMap<Difficulty, Vec<QueueEntry>>>,
    directory: Arc<SessionDirectory>,
    challenges: Arc<dyn ChallengeRepository>,
    battles: Arc<BattleService>,
    config: MatchmakingConfig,
}

impl MatchmakingService {
    pub fn new(
        directory: Arc<SessionDirectory>,
        challenges: Arc<dyn ChallengeRepository>,
        battles: Arc<BattleService>,
        config: MatchmakingConfig,
    ) -> Self {
        MatchmakingService {
            buckets: Mutex::new(HashMap::new()),
            directory,
            challenges,
            battles,
            config,
        }
    }

    /// Adds a player to a difficulty bucket. Returns the new bucket size.
    pub fn enqueue(
        &self,
        user_id: &str,
        connection_id: &str,
        rating: i32,
        difficulty: Difficulty,
    ) -> Result<usize, MatchmakingServiceError> {
        let mut buckets = self.buckets.lock().unwrap();

        let already_queued = buckets
            .values()
            .flatten()
            .any(|entry| entry.user_id == user_id);
        if already_queued {
            return Err(MatchmakingServiceError::AlreadyQueued);
        }
        if self.directory.is_active(user_id) {
            return Err(MatchmakingServiceError::AlreadyInBattle);
        }

        let bucket = buckets.entry(difficulty).or_default();
        bucket.push(QueueEntry::new(user_id, connection_id, rating, difficulty));
        info!(
            "User {} joined {} queue (size: {})",
            user_id,
            difficulty,
            bucket.len()
        );
        Ok(bucket.len())
    }

    /// Removes a waiting player. Idempotent; returns whether anything was
    /// removed.
    pub fn dequeue(&self, user_id: &str) -> bool {
        let mut buckets = self.buckets.lock().unwrap();
        for (difficulty, bucket) in buckets.iter_mut() {
            if let Some(index) = bucket.iter().position(|entry| entry.user_id == user_id) {
                bucket.remove(index);
                info!("User {} left {} queue", user_id, difficulty);
                return true;
            }
        }
        false
    }

    /// Removal keyed by connection, for abrupt disconnects. Returns the
    /// removed user id so the caller can reconcile its own bookkeeping.
    pub fn dequeue_by_connection(&self, connection_id: &str) -> Option<String> {
        let mut buckets = self.buckets.lock().unwrap();
        for (difficulty, bucket) in buckets.iter_mut() {
            if let Some(index) = bucket
                .iter()
                .position(|entry| entry.connection_id == connection_id)
            {
                let entry = bucket.remove(index);
                info!(
                    "User {} (connection {}) dropped from {} queue",
                    entry.user_id, connection_id, difficulty
                );
                return Some(entry.user_id);
            }
        }
        None
    }

    /// Dynamic tolerance: starts at the base threshold and doubles linearly
    /// as the anchor's wait approaches `max_wait_ms` (and keeps growing past
    /// it), trading match quality for latency.
    fn rating_tolerance(&self, elapsed_wait_ms: i64) -> f64 {
        let base = self.config.base_rating_threshold as f64;
        base + (elapsed_wait_ms as f64 / self.config.max_wait_ms as f64) * base
    }

    /// Attempts one pairing in a bucket.
    ///
    /// The oldest entry anchors the search; remaining entries are scanned in
    /// queue order and the first within tolerance is taken. On success both
    /// entries are removed, a random challenge fetched, the session created
    /// and both users bound in the directory. If the challenge lookup fails
    /// the two entries are restored unchanged.
    pub async fn find_match(
        &self,
        difficulty: Difficulty,
    ) -> Result<Option<MatchPairing>, MatchmakingServiceError> {
        let (anchor, candidate) = {
            let mut buckets = self.buckets.lock().unwrap();
            let bucket = buckets.entry(difficulty).or_default();
            if bucket.len() < 2 {
                return Ok(None);
            }

            // Oldest first: FIFO fairness.
            bucket.sort_by_key(|entry| entry.enqueued_at);
            let anchor_rating = bucket[0].rating;
            let elapsed_wait_ms = (Utc::now() - bucket[0].enqueued_at)
                .num_milliseconds()
                .max(0);
            let tolerance = self.rating_tolerance(elapsed_wait_ms);

            let candidate_index = bucket.iter().enumerate().skip(1).find_map(|(i, entry)| {
                if ((entry.rating - anchor_rating).abs() as f64) <= tolerance {
                    Some(i)
                } else {
                    None
                }
            });
            let Some(index) = candidate_index else {
                debug!(
                    "No {} opponent within tolerance {:.0} for anchor rating {}",
                    difficulty, tolerance, anchor_rating
                );
                return Ok(None);
            };

            let candidate = bucket.remove(index);
            let anchor = bucket.remove(0);
            (anchor, candidate)
        };

        info!(
            "Match found in {}: {} ({}) vs {} ({})",
            difficulty, anchor.user_id, anchor.rating, candidate.user_id, candidate.rating
        );

        // The only external call; runs without the queue lock. Waiting
        // players must never be dropped because of it.
        let challenge = match self.challenges.get_random_challenge(difficulty).await {
            Ok(challenge) => challenge,
            Err(err) => {
                warn!(
                    "Challenge lookup failed for {}; restoring both entries: {}",
                    difficulty, err
                );
                self.restore(anchor, candidate);
                return Err(err.into());
            }
        };

        // Commit under the queue lock: any re-enqueue that slipped in while
        // the challenge was fetched is superseded by the match.
        let pairing = {
            let mut buckets = self.buckets.lock().unwrap();
            for bucket in buckets.values_mut() {
                bucket.retain(|entry| {
                    entry.user_id != anchor.user_id && entry.user_id != candidate.user_id
                });
            }
            let battle = self
                .battles
                .create_session(&anchor, &candidate, challenge, difficulty);
            self.directory.bind(&anchor.user_id, &battle.battle_id);
            self.directory.bind(&candidate.user_id, &battle.battle_id);
            MatchPairing {
                battle,
                player1: MatchedPlayer::from(&anchor),
                player2: MatchedPlayer::from(&candidate),
            }
        };

        Ok(Some(pairing))
    }

    fn restore(&self, anchor: QueueEntry, candidate: QueueEntry) {
        let mut buckets = self.buckets.lock().unwrap();
        for entry in [anchor, candidate] {
            let duplicate = buckets
                .values()
                .flatten()
                .any(|queued| queued.user_id == entry.user_id);
            if duplicate || self.directory.is_active(&entry.user_id) {
                continue;
            }
            buckets.entry(entry.difficulty).or_default().push(entry);
        }
    }

    /// Drains every bucket, pairing until no further match is possible.
    /// Driven by the gateway's interval ticker.
    pub async fn check_all_buckets(&self) -> Vec<MatchPairing> {
        let mut pairings = Vec::new();
        for difficulty in Difficulty::ALL {
            loop {
                match self.find_match(difficulty).await {
                    Ok(Some(pairing)) => pairings.push(pairing),
                    Ok(None) => break,
                    Err(err) => {
                        warn!("Match check failed for {}: {}", difficulty, err);
                        break;
                    }
                }
            }
        }
        pairings
    }

    pub fn status(&self) -> QueueStatus {
        let buckets = self.buckets.lock().unwrap();
        let count = |difficulty: Difficulty| {
            buckets
                .get(&difficulty)
                .map(|bucket| bucket.len())
                .unwrap_or(0)
        };
        let easy = count(Difficulty::Easy);
        let medium = count(Difficulty::Medium);
        let hard = count(Difficulty::Hard);
        QueueStatus {
            easy,
            medium,
            hard,
            total_in_queue: easy + medium + hard,
            // Two bindings per live battle.
            active_battles: self.directory.active_user_count() / 2,
        }
    }

    pub fn queue_position(&self, user_id: &str) -> Option<QueuePosition> {
        let buckets = self.buckets.lock().unwrap();
        for (difficulty, bucket) in buckets.iter() {
            if let Some(entry) = bucket.iter().find(|entry| entry.user_id == user_id) {
                let position = bucket
                    .iter()
                    .filter(|other| other.enqueued_at < entry.enqueued_at)
                    .count()
                    + 1;
                return Some(QueuePosition {
                    difficulty: *difficulty,
                    position,
                    total_in_queue: bucket.len(),
                    wait_ms: (Utc::now() - entry.enqueued_at).num_milliseconds().max(0),
                });
            }
        }
        None
    }

    #[cfg(test)]
    fn push_entry(&self, entry: QueueEntry) {
        self.buckets
            .lock()
            .unwrap()
            .entry(entry.difficulty)
            .or_default()
            .push(entry);
    }
}
