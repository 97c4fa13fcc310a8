use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::challenge::Difficulty;

/// A player waiting for an opponent in one difficulty bucket.
/// At most one entry per user across all buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub user_id: String,
    pub connection_id: String,
    pub rating: i32,
    pub difficulty: Difficulty,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(user_id: &str, connection_id: &str, rating: i32, difficulty: Difficulty) -> Self {
        QueueEntry {
            user_id: user_id.to_string(),
            connection_id: connection_id.to_string(),
            rating,
            difficulty,
            enqueued_at: Utc::now(),
        }
    }
}

/// Read-only queue counters for observability and the lobby UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatus {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub total_in_queue: usize,
    pub active_battles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuePosition {
    pub difficulty: Difficulty,
    /// 1-based position in enqueue order.
    pub position: usize,
    pub total_in_queue: usize,
    pub wait_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_records_enqueue_time() {
        let entry = QueueEntry::new("user-1", "conn-1", 1200, Difficulty::Medium);

        assert_eq!(entry.user_id, "user-1");
        assert_eq!(entry.connection_id, "conn-1");
        assert_eq!(entry.rating, 1200);
        assert!((Utc::now() - entry.enqueued_at).num_seconds() < 10);
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = QueueEntry::new("user-1", "conn-1", 950, Difficulty::Hard);

        let serialized = serde_json::to_string(&entry).unwrap();
        let deserialized: QueueEntry = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.user_id, entry.user_id);
        assert_eq!(deserialized.rating, entry.rating);
        assert_eq!(deserialized.difficulty, Difficulty::Hard);
    }
}
