use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

/// Maps each user to the battle they are currently in. This is the single
/// gate keeping a user out of two battles, or out of the queue while one is
/// live. Bindings are released exactly once per battle, on termination.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    bindings: Mutex<HashMap<String, String>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, user_id: &str, battle_id: &str) {
        let mut bindings = self.bindings.lock().unwrap();
        bindings.insert(user_id.to_string(), battle_id.to_string());
        debug!("Bound user {} to battle {}", user_id, battle_id);
    }

    pub fn unbind(&self, user_id: &str) -> bool {
        self.bindings.lock().unwrap().remove(user_id).is_some()
    }

    pub fn active_battle(&self, user_id: &str) -> Option<String> {
        self.bindings.lock().unwrap().get(user_id).cloned()
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.bindings.lock().unwrap().contains_key(user_id)
    }

    /// Releases every participant of a finished battle. Returns how many
    /// bindings were removed.
    pub fn unbind_all(&self, battle_id: &str) -> usize {
        let mut bindings = self.bindings.lock().unwrap();
        let before = bindings.len();
        bindings.retain(|_, bound| bound != battle_id);
        let released = before - bindings.len();
        debug!("Released {} bindings for battle {}", released, battle_id);
        released
    }

    pub fn active_user_count(&self) -> usize {
        self.bindings.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_and_lookup() {
        let directory = SessionDirectory::new();
        directory.bind("alice", "battle-1");

        assert!(directory.is_active("alice"));
        assert_eq!(directory.active_battle("alice").as_deref(), Some("battle-1"));
        assert!(!directory.is_active("bob"));
    }

    #[test]
    fn unbind_is_idempotent() {
        let directory = SessionDirectory::new();
        directory.bind("alice", "battle-1");

        assert!(directory.unbind("alice"));
        assert!(!directory.unbind("alice"));
        assert!(!directory.is_active("alice"));
    }

    #[test]
    fn unbind_all_releases_both_participants() {
        let directory = SessionDirectory::new();
        directory.bind("alice", "battle-1");
        directory.bind("bob", "battle-1");
        directory.bind("carol", "battle-2");

        assert_eq!(directory.unbind_all("battle-1"), 2);
        assert!(!directory.is_active("alice"));
        assert!(!directory.is_active("bob"));
        assert!(directory.is_active("carol"));

        // Second release is a no-op, never touching other battles.
        assert_eq!(directory.unbind_all("battle-1"), 0);
        assert_eq!(directory.active_user_count(), 1);
    }
}
